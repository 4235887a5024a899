//! Configuration for the integration layer
//!
//! Provides centralized configuration for all components. Values come from a
//! TOML file and are then overridden by the environment variables the robot is
//! deployed with.

use crate::audio::device::DeviceSelector;
use crate::hardware::{HardwareBackend, PixelOrder};
use crate::session::Component;
use crate::{Result, TjBotError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_ASSISTANT_VERSION: &str = "2023-04-15";

/// Dialogue service settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    pub api_key: String,
    pub url: String,
    pub assistant_id: String,

    /// API version date sent with every request
    pub version: String,

    /// Deadline for one request, in seconds
    pub timeout_secs: u64,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: String::new(),
            assistant_id: String::new(),
            version: DEFAULT_ASSISTANT_VERSION.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Text-to-speech settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechOutConfig {
    pub api_key: String,
    pub url: String,
    pub voice: String,
    pub timeout_secs: u64,

    /// Which speaker to play through
    pub device: DeviceSelector,
}

impl Default for SpeechOutConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: String::new(),
            voice: "en-US_AllisonV3Voice".to_string(),
            timeout_secs: 30,
            device: DeviceSelector::default(),
        }
    }
}

/// Speech-to-text settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechInConfig {
    pub api_key: String,
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,

    /// Transcripts below this confidence count as no speech
    pub min_confidence: f32,

    /// Length of one capture
    pub record_seconds: u32,

    /// Which microphone to record from
    pub device: DeviceSelector,

    /// Write the last capture here as WAV
    pub save_recording: Option<PathBuf>,
}

impl Default for SpeechInConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: String::new(),
            model: "en-US_BroadbandModel".to_string(),
            timeout_secs: 30,
            min_confidence: 0.0,
            record_seconds: 5,
            device: DeviceSelector::default(),
            save_recording: None,
        }
    }
}

/// Actuator settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    pub backend: HardwareBackend,

    /// BCM pin carrying the servo signal
    pub servo_pin: u8,

    /// Pixels on the strip
    pub led_count: usize,

    pub pixel_order: PixelOrder,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            backend: HardwareBackend::default(),
            servo_pin: 7,
            led_count: 1,
            pixel_order: PixelOrder::default(),
        }
    }
}

/// Configuration for the complete robot
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TjBotConfig {
    /// Token endpoint the API keys are exchanged at
    pub iam_url: String,
    pub dialogue: DialogueConfig,
    pub speech_out: SpeechOutConfig,
    pub speech_in: SpeechInConfig,
    pub hardware: HardwareConfig,
}

impl Default for TjBotConfig {
    fn default() -> Self {
        Self {
            iam_url: DEFAULT_IAM_URL.to_string(),
            dialogue: DialogueConfig::default(),
            speech_out: SpeechOutConfig::default(),
            speech_in: SpeechInConfig::default(),
            hardware: HardwareConfig::default(),
        }
    }
}

impl TjBotConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tjbot").join("config.toml"))
    }

    /// Load from a TOML file, then apply the process environment.
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TjBotError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| TjBotError::Configuration(format!("Invalid config: {}", e)))
    }

    /// Override fields from environment-style variables.
    ///
    /// Empty values are ignored so a blank variable never erases a file setting.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("ASSISTANT_APIKEY") {
            self.dialogue.api_key = v;
        }
        if let Some(v) = get("ASSISTANT_URL") {
            self.dialogue.url = v;
        }
        if let Some(v) = get("ASSISTANT_ID") {
            self.dialogue.assistant_id = v;
        }
        if let Some(v) = get("TTS_APIKEY") {
            self.speech_out.api_key = v;
        }
        if let Some(v) = get("TTS_URL") {
            self.speech_out.url = v;
        }
        if let Some(v) = get("STT_APIKEY") {
            self.speech_in.api_key = v;
        }
        if let Some(v) = get("STT_URL") {
            self.speech_in.url = v;
        }
        if let Some(v) = get("TJBOT_INPUT_DEVICE") {
            self.speech_in.device = DeviceSelector::from_hint(&v);
        }
        if let Some(v) = get("TJBOT_OUTPUT_DEVICE") {
            self.speech_out.device = DeviceSelector::from_hint(&v);
        }
        if let Some(v) = get("TJBOT_HARDWARE") {
            match v.parse() {
                Ok(backend) => self.hardware.backend = backend,
                Err(e) => tracing::warn!("Ignoring TJBOT_HARDWARE: {}", e),
            }
        }
    }

    /// Every required credential or endpoint that is empty, per component
    pub fn missing_credentials(&self) -> Vec<(Component, &'static str)> {
        let mut missing = Vec::new();
        let mut check = |component, field, value: &str| {
            if value.trim().is_empty() {
                missing.push((component, field));
            }
        };

        check(Component::Dialogue, "api_key", &self.dialogue.api_key);
        check(Component::Dialogue, "url", &self.dialogue.url);
        check(Component::Dialogue, "assistant_id", &self.dialogue.assistant_id);
        check(Component::SpeechOut, "api_key", &self.speech_out.api_key);
        check(Component::SpeechOut, "url", &self.speech_out.url);
        check(Component::SpeechIn, "api_key", &self.speech_in.api_key);
        check(Component::SpeechIn, "url", &self.speech_in.url);
        missing
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_credentials();
        if !missing.is_empty() {
            let fields: Vec<String> = missing
                .iter()
                .map(|(component, field)| format!("{}.{}", component, field))
                .collect();
            return Err(TjBotError::Configuration(format!(
                "missing {}",
                fields.join(", ")
            )));
        }
        if self.speech_in.record_seconds == 0 {
            return Err(TjBotError::Configuration(
                "speech_in.record_seconds must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.speech_in.min_confidence) {
            return Err(TjBotError::Configuration(
                "speech_in.min_confidence must be within [0, 1]".into(),
            ));
        }
        Ok(())
    }

    /// Select the actuator backend
    pub fn with_hardware_backend(mut self, backend: HardwareBackend) -> Self {
        self.hardware.backend = backend;
        self
    }

    /// Set the capture length for voice input
    pub fn with_record_seconds(mut self, seconds: u32) -> Self {
        self.speech_in.record_seconds = seconds;
        self
    }

    /// Fill every credential from one key and endpoint (handy for tests)
    pub fn with_credentials(mut self, api_key: &str, url: &str, assistant_id: &str) -> Self {
        self.dialogue.api_key = api_key.to_string();
        self.dialogue.url = url.to_string();
        self.dialogue.assistant_id = assistant_id.to_string();
        self.speech_out.api_key = api_key.to_string();
        self.speech_out.url = url.to_string();
        self.speech_in.api_key = api_key.to_string();
        self.speech_in.url = url.to_string();
        self
    }
}
