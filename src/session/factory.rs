//! Production handle construction

use super::manager::HandleFactory;
use crate::dialogue::{DialogueClient, WatsonAssistant};
use crate::hardware::{Hardware, HardwareBackend, SimulatedHardware};
use crate::integration::config::TjBotConfig;
use crate::speech::{SpeechInput, SpeechOutput};
use crate::{Result, TjBotError};

/// Builds the cloud speech and dialogue adapters and the configured actuator backend
#[derive(Debug, Default, Clone, Copy)]
pub struct CloudHandleFactory;

impl CloudHandleFactory {
    pub fn new() -> Self {
        Self
    }
}

impl HandleFactory for CloudHandleFactory {
    fn dialogue(&self, config: &TjBotConfig) -> Result<Box<dyn DialogueClient>> {
        Ok(Box::new(WatsonAssistant::new(&config.dialogue, &config.iam_url)?))
    }

    #[cfg(feature = "audio-io")]
    fn speech_out(&self, config: &TjBotConfig) -> Result<Box<dyn SpeechOutput>> {
        Ok(Box::new(crate::speech::WatsonTextToSpeech::new(
            &config.speech_out,
            &config.iam_url,
        )?))
    }

    #[cfg(not(feature = "audio-io"))]
    fn speech_out(&self, _config: &TjBotConfig) -> Result<Box<dyn SpeechOutput>> {
        Err(TjBotError::AudioDevice(
            "built without the audio-io feature".into(),
        ))
    }

    #[cfg(feature = "audio-io")]
    fn speech_in(&self, config: &TjBotConfig) -> Result<Box<dyn SpeechInput>> {
        Ok(Box::new(crate::speech::WatsonSpeechToText::new(
            &config.speech_in,
            &config.iam_url,
        )?))
    }

    #[cfg(not(feature = "audio-io"))]
    fn speech_in(&self, _config: &TjBotConfig) -> Result<Box<dyn SpeechInput>> {
        Err(TjBotError::AudioDevice(
            "built without the audio-io feature".into(),
        ))
    }

    fn hardware(&self, config: &TjBotConfig) -> Result<Box<dyn Hardware>> {
        match config.hardware.backend {
            HardwareBackend::Simulated => {
                Ok(Box::new(SimulatedHardware::new().with_realtime(true)))
            }
            HardwareBackend::Gpio => gpio_backend(config),
        }
    }
}

#[cfg(all(feature = "gpio", target_os = "linux"))]
fn gpio_backend(config: &TjBotConfig) -> Result<Box<dyn Hardware>> {
    Ok(Box::new(crate::hardware::GpioHardware::new(&config.hardware)?))
}

#[cfg(not(all(feature = "gpio", target_os = "linux")))]
fn gpio_backend(_config: &TjBotConfig) -> Result<Box<dyn Hardware>> {
    Err(TjBotError::Hardware(
        "GPIO backend requires the gpio feature on Linux".into(),
    ))
}
