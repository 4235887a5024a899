//! Test doubles shared by the integration tests
//!
//! Every double writes to one shared call log so tests can assert on
//! ordering across components.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tjbot::audio::AudioClip;
use tjbot::dialogue::{DialogueClient, DialogueResult};
use tjbot::hardware::Hardware;
use tjbot::integration::{Companion, TjBotConfig};
use tjbot::session::HandleFactory;
use tjbot::speech::{SpeechInput, SpeechOutput};
use tjbot::{Result, TjBotError};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().clone()
}

/// Calls in the log that start with `prefix`
pub fn calls_with(log: &CallLog, prefix: &str) -> Vec<String> {
    log.lock()
        .iter()
        .filter(|c| c.starts_with(prefix))
        .cloned()
        .collect()
}

pub struct RecordingHardware {
    log: CallLog,
    failing: HashSet<&'static str>,
}

impl RecordingHardware {
    fn call(&self, name: &'static str, entry: String) -> Result<()> {
        self.log.lock().push(entry);
        if self.failing.contains(name) {
            return Err(TjBotError::Hardware(format!("{} jammed", name)));
        }
        Ok(())
    }
}

impl Hardware for RecordingHardware {
    fn wave(&mut self) -> Result<()> {
        self.call("wave", "hw.wave".into())
    }
    fn raise_arm(&mut self) -> Result<()> {
        self.call("raise_arm", "hw.raise_arm".into())
    }
    fn lower_arm(&mut self) -> Result<()> {
        self.call("lower_arm", "hw.lower_arm".into())
    }
    fn set_color(&mut self, color: &str) -> Result<()> {
        self.call("set_color", format!("hw.set_color:{}", color))
    }
    fn dance(&mut self) -> Result<()> {
        self.call("dance", "hw.dance".into())
    }
    fn release(&mut self) -> Result<()> {
        self.call("release", "hw.release".into())
    }
}

/// Always answers with the same classified turn
pub struct ScriptedDialogue {
    log: CallLog,
    reply: Mutex<DialogueResult>,
}

impl DialogueClient for ScriptedDialogue {
    fn converse(&self, utterance: &str) -> Result<DialogueResult> {
        self.log.lock().push(format!("dialogue.converse:{}", utterance));
        Ok(self.reply.lock().clone())
    }

    fn reset_context(&self) {
        self.log.lock().push("dialogue.reset".into());
    }
}

pub struct RecordingVoice {
    log: CallLog,
    fail: bool,
}

impl SpeechOutput for RecordingVoice {
    fn speak(&self, text: &str) -> Result<()> {
        self.log.lock().push(format!("voice.speak:{}", text));
        if self.fail {
            return Err(TjBotError::Network("synthesis timed out".into()));
        }
        Ok(())
    }
}

pub struct ScriptedMicrophone {
    log: CallLog,
    transcript: Option<String>,
    record_fails: bool,
}

impl SpeechInput for ScriptedMicrophone {
    fn start_capture(&mut self) -> Result<()> {
        self.log.lock().push("mic.start".into());
        Ok(())
    }
    fn record(&mut self, duration: Duration) -> Result<AudioClip> {
        self.log.lock().push(format!("mic.record:{}", duration.as_secs()));
        if self.record_fails {
            return Err(TjBotError::AudioDevice("input stream closed".into()));
        }
        Ok(AudioClip::new(vec![0.0; 160], 16000))
    }
    fn stop_capture(&mut self) -> Result<()> {
        self.log.lock().push("mic.stop".into());
        Ok(())
    }
    fn transcribe(&self, _clip: &AudioClip) -> Result<String> {
        self.transcript.clone().ok_or(TjBotError::RecognitionEmpty)
    }
}

/// Builds the doubles above; each component can be told to fail construction
#[derive(Clone, Default)]
pub struct FakeFactory {
    pub log: CallLog,
    pub reply: DialogueResult,
    pub failing_components: HashSet<&'static str>,
    pub failing_hardware_calls: HashSet<&'static str>,
    pub voice_fails: bool,
    pub transcript: Option<String>,
    pub record_fails: bool,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(mut self, reply: DialogueResult) -> Self {
        self.reply = reply;
        self
    }

    pub fn failing_component(mut self, name: &'static str) -> Self {
        self.failing_components.insert(name);
        self
    }

    pub fn failing_hardware_call(mut self, name: &'static str) -> Self {
        self.failing_hardware_calls.insert(name);
        self
    }

    pub fn voice_fails(mut self) -> Self {
        self.voice_fails = true;
        self
    }

    pub fn hearing(mut self, transcript: &str) -> Self {
        self.transcript = Some(transcript.to_string());
        self
    }

    pub fn failing_record(mut self) -> Self {
        self.record_fails = true;
        self
    }

    fn build(&self, name: &'static str) -> Result<()> {
        self.log.lock().push(format!("build:{}", name));
        if self.failing_components.contains(name) {
            return Err(TjBotError::Hardware(format!("{} not attached", name)));
        }
        Ok(())
    }

    /// A companion with valid credentials wired to this factory
    pub fn companion(&self) -> Companion {
        Companion::new(test_config(), Box::new(self.clone()))
    }
}

impl HandleFactory for FakeFactory {
    fn dialogue(&self, _config: &TjBotConfig) -> Result<Box<dyn DialogueClient>> {
        self.build("dialogue")?;
        Ok(Box::new(ScriptedDialogue {
            log: self.log.clone(),
            reply: Mutex::new(self.reply.clone()),
        }))
    }

    fn speech_out(&self, _config: &TjBotConfig) -> Result<Box<dyn SpeechOutput>> {
        self.build("speech-out")?;
        Ok(Box::new(RecordingVoice {
            log: self.log.clone(),
            fail: self.voice_fails,
        }))
    }

    fn speech_in(&self, _config: &TjBotConfig) -> Result<Box<dyn SpeechInput>> {
        self.build("speech-in")?;
        Ok(Box::new(ScriptedMicrophone {
            log: self.log.clone(),
            transcript: self.transcript.clone(),
            record_fails: self.record_fails,
        }))
    }

    fn hardware(&self, _config: &TjBotConfig) -> Result<Box<dyn Hardware>> {
        self.build("hardware")?;
        Ok(Box::new(RecordingHardware {
            log: self.log.clone(),
            failing: self.failing_hardware_calls.clone(),
        }))
    }
}

pub fn test_config() -> TjBotConfig {
    TjBotConfig::default().with_credentials("test-key", "https://api.example.test", "assistant-1")
}
