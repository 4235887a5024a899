//! Speech processing modules for STT and TTS
//!
//! This module provides:
//! - Voice input (microphone capture + cloud speech-to-text)
//! - Voice output (cloud text-to-speech + speaker playback)

pub mod stt;
pub mod tts;

// Re-export commonly used types
pub use stt::SpeechInput;
#[cfg(feature = "audio-io")]
pub use stt::WatsonSpeechToText;
pub use tts::SpeechOutput;
#[cfg(feature = "audio-io")]
pub use tts::WatsonTextToSpeech;
