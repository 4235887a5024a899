//! Speech-to-text: microphone capture plus remote recognition
//!
//! "Nothing heard" is an expected outcome and comes back as
//! `TjBotError::RecognitionEmpty`, distinct from device or service faults.

use crate::audio::AudioClip;
use crate::{Result, TjBotError};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[cfg(feature = "audio-io")]
use crate::audio::{encode_wav, write_wav, Microphone};
#[cfg(feature = "audio-io")]
use crate::auth::{ensure_success, with_auth_retry, IamAuthenticator, TokenProvider};
#[cfg(feature = "audio-io")]
use crate::integration::config::SpeechInConfig;
#[cfg(feature = "audio-io")]
use std::path::PathBuf;
#[cfg(feature = "audio-io")]
use tracing::info;

/// Voice input handle
pub trait SpeechInput {
    /// Begin streaming from the microphone
    fn start_capture(&mut self) -> Result<()>;

    /// Block until `duration` of audio has been captured
    fn record(&mut self, duration: Duration) -> Result<AudioClip>;

    /// Stop any active capture. Harmless when nothing is capturing.
    fn stop_capture(&mut self) -> Result<()>;

    /// Recognize speech in a clip
    fn transcribe(&self, clip: &AudioClip) -> Result<String>;

    /// Capture a fixed-length clip and transcribe it.
    ///
    /// Capture is always stopped afterwards, even when recording failed.
    fn listen(&mut self, duration: Duration) -> Result<String> {
        self.start_capture()?;
        let recorded = self.record(duration);
        if let Err(e) = self.stop_capture() {
            warn!("Failed to stop capture: {}", e);
        }
        self.transcribe(&recorded?)
    }
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognizeResult>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    transcript: String,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Extract the transcript, treating silence and low confidence as empty
pub(crate) fn parse_recognition(body: &str, min_confidence: f32) -> Result<String> {
    let response: RecognizeResponse = serde_json::from_str(body)
        .map_err(|e| TjBotError::Service(format!("Malformed recognition response: {}", e)))?;

    let best: Vec<&Alternative> = response
        .results
        .iter()
        .filter_map(|r| r.alternatives.first())
        .collect();

    let confidence = best.first().and_then(|a| a.confidence).unwrap_or(1.0);
    let transcript = best
        .iter()
        .map(|a| a.transcript.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if transcript.is_empty() {
        debug!("No speech detected");
        return Err(TjBotError::RecognitionEmpty);
    }
    if confidence < min_confidence {
        debug!(
            "Discarding transcript '{}' at confidence {:.2} (< {:.2})",
            transcript, confidence, min_confidence
        );
        return Err(TjBotError::RecognitionEmpty);
    }
    Ok(transcript)
}

/// Speech to Text v1 `recognize` API with a local microphone
#[cfg(feature = "audio-io")]
pub struct WatsonSpeechToText {
    client: reqwest::blocking::Client,
    endpoint: String,
    tokens: Box<dyn TokenProvider>,
    min_confidence: f32,
    save_recording: Option<PathBuf>,
    microphone: Microphone,
}

#[cfg(feature = "audio-io")]
impl WatsonSpeechToText {
    /// Build the client and open the microphone.
    ///
    /// Device resolution happens here, once.
    pub fn new(config: &SpeechInConfig, iam_url: &str) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let tokens = IamAuthenticator::new(config.api_key.clone(), iam_url, timeout)?;
        let microphone = Microphone::new(&config.device)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TjBotError::Configuration(format!("HTTP client: {}", e)))?;
        let endpoint = format!(
            "{}/v1/recognize?model={}",
            config.url.trim_end_matches('/'),
            config.model
        );
        info!("Speech-to-text ready ({})", config.model);

        Ok(Self {
            client,
            endpoint,
            tokens: Box::new(tokens),
            min_confidence: config.min_confidence,
            save_recording: config.save_recording.clone(),
            microphone,
        })
    }

    fn recognize(&self, token: &str, wav: &[u8]) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(wav.to_vec())
            .send()?;
        Ok(ensure_success(response)?.text()?)
    }
}

#[cfg(feature = "audio-io")]
impl SpeechInput for WatsonSpeechToText {
    fn start_capture(&mut self) -> Result<()> {
        self.microphone.start_capture()
    }

    fn record(&mut self, duration: Duration) -> Result<AudioClip> {
        let clip = self.microphone.record(duration)?;
        if let Some(path) = &self.save_recording {
            if let Err(e) = write_wav(path, &clip) {
                warn!("Could not save recording: {}", e);
            }
        }
        Ok(clip)
    }

    fn stop_capture(&mut self) -> Result<()> {
        self.microphone.stop_capture()
    }

    fn transcribe(&self, clip: &AudioClip) -> Result<String> {
        if clip.is_empty() {
            return Err(TjBotError::RecognitionEmpty);
        }
        let wav = encode_wav(clip)?;
        debug!("Sending {:.2}s of audio for recognition", clip.duration_seconds());
        let body = with_auth_retry(self.tokens.as_ref(), |token| self.recognize(token, &wav))?;
        let transcript = parse_recognition(&body, self.min_confidence)?;
        info!("You said: {}", transcript);
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcript() {
        let body = r#"{
            "results": [
                {"alternatives": [{"transcript": "wave to me ", "confidence": 0.91}], "final": true}
            ],
            "result_index": 0
        }"#;
        assert_eq!(parse_recognition(body, 0.5).unwrap(), "wave to me");
    }

    #[test]
    fn test_multiple_results_are_joined() {
        let body = r#"{"results": [
            {"alternatives": [{"transcript": "turn your light ", "confidence": 0.8}]},
            {"alternatives": [{"transcript": "blue "}]}
        ]}"#;
        assert_eq!(parse_recognition(body, 0.0).unwrap(), "turn your light blue");
    }

    #[test]
    fn test_no_results_is_recognition_empty() {
        assert_eq!(
            parse_recognition(r#"{"results": []}"#, 0.0).unwrap_err(),
            TjBotError::RecognitionEmpty
        );
        assert_eq!(
            parse_recognition(r#"{}"#, 0.0).unwrap_err(),
            TjBotError::RecognitionEmpty
        );
    }

    #[test]
    fn test_low_confidence_is_recognition_empty() {
        let body = r#"{"results": [{"alternatives": [{"transcript": "hmm", "confidence": 0.2}]}]}"#;
        assert_eq!(
            parse_recognition(body, 0.5).unwrap_err(),
            TjBotError::RecognitionEmpty
        );
    }

    #[test]
    fn test_malformed_response_is_service_error() {
        assert!(matches!(
            parse_recognition("not json", 0.0),
            Err(TjBotError::Service(_))
        ));
    }

    struct DeadMic {
        calls: Vec<&'static str>,
    }

    impl SpeechInput for DeadMic {
        fn start_capture(&mut self) -> Result<()> {
            self.calls.push("start");
            Ok(())
        }
        fn record(&mut self, _duration: Duration) -> Result<AudioClip> {
            self.calls.push("record");
            Err(TjBotError::AudioDevice("input stream closed".into()))
        }
        fn stop_capture(&mut self) -> Result<()> {
            self.calls.push("stop");
            Ok(())
        }
        fn transcribe(&self, _clip: &AudioClip) -> Result<String> {
            Ok("never reached".into())
        }
    }

    #[test]
    fn test_listen_stops_capture_when_recording_fails() {
        let mut mic = DeadMic { calls: Vec::new() };
        assert_eq!(
            mic.listen(Duration::from_secs(1)).unwrap_err(),
            TjBotError::AudioDevice("input stream closed".into())
        );
        assert_eq!(mic.calls, vec!["start", "record", "stop"]);
    }
}
