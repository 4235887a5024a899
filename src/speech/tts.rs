//! Text-to-speech: remote synthesis played on the robot's speaker

use crate::Result;

/// Voice output handle
pub trait SpeechOutput {
    /// Synthesize `text` and block until playback has finished
    fn speak(&self, text: &str) -> Result<()>;
}

/// Accept header for raw PCM at the speaker's native rate
pub(crate) fn pcm_accept(sample_rate: u32) -> String {
    format!("audio/l16;rate={};endianness=little-endian", sample_rate)
}

#[cfg(feature = "audio-io")]
mod watson {
    use super::{pcm_accept, SpeechOutput};
    use crate::audio::{decode_pcm16_le, AudioClip, Speaker};
    use crate::auth::{ensure_success, with_auth_retry, IamAuthenticator, TokenProvider};
    use crate::integration::config::SpeechOutConfig;
    use crate::{Result, TjBotError};
    use serde_json::json;
    use std::time::Duration;
    use tracing::{debug, info};

    /// Text to Speech v1 `synthesize` API with a local speaker
    pub struct WatsonTextToSpeech {
        client: reqwest::blocking::Client,
        endpoint: String,
        tokens: Box<dyn TokenProvider>,
        speaker: Speaker,
    }

    impl WatsonTextToSpeech {
        /// Build the client and open the speaker.
        ///
        /// Device resolution happens here, once.
        pub fn new(config: &SpeechOutConfig, iam_url: &str) -> Result<Self> {
            let timeout = Duration::from_secs(config.timeout_secs);
            let tokens = IamAuthenticator::new(config.api_key.clone(), iam_url, timeout)?;
            let speaker = Speaker::new(&config.device)?;

            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| TjBotError::Configuration(format!("HTTP client: {}", e)))?;
            let endpoint = format!(
                "{}/v1/synthesize?voice={}",
                config.url.trim_end_matches('/'),
                config.voice
            );
            info!("Text-to-speech ready ({})", config.voice);

            Ok(Self {
                client,
                endpoint,
                tokens: Box::new(tokens),
                speaker,
            })
        }

        /// Fetch synthesized speech at the speaker's sample rate
        pub fn synthesize(&self, text: &str) -> Result<AudioClip> {
            let rate = self.speaker.sample_rate();
            let body = json!({ "text": text });
            let bytes = with_auth_retry(self.tokens.as_ref(), |token| {
                let response = self
                    .client
                    .post(&self.endpoint)
                    .bearer_auth(token)
                    .header(reqwest::header::ACCEPT, pcm_accept(rate))
                    .json(&body)
                    .send()?;
                Ok(ensure_success(response)?.bytes()?)
            })?;

            if bytes.is_empty() {
                return Err(TjBotError::EmptyResponse);
            }
            let clip = decode_pcm16_le(&bytes, rate);
            debug!("Synthesized {:.2}s of speech", clip.duration_seconds());
            Ok(clip)
        }
    }

    impl SpeechOutput for WatsonTextToSpeech {
        fn speak(&self, text: &str) -> Result<()> {
            let clip = self.synthesize(text)?;
            self.speaker.play(&clip)
        }
    }
}

#[cfg(feature = "audio-io")]
pub use watson::WatsonTextToSpeech;
