//! Remote dialogue service
//!
//! One request per user utterance. The assistant's returned context is carried
//! into the next request so multi-turn actions keep their state for the
//! lifetime of the client.

use super::types::{parse_message, DialogueResult};
use crate::auth::{ensure_success, with_auth_retry, IamAuthenticator, TokenProvider};
use crate::integration::config::DialogueConfig;
use crate::{Result, TjBotError};
use parking_lot::Mutex;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Classifies free text into an intent, entities and canned replies
pub trait DialogueClient {
    fn converse(&self, utterance: &str) -> Result<DialogueResult>;

    /// Forget any conversation state carried between turns
    fn reset_context(&self) {}
}

/// Assistant v2 stateless message API
pub struct WatsonAssistant {
    client: reqwest::blocking::Client,
    endpoint: String,
    tokens: Box<dyn TokenProvider>,
    context: Mutex<Option<serde_json::Value>>,
}

impl WatsonAssistant {
    pub fn new(config: &DialogueConfig, iam_url: &str) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let tokens = IamAuthenticator::new(config.api_key.clone(), iam_url, timeout)?;
        Self::with_token_provider(config, Box::new(tokens))
    }

    pub fn with_token_provider(
        config: &DialogueConfig,
        tokens: Box<dyn TokenProvider>,
    ) -> Result<Self> {
        if config.url.trim().is_empty() || config.assistant_id.trim().is_empty() {
            return Err(TjBotError::Configuration(
                "dialogue url and assistant_id are required".into(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TjBotError::Configuration(format!("HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}/v2/assistants/{}/message?version={}",
            config.url.trim_end_matches('/'),
            config.assistant_id,
            config.version
        );
        info!("Dialogue client ready for assistant {}", config.assistant_id);

        Ok(Self {
            client,
            endpoint,
            tokens,
            context: Mutex::new(None),
        })
    }

    fn send(&self, token: &str, body: &serde_json::Value) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(body)
            .send()?;
        let response = ensure_success(response)?;
        Ok(response.text()?)
    }
}

impl DialogueClient for WatsonAssistant {
    fn converse(&self, utterance: &str) -> Result<DialogueResult> {
        let mut body = json!({
            "input": {
                "message_type": "text",
                "text": utterance,
                "options": { "alternate_intents": true }
            }
        });
        if let Some(context) = self.context.lock().clone() {
            body["context"] = context;
        }

        debug!("Sending utterance to dialogue service: {:?}", utterance);
        let text = with_auth_retry(self.tokens.as_ref(), |token| self.send(token, &body))?;
        let (result, context) = parse_message(&text)?;

        if context.is_some() {
            *self.context.lock() = context;
        }
        debug!(
            "Dialogue result: intent={:?}, {} entities, {} utterances",
            result.intent_name(),
            result.entities.len(),
            result.utterances.len()
        );
        Ok(result)
    }

    fn reset_context(&self) {
        if self.context.lock().take().is_some() {
            debug!("Dialogue context cleared");
        }
    }
}
