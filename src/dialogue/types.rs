//! Classified dialogue turns and their wire format

use crate::{Result, TjBotError};
use serde::Deserialize;

/// A classified user goal
#[derive(Clone, Debug, PartialEq)]
pub struct Intent {
    pub name: String,
    /// In [0, 1]
    pub confidence: f32,
}

impl Intent {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// A typed value extracted from the user's text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub kind: String,
    pub value: String,
}

impl Entity {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// The outcome of one `converse` call
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DialogueResult {
    /// Highest-confidence intent, absent when the service classified nothing
    pub top_intent: Option<Intent>,

    /// In service order; several entities may share a type
    pub entities: Vec<Entity>,

    /// Response fragments in service order
    pub utterances: Vec<String>,
}

impl DialogueResult {
    /// Build from a ranked intent list, keeping only the highest-confidence one
    pub fn from_parts(
        intents: Vec<Intent>,
        entities: Vec<Entity>,
        utterances: Vec<String>,
    ) -> Self {
        let top_intent = intents.into_iter().fold(None, |best: Option<Intent>, candidate| {
            match best {
                Some(b) if b.confidence >= candidate.confidence => Some(b),
                _ => Some(candidate),
            }
        });
        Self {
            top_intent,
            entities,
            utterances,
        }
    }

    pub fn intent_name(&self) -> Option<&str> {
        self.top_intent.as_ref().map(|i| i.name.as_str())
    }

    /// First entity of the given type
    pub fn first_entity(&self, kind: &str) -> Option<&str> {
        self.entities
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.value.as_str())
    }

    /// Fragments joined by single spaces, with no trailing space
    pub fn reply_text(&self) -> String {
        self.utterances
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// Assistant v2 message response, only the parts we read

#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    pub output: Option<MessageOutput>,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageOutput {
    #[serde(default)]
    pub intents: Vec<WireIntent>,
    #[serde(default)]
    pub entities: Vec<WireEntity>,
    #[serde(default)]
    pub generic: Vec<WireGeneric>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireIntent {
    pub intent: String,
    #[serde(default)]
    pub confidence: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireEntity {
    pub entity: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireGeneric {
    pub response_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessageOutput {
    pub(crate) fn into_result(self) -> DialogueResult {
        let intents = self
            .intents
            .into_iter()
            .map(|i| Intent::new(i.intent, i.confidence))
            .collect();
        let entities = self
            .entities
            .into_iter()
            .map(|e| Entity::new(e.entity, e.value))
            .collect();
        let utterances = self
            .generic
            .into_iter()
            .filter(|g| g.response_type == "text")
            .filter_map(|g| g.text)
            .collect();
        DialogueResult::from_parts(intents, entities, utterances)
    }
}

/// Parse a message response body. Returns the result and the context to carry forward.
pub(crate) fn parse_message(body: &str) -> Result<(DialogueResult, Option<serde_json::Value>)> {
    if body.trim().is_empty() {
        return Err(TjBotError::EmptyResponse);
    }
    let response: MessageResponse = serde_json::from_str(body)
        .map_err(|e| TjBotError::Service(format!("Malformed dialogue response: {}", e)))?;
    let output = response.output.ok_or(TjBotError::EmptyResponse)?;
    Ok((output.into_result(), response.context))
}
