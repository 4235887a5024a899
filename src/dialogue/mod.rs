//! Dialogue service boundary: free text in, classified turn out

pub mod client;
pub mod types;

pub use client::{DialogueClient, WatsonAssistant};
pub use types::{DialogueResult, Entity, Intent};
