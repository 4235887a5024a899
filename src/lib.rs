pub mod audio;
pub mod auth;
pub mod dialogue;
pub mod dispatch;
pub mod hardware;
pub mod integration;
pub mod messages;
pub mod session;
pub mod speech;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TjBotError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service returned an empty response")]
    EmptyResponse,

    #[error("Service error: {0}")]
    Service(String),

    #[error("Hardware error: {0}")]
    Hardware(String),

    #[error("No speech recognized")]
    RecognitionEmpty,

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("{0} unavailable")]
    Unavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::io::Error> for TjBotError {
    fn from(e: std::io::Error) -> Self {
        TjBotError::Io(e.to_string())
    }
}

impl From<reqwest::Error> for TjBotError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            TjBotError::Network(e.to_string())
        } else if e.is_decode() {
            TjBotError::Service(format!("Malformed response body: {}", e))
        } else {
            TjBotError::Network(e.to_string())
        }
    }
}

impl TjBotError {
    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Needs the operator to fix settings
            TjBotError::Configuration(_) => false,
            // A fresh credential may fix it on the next attempt
            TjBotError::Auth(_) => true,
            TjBotError::Network(_) => true,
            TjBotError::EmptyResponse => true,
            TjBotError::Service(_) => true,
            // A stuck or absent actuator never takes the session down
            TjBotError::Hardware(_) => true,
            TjBotError::RecognitionEmpty => true,
            TjBotError::AudioDevice(_) => false,
            TjBotError::Io(_) => false,
            TjBotError::Unavailable(_) => false,
            TjBotError::InvalidInput(_) => true,
        }
    }

    /// Expected outcomes that should not be shown as a hard failure
    pub fn is_silent(&self) -> bool {
        matches!(self, TjBotError::RecognitionEmpty)
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            TjBotError::Configuration(_) => {
                "Configuration error. Please check credentials and endpoints.".to_string()
            }
            TjBotError::Auth(_) => {
                "The service rejected our credentials. Please check the API key.".to_string()
            }
            TjBotError::Network(_) => {
                "Could not reach the service. Please try again.".to_string()
            }
            TjBotError::EmptyResponse => {
                "The assistant did not answer. Please try again.".to_string()
            }
            TjBotError::Service(_) => {
                "The service reported an error. Please try again.".to_string()
            }
            TjBotError::Hardware(reason) => format!("The robot could not move: {}", reason),
            TjBotError::RecognitionEmpty => "No speech recognized. Please try again.".to_string(),
            TjBotError::AudioDevice(_) => {
                "Audio device error. Please check your microphone/speakers.".to_string()
            }
            TjBotError::Io(_) => "File system error occurred.".to_string(),
            TjBotError::Unavailable(what) => {
                format!("{} is not available. Initialize the system first.", what)
            }
            TjBotError::InvalidInput(_) => "Please enter a valid message.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TjBotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_empty_is_silent() {
        assert!(TjBotError::RecognitionEmpty.is_silent());
        assert!(!TjBotError::Hardware("busy".into()).is_silent());
    }

    #[test]
    fn test_hardware_errors_are_recoverable() {
        assert!(TjBotError::Hardware("busy".into()).is_recoverable());
        assert!(!TjBotError::Configuration("missing".into()).is_recoverable());
    }

    #[test]
    fn test_user_message_carries_hardware_reason() {
        let msg = TjBotError::Hardware("servo not attached".into()).user_message();
        assert!(msg.contains("servo not attached"));
    }
}
