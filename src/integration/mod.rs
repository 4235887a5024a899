//! Configuration and the caller-facing `Companion`

pub mod companion;
pub mod config;

pub use companion::Companion;
pub use config::TjBotConfig;
