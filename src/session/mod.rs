//! Session lifecycle management
//!
//! This module provides:
//! - `SessionState`, the single owner of the dialogue, speech and hardware handles
//! - `SessionManager` with idempotent `initialize`/`shutdown`
//! - `HandleFactory` and its production implementation

pub mod factory;
pub mod manager;
pub mod state;

pub use factory::CloudHandleFactory;
pub use manager::{HandleFactory, SessionManager};
pub use state::{
    Component, ComponentOutcome, ComponentResult, InitReport, SessionState, SessionStatus,
};
