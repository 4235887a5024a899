//! Intent-to-actuation dispatch

pub mod action;
pub mod dispatcher;

pub use action::{
    Action, ActionKind, ActionRecord, ListenOutcome, TurnOutcome, TurnPhase, VoiceOutcome,
};
pub use dispatcher::IntentDispatcher;
