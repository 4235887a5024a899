//! Intent dispatch tests
//!
//! These tests send utterances through `Companion::dispatch` with a scripted
//! dialogue service and check which actuator and voice calls happen.

mod common;

use common::{calls_with, FakeFactory};
use tjbot::dialogue::{DialogueResult, Entity, Intent};
use tjbot::dispatch::{Action, ActionKind, TurnPhase, VoiceOutcome};
use tjbot::messages::Speaker;
use tjbot::TjBotError;

fn ready(factory: &FakeFactory) -> tjbot::integration::Companion {
    let mut companion = factory.companion();
    companion.initialize();
    companion
}

/// Only the top intent is acted on, and only once
#[test]
fn test_single_intent_action() {
    let reply = DialogueResult::from_parts(
        vec![Intent::new("shine", 0.4), Intent::new("wave", 0.9)],
        vec![Entity::new("color", "red")],
        vec![],
    );
    let factory = FakeFactory::new().replying(reply);
    let mut companion = ready(&factory);

    let outcome = companion.dispatch("wave please").unwrap();

    assert_eq!(outcome.record.action_taken, ActionKind::Wave);
    assert_eq!(outcome.record.intent_name.as_deref(), Some("wave"));
    assert_eq!(calls_with(&factory.log, "hw."), vec!["hw.wave"]);
}

/// `shine` without a color entity lights up white
#[test]
fn test_color_default() {
    let reply = DialogueResult::from_parts(vec![Intent::new("shine", 0.8)], vec![], vec![]);
    let factory = FakeFactory::new().replying(reply);
    let mut companion = ready(&factory);

    companion.dispatch("light up").unwrap();

    assert_eq!(calls_with(&factory.log, "hw."), vec!["hw.set_color:white"]);
}

/// The first color entity wins, other entity types are ignored
#[test]
fn test_color_extraction_order() {
    let reply = DialogueResult::from_parts(
        vec![Intent::new("shine", 0.8)],
        vec![
            Entity::new("size", "large"),
            Entity::new("color", "blue"),
            Entity::new("color", "red"),
        ],
        vec![],
    );
    let factory = FakeFactory::new().replying(reply);
    let mut companion = ready(&factory);

    let outcome = companion.dispatch("make it blue, no red").unwrap();

    assert_eq!(calls_with(&factory.log, "hw."), vec!["hw.set_color:blue"]);
    assert_eq!(outcome.record.parameter.as_deref(), Some("blue"));
}

/// An intent outside the action table touches no hardware but still speaks
#[test]
fn test_unrecognized_intent_no_actuation() {
    let reply = DialogueResult::from_parts(
        vec![Intent::new("smalltalk", 0.99)],
        vec![],
        vec!["I'm doing great!".into()],
    );
    let factory = FakeFactory::new().replying(reply);
    let mut companion = ready(&factory);

    let outcome = companion.dispatch("how are you?").unwrap();

    assert_eq!(outcome.record.action_taken, ActionKind::None);
    assert!(outcome.record.success);
    assert!(calls_with(&factory.log, "hw.").is_empty());
    assert_eq!(outcome.reply_text, "I'm doing great!");
    assert_eq!(
        calls_with(&factory.log, "voice."),
        vec!["voice.speak:I'm doing great!"]
    );
    assert_eq!(
        outcome.phases,
        vec![
            TurnPhase::Received,
            TurnPhase::ActionNone,
            TurnPhase::VoiceAttempted,
            TurnPhase::Done
        ]
    );
}

/// Fragments are joined by single spaces with nothing trailing
#[test]
fn test_reply_concatenation() {
    let reply = DialogueResult::from_parts(vec![], vec![], vec!["Hello".into(), "there".into()]);
    let factory = FakeFactory::new().replying(reply);
    let mut companion = ready(&factory);

    let outcome = companion.dispatch("hi").unwrap();

    assert_eq!(outcome.reply_text, "Hello there");
    let turn = outcome.agent_turn().unwrap();
    assert_eq!(turn.speaker, Speaker::Agent);
    assert_eq!(turn.text, "Hello there");
}

/// A failed reply does not undo a successful wave
#[test]
fn test_voice_failure_keeps_action_success() {
    let reply = DialogueResult::from_parts(
        vec![Intent::new("wave", 0.9)],
        vec![],
        vec!["Hi!".into()],
    );
    let factory = FakeFactory::new().replying(reply).voice_fails();
    let mut companion = ready(&factory);

    let outcome = companion.dispatch("wave").unwrap();

    assert!(outcome.record.success);
    assert_eq!(outcome.record.voice, VoiceOutcome::Failed);
    assert!(outcome
        .record
        .error_detail
        .as_deref()
        .unwrap()
        .contains("voice output failed"));
}

/// A jammed actuator fails the record but the reply is still spoken
#[test]
fn test_hardware_failure_still_speaks() {
    let reply = DialogueResult::from_parts(
        vec![Intent::new("dance", 0.9)],
        vec![],
        vec!["Let's dance".into()],
    );
    let factory = FakeFactory::new()
        .replying(reply)
        .failing_hardware_call("dance");
    let mut companion = ready(&factory);

    let outcome = companion.dispatch("dance").unwrap();

    assert!(!outcome.record.success);
    assert_eq!(outcome.record.voice, VoiceOutcome::Spoken);
    assert_eq!(
        outcome.record.error_detail.as_deref(),
        Some("Hardware error: dance jammed")
    );
}

/// Empty input and a missing dialogue handle are reported, not dispatched
#[test]
fn test_dispatch_preconditions() {
    let factory = FakeFactory::new().failing_component("dialogue");
    let mut companion = ready(&factory);

    assert!(matches!(
        companion.dispatch("   "),
        Err(TjBotError::InvalidInput(_))
    ));
    assert_eq!(
        companion.dispatch("hello").unwrap_err(),
        TjBotError::Unavailable("dialogue service".into())
    );
}

/// Dispatch after shutdown finds no dialogue handle
#[test]
fn test_dispatch_after_shutdown() {
    let factory = FakeFactory::new();
    let mut companion = ready(&factory);
    companion.shutdown();

    assert!(matches!(
        companion.dispatch("hello"),
        Err(TjBotError::Unavailable(_))
    ));
}

/// Listening records for the requested length and always stops capture
#[test]
fn test_listen_transcribes() {
    let factory = FakeFactory::new().hearing("raise your arm");
    let mut companion = ready(&factory);

    let outcome = companion.listen(Some(3));

    assert_eq!(outcome.heard(), Some("raise your arm"));
    assert_eq!(outcome.record.action_taken, ActionKind::Listen);
    assert!(outcome.record.success);
    assert_eq!(outcome.record.parameter.as_deref(), Some("raise your arm"));
    assert_eq!(
        calls_with(&factory.log, "mic."),
        vec!["mic.start", "mic.record:3", "mic.stop"]
    );
}

/// Silence is a successful listen with nothing heard
#[test]
fn test_listen_silence_is_none() {
    let factory = FakeFactory::new();
    let mut companion = ready(&factory);

    let outcome = companion.listen(None);

    assert_eq!(outcome.heard(), None);
    assert_eq!(outcome.record.action_taken, ActionKind::Listen);
    assert!(outcome.record.success);
    assert!(outcome.record.error_detail.is_none());
    assert_eq!(calls_with(&factory.log, "mic.record"), vec!["mic.record:5"]);
}

/// A recording failure stops capture and fails the listen record
#[test]
fn test_listen_record_failure_stops_capture() {
    let factory = FakeFactory::new().hearing("unused").failing_record();
    let mut companion = ready(&factory);

    let outcome = companion.listen(Some(2));

    assert_eq!(outcome.heard(), None);
    assert_eq!(outcome.record.action_taken, ActionKind::Listen);
    assert!(!outcome.record.success);
    assert_eq!(
        outcome.record.error_detail.as_deref(),
        Some("Audio device error: input stream closed")
    );
    assert_eq!(
        calls_with(&factory.log, "mic."),
        vec!["mic.start", "mic.record:2", "mic.stop"]
    );
}

/// Without a microphone the listen record fails without touching other handles
#[test]
fn test_listen_without_speech_input() {
    let factory = FakeFactory::new().failing_component("speech-in");
    let mut companion = ready(&factory);

    let outcome = companion.listen(None);

    assert!(!outcome.record.success);
    assert_eq!(outcome.record.action_taken, ActionKind::Listen);
    assert_eq!(
        outcome.record.error_detail.as_deref(),
        Some("speech input unavailable")
    );
    assert!(calls_with(&factory.log, "mic.").is_empty());
}

/// Clearing the conversation reaches the dialogue service
#[test]
fn test_clear_context_resets_dialogue() {
    let factory = FakeFactory::new();
    let companion = ready(&factory);

    companion.clear_context();

    assert_eq!(calls_with(&factory.log, "dialogue."), vec!["dialogue.reset"]);
}

/// Manual commands bypass the dialogue service
#[test]
fn test_perform_manual_commands() {
    let factory = FakeFactory::new();
    let mut companion = ready(&factory);

    let record = companion.perform(Action::Shine("off".into()));
    assert!(record.success);
    assert_eq!(record.action_taken, ActionKind::Shine);

    let record = companion.perform(Action::Speak("beep".into()));
    assert_eq!(record.voice, VoiceOutcome::Spoken);

    assert_eq!(calls_with(&factory.log, "hw."), vec!["hw.set_color:off"]);
    assert_eq!(calls_with(&factory.log, "voice."), vec!["voice.speak:beep"]);
    assert!(calls_with(&factory.log, "dialogue.").is_empty());
}
