//! Intent dispatch: one classified turn in, at most one actuation and one
//! spoken reply out
//!
//! A turn moves through `Received -> ActionNone | ActionAttempted ->
//! VoiceSkipped | VoiceAttempted -> Done`. Nothing is retried. The record's
//! `success` reflects the physical action only; a failed reply is appended to
//! `error_detail`.

use super::action::{Action, ActionRecord, TurnOutcome, TurnPhase, VoiceOutcome};
use crate::dialogue::DialogueResult;
use crate::hardware::Hardware;
use crate::session::manager::guarded;
use crate::session::SessionState;
use crate::{Result, TjBotError};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Default, Clone, Copy)]
pub struct IntentDispatcher;

impl IntentDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Act on the top intent of `result` and speak the reply
    pub fn dispatch(&self, session: &mut SessionState, result: &DialogueResult) -> TurnOutcome {
        let turn_id = Uuid::new_v4();
        let mut phases = vec![TurnPhase::Received];
        let reply_text = result.reply_text();
        let intent_name = result.intent_name().map(str::to_string);
        debug!(%turn_id, intent = ?intent_name, "Dispatching turn");

        let mut record = match Action::from_dialogue(result) {
            Some(action) => {
                phases.push(TurnPhase::ActionAttempted);
                self.execute(session, &action, intent_name)
            }
            None => {
                phases.push(TurnPhase::ActionNone);
                ActionRecord::none(intent_name)
            }
        };

        if reply_text.is_empty() {
            phases.push(TurnPhase::VoiceSkipped);
        } else if let Some(speech_out) = session.speech_out() {
            phases.push(TurnPhase::VoiceAttempted);
            match guarded("speak", TjBotError::AudioDevice, || {
                speech_out.speak(&reply_text)
            }) {
                Ok(()) => record.voice = VoiceOutcome::Spoken,
                Err(e) => {
                    warn!("Voice output failed: {}", e);
                    record.voice = VoiceOutcome::Failed;
                    record.append_detail(format!("voice output failed: {}", e));
                }
            }
        } else {
            debug!("No speech output; reply shown as text only");
            phases.push(TurnPhase::VoiceSkipped);
        }

        phases.push(TurnPhase::Done);
        info!(%turn_id, "Turn done: {}", record);

        TurnOutcome {
            turn_id,
            reply_text,
            record,
            phases,
        }
    }

    /// Run one action against the session's handles. Never retried.
    pub fn execute(
        &self,
        session: &mut SessionState,
        action: &Action,
        intent_name: Option<String>,
    ) -> ActionRecord {
        let mut record = ActionRecord::for_action(intent_name, action);

        if let Action::Speak(text) = action {
            let spoken = match session.speech_out() {
                Some(speech_out) => {
                    guarded("speak", TjBotError::AudioDevice, || speech_out.speak(text))
                }
                None => Err(TjBotError::Unavailable("speech output".into())),
            };
            match spoken {
                Ok(()) => record.voice = VoiceOutcome::Spoken,
                Err(e) => {
                    warn!("Speak failed: {}", e);
                    record.voice = VoiceOutcome::Failed;
                    record.fail(e.to_string());
                }
            }
            return record;
        }

        let outcome = match session.hardware_mut() {
            Some(hardware) => {
                guarded("actuation", TjBotError::Hardware, || actuate(hardware, action))
            }
            None => Err(TjBotError::Unavailable("hardware".into())),
        };
        if let Err(e) = outcome {
            warn!("{} failed: {}", action.kind(), e);
            record.fail(e.to_string());
        }
        record
    }
}

fn actuate(hardware: &mut dyn Hardware, action: &Action) -> Result<()> {
    match action {
        Action::Wave => hardware.wave(),
        Action::RaiseArm => hardware.raise_arm(),
        Action::LowerArm => hardware.lower_arm(),
        Action::Shine(color) => hardware.set_color(color),
        Action::Dance => hardware.dance(),
        Action::Speak(_) => Err(TjBotError::InvalidInput(
            "speak is not a hardware action".into(),
        )),
    }
}
