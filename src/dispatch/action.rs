//! Actions, per-turn records and the turn state machine

use crate::dialogue::DialogueResult;
use crate::messages::{ChatTurn, Speaker};
use uuid::Uuid;

/// Intent names the robot acts on
pub mod intents {
    pub const WAVE: &str = "wave";
    pub const RAISE_ARM: &str = "raise-arm";
    pub const LOWER_ARM: &str = "lower-arm";
    pub const SHINE: &str = "shine";
    pub const DANCE: &str = "dance";
}

/// Entity type carrying the LED color for `shine`
pub const COLOR_ENTITY: &str = "color";

/// Color used when `shine` arrives without a color entity
pub const DEFAULT_COLOR: &str = "white";

/// One concrete command for the robot
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Wave,
    RaiseArm,
    LowerArm,
    Shine(String),
    Dance,
    Speak(String),
}

impl Action {
    /// Map the top intent of a turn to at most one action.
    ///
    /// Secondary intents are never consulted.
    pub fn from_dialogue(result: &DialogueResult) -> Option<Action> {
        let action = match result.intent_name()? {
            intents::WAVE => Action::Wave,
            intents::RAISE_ARM => Action::RaiseArm,
            intents::LOWER_ARM => Action::LowerArm,
            intents::SHINE => Action::Shine(
                result
                    .first_entity(COLOR_ENTITY)
                    .unwrap_or(DEFAULT_COLOR)
                    .to_string(),
            ),
            intents::DANCE => Action::Dance,
            _ => return None,
        };
        Some(action)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Wave => ActionKind::Wave,
            Action::RaiseArm => ActionKind::RaiseArm,
            Action::LowerArm => ActionKind::LowerArm,
            Action::Shine(_) => ActionKind::Shine,
            Action::Dance => ActionKind::Dance,
            Action::Speak(_) => ActionKind::Speak,
        }
    }

    fn parameter(&self) -> Option<String> {
        match self {
            Action::Shine(color) => Some(color.clone()),
            Action::Speak(text) => Some(text.clone()),
            _ => None,
        }
    }
}

/// What a turn ended up doing, without parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Wave,
    RaiseArm,
    LowerArm,
    Shine,
    Dance,
    Speak,
    Listen,
    None,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActionKind::Wave => "WAVE",
            ActionKind::RaiseArm => "RAISE_ARM",
            ActionKind::LowerArm => "LOWER_ARM",
            ActionKind::Shine => "SHINE",
            ActionKind::Dance => "DANCE",
            ActionKind::Speak => "SPEAK",
            ActionKind::Listen => "LISTEN",
            ActionKind::None => "NONE",
        };
        write!(f, "{}", name)
    }
}

/// How the spoken reply went
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceOutcome {
    #[default]
    Skipped,
    Spoken,
    Failed,
}

/// Audit entry for one turn or one manual command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRecord {
    pub intent_name: Option<String>,
    pub action_taken: ActionKind,
    /// Color for `Shine`, text for `Speak`, transcript for `Listen`
    pub parameter: Option<String>,
    /// Outcome of the physical action; voice output never changes it
    pub success: bool,
    pub error_detail: Option<String>,
    pub voice: VoiceOutcome,
}

impl ActionRecord {
    /// Record for a turn that triggered no action
    pub fn none(intent_name: Option<String>) -> Self {
        Self {
            intent_name,
            action_taken: ActionKind::None,
            parameter: None,
            success: true,
            error_detail: None,
            voice: VoiceOutcome::Skipped,
        }
    }

    pub fn for_action(intent_name: Option<String>, action: &Action) -> Self {
        Self {
            intent_name,
            action_taken: action.kind(),
            parameter: action.parameter(),
            success: true,
            error_detail: None,
            voice: VoiceOutcome::Skipped,
        }
    }

    pub fn listen() -> Self {
        Self {
            action_taken: ActionKind::Listen,
            ..Self::none(None)
        }
    }

    pub fn fail(&mut self, detail: impl Into<String>) {
        self.success = false;
        self.append_detail(detail);
    }

    /// Add to `error_detail` without touching `success`
    pub fn append_detail(&mut self, detail: impl Into<String>) {
        let detail = detail.into();
        self.error_detail = Some(match self.error_detail.take() {
            Some(existing) => format!("{}; {}", existing, detail),
            None => detail,
        });
    }
}

impl std::fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.action_taken)?;
        if let Some(p) = &self.parameter {
            write!(f, "({})", p)?;
        }
        write!(f, " {}", if self.success { "ok" } else { "failed" })?;
        if let Some(detail) = &self.error_detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

/// Result of one voice capture
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenOutcome {
    /// `None` when nothing usable was heard or capture failed
    pub transcript: Option<String>,
    /// Always `Listen`; fails on device or service errors, not on silence
    pub record: ActionRecord,
}

impl ListenOutcome {
    pub fn heard(&self) -> Option<&str> {
        self.transcript.as_deref()
    }
}

/// States a turn passes through; `Done` is always last
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    Received,
    ActionNone,
    ActionAttempted,
    VoiceSkipped,
    VoiceAttempted,
    Done,
}

/// Everything the caller needs from one dispatched turn
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub turn_id: Uuid,
    /// Empty when the service sent no response fragments
    pub reply_text: String,
    pub record: ActionRecord,
    pub phases: Vec<TurnPhase>,
}

impl TurnOutcome {
    /// The agent's line for the caller's transcript, if anything was said
    pub fn agent_turn(&self) -> Option<ChatTurn> {
        if self.reply_text.is_empty() {
            None
        } else {
            Some(ChatTurn::new(Speaker::Agent, self.reply_text.clone()))
        }
    }
}
