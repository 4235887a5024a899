//! Process-wide session state
//!
//! `SessionState` is the only owner of the four external handles. Other
//! components borrow a handle for the duration of one call and never keep it.

use crate::dialogue::DialogueClient;
use crate::hardware::Hardware;
use crate::speech::{SpeechInput, SpeechOutput};
use crate::TjBotError;

/// The four independently-initialized collaborators, in construction order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    Dialogue,
    SpeechOut,
    SpeechIn,
    Hardware,
}

impl Component {
    pub const ALL: [Component; 4] = [
        Component::Dialogue,
        Component::SpeechOut,
        Component::SpeechIn,
        Component::Hardware,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Component::Dialogue => "dialogue",
            Component::SpeechOut => "speech-out",
            Component::SpeechIn => "speech-in",
            Component::Hardware => "hardware",
        }
    }

    /// Error kind reported when this component's driver panics
    pub(crate) fn panic_error(&self) -> fn(String) -> TjBotError {
        match self {
            Component::Dialogue => TjBotError::Service,
            Component::SpeechOut | Component::SpeechIn => TjBotError::AudioDevice,
            Component::Hardware => TjBotError::Hardware,
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Aggregate lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Uninitialized,
    /// Every handle present
    Ready,
    /// At least one handle present and at least one absent
    PartiallyReady,
    Shutdown,
    /// No handle present after an initialization attempt
    Failed,
}

impl SessionStatus {
    /// Status implied by how many of the four handles are present
    pub fn from_present(present: usize) -> Self {
        match present {
            0 => SessionStatus::Failed,
            n if n == Component::ALL.len() => SessionStatus::Ready,
            _ => SessionStatus::PartiallyReady,
        }
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, SessionStatus::Ready | SessionStatus::PartiallyReady)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Uninitialized => write!(f, "UNINITIALIZED"),
            SessionStatus::Ready => write!(f, "READY"),
            SessionStatus::PartiallyReady => write!(f, "PARTIALLY_READY"),
            SessionStatus::Shutdown => write!(f, "SHUTDOWN"),
            SessionStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// What happened to one component during `initialize`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComponentOutcome {
    Ready,
    Failed(TjBotError),
    /// Construction was not attempted
    Skipped(String),
}

impl ComponentOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ComponentOutcome::Ready)
    }
}

impl std::fmt::Display for ComponentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentOutcome::Ready => write!(f, "success"),
            ComponentOutcome::Failed(e) => write!(f, "failure: {}", e),
            ComponentOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentResult {
    pub component: Component,
    pub outcome: ComponentOutcome,
}

/// Result of one `initialize` call, for display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitReport {
    pub status: SessionStatus,
    pub components: Vec<ComponentResult>,
}

impl InitReport {
    pub fn outcome(&self, component: Component) -> Option<&ComponentOutcome> {
        self.components
            .iter()
            .find(|r| r.component == component)
            .map(|r| &r.outcome)
    }

    pub fn is_ready(&self, component: Component) -> bool {
        self.outcome(component).is_some_and(|o| o.is_ready())
    }
}

/// Exclusive owner of the external handles
#[derive(Default)]
pub struct SessionState {
    pub(crate) dialogue: Option<Box<dyn DialogueClient>>,
    pub(crate) speech_out: Option<Box<dyn SpeechOutput>>,
    pub(crate) speech_in: Option<Box<dyn SpeechInput>>,
    pub(crate) hardware: Option<Box<dyn Hardware>>,
    pub(crate) status: SessionStatus,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn has(&self, component: Component) -> bool {
        match component {
            Component::Dialogue => self.dialogue.is_some(),
            Component::SpeechOut => self.speech_out.is_some(),
            Component::SpeechIn => self.speech_in.is_some(),
            Component::Hardware => self.hardware.is_some(),
        }
    }

    pub fn present_count(&self) -> usize {
        Component::ALL.iter().filter(|c| self.has(**c)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }

    pub fn dialogue(&self) -> Option<&dyn DialogueClient> {
        self.dialogue.as_deref()
    }

    pub fn speech_out(&self) -> Option<&dyn SpeechOutput> {
        self.speech_out.as_deref()
    }

    pub fn speech_in_mut(&mut self) -> Option<&mut (dyn SpeechInput + 'static)> {
        self.speech_in.as_deref_mut()
    }

    pub fn hardware_mut(&mut self) -> Option<&mut (dyn Hardware + 'static)> {
        self.hardware.as_deref_mut()
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("status", &self.status)
            .field("dialogue", &self.dialogue.is_some())
            .field("speech_out", &self.speech_out.is_some())
            .field("speech_in", &self.speech_in.is_some())
            .field("hardware", &self.hardware.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::SimulatedHardware;

    #[test]
    fn test_status_from_present() {
        assert_eq!(SessionStatus::from_present(0), SessionStatus::Failed);
        assert_eq!(SessionStatus::from_present(2), SessionStatus::PartiallyReady);
        assert_eq!(SessionStatus::from_present(4), SessionStatus::Ready);
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = SessionState::new();
        assert_eq!(state.status(), SessionStatus::Uninitialized);
        assert!(state.is_empty());
        assert!(!state.status().is_operational());
    }

    #[test]
    fn test_has_tracks_handles() {
        let mut state = SessionState::new();
        state.hardware = Some(Box::new(SimulatedHardware::new()));
        assert!(state.has(Component::Hardware));
        assert!(!state.has(Component::Dialogue));
        assert_eq!(state.present_count(), 1);
        assert!(state.hardware_mut().is_some());
    }

    #[test]
    fn test_report_lookup() {
        let report = InitReport {
            status: SessionStatus::PartiallyReady,
            components: vec![
                ComponentResult {
                    component: Component::Dialogue,
                    outcome: ComponentOutcome::Ready,
                },
                ComponentResult {
                    component: Component::Hardware,
                    outcome: ComponentOutcome::Failed(TjBotError::Hardware("busy".into())),
                },
            ],
        };
        assert!(report.is_ready(Component::Dialogue));
        assert!(!report.is_ready(Component::Hardware));
        assert_eq!(
            report.outcome(Component::Hardware).unwrap().to_string(),
            "failure: Hardware error: busy"
        );
        assert!(report.outcome(Component::SpeechIn).is_none());
    }
}
