//! Session lifecycle: bring the four handles up and down as a unit

use super::state::{
    Component, ComponentOutcome, ComponentResult, InitReport, SessionState, SessionStatus,
};
use crate::dialogue::DialogueClient;
use crate::hardware::Hardware;
use crate::integration::config::TjBotConfig;
use crate::speech::{SpeechInput, SpeechOutput};
use crate::{Result, TjBotError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

/// Constructs the production (or test) handle for each component
pub trait HandleFactory {
    fn dialogue(&self, config: &TjBotConfig) -> Result<Box<dyn DialogueClient>>;
    fn speech_out(&self, config: &TjBotConfig) -> Result<Box<dyn SpeechOutput>>;
    fn speech_in(&self, config: &TjBotConfig) -> Result<Box<dyn SpeechInput>>;
    fn hardware(&self, config: &TjBotConfig) -> Result<Box<dyn Hardware>>;
}

/// Run one handle operation, converting a panic into the error `to_error` builds.
///
/// Keeps a misbehaving driver inside its own component.
pub(crate) fn guarded<T>(
    what: &str,
    to_error: fn(String) -> TjBotError,
    op: impl FnOnce() -> Result<T>,
) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(op)) {
        Ok(result) => result,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("{} panicked: {}", what, reason);
            Err(to_error(format!("{} panicked: {}", what, reason)))
        }
    }
}

/// Owns `SessionState` and is the only place handles are created or dropped
pub struct SessionManager {
    config: TjBotConfig,
    factory: Box<dyn HandleFactory>,
    state: SessionState,
}

impl SessionManager {
    pub fn new(config: TjBotConfig, factory: Box<dyn HandleFactory>) -> Self {
        Self {
            config,
            factory,
            state: SessionState::new(),
        }
    }

    pub fn config(&self) -> &TjBotConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// Construct every handle in order: dialogue, speech-out, speech-in, hardware.
    ///
    /// Handles from a previous call are torn down first. Missing credentials
    /// are checked before anything is built and leave the session `Failed`.
    pub fn initialize(&mut self) -> InitReport {
        if !self.state.is_empty() {
            info!("Re-initializing: releasing existing handles");
            release_handles(&mut self.state);
        }

        let missing = self.config.missing_credentials();
        if !missing.is_empty() {
            return self.fail_configuration(&missing);
        }

        let mut components = Vec::with_capacity(Component::ALL.len());
        for component in Component::ALL {
            let outcome = match self.construct(component) {
                Ok(()) => {
                    info!("{} ready", component);
                    ComponentOutcome::Ready
                }
                Err(e) => {
                    warn!("{} failed to initialize: {}", component, e);
                    ComponentOutcome::Failed(e)
                }
            };
            components.push(ComponentResult { component, outcome });
        }

        self.state.status = SessionStatus::from_present(self.state.present_count());
        info!("Session {}", self.state.status);

        InitReport {
            status: self.state.status,
            components,
        }
    }

    fn construct(&mut self, component: Component) -> Result<()> {
        let config = &self.config;
        let factory = self.factory.as_ref();
        let label = format!("{} construction", component);
        let to_error = component.panic_error();
        match component {
            Component::Dialogue => {
                self.state.dialogue = Some(guarded(&label, to_error, || factory.dialogue(config))?);
            }
            Component::SpeechOut => {
                self.state.speech_out =
                    Some(guarded(&label, to_error, || factory.speech_out(config))?);
            }
            Component::SpeechIn => {
                self.state.speech_in =
                    Some(guarded(&label, to_error, || factory.speech_in(config))?);
            }
            Component::Hardware => {
                self.state.hardware = Some(guarded(&label, to_error, || factory.hardware(config))?);
            }
        }
        Ok(())
    }

    fn fail_configuration(&mut self, missing: &[(Component, &'static str)]) -> InitReport {
        let components = Component::ALL
            .iter()
            .map(|&component| {
                let fields: Vec<&str> = missing
                    .iter()
                    .filter(|(c, _)| *c == component)
                    .map(|(_, field)| *field)
                    .collect();
                let outcome = if fields.is_empty() {
                    ComponentOutcome::Skipped("configuration incomplete".to_string())
                } else {
                    ComponentOutcome::Failed(TjBotError::Configuration(format!(
                        "missing {}",
                        fields.join(", ")
                    )))
                };
                ComponentResult { component, outcome }
            })
            .collect();

        error!(
            "Missing credentials: {}",
            missing
                .iter()
                .map(|(c, f)| format!("{}.{}", c, f))
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.state.status = SessionStatus::Failed;
        InitReport {
            status: SessionStatus::Failed,
            components,
        }
    }

    /// Best-effort teardown. Always ends in `Shutdown` with every slot empty.
    pub fn shutdown(&mut self) -> SessionStatus {
        if self.state.is_empty() {
            debug!("Shutdown with no handles present");
        } else {
            info!("Shutting down session");
            release_handles(&mut self.state);
        }
        self.state.status = SessionStatus::Shutdown;
        self.state.status
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if !self.state.is_empty() {
            release_handles(&mut self.state);
        }
    }
}

/// Idle pose, release the pins, stop the microphone, then drop everything.
///
/// Each step is attempted even if the one before it failed.
fn release_handles(state: &mut SessionState) {
    if let Some(mut hardware) = state.hardware.take() {
        let hw = hardware.as_mut();
        let to_error = Component::Hardware.panic_error();
        log_step("LED off", guarded("LED off", to_error, || hw.set_color("off")));
        log_step("lower arm", guarded("lower arm", to_error, || hw.lower_arm()));
        log_step(
            "hardware release",
            guarded("hardware release", to_error, || hw.release()),
        );
    }

    if let Some(mut speech_in) = state.speech_in.take() {
        let sin = speech_in.as_mut();
        let to_error = Component::SpeechIn.panic_error();
        log_step(
            "stop capture",
            guarded("stop capture", to_error, || sin.stop_capture()),
        );
    }

    state.dialogue = None;
    state.speech_out = None;
}

fn log_step(step: &str, result: Result<()>) {
    match result {
        Ok(()) => debug!("{}: ok", step),
        Err(e) => warn!("{} failed: {}", step, e),
    }
}
