//! The caller-facing robot: session lifecycle plus turn handling
//!
//! Text turn: dialogue `converse` -> dispatcher.
//! Voice turn: `listen` yields a `LISTEN` record and, when something was
//! heard, a transcript the caller passes to `dispatch`.

use crate::dispatch::{
    Action, ActionRecord, IntentDispatcher, ListenOutcome, TurnOutcome, VoiceOutcome,
};
use crate::integration::config::TjBotConfig;
use crate::session::manager::guarded;
use crate::session::{
    CloudHandleFactory, Component, ComponentOutcome, ComponentResult, HandleFactory, InitReport,
    SessionManager, SessionStatus,
};
use crate::{Result, TjBotError};
use std::time::Duration;
use tracing::{debug, info, warn};

const SELF_TEST_PHRASE: &str = "Hello, I am TJBot. All systems go.";
const SELF_TEST_UTTERANCE: &str = "hello";

pub struct Companion {
    session: SessionManager,
    dispatcher: IntentDispatcher,
}

impl Companion {
    pub fn new(config: TjBotConfig, factory: Box<dyn HandleFactory>) -> Self {
        Self {
            session: SessionManager::new(config, factory),
            dispatcher: IntentDispatcher::new(),
        }
    }

    /// Companion backed by the cloud services and the configured hardware
    pub fn with_cloud(config: TjBotConfig) -> Self {
        Self::new(config, Box::new(CloudHandleFactory::new()))
    }

    pub fn config(&self) -> &TjBotConfig {
        self.session.config()
    }

    pub fn initialize(&mut self) -> InitReport {
        self.session.initialize()
    }

    pub fn shutdown(&mut self) -> SessionStatus {
        self.session.shutdown()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn has(&self, component: Component) -> bool {
        self.session.state().has(component)
    }

    /// Send one user utterance through the dialogue service and act on it
    pub fn dispatch(&mut self, utterance: &str) -> Result<TurnOutcome> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(TjBotError::InvalidInput("empty utterance".into()));
        }

        let dialogue = self
            .session
            .state()
            .dialogue()
            .ok_or_else(|| TjBotError::Unavailable("dialogue service".into()))?;
        let result = dialogue.converse(utterance).map_err(|e| {
            warn!("Dialogue call failed: {}", e);
            e
        })?;
        debug!("Top intent: {:?}", result.top_intent);

        Ok(self.dispatcher.dispatch(self.session.state_mut(), &result))
    }

    /// Record for `seconds` (or the configured length) and transcribe.
    ///
    /// Silence is a successful `Listen` with no transcript.
    pub fn listen(&mut self, seconds: Option<u32>) -> ListenOutcome {
        let mut record = ActionRecord::listen();
        let transcript = match self.capture(seconds) {
            Ok(transcript) => transcript,
            Err(e) => {
                warn!("Listening failed: {}", e);
                record.fail(e.to_string());
                None
            }
        };
        record.parameter = transcript.clone();
        ListenOutcome { transcript, record }
    }

    fn capture(&mut self, seconds: Option<u32>) -> Result<Option<String>> {
        let seconds = seconds.unwrap_or(self.config().speech_in.record_seconds);
        if seconds == 0 {
            return Err(TjBotError::InvalidInput(
                "recording length must be positive".into(),
            ));
        }

        let speech_in = self
            .session
            .state_mut()
            .speech_in_mut()
            .ok_or_else(|| TjBotError::Unavailable("speech input".into()))?;

        info!("Listening for {}s", seconds);
        let duration = Duration::from_secs(u64::from(seconds));
        match guarded("listen", TjBotError::AudioDevice, || speech_in.listen(duration)) {
            Ok(transcript) => Ok(Some(transcript)),
            Err(e) if e.is_silent() => {
                info!("Nothing heard");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Forget what the dialogue service remembers about this conversation
    pub fn clear_context(&self) {
        if let Some(dialogue) = self.session.state().dialogue() {
            dialogue.reset_context();
        }
    }

    /// Run one command directly, without the dialogue service
    pub fn perform(&mut self, action: Action) -> ActionRecord {
        info!("Manual command: {:?}", action);
        self.dispatcher
            .execute(self.session.state_mut(), &action, None)
    }

    /// Exercise every present handle once. Session status is left as is.
    pub fn self_test(&mut self) -> Vec<ComponentResult> {
        Component::ALL
            .iter()
            .map(|&component| ComponentResult {
                component,
                outcome: self.test_component(component),
            })
            .collect()
    }

    fn test_component(&mut self, component: Component) -> ComponentOutcome {
        let state = self.session.state_mut();
        if !state.has(component) {
            return ComponentOutcome::Skipped("not initialized".into());
        }

        let result = match component {
            Component::Hardware => match state.hardware_mut() {
                Some(hardware) => guarded("hardware self-test", TjBotError::Hardware, || {
                    hardware.wave()?;
                    hardware.set_color("red")?;
                    hardware.set_color("off")
                }),
                None => Err(TjBotError::Unavailable("hardware".into())),
            },
            Component::SpeechOut => {
                let record =
                    self.dispatcher
                        .execute(state, &Action::Speak(SELF_TEST_PHRASE.into()), None);
                match record.voice {
                    VoiceOutcome::Spoken => Ok(()),
                    _ => Err(TjBotError::Service(
                        record.error_detail.unwrap_or_else(|| "speech failed".into()),
                    )),
                }
            }
            Component::Dialogue => match state.dialogue() {
                Some(dialogue) => guarded("dialogue self-test", TjBotError::Service, || {
                    dialogue.converse(SELF_TEST_UTTERANCE)
                })
                .map(|_| ()),
                None => Err(TjBotError::Unavailable("dialogue service".into())),
            },
            // Recording would block for seconds; presence is enough
            Component::SpeechIn => Ok(()),
        };

        match result {
            Ok(()) => ComponentOutcome::Ready,
            Err(e) => {
                warn!("{} self-test failed: {}", component, e);
                ComponentOutcome::Failed(e)
            }
        }
    }
}
