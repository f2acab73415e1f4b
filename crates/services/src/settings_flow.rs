//! State machine behind the settings card.
//!
//! The card loads a snapshot, lets the user edit it, and writes it back.
//! When background tasks may be affected by a change the write waits for
//! an explicit confirmation first. Every transition is driven by a
//! [`SettingsEvent`]; events that make no sense in the current state are
//! ignored and leave the state untouched.

use shared::settings::{AppSettings, SettingsError};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsState {
    Idle,
    Loading,
    Saving,
    /// A write is waiting for the user to confirm it.
    AwaitingConfirmation { pending: AppSettings },
    Error { message: String },
}

impl SettingsState {
    pub fn name(&self) -> &'static str {
        match self {
            SettingsState::Idle => "idle",
            SettingsState::Loading => "loading",
            SettingsState::Saving => "saving",
            SettingsState::AwaitingConfirmation { .. } => "awaiting confirmation",
            SettingsState::Error { .. } => "error",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, SettingsState::Loading | SettingsState::Saving)
    }
}

impl fmt::Display for SettingsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsState::Error { message } => write!(f, "error: {}", message),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEvent {
    LoadRequested,
    Loaded(AppSettings),
    SaveRequested { value: AppSettings, has_tasks: bool },
    Confirmed,
    Cancelled,
    Saved(AppSettings),
    Failed(String),
    Dismissed,
}

impl SettingsEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SettingsEvent::LoadRequested => "load",
            SettingsEvent::Loaded(_) => "finish loading",
            SettingsEvent::SaveRequested { .. } => "save",
            SettingsEvent::Confirmed => "confirm",
            SettingsEvent::Cancelled => "cancel",
            SettingsEvent::Saved(_) => "finish saving",
            SettingsEvent::Failed(_) => "fail",
            SettingsEvent::Dismissed => "dismiss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct SettingsFlow {
    state: SettingsState,
    current: Option<AppSettings>,
    /// Value being written while in `Saving`
    writing: Option<AppSettings>,
    /// Id of the outstanding load/save request
    request_id: Option<Uuid>,
}

impl Default for SettingsFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsFlow {
    pub fn new() -> Self {
        Self {
            state: SettingsState::Idle,
            current: None,
            writing: None,
            request_id: None,
        }
    }

    pub fn state(&self) -> &SettingsState {
        &self.state
    }

    /// Last snapshot confirmed by a load or save.
    pub fn current(&self) -> Option<&AppSettings> {
        self.current.as_ref()
    }

    pub fn writing(&self) -> Option<&AppSettings> {
        self.writing.as_ref()
    }

    pub fn request_id(&self) -> Option<Uuid> {
        self.request_id
    }

    /// Like [`apply`](Self::apply) but reports an ignored event as an error.
    pub fn try_apply(&mut self, event: SettingsEvent) -> Result<(), SettingsError> {
        let event_name = event.name();
        let state_name = self.state.name();
        match self.apply(event) {
            Transition::Moved => Ok(()),
            Transition::Ignored => Err(SettingsError::InvalidTransition {
                event: event_name.to_string(),
                state: state_name.to_string(),
            }),
        }
    }

    pub fn apply(&mut self, event: SettingsEvent) -> Transition {
        use SettingsEvent as E;
        use SettingsState as S;

        let from = self.state.name();
        let event_name = event.name();
        let state = std::mem::replace(&mut self.state, S::Idle);

        let next = match (state, event) {
            (S::Idle | S::Error { .. }, E::LoadRequested) => {
                self.request_id = Some(Uuid::new_v4());
                S::Loading
            }
            (S::Loading, E::Loaded(settings)) => {
                self.current = Some(settings);
                self.request_id = None;
                S::Idle
            }
            (S::Idle | S::Error { .. }, E::SaveRequested { value, has_tasks: true }) => {
                S::AwaitingConfirmation { pending: value }
            }
            (S::Idle | S::Error { .. }, E::SaveRequested { value, has_tasks: false }) => {
                self.begin_write(value);
                S::Saving
            }
            (S::AwaitingConfirmation { pending }, E::Confirmed) => {
                self.begin_write(pending);
                S::Saving
            }
            (S::AwaitingConfirmation { .. }, E::Cancelled) => S::Idle,
            (S::Saving, E::Saved(settings)) => {
                self.current = Some(settings);
                self.writing = None;
                self.request_id = None;
                S::Idle
            }
            (S::Loading | S::Saving, E::Failed(message)) => {
                self.writing = None;
                self.request_id = None;
                S::Error { message }
            }
            (S::Error { .. }, E::Dismissed) => S::Idle,
            (state, _) => {
                debug!(state = from, event = event_name, "Ignoring settings event");
                self.state = state;
                return Transition::Ignored;
            }
        };

        debug!(
            from,
            to = next.name(),
            event = event_name,
            request_id = ?self.request_id,
            "Settings state changed"
        );
        self.state = next;
        Transition::Moved
    }

    fn begin_write(&mut self, value: AppSettings) {
        self.writing = Some(value);
        self.request_id = Some(Uuid::new_v4());
    }
}
