//! Settings read/write and task enumeration collaborators, plus the
//! controller that drives [`SettingsFlow`] with them.

use crate::settings_flow::{SettingsEvent, SettingsFlow, SettingsState, Transition};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared::settings::{AppSettings, SettingsResponse};
use shared::task_types::TaskRecord;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Where settings snapshots come from and go to.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn read(&self) -> SettingsResponse;
    async fn write(&self, settings: AppSettings) -> SettingsResponse;
}

/// Enumerates background tasks that a settings change could affect.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<TaskRecord>>;
}

/// Whether tasks exist, assuming they do when the probe failed.
pub fn has_tasks_or_assume(probe: &Result<Vec<TaskRecord>>) -> bool {
    match probe {
        Ok(tasks) => !tasks.is_empty(),
        Err(_) => true,
    }
}

pub struct SettingsController<B, T> {
    backend: B,
    tasks: T,
    flow: Mutex<SettingsFlow>,
}

impl<B: SettingsBackend, T: TaskSource> SettingsController<B, T> {
    pub fn new(backend: B, tasks: T) -> Self {
        Self {
            backend,
            tasks,
            flow: Mutex::new(SettingsFlow::new()),
        }
    }

    pub fn state(&self) -> SettingsState {
        self.flow.lock().state().clone()
    }

    pub fn current(&self) -> Option<AppSettings> {
        self.flow.lock().current().cloned()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch the snapshot. Returns the resulting state.
    pub async fn load(&self) -> Result<SettingsState> {
        self.flow.lock().try_apply(SettingsEvent::LoadRequested)?;

        let response = self.backend.read().await;
        let event = if response.success {
            SettingsEvent::Loaded(response.settings.unwrap_or_default())
        } else {
            let message = failure_message(response.error);
            warn!(error = %message, "Settings load failed");
            SettingsEvent::Failed(message)
        };
        Ok(self.finish(event))
    }

    /// Start a write. Goes through confirmation when tasks exist or
    /// cannot be counted.
    pub async fn request_save(&self, value: AppSettings) -> Result<SettingsState> {
        let probe = self.tasks.list_tasks().await;
        if let Err(e) = &probe {
            warn!(error = %e, "Task enumeration failed, assuming tasks exist");
        }
        let has_tasks = has_tasks_or_assume(&probe);

        self.flow
            .lock()
            .try_apply(SettingsEvent::SaveRequested { value, has_tasks })?;

        if has_tasks {
            info!("Settings change needs confirmation");
            return Ok(self.state());
        }
        self.write_pending().await
    }

    /// Confirm a pending write and perform it.
    pub async fn confirm(&self) -> Result<SettingsState> {
        self.flow.lock().try_apply(SettingsEvent::Confirmed)?;
        self.write_pending().await
    }

    pub fn cancel(&self) -> Result<SettingsState> {
        let mut flow = self.flow.lock();
        flow.try_apply(SettingsEvent::Cancelled)?;
        Ok(flow.state().clone())
    }

    pub fn dismiss_error(&self) -> Result<SettingsState> {
        let mut flow = self.flow.lock();
        flow.try_apply(SettingsEvent::Dismissed)?;
        Ok(flow.state().clone())
    }

    async fn write_pending(&self) -> Result<SettingsState> {
        let value = self
            .flow
            .lock()
            .writing()
            .cloned()
            .ok_or_else(|| anyhow!("No settings write in progress"))?;

        let response = self.backend.write(value.clone()).await;
        let event = if response.success {
            info!("Settings saved");
            SettingsEvent::Saved(response.settings.unwrap_or(value))
        } else {
            let message = failure_message(response.error);
            warn!(error = %message, "Settings save failed");
            SettingsEvent::Failed(message)
        };
        Ok(self.finish(event))
    }

    fn finish(&self, event: SettingsEvent) -> SettingsState {
        let mut flow = self.flow.lock();
        if flow.apply(event) == Transition::Ignored {
            warn!(state = flow.state().name(), "Dropped settings response");
        }
        flow.state().clone()
    }
}

fn failure_message(error: Option<String>) -> String {
    error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "unknown error".to_string())
}

/// Settings kept in memory. Used by the CLI host and tests.
#[derive(Default)]
pub struct InMemorySettingsBackend {
    settings: Mutex<AppSettings>,
    fail_next: AtomicBool,
}

impl InMemorySettingsBackend {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Make the next read or write report failure.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> AppSettings {
        self.settings.lock().clone()
    }

    fn take_failure(&self) -> bool {
        self.fail_next.swap(false, Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsBackend for InMemorySettingsBackend {
    async fn read(&self) -> SettingsResponse {
        if self.take_failure() {
            return SettingsResponse::failed("settings store unavailable");
        }
        SettingsResponse::ok(self.snapshot())
    }

    async fn write(&self, settings: AppSettings) -> SettingsResponse {
        if self.take_failure() {
            return SettingsResponse::failed("settings store unavailable");
        }
        *self.settings.lock() = settings.clone();
        SettingsResponse::ok(settings)
    }
}

/// A fixed task list, or a probe that always fails.
pub enum StaticTaskSource {
    Tasks(Vec<TaskRecord>),
    Unavailable(String),
}

#[async_trait]
impl TaskSource for StaticTaskSource {
    async fn list_tasks(&self) -> Result<Vec<TaskRecord>> {
        match self {
            StaticTaskSource::Tasks(tasks) => Ok(tasks.clone()),
            StaticTaskSource::Unavailable(reason) => Err(anyhow!("{}", reason)),
        }
    }
}
