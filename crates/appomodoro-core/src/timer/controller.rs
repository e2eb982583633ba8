use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use super::clock::{SessionClock, SharedMachine};
use super::engine::SessionMachine;
use super::session::Session;
use crate::error::TransitionError;
use crate::events::Event;
use crate::storage::Settings;

/// Owns a session machine together with the clock that drives it.
///
/// Every command goes through here so the clock is armed exactly while the
/// session is running. Commands that leave the running state disarm the
/// clock while still holding the machine lock.
pub struct FocusTimer {
    machine: SharedMachine,
    clock: SessionClock,
}

impl FocusTimer {
    pub fn new(machine: SessionMachine, period: Duration) -> Self {
        Self {
            machine: Arc::new(Mutex::new(machine)),
            clock: SessionClock::new(period),
        }
    }

    /// Handle for read-only access (snapshots, saving).
    pub fn machine(&self) -> SharedMachine {
        Arc::clone(&self.machine)
    }

    pub async fn session(&self) -> Session {
        *self.machine.lock().await.session()
    }

    pub async fn snapshot(&self) -> Event {
        self.machine.lock().await.snapshot()
    }

    pub fn is_ticking(&self) -> bool {
        self.clock.is_armed()
    }

    /// # Errors
    /// Rejects a session with no time left.
    pub async fn start(&mut self) -> Result<Option<Event>, TransitionError> {
        let mut guard = self.machine.lock().await;
        let event = guard.start()?;
        self.clock.start_locked(&guard, &self.machine);
        Ok(event)
    }

    pub async fn pause(&mut self) -> Option<Event> {
        let mut guard = self.machine.lock().await;
        let event = guard.pause();
        if event.is_some() {
            self.clock.stop();
        }
        event
    }

    /// # Errors
    /// Rejects a session with no time left.
    pub async fn resume(&mut self) -> Result<Option<Event>, TransitionError> {
        let mut guard = self.machine.lock().await;
        let event = guard.resume()?;
        self.clock.start_locked(&guard, &self.machine);
        Ok(event)
    }

    /// # Errors
    /// Rejects resuming a session with no time left.
    pub async fn toggle_pause(&mut self) -> Result<Option<Event>, TransitionError> {
        let mut guard = self.machine.lock().await;
        let event = guard.toggle_pause()?;
        if guard.session().is_running() {
            self.clock.start_locked(&guard, &self.machine);
        } else {
            self.clock.stop();
        }
        Ok(event)
    }

    /// Disarms the clock before the machine resets, so no tick can land on
    /// the superseded session.
    pub async fn stop(&mut self) -> Event {
        let mut guard = self.machine.lock().await;
        self.clock.stop();
        guard.stop()
    }

    /// # Errors
    /// Only valid during a Focus session; the clock keeps running otherwise.
    pub async fn switch_to_break(&mut self) -> Result<Event, TransitionError> {
        let mut guard = self.machine.lock().await;
        let event = guard.switch_to_break()?;
        self.clock.stop();
        Ok(event)
    }

    /// # Errors
    /// Only valid during a break; the clock keeps running otherwise.
    pub async fn skip_break(&mut self) -> Result<Event, TransitionError> {
        let mut guard = self.machine.lock().await;
        let event = guard.skip_break()?;
        self.clock.stop();
        Ok(event)
    }

    /// Apply settings re-read on refocus. Does not touch a running
    /// countdown.
    pub async fn reload_settings(&mut self, settings: Settings) {
        self.machine.lock().await.reload_settings(settings);
    }
}
