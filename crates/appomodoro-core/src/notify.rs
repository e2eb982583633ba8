//! Audio and notification collaborators.
//!
//! The core never plays sounds or shows notifications itself. It calls
//! these traits through completion observers, so a failing or missing
//! collaborator cannot affect the session transition.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::events::{CompletionEvent, CompletionObserver};
use crate::storage::AlarmSound;
use crate::timer::SessionKind;

/// What just finished, as far as the notification text is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionHint {
    Work,
    Break,
}

impl From<SessionKind> for SessionHint {
    fn from(kind: SessionKind) -> Self {
        if kind.is_break() {
            SessionHint::Break
        } else {
            SessionHint::Work
        }
    }
}

pub trait AlarmPlayer: Send + Sync {
    fn play_alarm(&self, sound: AlarmSound) -> Result<(), CoreError>;
    fn stop_alarm(&self) -> Result<(), CoreError>;
}

pub trait Notifier: Send + Sync {
    fn notify_times_up(&self, hint: SessionHint) -> Result<(), CoreError>;
}

/// Plays the configured alarm on every completion.
pub struct AlarmObserver {
    player: Arc<dyn AlarmPlayer>,
}

impl AlarmObserver {
    pub fn new(player: Arc<dyn AlarmPlayer>) -> Self {
        Self { player }
    }
}

impl CompletionObserver for AlarmObserver {
    fn name(&self) -> &'static str {
        "alarm"
    }

    fn on_completion(&self, event: &CompletionEvent) -> Result<(), CoreError> {
        self.player.play_alarm(event.alarm_sound)
    }
}

/// Sends "time's up" when notifications are enabled.
pub struct NotificationObserver {
    notifier: Arc<dyn Notifier>,
}

impl NotificationObserver {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

impl CompletionObserver for NotificationObserver {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn on_completion(&self, event: &CompletionEvent) -> Result<(), CoreError> {
        if !event.notifications_enabled {
            return Ok(());
        }
        self.notifier.notify_times_up(event.kind.into())
    }
}
