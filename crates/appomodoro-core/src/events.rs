use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::storage::AlarmSound;
use crate::timer::{Phase, SessionKind};

/// Payload delivered to every [`CompletionObserver`] when a session runs
/// down to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub kind: SessionKind,
    pub minutes: u32,
    pub completed_at: DateTime<Local>,
    /// Kind the machine switched to, idle at full duration.
    pub next_kind: SessionKind,
    /// Focus completions today, after this one.
    pub completed_today: u32,
    pub alarm_sound: AlarmSound,
    pub notifications_enabled: bool,
}

/// Reacts to session completions.
///
/// Observers run synchronously inside the completing tick, in subscription
/// order. An error is logged and the remaining observers still run; the
/// state transition has already been applied.
pub trait CompletionObserver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn on_completion(&self, event: &CompletionEvent) -> Result<(), CoreError>;
}

/// Every state change of the session machine produces an Event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    TimerStarted {
        kind: SessionKind,
        remaining_secs: u32,
        at: DateTime<Local>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Local>,
    },
    TimerResumed {
        remaining_secs: u32,
        at: DateTime<Local>,
    },
    /// Progress discarded; back to an idle Focus session.
    TimerStopped {
        at: DateTime<Local>,
    },
    /// Focus abandoned early for the break it would have earned.
    SwitchedToBreak {
        kind: SessionKind,
        duration_secs: u32,
        at: DateTime<Local>,
    },
    /// Break skipped; the cycle still advances.
    BreakSkipped {
        skipped: SessionKind,
        completed_today: u32,
        at: DateTime<Local>,
    },
    SessionCompleted(CompletionEvent),
    StateSnapshot {
        kind: SessionKind,
        label: String,
        phase: Phase,
        remaining_secs: u32,
        total_secs: u32,
        display: String,
        completed_today: u32,
        at: DateTime<Local>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 15, 7, 0).unwrap()
    }

    #[test]
    fn events_are_tagged_with_camel_case_fields() {
        let event = Event::BreakSkipped {
            skipped: SessionKind::LongBreak,
            completed_today: 4,
            at: at(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "BreakSkipped");
        assert_eq!(json["skipped"], "longBreak");
        assert_eq!(json["completedToday"], 4);
    }

    #[test]
    fn completion_is_wrapped_with_its_tag() {
        let done = CompletionEvent {
            kind: SessionKind::Focus,
            minutes: 25,
            completed_at: at(),
            next_kind: SessionKind::ShortBreak,
            completed_today: 1,
            alarm_sound: AlarmSound::Chimes,
            notifications_enabled: false,
        };
        let json = serde_json::to_value(Event::SessionCompleted(done.clone())).unwrap();
        assert_eq!(json["type"], "SessionCompleted");
        assert_eq!(json["nextKind"], "shortBreak");
        assert_eq!(json["alarmSound"], "chimes");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, Event::SessionCompleted(done));
    }
}
