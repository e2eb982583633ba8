//! Capped, most-recent-first log of completed sessions.

use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::events::{CompletionEvent, CompletionObserver};
use crate::storage::{keys, persist_json, read_json, KvStore};
use crate::timer::SessionKind;

/// Records kept; older ones are evicted.
pub const HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Pomodoro,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakType {
    Short,
    Long,
}

/// One completed session, as shown in the recent list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub emoji: String,
    pub title: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(rename = "breakType", default, skip_serializing_if = "Option::is_none")]
    pub break_type: Option<BreakType>,
    /// Local time of day, e.g. `3:07 PM`.
    pub time: String,
    pub minutes: u32,
}

impl HistoryRecord {
    pub fn new(kind: SessionKind, minutes: u32, completed_at: DateTime<Local>) -> Self {
        let (emoji, title, record_type, break_type) = match kind {
            SessionKind::Focus => ("🍅", "Focus session", RecordType::Pomodoro, None),
            SessionKind::ShortBreak => ("☕", "Short break", RecordType::Break, Some(BreakType::Short)),
            SessionKind::LongBreak => ("🌴", "Long break", RecordType::Break, Some(BreakType::Long)),
        };
        Self {
            emoji: emoji.to_string(),
            title: title.to_string(),
            record_type,
            break_type,
            time: completed_at.format("%-I:%M %p").to_string(),
            minutes,
        }
    }

    pub fn from_completion(event: &CompletionEvent) -> Self {
        Self::new(event.kind, event.minutes, event.completed_at)
    }

    /// Session kind this record describes. A break without a break type
    /// (older data) counts as a short break.
    pub fn kind(&self) -> SessionKind {
        match (self.record_type, self.break_type) {
            (RecordType::Pomodoro, _) => SessionKind::Focus,
            (RecordType::Break, Some(BreakType::Long)) => SessionKind::LongBreak,
            (RecordType::Break, _) => SessionKind::ShortBreak,
        }
    }
}

/// Owns the `recentPomodoros` sequence.
pub struct HistoryLog {
    store: Arc<dyn KvStore>,
}

impl HistoryLog {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Most recent first. Missing or corrupt data reads as empty.
    pub fn load(&self) -> Vec<HistoryRecord> {
        match read_json::<Vec<HistoryRecord>>(self.store.as_ref(), keys::RECENT_POMODOROS) {
            Ok(records) => {
                let mut records = records.unwrap_or_default();
                records.truncate(HISTORY_CAPACITY);
                records
            }
            Err(e) => {
                tracing::warn!(error = %e, "history is corrupt; treating as empty");
                Vec::new()
            }
        }
    }

    /// Prepend `entry`, evict beyond capacity and persist. Returns the log.
    pub fn record(&self, entry: HistoryRecord) -> Vec<HistoryRecord> {
        let mut records = self.load();
        records.insert(0, entry);
        records.truncate(HISTORY_CAPACITY);
        self.save(&records);
        records
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.save(&[]);
    }

    fn save(&self, records: &[HistoryRecord]) {
        persist_json(self.store.as_ref(), keys::RECENT_POMODOROS, records);
    }
}

impl CompletionObserver for HistoryLog {
    fn name(&self) -> &'static str {
        "history"
    }

    fn on_completion(&self, event: &CompletionEvent) -> Result<(), CoreError> {
        self.record(HistoryRecord::from_completion(event));
        Ok(())
    }
}
