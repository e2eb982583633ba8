//! Focus/break totals, per-weekday focus counts and the day streak.
//!
//! `daily` is an all-time weekday histogram: it is never zeroed at a week
//! boundary.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::events::{CompletionEvent, CompletionObserver};
use crate::storage::{keys, persist_json, read_json, KvStore};
use crate::timer::SessionKind;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStats {
    #[serde(rename = "focused", default)]
    pub focused_minutes: u32,
    #[serde(rename = "breaks", default)]
    pub break_minutes: u32,
    #[serde(rename = "streak", default)]
    pub streak_days: u32,
    /// Focus completions per weekday, index 0 = Sunday.
    #[serde(default)]
    pub daily: [u32; 7],
    #[serde(rename = "lastActive", default)]
    pub last_active: Option<NaiveDate>,
}

impl WeeklyStats {
    /// Fold one completion into the aggregate.
    pub fn apply(&mut self, kind: SessionKind, minutes: u32, date: NaiveDate) {
        if kind == SessionKind::Focus {
            self.focused_minutes = self.focused_minutes.saturating_add(minutes);
            let day = date.weekday().num_days_from_sunday() as usize;
            self.daily[day] = self.daily[day].saturating_add(1);
        } else {
            self.break_minutes = self.break_minutes.saturating_add(minutes);
        }

        match self.last_active {
            None => {
                self.streak_days = 1;
                self.last_active = Some(date);
            }
            Some(last) => {
                let gap = (date - last).num_days();
                match gap {
                    1 => self.streak_days = self.streak_days.saturating_add(1),
                    g if g > 1 => self.streak_days = 1,
                    _ => {}
                }
                // A completion dated before the last active day (clock
                // skew) must not move the marker backwards.
                if gap >= 0 {
                    self.last_active = Some(date);
                }
            }
        }
    }

    /// Weekday label with the most focus sessions, if any were recorded.
    pub fn busiest_day(&self) -> Option<&'static str> {
        let (index, count) = self
            .daily
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))?;
        (*count > 0).then_some(WEEKDAY_LABELS[index])
    }

    pub fn total_focus_sessions(&self) -> u32 {
        self.daily.iter().sum()
    }
}

/// Owns the `weeklyStats` aggregate.
pub struct WeeklyStatsAggregator {
    store: Arc<dyn KvStore>,
}

impl WeeklyStatsAggregator {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Missing or corrupt data reads as all zeros.
    pub fn load(&self) -> WeeklyStats {
        read_json(self.store.as_ref(), keys::WEEKLY_STATS)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "weekly stats are corrupt; starting from zero");
                None
            })
            .unwrap_or_default()
    }

    /// Apply one completion and persist. Returns the updated aggregate.
    pub fn record_completion(&self, kind: SessionKind, minutes: u32, date: NaiveDate) -> WeeklyStats {
        let mut stats = self.load();
        stats.apply(kind, minutes, date);
        self.save(&stats);
        stats
    }

    /// Back to all zeros.
    pub fn reset(&self) {
        self.save(&WeeklyStats::default());
    }

    fn save(&self, stats: &WeeklyStats) {
        persist_json(self.store.as_ref(), keys::WEEKLY_STATS, stats);
    }
}

impl CompletionObserver for WeeklyStatsAggregator {
    fn name(&self) -> &'static str {
        "weekly-stats"
    }

    fn on_completion(&self, event: &CompletionEvent) -> Result<(), CoreError> {
        self.record_completion(event.kind, event.minutes, event.completed_at.date_naive());
        Ok(())
    }
}
