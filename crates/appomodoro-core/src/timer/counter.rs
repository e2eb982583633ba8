//! Daily count of completed Focus sessions.
//!
//! The count belongs to one calendar day (device-local). The first load or
//! increment on a later day resets it to zero and moves the stored date to
//! today before anything else happens.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::storage::{keys, persist, read, KvStore};

pub struct CompletionCounter {
    store: Arc<dyn KvStore>,
    count: u32,
    day: NaiveDate,
}

impl CompletionCounter {
    /// Load the persisted counter, resetting it if it belongs to another day.
    pub fn load(store: Arc<dyn KvStore>, today: NaiveDate) -> Self {
        let count = read(store.as_ref(), keys::POMODORO_COUNT)
            .and_then(|raw| match raw.trim().parse::<u32>() {
                Ok(n) => Some(n),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "unparsable completion count");
                    None
                }
            })
            .unwrap_or(0);
        let day = read(store.as_ref(), keys::LAST_POMODORO_DATE)
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), keys::DATE_FORMAT).ok());

        let mut counter = Self {
            store,
            count,
            day: day.unwrap_or(today),
        };
        if day != Some(today) {
            counter.reset(today);
        }
        counter
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Day the current count belongs to.
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// Reset if `today` is a different day. Returns whether it reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.day == today {
            return false;
        }
        self.reset(today);
        true
    }

    /// Count one more Focus completion on `today`. Returns the new count.
    pub fn increment(&mut self, today: NaiveDate) -> u32 {
        self.roll_over(today);
        self.count = self.count.saturating_add(1);
        persist(
            self.store.as_ref(),
            keys::POMODORO_COUNT,
            &self.count.to_string(),
        );
        self.count
    }

    fn reset(&mut self, today: NaiveDate) {
        tracing::debug!(previous = self.count, %today, "resetting daily completion count");
        self.count = 0;
        self.day = today;
        persist(self.store.as_ref(), keys::POMODORO_COUNT, "0");
        persist(
            self.store.as_ref(),
            keys::LAST_POMODORO_DATE,
            &today.format(keys::DATE_FORMAT).to_string(),
        );
    }
}

impl std::fmt::Debug for CompletionCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionCounter")
            .field("count", &self.count)
            .field("day", &self.day)
            .finish()
    }
}
