//! Statistics derived from completed sessions.
//!
//! Both components here are completion observers: subscribe them to the
//! session machine and they keep their own persisted state current.

mod history;
mod weekly;

pub use history::{BreakType, HistoryLog, HistoryRecord, RecordType, HISTORY_CAPACITY};
pub use weekly::{WeeklyStats, WeeklyStatsAggregator, WEEKDAY_LABELS};
