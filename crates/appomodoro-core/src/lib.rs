//! # Appomodoro Core Library
//!
//! Business logic for the Appomodoro focus timer: timed Focus / Short
//! Break / Long Break sessions, user-configurable durations, a capped
//! history of completed sessions and weekly statistics. Screens, audio and
//! notification delivery are collaborators behind traits.
//!
//! ## Architecture
//!
//! - **Session machine**: a tick-driven state machine that owns the live
//!   session and the daily completion counter
//! - **Session clock**: a tokio task ticking the machine once per second
//!   while it runs
//! - **Observers**: completion events fan out to history, weekly stats,
//!   alarm and notification observers
//! - **Storage**: a string key/value port with SQLite, in-memory and
//!   write-behind implementations; TOML runtime configuration
//!
//! ## Key Components
//!
//! - [`SessionMachine`]: session state machine
//! - [`FocusTimer`]: machine plus clock, the lifecycle owner
//! - [`SettingsStore`]: durations and preferences
//! - [`HistoryLog`]: recent completions
//! - [`WeeklyStatsAggregator`]: totals, weekday histogram and streak

pub mod app;
pub mod error;
pub mod events;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use app::Appomodoro;
pub use error::{ConfigError, CoreError, StorageError, TransitionError, ValidationError};
pub use events::{CompletionEvent, CompletionObserver, Event};
pub use notify::{AlarmObserver, AlarmPlayer, NotificationObserver, Notifier, SessionHint};
pub use stats::{HistoryLog, HistoryRecord, WeeklyStats, WeeklyStatsAggregator};
pub use storage::{
    AlarmSound, AppConfig, Database, KvStore, MemoryStore, Settings, SettingsStore, WriteBehind,
};
pub use task::{Task, TaskList};
pub use timer::{
    CompletionCounter, FocusTimer, Phase, Session, SessionClock, SessionKind, SessionMachine,
};
