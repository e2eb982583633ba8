//! Core error types for appomodoro-core.
//!
//! Every failure in the core falls into one of four families:
//! validation (user input out of range), storage (read/write against the
//! persistence port), transition (a caller broke the state machine
//! contract) and configuration (the TOML runtime config). None of them are
//! fatal to the process.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::{Phase, SessionKind};

/// Core error type for appomodoro-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Setting or input value rejected before any state change
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence port failures
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// State machine contract violations
    #[error("Invalid transition: {0}")]
    Transition(#[from] TransitionError),

    /// Runtime configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Validation errors. The message is meant to be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Duration setting outside its closed range
    #[error("{field} must be between {min} and {max} minutes (got {value})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Alarm sound id not in the known set
    #[error("Unknown alarm sound '{0}' (expected classic, chimes or waves)")]
    UnknownSound(String),

    /// Task titles must contain something other than whitespace
    #[error("Task title cannot be empty")]
    EmptyTitle,

    /// No task with the given id
    #[error("No task with id '{0}'")]
    UnknownTask(String),
}

/// Persistence port errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Value could not be read from the backing store
    #[error("Failed to read '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Value could not be written to the backing store
    #[error("Failed to write '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// Stored value exists but cannot be decoded
    #[error("Corrupt value for '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// Serialization of a persisted value failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// State machine contract violations. These are programming errors on the
/// caller's side; the machine rejects them and leaves its state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// `tick()` delivered while the session is not counting down
    #[error("tick() while {phase:?}: ticks are only valid while running")]
    NotRunning { phase: Phase },

    /// `switch_to_break()` outside a Focus session
    #[error("cannot switch to a break from {0:?}")]
    NotFocus(SessionKind),

    /// `skip_break()` outside a break
    #[error("cannot skip a break from {0:?}")]
    NotBreak(SessionKind),

    /// Starting or resuming a session with nothing left on the clock
    #[error("cannot run a {0:?} session with zero duration")]
    ZeroDuration(SessionKind),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_is_readable() {
        let err = ValidationError::OutOfRange {
            field: "Focus duration",
            value: 10,
            min: 25,
            max: 50,
        };
        assert_eq!(
            err.to_string(),
            "Focus duration must be between 25 and 50 minutes (got 10)"
        );
    }

    #[test]
    fn transition_error_converts_into_core_error() {
        let err: CoreError = TransitionError::NotFocus(SessionKind::ShortBreak).into();
        assert!(matches!(err, CoreError::Transition(_)));
        assert!(err.to_string().contains("ShortBreak"));
    }
}
