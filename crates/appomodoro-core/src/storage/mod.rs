//! Persistence port and its backends.
//!
//! Every component persists through [`KvStore`], a string key/value port.
//! The production backend is the SQLite [`Database`]; tests use
//! [`MemoryStore`]. [`WriteBehind`] wraps either one so that callers never
//! wait on the backing store.

mod config;
pub mod database;
pub mod keys;
pub mod memory;
pub mod settings;
pub mod write_behind;

pub use config::AppConfig;
pub use database::Database;
pub use memory::MemoryStore;
pub use settings::{AlarmSound, Settings, SettingsStore};
pub use write_behind::WriteBehind;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// String key/value persistence port.
pub trait KvStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Write `value` under `key`, logging instead of returning a failure.
///
/// In-memory state is authoritative: a failed write never undoes the
/// transition that produced it, so callers only need to know it happened.
pub(crate) fn persist(store: &dyn KvStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        tracing::warn!(key, error = %e, "storage write failed; keeping in-memory state");
    }
}

/// Read `key`, treating read failures as "nothing stored".
pub(crate) fn read(store: &dyn KvStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "storage read failed; using default");
            None
        }
    }
}

/// Decode the JSON stored under `key`. `Ok(None)` when nothing is stored.
///
/// # Errors
/// Returns [`StorageError::Corrupt`] when the stored text does not decode.
pub(crate) fn read_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = read(store, key) else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })
}

/// Encode `value` as JSON and [`persist`] it.
pub(crate) fn persist_json<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) {
    match serde_json::to_string(value).map_err(StorageError::from) {
        Ok(json) => persist(store, key, &json),
        Err(e) => tracing::warn!(key, error = %e, "could not encode value"),
    }
}

/// Returns the directory holding the database and `config.toml`.
///
/// `APPOMODORO_DATA_DIR` wins when set. Otherwise `~/.config/appomodoro`,
/// or `~/.config/appomodoro-dev` when `APPOMODORO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("APPOMODORO_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("APPOMODORO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("appomodoro-dev")
            } else {
                base_dir.join("appomodoro")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
