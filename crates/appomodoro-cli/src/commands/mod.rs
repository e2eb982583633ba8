pub mod history;
pub mod settings;
pub mod stats;
pub mod task;
pub mod timer;

use std::sync::Arc;

use serde::Serialize;

use appomodoro_core::{AppConfig, Appomodoro, Database, KvStore, WriteBehind};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs: the loaded config and the store.
pub struct Context {
    pub config: AppConfig,
    store: Arc<WriteBehind>,
}

impl Context {
    /// Open the database (config override or default location) behind a
    /// write-behind queue.
    pub fn open(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db = match config.database_path() {
            Some(path) => Database::open_at(&path)?,
            None => Database::open()?,
        };
        let store = Arc::new(WriteBehind::new(Arc::new(db)));
        Ok(Self { config, store })
    }

    pub fn store(&self) -> Arc<dyn KvStore> {
        self.store.clone()
    }

    pub fn app(&self) -> Appomodoro {
        Appomodoro::new(self.store())
    }

    /// Drain pending writes before the process exits.
    pub fn close(&self) {
        self.store.flush();
    }
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
