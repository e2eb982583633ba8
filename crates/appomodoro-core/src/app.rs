//! Wiring of the independently persisted components over one store.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::events::CompletionObserver;
use crate::stats::{HistoryLog, WeeklyStatsAggregator};
use crate::storage::{KvStore, SettingsStore};
use crate::task::TaskList;
use crate::timer::{CompletionCounter, SessionMachine};

/// Every component, sharing one [`KvStore`].
pub struct Appomodoro {
    store: Arc<dyn KvStore>,
    pub settings: SettingsStore,
    pub history: Arc<HistoryLog>,
    pub weekly: Arc<WeeklyStatsAggregator>,
    pub tasks: TaskList,
}

impl Appomodoro {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            settings: SettingsStore::new(Arc::clone(&store)),
            history: Arc::new(HistoryLog::new(Arc::clone(&store))),
            weekly: Arc::new(WeeklyStatsAggregator::new(Arc::clone(&store))),
            tasks: TaskList::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn store(&self) -> Arc<dyn KvStore> {
        Arc::clone(&self.store)
    }

    /// A machine for `today` with history and weekly stats subscribed,
    /// followed by `extra` observers (alarm, notifications).
    ///
    /// Loading the counter applies the daily reset.
    pub fn session_machine(
        &self,
        today: NaiveDate,
        extra: impl IntoIterator<Item = Arc<dyn CompletionObserver>>,
    ) -> SessionMachine {
        let counter = CompletionCounter::load(Arc::clone(&self.store), today);
        let mut machine = SessionMachine::new(self.settings.current(), counter);
        machine.subscribe(self.history.clone());
        machine.subscribe(self.weekly.clone());
        for observer in extra {
            machine.subscribe(observer);
        }
        machine
    }
}
