//! To-do list kept next to the timer.
//!
//! Persisted under `tasks` as a JSON array of `{id, title, completed}`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::storage::{keys, persist_json, read_json, KvStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(title: &str) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string()[..8].to_string(),
            title: title.trim().to_string(),
            completed: false,
        }
    }
}

/// Owns the `tasks` list.
pub struct TaskList {
    store: Arc<dyn KvStore>,
}

impl TaskList {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Tasks in insertion order. Missing or corrupt data reads as empty.
    pub fn load(&self) -> Vec<Task> {
        read_json(self.store.as_ref(), keys::TASKS)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "task list is corrupt; treating as empty");
                None
            })
            .unwrap_or_default()
    }

    /// # Errors
    /// Rejects blank titles.
    pub fn add(&self, title: &str) -> Result<Task, ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let task = Task::new(title);
        let mut tasks = self.load();
        tasks.push(task.clone());
        self.save(&tasks);
        Ok(task)
    }

    /// Flip the completed flag of the task whose id starts with `id`.
    ///
    /// # Errors
    /// Fails when no single task matches.
    pub fn toggle(&self, id: &str) -> Result<Task, ValidationError> {
        let mut tasks = self.load();
        let index = find(&tasks, id)?;
        tasks[index].completed = !tasks[index].completed;
        let task = tasks[index].clone();
        self.save(&tasks);
        Ok(task)
    }

    /// # Errors
    /// Fails when no single task matches.
    pub fn remove(&self, id: &str) -> Result<Task, ValidationError> {
        let mut tasks = self.load();
        let index = find(&tasks, id)?;
        let task = tasks.remove(index);
        self.save(&tasks);
        Ok(task)
    }

    pub fn clear(&self) {
        self.save(&[]);
    }

    fn save(&self, tasks: &[Task]) {
        persist_json(self.store.as_ref(), keys::TASKS, tasks);
    }
}

/// Exact id, or a prefix shared by exactly one task.
fn find(tasks: &[Task], id: &str) -> Result<usize, ValidationError> {
    if let Some(index) = tasks.iter().position(|t| t.id == id) {
        return Ok(index);
    }
    let mut matches = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| !id.is_empty() && t.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some((index, _)), None) => Ok(index),
        _ => Err(ValidationError::UnknownTask(id.to_string())),
    }
}
