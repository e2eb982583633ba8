//! Non-blocking writes in front of a slower store.
//!
//! Writes land in an in-memory overlay immediately and are applied to the
//! backing store in order by a single worker thread. Reads see the overlay
//! first, so a value is visible the moment `set` returns.

use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread;

use super::KvStore;
use crate::error::StorageError;

enum Op {
    Set(String, String),
    Remove(String),
    Flush(mpsc::Sender<()>),
}

/// Write-behind wrapper around any [`KvStore`].
///
/// Failures of the backing store are logged by the worker and dropped:
/// there is no retry and the overlay keeps the newer value.
pub struct WriteBehind {
    inner: Arc<dyn KvStore>,
    overlay: Mutex<HashMap<String, Option<String>>>,
    tx: Mutex<Option<mpsc::Sender<Op>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl WriteBehind {
    pub fn new(inner: Arc<dyn KvStore>) -> Self {
        let (tx, rx) = mpsc::channel::<Op>();
        let backend = Arc::clone(&inner);
        let spawned = thread::Builder::new()
            .name("appomodoro-writer".into())
            .spawn(move || apply_writes(backend.as_ref(), rx));

        let (tx, worker) = match spawned {
            Ok(handle) => (Some(tx), Some(handle)),
            Err(e) => {
                tracing::warn!(error = %e, "could not start writer thread; writes will be synchronous");
                (None, None)
            }
        };

        Self {
            inner,
            overlay: Mutex::new(HashMap::new()),
            tx: Mutex::new(tx),
            worker: Mutex::new(worker),
        }
    }

    /// Block until every write queued so far has reached the backing store.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.enqueue(Op::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    fn overlay(&self) -> MutexGuard<'_, HashMap<String, Option<String>>> {
        self.overlay
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue an operation. Hands it back when there is no live worker.
    fn enqueue(&self, op: Op) -> Result<(), Op> {
        let tx = self.tx.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match tx.as_ref() {
            Some(tx) => tx.send(op).map_err(|mpsc::SendError(op)| op),
            None => Err(op),
        }
    }
}

fn apply_writes(backend: &dyn KvStore, rx: mpsc::Receiver<Op>) {
    for op in rx {
        match op {
            Op::Set(key, value) => {
                if let Err(e) = backend.set(&key, &value) {
                    tracing::warn!(key = %key, error = %e, "deferred write failed");
                }
            }
            Op::Remove(key) => {
                if let Err(e) = backend.remove(&key) {
                    tracing::warn!(key = %key, error = %e, "deferred remove failed");
                }
            }
            Op::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

impl KvStore for WriteBehind {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if let Some(pending) = self.overlay().get(key) {
            return Ok(pending.clone());
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.overlay()
            .insert(key.to_string(), Some(value.to_string()));
        match self.enqueue(Op::Set(key.to_string(), value.to_string())) {
            Ok(()) => Ok(()),
            Err(_) => self.inner.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.overlay().insert(key.to_string(), None);
        match self.enqueue(Op::Remove(key.to_string())) {
            Ok(()) => Ok(()),
            Err(_) => self.inner.remove(key),
        }
    }
}

impl Drop for WriteBehind {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        drop(
            self.tx
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .take(),
        );
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}
