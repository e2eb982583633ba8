//! One-tick-per-period driver for a [`SessionMachine`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::engine::SessionMachine;

/// A machine shared between its owner and the clock driver.
pub type SharedMachine = Arc<Mutex<SessionMachine>>;

struct Driver {
    armed: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Holds at most one ticking task. Dropping the clock disarms it.
///
/// The driver re-checks its `armed` flag under the machine lock before
/// every tick, so once `stop()` returns no further tick reaches the
/// machine even if the task was already waiting for the lock.
pub struct SessionClock {
    period: Duration,
    driver: Option<Driver>,
}

impl SessionClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            driver: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|d| d.armed.load(Ordering::SeqCst) && !d.handle.is_finished())
    }

    /// Arm the driver if the machine is running.
    ///
    /// Idempotent: an already armed clock keeps its single driver. Returns
    /// whether a driver is ticking afterwards.
    pub async fn start(&mut self, machine: &SharedMachine) -> bool {
        if self.is_armed() {
            return true;
        }
        let running = machine.lock().await.session().is_running();
        self.arm_if(running, machine)
    }

    /// Same as [`SessionClock::start`] for callers already holding the lock.
    pub fn start_locked(&mut self, guard: &SessionMachine, machine: &SharedMachine) -> bool {
        if self.is_armed() {
            return true;
        }
        self.arm_if(guard.session().is_running(), machine)
    }

    /// Disarm synchronously.
    pub fn stop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.armed.store(false, Ordering::SeqCst);
            driver.handle.abort();
        }
    }

    fn arm_if(&mut self, running: bool, machine: &SharedMachine) -> bool {
        // Release a finished driver before acquiring a new one.
        self.stop();
        if !running {
            return false;
        }
        let armed = Arc::new(AtomicBool::new(true));
        let handle = tokio::spawn(drive(Arc::clone(machine), Arc::clone(&armed), self.period));
        self.driver = Some(Driver { armed, handle });
        true
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn drive(machine: SharedMachine, armed: Arc<AtomicBool>, period: Duration) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let mut guard = machine.lock().await;
        if !armed.load(Ordering::SeqCst) || !guard.session().is_running() {
            break;
        }
        match guard.tick() {
            Ok(None) => {}
            Ok(Some(done)) => {
                tracing::debug!(kind = ?done.kind, next = ?done.next_kind, "clock disarmed after completion");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "clock stopped on rejected tick");
                break;
            }
        }
    }
    armed.store(false, Ordering::SeqCst);
}
