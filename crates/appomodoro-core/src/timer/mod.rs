mod clock;
mod controller;
mod counter;
mod engine;
mod session;

pub use clock::{SessionClock, SharedMachine};
pub use controller::FocusTimer;
pub use counter::CompletionCounter;
pub use engine::{SessionMachine, TimeSource};
pub use session::{Phase, Session, SessionKind, POMODOROS_PER_CYCLE};
