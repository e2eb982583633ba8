//! Session state machine.
//!
//! The machine does not keep time itself: something (normally
//! [`super::SessionClock`]) calls `tick()` once per second while the
//! session is running.
//!
//! ## State Transitions
//!
//! ```text
//! {Focus, ShortBreak, LongBreak} x {Idle -> Running <-> Paused}
//!
//! Focus      --tick to 0-->      ShortBreak | LongBreak (idle)
//! break      --tick to 0-->      Focus (idle)
//! any        --stop-->           Focus (idle)
//! Focus      --switch_to_break-> ShortBreak | LongBreak (idle)
//! break      --skip_break-->     Focus (idle)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut machine = SessionMachine::new(settings, counter);
//! machine.start()?;
//! // Once per second:
//! if let Some(done) = machine.tick()? { /* next kind is idle now */ }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate};

use super::counter::CompletionCounter;
use super::session::{Phase, Session, SessionKind};
use crate::error::TransitionError;
use crate::events::{CompletionEvent, CompletionObserver, Event};
use crate::storage::{keys, persist_json, read_json, KvStore, Settings};

/// Source of "now" for completion timestamps and the daily reset.
pub type TimeSource = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Owns the live [`Session`] and the daily completion counter.
pub struct SessionMachine {
    session: Session,
    settings: Settings,
    counter: CompletionCounter,
    observers: Vec<Arc<dyn CompletionObserver>>,
    now: TimeSource,
}

impl SessionMachine {
    /// Start in an idle Focus session at the configured duration.
    pub fn new(settings: Settings, counter: CompletionCounter) -> Self {
        Self {
            session: Session::idle(SessionKind::Focus, settings.seconds_for(SessionKind::Focus)),
            settings,
            counter,
            observers: Vec::new(),
            now: Arc::new(Local::now),
        }
    }

    pub fn with_time_source(mut self, now: TimeSource) -> Self {
        self.now = now;
        self
    }

    /// Continue a session saved by [`SessionMachine::save_session`].
    pub fn restore(mut self, session: Session) -> Self {
        let session = session.restored();
        if session.total_secs() > 0 {
            self.session = session;
        }
        self
    }

    /// Read a session saved under `timerSession`, if any.
    pub fn load_session(store: &dyn KvStore) -> Option<Session> {
        read_json(store, keys::TIMER_SESSION).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding unreadable saved session");
            None
        })
    }

    pub fn save_session(&self, store: &dyn KvStore) {
        persist_json(store, keys::TIMER_SESSION, &self.session);
    }

    /// Register an observer for completion events.
    pub fn subscribe(&mut self, observer: Arc<dyn CompletionObserver>) {
        self.observers.push(observer);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Focus completions on the current day. A count left over from an
    /// earlier day reads as zero until the next transition resets it.
    pub fn completed_today(&self) -> u32 {
        if self.counter.day() == self.today() {
            self.counter.count()
        } else {
            0
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            kind: self.session.kind(),
            label: self.session.kind().label().to_string(),
            phase: self.session.phase(),
            remaining_secs: self.session.remaining_secs(),
            total_secs: self.session.total_secs(),
            display: self.session.format_remaining(),
            completed_today: self.completed_today(),
            at: (self.now)(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle -> Running. Starting a paused session resumes it.
    ///
    /// # Errors
    /// Rejects a session with no time left.
    pub fn start(&mut self) -> Result<Option<Event>, TransitionError> {
        match self.session.phase() {
            Phase::Running => Ok(None),
            Phase::Paused => self.resume(),
            Phase::Idle => {
                self.ensure_time_left()?;
                self.counter.roll_over(self.today());
                self.session.set_phase(Phase::Running);
                tracing::debug!(kind = ?self.session.kind(), remaining = self.session.remaining_secs(), "session started");
                Ok(Some(Event::TimerStarted {
                    kind: self.session.kind(),
                    remaining_secs: self.session.remaining_secs(),
                    at: (self.now)(),
                }))
            }
        }
    }

    /// Running -> Paused. No-op otherwise.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.session.is_running() {
            return None;
        }
        self.session.set_phase(Phase::Paused);
        tracing::debug!(remaining = self.session.remaining_secs(), "session paused");
        Some(Event::TimerPaused {
            remaining_secs: self.session.remaining_secs(),
            at: (self.now)(),
        })
    }

    /// Paused -> Running. No-op otherwise.
    ///
    /// # Errors
    /// Rejects a session with no time left.
    pub fn resume(&mut self) -> Result<Option<Event>, TransitionError> {
        if self.session.phase() != Phase::Paused {
            return Ok(None);
        }
        self.ensure_time_left()?;
        self.session.set_phase(Phase::Running);
        tracing::debug!(remaining = self.session.remaining_secs(), "session resumed");
        Ok(Some(Event::TimerResumed {
            remaining_secs: self.session.remaining_secs(),
            at: (self.now)(),
        }))
    }

    /// The single pause/resume button.
    ///
    /// # Errors
    /// Rejects resuming a session with no time left.
    pub fn toggle_pause(&mut self) -> Result<Option<Event>, TransitionError> {
        match self.session.phase() {
            Phase::Running => Ok(self.pause()),
            Phase::Paused => self.resume(),
            Phase::Idle => Ok(None),
        }
    }

    /// Discard progress and go back to an idle Focus session.
    pub fn stop(&mut self) -> Event {
        self.session = self.fresh(SessionKind::Focus);
        tracing::debug!("session stopped");
        Event::TimerStopped { at: (self.now)() }
    }

    /// Leave Focus early for the break the current cycle position earns.
    ///
    /// Nothing is counted as completed. The break remembers that its Focus
    /// session is still uncounted, see [`SessionMachine::skip_break`].
    ///
    /// # Errors
    /// Only valid during a Focus session.
    pub fn switch_to_break(&mut self) -> Result<Event, TransitionError> {
        let current = self.session.kind();
        if current != SessionKind::Focus {
            return Err(TransitionError::NotFocus(current));
        }
        self.counter.roll_over(self.today());
        let kind = SessionKind::break_after(self.counter.count() + 1);
        self.session = Session::early_break(kind, self.settings.seconds_for(kind));
        tracing::debug!(?kind, "switched to break");
        Ok(Event::SwitchedToBreak {
            kind,
            duration_secs: self.session.total_secs(),
            at: (self.now)(),
        })
    }

    /// Skip the current break. Nothing is reported to observers.
    ///
    /// A break earned by a completed Focus session was already counted, so
    /// skipping it leaves the counter alone and the long-break cadence is the
    /// same as when breaks are taken. Skipping an early break counts the
    /// Focus session it interrupted, as `switch_to_break` assumed.
    ///
    /// # Errors
    /// Only valid during a break.
    pub fn skip_break(&mut self) -> Result<Event, TransitionError> {
        let skipped = self.session.kind();
        if !skipped.is_break() {
            return Err(TransitionError::NotBreak(skipped));
        }
        let today = self.today();
        let completed_today = if self.session.is_early_break() {
            self.counter.increment(today)
        } else {
            self.counter.roll_over(today);
            self.counter.count()
        };
        self.session = self.fresh(SessionKind::Focus);
        tracing::debug!(?skipped, completed_today, "break skipped");
        Ok(Event::BreakSkipped {
            skipped,
            completed_today,
            at: (self.now)(),
        })
    }

    /// Count down one second. When the session reaches zero it completes
    /// within the same call: observers are notified and the next kind is
    /// left idle at its full duration.
    ///
    /// # Errors
    /// Ticks are only valid while running.
    pub fn tick(&mut self) -> Result<Option<CompletionEvent>, TransitionError> {
        if !self.session.is_running() {
            return Err(TransitionError::NotRunning {
                phase: self.session.phase(),
            });
        }
        if self.session.decrement() > 0 {
            return Ok(None);
        }
        Ok(Some(self.complete()))
    }

    /// Apply reloaded settings.
    ///
    /// An idle session is re-sized to the new duration. A running or paused
    /// session keeps counting down with the duration it started with; the
    /// new values take effect at the next transition.
    pub fn reload_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if self.session.phase() == Phase::Idle {
            self.session = self.fresh(self.session.kind());
        }
        self.counter.roll_over(self.today());
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) -> CompletionEvent {
        let finished = self.session;
        let completed_at = (self.now)();
        let next_kind = match finished.kind() {
            SessionKind::Focus => {
                SessionKind::break_after(self.counter.increment(completed_at.date_naive()))
            }
            SessionKind::ShortBreak | SessionKind::LongBreak => SessionKind::Focus,
        };
        self.session = self.fresh(next_kind);

        let event = CompletionEvent {
            kind: finished.kind(),
            minutes: finished.total_secs().div_ceil(60),
            completed_at,
            next_kind,
            completed_today: self.counter.count(),
            alarm_sound: self.settings.alarm_sound,
            notifications_enabled: self.settings.notifications_enabled,
        };
        tracing::info!(
            kind = ?event.kind,
            minutes = event.minutes,
            next = ?next_kind,
            completed_today = event.completed_today,
            "session completed"
        );

        for observer in &self.observers {
            if let Err(e) = observer.on_completion(&event) {
                tracing::warn!(observer = observer.name(), error = %e, "completion observer failed");
            }
        }
        event
    }

    fn fresh(&self, kind: SessionKind) -> Session {
        Session::idle(kind, self.settings.seconds_for(kind))
    }

    fn ensure_time_left(&self) -> Result<(), TransitionError> {
        if self.session.remaining_secs() == 0 {
            return Err(TransitionError::ZeroDuration(self.session.kind()));
        }
        Ok(())
    }

    fn today(&self) -> NaiveDate {
        (self.now)().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn fixed_now() -> TimeSource {
        Arc::new(|| Local.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap())
    }

    fn machine_with(settings: Settings) -> SessionMachine {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let now = fixed_now();
        let counter = CompletionCounter::load(store, now().date_naive());
        SessionMachine::new(settings, counter).with_time_source(now)
    }

    fn machine() -> SessionMachine {
        machine_with(Settings::default())
    }

    fn run_to_completion(machine: &mut SessionMachine) -> CompletionEvent {
        machine.start().unwrap();
        loop {
            if let Some(done) = machine.tick().unwrap() {
                return done;
            }
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<CompletionEvent>>);

    impl CompletionObserver for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn on_completion(&self, event: &CompletionEvent) -> Result<(), CoreError> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct Failing;

    impl CompletionObserver for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn on_completion(&self, _: &CompletionEvent) -> Result<(), CoreError> {
            Err(CoreError::Custom("speaker unplugged".into()))
        }
    }

    #[test]
    fn starts_idle_in_focus() {
        let machine = machine();
        assert_eq!(machine.session().kind(), SessionKind::Focus);
        assert_eq!(machine.session().phase(), Phase::Idle);
        assert_eq!(machine.session().remaining_secs(), 1500);
    }

    #[test]
    fn start_pause_resume() {
        let mut machine = machine();
        assert!(machine.start().unwrap().is_some());
        assert!(machine.start().unwrap().is_none());
        assert_eq!(machine.session().phase(), Phase::Running);

        assert!(machine.pause().is_some());
        assert_eq!(machine.session().phase(), Phase::Paused);
        assert!(machine.pause().is_none());

        assert!(machine.resume().unwrap().is_some());
        assert_eq!(machine.session().phase(), Phase::Running);
    }

    #[test]
    fn pause_and_resume_are_noops_when_idle() {
        let mut machine = machine();
        assert!(machine.pause().is_none());
        assert!(machine.resume().unwrap().is_none());
        assert!(machine.toggle_pause().unwrap().is_none());
        assert_eq!(machine.session().phase(), Phase::Idle);
    }

    #[test]
    fn tick_outside_running_is_rejected() {
        let mut machine = machine();
        assert_eq!(
            machine.tick(),
            Err(TransitionError::NotRunning { phase: Phase::Idle })
        );
        machine.start().unwrap();
        machine.pause();
        assert_eq!(
            machine.tick(),
            Err(TransitionError::NotRunning {
                phase: Phase::Paused
            })
        );
        assert_eq!(machine.session().remaining_secs(), 1500);
    }

    #[test]
    fn focus_completion_selects_short_break_atomically() {
        let mut machine = machine();
        let recorder = Arc::new(Recorder::default());
        machine.subscribe(recorder.clone());

        machine.start().unwrap();
        for _ in 0..1499 {
            assert!(machine.tick().unwrap().is_none());
        }
        assert_eq!(machine.session().remaining_secs(), 1);
        let done = machine.tick().unwrap().unwrap();

        assert_eq!(done.kind, SessionKind::Focus);
        assert_eq!(done.minutes, 25);
        assert_eq!(done.next_kind, SessionKind::ShortBreak);
        assert_eq!(machine.completed_today(), 1);
        assert_eq!(*machine.session(), Session::idle(SessionKind::ShortBreak, 300));
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn break_completion_returns_to_focus_without_counting() {
        let mut machine = machine();
        run_to_completion(&mut machine);
        let done = run_to_completion(&mut machine);
        assert_eq!(done.kind, SessionKind::ShortBreak);
        assert_eq!(done.minutes, 5);
        assert_eq!(done.next_kind, SessionKind::Focus);
        assert_eq!(machine.completed_today(), 1);
        assert_eq!(machine.session().remaining_secs(), 1500);
    }

    #[test]
    fn stop_discards_progress_from_any_state() {
        let mut machine = machine();
        machine.start().unwrap();
        machine.tick().unwrap();
        machine.switch_to_break().unwrap();
        machine.start().unwrap();
        machine.stop();
        assert_eq!(*machine.session(), Session::idle(SessionKind::Focus, 1500));
    }

    #[test]
    fn switch_to_break_uses_next_cycle_position() {
        let mut machine = machine();
        for _ in 0..3 {
            run_to_completion(&mut machine);
            run_to_completion(&mut machine);
        }
        assert_eq!(machine.completed_today(), 3);

        machine.start().unwrap();
        let event = machine.switch_to_break().unwrap();
        assert!(matches!(
            event,
            Event::SwitchedToBreak {
                kind: SessionKind::LongBreak,
                duration_secs: 900,
                ..
            }
        ));
        assert_eq!(machine.completed_today(), 3);
        assert_eq!(machine.session().phase(), Phase::Idle);
    }

    #[test]
    fn switch_to_break_rejected_during_break() {
        let mut machine = machine();
        run_to_completion(&mut machine);
        let before = *machine.session();
        assert_eq!(
            machine.switch_to_break(),
            Err(TransitionError::NotFocus(SessionKind::ShortBreak))
        );
        assert_eq!(*machine.session(), before);
    }

    #[test]
    fn skipping_an_earned_break_does_not_count_again() {
        let mut machine = machine();
        let recorder = Arc::new(Recorder::default());
        machine.subscribe(recorder.clone());

        run_to_completion(&mut machine);
        let event = machine.skip_break().unwrap();
        assert!(matches!(
            event,
            Event::BreakSkipped {
                skipped: SessionKind::ShortBreak,
                completed_today: 1,
                ..
            }
        ));
        assert_eq!(machine.completed_today(), 1);
        assert_eq!(machine.session().kind(), SessionKind::Focus);
        assert_eq!(recorder.0.lock().unwrap().len(), 1);

        assert_eq!(
            machine.skip_break(),
            Err(TransitionError::NotBreak(SessionKind::Focus))
        );
    }

    #[test]
    fn skipping_every_break_keeps_long_break_cadence() {
        let mut machine = machine();
        let mut breaks = Vec::new();
        for _ in 0..8 {
            breaks.push(run_to_completion(&mut machine).next_kind);
            machine.skip_break().unwrap();
        }
        let long_at: Vec<_> = breaks
            .iter()
            .enumerate()
            .filter(|(_, kind)| **kind == SessionKind::LongBreak)
            .map(|(i, _)| i + 1)
            .collect();
        assert_eq!(long_at, vec![4, 8]);
        assert_eq!(machine.completed_today(), 8);
    }

    #[test]
    fn skipping_an_early_break_counts_the_interrupted_focus() {
        let mut machine = machine();
        machine.start().unwrap();
        machine.switch_to_break().unwrap();
        assert!(machine.session().is_early_break());
        assert_eq!(machine.completed_today(), 0);

        machine.skip_break().unwrap();
        assert_eq!(machine.completed_today(), 1);

        // Three more completions land the long break on the fourth.
        for _ in 0..2 {
            run_to_completion(&mut machine);
            machine.skip_break().unwrap();
        }
        assert_eq!(run_to_completion(&mut machine).next_kind, SessionKind::LongBreak);
    }

    #[test]
    fn count_from_an_earlier_day_reads_as_zero() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let day = Arc::new(Mutex::new(Local.with_ymd_and_hms(2024, 3, 5, 23, 0, 0).unwrap()));
        let clock = Arc::clone(&day);
        let now: TimeSource = Arc::new(move || *clock.lock().unwrap());
        let counter = CompletionCounter::load(store, now().date_naive());
        let mut machine = SessionMachine::new(Settings::default(), counter).with_time_source(now);

        run_to_completion(&mut machine);
        assert_eq!(machine.completed_today(), 1);

        *day.lock().unwrap() = Local.with_ymd_and_hms(2024, 3, 6, 0, 30, 0).unwrap();
        assert_eq!(machine.completed_today(), 0);
        assert!(matches!(
            machine.snapshot(),
            Event::StateSnapshot {
                completed_today: 0,
                ..
            }
        ));
    }

    #[test]
    fn failing_observer_does_not_block_transition() {
        let mut machine = machine();
        let recorder = Arc::new(Recorder::default());
        machine.subscribe(Arc::new(Failing));
        machine.subscribe(recorder.clone());

        run_to_completion(&mut machine);
        assert_eq!(machine.session().kind(), SessionKind::ShortBreak);
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn reload_keeps_running_countdown() {
        let mut machine = machine();
        machine.start().unwrap();
        for _ in 0..10 {
            machine.tick().unwrap();
        }
        machine.reload_settings(Settings {
            focus_minutes: 50,
            short_break_minutes: 10,
            ..Settings::default()
        });
        assert_eq!(machine.session().remaining_secs(), 1490);
        assert_eq!(machine.session().total_secs(), 1500);

        let done = run_to_completion(&mut machine);
        assert_eq!(done.minutes, 25);
        assert_eq!(machine.session().total_secs(), 600);
    }

    #[test]
    fn reload_resizes_idle_session() {
        let mut machine = machine();
        machine.reload_settings(Settings {
            focus_minutes: 30,
            ..Settings::default()
        });
        assert_eq!(machine.session().remaining_secs(), 1800);
    }

    #[test]
    fn zero_duration_cannot_start() {
        let machine = machine();
        let finished = serde_json::from_str::<Session>(
            r#"{"kind":"focus","totalSecs":1500,"remainingSecs":0,"phase":"paused"}"#,
        )
        .unwrap();
        let mut machine = machine.restore(finished);
        assert_eq!(
            machine.start(),
            Err(TransitionError::ZeroDuration(SessionKind::Focus))
        );
    }

    #[test]
    fn session_round_trips_through_store() {
        let store = MemoryStore::new();
        let mut machine = machine();
        machine.start().unwrap();
        machine.tick().unwrap();
        machine.save_session(&store);

        let saved = SessionMachine::load_session(&store).unwrap();
        let restored = self::machine().restore(saved);
        assert_eq!(restored.session().remaining_secs(), 1499);
        assert_eq!(restored.session().phase(), Phase::Paused);
    }

    #[test]
    fn snapshot_reports_display_time() {
        let machine = machine();
        match machine.snapshot() {
            Event::StateSnapshot {
                kind,
                display,
                completed_today,
                ..
            } => {
                assert_eq!(kind, SessionKind::Focus);
                assert_eq!(display, "25:00");
                assert_eq!(completed_today, 0);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
