use serde::{Deserialize, Serialize};

/// Focus sessions per cycle; the last one in a cycle earns a long break.
pub const POMODOROS_PER_CYCLE: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionKind {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn is_break(&self) -> bool {
        !matches!(self, SessionKind::Focus)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionKind::Focus => "Focus Time",
            SessionKind::ShortBreak => "Short Break",
            SessionKind::LongBreak => "Long Break",
        }
    }

    /// Break that follows the `completed`-th Focus session of the day.
    pub fn break_after(completed: u32) -> SessionKind {
        if completed % POMODOROS_PER_CYCLE == 0 {
            SessionKind::LongBreak
        } else {
            SessionKind::ShortBreak
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

/// The live interval: what kind it is, how long it lasts, how much is left
/// and whether it is counting down.
///
/// Fields are private so that `remaining_secs <= total_secs` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    kind: SessionKind,
    total_secs: u32,
    remaining_secs: u32,
    phase: Phase,
    /// A break taken early with `switch_to_break`, before the Focus session
    /// that earns it was counted.
    #[serde(default)]
    early: bool,
}

impl Session {
    /// A fresh, not yet started session.
    pub fn idle(kind: SessionKind, total_secs: u32) -> Self {
        Self {
            kind,
            total_secs,
            remaining_secs: total_secs,
            phase: Phase::Idle,
            early: false,
        }
    }

    /// An idle break entered before its Focus session was counted.
    pub(crate) fn early_break(kind: SessionKind, total_secs: u32) -> Self {
        Self {
            early: kind.is_break(),
            ..Self::idle(kind, total_secs)
        }
    }

    /// Re-establish invariants on a value that came from storage.
    ///
    /// A session cannot be running without a clock behind it, so a restored
    /// running session comes back paused.
    pub fn restored(self) -> Self {
        Self {
            remaining_secs: self.remaining_secs.min(self.total_secs),
            phase: match self.phase {
                Phase::Running => Phase::Paused,
                other => other,
            },
            ..self
        }
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.total_secs - self.remaining_secs
    }

    pub fn is_early_break(&self) -> bool {
        self.early
    }

    /// `MM:SS`, the way the countdown is displayed.
    pub fn format_remaining(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Count down one second. Returns the new remaining time.
    pub(crate) fn decrement(&mut self) -> u32 {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs
    }
}
