//! Persisted key names. Values are strings; see each constant for the format.

/// Focus minutes, decimal, 25-50.
pub const DEFAULT_POMODORO: &str = "defaultPomodoro";
/// Short break minutes, decimal, 5-10.
pub const SHORT_BREAK: &str = "shortBreak";
/// Long break minutes, decimal, 15-20.
pub const LONG_BREAK: &str = "longBreak";
/// `sound1.mp3` | `sound2.mp3` | `sound3.mp3`.
pub const ALARM_SOUND: &str = "alarmSound";
/// `"true"` | `"false"`.
pub const NOTIFICATIONS: &str = "notifications";
/// Focus sessions completed today, decimal.
pub const POMODORO_COUNT: &str = "pomodoroCount";
/// Day the completion counter belongs to, `YYYY-MM-DD`.
pub const LAST_POMODORO_DATE: &str = "lastPomodoroDate";
/// JSON array of history records, most recent first.
pub const RECENT_POMODOROS: &str = "recentPomodoros";
/// JSON object with the weekly aggregate.
pub const WEEKLY_STATS: &str = "weeklyStats";
/// JSON array of to-do tasks.
pub const TASKS: &str = "tasks";
/// JSON snapshot of an interrupted session.
pub const TIMER_SESSION: &str = "timerSession";

/// Date format used for `lastPomodoroDate`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
