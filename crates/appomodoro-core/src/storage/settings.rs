//! User-configurable durations and preferences.
//!
//! Settings live in the key/value store (not in `config.toml`) under the
//! keys in [`super::keys`]. Loading never fails: each missing, unparsable
//! or out-of-range field falls back to its built-in default.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{keys, persist, read, KvStore};
use crate::error::ValidationError;
use crate::timer::SessionKind;

pub const FOCUS_MINUTES: RangeInclusive<u32> = 25..=50;
pub const SHORT_BREAK_MINUTES: RangeInclusive<u32> = 5..=10;
pub const LONG_BREAK_MINUTES: RangeInclusive<u32> = 15..=20;

/// Alarm played when a session finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSound {
    #[default]
    Classic,
    Chimes,
    Waves,
}

impl AlarmSound {
    pub const ALL: [AlarmSound; 3] = [AlarmSound::Classic, AlarmSound::Chimes, AlarmSound::Waves];

    /// Stored representation.
    pub fn file_name(&self) -> &'static str {
        match self {
            AlarmSound::Classic => "sound1.mp3",
            AlarmSound::Chimes => "sound2.mp3",
            AlarmSound::Waves => "sound3.mp3",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.file_name() == name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlarmSound::Classic => "Classic",
            AlarmSound::Chimes => "Chimes",
            AlarmSound::Waves => "Waves",
        }
    }
}

impl fmt::Display for AlarmSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the name (`chimes`) or the stored file name (`sound2.mp3`).
impl FromStr for AlarmSound {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(sound) = Self::from_file_name(trimmed) {
            return Ok(sound);
        }
        Self::ALL
            .into_iter()
            .find(|sound| sound.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownSound(trimmed.to_string()))
    }
}

/// Durations (minutes) and preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub alarm_sound: AlarmSound,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            alarm_sound: AlarmSound::Classic,
            notifications_enabled: true,
        }
    }
}

impl Settings {
    pub fn minutes_for(&self, kind: SessionKind) -> u32 {
        match kind {
            SessionKind::Focus => self.focus_minutes,
            SessionKind::ShortBreak => self.short_break_minutes,
            SessionKind::LongBreak => self.long_break_minutes,
        }
    }

    pub fn seconds_for(&self, kind: SessionKind) -> u32 {
        self.minutes_for(kind).saturating_mul(60)
    }
}

/// Owns [`Settings`] and keeps them in sync with the store.
pub struct SettingsStore {
    store: Arc<dyn KvStore>,
    current: Settings,
}

impl SettingsStore {
    /// Create the store and load whatever is persisted.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let mut settings = Self {
            store,
            current: Settings::default(),
        };
        settings.load();
        settings
    }

    /// Last loaded or set values.
    pub fn current(&self) -> Settings {
        self.current
    }

    /// Re-read every field from the store.
    pub fn load(&mut self) -> Settings {
        let defaults = Settings::default();
        let store = self.store.as_ref();
        self.current = Settings {
            focus_minutes: load_minutes(
                store,
                keys::DEFAULT_POMODORO,
                FOCUS_MINUTES,
                defaults.focus_minutes,
            ),
            short_break_minutes: load_minutes(
                store,
                keys::SHORT_BREAK,
                SHORT_BREAK_MINUTES,
                defaults.short_break_minutes,
            ),
            long_break_minutes: load_minutes(
                store,
                keys::LONG_BREAK,
                LONG_BREAK_MINUTES,
                defaults.long_break_minutes,
            ),
            alarm_sound: match read(store, keys::ALARM_SOUND) {
                Some(raw) => AlarmSound::from_file_name(&raw).unwrap_or_else(|| {
                    tracing::warn!(value = %raw, "unknown alarm sound; using default");
                    defaults.alarm_sound
                }),
                None => defaults.alarm_sound,
            },
            notifications_enabled: match read(store, keys::NOTIFICATIONS).as_deref() {
                Some("true") => true,
                Some("false") => false,
                Some(raw) => {
                    tracing::warn!(value = %raw, "unparsable notifications flag; using default");
                    defaults.notifications_enabled
                }
                None => defaults.notifications_enabled,
            },
        };
        self.current
    }

    /// # Errors
    /// Returns a validation error if `minutes` is outside 25-50.
    pub fn set_focus_minutes(&mut self, minutes: u32) -> Result<(), ValidationError> {
        validate("Focus duration", minutes, FOCUS_MINUTES)?;
        self.current.focus_minutes = minutes;
        persist(self.store.as_ref(), keys::DEFAULT_POMODORO, &minutes.to_string());
        Ok(())
    }

    /// # Errors
    /// Returns a validation error if `minutes` is outside 5-10.
    pub fn set_short_break_minutes(&mut self, minutes: u32) -> Result<(), ValidationError> {
        validate("Short break", minutes, SHORT_BREAK_MINUTES)?;
        self.current.short_break_minutes = minutes;
        persist(self.store.as_ref(), keys::SHORT_BREAK, &minutes.to_string());
        Ok(())
    }

    /// # Errors
    /// Returns a validation error if `minutes` is outside 15-20.
    pub fn set_long_break_minutes(&mut self, minutes: u32) -> Result<(), ValidationError> {
        validate("Long break", minutes, LONG_BREAK_MINUTES)?;
        self.current.long_break_minutes = minutes;
        persist(self.store.as_ref(), keys::LONG_BREAK, &minutes.to_string());
        Ok(())
    }

    pub fn set_alarm_sound(&mut self, sound: AlarmSound) {
        self.current.alarm_sound = sound;
        persist(self.store.as_ref(), keys::ALARM_SOUND, sound.file_name());
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.current.notifications_enabled = enabled;
        persist(self.store.as_ref(), keys::NOTIFICATIONS, &enabled.to_string());
    }
}

fn validate(
    field: &'static str,
    value: u32,
    range: RangeInclusive<u32>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

fn load_minutes(
    store: &dyn KvStore,
    key: &str,
    range: RangeInclusive<u32>,
    default: u32,
) -> u32 {
    let Some(raw) = read(store, key) else {
        return default;
    };
    match raw.trim().parse::<u32>() {
        Ok(minutes) if range.contains(&minutes) => minutes,
        Ok(minutes) => {
            tracing::warn!(key, minutes, "persisted duration out of range; using default");
            default
        }
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "unparsable duration; using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store_with(entries: &[(&str, &str)]) -> (Arc<MemoryStore>, SettingsStore) {
        let backing = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
        let settings = SettingsStore::new(backing.clone());
        (backing, settings)
    }

    #[test]
    fn empty_store_yields_defaults() {
        let (_, settings) = store_with(&[]);
        assert_eq!(settings.current(), Settings::default());
    }

    #[test]
    fn garbage_fields_fall_back_individually() {
        let (_, settings) = store_with(&[
            ("defaultPomodoro", "thirty"),
            ("shortBreak", "8"),
            ("longBreak", "99"),
            ("alarmSound", "sound9.mp3"),
            ("notifications", "false"),
        ]);
        let current = settings.current();
        assert_eq!(current.focus_minutes, 25);
        assert_eq!(current.short_break_minutes, 8);
        assert_eq!(current.long_break_minutes, 15);
        assert_eq!(current.alarm_sound, AlarmSound::Classic);
        assert!(!current.notifications_enabled);
    }

    #[test]
    fn setters_round_trip_through_store() {
        let (backing, mut settings) = store_with(&[]);
        settings.set_focus_minutes(40).unwrap();
        settings.set_short_break_minutes(10).unwrap();
        settings.set_long_break_minutes(20).unwrap();
        settings.set_alarm_sound(AlarmSound::Waves);
        settings.set_notifications_enabled(false);

        assert_eq!(backing.get("alarmSound").unwrap().as_deref(), Some("sound3.mp3"));
        assert_eq!(backing.get("notifications").unwrap().as_deref(), Some("false"));

        let reloaded = SettingsStore::new(backing).current();
        assert_eq!(
            reloaded,
            Settings {
                focus_minutes: 40,
                short_break_minutes: 10,
                long_break_minutes: 20,
                alarm_sound: AlarmSound::Waves,
                notifications_enabled: false,
            }
        );
    }

    #[test]
    fn invalid_value_is_rejected_and_previous_value_kept() {
        let (backing, mut settings) = store_with(&[]);
        settings.set_focus_minutes(30).unwrap();

        let err = settings.set_focus_minutes(10).unwrap_err();
        assert!(err.to_string().contains("between 25 and 50"));
        assert!(settings.set_short_break_minutes(11).is_err());
        assert!(settings.set_long_break_minutes(14).is_err());

        assert_eq!(backing.get("defaultPomodoro").unwrap().as_deref(), Some("30"));
        assert!(backing.get("shortBreak").unwrap().is_none());
        assert_eq!(SettingsStore::new(backing).current().focus_minutes, 30);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let (_, mut settings) = store_with(&[]);
        assert!(settings.set_focus_minutes(25).is_ok());
        assert!(settings.set_focus_minutes(50).is_ok());
        assert!(settings.set_short_break_minutes(5).is_ok());
        assert!(settings.set_long_break_minutes(20).is_ok());
        assert!(settings.set_focus_minutes(51).is_err());
    }

    #[test]
    fn storage_failure_is_not_a_validation_error() {
        let (backing, mut settings) = store_with(&[]);
        backing.set_fail_writes(true);
        assert!(settings.set_focus_minutes(45).is_ok());
        assert_eq!(settings.current().focus_minutes, 45);
        assert!(backing.get("defaultPomodoro").unwrap().is_none());
    }

    #[test]
    fn alarm_sound_parses_names_and_file_names() {
        assert_eq!("chimes".parse::<AlarmSound>().unwrap(), AlarmSound::Chimes);
        assert_eq!("Waves".parse::<AlarmSound>().unwrap(), AlarmSound::Waves);
        assert_eq!("sound1.mp3".parse::<AlarmSound>().unwrap(), AlarmSound::Classic);
        assert!("bells".parse::<AlarmSound>().is_err());
    }
}
