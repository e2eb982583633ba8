use clap::{Subcommand, ValueEnum};

use appomodoro_core::AlarmSound;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print current settings as JSON
    Show,
    /// Focus duration in minutes (25-50)
    Focus { minutes: u32 },
    /// Short break duration in minutes (5-10)
    ShortBreak { minutes: u32 },
    /// Long break duration in minutes (15-20)
    LongBreak { minutes: u32 },
    /// Alarm played when a session ends
    Alarm { sound: AlarmSound },
    /// Enable or disable "time's up" notifications
    Notifications { state: Toggle },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

pub fn run(action: SettingsAction, ctx: &Context) -> CliResult {
    let mut app = ctx.app();
    let settings = &mut app.settings;

    match action {
        SettingsAction::Show => {}
        SettingsAction::Focus { minutes } => settings.set_focus_minutes(minutes)?,
        SettingsAction::ShortBreak { minutes } => settings.set_short_break_minutes(minutes)?,
        SettingsAction::LongBreak { minutes } => settings.set_long_break_minutes(minutes)?,
        SettingsAction::Alarm { sound } => settings.set_alarm_sound(sound),
        SettingsAction::Notifications { state } => {
            settings.set_notifications_enabled(matches!(state, Toggle::On))
        }
    }

    print_json(&settings.current())
}
