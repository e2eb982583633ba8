use clap::Subcommand;
use serde_json::json;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Focus/break totals, streak and busiest weekday
    Weekly,
    /// Reset weekly statistics to zero
    Reset,
}

pub fn run(action: StatsAction, ctx: &Context) -> CliResult {
    let app = ctx.app();

    match action {
        StatsAction::Weekly => {
            let stats = app.weekly.load();
            print_json(&json!({
                "focused": stats.focused_minutes,
                "breaks": stats.break_minutes,
                "streak": stats.streak_days,
                "daily": stats.daily,
                "sessions": stats.total_focus_sessions(),
                "busiestDay": stats.busiest_day(),
                "lastActive": stats.last_active,
            }))
        }
        StatsAction::Reset => {
            app.weekly.reset();
            print_json(&app.weekly.load())
        }
    }
}
