use clap::Subcommand;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Recently completed sessions, most recent first
    List,
    /// Forget all recent sessions
    Clear,
}

pub fn run(action: HistoryAction, ctx: &Context) -> CliResult {
    let app = ctx.app();

    match action {
        HistoryAction::List => print_json(&app.history.load()),
        HistoryAction::Clear => {
            app.history.clear();
            print_json(&app.history.load())
        }
    }
}
