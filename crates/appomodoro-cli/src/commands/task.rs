use clap::Subcommand;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks
    List,
    /// Add a task
    Add {
        /// Task title
        title: String,
    },
    /// Mark a task done, or not done again
    Toggle {
        /// Task ID or a unique prefix of it
        id: String,
    },
    /// Delete a task
    Remove {
        /// Task ID or a unique prefix of it
        id: String,
    },
    /// Delete every task
    Clear,
}

pub fn run(action: TaskAction, ctx: &Context) -> CliResult {
    let tasks = ctx.app().tasks;

    match action {
        TaskAction::List => print_json(&tasks.load()),
        TaskAction::Add { title } => print_json(&tasks.add(&title)?),
        TaskAction::Toggle { id } => print_json(&tasks.toggle(&id)?),
        TaskAction::Remove { id } => print_json(&tasks.remove(&id)?),
        TaskAction::Clear => {
            tasks.clear();
            print_json(&tasks.load())
        }
    }
}
