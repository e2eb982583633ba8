use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use appomodoro_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "appomodoro", version, about = "Appomodoro focus timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Durations, alarm and notifications
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Weekly statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Recently completed sessions
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// To-do list
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default();
    init_logging(&config);

    let result = commands::Context::open(config).and_then(|ctx| {
        let result = match cli.command {
            Commands::Timer { action } => commands::timer::run(action, &ctx),
            Commands::Settings { action } => commands::settings::run(action, &ctx),
            Commands::Stats { action } => commands::stats::run(action, &ctx),
            Commands::History { action } => commands::history::run(action, &ctx),
            Commands::Task { action } => commands::task::run(action, &ctx),
        };
        ctx.close();
        result
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
