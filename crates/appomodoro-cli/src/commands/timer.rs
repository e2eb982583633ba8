use std::io::Write;
use std::sync::Arc;

use chrono::Local;
use clap::Subcommand;
use tokio::sync::mpsc;

use appomodoro_core::{
    AlarmObserver, AlarmPlayer, AlarmSound, CompletionEvent, CompletionObserver, CoreError,
    Event, FocusTimer, NotificationObserver, Notifier, SessionHint, SessionMachine,
};

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print the current session as JSON
    Status,
    /// Run the current session in the foreground until it completes
    Start,
    /// Pause an interrupted session
    Pause,
    /// Discard progress and return to an idle Focus session
    Stop,
    /// Leave Focus early for the break the cycle earns
    Break,
    /// Skip the current break
    SkipBreak,
}

/// Rings the terminal bell; there is no audio output in a terminal.
struct TerminalBell;

impl AlarmPlayer for TerminalBell {
    fn play_alarm(&self, sound: AlarmSound) -> Result<(), CoreError> {
        tracing::debug!(%sound, "alarm");
        let mut err = std::io::stderr();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }

    fn stop_alarm(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify_times_up(&self, hint: SessionHint) -> Result<(), CoreError> {
        let body = match hint {
            SessionHint::Work => "Focus session complete. Time for a break!",
            SessionHint::Break => "Break is over. Ready to focus?",
        };
        eprintln!("\nTime's up! {body}");
        Ok(())
    }
}

/// Forwards completions to the foreground loop.
struct CompletionSignal(mpsc::UnboundedSender<CompletionEvent>);

impl CompletionObserver for CompletionSignal {
    fn name(&self) -> &'static str {
        "cli-signal"
    }

    fn on_completion(&self, event: &CompletionEvent) -> Result<(), CoreError> {
        // The receiver only goes away once the loop has finished.
        let _ = self.0.send(event.clone());
        Ok(())
    }
}

/// The persisted session (if any) on top of a freshly wired machine.
fn load_machine(
    ctx: &Context,
    extra: Vec<Arc<dyn CompletionObserver>>,
) -> SessionMachine {
    let app = ctx.app();
    let store = app.store();
    let machine = app.session_machine(Local::now().date_naive(), extra);
    match SessionMachine::load_session(store.as_ref()) {
        Some(saved) => machine.restore(saved),
        None => machine,
    }
}

pub fn run(action: TimerAction, ctx: &Context) -> CliResult {
    let store = ctx.store();

    match action {
        TimerAction::Status => {
            let machine = load_machine(ctx, Vec::new());
            print_json(&machine.snapshot())?;
        }
        TimerAction::Start => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_foreground(ctx))?;
        }
        TimerAction::Pause => {
            // A session is never running between invocations: restoring
            // already turns it into a paused one.
            let machine = load_machine(ctx, Vec::new());
            machine.save_session(store.as_ref());
            print_json(&machine.snapshot())?;
        }
        TimerAction::Stop => {
            let mut machine = load_machine(ctx, Vec::new());
            let event = machine.stop();
            machine.save_session(store.as_ref());
            print_json(&event)?;
        }
        TimerAction::Break => {
            let mut machine = load_machine(ctx, Vec::new());
            let event = machine.switch_to_break()?;
            machine.save_session(store.as_ref());
            print_json(&event)?;
        }
        TimerAction::SkipBreak => {
            let mut machine = load_machine(ctx, Vec::new());
            let event = machine.skip_break()?;
            machine.save_session(store.as_ref());
            print_json(&event)?;
        }
    }

    Ok(())
}

async fn run_foreground(ctx: &Context) -> CliResult {
    let store = ctx.store();
    let (tx, mut completions) = mpsc::unbounded_channel();
    let extra: Vec<Arc<dyn CompletionObserver>> = vec![
        Arc::new(AlarmObserver::new(Arc::new(TerminalBell))),
        Arc::new(NotificationObserver::new(Arc::new(StderrNotifier))),
        Arc::new(CompletionSignal(tx)),
    ];
    let mut timer = FocusTimer::new(load_machine(ctx, extra), ctx.config.tick_interval());

    if let Some(event) = timer.start().await? {
        print_json(&event)?;
    }

    let mut display = tokio::time::interval(ctx.config.tick_interval());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            done = completions.recv() => {
                eprintln!();
                if let Some(done) = done {
                    print_json(&Event::SessionCompleted(done))?;
                }
                break;
            }
            _ = &mut ctrl_c => {
                eprintln!();
                if let Some(event) = timer.pause().await {
                    print_json(&event)?;
                }
                break;
            }
            _ = display.tick() => {
                let session = timer.session().await;
                eprint!("\r{} {}  ", session.kind().label(), session.format_remaining());
                std::io::stderr().flush()?;
            }
        }
    }

    let machine = timer.machine();
    machine.lock().await.save_session(store.as_ref());
    Ok(())
}
