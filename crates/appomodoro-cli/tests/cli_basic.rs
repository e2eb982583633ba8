//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway data directory and check
//! the JSON it prints.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_appomodoro"))
        .args(args)
        .env("APPOMODORO_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is JSON")
}

#[test]
fn test_settings_validation() {
    let dir = TempDir::new().unwrap();

    let settings = run_json(dir.path(), &["settings", "focus", "30"]);
    assert_eq!(settings["focusMinutes"], 30);

    let (_, stderr, code) = run_cli(dir.path(), &["settings", "focus", "60"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: Focus duration must be between 25 and 50 minutes (got 60)"));

    let settings = run_json(dir.path(), &["settings", "alarm", "chimes"]);
    assert_eq!(settings["alarmSound"], "chimes");

    let settings = run_json(dir.path(), &["settings", "show"]);
    assert_eq!(settings["focusMinutes"], 30);
    assert_eq!(settings["shortBreakMinutes"], 5);
}

#[test]
fn test_task_round_trip() {
    let dir = TempDir::new().unwrap();

    let task = run_json(dir.path(), &["task", "add", "Write report"]);
    let id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["completed"], false);

    let toggled = run_json(dir.path(), &["task", "toggle", &id]);
    assert_eq!(toggled["completed"], true);

    let tasks = run_json(dir.path(), &["task", "list"]);
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["title"], "Write report");

    run_json(dir.path(), &["task", "remove", &id]);
    let tasks = run_json(dir.path(), &["task", "list"]);
    assert!(tasks.as_array().unwrap().is_empty());

    let (_, stderr, code) = run_cli(dir.path(), &["task", "toggle", "missing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: No task with id 'missing'"));
}

#[test]
fn test_timer_break_and_skip() {
    let dir = TempDir::new().unwrap();

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["type"], "StateSnapshot");
    assert_eq!(status["kind"], "focus");
    assert_eq!(status["display"], "25:00");

    let event = run_json(dir.path(), &["timer", "break"]);
    assert_eq!(event["type"], "SwitchedToBreak");
    assert_eq!(event["kind"], "shortBreak");

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["kind"], "shortBreak");
    assert_eq!(status["display"], "05:00");

    let event = run_json(dir.path(), &["timer", "skip-break"]);
    assert_eq!(event["type"], "BreakSkipped");
    assert_eq!(event["completedToday"], 1);

    let (_, _, code) = run_cli(dir.path(), &["timer", "skip-break"]);
    assert_eq!(code, 1);
}

#[test]
fn test_foreground_session_completes() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "tick_interval_ms = 1\n").unwrap();

    let (stdout, stderr, code) = run_cli(dir.path(), &["timer", "start"]);
    assert_eq!(code, 0, "timer start failed: {stderr}");
    assert!(stdout.contains("\"type\": \"SessionCompleted\""));
    assert!(stdout.contains("\"nextKind\": \"shortBreak\""));

    let history = run_json(dir.path(), &["history", "list"]);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["title"], "Focus session");
    assert_eq!(history[0]["minutes"], 25);

    let stats = run_json(dir.path(), &["stats", "weekly"]);
    assert_eq!(stats["focused"], 25);
    assert_eq!(stats["sessions"], 1);

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["kind"], "shortBreak");
    assert_eq!(status["completedToday"], 1);

    run_json(dir.path(), &["history", "clear"]);
    let history = run_json(dir.path(), &["history", "list"]);
    assert!(history.as_array().unwrap().is_empty());
}
