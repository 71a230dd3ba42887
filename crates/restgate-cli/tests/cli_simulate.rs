//! CLI E2E tests.
//!
//! Tests invoke the built binary with scripts against the virtual clock and
//! inspect the JSON lines it prints.

use std::path::{Path, PathBuf};
use std::process::Command;

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("config.toml"), "[notifications]\nenabled = true\n")
            .expect("write config");
        Self { dir }
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn script(&self, body: &str) -> PathBuf {
        let path = self.dir.path().join("script.txt");
        std::fs::write(&path, body).expect("write script");
        path
    }
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_restgate"))
        .args(args)
        .env("RESTGATE_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn simulate(fixture: &Fixture, script: &Path) -> Vec<serde_json::Value> {
    let config = fixture.config();
    let (stdout, stderr, code) = run_cli(&[
        "simulate",
        script.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--work-secs",
        "10",
        "--break-secs",
        "5",
        "--long-break-secs",
        "15",
        "--rest-prompt-at",
        "2",
    ]);
    assert_eq!(code, 0, "simulate failed: {stderr}");
    stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("JSON line"))
        .collect()
}

fn types(lines: &[serde_json::Value]) -> Vec<&str> {
    lines.iter().filter_map(|v| v["type"].as_str()).collect()
}

#[test]
fn test_simulate_full_cycle() {
    let fixture = Fixture::new();
    let script = fixture.script("start\ntick 10\nleft on\nright on\ntick 5\n");
    let lines = simulate(&fixture, &script);

    let kinds = types(&lines);
    assert!(kinds.contains(&"work_started"));
    assert!(kinds.contains(&"break_alarm_started"));
    assert!(kinds.contains(&"break_countdown_started"));
    assert!(kinds.contains(&"break_completed"));

    let last = lines.last().unwrap();
    assert_eq!(last["type"], "snapshot");
    assert_eq!(last["phase"], "working");
    assert_eq!(last["display_secs"], 10);
    assert_eq!(last["sessions_completed"], 1);
}

#[test]
fn test_simulate_schedules_work_alert() {
    let fixture = Fixture::new();
    let script = fixture.script("start\n");
    let lines = simulate(&fixture, &script);

    let alert = lines
        .iter()
        .find(|v| v["type"] == "alert_scheduled")
        .expect("alert line");
    assert_eq!(alert["id"], "workSessionEnd");
    assert_eq!(alert["delay_secs"], 10);
}

#[test]
fn test_simulate_pulses_only_without_gate() {
    let fixture = Fixture::new();
    let script = fixture.script("start\ntick 10\npulse\nleft on\npulse\nright on\npulse\n");
    let lines = simulate(&fixture, &script);
    let pulses = types(&lines).into_iter().filter(|t| *t == "pulse").count();
    assert_eq!(pulses, 2);
}

#[test]
fn test_simulate_exit_at_rest_prompt() {
    let fixture = Fixture::new();
    let script = fixture.script(
        "start\ntick 10\nleft on\nright on\ntick 5\ntick 10\nprompt exit\nstatus\n",
    );
    let lines = simulate(&fixture, &script);
    let kinds = types(&lines);
    assert!(kinds.contains(&"rest_prompt_reached"));
    assert!(kinds.contains(&"exit_requested"));
    // Processing stops at exit: only the closing snapshot follows.
    assert_eq!(kinds.iter().filter(|t| **t == "snapshot").count(), 1);
    assert_eq!(lines.last().unwrap()["phase"], "awaiting_rest_prompt");
}

#[test]
fn test_simulate_background_gap() {
    let fixture = Fixture::new();
    let script = fixture.script("start\ntick 2\nbg\nadvance 5\nfg\nstatus\n");
    let lines = simulate(&fixture, &script);
    let last = lines.last().unwrap();
    assert_eq!(last["display_secs"], 3);
    assert_eq!(last["suspended"], false);
}

#[test]
fn test_simulate_rejects_bad_script() {
    let fixture = Fixture::new();
    let script = fixture.script("start\nwobble\n");
    let config = fixture.config();
    let (_, stderr, code) = run_cli(&[
        "simulate",
        script.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("line 2"), "{stderr}");
}

#[test]
fn test_config_set_and_get() {
    let fixture = Fixture::new();
    let config = fixture.config();
    let path = config.to_str().unwrap();

    let (_, stderr, code) = run_cli(&["config", "set", "session.work_minutes", "50", "--config", path]);
    assert_eq!(code, 0, "{stderr}");

    let (stdout, _, code) = run_cli(&["config", "get", "session.work_minutes", "--config", path]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "50");

    let (_, _, code) = run_cli(&["config", "set", "session.work_minutes", "0", "--config", path]);
    assert_ne!(code, 0);
}

#[test]
fn test_simulate_rejects_oversized_advance() {
    let fixture = Fixture::new();
    let script = fixture.script("start\nadvance 9223372036854775807\n");
    let config = fixture.config();
    let (_, stderr, code) = run_cli(&[
        "simulate",
        script.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(code, 1, "{stderr}");
    assert!(stderr.contains("line 2"), "{stderr}");
    assert!(!stderr.contains("panicked"), "{stderr}");
}

#[test]
fn test_simulate_held_contacts_start_break() {
    let fixture = Fixture::new();
    let script = fixture.script("start\nleft on\nright on\ntick 10\npulse\nstatus\n");
    let lines = simulate(&fixture, &script);
    let kinds = types(&lines);
    assert!(kinds.contains(&"break_countdown_started"));
    assert!(!kinds.contains(&"pulse"));
    assert_eq!(lines.last().unwrap()["phase"], "resting");
}
