//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs.

use std::process::Command;

/// Run a CLI command and return output.
fn run_cli(args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "capsule-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).expect("line is not JSON"))
        .collect()
}

#[test]
fn test_simulate_demo() {
    let (code, stdout, stderr) = run_cli(&["simulate"]);
    assert_eq!(code, 0, "simulate failed: {stderr}");

    let lines = json_lines(&stdout);
    assert!(!lines.is_empty());
    assert!(stdout.contains("WiFi|enabled"));

    let last = lines.last().unwrap();
    assert_eq!(last["type"], "Summary");
    assert_eq!(last["showing"], true);
}

#[test]
fn test_simulate_wifi_script() {
    let dir = std::env::temp_dir().join(format!("capsule-cli-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let script = dir.join("wifi.toml");
    std::fs::write(
        &script,
        "[[step]]\nat_ms = 0\naction = \"switch\"\nid = \"wifi\"\nlabel = \"WiFi\"\nstate = true\n",
    )
    .unwrap();

    let (code, stdout, stderr) = run_cli(&[
        "simulate",
        "--script",
        script.to_str().unwrap(),
        "--until",
        "2500",
    ]);
    assert_eq!(code, 0, "simulate failed: {stderr}");

    let lines = json_lines(&stdout);
    let flips: Vec<bool> = lines
        .iter()
        .filter(|line| line["type"] == "ExpandedStateChanged")
        .map(|line| line["expanded"].as_bool().unwrap())
        .collect();
    assert_eq!(flips, vec![true, false]);

    let summary = lines.last().unwrap();
    assert_eq!(summary["expanded"], false);
    assert_eq!(summary["stats"]["live"], 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_simulate_frames() {
    let (code, stdout, _) = run_cli(&["simulate", "--until", "500", "--frames", "100"]);
    assert_eq!(code, 0);
    let frames = json_lines(&stdout)
        .into_iter()
        .filter(|line| line["type"] == "Frame")
        .count();
    assert!(frames >= 5);
}

#[test]
fn test_simulate_rejects_bad_script() {
    let dir = std::env::temp_dir().join(format!("capsule-cli-bad-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let script = dir.join("bad.toml");
    std::fs::write(&script, "[[step]]\nat_ms = 0\naction = \"explode\"\n").unwrap();

    let (code, _, stderr) = run_cli(&["simulate", "--script", script.to_str().unwrap()]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_config_keys() {
    let (code, stdout, _) = run_cli(&["config", "keys"]);
    assert_eq!(code, 0);
    assert!(stdout.lines().any(|line| line == "island.scale"));
    assert!(stdout.lines().any(|line| line == "timings.grace_period_ms"));
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (code, _, stderr) = run_cli(&["config", "get", "island.nonexistent"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown configuration key: island.nonexistent"));
}

#[test]
fn test_simulate_logs_steps_at_debug() {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "capsule-cli", "--", "simulate", "--until", "100"])
        .env("CAPSULE_LOG", "debug")
        .output()
        .expect("Failed to execute CLI command");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("applying script step"));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("applying script step"));
}
