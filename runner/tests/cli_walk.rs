//! CLI tests for `task-runner validate`, `resolve` and `walk`.
//!
//! Spawns the binary against the fixture resources and checks exit codes and
//! output.

use std::path::PathBuf;
use std::process::{Command, Output};

use task_runner::exit_codes;
use task_runner::io::result_store::load_task_result;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn run_cli(args: &[&str]) -> Output {
    let temp = tempfile::tempdir().expect("tempdir");
    Command::new(env!("CARGO_BIN_EXE_task-runner"))
        .current_dir(temp.path())
        .env_remove("RUST_LOG")
        .arg("--resources")
        .arg(fixtures())
        .args(args)
        .output()
        .expect("spawn task-runner")
}

#[test]
fn validate_reports_summary() {
    let output = run_cli(&["validate", "tapping"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tapping: ok (8 steps, 2 sections, 3 async actions)"));
}

#[test]
fn validate_missing_resource_is_invalid() {
    let output = run_cli(&["validate", "broken"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("load task 'broken'"));
    assert!(stderr.contains("resource 'does_not_exist' not found"));
}

#[test]
fn resolve_prints_expanded_tree() {
    let output = run_cli(&["resolve", "survey"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["identifier"], "survey");
    assert_eq!(value["steps"][1]["type"], "section");
    assert_eq!(value["steps"][1]["steps"][0]["identifier"], "questions.mood");
}

#[test]
fn walk_prints_progress_and_async_windows() {
    let output = run_cli(&["walk", "tapping"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        &lines[..lines.len() - 1],
        &[
            "  start location",
            "[1/5] overview",
            "[2/5] instruction",
            "  start left.motion",
            "[3/5] left.instruction",
            "[3/5] left.countdown",
            "[3/5] left.tap",
            "  stop left.motion",
            "  start right.motion",
            "[4/5] right.instruction",
            "[4/5] right.countdown",
            "[4/5] right.tap",
            "  stop right.motion",
            "[5/5] completion",
            "  stop location",
        ]
    );
    assert!(lines[lines.len() - 1].starts_with("finished 8 steps"));
}

#[test]
fn walk_writes_task_result() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("survey-result.json");
    let output = run_cli(&["walk", "survey", "--output", path.to_str().expect("utf8 path")]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let result = load_task_result(&path).expect("load result");
    let ids: Vec<&str> = result.completed_identifiers().collect();
    assert_eq!(ids, vec!["intro", "questions.mood", "questions.sleep", "done"]);
    assert!(result.end_time.is_some());
}

#[test]
fn invalid_config_is_rejected() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("task-runner.toml");
    std::fs::write(&config, "identifier_separator = \"\"\n").expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_task-runner"))
        .arg("--config")
        .arg(&config)
        .args(["validate", "tapping"])
        .output()
        .expect("spawn task-runner");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}
