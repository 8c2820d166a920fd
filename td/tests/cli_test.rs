//! Integration tests for the `td` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A config whose LLM endpoint refuses connections, plus isolated dirs
fn offline_env() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = dir.path().join("tododesk.yml");
    let config = format!(
        "log-level: debug\n\
         llm:\n  base-url: http://127.0.0.1:1\n  api-key-env: TODODESK_TEST_NO_KEY\n  timeout-ms: 1000\n\
         storage:\n  db-path: {}\n",
        dir.path().join("tododata.db").display()
    );
    std::fs::write(&config_path, config).expect("Failed to write config");
    (dir, config_path)
}

fn td(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("td").expect("td binary not built");
    cmd.env("HOME", dir.path())
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .current_dir(dir.path());
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let (dir, _) = offline_env();
    td(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("parse"))
        .stdout(predicate::str::contains("test-ai"));
}

#[test]
fn test_parse_prints_fallback_when_offline() {
    let (dir, config) = offline_env();
    let output = td(&dir)
        .arg("-c")
        .arg(&config)
        .args(["parse", "buy", "milk"])
        .output()
        .expect("Failed to run td");

    assert!(output.status.success());
    let task: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(
        task,
        serde_json::json!({"title": "buy milk", "category": "Other", "priority": 2})
    );
}

#[test]
fn test_parse_rejects_blank_input() {
    let (dir, config) = offline_env();
    td(&dir)
        .arg("-c")
        .arg(&config)
        .args(["parse", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input is required"));
}

#[test]
fn test_test_ai_fails_when_offline() {
    let (dir, config) = offline_env();
    td(&dir)
        .arg("-c")
        .arg(&config)
        .arg("test-ai")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("AI connection failed"));
}

#[test]
fn test_missing_config_file_is_fatal() {
    let (dir, _) = offline_env();
    td(&dir)
        .args(["-c", "does-not-exist.yml", "parse", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_unknown_provider_is_fatal() {
    let (dir, _) = offline_env();
    let config = dir.path().join("bad.yml");
    std::fs::write(&config, "llm:\n  provider: gemini\n").expect("Failed to write config");

    td(&dir)
        .arg("-c")
        .arg(&config)
        .args(["parse", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown LLM provider"));
}
