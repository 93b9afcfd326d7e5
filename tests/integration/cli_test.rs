//! Tests for the `imsg` binary

use predicates::prelude::*;
use tempfile::TempDir;

use super::helpers::{imsg_cmd, small_chat_db};

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    imsg_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn analyze_without_consent_in_non_interactive_mode_exits_cleanly() {
    let dir = TempDir::new().unwrap();
    let db = small_chat_db(&dir);

    imsg_cmd(dir.path())
        .args(["analyze", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Privacy Notice"))
        .stdout(predicate::str::contains("User consent not provided"))
        .stdout(predicate::str::contains("Successfully connected").not());
}

#[test]
fn preview_counts_messages_per_contact() {
    let dir = TempDir::new().unwrap();
    let db = small_chat_db(&dir);

    imsg_cmd(dir.path())
        .args(["preview", "--consent", "--days", "1", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Contact_1: 3 messages"))
        .stdout(predicate::str::contains("Contact_2: 2 messages"))
        .stdout(predicate::str::contains("Processed 5 messages from 2 contacts"))
        .stdout(predicate::str::contains("+15550001111").not());
}

#[test]
fn preview_accepts_largest_days_value() {
    let dir = TempDir::new().unwrap();
    let db = small_chat_db(&dir);

    imsg_cmd(dir.path())
        .args(["preview", "--consent", "--days", "4294967295", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 5 messages from 2 contacts"));
}

#[test]
fn analyze_with_unknown_provider_reports_failure_in_result() {
    let dir = TempDir::new().unwrap();
    let db = small_chat_db(&dir);

    imsg_cmd(dir.path())
        .args(["analyze", "--consent", "--api", "bogus", "--days", "1", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Retrieved 5 messages from 2 contacts"))
        .stdout(predicate::str::contains("Known providers: openai, anthropic"))
        .stdout(predicate::str::contains("Analysis failed: Unsupported API provider: bogus"))
        .stdout(predicate::str::contains("Analysis complete!"));
}

#[test]
fn analyze_without_api_key_reports_missing_variable() {
    let dir = TempDir::new().unwrap();
    let db = small_chat_db(&dir);

    imsg_cmd(dir.path())
        .env_remove("OPENAI_API_KEY")
        .args(["analyze", "--consent", "--api", "openai", "--days", "1", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Analysis failed: OPENAI_API_KEY environment variable not set",
        ))
        .stdout(predicate::str::contains("Known providers").not());
}

#[test]
fn analyze_json_output_is_parseable() {
    let dir = TempDir::new().unwrap();
    let db = small_chat_db(&dir);

    let output = imsg_cmd(dir.path())
        .args(["analyze", "--consent", "--json", "--api", "bogus", "--days", "1", "--db"])
        .arg(&db)
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["narrative"]
        .as_str()
        .unwrap()
        .starts_with("Analysis failed:"));
    assert_eq!(value["key_events"], serde_json::json!([]));
}

#[test]
fn missing_database_is_fatal() {
    let dir = TempDir::new().unwrap();

    imsg_cmd(dir.path())
        .args(["analyze", "--consent", "--db"])
        .arg(dir.path().join("missing.db"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Messages database not found"));
}

#[test]
fn config_init_writes_defaults_once() {
    let dir = TempDir::new().unwrap();

    imsg_cmd(dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("provider = \"anthropic\""));

    imsg_cmd(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_file_selects_provider() {
    let dir = TempDir::new().unwrap();
    let db = small_chat_db(&dir);
    std::fs::write(
        dir.path().join("config.toml"),
        "[analysis]\nprovider = \"nosuch\"\n",
    )
    .unwrap();

    imsg_cmd(dir.path())
        .args(["analyze", "--consent", "--days", "1", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Unsupported API provider: nosuch"));
}
