//! Tests that drive the `logiq` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE: &str = "\
2025-10-04 15:45:00 INFO System started
2025-10-04 15:46:10 ERROR NullPointer in handler
not a log line
2025-10-04 15:47:30 WARN Disk usage high
2025-10-04 15:48:00 ERROR Timeout waiting for db
";

fn logiq(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("logiq").expect("binary built");
    cmd.env_remove("LOGIQ_CONFIG")
        .env_remove("LOGIQ_DB")
        .env_remove("LOGIQ_DIAGNOSTICS_LOG")
        .env_remove("RUST_LOG")
        .current_dir(dir)
        .arg("--db")
        .arg(dir.join("db").join("logiq.db"))
        .arg("--diagnostics-log")
        .arg(dir.join("logiq_app.log"))
        .arg("--no-color");
    cmd
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("app.log"), SAMPLE).expect("write sample");
    dir
}

#[test]
fn ingest_reports_counts() {
    let dir = workspace();
    logiq(dir.path())
        .args(["ingest", "app.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted:         4"))
        .stdout(predicate::str::contains("Skipped:          1"));

    assert!(dir.path().join("db").join("logiq.db").exists());
    let diagnostics = fs::read_to_string(dir.path().join("logiq_app.log")).expect("diagnostics");
    assert!(diagnostics.contains("ingestion complete"));
}

#[test]
fn second_ingest_only_finds_duplicates() {
    let dir = workspace();
    logiq(dir.path()).args(["ingest", "app.log"]).assert().success();
    logiq(dir.path())
        .args(["ingest", "app.log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted:         0"))
        .stdout(predicate::str::contains("Duplicates:       4"));
}

#[test]
fn summary_after_ingest() {
    let dir = workspace();
    logiq(dir.path()).args(["ingest", "app.log"]).assert().success();
    logiq(dir.path())
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total log entries: 4"))
        .stdout(predicate::str::contains("ERROR: 2"))
        .stdout(predicate::str::contains("NullPointer → 1"));
}

#[test]
fn search_level_json() {
    let dir = workspace();
    logiq(dir.path()).args(["ingest", "app.log"]).assert().success();
    let output = logiq(dir.path())
        .args(["--format", "json", "search", "level", "error"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let records = value["records"].as_array().expect("records");
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["level"] == "ERROR"));
}

#[test]
fn list_with_limit_and_page() {
    let dir = workspace();
    logiq(dir.path()).args(["ingest", "app.log"]).assert().success();
    logiq(dir.path())
        .args(["list", "--limit", "3", "--page", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logs (page 2):"))
        .stdout(predicate::str::contains("Msg: Timeout waiting for db"))
        .stdout(predicate::str::contains("System started").not());
}

#[test]
fn search_range_is_inclusive() {
    let dir = workspace();
    logiq(dir.path()).args(["ingest", "app.log"]).assert().success();
    logiq(dir.path())
        .args(["search", "range", "2025-10-04 15:46:10", "2025-10-04 15:47:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NullPointer in handler"))
        .stdout(predicate::str::contains("Disk usage high"))
        .stdout(predicate::str::contains("System started").not());
}

#[test]
fn empty_store_lists_nothing() {
    let dir = workspace();
    logiq(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No logs found."));
}

#[test]
fn invalid_inputs_fail() {
    let dir = workspace();
    logiq(dir.path())
        .args(["search", "level", "DEBUG"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid log level"));

    logiq(dir.path())
        .args(["list", "--limit", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("limit must not be negative"));

    logiq(dir.path())
        .args(["ingest", "missing.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("source unreadable"));
}

#[test]
fn config_file_sets_page_size() {
    let dir = workspace();
    fs::write(dir.path().join("logiq.json"), r#"{ "page_size": 1 }"#).expect("write config");
    logiq(dir.path()).args(["ingest", "app.log"]).assert().success();
    logiq(dir.path())
        .args(["--config", "logiq.json", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ID: 1 |"))
        .stdout(predicate::str::contains("ID: 2 |").not());
}

#[test]
fn invalid_config_fails() {
    let dir = workspace();
    fs::write(dir.path().join("logiq.json"), r#"{ "batch_size": 0 }"#).expect("write config");
    logiq(dir.path())
        .args(["--config", "logiq.json", "summary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch_size"));
}

#[test]
fn console_session_from_stdin() {
    let dir = workspace();
    logiq(dir.path())
        .write_stdin("1\napp.log\n4\nwarn\n5\nq\n8\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome to LogIQ"))
        .stdout(predicate::str::contains("Logs with level = WARN (page 1):"))
        .stdout(predicate::str::contains("Level: WARN | Msg: Disk usage high"))
        .stdout(predicate::str::contains("End of LogIQ Session"));
}
