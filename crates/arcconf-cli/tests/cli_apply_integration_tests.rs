//! CLI integration tests
//!
//! These tests run the `arcconf` binary against a temporary database and
//! check both its output and what ends up in the store.

use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const DOC_V1: &str = r#"
format_version: 1
device: arc
archive:
  overwritePolicy: SAME_SOURCE
  queues:
    - queueName: StgCmt
      maxRetries: 3
    - queueName: Export1
"#;

const DOC_V2: &str = r#"
format_version: 1
device: arc
archive:
  overwritePolicy: SAME_SOURCE
  queues:
    - queueName: StgCmt
      maxRetries: 5
"#;

fn write_doc(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn run(db: &Path, args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_arcconf"))
        .arg("--db")
        .arg(db)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI");
    assert!(
        output.status.success(),
        "CLI command {:?} should succeed. Stderr: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn entry_count(db: &Path) -> i64 {
    let conn = Connection::open(db).unwrap();
    conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_cli_apply_then_reapply_is_noop() {
    // Scenario: applying a document twice
    // When: `arcconf apply doc.yaml` runs twice
    // Then: the first run creates entries and records a run; the second changes nothing

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("arcconf.db");
    let doc = write_doc(&dir, "doc.yaml", DOC_V1);

    let output = run(&db, &["apply", doc.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ops_applied: 3"), "stdout: {}", stdout);

    // 4 default ancestors, the device holding the archive, 2 queues
    assert_eq!(entry_count(&db), 7);

    let output = run(&db, &["apply", doc.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("_No changes._"), "stdout: {}", stdout);
    assert!(stdout.contains("ops_applied: 0"));
    assert_eq!(entry_count(&db), 7);

    let conn = Connection::open(&db).unwrap();
    let runs: i64 = conn
        .query_row("SELECT COUNT(*) FROM reconcile_runs", [], |row| row.get(0))
        .unwrap();
    assert_eq!(runs, 1);
}

#[test]
fn test_cli_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("arcconf.db");
    let doc = write_doc(&dir, "doc.yaml", DOC_V1);

    let output = run(&db, &["apply", "--dry-run", doc.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ops_planned: 3"), "stdout: {}", stdout);
    assert_eq!(entry_count(&db), 0);
}

#[test]
fn test_cli_show_round_trips_applied_document() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("arcconf.db");
    let doc = write_doc(&dir, "doc.yaml", DOC_V1);
    run(&db, &["apply", doc.to_str().unwrap()]);

    // The shown document, applied again, plans nothing
    let output = run(&db, &["show", "arc"]);
    let shown = write_doc(&dir, "shown.yaml", &String::from_utf8_lossy(&output.stdout));
    let output = run(&db, &["diff", doc.to_str().unwrap(), shown.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ops_planned: 0"), "stdout: {}", stdout);
}

#[test]
fn test_cli_diff_json_lists_changes_in_order() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("arcconf.db");
    let prev = write_doc(&dir, "v1.yaml", DOC_V1);
    let curr = write_doc(&dir, "v2.yaml", DOC_V2);

    let output = run(
        &db,
        &[
            "diff",
            "--json",
            "--verbose",
            prev.to_str().unwrap(),
            curr.to_str().unwrap(),
        ],
    );
    let log: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let kinds: Vec<&str> = log["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["deleted", "updated"]);

    // diff never opens the store
    assert!(!db.exists());
}

#[test]
fn test_cli_init_and_history() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("nested").join("arcconf.db");

    let output = run(&db, &["init", "arc"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("entries_created: 5"));
    let output = run(&db, &["init", "arc"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("already provisioned"));

    let output = run(&db, &["history", "arc"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("No runs recorded"));

    let doc = write_doc(&dir, "doc.yaml", DOC_V1);
    run(&db, &["apply", doc.to_str().unwrap()]);
    let output = run(&db, &["history", "--json", "arc"]);
    let runs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(runs.as_array().unwrap().len(), 1);
    assert_eq!(runs[0]["created"], 3);
}

#[test]
fn test_cli_rejects_unknown_field() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("arcconf.db");
    let doc = write_doc(
        &dir,
        "bad.yaml",
        "format_version: 1\ndevice: arc\narchive:\n  queues:\n    - queueName: Q\n      bogus: 1\n",
    );

    let output = Command::new(env!("CARGO_BIN_EXE_arcconf"))
        .arg("--db")
        .arg(&db)
        .args(["apply", doc.to_str().unwrap()])
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_cli_schema_describes_queue() {
    let output = Command::new(env!("CARGO_BIN_EXE_arcconf"))
        .args(["schema", "queue"])
        .output()
        .expect("Failed to execute CLI");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("queueName: str [dcmQueueName]"));
    assert!(stdout.contains("maxRetries: int [dcmMaxRetries] default=0"));
}
