//! CLI integration tests for cqlmig
//!
//! Each test copies a fixture scripts directory into a temporary workspace
//! with its own config and DuckDB files, then drives the binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the compiled cqlmig binary (resolved at compile time)
fn cqlmig_bin() -> String {
    env!("CARGO_BIN_EXE_cqlmig").to_string()
}

const CONFIG: &str = "\
scripts:
  path: ../migrations
environments:
  local:
    endpoint: ../local.duckdb
    keyspace: main
  dev:
    endpoint: ../dev.duckdb
    keyspace: main
";

/// Build a workspace holding `conf/migrate.yml` and a copy of `fixture`.
fn workspace(fixture: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let conf_dir = dir.path().join("conf");
    let scripts = dir.path().join("migrations");
    fs::create_dir_all(&conf_dir).unwrap();
    fs::create_dir_all(&scripts).unwrap();
    fs::write(conf_dir.join("migrate.yml"), CONFIG).unwrap();

    let source = Path::new("tests/fixtures").join(fixture);
    for entry in fs::read_dir(source).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), scripts.join(entry.file_name())).unwrap();
    }
    dir
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(cqlmig_bin())
        .current_dir(dir.path())
        .args(args)
        .output()
        .expect("Failed to run cqlmig")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn combined(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command should succeed:\n{}",
        combined(output)
    );
}

// ── create ──────────────────────────────────────────────────────────────

#[test]
fn test_create_writes_sanitized_template() {
    let dir = workspace("migrations");
    let output = run(&dir, &["create", "Add Orders Table"]);
    assert_success(&output);

    let created: Vec<String> = fs::read_dir(dir.path().join("migrations"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.ends_with("_add_orders_table.all.cql"))
        .collect();
    assert_eq!(created.len(), 1, "created: {created:?}");
    assert_eq!(created[0].len(), "202001010000_add_orders_table.all.cql".len());

    let content = fs::read(dir.path().join("migrations").join(&created[0])).unwrap();
    assert!(content.is_empty());
}

#[test]
fn test_create_with_target_env() {
    let dir = workspace("migrations");
    let output = run(&dir, &["create", "seed_orders", "--target-env", "dev"]);
    assert_success(&output);
    assert!(stdout(&output).contains("_seed_orders.dev.cql"));
}

// ── list ────────────────────────────────────────────────────────────────

#[test]
fn test_list_shows_status_per_environment() {
    let dir = workspace("migrations");
    let output = run(&dir, &["list"]);
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("create_users"));
    assert!(out.contains("pending"));
    assert!(out.contains("skipped"), "dev-only script is skipped locally:\n{out}");
    assert!(!out.contains("README"));
}

#[test]
fn test_list_reports_unparseable_files_and_fails() {
    let dir = workspace("broken");
    let output = run(&dir, &["list"]);
    assert!(!output.status.success());

    let all = combined(&output);
    assert!(all.contains("ok"));
    assert!(all.contains("not_a_migration.cql"));
    assert!(all.contains("[E005]"));
}

// ── up ──────────────────────────────────────────────────────────────────

#[test]
fn test_up_is_a_dry_run_by_default() {
    let dir = workspace("migrations");
    let output = run(&dir, &["up"]);
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("Dry run"));
    assert!(out.contains("201912031045_create_users.all.cql"));

    let log = run(&dir, &["log"]);
    assert_success(&log);
    assert!(stdout(&log).contains("No migrations applied"));
}

#[test]
fn test_up_applies_then_is_idempotent() {
    let dir = workspace("migrations");
    let output = run(&dir, &["up", "--dryrun=false"]);
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("Applied 201912031045_create_users.all.cql"));
    assert!(out.contains("Applied 202001101530_add_email.all.cql"));
    assert!(!out.contains("seed_users"));

    let again = run(&dir, &["up", "--dryrun=false"]);
    assert_success(&again);
    assert!(stdout(&again).contains("0 applied, 2 already applied, 1 skipped"));

    let list = run(&dir, &["list"]);
    assert_success(&list);
    assert!(!stdout(&list).contains("pending"));
}

#[test]
fn test_up_respects_environment() {
    let dir = workspace("migrations");
    let output = run(&dir, &["--env", "dev", "--dryrun=false", "up"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Applied 201912041200_seed_users.dev.cql"));

    let log = run(&dir, &["log", "--env", "dev"]);
    assert_success(&log);
    let out = stdout(&log);
    assert!(out.contains("seed_users"));
    assert!(out.contains("3 migrations applied"));

    let local = run(&dir, &["log"]);
    assert!(stdout(&local).contains("No migrations applied"));
}

#[test]
fn test_up_refuses_to_run_with_unparseable_files() {
    let dir = workspace("broken");
    let output = run(&dir, &["up", "--dryrun=false"]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("[G009]"));

    let log = run(&dir, &["log"]);
    assert!(stdout(&log).contains("No migrations applied"));
}

#[test]
fn test_up_halts_after_failing_migration() {
    let dir = workspace("migrations");
    fs::write(
        dir.path()
            .join("migrations")
            .join("201912101200_broken.all.cql"),
        "INSERT INTO nowhere VALUES (1);",
    )
    .unwrap();

    let output = run(&dir, &["up", "--dryrun=false"]);
    assert!(!output.status.success());
    let all = combined(&output);
    assert!(all.contains("[G008]"), "{all}");
    assert!(!all.contains("Applied 202001101530_add_email.all.cql"));

    let log = run(&dir, &["log"]);
    let out = stdout(&log);
    assert!(out.contains("create_users"));
    assert!(out.contains("broken"));
    assert!(!out.contains("add_email"));
}

// ── configuration errors ────────────────────────────────────────────────

#[test]
fn test_unknown_environment_fails() {
    let dir = workspace("migrations");
    let output = run(&dir, &["list", "--env", "staging"]);
    assert!(!output.status.success());
    let all = combined(&output);
    assert!(all.contains("[E004]"));
    assert!(all.contains("staging"));
}

#[test]
fn test_missing_config_fails() {
    let dir = workspace("migrations");
    let output = run(&dir, &["list", "--conf", "conf/absent.yml"]);
    assert!(!output.status.success());
    assert!(combined(&output).contains("[E001]"));
}
