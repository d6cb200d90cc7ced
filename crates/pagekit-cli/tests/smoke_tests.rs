//! Smoke tests for the pagekit binary
//!
//! Everything here runs against the offline replica, so no browser is
//! needed.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the pagekit binary, isolated from the caller's
/// environment and working directory
fn pagekit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pagekit").expect("pagekit binary should exist");
    cmd.current_dir(dir.path())
        .env_remove("CI")
        .env_remove("BASE_URL")
        .env_remove("RUST_LOG")
        .env_remove("PAGEKIT_CONFIG")
        .env_remove("PAGEKIT_ADMIN_EMAIL")
        .env_remove("PAGEKIT_ADMIN_PASSWORD")
        .env_remove("PAGEKIT_STUDENT_EMAIL")
        .env_remove("PAGEKIT_STUDENT_PASSWORD");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    pagekit(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    pagekit(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("test"))
        .stdout(predicate::str::contains("fixtures"));
}

#[test]
fn test_no_args_fails() {
    let dir = TempDir::new().unwrap();
    pagekit(&dir).assert().failure();
}

// ============================================================================
// Catalogue and fixtures
// ============================================================================

#[test]
fn test_list_command() {
    let dir = TempDir::new().unwrap();
    pagekit(&dir)
        .args(["list", "--filter", "admin/assessments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("admin/assessments > "))
        .stdout(predicate::str::contains("7 of "));
}

#[test]
fn test_fixtures_command() {
    let dir = TempDir::new().unwrap();
    pagekit(&dir)
        .arg("fixtures")
        .assert()
        .success()
        .stdout(predicate::str::contains("browser (external)"))
        .stdout(predicate::str::contains("no cycles"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_reads_default_file_and_redacts() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("pagekit.yaml"),
        "workers: 3\ncredentials:\n  admin:\n    email: lead@example.com\n    password: s3cret\n",
    )
    .unwrap();
    pagekit(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("workers: 3"))
        .stdout(predicate::str::contains("lead@example.com"))
        .stdout(predicate::str::contains("s3cret").not());
}

#[test]
fn test_invalid_config_exits_with_two() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pagekit.yaml"), "workers: 0\n").unwrap();
    pagekit(&dir)
        .arg("config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("workers"));
}

// ============================================================================
// Running against the replica
// ============================================================================

#[test]
fn test_mock_run_passes_and_writes_report() {
    let dir = TempDir::new().unwrap();
    pagekit(&dir)
        .args([
            "-q",
            "test",
            "--browser",
            "mock",
            "--filter",
            "student/webinars",
            "--reporter",
            "json",
            "--output",
            "out",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcomes\""));
    assert!(dir.path().join("out/report.json").is_file());
}

#[test]
fn test_failing_run_exits_with_one() {
    let dir = TempDir::new().unwrap();
    pagekit(&dir)
        .env("PAGEKIT_STUDENT_EMAIL", "maria.lopez@stormwind.test")
        .env("PAGEKIT_STUDENT_PASSWORD", "wrong")
        .args([
            "-q",
            "test",
            "--browser",
            "mock",
            "--filter",
            "student/webinars",
            "--output",
            "out",
        ])
        .assert()
        .code(1);
}

#[test]
fn test_unmatched_filter_is_rejected() {
    let dir = TempDir::new().unwrap();
    pagekit(&dir)
        .args(["test", "--browser", "mock", "--filter", "nothing matches this"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no scenario matches"));
}
