//! Smoke tests for the shopcheck binary
//!
//! Runs go through the in-memory storefront so no browser is needed.

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn shopcheck() -> Command {
    Command::cargo_bin("shopcheck").expect("shopcheck binary should exist")
}

/// Config file whose every output path lives under `dir`
fn write_config(dir: &TempDir) -> PathBuf {
    let root = dir.path().display();
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        format!(
            "app:
  base_url: https://automationexercise.com
browser:
  headless: true
  implicit_wait: 1
  explicit_wait: 1
logging:
  level: WARN
  file: {root}/reports/logs/automation.log
reports:
  dir: {root}/reports
test_data:
  users_file: {root}/data/users.json
  products_file: {root}/data/products.json
  scenarios_file: {root}/data/test_data.json
"
        ),
    )
    .unwrap();
    path
}

// ============================================================================
// Basic CLI
// ============================================================================

#[test]
fn test_version_flag() {
    shopcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_subcommands() {
    shopcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("setup-data"))
        .stdout(predicate::str::contains("storefront"));
}

#[test]
fn test_no_args_fails() {
    shopcheck().assert().failure();
}

#[test]
fn test_run_help_shows_flags() {
    shopcheck()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--rerun-delay"))
        .stdout(predicate::str::contains("--workers"))
        .stdout(predicate::str::contains("--markers"));
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list_all() {
    shopcheck()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("cart::page_loads"))
        .stdout(predicate::str::contains("auth::registration_and_login_flow"))
        .stdout(predicate::str::contains("scenario(s)"));
}

#[test]
fn test_list_with_marker_expression() {
    shopcheck()
        .args(["list", "-m", "contact and regression"])
        .assert()
        .success()
        .stdout(predicate::str::contains("contact::empty_name_stays_on_form"))
        .stdout(predicate::str::contains("home::page_loads").not());
}

#[test]
fn test_list_markers() {
    shopcheck()
        .args(["list", "--show-markers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("subscription"))
        .stdout(predicate::str::contains("timing measurements"));
}

#[test]
fn test_unknown_marker_fails() {
    shopcheck()
        .args(["list", "-m", "flaky"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown marker"));
}

// ============================================================================
// config-backed commands
// ============================================================================

#[test]
fn test_missing_config_fails() {
    shopcheck()
        .args(["config", "--config", "/no/such/config.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_config_prints_settings() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    shopcheck()
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("https://automationexercise.com"))
        .stdout(predicate::str::contains("\"headless\": true"));
}

#[test]
fn test_config_key_lookup() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    shopcheck()
        .args(["config", "--key", "browser.implicit_wait", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("browser.implicit_wait = 1"));
}

#[test]
fn test_setup_data_writes_templates() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    shopcheck()
        .arg("setup-data")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    let users = fs::read_to_string(dir.path().join("data/users.json")).unwrap();
    assert!(users.contains("valid_user"));
    assert!(dir.path().join("data/test_data.json").exists());
}

#[test]
fn test_clean_creates_report_tree() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    shopcheck()
        .arg("clean")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    assert!(dir.path().join("reports/screenshots").is_dir());
    assert!(dir.path().join("reports/page_sources").is_dir());
}

// ============================================================================
// run against the mock storefront
// ============================================================================

#[test]
fn test_mock_run_passes_and_writes_reports() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    shopcheck()
        .args([
            "run",
            "--backend",
            "mock",
            "--suite",
            "all",
            "-k",
            "home::page_loads",
            "--reruns",
            "0",
            "--report",
            "json,junit",
            "--color",
            "never",
            "--config",
        ])
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("PASSED 1 scenarios"));
    let results = fs::read_to_string(dir.path().join("reports/results.json")).unwrap();
    assert!(results.contains("page_loads"));
    assert!(dir.path().join("reports/junit.xml").exists());
}

#[test]
fn test_mock_run_empty_selection() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir);
    shopcheck()
        .args(["run", "--backend", "mock", "-k", "no-such-case", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stderr(predicate::str::contains("no scenarios match"));
}
