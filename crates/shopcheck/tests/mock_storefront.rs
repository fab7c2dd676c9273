//! End-to-end flows against the in-memory storefront, through the public
//! runner API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use shopcheck::mock::storefront::Storefront;
use shopcheck::{Backend, DataManager, RunOptions, Runner, Suite, TestStatus};
use std::time::Duration;
use tempfile::TempDir;

fn runner(dir: &TempDir, options: RunOptions) -> Runner {
    let settings = Storefront::settings(dir.path().join("reports"));
    DataManager::new(settings.data.clone())
        .create_test_data_templates()
        .unwrap();
    Runner::new(
        settings,
        options
            .with_backend(Backend::Mock)
            .with_reruns(0, Duration::ZERO),
    )
}

async fn run_one(id: &str) -> TestStatus {
    let dir = TempDir::new().unwrap();
    let runner = runner(&dir, RunOptions::default().with_suite(Suite::All).with_filter(id));
    let reporter = runner.run(|_| {}).await.unwrap();
    assert_eq!(reporter.total_count(), 1, "filter {id} should select one case");
    let result = &reporter.results()[0];
    if !result.status.is_passed() {
        eprintln!("{id}: {:?}", result.error);
    }
    result.status
}

#[tokio::test]
async fn test_dress_search_end_to_end() {
    assert_eq!(run_one("products::search_dress_end_to_end").await, TestStatus::Passed);
}

#[tokio::test]
async fn test_add_from_home_reaches_cart() {
    assert_eq!(run_one("cart::add_from_home").await, TestStatus::Passed);
}

#[tokio::test]
async fn test_contact_form_without_name_stays_put() {
    assert_eq!(run_one("contact::empty_name_stays_on_form").await, TestStatus::Passed);
}

#[tokio::test]
async fn test_register_logout_login() {
    assert_eq!(run_one("auth::registration_and_login_flow").await, TestStatus::Passed);
}

#[tokio::test]
async fn test_duplicate_signup_is_rejected() {
    assert_eq!(run_one("auth::existing_email_rejected").await, TestStatus::Passed);
}

#[tokio::test]
async fn test_quantity_update_is_kept_by_the_shop() {
    assert_eq!(run_one("cart::update_quantity").await, TestStatus::Passed);
}

#[tokio::test]
async fn test_parallel_smoke_suite_writes_reports() {
    let dir = TempDir::new().unwrap();
    let runner = runner(&dir, RunOptions::default().with_workers(4));
    let reporter = runner.run(|_| {}).await.unwrap();
    assert!(reporter.total_count() >= 5);
    assert_eq!(
        reporter.failed_count() + reporter.error_count(),
        0,
        "{}",
        reporter.render_text()
    );

    let written = reporter
        .write_reports(&dir.path().join("reports"), &shopcheck::ReportFormat::ALL)
        .unwrap();
    assert_eq!(written.len(), 4);
    let junit = std::fs::read_to_string(dir.path().join("reports/junit.xml")).unwrap();
    assert!(junit.contains("testsuite"));
}
