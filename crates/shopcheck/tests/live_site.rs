//! Checks against the live storefront. They need Chromium and network
//! access, so they only build with the `browser` feature and are ignored by
//! default: `cargo test --features browser -- --ignored`.

#![cfg(feature = "browser")]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use shopcheck::{Backend, RunOptions, Runner, Settings, Suite};
use std::time::Duration;

fn live_settings() -> Settings {
    let mut settings = Settings::default();
    settings.browser.headless = true;
    settings.reports_dir = std::env::temp_dir().join("shopcheck-live");
    settings.logging.file = None;
    settings
}

#[tokio::test]
#[ignore = "needs Chromium and network access"]
async fn test_live_smoke_suite() {
    let runner = Runner::new(
        live_settings(),
        RunOptions::default()
            .with_suite(Suite::Smoke)
            .with_backend(Backend::Browser)
            .with_reruns(1, Duration::from_secs(3)),
    );
    let reporter = runner.run(|_| {}).await.unwrap();
    assert_eq!(
        reporter.failed_count() + reporter.error_count(),
        0,
        "{}",
        reporter.render_text()
    );
}

#[tokio::test]
#[ignore = "needs Chromium and network access"]
async fn test_live_dress_search() {
    let runner = Runner::new(
        live_settings(),
        RunOptions::default()
            .with_suite(Suite::All)
            .with_filter("products::search_dress_end_to_end")
            .with_reruns(0, Duration::ZERO),
    );
    let reporter = runner.run(|_| {}).await.unwrap();
    assert!(reporter.all_passed(), "{}", reporter.render_text());
}
