//! Result aggregation and reports.
//!
//! A [`Reporter`] collects one [`CaseResult`] per scenario and renders
//! them as a console summary, `results.json`, `junit.xml` and
//! `report.html` under the reports directory.

use crate::result::{ShopError, ShopResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Final outcome of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    /// Every check held
    Passed,
    /// A check did not hold
    Failed,
    /// The session broke (launch, navigation, driver)
    Error,
    /// The scenario stopped on an unmet precondition
    Skipped,
}

impl TestStatus {
    /// Status for a scenario outcome
    #[must_use]
    pub const fn classify(outcome: &ShopResult<()>) -> Self {
        match outcome {
            Ok(()) => Self::Passed,
            Err(e) if e.is_skip() => Self::Skipped,
            Err(e) if e.is_assertion() => Self::Failed,
            Err(_) => Self::Error,
        }
    }

    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Failed or errored
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Error)
    }

    /// Lower-case label used in logs and reports
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One scenario's result after any reruns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    /// Scenario name
    pub name: String,
    /// Scenario group (`home`, `cart`, ...)
    pub group: String,
    /// Marker labels
    pub markers: Vec<String>,
    /// Outcome of the last attempt
    pub status: TestStatus,
    /// Duration of the last attempt
    pub duration: Duration,
    /// Attempts made, reruns included
    pub attempts: u32,
    /// Error message of the last attempt
    pub error: Option<String>,
    /// When the last attempt finished
    pub finished_at: DateTime<Utc>,
}

impl CaseResult {
    /// Result from a scenario outcome
    #[must_use]
    pub fn from_outcome(
        name: impl Into<String>,
        group: impl Into<String>,
        outcome: &ShopResult<()>,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            markers: Vec::new(),
            status: TestStatus::classify(outcome),
            duration,
            attempts: 1,
            error: outcome.as_ref().err().map(ShopError::to_string),
            finished_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self::from_outcome(name, "", &Ok(()), duration)
    }

    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, message: impl Into<String>) -> Self {
        Self::from_outcome(name, "", &Err(ShopError::assertion(message)), duration)
    }

    #[must_use]
    pub fn with_markers(mut self, markers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.markers = markers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

/// Report file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportFormat {
    /// `summary.txt`
    Text,
    /// `results.json`
    Json,
    /// `junit.xml`
    Junit,
    /// `report.html`
    Html,
}

impl ReportFormat {
    pub const ALL: [Self; 4] = [Self::Text, Self::Json, Self::Junit, Self::Html];

    /// File name inside the reports directory
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Text => "summary.txt",
            Self::Json => "results.json",
            Self::Junit => "junit.xml",
            Self::Html => "report.html",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "junit" | "xml" => Ok(Self::Junit),
            "html" => Ok(Self::Html),
            other => Err(ShopError::config(format!("unknown report format: {other}"))),
        }
    }
}

/// Serialized form of `results.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub suite: String,
    pub started_at: Option<DateTime<Utc>>,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub duration: Duration,
    pub results: Vec<CaseResult>,
}

/// Collects results and renders reports
#[derive(Debug, Default)]
pub struct Reporter {
    suite_name: String,
    results: Vec<CaseResult>,
    started_at: Option<DateTime<Utc>>,
}

impl Reporter {
    #[must_use]
    pub fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            ..Self::default()
        }
    }

    /// Mark the start of the run
    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
    }

    pub fn record(&mut self, result: CaseResult) {
        self.results.push(result);
    }

    #[must_use]
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    #[must_use]
    pub fn results(&self) -> &[CaseResult] {
        &self.results
    }

    fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(TestStatus::Error)
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Share of executed (non-skipped) scenarios that passed, 0.0 to 1.0
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let executed = self.total_count() - self.skipped_count();
        if executed == 0 {
            return 1.0;
        }
        self.passed_count() as f64 / executed as f64
    }

    /// No failures and no errors
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| !r.status.is_failure())
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&CaseResult> {
        self.results.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} passed, {} failed, {} errors, {} skipped ({:.1}% pass rate)",
            self.suite_name,
            self.passed_count(),
            self.failed_count(),
            self.error_count(),
            self.skipped_count(),
            self.pass_rate() * 100.0
        )
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Plain-text report: one line per scenario, failures detailed
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.summary());
        let _ = writeln!(out, "Duration: {:.2}s", self.total_duration().as_secs_f64());
        let _ = writeln!(out);
        for r in &self.results {
            let _ = write!(
                out,
                "{:<8} {} ({:.2}s)",
                r.status.label().to_uppercase(),
                r.name,
                r.duration.as_secs_f64()
            );
            if r.attempts > 1 {
                let _ = write!(out, " after {} attempts", r.attempts);
            }
            out.push('\n');
        }
        let failures = self.failures();
        if !failures.is_empty() {
            let _ = writeln!(out, "\nFailures:");
            for r in failures {
                let _ = writeln!(out, "  {}: {}", r.name, r.error.as_deref().unwrap_or("unknown error"));
            }
        }
        out
    }

    #[must_use]
    pub fn document(&self) -> ReportDocument {
        ReportDocument {
            suite: self.suite_name.clone(),
            started_at: self.started_at,
            passed: self.passed_count(),
            failed: self.failed_count(),
            errors: self.error_count(),
            skipped: self.skipped_count(),
            duration: self.total_duration(),
            results: self.results.clone(),
        }
    }

    pub fn render_json(&self) -> ShopResult<String> {
        Ok(serde_json::to_string_pretty(&self.document())?)
    }

    /// JUnit XML for CI
    #[must_use]
    pub fn render_junit(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        let _ = writeln!(
            xml,
            r#"<testsuite name="{}" tests="{}" failures="{}" errors="{}" skipped="{}" time="{:.3}">"#,
            escape_xml(&self.suite_name),
            self.total_count(),
            self.failed_count(),
            self.error_count(),
            self.skipped_count(),
            self.total_duration().as_secs_f64()
        );
        for r in &self.results {
            let _ = writeln!(
                xml,
                r#"  <testcase classname="{}" name="{}" time="{:.3}">"#,
                escape_xml(&r.group),
                escape_xml(&r.name),
                r.duration.as_secs_f64()
            );
            let message = escape_xml(r.error.as_deref().unwrap_or_default());
            match r.status {
                TestStatus::Failed => {
                    let _ = writeln!(xml, r#"    <failure message="{message}">{message}</failure>"#);
                }
                TestStatus::Error => {
                    let _ = writeln!(xml, r#"    <error message="{message}">{message}</error>"#);
                }
                TestStatus::Skipped => {
                    let _ = writeln!(xml, r#"    <skipped message="{message}"/>"#);
                }
                TestStatus::Passed => {}
            }
            xml.push_str("  </testcase>\n");
        }
        xml.push_str("</testsuite>\n");
        xml
    }

    /// Self-contained HTML page
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        html.push_str(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>shopcheck report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.passed { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.failed { background: #ffebee; border-left: 4px solid #f44336; }
        .test.error { background: #fce4ec; border-left: 4px solid #880e4f; }
        .test.skipped { background: #fff3e0; border-left: 4px solid #ff9800; }
        .markers { color: #666; font-size: 0.9em; }
        .message { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
    </style>
</head>
<body>
"#,
        );
        let _ = write!(
            html,
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>{}</h2>
    <p>Duration: {:.2}s</p>
</div>
"#,
            escape_xml(&self.suite_name),
            escape_xml(&self.summary()),
            self.total_duration().as_secs_f64()
        );
        for r in &self.results {
            let _ = writeln!(
                html,
                r#"<div class="test {}">
    <strong>{}</strong> - {} ({:.2}s)
    <div class="markers">{}</div>"#,
                r.status.label(),
                escape_xml(&r.name),
                r.status,
                r.duration.as_secs_f64(),
                escape_xml(&r.markers.join(", "))
            );
            if let Some(error) = &r.error {
                let _ = writeln!(html, r#"    <div class="message">{}</div>"#, escape_xml(error));
            }
            html.push_str("</div>\n");
        }
        html.push_str("</body>\n</html>\n");
        html
    }

    /// Write the requested formats into `dir`
    pub fn write_reports(&self, dir: &Path, formats: &[ReportFormat]) -> ShopResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(formats.len());
        for format in formats {
            let body = match format {
                ReportFormat::Text => self.render_text(),
                ReportFormat::Json => self.render_json()?,
                ReportFormat::Junit => self.render_junit(),
                ReportFormat::Html => self.render_html(),
            };
            let path = dir.join(format.file_name());
            std::fs::write(&path, body)?;
            tracing::info!(target: "shopcheck::reporter", path = %path.display(), "report written");
            written.push(path);
        }
        Ok(written)
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn sample() -> Reporter {
        let mut reporter = Reporter::new("smoke");
        reporter.start();
        reporter.record(CaseResult::passed("home_page_loads", Duration::from_millis(1200)));
        reporter.record(
            CaseResult::failed("cart_total", Duration::from_millis(800), "total was <Rs. 0>")
                .with_attempts(3),
        );
        reporter.record(CaseResult::from_outcome(
            "launch",
            "home",
            &Err(ShopError::BrowserNotFound),
            Duration::ZERO,
        ));
        reporter.record(CaseResult::from_outcome(
            "no_products",
            "products",
            &Err(ShopError::skipped("catalogue empty")),
            Duration::ZERO,
        ));
        reporter
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_classify() {
            assert_eq!(TestStatus::classify(&Ok(())), TestStatus::Passed);
            assert_eq!(
                TestStatus::classify(&Err(ShopError::assertion("x"))),
                TestStatus::Failed
            );
            assert_eq!(
                TestStatus::classify(&Err(ShopError::skipped("x"))),
                TestStatus::Skipped
            );
            assert_eq!(
                TestStatus::classify(&Err(ShopError::Driver { message: "gone".into() })),
                TestStatus::Error
            );
        }

        #[test]
        fn test_failure_covers_errors() {
            assert!(TestStatus::Failed.is_failure());
            assert!(TestStatus::Error.is_failure());
            assert!(!TestStatus::Skipped.is_failure());
        }

        #[test]
        fn test_format_parse() {
            assert_eq!("JUnit".parse::<ReportFormat>().unwrap(), ReportFormat::Junit);
            assert_eq!("txt".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
            assert!("pdf".parse::<ReportFormat>().is_err());
        }
    }

    mod aggregate_tests {
        use super::*;

        #[test]
        fn test_counts() {
            let r = sample();
            assert_eq!(r.total_count(), 4);
            assert_eq!(r.passed_count(), 1);
            assert_eq!(r.failed_count(), 1);
            assert_eq!(r.error_count(), 1);
            assert_eq!(r.skipped_count(), 1);
            assert!(!r.all_passed());
            assert_eq!(r.failures().len(), 2);
            assert!((r.pass_rate() - 1.0 / 3.0).abs() < 1e-9);
        }

        #[test]
        fn test_empty_reporter_passes() {
            let r = Reporter::new("empty");
            assert!(r.all_passed());
            assert_eq!(r.pass_rate(), 1.0);
        }

        #[test]
        fn test_summary() {
            assert_eq!(
                sample().summary(),
                "smoke: 1 passed, 1 failed, 1 errors, 1 skipped (33.3% pass rate)"
            );
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_text_lists_failures() {
            let text = sample().render_text();
            assert!(text.contains("PASSED   home_page_loads"));
            assert!(text.contains("after 3 attempts"));
            assert!(text.contains("cart_total: Assertion failed: total was <Rs. 0>"));
        }

        #[test]
        fn test_junit_escapes_and_classifies() {
            let xml = sample().render_junit();
            assert!(xml.contains(r#"failures="1" errors="1" skipped="1""#));
            assert!(xml.contains("&lt;Rs. 0&gt;"));
            assert!(xml.contains("<error message="));
            assert!(xml.contains("<skipped message="));
        }

        #[test]
        fn test_json_round_trips_counts() {
            let json = sample().render_json().unwrap();
            let doc: ReportDocument = serde_json::from_str(&json).unwrap();
            assert_eq!(doc.failed, 1);
            assert_eq!(doc.results.len(), 4);
            assert_eq!(doc.results[1].attempts, 3);
        }

        #[test]
        fn test_html_has_status_classes() {
            let html = sample().render_html();
            assert!(html.contains(r#"class="test failed""#));
            assert!(html.contains(r#"class="test skipped""#));
            assert!(!html.contains("<Rs. 0>"));
        }

        #[test]
        fn test_write_reports() {
            let dir = tempfile::tempdir().unwrap();
            let written = sample()
                .write_reports(&dir.path().join("reports"), &ReportFormat::ALL)
                .unwrap();
            assert_eq!(written.len(), 4);
            assert!(written.iter().all(|p| p.exists()));
            assert!(dir.path().join("reports/junit.xml").exists());
        }
    }
}
