//! Console output: per-case lines, progress bar and the run summary

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use shopcheck::{CaseResult, TestStatus};
use std::time::Duration;

/// Console reporter for a run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Progress bar over `total` cases
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    /// One finished case; failures print even in quiet mode
    pub fn case(&self, result: &CaseResult) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
            pb.set_message(result.name.clone());
        }
        let id = format!("{}::{}", result.group, result.name);
        let retried = if result.attempts > 1 {
            format!(" (attempt {})", result.attempts)
        } else {
            String::new()
        };
        let line = format!("{id} [{:.2}s]{retried}", result.duration.as_secs_f64());
        match result.status {
            TestStatus::Passed => self.success(&line),
            TestStatus::Skipped => {
                let reason = result.error.as_deref().unwrap_or_default();
                self.warning(&format!("{line} skipped: {reason}"));
            }
            TestStatus::Failed | TestStatus::Error => {
                let reason = result.error.as_deref().unwrap_or("no message");
                self.failure(&format!("{line}\n    {reason}"));
            }
        }
    }

    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "SKIP".to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        self.line("");
        self.line(&styled);
    }

    /// Totals line of the run
    pub fn summary(&self, passed: usize, failed: usize, errors: usize, skipped: usize, duration: Duration) {
        let broken = failed + errors;
        if self.quiet && broken == 0 {
            return;
        }
        let total = passed + broken + skipped;
        let secs = duration.as_secs_f64();
        self.line("");
        if self.use_color {
            let good = Style::new().green().bold();
            let bad = Style::new().red().bold();
            let status = if broken > 0 {
                bad.apply_to("FAILED")
            } else {
                good.apply_to("PASSED")
            };
            self.line(&format!(
                "{status} {total} scenarios in {secs:.2}s ({} passed, {} failed, {} errors, {} skipped)",
                good.apply_to(passed),
                bad.apply_to(failed),
                bad.apply_to(errors),
                Style::new().yellow().apply_to(skipped),
            ));
        } else {
            let status = if broken > 0 { "FAILED" } else { "PASSED" };
            self.line(&format!(
                "{status} {total} scenarios in {secs:.2}s ({passed} passed, {failed} failed, {errors} errors, {skipped} skipped)"
            ));
        }
    }

    fn line(&self, text: &str) {
        match self.progress_bar {
            Some(ref pb) if !pb.is_finished() && !pb.is_hidden() => pb.println(text),
            _ => {
                let _ = self.term.write_line(text);
            }
        }
    }
}
