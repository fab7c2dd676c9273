//! Logging: a `tracing` subscriber with a console layer and a log file.
//!
//! [`init`] installs the process-wide subscriber once. The free functions
//! below are the suite's step vocabulary; they all emit on the
//! `shopcheck::steps` target so a filter such as
//! `RUST_LOG=shopcheck::steps=info` shows the narrative of a run without
//! wait-engine chatter.

use crate::result::{ShopError, ShopResult};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt as stdfmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Target of every step event
pub const STEP_TARGET: &str = "shopcheck::steps";

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

/// Line format of the log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// When the log file rolls over: at a size (`"10 MB"`) or on a period
/// (`"hourly"`, `"daily"`), or `"never"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogRotation {
    /// Before a write would take the file past this many bytes
    Size(u64),
    Hourly,
    Daily,
    Never,
}

impl Default for LogRotation {
    fn default() -> Self {
        Self::Size(10 * MB)
    }
}

impl LogRotation {
    /// Rolled files that fit in `retention`, for period rotation
    fn files_within(self, retention: Duration) -> Option<usize> {
        let period = match self {
            Self::Hourly => HOUR,
            Self::Daily => DAY,
            Self::Size(_) | Self::Never => return None,
        };
        Some((retention.as_secs() / period).max(1) as usize)
    }
}

impl FromStr for LogRotation {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        match text.as_str() {
            "hourly" | "1 hour" => return Ok(Self::Hourly),
            "daily" | "1 day" => return Ok(Self::Daily),
            "never" | "none" => return Ok(Self::Never),
            _ => {}
        }
        let unreadable = || ShopError::config(format!("logging.rotation: cannot read '{}'", s.trim()));
        let split = text
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);
        let amount: f64 = number.parse().map_err(|_| unreadable())?;
        let scale = match unit.trim() {
            "" | "b" | "bytes" => 1,
            "k" | "kb" => KB,
            "m" | "mb" => MB,
            "g" | "gb" => GB,
            _ => return Err(unreadable()),
        };
        let bytes = (amount * scale as f64) as u64;
        if bytes == 0 {
            return Err(ShopError::config("logging.rotation: size must be positive"));
        }
        Ok(Self::Size(bytes))
    }
}

impl stdfmt::Display for LogRotation {
    fn fmt(&self, f: &mut stdfmt::Formatter<'_>) -> stdfmt::Result {
        match *self {
            Self::Size(b) if b % GB == 0 => write!(f, "{} GB", b / GB),
            Self::Size(b) if b % MB == 0 => write!(f, "{} MB", b / MB),
            Self::Size(b) if b % KB == 0 => write!(f, "{} KB", b / KB),
            Self::Size(b) => write!(f, "{b} B"),
            Self::Hourly => f.write_str("hourly"),
            Self::Daily => f.write_str("daily"),
            Self::Never => f.write_str("never"),
        }
    }
}

impl TryFrom<String> for LogRotation {
    type Error = ShopError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LogRotation> for String {
    fn from(rotation: LogRotation) -> Self {
        rotation.to_string()
    }
}

/// Read a retention period such as `"30 days"`, `"12 hours"` or `"2 weeks"`.
/// A bare number counts days.
pub fn parse_retention(text: &str) -> ShopResult<Duration> {
    let lower = text.trim().to_ascii_lowercase();
    let unreadable = || ShopError::config(format!("logging.retention: cannot read '{}'", text.trim()));
    let split = lower
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(lower.len());
    let (number, unit) = lower.split_at(split);
    let amount: u64 = number.parse().map_err(|_| unreadable())?;
    let unit_secs = match unit.trim() {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hour" | "hours" => HOUR,
        "" | "d" | "day" | "days" => DAY,
        "w" | "week" | "weeks" => 7 * DAY,
        "month" | "months" => 30 * DAY,
        _ => return Err(unreadable()),
    };
    Ok(Duration::from_secs(amount * unit_secs))
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level directive used when `RUST_LOG` is unset
    pub level: String,
    /// Log file; `None` logs to the console only
    pub file: Option<PathBuf>,
    /// File line format
    pub format: LogFormat,
    /// Console output
    pub console: bool,
    /// When the file rolls over
    pub rotation: LogRotation,
    /// How long rolled files are kept
    pub retention: Duration,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: Some(PathBuf::from("reports/logs/automation.log")),
            format: LogFormat::Text,
            console: true,
            rotation: LogRotation::default(),
            retention: Duration::from_secs(30 * DAY),
        }
    }
}

impl LogConfig {
    /// Set the level directive
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set or clear the log file
    #[must_use]
    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    /// Set the file format
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable the console layer
    #[must_use]
    pub const fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// Set rotation and retention of the log file
    #[must_use]
    pub const fn with_rotation(mut self, rotation: LogRotation, retention: Duration) -> Self {
        self.rotation = rotation;
        self.retention = retention;
        self
    }

    /// Filter from `RUST_LOG`, else from the configured level
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_lowercase()))
    }
}

/// Keeps the background log writer alive; pending lines are flushed when
/// it drops
#[derive(Debug)]
#[must_use = "dropping the guard stops the log file writer"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Build the subscriber without installing it. File lines go through a
/// background writer owned by the returned guard.
pub fn subscriber(
    config: &LogConfig,
) -> ShopResult<(impl tracing::Subscriber + Send + Sync, LogGuard)> {
    let (writer, worker) = match config.file.as_deref() {
        Some(path) => {
            let (writer, worker) = tracing_appender::non_blocking(file_writer(config, path)?);
            (Some(writer), Some(worker))
        }
        None => (None, None),
    };
    let (text_file, json_file) = match (writer, config.format) {
        (Some(w), LogFormat::Text) => (Some(fmt::layer().with_ansi(false).with_writer(w)), None),
        (Some(w), LogFormat::Json) => (None, Some(fmt::layer().json().with_writer(w))),
        (None, _) => (None, None),
    };
    let console = config.console.then(|| fmt::layer().with_target(true));

    let subscriber = tracing_subscriber::registry()
        .with(config.filter())
        .with(console)
        .with(text_file)
        .with(json_file);
    Ok((subscriber, LogGuard { _worker: worker }))
}

/// Install the process-wide subscriber. A second call is a no-op. Hold the
/// guard until the run ends.
pub fn init(config: &LogConfig) -> ShopResult<LogGuard> {
    let (subscriber, guard) = subscriber(config)?;
    if subscriber.try_init().is_err() {
        tracing::debug!(target: STEP_TARGET, "logging already initialized");
    }
    Ok(guard)
}

fn file_writer(config: &LogConfig, path: &Path) -> ShopResult<Box<dyn Write + Send>> {
    let period = match config.rotation {
        LogRotation::Size(limit) => {
            return Ok(Box::new(SizeRollingFile::open(path, limit, config.retention)?));
        }
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    };
    let dir = log_dir(path)?;
    let mut builder = RollingFileAppender::builder()
        .rotation(period)
        .filename_prefix(file_stem(path));
    if let Some(ext) = path.extension() {
        builder = builder.filename_suffix(ext.to_string_lossy());
    }
    if let Some(keep) = config.rotation.files_within(config.retention) {
        builder = builder.max_log_files(keep);
    }
    let appender = builder.build(&dir).map_err(|e| {
        ShopError::config(format!("cannot open log file in {}: {e}", dir.display()))
    })?;
    Ok(Box::new(appender))
}

fn log_dir(path: &Path) -> ShopResult<PathBuf> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "automation".to_string(), |s| s.to_string_lossy().into_owned())
}

fn open_log_file(path: &Path) -> ShopResult<File> {
    log_dir(path)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ShopError::config(format!("cannot open log file {}: {e}", path.display())))
}

// =============================================================================
// SIZE ROLLING
// =============================================================================

/// Log file that is renamed aside before it would outgrow `limit`.
/// Rolled files older than the retention period are deleted on open and on
/// every roll.
///
/// `automation.log` rolls to `automation.20261018-140322-123456.log`.
#[derive(Debug)]
pub struct SizeRollingFile {
    path: PathBuf,
    file: File,
    written: u64,
    limit: u64,
    retention: Duration,
}

impl SizeRollingFile {
    /// Open `path` for appending
    pub fn open(path: &Path, limit: u64, retention: Duration) -> ShopResult<Self> {
        let file = open_log_file(path)?;
        let written = file.metadata().map_or(0, |m| m.len());
        let rolling = Self {
            path: path.to_path_buf(),
            file,
            written,
            limit,
            retention,
        };
        rolling.prune();
        Ok(rolling)
    }

    /// Rolled siblings of the active file, oldest first
    #[must_use]
    pub fn rolled_files(&self) -> Vec<PathBuf> {
        let Some(dir) = self.path.parent() else {
            return Vec::new();
        };
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
        let prefix = format!("{}.", file_stem(&self.path));
        let suffix = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let active = self.path.file_name();
        let mut rolled: Vec<PathBuf> = fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.path())
                    .filter(|p| {
                        p.file_name() != active
                            && p.file_name().map(|n| n.to_string_lossy()).is_some_and(|n| {
                                n.starts_with(&prefix) && n.ends_with(&suffix)
                            })
                    })
                    .collect()
            })
            .unwrap_or_default();
        rolled.sort();
        rolled
    }

    fn rolled_name(&self) -> PathBuf {
        let stem = file_stem(&self.path);
        let ext = self
            .path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let stamp = Local::now().format("%Y%m%d-%H%M%S-%6f");
        let mut candidate = self.path.with_file_name(format!("{stem}.{stamp}{ext}"));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.path.with_file_name(format!("{stem}.{stamp}-{n}{ext}"));
            n += 1;
        }
        candidate
    }

    fn roll(&mut self) -> io::Result<()> {
        self.file.flush()?;
        fs::rename(&self.path, self.rolled_name())?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        self.prune();
        Ok(())
    }

    fn prune(&self) {
        let Some(cutoff) = SystemTime::now().checked_sub(self.retention) else {
            return;
        };
        for path in self.rolled_files() {
            let expired = fs::metadata(&path)
                .and_then(|m| m.modified())
                .is_ok_and(|modified| modified < cutoff);
            if expired {
                // the subscriber writing through us cannot log this
                let _ = fs::remove_file(&path);
            }
        }
    }
}

impl Write for SizeRollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.limit {
            self.roll()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

// =============================================================================
// STEP VOCABULARY
// =============================================================================

/// A test step
pub fn step(message: &str) {
    tracing::info!(target: STEP_TARGET, kind = "step", "STEP: {message}");
}

/// Outcome of a check
pub fn result(message: &str, success: bool) {
    let status = if success { "PASS" } else { "FAIL" };
    tracing::info!(target: STEP_TARGET, kind = "result", success, "{status}: {message}");
}

/// Page-level action, optionally on a named element
pub fn page_action(action: &str, element: Option<&str>) {
    match element {
        Some(element) => {
            tracing::info!(target: STEP_TARGET, kind = "page_action", element, "Page Action: {action} on '{element}'");
        }
        None => tracing::info!(target: STEP_TARGET, kind = "page_action", "Page Action: {action}"),
    }
}

/// An assertion with its expected and actual values
pub fn assertion(message: &str, expected: &str, actual: &str) {
    tracing::info!(
        target: STEP_TARGET,
        kind = "assertion",
        expected,
        actual,
        "Assertion: {message} | Expected: '{expected}' | Actual: '{actual}'"
    );
}

/// A test case began
pub fn test_start(name: &str) {
    tracing::info!(target: STEP_TARGET, kind = "test_start", test = name, "Test Started: {name}");
}

/// A test case ended
pub fn test_end(name: &str, status: &str, duration: Option<Duration>) {
    let status = status.to_uppercase();
    match duration {
        Some(d) => tracing::info!(
            target: STEP_TARGET,
            kind = "test_end",
            test = name,
            status = %status,
            duration_ms = d.as_millis() as u64,
            "Test Finished: {name} - {status} ({:.2}s)",
            d.as_secs_f64()
        ),
        None => tracing::info!(
            target: STEP_TARGET,
            kind = "test_end",
            test = name,
            status = %status,
            "Test Finished: {name} - {status}"
        ),
    }
}

/// Browser lifecycle event
pub fn browser_action(action: &str, details: Option<&str>) {
    match details {
        Some(details) => {
            tracing::info!(target: STEP_TARGET, kind = "browser", "Browser: {action} - {details}");
        }
        None => tracing::info!(target: STEP_TARGET, kind = "browser", "Browser: {action}"),
    }
}

/// Test-data read or write
pub fn data_operation(operation: &str, data_type: Option<&str>) {
    match data_type {
        Some(data_type) => {
            tracing::info!(target: STEP_TARGET, kind = "data", "Data Operation: {operation} ({data_type})");
        }
        None => tracing::info!(target: STEP_TARGET, kind = "data", "Data Operation: {operation}"),
    }
}

/// A measured value
pub fn performance(metric: &str, value: f64, unit: &str) {
    tracing::info!(target: STEP_TARGET, kind = "performance", metric, value, unit, "Performance: {metric} = {value}{unit}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = LogConfig::default();
            assert_eq!(config.level, "INFO");
            assert_eq!(
                config.file.as_deref(),
                Some(Path::new("reports/logs/automation.log"))
            );
            assert_eq!(config.format, LogFormat::Text);
            assert_eq!(config.rotation, LogRotation::Size(10 * MB));
            assert_eq!(config.retention, Duration::from_secs(30 * DAY));
        }

        #[test]
        fn test_builders() {
            let config = LogConfig::default()
                .with_level("debug")
                .with_file(None)
                .with_format(LogFormat::Json)
                .with_console(false);
            assert_eq!(config.level, "debug");
            assert!(config.file.is_none());
            assert_eq!(config.format, LogFormat::Json);
            assert!(!config.console);
        }

        #[test]
        fn test_format_deserializes_lowercase() {
            let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
            assert_eq!(format, LogFormat::Json);
        }
    }

    mod file_layer_tests {
        use super::*;

        #[test]
        fn test_creates_parent_dirs_and_writes_steps() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("logs").join("automation.log");
            let config = LogConfig::default()
                .with_level("info")
                .with_file(Some(path.clone()))
                .with_console(false);
            let (subscriber, guard) = subscriber(&config).unwrap();
            tracing::subscriber::with_default(subscriber, || {
                step("Opened home page");
                assertion("Page title verification", "Automation Exercise", "Automation Exercise");
                test_end("test_home_page_loads", "passed", Some(Duration::from_millis(1500)));
            });
            drop(guard);
            let written = std::fs::read_to_string(&path).unwrap();
            assert!(written.contains("STEP: Opened home page"));
            assert!(written.contains("Expected: 'Automation Exercise'"));
            assert!(written.contains("Test Finished: test_home_page_loads - PASSED (1.50s)"));
        }

        #[test]
        fn test_json_file_lines_parse() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("automation.jsonl");
            let config = LogConfig::default()
                .with_level("info")
                .with_file(Some(path.clone()))
                .with_format(LogFormat::Json)
                .with_console(false);
            let (subscriber, guard) = subscriber(&config).unwrap();
            tracing::subscriber::with_default(subscriber, || {
                data_operation("Generated test user", Some("TestUser"));
            });
            drop(guard);
            let written = std::fs::read_to_string(&path).unwrap();
            let line = written.lines().next().unwrap();
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["target"], STEP_TARGET);
        }

        #[test]
        fn test_console_only_needs_no_file() {
            let config = LogConfig::default().with_file(None).with_console(false);
            assert!(subscriber(&config).is_ok());
        }

        #[test]
        fn test_daily_rotation_writes_prefixed_file() {
            let dir = tempfile::tempdir().unwrap();
            let config = LogConfig::default()
                .with_level("info")
                .with_file(Some(dir.path().join("automation.log")))
                .with_console(false)
                .with_rotation(LogRotation::Daily, Duration::from_secs(7 * DAY));
            let (subscriber, guard) = subscriber(&config).unwrap();
            tracing::subscriber::with_default(subscriber, || step("Opened cart"));
            drop(guard);

            let files: Vec<String> = std::fs::read_dir(dir.path())
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            assert_eq!(files.len(), 1);
            assert!(files[0].starts_with("automation."));
            assert!(files[0].ends_with(".log"));
            let written = std::fs::read_to_string(dir.path().join(&files[0])).unwrap();
            assert!(written.contains("STEP: Opened cart"));
        }
    }

    mod rotation_tests {
        use super::*;
        use proptest::prelude::{prop_assert_eq, proptest};

        #[test]
        fn test_sizes_parse() {
            assert_eq!("10 MB".parse::<LogRotation>().unwrap(), LogRotation::Size(10 * MB));
            assert_eq!("500kb".parse::<LogRotation>().unwrap(), LogRotation::Size(500 * KB));
            assert_eq!(
                "1.5 GB".parse::<LogRotation>().unwrap(),
                LogRotation::Size(3 * GB / 2)
            );
            assert_eq!("2048".parse::<LogRotation>().unwrap(), LogRotation::Size(2048));
        }

        #[test]
        fn test_periods_parse() {
            assert_eq!("Daily".parse::<LogRotation>().unwrap(), LogRotation::Daily);
            assert_eq!("hourly".parse::<LogRotation>().unwrap(), LogRotation::Hourly);
            assert_eq!("never".parse::<LogRotation>().unwrap(), LogRotation::Never);
        }

        #[test]
        fn test_bad_rotation_is_config_error() {
            for text in ["weekly-ish", "10 parsecs", "0 MB", ""] {
                let err = text.parse::<LogRotation>().unwrap_err();
                assert!(matches!(err, ShopError::Config { .. }), "{text}: {err}");
            }
        }

        #[test]
        fn test_rotation_serde_uses_text() {
            let json = serde_json::to_string(&LogRotation::Size(10 * MB)).unwrap();
            assert_eq!(json, "\"10 MB\"");
            let back: LogRotation = serde_json::from_str("\"daily\"").unwrap();
            assert_eq!(back, LogRotation::Daily);
        }

        #[test]
        fn test_retention_parse() {
            assert_eq!(parse_retention("30 days").unwrap(), Duration::from_secs(30 * DAY));
            assert_eq!(parse_retention("12 hours").unwrap(), Duration::from_secs(12 * HOUR));
            assert_eq!(parse_retention("1 week").unwrap(), Duration::from_secs(7 * DAY));
            assert_eq!(parse_retention("14").unwrap(), Duration::from_secs(14 * DAY));
            assert!(parse_retention("ten days").is_err());
            assert!(parse_retention("3 fortnights").is_err());
        }

        #[test]
        fn test_period_keeps_files_within_retention() {
            let month = Duration::from_secs(30 * DAY);
            assert_eq!(LogRotation::Daily.files_within(month), Some(30));
            assert_eq!(LogRotation::Hourly.files_within(month), Some(720));
            assert_eq!(LogRotation::Daily.files_within(Duration::from_secs(60)), Some(1));
            assert_eq!(LogRotation::Size(MB).files_within(month), None);
        }

        proptest! {
            #[test]
            fn prop_size_display_parses_back(bytes in 1u64..(64 * GB)) {
                let rotation = LogRotation::Size(bytes);
                prop_assert_eq!(rotation.to_string().parse::<LogRotation>().unwrap(), rotation);
            }
        }
    }

    mod size_rolling_tests {
        use super::*;

        #[test]
        fn test_rolls_before_exceeding_limit() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("automation.log");
            let mut file = SizeRollingFile::open(&path, 64, Duration::from_secs(DAY)).unwrap();
            for i in 0..6 {
                file.write_all(format!("line {i} padded to twenty\n").as_bytes()).unwrap();
            }
            file.flush().unwrap();

            let rolled = file.rolled_files();
            assert!(!rolled.is_empty());
            assert!(std::fs::metadata(&path).unwrap().len() <= 64);
            for path in &rolled {
                assert!(std::fs::metadata(path).unwrap().len() <= 64);
            }
            let mut all = String::new();
            for path in rolled.iter().chain(std::iter::once(&path)) {
                all.push_str(&std::fs::read_to_string(path).unwrap());
            }
            let mut lines: Vec<&str> = all.lines().collect();
            lines.sort_unstable();
            let expected: Vec<String> = (0..6).map(|i| format!("line {i} padded to twenty")).collect();
            assert_eq!(lines, expected);
        }

        #[test]
        fn test_open_prunes_rolled_files_past_retention() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("automation.log");
            let stale = dir.path().join("automation.20260101-000000-000000.log");
            let fresh = dir.path().join("automation.20261001-000000-000000.log");
            let unrelated = dir.path().join("report.html");
            for p in [&stale, &fresh, &unrelated] {
                std::fs::write(p, "old").unwrap();
            }
            let long_ago = SystemTime::now() - Duration::from_secs(40 * DAY);
            for p in [&stale, &unrelated] {
                File::options().write(true).open(p).unwrap().set_modified(long_ago).unwrap();
            }

            let file = SizeRollingFile::open(&path, MB, Duration::from_secs(30 * DAY)).unwrap();
            assert!(!stale.exists());
            assert!(fresh.exists());
            assert!(unrelated.exists());
            assert_eq!(file.rolled_files(), vec![fresh]);
        }
    }
}
