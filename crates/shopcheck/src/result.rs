//! Result and error types for shopcheck.
//!
//! Only faults that make a session unusable travel as `Err`. An element that
//! never showed up is an `Option`/`bool`, and a click that bounced off a
//! detached node is folded into `false` by the interaction layer.

use thiserror::Error;

/// Result type for shopcheck operations
pub type ShopResult<T> = Result<T, ShopError>;

/// Errors that can occur in shopcheck
#[derive(Debug, Error)]
pub enum ShopError {
    /// Browser executable not found
    #[error("Browser not found. Install Chromium or set browser.executable")]
    BrowserNotFound,

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Requested browser cannot be driven over CDP
    #[error("Unsupported browser: {name}")]
    UnsupportedBrowser {
        /// Browser name as configured
        name: String,
    },

    /// The automation session is unusable (crashed, disconnected, closed)
    #[error("Browser session failed: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A scenario check did not hold
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// A scenario decided its precondition is not met
    #[error("Skipped: {reason}")]
    Skipped {
        /// Why the scenario stopped
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Test data error
    #[error("Test data error: {message}")]
    Data {
        /// Error message
        message: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ShopError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a skip signal
    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a test data error
    #[must_use]
    pub fn data(message: impl Into<String>) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Whether this error is a failed check rather than a broken run
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }

    /// Whether this error asks the runner to mark the case skipped
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}
