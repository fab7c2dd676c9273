//! BrowserDriver - the automation capability the suite is written against
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │  BrowserDriver (async trait, &self, shared as Arc<dyn BrowserDriver>)  │
//! ├───────────────────────────────────────────────────────────────────────┤
//! │                                                                       │
//! │  ┌─────────────────────────┐        ┌─────────────────────────────┐   │
//! │  │  ChromiumDriver         │        │  MockDriver                 │   │
//! │  │  (feature = "browser")  │        │  (always available)         │   │
//! │  │                         │        │                             │   │
//! │  │  CDP via chromiumoxide  │        │  In-memory pages/elements   │   │
//! │  └─────────────────────────┘        └─────────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Element operations take `(query, index)` and re-locate the node inside
//! the call. Nothing here hands out a handle that could go stale between
//! two separate actions.

use crate::locator::ElementQuery;
use crate::result::ShopError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Result type for driver calls
pub type DriverResult<T> = Result<T, DriverError>;

/// Driver failures, split by whether the session survives them
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    /// The page was reachable but the action could not be carried out
    /// (node detached, not interactable, option missing, script threw).
    #[error("Interaction failed: {message}")]
    Interaction {
        /// Error message
        message: String,
    },

    /// The session is unusable
    #[error("Driver failure: {message}")]
    Fatal {
        /// Error message
        message: String,
    },
}

impl DriverError {
    /// Create an interaction error
    #[must_use]
    pub fn interaction(message: impl Into<String>) -> Self {
        Self::Interaction {
            message: message.into(),
        }
    }

    /// Create a fatal error
    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
        }
    }

    /// Whether the session is gone
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

impl From<DriverError> for ShopError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Fatal { message } => Self::Driver { message },
            DriverError::Interaction { message } => Self::Driver {
                message: format!("unhandled interaction failure: {message}"),
            },
        }
    }
}

/// What one observation saw of a matched node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    /// Lower-case tag name
    pub tag: String,
    /// Non-zero rendered size, not hidden by style
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Another node sits on top of the element's center
    pub obscured: bool,
    /// Rendered text
    pub text: String,
}

impl ElementState {
    /// Visible, enabled and not covered
    #[must_use]
    pub const fn is_clickable(&self) -> bool {
        self.visible && self.enabled && !self.obscured
    }
}

/// How to pick an option of a `<select>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectBy {
    /// Visible option text
    Text(String),
    /// `value` attribute
    Value(String),
}

impl std::fmt::Display for SelectBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(t) => write!(f, "text={t}"),
            Self::Value(v) => write!(f, "value={v}"),
        }
    }
}

/// Automation capability used by the wait engine and the interaction layer
#[async_trait]
pub trait BrowserDriver: Send + Sync + std::fmt::Debug {
    /// Navigate the top-level page to a URL
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Current URL
    async fn current_url(&self) -> DriverResult<String>;

    /// Document title
    async fn title(&self) -> DriverResult<String>;

    /// Reload the page
    async fn reload(&self) -> DriverResult<()>;

    /// Go back in history
    async fn back(&self) -> DriverResult<()>;

    /// Go forward in history
    async fn forward(&self) -> DriverResult<()>;

    /// Serialized DOM of the page
    async fn page_source(&self) -> DriverResult<String>;

    /// Run a script body in page context; `args` are visible as `arguments[i]`
    async fn execute_script(
        &self,
        script: &str,
        args: &[serde_json::Value],
    ) -> DriverResult<serde_json::Value>;

    /// PNG of the current viewport
    async fn screenshot(&self) -> DriverResult<Vec<u8>>;

    /// State of every node matching the query, in document order
    async fn observe(&self, query: &ElementQuery) -> DriverResult<Vec<ElementState>>;

    /// Click the `index`-th match
    async fn click(&self, query: &ElementQuery, index: usize) -> DriverResult<()>;

    /// Double-click the `index`-th match
    async fn double_click(&self, query: &ElementQuery, index: usize) -> DriverResult<()>;

    /// Type into the `index`-th match, optionally clearing it first
    async fn type_text(
        &self,
        query: &ElementQuery,
        index: usize,
        text: &str,
        clear: bool,
    ) -> DriverResult<()>;

    /// Move the pointer over the `index`-th match
    async fn hover(&self, query: &ElementQuery, index: usize) -> DriverResult<()>;

    /// Choose an option of the `index`-th `<select>` match
    async fn select_option(
        &self,
        query: &ElementQuery,
        index: usize,
        choice: &SelectBy,
    ) -> DriverResult<()>;

    /// Scroll the `index`-th match into view
    async fn scroll_into_view(&self, query: &ElementQuery, index: usize) -> DriverResult<()>;

    /// Rendered text of the `index`-th match
    async fn read_text(&self, query: &ElementQuery, index: usize) -> DriverResult<String>;

    /// Property (falling back to attribute) of the `index`-th match
    async fn read_attribute(
        &self,
        query: &ElementQuery,
        index: usize,
        name: &str,
    ) -> DriverResult<Option<String>>;

    /// Resolve later queries inside the `index`-th matching frame
    async fn switch_to_frame(&self, query: &ElementQuery, index: usize) -> DriverResult<()>;

    /// Resolve later queries in the top-level document again
    async fn switch_to_default_content(&self) -> DriverResult<()>;

    /// Accept an open JavaScript dialog; `false` if none was open
    async fn accept_dialog(&self) -> DriverResult<bool>;

    /// Attach a local file to the `index`-th file input
    async fn upload_file(&self, query: &ElementQuery, index: usize, path: &Path)
        -> DriverResult<()>;

    /// End the session
    async fn close(&self) -> DriverResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clickable_requires_all_three() {
        let mut state = ElementState {
            tag: "a".to_string(),
            visible: true,
            enabled: true,
            obscured: false,
            text: "Products".to_string(),
        };
        assert!(state.is_clickable());
        state.obscured = true;
        assert!(!state.is_clickable());
        state.obscured = false;
        state.enabled = false;
        assert!(!state.is_clickable());
    }

    #[test]
    fn test_observation_payload_deserializes() {
        let json = r#"{"tag":"input","visible":true,"enabled":false,"obscured":false,"text":""}"#;
        let state: ElementState = serde_json::from_str(json).unwrap();
        assert_eq!(state.tag, "input");
        assert!(!state.enabled);
    }

    #[test]
    fn test_driver_error_kinds() {
        assert!(DriverError::fatal("target closed").is_fatal());
        assert!(!DriverError::interaction("stale").is_fatal());
    }

    #[test]
    fn test_fatal_maps_to_shop_driver_error() {
        let err: ShopError = DriverError::fatal("websocket closed").into();
        assert!(matches!(err, ShopError::Driver { ref message } if message == "websocket closed"));
    }

    #[test]
    fn test_select_by_display() {
        assert_eq!(SelectBy::Text("India".into()).to_string(), "text=India");
        assert_eq!(SelectBy::Value("1990".into()).to_string(), "value=1990");
    }
}
