//! shopcheck: end-to-end UI checks for the Automation Exercise storefront
//!
//! Page objects describe each storefront page in terms of element queries
//! and user-level actions. Every action goes through the wait engine, so a
//! missing element degrades to `None`/`false` and only a broken session
//! surfaces as an error.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  runner ──► scenarios ──► TestContext ──► pages (PageObject)      │
//! │                               │                  │                │
//! │                               ▼                  ▼                │
//! │                          Session          Interactor ──► Waiter   │
//! │                               │                  │                │
//! │                               └────► BrowserDriver ◄──────┘       │
//! │                                   ChromiumDriver | MockDriver     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod browser;
pub mod config;
pub mod data;
pub mod driver;
pub mod fixture;
pub mod interaction;
pub mod locator;
pub mod logging;
pub mod mock;
pub mod page_object;
pub mod pages;
pub mod reporter;
pub mod result;
pub mod runner;
pub mod scenarios;
pub mod wait;

pub use browser::{BrowserConfig, BrowserKind};
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{ConfigStore, DataFiles, Settings, DEFAULT_BASE_URL, DEFAULT_CONFIG_FILE};
pub use data::{ContactMessage, DataManager, TestUser};
pub use driver::{BrowserDriver, DriverError, DriverResult, ElementState, SelectBy};
pub use fixture::{Session, TestContext};
pub use interaction::Interactor;
pub use locator::{ElementQuery, Strategy};
pub use logging::{LogConfig, LogFormat, LogGuard, LogRotation};
pub use mock::MockDriver;
pub use page_object::{BasePage, PageObject};
pub use reporter::{CaseResult, ReportFormat, Reporter, TestStatus};
pub use result::{ShopError, ShopResult};
pub use runner::{Backend, RunOptions, Runner, Suite};
pub use scenarios::{Marker, MarkerExpr, Scenario};
pub use wait::{Readiness, Waiter};

/// Prelude for writing scenarios and driving pages
pub mod prelude {
    pub use super::data::{generate_random_email, generate_random_string};
    pub use super::pages::*;
    pub use super::{
        BasePage, BrowserDriver, ContactMessage, DataManager, ElementQuery, Marker, PageObject,
        Session, Settings, ShopError, ShopResult, TestContext, TestUser,
    };
}
