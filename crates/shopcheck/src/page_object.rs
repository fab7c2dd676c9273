//! Page Object support: the shared base every storefront page builds on.
//!
//! A page object is a [`BasePage`] (session handle, full URL, interaction
//! façade) plus a fixed set of [`ElementQuery`] constants and the verbs that
//! use them. [`PageObject`] supplies `open` and `verify_loaded` from the
//! page's path and signature elements.
//!
//! ```text
//! Session ──► BasePage { ui, url } ──► HomePage / LoginPage / ...
//!                 │
//!                 ▼
//!            Interactor ──► Waiter ──► BrowserDriver
//! ```

use crate::config::Settings;
use crate::fixture::Session;
use crate::interaction::Interactor;
use crate::locator::ElementQuery;
use crate::logging;
use crate::result::ShopResult;
use async_trait::async_trait;
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Behaviour shared by every page
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Path of the page below the base URL, e.g. `/login`
    fn path(&self) -> &'static str;

    /// Name used in logs
    fn page_name(&self) -> &'static str;

    /// Base helpers
    fn base(&self) -> &BasePage;

    /// Elements that must be visible for the page to count as loaded
    fn signature(&self) -> Vec<ElementQuery>;

    /// Navigate to the page and wait for the document to be ready
    async fn open(&self) -> ShopResult<&Self> {
        self.base().open().await?;
        Ok(self)
    }

    /// Whether every signature element is visible. "Not loaded" is `false`,
    /// never an error.
    async fn verify_loaded(&self) -> ShopResult<bool> {
        for query in self.signature() {
            if !self.base().is_visible(&query).await? {
                tracing::warn!(target: "shopcheck::pages", page = self.page_name(), query = %query, "signature element not visible");
                logging::result(&format!("{} loaded", self.page_name()), false);
                return Ok(false);
            }
        }
        logging::result(&format!("{} loaded", self.page_name()), true);
        Ok(true)
    }
}

/// Session handle, URL and helpers common to all pages
#[derive(Debug, Clone)]
pub struct BasePage {
    ui: Interactor,
    settings: Arc<Settings>,
    url: String,
}

impl BasePage {
    /// Base for the page at `path` below the configured base URL
    #[must_use]
    pub fn new(session: &Session, path: &str) -> Self {
        let settings = session.settings().clone();
        let url = format!("{}{}", settings.base_url.trim_end_matches('/'), path);
        Self {
            ui: Interactor::new(session.driver().clone(), settings.explicit_wait),
            settings,
            url,
        }
    }

    /// Interaction façade
    #[must_use]
    pub const fn ui(&self) -> &Interactor {
        &self.ui
    }

    /// Full URL of the page
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run settings
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Absolute URL for another path on the site
    #[must_use]
    pub fn site_url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// Navigate and wait for document-ready
    pub async fn open(&self) -> ShopResult<()> {
        logging::page_action("Opening page", Some(&self.url));
        self.ui.navigate(&self.url).await?;
        let loaded = self
            .ui
            .wait_for_page_load(Some(self.settings.browser.page_load_timeout))
            .await?;
        if !loaded.success {
            tracing::warn!(target: "shopcheck::pages", url = %self.url, "page did not reach document-ready");
        }
        Ok(())
    }

    /// Whether the element becomes visible within the short visibility window
    pub async fn is_visible(&self, query: &ElementQuery) -> ShopResult<bool> {
        self.ui.waiter().is_visible(query, None).await
    }

    /// Whether the element becomes visible within `timeout`
    pub async fn is_visible_within(
        &self,
        query: &ElementQuery,
        timeout: Duration,
    ) -> ShopResult<bool> {
        self.ui.waiter().is_visible(query, Some(timeout)).await
    }

    /// Number of matches once the collection has rendered
    pub async fn collection_len(&self, query: &ElementQuery) -> ShopResult<usize> {
        Ok(self.ui.waiter().resolve_all_present(query, None).await?.len())
    }

    /// Whether `index` addresses a member of the rendered collection.
    /// Out of range is logged and reported as `false`.
    pub async fn in_range(&self, query: &ElementQuery, index: usize) -> ShopResult<bool> {
        let len = self.collection_len(query).await?;
        if index >= len {
            tracing::error!(target: "shopcheck::pages", query = %query, index, len, "index out of range");
            return Ok(false);
        }
        Ok(true)
    }

    /// Title contains `expected`
    pub async fn verify_title(&self, expected: &str) -> ShopResult<bool> {
        let actual = self.ui.title().await?;
        logging::assertion("Page title verification", expected, &actual);
        Ok(actual.contains(expected))
    }

    /// Current URL contains `fragment`
    pub async fn verify_url(&self, fragment: &str) -> ShopResult<bool> {
        let actual = self.ui.current_url().await?;
        logging::assertion("URL verification", fragment, &actual);
        Ok(actual.contains(fragment))
    }

    /// Element text contains `expected`
    pub async fn verify_element_text(
        &self,
        query: &ElementQuery,
        expected: &str,
    ) -> ShopResult<bool> {
        let actual = self.ui.read_text(query).await?;
        logging::assertion("Element text verification", expected, &actual);
        Ok(actual.contains(expected))
    }

    /// Element is visible within the default wait
    pub async fn verify_element_visible(&self, query: &ElementQuery) -> ShopResult<bool> {
        let visible = self.ui.waiter().resolve_visible(query, None).await?.is_some();
        logging::assertion("Element visibility", "visible", if visible { "visible" } else { "not visible" });
        Ok(visible)
    }

    /// No visible match remains within the default wait
    pub async fn verify_element_not_visible(&self, query: &ElementQuery) -> ShopResult<bool> {
        let gone = self.ui.waiter().wait_until_absent(query, None).await?;
        logging::assertion("Element invisibility", "not visible", if gone { "not visible" } else { "visible" });
        Ok(gone)
    }

    /// Scroll the window to the top
    pub async fn scroll_to_top(&self) -> ShopResult<()> {
        self.ui.run_script("window.scrollTo(0, 0);", &[]).await?;
        logging::page_action("Scrolled to top", None);
        Ok(())
    }

    /// Scroll the window to the bottom
    pub async fn scroll_to_bottom(&self) -> ShopResult<()> {
        self.ui
            .run_script("window.scrollTo(0, document.body.scrollHeight);", &[])
            .await?;
        logging::page_action("Scrolled to bottom", None);
        Ok(())
    }

    /// PNG screenshot at `reports/screenshots/{name}_{timestamp}.png`
    pub async fn take_screenshot(&self, name: &str) -> ShopResult<Option<PathBuf>> {
        let path = self
            .settings
            .screenshots_dir()
            .join(format!("{name}_{}.png", timestamp()));
        Ok(self.ui.capture_screenshot(&path).await?.then_some(path))
    }

    /// Page HTML at `reports/page_sources/{name}_{timestamp}.html`
    pub async fn save_page_source(&self, name: &str) -> ShopResult<Option<PathBuf>> {
        let html = self.ui.page_source().await?;
        let dir = self.settings.page_sources_dir();
        let path = dir.join(format!("{name}_{}.html", timestamp()));
        let written = async {
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(&path, html).await
        }
        .await;
        match written {
            Ok(()) => Ok(Some(path)),
            Err(e) => {
                tracing::error!(target: "shopcheck::pages", path = %path.display(), error = %e, "cannot save page source");
                Ok(None)
            }
        }
    }

    /// Page HTML
    pub async fn page_source(&self) -> ShopResult<String> {
        self.ui.page_source().await
    }

    /// Current URL
    pub async fn current_url(&self) -> ShopResult<String> {
        self.ui.current_url().await
    }
}

/// `YYYYmmdd_HHMMSS` for artifact names
pub(crate) fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}
