//! Interaction façade: one wait plus one action per verb.
//!
//! Verbs answer with `bool` or `String` for the outcomes a page is expected
//! to produce (element missing, element detached mid-action). Only fatal
//! session errors leave as `Err`.

use crate::driver::{BrowserDriver, DriverError, DriverResult, SelectBy};
use crate::locator::ElementQuery;
use crate::result::{ShopError, ShopResult};
use crate::wait::{Readiness, ResolvedElement, WaitResult, Waiter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Page-object-agnostic verbs bound to one session
#[derive(Debug, Clone)]
pub struct Interactor {
    waiter: Waiter,
}

impl Interactor {
    /// Interactor with a default wait ceiling
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, default_timeout: Duration) -> Self {
        Self {
            waiter: Waiter::new(driver, default_timeout),
        }
    }

    /// Wait engine
    #[must_use]
    pub const fn waiter(&self) -> &Waiter {
        &self.waiter
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn BrowserDriver> {
        self.waiter.driver()
    }

    // ------------------------------------------------------------------
    // Element verbs
    // ------------------------------------------------------------------

    /// Click once clickable
    pub async fn click(&self, query: &ElementQuery) -> ShopResult<bool> {
        self.click_within(query, None).await
    }

    /// Click with a timeout override
    pub async fn click_within(
        &self,
        query: &ElementQuery,
        timeout: Option<Duration>,
    ) -> ShopResult<bool> {
        let Some(el) = self.waiter.resolve_clickable(query, timeout).await? else {
            return Ok(false);
        };
        let outcome = self.driver().click(query, el.index).await;
        Ok(settle("click", query, outcome)?.is_some())
    }

    /// Click the `index`-th match once it is clickable
    pub async fn click_at(&self, query: &ElementQuery, index: usize) -> ShopResult<bool> {
        let Some(el) = self.resolve_indexed(query, index, Readiness::Clickable).await? else {
            return Ok(false);
        };
        let outcome = self.driver().click(query, el.index).await;
        Ok(settle("click", query, outcome)?.is_some())
    }

    /// Double-click once clickable
    pub async fn double_click(&self, query: &ElementQuery) -> ShopResult<bool> {
        let Some(el) = self.waiter.resolve_clickable(query, None).await? else {
            return Ok(false);
        };
        let outcome = self.driver().double_click(query, el.index).await;
        Ok(settle("double_click", query, outcome)?.is_some())
    }

    /// Type into a visible field, clearing it first when `clear` is set
    pub async fn type_text(&self, query: &ElementQuery, text: &str, clear: bool) -> ShopResult<bool> {
        self.type_text_within(query, text, clear, None).await
    }

    /// Type with a timeout override
    pub async fn type_text_within(
        &self,
        query: &ElementQuery,
        text: &str,
        clear: bool,
        timeout: Option<Duration>,
    ) -> ShopResult<bool> {
        let Some(el) = self.waiter.resolve_visible(query, timeout).await? else {
            return Ok(false);
        };
        let outcome = self.driver().type_text(query, el.index, text, clear).await;
        Ok(settle("type_text", query, outcome)?.is_some())
    }

    /// Type into the `index`-th match
    pub async fn type_text_at(
        &self,
        query: &ElementQuery,
        index: usize,
        text: &str,
        clear: bool,
    ) -> ShopResult<bool> {
        let Some(el) = self.resolve_indexed(query, index, Readiness::Visible).await? else {
            return Ok(false);
        };
        let outcome = self.driver().type_text(query, el.index, text, clear).await;
        Ok(settle("type_text", query, outcome)?.is_some())
    }

    /// Text of the first visible match, `""` if none
    pub async fn read_text(&self, query: &ElementQuery) -> ShopResult<String> {
        self.read_text_within(query, None).await
    }

    /// Read text with a timeout override
    pub async fn read_text_within(
        &self,
        query: &ElementQuery,
        timeout: Option<Duration>,
    ) -> ShopResult<String> {
        let Some(el) = self.waiter.resolve_visible(query, timeout).await? else {
            return Ok(String::new());
        };
        let outcome = self.driver().read_text(query, el.index).await;
        Ok(settle("read_text", query, outcome)?.unwrap_or_default())
    }

    /// Attribute or property of the first visible match, `""` if none
    pub async fn read_attribute(&self, query: &ElementQuery, name: &str) -> ShopResult<String> {
        self.read_attribute_within(query, name, None).await
    }

    /// Read an attribute with a timeout override
    pub async fn read_attribute_within(
        &self,
        query: &ElementQuery,
        name: &str,
        timeout: Option<Duration>,
    ) -> ShopResult<String> {
        let Some(el) = self.waiter.resolve_visible(query, timeout).await? else {
            return Ok(String::new());
        };
        let outcome = self.driver().read_attribute(query, el.index, name).await;
        Ok(settle("read_attribute", query, outcome)?
            .flatten()
            .unwrap_or_default())
    }

    /// Texts of every match, re-queried on each call
    pub async fn read_all_texts(&self, query: &ElementQuery) -> ShopResult<Vec<String>> {
        self.read_all_texts_within(query, None).await
    }

    /// Read all texts with a timeout override
    pub async fn read_all_texts_within(
        &self,
        query: &ElementQuery,
        timeout: Option<Duration>,
    ) -> ShopResult<Vec<String>> {
        let elements = self.waiter.resolve_all_present(query, timeout).await?;
        let mut texts = Vec::with_capacity(elements.len());
        for el in elements {
            let outcome = self.driver().read_text(query, el.index).await;
            if let Some(text) = settle("read_text", query, outcome)? {
                texts.push(text.trim().to_string());
            }
        }
        Ok(texts)
    }

    /// Attribute of every match
    pub async fn read_all_attributes(
        &self,
        query: &ElementQuery,
        name: &str,
        timeout: Option<Duration>,
    ) -> ShopResult<Vec<String>> {
        let elements = self.waiter.resolve_all_present(query, timeout).await?;
        let mut values = Vec::with_capacity(elements.len());
        for el in elements {
            let outcome = self.driver().read_attribute(query, el.index, name).await;
            if let Some(value) = settle("read_attribute", query, outcome)? {
                values.push(value.unwrap_or_default());
            }
        }
        Ok(values)
    }

    /// Number of matches right now, without waiting
    pub async fn count(&self, query: &ElementQuery) -> ShopResult<usize> {
        match self.driver().observe(query).await {
            Ok(states) => Ok(states.len()),
            Err(DriverError::Interaction { .. }) => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    /// Choose a `<select>` option by its visible text
    pub async fn select_option_by_text(&self, query: &ElementQuery, text: &str) -> ShopResult<bool> {
        self.select(query, &SelectBy::Text(text.to_string())).await
    }

    /// Choose a `<select>` option by its value
    pub async fn select_option_by_value(
        &self,
        query: &ElementQuery,
        value: &str,
    ) -> ShopResult<bool> {
        self.select(query, &SelectBy::Value(value.to_string())).await
    }

    async fn select(&self, query: &ElementQuery, choice: &SelectBy) -> ShopResult<bool> {
        let Some(el) = self.waiter.resolve_visible(query, None).await? else {
            return Ok(false);
        };
        if el.state.tag != "select" {
            tracing::error!(target: "shopcheck::interaction", query = %query, tag = %el.state.tag, "not a select control");
            return Ok(false);
        }
        let outcome = self.driver().select_option(query, el.index, choice).await;
        Ok(settle("select_option", query, outcome)?.is_some())
    }

    /// Move the pointer over a visible match
    pub async fn hover(&self, query: &ElementQuery) -> ShopResult<bool> {
        let Some(el) = self.waiter.resolve_visible(query, None).await? else {
            return Ok(false);
        };
        let outcome = self.driver().hover(query, el.index).await;
        Ok(settle("hover", query, outcome)?.is_some())
    }

    /// Hover the `index`-th match
    pub async fn hover_at(&self, query: &ElementQuery, index: usize) -> ShopResult<bool> {
        let Some(el) = self.resolve_indexed(query, index, Readiness::Visible).await? else {
            return Ok(false);
        };
        let outcome = self.driver().hover(query, el.index).await;
        Ok(settle("hover", query, outcome)?.is_some())
    }

    /// Scroll the first present match into view
    pub async fn scroll_into_view(&self, query: &ElementQuery) -> ShopResult<bool> {
        let Some(el) = self.waiter.resolve_present(query, None).await? else {
            return Ok(false);
        };
        let outcome = self.driver().scroll_into_view(query, el.index).await;
        Ok(settle("scroll_into_view", query, outcome)?.is_some())
    }

    /// Scroll the `index`-th match into view
    pub async fn scroll_into_view_at(&self, query: &ElementQuery, index: usize) -> ShopResult<bool> {
        let Some(el) = self.resolve_indexed(query, index, Readiness::Present).await? else {
            return Ok(false);
        };
        let outcome = self.driver().scroll_into_view(query, el.index).await;
        Ok(settle("scroll_into_view", query, outcome)?.is_some())
    }

    /// Resolve later queries inside a frame
    pub async fn switch_to_frame(&self, query: &ElementQuery) -> ShopResult<bool> {
        let Some(el) = self.waiter.resolve_present(query, None).await? else {
            return Ok(false);
        };
        let outcome = self.driver().switch_to_frame(query, el.index).await;
        Ok(settle("switch_to_frame", query, outcome)?.is_some())
    }

    /// Back to the top-level document
    pub async fn switch_to_default_content(&self) -> ShopResult<()> {
        self.driver()
            .switch_to_default_content()
            .await
            .map_err(ShopError::from)
    }

    /// Attach a file to a file input
    pub async fn upload_file(&self, query: &ElementQuery, path: &Path) -> ShopResult<bool> {
        let Some(el) = self.waiter.resolve_present(query, None).await? else {
            return Ok(false);
        };
        let outcome = self.driver().upload_file(query, el.index, path).await;
        Ok(settle("upload_file", query, outcome)?.is_some())
    }

    // ------------------------------------------------------------------
    // Page verbs
    // ------------------------------------------------------------------

    /// Run a script body in the page; a script that throws yields `null`
    pub async fn run_script(
        &self,
        code: &str,
        args: &[serde_json::Value],
    ) -> ShopResult<serde_json::Value> {
        match self.driver().execute_script(code, args).await {
            Ok(value) => Ok(value),
            Err(DriverError::Interaction { message }) => {
                tracing::error!(target: "shopcheck::interaction", %message, "script failed");
                Ok(serde_json::Value::Null)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Write a PNG of the viewport; `false` if the capture or write failed
    pub async fn capture_screenshot(&self, path: &Path) -> ShopResult<bool> {
        let png = match self.driver().screenshot().await {
            Ok(png) => png,
            Err(DriverError::Interaction { message }) => {
                tracing::error!(target: "shopcheck::interaction", %message, "screenshot failed");
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::error!(target: "shopcheck::interaction", path = %parent.display(), error = %e, "cannot create screenshot directory");
                return Ok(false);
            }
        }
        match tokio::fs::write(path, png).await {
            Ok(()) => {
                tracing::info!(target: "shopcheck::interaction", path = %path.display(), "screenshot saved");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(target: "shopcheck::interaction", path = %path.display(), error = %e, "screenshot write failed");
                Ok(false)
            }
        }
    }

    /// Navigate to a URL
    pub async fn navigate(&self, url: &str) -> ShopResult<()> {
        self.driver()
            .navigate(url)
            .await
            .map_err(|e| ShopError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    /// Current URL
    pub async fn current_url(&self) -> ShopResult<String> {
        self.driver().current_url().await.map_err(ShopError::from)
    }

    /// Document title
    pub async fn title(&self) -> ShopResult<String> {
        self.driver().title().await.map_err(ShopError::from)
    }

    /// Reload the page
    pub async fn refresh(&self) -> ShopResult<()> {
        self.driver().reload().await.map_err(ShopError::from)
    }

    /// History back
    pub async fn back(&self) -> ShopResult<()> {
        self.driver().back().await.map_err(ShopError::from)
    }

    /// History forward
    pub async fn forward(&self) -> ShopResult<()> {
        self.driver().forward().await.map_err(ShopError::from)
    }

    /// Serialized DOM
    pub async fn page_source(&self) -> ShopResult<String> {
        self.driver().page_source().await.map_err(ShopError::from)
    }

    /// Accept an open dialog, if any
    pub async fn accept_dialog(&self) -> ShopResult<bool> {
        match self.driver().accept_dialog().await {
            Ok(accepted) => Ok(accepted),
            Err(DriverError::Interaction { .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Wait for the document to finish loading
    pub async fn wait_for_page_load(&self, timeout: Option<Duration>) -> ShopResult<WaitResult> {
        self.waiter.wait_for_page_load(timeout).await
    }

    async fn resolve_indexed(
        &self,
        query: &ElementQuery,
        index: usize,
        readiness: Readiness,
    ) -> ShopResult<Option<ResolvedElement>> {
        let count = self.count(query).await?;
        if index >= count {
            tracing::error!(target: "shopcheck::interaction", query = %query, index, count, "index out of range");
            return Ok(None);
        }
        self.waiter.resolve_nth(query, index, readiness, None).await
    }
}

/// Fold an interaction failure into `None`, let fatal errors through
fn settle<T>(verb: &str, query: &ElementQuery, outcome: DriverResult<T>) -> ShopResult<Option<T>> {
    match outcome {
        Ok(value) => {
            tracing::debug!(target: "shopcheck::interaction", verb, query = %query, "ok");
            Ok(Some(value))
        }
        Err(DriverError::Interaction { message }) => {
            tracing::error!(target: "shopcheck::interaction", verb, query = %query, %message, "interaction failed");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
