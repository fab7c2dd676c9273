//! Wait engine: bounded polling of the live page.
//!
//! Every resolve call observes the page through the driver, checks a
//! readiness predicate and sleeps a fixed interval until the predicate holds
//! or the timeout ceiling is reached. Running out of time is a normal outcome (`None`, empty `Vec`,
//! `false`); only fatal driver errors come back as `Err`.

use crate::driver::{BrowserDriver, DriverError, ElementState};
use crate::locator::ElementQuery;
use crate::result::{ShopError, ShopResult};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Interval between two observations
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default ceiling when a caller only wants to know whether something is visible
pub const VISIBILITY_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// Fallback ceiling when no configuration is at hand
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(15);

// =============================================================================
// READINESS
// =============================================================================

/// Predicate a resolved element must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
    /// At least attached to the document
    Present,
    /// Rendered with a size and not hidden
    Visible,
    /// Visible, enabled, not covered
    Clickable,
}

impl Readiness {
    /// Whether the observed state satisfies this predicate
    #[must_use]
    pub const fn holds(&self, state: &ElementState) -> bool {
        match self {
            Self::Present => true,
            Self::Visible => state.visible,
            Self::Clickable => state.is_clickable(),
        }
    }

    /// Label used in logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Clickable => "clickable",
        }
    }
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// WAIT OUTCOMES
// =============================================================================

/// An element that satisfied its predicate at the moment it was observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedElement {
    /// Query that matched
    pub query: ElementQuery,
    /// Position among the query's matches
    pub index: usize,
    /// What the observation saw
    pub state: ElementState,
}

/// Result of a non-element wait (page load, URL change)
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Whether the condition held before the deadline
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitResult {
    /// Create a successful wait result
    #[must_use]
    pub fn success(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: true,
            elapsed,
            waited_for: waited_for.into(),
        }
    }

    /// Create a timeout wait result
    #[must_use]
    pub fn timeout(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed,
            waited_for: waited_for.into(),
        }
    }
}

// =============================================================================
// WAITER
// =============================================================================

/// Polls one session's page until a condition holds
#[derive(Debug, Clone)]
pub struct Waiter {
    driver: Arc<dyn BrowserDriver>,
    default_timeout: Duration,
}

impl Waiter {
    /// Waiter with a default ceiling (normally `browser.explicit_wait`)
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, default_timeout: Duration) -> Self {
        Self {
            driver,
            default_timeout,
        }
    }

    /// Default ceiling
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn BrowserDriver> {
        &self.driver
    }

    /// First match that is attached to the document
    pub async fn resolve_present(
        &self,
        query: &ElementQuery,
        timeout: Option<Duration>,
    ) -> ShopResult<Option<ResolvedElement>> {
        self.resolve(query, Readiness::Present, timeout).await
    }

    /// First match that is visible
    pub async fn resolve_visible(
        &self,
        query: &ElementQuery,
        timeout: Option<Duration>,
    ) -> ShopResult<Option<ResolvedElement>> {
        self.resolve(query, Readiness::Visible, timeout).await
    }

    /// First match that can take a click
    pub async fn resolve_clickable(
        &self,
        query: &ElementQuery,
        timeout: Option<Duration>,
    ) -> ShopResult<Option<ResolvedElement>> {
        self.resolve(query, Readiness::Clickable, timeout).await
    }

    /// Every match, once at least one exists
    pub async fn resolve_all_present(
        &self,
        query: &ElementQuery,
        timeout: Option<Duration>,
    ) -> ShopResult<Vec<ResolvedElement>> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();
        let found = self
            .poll(timeout, || async move {
                let states = self.observe(query).await?;
                if states.is_empty() {
                    return Ok(None);
                }
                Ok(Some(
                    states
                        .into_iter()
                        .enumerate()
                        .map(|(index, state)| ResolvedElement {
                            query: query.clone(),
                            index,
                            state,
                        })
                        .collect::<Vec<_>>(),
                ))
            })
            .await?;
        let elements = found.unwrap_or_default();
        tracing::trace!(
            target: "shopcheck::wait",
            query = %query,
            predicate = "all_present",
            count = elements.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "resolve"
        );
        if elements.is_empty() {
            tracing::warn!(target: "shopcheck::wait", query = %query, timeout_ms = timeout.as_millis() as u64, "no elements found");
        }
        Ok(elements)
    }

    /// First match satisfying `readiness`
    pub async fn resolve(
        &self,
        query: &ElementQuery,
        readiness: Readiness,
        timeout: Option<Duration>,
    ) -> ShopResult<Option<ResolvedElement>> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();
        let found = self
            .poll(timeout, || async move {
                let states = self.observe(query).await?;
                Ok(states
                    .into_iter()
                    .enumerate()
                    .find(|(_, state)| readiness.holds(state))
                    .map(|(index, state)| ResolvedElement {
                        query: query.clone(),
                        index,
                        state,
                    }))
            })
            .await?;
        self.log_outcome(query, readiness.as_str(), found.is_some(), start, timeout);
        Ok(found)
    }

    /// The `index`-th match, once it satisfies `readiness`
    pub async fn resolve_nth(
        &self,
        query: &ElementQuery,
        index: usize,
        readiness: Readiness,
        timeout: Option<Duration>,
    ) -> ShopResult<Option<ResolvedElement>> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();
        let found = self
            .poll(timeout, || async move {
                let states = self.observe(query).await?;
                Ok(states
                    .into_iter()
                    .nth(index)
                    .filter(|state| readiness.holds(state))
                    .map(|state| ResolvedElement {
                        query: query.clone(),
                        index,
                        state,
                    }))
            })
            .await?;
        self.log_outcome(query, readiness.as_str(), found.is_some(), start, timeout);
        Ok(found)
    }

    /// Whether a match becomes visible within `timeout` (3s by default)
    pub async fn is_visible(
        &self,
        query: &ElementQuery,
        timeout: Option<Duration>,
    ) -> ShopResult<bool> {
        let timeout = timeout.unwrap_or(VISIBILITY_CHECK_TIMEOUT);
        Ok(self
            .resolve(query, Readiness::Visible, Some(timeout))
            .await?
            .is_some())
    }

    /// Whether every match is gone or hidden within `timeout`
    pub async fn wait_until_absent(
        &self,
        query: &ElementQuery,
        timeout: Option<Duration>,
    ) -> ShopResult<bool> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();
        let gone = self
            .poll(timeout, || async move {
                let states = self.observe(query).await?;
                Ok(states.iter().all(|s| !s.visible).then_some(()))
            })
            .await?
            .is_some();
        self.log_outcome(query, "absent", gone, start, timeout);
        Ok(gone)
    }

    /// Wait until the number of matches satisfies `accept`; returns the
    /// count that did
    pub async fn wait_for_count(
        &self,
        query: &ElementQuery,
        accept: impl Fn(usize) -> bool,
        timeout: Option<Duration>,
    ) -> ShopResult<Option<usize>> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let accept = &accept;
        self.poll(timeout, || async move {
            let n = self.observe(query).await?.len();
            Ok(accept(n).then_some(n))
        })
        .await
    }

    /// Wait for `document.readyState == "complete"`
    pub async fn wait_for_page_load(&self, timeout: Option<Duration>) -> ShopResult<WaitResult> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();
        let loaded = self
            .poll(timeout, || async move {
                let state = self
                    .script("return document.readyState", "readyState")
                    .await?;
                Ok((state.as_str() == Some("complete")).then_some(()))
            })
            .await?
            .is_some();
        let elapsed = start.elapsed();
        if loaded {
            Ok(WaitResult::success(elapsed, "document ready"))
        } else {
            tracing::warn!(target: "shopcheck::wait", timeout_ms = timeout.as_millis() as u64, "page did not finish loading");
            Ok(WaitResult::timeout(elapsed, "document ready"))
        }
    }

    /// Wait until the URL differs from `from`; returns the new URL
    pub async fn wait_for_url_change(
        &self,
        from: &str,
        timeout: Option<Duration>,
    ) -> ShopResult<Option<String>> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        self.poll(timeout, || async move {
            let url = self.driver.current_url().await.map_err(ShopError::from)?;
            Ok((url != from).then_some(url))
        })
        .await
    }

    /// Wait until the URL contains `fragment`
    pub async fn wait_for_url_contains(
        &self,
        fragment: &str,
        timeout: Option<Duration>,
    ) -> ShopResult<bool> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        Ok(self
            .poll(timeout, || async move {
                let url = self.driver.current_url().await.map_err(ShopError::from)?;
                Ok(url.contains(fragment).then_some(()))
            })
            .await?
            .is_some())
    }

    /// Observe once; a query the page rejects counts as "nothing matched yet"
    async fn observe(&self, query: &ElementQuery) -> ShopResult<Vec<ElementState>> {
        match self.driver.observe(query).await {
            Ok(states) => Ok(states),
            Err(DriverError::Interaction { message }) => {
                tracing::debug!(target: "shopcheck::wait", query = %query, %message, "query rejected");
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn script(&self, code: &str, what: &str) -> ShopResult<serde_json::Value> {
        match self.driver.execute_script(code, &[]).await {
            Ok(value) => Ok(value),
            Err(DriverError::Interaction { message }) => {
                tracing::debug!(target: "shopcheck::wait", what, %message, "script rejected");
                Ok(serde_json::Value::Null)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Bounded poll. Never returns `None` before `timeout` has elapsed and
    /// never sleeps past it.
    async fn poll<T, F, Fut>(&self, timeout: Duration, mut check: F) -> ShopResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ShopResult<Option<T>>>,
    {
        let start = Instant::now();
        loop {
            if let Some(value) = check().await? {
                return Ok(Some(value));
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout - elapsed)).await;
        }
    }

    fn log_outcome(
        &self,
        query: &ElementQuery,
        predicate: &str,
        found: bool,
        start: Instant,
        timeout: Duration,
    ) {
        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::trace!(target: "shopcheck::wait", query = %query, predicate, found, elapsed_ms, "resolve");
        if !found {
            tracing::warn!(
                target: "shopcheck::wait",
                query = %query,
                predicate,
                timeout_ms = timeout.as_millis() as u64,
                "element not {predicate} before timeout"
            );
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
