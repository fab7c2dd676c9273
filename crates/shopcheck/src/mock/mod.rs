//! MockDriver - in-memory pages for running the suite without a browser
//!
//! Pages are registered by path, elements by the exact [`ElementQuery`] a
//! page object will ask for. Elements carry the state an observation reports
//! (visible, enabled, obscured) plus scripted reactions to clicks and hovers,
//! which is enough to model the storefront flows the scenarios walk through.
//!
//! ```text
//! MockDriver::new("https://shop.test")
//!     .with_page("/", MockPage::new("Home")
//!         .with(HomePage::PRODUCTS_LINK,
//!               MockElement::new("a").on_click(MockAction::navigate("/products"))))
//! ```

pub mod storefront;

use crate::driver::{BrowserDriver, DriverError, DriverResult, ElementState, SelectBy};
use crate::locator::ElementQuery;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Callback run against the mock world when an element reacts
pub type MockHandler = Arc<dyn Fn(&mut MockWorld) + Send + Sync>;

/// Reaction of a mock element to a click or hover
#[derive(Clone)]
pub enum MockAction {
    /// Navigate to a path or absolute URL
    Navigate(String),
    /// Make every match of the query visible
    Show(ElementQuery),
    /// Hide every match of the query
    Hide(ElementQuery),
    /// Remove the element that was acted on
    RemoveSelf,
    /// Open a JavaScript dialog with this message
    OpenDialog(String),
    /// Arbitrary state change
    Run(MockHandler),
}

impl MockAction {
    /// Navigate reaction
    #[must_use]
    pub fn navigate(target: impl Into<String>) -> Self {
        Self::Navigate(target.into())
    }

    /// Custom reaction
    #[must_use]
    pub fn run(handler: impl Fn(&mut MockWorld) + Send + Sync + 'static) -> Self {
        Self::Run(Arc::new(handler))
    }
}

impl fmt::Debug for MockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate(t) => f.debug_tuple("Navigate").field(t).finish(),
            Self::Show(q) => f.debug_tuple("Show").field(q).finish(),
            Self::Hide(q) => f.debug_tuple("Hide").field(q).finish(),
            Self::RemoveSelf => f.write_str("RemoveSelf"),
            Self::OpenDialog(m) => f.debug_tuple("OpenDialog").field(m).finish(),
            Self::Run(_) => f.write_str("Run(..)"),
        }
    }
}

/// A node on a mock page
#[derive(Debug, Clone)]
pub struct MockElement {
    /// Tag name
    pub tag: String,
    /// Rendered text
    pub text: String,
    /// Attributes and properties (`value` lives here)
    pub attributes: BTreeMap<String, String>,
    /// Rendered and not hidden
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Covered by another node
    pub obscured: bool,
    /// `(value, text)` pairs of a `<select>`
    pub options: Vec<(String, String)>,
    /// Not present until this long after the page loaded
    pub appears_after: Option<Duration>,
    /// Every action on it fails as detached
    pub stale: bool,
    /// Reactions to a click
    pub on_click: Vec<MockAction>,
    /// Reactions to a hover
    pub on_hover: Vec<MockAction>,
    /// Reactions to typed input, after `value` is updated
    pub on_change: Vec<MockAction>,
}

impl MockElement {
    /// Visible, enabled element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: String::new(),
            attributes: BTreeMap::new(),
            visible: true,
            enabled: true,
            obscured: false,
            options: Vec::new(),
            appears_after: None,
            stale: false,
            on_click: Vec::new(),
            on_hover: Vec::new(),
            on_change: Vec::new(),
        }
    }

    /// Set text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Start hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Start disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Start covered
    #[must_use]
    pub const fn obscured(mut self) -> Self {
        self.obscured = true;
        self
    }

    /// Add a `<select>` option
    #[must_use]
    pub fn option(mut self, value: impl Into<String>, text: impl Into<String>) -> Self {
        self.options.push((value.into(), text.into()));
        self
    }

    /// Appear only after a delay
    #[must_use]
    pub const fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = Some(delay);
        self
    }

    /// Detach on first use
    #[must_use]
    pub const fn stale(mut self) -> Self {
        self.stale = true;
        self
    }

    /// React to a click
    #[must_use]
    pub fn on_click(mut self, action: MockAction) -> Self {
        self.on_click.push(action);
        self
    }

    /// React to a hover
    #[must_use]
    pub fn on_hover(mut self, action: MockAction) -> Self {
        self.on_hover.push(action);
        self
    }

    /// React to typed input
    #[must_use]
    pub fn on_change(mut self, action: MockAction) -> Self {
        self.on_change.push(action);
        self
    }

    /// Current `value`
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.attributes.get("value").map(String::as_str)
    }

    fn state(&self) -> ElementState {
        ElementState {
            tag: self.tag.clone(),
            visible: self.visible,
            enabled: self.enabled,
            obscured: self.obscured,
            text: self.text.clone(),
        }
    }
}

/// A mock document
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    /// Document title
    pub title: String,
    /// Elements with the query they answer to, in document order
    pub elements: Vec<(ElementQuery, MockElement)>,
}

impl MockPage {
    /// Empty page with a title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            elements: Vec::new(),
        }
    }

    /// Add an element
    #[must_use]
    pub fn with(mut self, query: ElementQuery, element: MockElement) -> Self {
        self.elements.push((query, element));
        self
    }

    /// Add an element in place
    pub fn push(&mut self, query: ElementQuery, element: MockElement) {
        self.elements.push((query, element));
    }

    /// Remove every match of a query
    pub fn remove_all(&mut self, query: &ElementQuery) {
        self.elements.retain(|(q, _)| q != query);
    }

    /// Mutable matches of a query
    pub fn matches_mut<'a>(
        &'a mut self,
        query: &'a ElementQuery,
    ) -> impl Iterator<Item = &'a mut MockElement> + 'a {
        self.elements
            .iter_mut()
            .filter(move |(q, _)| q == query)
            .map(|(_, e)| e)
    }

    /// Matches of a query
    pub fn matches<'a>(&'a self, query: &'a ElementQuery) -> impl Iterator<Item = &'a MockElement> + 'a {
        self.elements
            .iter()
            .filter(move |(q, _)| q == query)
            .map(|(_, e)| e)
    }
}

/// Whole state of a mock session
#[derive(Debug)]
pub struct MockWorld {
    origin: String,
    pages: BTreeMap<String, MockPage>,
    current: String,
    history: Vec<String>,
    forward_stack: Vec<String>,
    loaded_at: Instant,
    dialog: Option<String>,
    frame: Option<ElementQuery>,
    scripts: Vec<String>,
    script_results: Vec<(String, serde_json::Value)>,
    actions: Vec<String>,
    crashed: bool,
    closed: bool,
}

impl MockWorld {
    fn new(origin: String) -> Self {
        Self {
            origin,
            pages: BTreeMap::new(),
            current: "about:blank".to_string(),
            history: Vec::new(),
            forward_stack: Vec::new(),
            loaded_at: Instant::now(),
            dialog: None,
            frame: None,
            scripts: Vec::new(),
            script_results: Vec::new(),
            actions: Vec::new(),
            crashed: false,
            closed: false,
        }
    }

    /// Absolute URL for a path or URL
    #[must_use]
    pub fn resolve_url(&self, target: &str) -> String {
        if target.starts_with('/') {
            format!("{}{}", self.origin.trim_end_matches('/'), target)
        } else {
            target.to_string()
        }
    }

    /// URL of the current page
    #[must_use]
    pub fn current_url(&self) -> &str {
        &self.current
    }

    /// Load a page, pushing the current one onto history
    pub fn navigate(&mut self, target: &str) {
        let url = self.resolve_url(target);
        if self.current != "about:blank" {
            self.history.push(std::mem::take(&mut self.current));
        }
        self.forward_stack.clear();
        self.load(url);
    }

    fn load(&mut self, url: String) {
        self.pages.entry(url.clone()).or_default();
        self.current = url;
        self.loaded_at = Instant::now();
        self.frame = None;
    }

    /// Page registered at a path or URL, created empty if missing
    pub fn page_mut(&mut self, target: &str) -> &mut MockPage {
        let url = self.resolve_url(target);
        self.pages.entry(url).or_default()
    }

    /// Current page
    pub fn current_page_mut(&mut self) -> &mut MockPage {
        let url = self.current.clone();
        self.pages.entry(url).or_default()
    }

    /// Current page, read-only
    #[must_use]
    pub fn current_page(&self) -> Option<&MockPage> {
        self.pages.get(&self.current)
    }

    /// `value` of the first match on the current page
    #[must_use]
    pub fn value_of(&self, query: &ElementQuery) -> Option<String> {
        self.current_page()?
            .matches(query)
            .next()
            .and_then(|e| e.value().map(str::to_string))
    }

    /// Open a JavaScript dialog
    pub fn open_dialog(&mut self, message: impl Into<String>) {
        self.dialog = Some(message.into());
    }

    /// Log of performed element actions
    #[must_use]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Log of executed scripts
    #[must_use]
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    fn ensure_alive(&self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::fatal("session closed"));
        }
        if self.crashed {
            return Err(DriverError::fatal("browser disconnected"));
        }
        Ok(())
    }

    /// Positions in `elements` of present matches, in document order
    fn present_positions(&self, query: &ElementQuery) -> Vec<usize> {
        let elapsed = self.loaded_at.elapsed();
        self.current_page()
            .map(|page| {
                page.elements
                    .iter()
                    .enumerate()
                    .filter(|(_, (q, e))| {
                        q == query && e.appears_after.map_or(true, |d| elapsed >= d)
                    })
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn position(&self, query: &ElementQuery, index: usize) -> DriverResult<usize> {
        self.present_positions(query)
            .get(index)
            .copied()
            .ok_or_else(|| DriverError::interaction(format!("no element {query} at index {index}")))
    }

    fn element(&self, position: usize) -> DriverResult<&MockElement> {
        self.current_page()
            .and_then(|p| p.elements.get(position))
            .map(|(_, e)| e)
            .ok_or_else(|| DriverError::interaction("element detached"))
    }

    fn element_mut(&mut self, position: usize) -> DriverResult<&mut MockElement> {
        self.current_page_mut()
            .elements
            .get_mut(position)
            .map(|(_, e)| e)
            .ok_or_else(|| DriverError::interaction("element detached"))
    }

    fn usable(&self, query: &ElementQuery, index: usize, need_enabled: bool) -> DriverResult<usize> {
        let pos = self.position(query, index)?;
        let el = self.element(pos)?;
        if el.stale {
            return Err(DriverError::interaction(format!(
                "stale element reference: {query}"
            )));
        }
        if !el.visible || (need_enabled && !el.enabled) {
            return Err(DriverError::interaction(format!(
                "element not interactable: {query}"
            )));
        }
        Ok(pos)
    }

    fn apply(&mut self, position: usize, actions: Vec<MockAction>) {
        let page_url = self.current.clone();
        for action in actions {
            match action {
                MockAction::Navigate(target) => self.navigate(&target),
                MockAction::Show(q) => self.current_page_mut().matches_mut(&q).for_each(|e| e.visible = true),
                MockAction::Hide(q) => self.current_page_mut().matches_mut(&q).for_each(|e| e.visible = false),
                MockAction::RemoveSelf => {
                    if self.current == page_url {
                        let page = self.current_page_mut();
                        if position < page.elements.len() {
                            page.elements.remove(position);
                        }
                    }
                }
                MockAction::OpenDialog(message) => self.dialog = Some(message),
                MockAction::Run(handler) => handler(self),
            }
        }
    }
}

/// In-memory [`BrowserDriver`]
#[derive(Debug)]
pub struct MockDriver {
    world: Mutex<MockWorld>,
}

impl MockDriver {
    /// Mock session for a site origin such as `https://shop.test`
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            world: Mutex::new(MockWorld::new(origin.into())),
        }
    }

    /// Register a page at a path or URL
    #[must_use]
    pub fn with_page(self, target: &str, page: MockPage) -> Self {
        self.update(|w| *w.page_mut(target) = page);
        self
    }

    /// Return a canned value for scripts containing `needle`
    #[must_use]
    pub fn with_script_result(self, needle: impl Into<String>, value: serde_json::Value) -> Self {
        self.update(|w| w.script_results.push((needle.into(), value)));
        self
    }

    /// Make every later call fail as if the browser died
    pub fn crash(&self) {
        self.update(|w| w.crashed = true);
    }

    /// Whether `close` was called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inspect(|w| w.closed)
    }

    /// Read the world
    pub fn inspect<T>(&self, f: impl FnOnce(&MockWorld) -> T) -> T {
        let guard = self.world.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&guard)
    }

    /// Change the world
    pub fn update<T>(&self, f: impl FnOnce(&mut MockWorld) -> T) -> T {
        let mut guard = self.world.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }

    fn live<T>(&self, f: impl FnOnce(&mut MockWorld) -> DriverResult<T>) -> DriverResult<T> {
        self.update(|w| {
            w.ensure_alive()?;
            f(w)
        })
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.live(|w| {
            w.navigate(url);
            Ok(())
        })
    }

    async fn current_url(&self) -> DriverResult<String> {
        self.live(|w| Ok(w.current.clone()))
    }

    async fn title(&self) -> DriverResult<String> {
        self.live(|w| Ok(w.current_page().map(|p| p.title.clone()).unwrap_or_default()))
    }

    async fn reload(&self) -> DriverResult<()> {
        self.live(|w| {
            let url = w.current.clone();
            w.load(url);
            Ok(())
        })
    }

    async fn back(&self) -> DriverResult<()> {
        self.live(|w| {
            if let Some(prev) = w.history.pop() {
                let current = std::mem::take(&mut w.current);
                w.forward_stack.push(current);
                w.load(prev);
            }
            Ok(())
        })
    }

    async fn forward(&self) -> DriverResult<()> {
        self.live(|w| {
            if let Some(next) = w.forward_stack.pop() {
                let current = std::mem::take(&mut w.current);
                w.history.push(current);
                w.load(next);
            }
            Ok(())
        })
    }

    async fn page_source(&self) -> DriverResult<String> {
        self.live(|w| {
            let Some(page) = w.current_page() else {
                return Ok("<html></html>".to_string());
            };
            let mut html = format!("<html><head><title>{}</title></head><body>", page.title);
            for (query, el) in &page.elements {
                html.push_str(&format!("<{0} data-query=\"{query}\">{1}</{0}>", el.tag, el.text));
            }
            html.push_str("</body></html>");
            Ok(html)
        })
    }

    async fn execute_script(
        &self,
        script: &str,
        _args: &[serde_json::Value],
    ) -> DriverResult<serde_json::Value> {
        self.live(|w| {
            w.scripts.push(script.to_string());
            if let Some((_, v)) = w.script_results.iter().find(|(needle, _)| script.contains(needle.as_str())) {
                return Ok(v.clone());
            }
            if script.contains("document.readyState") {
                return Ok(serde_json::Value::String("complete".to_string()));
            }
            Ok(serde_json::Value::Null)
        })
    }

    async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        self.live(|_| Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]))
    }

    async fn observe(&self, query: &ElementQuery) -> DriverResult<Vec<ElementState>> {
        self.live(|w| {
            let positions = w.present_positions(query);
            positions
                .into_iter()
                .map(|pos| w.element(pos).map(MockElement::state))
                .collect()
        })
    }

    async fn click(&self, query: &ElementQuery, index: usize) -> DriverResult<()> {
        self.live(|w| {
            let pos = w.usable(query, index, true)?;
            if w.element(pos)?.obscured {
                return Err(DriverError::interaction(format!(
                    "element click intercepted: {query}"
                )));
            }
            w.actions.push(format!("click {query}#{index}"));
            let reactions = w.element(pos)?.on_click.clone();
            w.apply(pos, reactions);
            Ok(())
        })
    }

    async fn double_click(&self, query: &ElementQuery, index: usize) -> DriverResult<()> {
        self.live(|w| {
            w.usable(query, index, true)?;
            w.actions.push(format!("dblclick {query}#{index}"));
            Ok(())
        })
    }

    async fn type_text(
        &self,
        query: &ElementQuery,
        index: usize,
        text: &str,
        clear: bool,
    ) -> DriverResult<()> {
        self.live(|w| {
            let pos = w.usable(query, index, true)?;
            let el = w.element_mut(pos)?;
            let value = el.attributes.entry("value".to_string()).or_default();
            if clear {
                value.clear();
            }
            value.push_str(text);
            let reactions = el.on_change.clone();
            w.actions.push(format!("type {query}#{index}"));
            w.apply(pos, reactions);
            Ok(())
        })
    }

    async fn hover(&self, query: &ElementQuery, index: usize) -> DriverResult<()> {
        self.live(|w| {
            let pos = w.usable(query, index, false)?;
            w.actions.push(format!("hover {query}#{index}"));
            let reactions = w.element(pos)?.on_hover.clone();
            w.apply(pos, reactions);
            Ok(())
        })
    }

    async fn select_option(
        &self,
        query: &ElementQuery,
        index: usize,
        choice: &SelectBy,
    ) -> DriverResult<()> {
        self.live(|w| {
            let pos = w.usable(query, index, true)?;
            let el = w.element_mut(pos)?;
            let found = el
                .options
                .iter()
                .find(|(value, text)| match choice {
                    SelectBy::Text(t) => text == t,
                    SelectBy::Value(v) => value == v,
                })
                .cloned();
            let Some((value, text)) = found else {
                return Err(DriverError::interaction(format!(
                    "no option {choice} in {query}"
                )));
            };
            el.attributes.insert("value".to_string(), value);
            el.text = text;
            w.actions.push(format!("select {query}#{index} {choice}"));
            Ok(())
        })
    }

    async fn scroll_into_view(&self, query: &ElementQuery, index: usize) -> DriverResult<()> {
        self.live(|w| {
            w.position(query, index)?;
            w.actions.push(format!("scroll {query}#{index}"));
            Ok(())
        })
    }

    async fn read_text(&self, query: &ElementQuery, index: usize) -> DriverResult<String> {
        self.live(|w| {
            let pos = w.position(query, index)?;
            let el = w.element(pos)?;
            if el.stale {
                return Err(DriverError::interaction(format!(
                    "stale element reference: {query}"
                )));
            }
            Ok(if el.visible { el.text.clone() } else { String::new() })
        })
    }

    async fn read_attribute(
        &self,
        query: &ElementQuery,
        index: usize,
        name: &str,
    ) -> DriverResult<Option<String>> {
        self.live(|w| {
            let pos = w.position(query, index)?;
            Ok(w.element(pos)?.attributes.get(name).cloned())
        })
    }

    async fn switch_to_frame(&self, query: &ElementQuery, index: usize) -> DriverResult<()> {
        self.live(|w| {
            w.position(query, index)?;
            w.frame = Some(query.clone());
            Ok(())
        })
    }

    async fn switch_to_default_content(&self) -> DriverResult<()> {
        self.live(|w| {
            w.frame = None;
            Ok(())
        })
    }

    async fn accept_dialog(&self) -> DriverResult<bool> {
        self.live(|w| Ok(w.dialog.take().is_some()))
    }

    async fn upload_file(
        &self,
        query: &ElementQuery,
        index: usize,
        path: &Path,
    ) -> DriverResult<()> {
        self.live(|w| {
            let pos = w.usable(query, index, true)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            w.element_mut(pos)?.attributes.insert("value".to_string(), name);
            w.actions.push(format!("upload {query}#{index}"));
            Ok(())
        })
    }

    async fn close(&self) -> DriverResult<()> {
        self.update(|w| {
            w.closed = true;
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    const LINK: ElementQuery = ElementQuery::xpath("//a[@href='/products']");
    const INPUT: ElementQuery = ElementQuery::id("search_product");
    const TITLE: ElementQuery = ElementQuery::xpath("//h2[text()='All Products']");

    fn driver() -> MockDriver {
        MockDriver::new("https://shop.test")
            .with_page(
                "/",
                MockPage::new("Home").with(
                    LINK,
                    MockElement::new("a")
                        .text("Products")
                        .on_click(MockAction::navigate("/products")),
                ),
            )
            .with_page(
                "/products",
                MockPage::new("All Products")
                    .with(TITLE, MockElement::new("h2").text("All Products"))
                    .with(INPUT, MockElement::new("input")),
            )
    }

    #[tokio::test]
    async fn test_click_navigates() {
        let d = driver();
        d.navigate("https://shop.test/").await.unwrap();
        d.click(&LINK, 0).await.unwrap();
        assert_eq!(d.current_url().await.unwrap(), "https://shop.test/products");
        assert_eq!(d.title().await.unwrap(), "All Products");
    }

    #[tokio::test]
    async fn test_back_and_forward() {
        let d = driver();
        d.navigate("/").await.unwrap();
        d.navigate("/products").await.unwrap();
        d.back().await.unwrap();
        assert_eq!(d.current_url().await.unwrap(), "https://shop.test/");
        d.forward().await.unwrap();
        assert_eq!(d.current_url().await.unwrap(), "https://shop.test/products");
    }

    #[tokio::test]
    async fn test_type_clear_and_append() {
        let d = driver();
        d.navigate("/products").await.unwrap();
        d.type_text(&INPUT, 0, "dr", true).await.unwrap();
        d.type_text(&INPUT, 0, "ess", false).await.unwrap();
        assert_eq!(
            d.read_attribute(&INPUT, 0, "value").await.unwrap().as_deref(),
            Some("dress")
        );
        d.type_text(&INPUT, 0, "top", true).await.unwrap();
        assert_eq!(d.inspect(|w| w.value_of(&INPUT)).as_deref(), Some("top"));
    }

    #[tokio::test]
    async fn test_observe_respects_appears_after() {
        let late = ElementQuery::id("late");
        let d = MockDriver::new("https://shop.test").with_page(
            "/",
            MockPage::new("Home").with(
                late.clone(),
                MockElement::new("div").appears_after(Duration::from_secs(60)),
            ),
        );
        d.navigate("/").await.unwrap();
        assert!(d.observe(&late).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stale_element_is_interaction_error() {
        let q = ElementQuery::id("gone");
        let d = MockDriver::new("https://shop.test")
            .with_page("/", MockPage::new("Home").with(q.clone(), MockElement::new("button").stale()));
        d.navigate("/").await.unwrap();
        let err = d.click(&q, 0).await.unwrap_err();
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_crash_is_fatal() {
        let d = driver();
        d.navigate("/").await.unwrap();
        d.crash();
        let err = d.observe(&LINK).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_close_then_use_is_fatal() {
        let d = driver();
        d.close().await.unwrap();
        assert!(d.is_closed());
        assert!(d.navigate("/").await.unwrap_err().is_fatal());
    }

    #[tokio::test]
    async fn test_remove_self_on_click() {
        let del = ElementQuery::xpath("//td[@class='cart_delete']//a");
        let d = MockDriver::new("https://shop.test").with_page(
            "/view_cart",
            MockPage::new("Cart")
                .with(del.clone(), MockElement::new("a").on_click(MockAction::RemoveSelf))
                .with(del.clone(), MockElement::new("a").on_click(MockAction::RemoveSelf)),
        );
        d.navigate("/view_cart").await.unwrap();
        d.click(&del, 1).await.unwrap();
        assert_eq!(d.observe(&del).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_typing_runs_change_reactions_after_value() {
        let field = ElementQuery::id("qty");
        let echo = ElementQuery::id("echo");
        let d = MockDriver::new("https://shop.test").with_page(
            "/form",
            MockPage::new("Form")
                .with(
                    field.clone(),
                    MockElement::new("input").on_change(MockAction::run(|w| {
                        let typed = w.value_of(&ElementQuery::id("qty")).unwrap_or_default();
                        w.current_page_mut()
                            .matches_mut(&ElementQuery::id("echo"))
                            .for_each(|e| e.text = typed.clone());
                    })),
                )
                .with(echo.clone(), MockElement::new("span")),
        );
        d.navigate("/form").await.unwrap();
        d.type_text(&field, 0, "4", true).await.unwrap();
        assert_eq!(d.read_text(&echo, 0).await.unwrap(), "4");
    }

    #[tokio::test]
    async fn test_dialog_accept() {
        let d = driver();
        assert!(!d.accept_dialog().await.unwrap());
        d.update(|w| w.open_dialog("Press OK to proceed!"));
        assert!(d.accept_dialog().await.unwrap());
    }
}
