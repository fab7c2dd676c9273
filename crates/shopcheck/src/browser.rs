//! Browser launch and the Chromium driver.
//!
//! [`BrowserConfig`] is always available. With the `browser` feature,
//! [`launch`] starts a Chromium-family browser over the Chrome `DevTools`
//! Protocol (chromiumoxide) and hands back a shared [`BrowserDriver`].
//! Without the feature, launching reports a [`ShopError::BrowserLaunch`].

use crate::driver::BrowserDriver;
use crate::result::{ShopError, ShopResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Browser family to launch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Google Chrome
    #[default]
    Chrome,
    /// Chromium
    Chromium,
    /// Microsoft Edge
    Edge,
    /// Mozilla Firefox
    Firefox,
}

impl BrowserKind {
    /// Lower-case name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Chromium => "chromium",
            Self::Edge => "edge",
            Self::Firefox => "firefox",
        }
    }

    /// Whether the browser speaks CDP
    #[must_use]
    pub const fn is_chromium_family(&self) -> bool {
        !matches!(self, Self::Firefox)
    }
}

impl FromStr for BrowserKind {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "chromium" => Ok(Self::Chromium),
            "edge" | "msedge" => Ok(Self::Edge),
            "firefox" => Ok(Self::Firefox),
            other => Err(ShopError::UnsupportedBrowser {
                name: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Browser family
    pub kind: BrowserKind,
    /// Run without a window
    pub headless: bool,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Browser binary (None = auto-detect)
    pub executable: Option<PathBuf>,
    /// Extra command-line switches
    pub args: Vec<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Ceiling for node lookups the driver makes outside the wait engine
    pub implicit_wait: Duration,
    /// Ceiling for a navigation to finish
    pub page_load_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chrome,
            headless: false,
            window_width: 1920,
            window_height: 1080,
            executable: None,
            args: Vec::new(),
            sandbox: true,
            implicit_wait: Duration::from_secs(10),
            page_load_timeout: Duration::from_secs(30),
        }
    }
}

impl BrowserConfig {
    /// Set the browser family
    #[must_use]
    pub const fn with_kind(mut self, kind: BrowserKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set window dimensions
    #[must_use]
    pub const fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set browser binary
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Add a command-line switch
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the navigation ceiling
    #[must_use]
    pub const fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    /// Switches passed to the browser, with `--no-sandbox` folded in
    #[must_use]
    pub fn launch_args(&self) -> Vec<String> {
        let mut args: Vec<String> = self
            .args
            .iter()
            .filter(|a| a.as_str() != "--no-sandbox" && a.as_str() != "--headless")
            .cloned()
            .collect();
        args.dedup();
        args
    }

    /// Whether the sandbox is off, by flag or by switch
    #[must_use]
    pub fn sandbox_disabled(&self) -> bool {
        !self.sandbox || self.args.iter().any(|a| a == "--no-sandbox")
    }
}

const EDGE_LOCATIONS: &[&str] = &[
    "/usr/bin/microsoft-edge",
    "/usr/bin/microsoft-edge-stable",
    "/opt/microsoft/msedge/msedge",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    "C:\\Program Files (x86)\\Microsoft\\Edge\\Application\\msedge.exe",
    "C:\\Program Files\\Microsoft\\Edge\\Application\\msedge.exe",
];

/// Binary to launch. `None` lets chromiumoxide find Chrome or Chromium.
pub fn resolve_executable(config: &BrowserConfig) -> ShopResult<Option<PathBuf>> {
    resolve_executable_in(config, EDGE_LOCATIONS)
}

fn resolve_executable_in(config: &BrowserConfig, edge: &[&str]) -> ShopResult<Option<PathBuf>> {
    if !config.kind.is_chromium_family() {
        return Err(ShopError::UnsupportedBrowser {
            name: config.kind.to_string(),
        });
    }
    if let Some(path) = &config.executable {
        if !path.exists() {
            return Err(ShopError::BrowserNotFound);
        }
        return Ok(Some(path.clone()));
    }
    match config.kind {
        BrowserKind::Edge => edge
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .map(|p| Some(p.to_path_buf()))
            .ok_or(ShopError::BrowserNotFound),
        _ => Ok(None),
    }
}

/// Start a browser session
pub async fn launch(config: &BrowserConfig) -> ShopResult<Arc<dyn BrowserDriver>> {
    let executable = resolve_executable(config)?;
    crate::logging::browser_action(
        "Launching",
        Some(&format!(
            "{} headless={} {}x{}",
            config.kind, config.headless, config.window_width, config.window_height
        )),
    );
    launch_with(config, executable).await
}

#[cfg(feature = "browser")]
async fn launch_with(
    config: &BrowserConfig,
    executable: Option<PathBuf>,
) -> ShopResult<Arc<dyn BrowserDriver>> {
    let driver = cdp::ChromiumDriver::launch(config, executable).await?;
    Ok(Arc::new(driver))
}

#[cfg(not(feature = "browser"))]
async fn launch_with(
    _config: &BrowserConfig,
    _executable: Option<PathBuf>,
) -> ShopResult<Arc<dyn BrowserDriver>> {
    Err(ShopError::BrowserLaunch {
        message: "shopcheck was built without the `browser` feature".to_string(),
    })
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation
)]
mod cdp {
    use super::*;
    use crate::driver::{DriverError, DriverResult, ElementState, SelectBy};
    use crate::locator::{ElementQuery, Strategy};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
    use chromiumoxide::cdp::browser_protocol::input::{
        DispatchMouseEventParams, DispatchMouseEventType, InsertTextParams, MouseButton,
    };
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams, HandleJavaScriptDialogParams,
    };
    use chromiumoxide::error::CdpError;
    use chromiumoxide::layout::Point;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde_json::Value;
    use tokio::sync::Mutex;

    /// Outcome of an in-page element script
    #[derive(Debug, Deserialize)]
    struct Acted {
        ok: bool,
        #[serde(default)]
        error: Option<String>,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        value: Option<String>,
    }

    /// Chromium session over CDP
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: Mutex<CdpBrowser>,
        page: CdpPage,
        frame: std::sync::Mutex<Option<(ElementQuery, usize)>>,
        page_load_timeout: Duration,
        implicit_wait: Duration,
        handle: tokio::task::JoinHandle<()>,
    }

    fn fatal(e: impl std::fmt::Display) -> DriverError {
        DriverError::fatal(e.to_string())
    }

    /// Script exceptions and protocol rejections leave the session usable
    fn classify(e: CdpError) -> DriverError {
        match &e {
            CdpError::JavascriptException(_) | CdpError::Chrome(_) => {
                DriverError::interaction(e.to_string())
            }
            _ => fatal(e),
        }
    }

    impl ChromiumDriver {
        /// Launch a new browser with one blank page
        pub async fn launch(
            config: &BrowserConfig,
            executable: Option<PathBuf>,
        ) -> ShopResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.window_width, config.window_height)
                .request_timeout(config.page_load_timeout);

            if !config.headless {
                builder = builder.with_head();
            }

            if config.sandbox_disabled() {
                builder = builder.no_sandbox();
            }

            if let Some(path) = executable {
                builder = builder.chrome_executable(path);
            }

            for arg in config.launch_args() {
                builder = builder.arg(arg);
            }

            let cdp_config = builder
                .build()
                .map_err(|e| ShopError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ShopError::BrowserLaunch {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ShopError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            crate::logging::browser_action("Launched", Some(config.kind.as_str()));

            Ok(Self {
                browser: Mutex::new(browser),
                page,
                frame: std::sync::Mutex::new(None),
                page_load_timeout: config.page_load_timeout,
                implicit_wait: config.implicit_wait,
                handle,
            })
        }

        fn frame(&self) -> Option<(ElementQuery, usize)> {
            self.frame
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }

        fn set_frame(&self, frame: Option<(ElementQuery, usize)>) {
            *self
                .frame
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = frame;
        }

        /// Expression for the document queries resolve against
        fn root_expr(&self) -> String {
            match self.frame() {
                None => "document".to_string(),
                Some((query, index)) => format!(
                    "(() => {{ const f = {}[{index}]; return f && f.contentDocument ? f.contentDocument : document; }})()",
                    query.to_nodes_expr("document")
                ),
            }
        }

        async fn eval<T: DeserializeOwned>(&self, expr: String) -> DriverResult<T> {
            let result = self.page.evaluate(expr).await.map_err(classify)?;
            result
                .into_value()
                .map_err(|e| DriverError::interaction(e.to_string()))
        }

        /// Run `body` with `el` bound to the `index`-th match
        async fn act(&self, query: &ElementQuery, index: usize, body: &str) -> DriverResult<Acted> {
            let expr = format!(
                "(() => {{ const root = {root}; const nodes = {nodes}; const el = nodes[{index}]; \
                 if (!el) return {{ ok: false, error: 'no element at index {index}' }}; {body} }})()",
                root = self.root_expr(),
                nodes = query.to_nodes_expr("root"),
            );
            let acted: Acted = self.eval(expr).await?;
            if acted.ok {
                Ok(acted)
            } else {
                Err(DriverError::interaction(format!(
                    "{query}#{index}: {}",
                    acted.error.unwrap_or_else(|| "action rejected".to_string())
                )))
            }
        }

        /// Scroll to the element and report its center in viewport coordinates
        async fn center(&self, query: &ElementQuery, index: usize) -> DriverResult<Point> {
            let acted = self.act(query, index, CENTER_JS).await?;
            Ok(Point::new(acted.x, acted.y))
        }

        async fn mouse(&self, kind: DispatchMouseEventType, at: Point, clicks: i64) -> DriverResult<()> {
            let params = DispatchMouseEventParams::builder()
                .r#type(kind)
                .x(at.x)
                .y(at.y)
                .button(MouseButton::Left)
                .click_count(clicks)
                .build()
                .map_err(DriverError::interaction)?;
            self.page.execute(params).await.map_err(classify)?;
            Ok(())
        }

        async fn settle_navigation(&self) -> DriverResult<()> {
            match tokio::time::timeout(self.page_load_timeout, self.page.wait_for_navigation()).await {
                Ok(result) => result.map(|_| ()).map_err(classify),
                Err(_) => Err(DriverError::interaction("navigation did not settle")),
            }
        }
    }

    const CENTER_JS: &str = "el.scrollIntoView({ block: 'center', inline: 'center' }); \
        const r = el.getBoundingClientRect(); \
        let x = r.left + r.width / 2, y = r.top + r.height / 2; \
        const hit = el.ownerDocument.elementFromPoint(x, y); \
        if (hit && hit !== el && !el.contains(hit)) return { ok: false, error: 'element click intercepted by <' + hit.tagName.toLowerCase() + '>' }; \
        const fe = el.ownerDocument.defaultView.frameElement; \
        if (fe) { const fr = fe.getBoundingClientRect(); x += fr.left; y += fr.top; } \
        return { ok: true, x, y };";

    const OBSERVE_JS: &str = "return nodes.map((el) => { \
        const s = el.ownerDocument.defaultView.getComputedStyle(el); \
        const r = el.getBoundingClientRect(); \
        const visible = r.width > 0 && r.height > 0 && s.display !== 'none' && s.visibility !== 'hidden' && parseFloat(s.opacity || '1') > 0; \
        let obscured = false; \
        if (visible) { const hit = el.ownerDocument.elementFromPoint(r.left + r.width / 2, r.top + r.height / 2); \
          obscured = !!hit && hit !== el && !el.contains(hit) && !hit.contains(el); } \
        return { tag: el.tagName.toLowerCase(), visible, enabled: !el.disabled, obscured, text: (el.innerText || el.textContent || '').trim() }; });";

    #[async_trait]
    impl BrowserDriver for ChromiumDriver {
        async fn navigate(&self, url: &str) -> DriverResult<()> {
            self.set_frame(None);
            self.page.goto(url).await.map_err(fatal)?;
            Ok(())
        }

        async fn current_url(&self) -> DriverResult<String> {
            Ok(self.page.url().await.map_err(fatal)?.unwrap_or_default())
        }

        async fn title(&self) -> DriverResult<String> {
            Ok(self.page.get_title().await.map_err(fatal)?.unwrap_or_default())
        }

        async fn reload(&self) -> DriverResult<()> {
            self.set_frame(None);
            self.page.reload().await.map_err(fatal)?;
            Ok(())
        }

        async fn back(&self) -> DriverResult<()> {
            self.set_frame(None);
            self.page
                .evaluate("window.history.back()")
                .await
                .map_err(classify)?;
            self.settle_navigation().await
        }

        async fn forward(&self) -> DriverResult<()> {
            self.set_frame(None);
            self.page
                .evaluate("window.history.forward()")
                .await
                .map_err(classify)?;
            self.settle_navigation().await
        }

        async fn page_source(&self) -> DriverResult<String> {
            self.page.content().await.map_err(fatal)
        }

        async fn execute_script(&self, script: &str, args: &[Value]) -> DriverResult<Value> {
            let args = serde_json::to_string(args).map_err(|e| DriverError::interaction(e.to_string()))?;
            let expr = format!("(function() {{ {script} }}).apply(null, {args})");
            let result = self.page.evaluate(expr).await.map_err(classify)?;
            Ok(result.value().cloned().unwrap_or(Value::Null))
        }

        async fn screenshot(&self) -> DriverResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();
            let screenshot = self.page.execute(params).await.map_err(classify)?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| DriverError::interaction(e.to_string()))
        }

        async fn observe(&self, query: &ElementQuery) -> DriverResult<Vec<ElementState>> {
            let expr = format!(
                "(() => {{ const root = {root}; const nodes = {nodes}; {OBSERVE_JS} }})()",
                root = self.root_expr(),
                nodes = query.to_nodes_expr("root"),
            );
            self.eval(expr).await
        }

        async fn click(&self, query: &ElementQuery, index: usize) -> DriverResult<()> {
            let at = self.center(query, index).await?;
            self.page.click(at).await.map_err(classify)?;
            Ok(())
        }

        async fn double_click(&self, query: &ElementQuery, index: usize) -> DriverResult<()> {
            let at = self.center(query, index).await?;
            self.page.move_mouse(at).await.map_err(classify)?;
            self.mouse(DispatchMouseEventType::MousePressed, at, 2).await?;
            self.mouse(DispatchMouseEventType::MouseReleased, at, 2).await
        }

        async fn type_text(
            &self,
            query: &ElementQuery,
            index: usize,
            text: &str,
            clear: bool,
        ) -> DriverResult<()> {
            let clear_js = if clear {
                "if ('value' in el) { el.value = ''; el.dispatchEvent(new Event('input', { bubbles: true })); }"
            } else {
                "if (typeof el.setSelectionRange === 'function' && typeof el.value === 'string') { try { el.setSelectionRange(el.value.length, el.value.length); } catch (_) {} }"
            };
            let body = format!(
                "if (el.disabled || el.readOnly) return {{ ok: false, error: 'element not interactable' }}; \
                 el.focus(); {clear_js} return {{ ok: true }};"
            );
            self.act(query, index, &body).await?;
            self.page
                .execute(InsertTextParams::new(text))
                .await
                .map_err(classify)?;
            self.act(
                query,
                index,
                "el.dispatchEvent(new Event('change', { bubbles: true })); return { ok: true };",
            )
            .await?;
            Ok(())
        }

        async fn hover(&self, query: &ElementQuery, index: usize) -> DriverResult<()> {
            let acted = self
                .act(
                    query,
                    index,
                    "el.scrollIntoView({ block: 'center' }); const r = el.getBoundingClientRect(); \
                     let x = r.left + r.width / 2, y = r.top + r.height / 2; \
                     const fe = el.ownerDocument.defaultView.frameElement; \
                     if (fe) { const fr = fe.getBoundingClientRect(); x += fr.left; y += fr.top; } \
                     return { ok: true, x, y };",
                )
                .await?;
            self.page
                .move_mouse(Point::new(acted.x, acted.y))
                .await
                .map_err(classify)?;
            Ok(())
        }

        async fn select_option(
            &self,
            query: &ElementQuery,
            index: usize,
            choice: &SelectBy,
        ) -> DriverResult<()> {
            let (field, wanted) = match choice {
                SelectBy::Text(t) => ("text", t),
                SelectBy::Value(v) => ("value", v),
            };
            let body = format!(
                "if (el.tagName.toLowerCase() !== 'select') return {{ ok: false, error: 'not a select' }}; \
                 const opt = Array.from(el.options).find((o) => ({field:?} === 'text' ? o.text.trim() : o.value) === {wanted:?}); \
                 if (!opt) return {{ ok: false, error: 'no option {choice}' }}; \
                 el.value = opt.value; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 return {{ ok: true }};"
            );
            self.act(query, index, &body).await?;
            Ok(())
        }

        async fn scroll_into_view(&self, query: &ElementQuery, index: usize) -> DriverResult<()> {
            self.act(
                query,
                index,
                "el.scrollIntoView({ block: 'center' }); return { ok: true };",
            )
            .await?;
            Ok(())
        }

        async fn read_text(&self, query: &ElementQuery, index: usize) -> DriverResult<String> {
            let acted = self
                .act(
                    query,
                    index,
                    "return { ok: true, value: (el.innerText || '').trim() };",
                )
                .await?;
            Ok(acted.value.unwrap_or_default())
        }

        async fn read_attribute(
            &self,
            query: &ElementQuery,
            index: usize,
            name: &str,
        ) -> DriverResult<Option<String>> {
            let body = format!(
                "const n = {name:?}; const p = el[n]; \
                 if (p !== undefined && p !== null && typeof p !== 'object' && typeof p !== 'function') return {{ ok: true, value: String(p) }}; \
                 const a = el.getAttribute(n); return {{ ok: true, value: a === null ? undefined : a }};"
            );
            Ok(self.act(query, index, &body).await?.value)
        }

        async fn switch_to_frame(&self, query: &ElementQuery, index: usize) -> DriverResult<()> {
            self.set_frame(None);
            let acted = self
                .act(
                    query,
                    index,
                    "return el.contentDocument ? { ok: true } : { ok: false, error: 'frame not accessible' };",
                )
                .await?;
            if acted.ok {
                self.set_frame(Some((query.clone(), index)));
            }
            Ok(())
        }

        async fn switch_to_default_content(&self) -> DriverResult<()> {
            self.set_frame(None);
            Ok(())
        }

        async fn accept_dialog(&self) -> DriverResult<bool> {
            match self.page.execute(HandleJavaScriptDialogParams::new(true)).await {
                Ok(_) => Ok(true),
                Err(CdpError::Chrome(_)) => Ok(false),
                Err(e) => Err(classify(e)),
            }
        }

        async fn upload_file(
            &self,
            query: &ElementQuery,
            index: usize,
            path: &Path,
        ) -> DriverResult<()> {
            let absolute = std::fs::canonicalize(path)
                .map_err(|e| DriverError::interaction(format!("{}: {e}", path.display())))?;
            let started = std::time::Instant::now();
            let elements = loop {
                let found = match query.strategy() {
                    Strategy::XPath => self.page.find_xpaths(query.pattern()).await,
                    _ => {
                        let css = query.to_css().unwrap_or_default();
                        self.page.find_elements(css).await
                    }
                };
                match found {
                    Ok(elements) if elements.len() > index => break elements,
                    _ if started.elapsed() >= self.implicit_wait => {
                        return Err(DriverError::interaction(format!(
                            "no element {query} at index {index}"
                        )));
                    }
                    _ => tokio::time::sleep(Duration::from_millis(250)).await,
                }
            };
            let element = &elements[index];
            let params = SetFileInputFilesParams::builder()
                .files(vec![absolute.to_string_lossy().into_owned()])
                .backend_node_id(element.backend_node_id)
                .build()
                .map_err(DriverError::interaction)?;
            self.page.execute(params).await.map_err(classify)?;
            Ok(())
        }

        async fn close(&self) -> DriverResult<()> {
            let mut browser = self.browser.lock().await;
            let closed = browser.close().await.map(|_| ()).map_err(fatal);
            self.handle.abort();
            crate::logging::browser_action("Closed", None);
            closed
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod kind_tests {
        use super::*;

        #[test]
        fn test_parse_is_case_insensitive() {
            assert_eq!("Chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
            assert_eq!(" EDGE ".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
            assert_eq!("msedge".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
        }

        #[test]
        fn test_unknown_browser() {
            let err = "safari".parse::<BrowserKind>().unwrap_err();
            assert!(matches!(err, ShopError::UnsupportedBrowser { ref name } if name == "safari"));
        }

        #[test]
        fn test_family() {
            assert!(BrowserKind::Chromium.is_chromium_family());
            assert!(!BrowserKind::Firefox.is_chromium_family());
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_defaults_match_suite_settings() {
            let config = BrowserConfig::default();
            assert!(!config.headless);
            assert_eq!((config.window_width, config.window_height), (1920, 1080));
            assert_eq!(config.page_load_timeout, Duration::from_secs(30));
        }

        #[test]
        fn test_builders() {
            let config = BrowserConfig::default()
                .with_kind(BrowserKind::Chromium)
                .with_headless(true)
                .with_window_size(1280, 720)
                .with_arg("--disable-gpu")
                .with_no_sandbox();
            assert_eq!(config.kind, BrowserKind::Chromium);
            assert!(config.headless);
            assert_eq!(config.window_width, 1280);
            assert!(config.sandbox_disabled());
        }

        #[test]
        fn test_no_sandbox_switch_becomes_flag() {
            let config = BrowserConfig::default()
                .with_arg("--no-sandbox")
                .with_arg("--disable-dev-shm-usage");
            assert!(config.sandbox_disabled());
            assert_eq!(config.launch_args(), vec!["--disable-dev-shm-usage".to_string()]);
        }
    }

    mod executable_tests {
        use super::*;

        #[test]
        fn test_firefox_is_unsupported() {
            let config = BrowserConfig::default().with_kind(BrowserKind::Firefox);
            assert!(matches!(
                resolve_executable(&config),
                Err(ShopError::UnsupportedBrowser { .. })
            ));
        }

        #[test]
        fn test_chrome_auto_detects() {
            assert_eq!(resolve_executable(&BrowserConfig::default()).unwrap(), None);
        }

        #[test]
        fn test_missing_explicit_binary() {
            let config = BrowserConfig::default().with_executable("/nonexistent/chrome");
            assert!(matches!(
                resolve_executable(&config),
                Err(ShopError::BrowserNotFound)
            ));
        }

        #[test]
        fn test_explicit_binary_used() {
            let dir = tempfile::tempdir().unwrap();
            let bin = dir.path().join("chrome");
            std::fs::write(&bin, b"").unwrap();
            let config = BrowserConfig::default().with_executable(&bin);
            assert_eq!(resolve_executable(&config).unwrap(), Some(bin));
        }

        #[test]
        fn test_edge_searches_known_locations() {
            let dir = tempfile::tempdir().unwrap();
            let bin = dir.path().join("msedge");
            std::fs::write(&bin, b"").unwrap();
            let bin_str = bin.to_string_lossy().into_owned();
            let config = BrowserConfig::default().with_kind(BrowserKind::Edge);
            assert_eq!(
                resolve_executable_in(&config, &["/nonexistent/msedge", &bin_str]).unwrap(),
                Some(bin.clone())
            );
            assert!(matches!(
                resolve_executable_in(&config, &["/nonexistent/msedge"]),
                Err(ShopError::BrowserNotFound)
            ));
        }
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_launch_without_feature_reports() {
        let err = launch(&BrowserConfig::default()).await.unwrap_err();
        assert!(matches!(err, ShopError::BrowserLaunch { .. }));
    }
}
