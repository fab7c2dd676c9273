//! Case selection and execution.
//!
//! The runner picks scenarios by suite, marker expression and name filter,
//! runs them `workers` at a time with one session per case, reruns failures
//! after a pause and feeds every final [`CaseResult`] into a [`Reporter`].

use crate::config::Settings;
use crate::data::DataManager;
use crate::fixture::{Session, TestContext};
use crate::logging;
use crate::mock::storefront::Site;
use crate::reporter::{CaseResult, Reporter, TestStatus};
use crate::result::{ShopError, ShopResult};
use crate::scenarios::{self, Marker, MarkerExpr, Scenario};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Named case selections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Suite {
    #[default]
    Smoke,
    Regression,
    All,
    Login,
    Product,
    Cart,
    Contact,
}

impl Suite {
    pub const ALL: [Self; 7] = [
        Self::Smoke,
        Self::Regression,
        Self::All,
        Self::Login,
        Self::Product,
        Self::Cart,
        Self::Contact,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Regression => "regression",
            Self::All => "all",
            Self::Login => "login",
            Self::Product => "product",
            Self::Cart => "cart",
            Self::Contact => "contact",
        }
    }

    /// Marker a case needs to belong to the suite; `None` selects everything
    #[must_use]
    pub const fn marker(&self) -> Option<Marker> {
        match self {
            Self::Smoke => Some(Marker::Smoke),
            Self::Regression => Some(Marker::Regression),
            Self::All => None,
            Self::Login => Some(Marker::Login),
            Self::Product => Some(Marker::Product),
            Self::Cart => Some(Marker::Cart),
            Self::Contact => Some(Marker::Contact),
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Suite {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|suite| suite.as_str() == wanted)
            .ok_or_else(|| ShopError::config(format!("unknown suite '{}'", s.trim())))
    }
}

/// What the sessions drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// A real browser over CDP
    #[default]
    Browser,
    /// The in-memory storefront, fresh per case
    Mock,
}

impl FromStr for Backend {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "mock" => Ok(Self::Mock),
            other => Err(ShopError::config(format!("unknown backend '{other}'"))),
        }
    }
}

/// Selection and execution knobs
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub suite: Suite,
    /// Further narrows the suite
    pub markers: Option<MarkerExpr>,
    /// Case-insensitive substring of `group::name`
    pub filter: Option<String>,
    /// Cases in flight at once
    pub workers: usize,
    /// Extra attempts for a failed or errored case
    pub reruns: u32,
    pub rerun_delay: Duration,
    pub backend: Backend,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            suite: Suite::default(),
            markers: None,
            filter: None,
            workers: 1,
            reruns: 2,
            rerun_delay: Duration::from_secs(3),
            backend: Backend::default(),
        }
    }
}

impl RunOptions {
    #[must_use]
    pub fn with_suite(mut self, suite: Suite) -> Self {
        self.suite = suite;
        self
    }

    #[must_use]
    pub fn with_markers(mut self, markers: MarkerExpr) -> Self {
        self.markers = Some(markers);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_reruns(mut self, reruns: u32, delay: Duration) -> Self {
        self.reruns = reruns;
        self.rerun_delay = delay;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Whether `scenario` is selected
    #[must_use]
    pub fn selects(&self, scenario: &Scenario) -> bool {
        let in_suite = self
            .suite
            .marker()
            .map_or(true, |m| scenario.has_marker(m));
        let by_markers = self
            .markers
            .as_ref()
            .map_or(true, |expr| expr.matches(scenario.markers));
        let by_name = self
            .filter
            .as_deref()
            .map_or(true, |f| scenario.matches_filter(f));
        in_suite && by_markers && by_name
    }

    /// Selected scenarios in catalogue order
    #[must_use]
    pub fn select(&self) -> Vec<Scenario> {
        scenarios::catalogue()
            .into_iter()
            .filter(|s| self.selects(s))
            .collect()
    }
}

/// Runs selected scenarios against configured settings
#[derive(Debug)]
pub struct Runner {
    settings: Arc<Settings>,
    options: RunOptions,
}

impl Runner {
    #[must_use]
    pub fn new(settings: Settings, options: RunOptions) -> Self {
        Self {
            settings: Arc::new(settings),
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run every selected case; `on_result` sees each final result as it
    /// completes
    pub async fn run(&self, mut on_result: impl FnMut(&CaseResult)) -> ShopResult<Reporter> {
        let selected = self.options.select();
        let mut reporter = Reporter::new(self.options.suite.as_str());
        reporter.start();
        if selected.is_empty() {
            tracing::warn!(target: "shopcheck::runner", suite = %self.options.suite, "no scenarios selected");
            return Ok(reporter);
        }
        tracing::info!(
            target: "shopcheck::runner",
            cases = selected.len(),
            workers = self.options.workers,
            backend = ?self.options.backend,
            "starting run"
        );

        let mut results = stream::iter(selected)
            .map(|scenario| self.run_case(scenario))
            .buffer_unordered(self.options.workers.max(1));
        while let Some(result) = results.next().await {
            on_result(&result);
            reporter.record(result);
        }

        tracing::info!(target: "shopcheck::runner", summary = %reporter.summary(), "run finished");
        Ok(reporter)
    }

    /// One case, rerun while it fails and attempts remain
    pub async fn run_case(&self, scenario: Scenario) -> CaseResult {
        let id = scenario.id();
        let mut attempt = 1;
        loop {
            let started = Instant::now();
            let outcome = self.attempt(&scenario, attempt).await;
            let status = TestStatus::classify(&outcome);
            if status.is_failure() && attempt <= self.options.reruns {
                tracing::warn!(
                    target: "shopcheck::runner",
                    case = %id,
                    attempt,
                    %status,
                    error = ?outcome.as_ref().err().map(ToString::to_string),
                    "rerunning"
                );
                tokio::time::sleep(self.options.rerun_delay).await;
                attempt += 1;
                continue;
            }
            return CaseResult::from_outcome(scenario.name, scenario.group, &outcome, started.elapsed())
                .with_markers(scenario.markers.iter().map(Marker::as_str))
                .with_attempts(attempt);
        }
    }

    async fn attempt(&self, scenario: &Scenario, attempt: u32) -> ShopResult<()> {
        let name = if attempt == 1 {
            scenario.id()
        } else {
            format!("{}[rerun{}]", scenario.id(), attempt - 1)
        };
        let ctx = self.open_context(name).await?;
        let outcome = match AssertUnwindSafe((scenario.run)(&ctx)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(target: "shopcheck::runner", case = %scenario.id(), %message, "scenario panicked");
                Err(ShopError::Driver {
                    message: format!("scenario panicked: {message}"),
                })
            }
        };
        let status = TestStatus::classify(&outcome);
        if let Err(e) = ctx.close(status.label()).await {
            tracing::warn!(target: "shopcheck::runner", case = %scenario.id(), error = %e, "session did not close cleanly");
        }
        outcome
    }

    async fn open_context(&self, name: String) -> ShopResult<TestContext> {
        match self.options.backend {
            Backend::Browser => TestContext::launch(name, Arc::clone(&self.settings)).await,
            Backend::Mock => {
                let site = Site::new();
                let user = DataManager::new(self.settings.data.clone()).valid_user()?;
                site.add_account(&user.display_name(), &user.email, &user.password);
                logging::browser_action("Mock storefront", Some(&name));
                let driver = site.driver(&self.settings.base_url);
                Ok(TestContext::new(Session::attach(
                    name,
                    driver,
                    Arc::clone(&self.settings),
                )))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::storefront::Storefront;
    use crate::scenarios::ScenarioFuture;

    fn mock_settings(dir: &tempfile::TempDir) -> Settings {
        Storefront::settings(dir.path().join("reports"))
    }

    mod suite_tests {
        use super::*;

        #[test]
        fn test_parse_suite() {
            assert_eq!("Smoke".parse::<Suite>().unwrap(), Suite::Smoke);
            assert_eq!(" all ".parse::<Suite>().unwrap(), Suite::All);
            assert!("nightly".parse::<Suite>().is_err());
        }

        #[test]
        fn test_suite_markers() {
            assert_eq!(Suite::All.marker(), None);
            assert_eq!(Suite::Cart.marker(), Some(Marker::Cart));
            for suite in Suite::ALL {
                assert_eq!(suite.to_string().parse::<Suite>().unwrap(), suite);
            }
        }

        #[test]
        fn test_parse_backend() {
            assert_eq!("MOCK".parse::<Backend>().unwrap(), Backend::Mock);
            assert!("remote".parse::<Backend>().is_err());
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_smoke_selects_only_smoke() {
            let selected = RunOptions::default().select();
            assert!(!selected.is_empty());
            assert!(selected.iter().all(|s| s.has_marker(Marker::Smoke)));
        }

        #[test]
        fn test_all_selects_catalogue() {
            let selected = RunOptions::default().with_suite(Suite::All).select();
            assert_eq!(selected.len(), scenarios::catalogue().len());
        }

        #[test]
        fn test_markers_narrow_suite() {
            let options = RunOptions::default()
                .with_suite(Suite::All)
                .with_markers("cart and not slow".parse().unwrap());
            let selected = options.select();
            assert!(!selected.is_empty());
            assert!(selected
                .iter()
                .all(|s| s.has_marker(Marker::Cart) && !s.has_marker(Marker::Slow)));
        }

        #[test]
        fn test_filter_by_name() {
            let options = RunOptions::default()
                .with_suite(Suite::All)
                .with_filter("CART::page_loads");
            let ids: Vec<String> = options.select().iter().map(Scenario::id).collect();
            assert_eq!(ids, vec!["cart::page_loads".to_string()]);
        }

        #[test]
        fn test_nothing_matches() {
            let options = RunOptions::default().with_filter("no-such-case");
            assert!(options.select().is_empty());
        }
    }

    mod run_tests {
        use super::*;
        use crate::driver::BrowserDriver;

        fn mock_runner(dir: &tempfile::TempDir, options: RunOptions) -> Runner {
            Runner::new(
                mock_settings(dir),
                options.with_backend(Backend::Mock).with_reruns(0, Duration::ZERO),
            )
        }

        #[tokio::test]
        async fn test_empty_selection_reports_nothing() {
            let dir = tempfile::tempdir().unwrap();
            let runner = mock_runner(&dir, RunOptions::default().with_filter("no-such-case"));
            let reporter = runner.run(|_| {}).await.unwrap();
            assert_eq!(reporter.total_count(), 0);
        }

        #[tokio::test]
        async fn test_mock_case_passes() {
            let dir = tempfile::tempdir().unwrap();
            let runner = mock_runner(
                &dir,
                RunOptions::default()
                    .with_suite(Suite::All)
                    .with_filter("home::page_loads"),
            );
            let mut seen = Vec::new();
            let reporter = runner.run(|r| seen.push(r.name.clone())).await.unwrap();
            assert_eq!(seen, vec!["page_loads".to_string()]);
            assert!(reporter.all_passed(), "{}", reporter.render_text());
            assert_eq!(reporter.results()[0].group, "home");
            assert_eq!(reporter.results()[0].attempts, 1);
        }

        #[tokio::test]
        async fn test_parallel_workers_finish_every_case() {
            let dir = tempfile::tempdir().unwrap();
            let runner = mock_runner(
                &dir,
                RunOptions::default()
                    .with_suite(Suite::All)
                    .with_filter("::page_loads")
                    .with_workers(3),
            );
            let reporter = runner.run(|_| {}).await.unwrap();
            assert_eq!(reporter.total_count(), 4);
            assert!(reporter.all_passed(), "{}", reporter.render_text());
        }

        #[tokio::test]
        async fn test_stored_user_can_log_in() {
            let dir = tempfile::tempdir().unwrap();
            let settings = mock_settings(&dir);
            DataManager::new(settings.data.clone())
                .create_test_data_templates()
                .unwrap();
            let runner = Runner::new(
                settings,
                RunOptions::default()
                    .with_suite(Suite::All)
                    .with_filter("auth::valid_login")
                    .with_backend(Backend::Mock)
                    .with_reruns(0, Duration::ZERO),
            );
            let reporter = runner.run(|_| {}).await.unwrap();
            assert!(reporter.all_passed(), "{}", reporter.render_text());
        }

        #[tokio::test]
        async fn test_missing_user_file_skips() {
            let dir = tempfile::tempdir().unwrap();
            let runner = mock_runner(
                &dir,
                RunOptions::default()
                    .with_suite(Suite::All)
                    .with_filter("auth::valid_login"),
            );
            let reporter = runner.run(|_| {}).await.unwrap();
            assert_eq!(reporter.skipped_count(), 1);
        }

        fn never_holds(ctx: &TestContext) -> ScenarioFuture<'_> {
            Box::pin(async move { ctx.ensure(false, "never holds").await })
        }

        fn not_applicable(ctx: &TestContext) -> ScenarioFuture<'_> {
            Box::pin(async move { ctx.skip("not applicable") })
        }

        const FAILING: Scenario = Scenario {
            name: "never_holds",
            group: "meta",
            markers: &[Marker::Regression],
            run: never_holds,
        };

        const SKIPPING: Scenario = Scenario {
            name: "not_applicable",
            group: "meta",
            markers: &[Marker::Regression],
            run: not_applicable,
        };

        #[tokio::test]
        async fn test_failures_are_rerun() {
            let dir = tempfile::tempdir().unwrap();
            let runner = Runner::new(
                mock_settings(&dir),
                RunOptions::default()
                    .with_backend(Backend::Mock)
                    .with_reruns(2, Duration::from_millis(10)),
            );
            let result = runner.run_case(FAILING).await;
            assert_eq!(result.status, TestStatus::Failed);
            assert_eq!(result.attempts, 3);
            assert!(result.error.unwrap().contains("never holds"));
        }

        static PANICKED_DRIVER: std::sync::Mutex<Option<Arc<dyn BrowserDriver>>> =
            std::sync::Mutex::new(None);

        fn indexes_empty_rows(ctx: &TestContext) -> ScenarioFuture<'_> {
            Box::pin(async move {
                *PANICKED_DRIVER.lock().unwrap() = Some(Arc::clone(ctx.session().driver()));
                let rows: Vec<String> = Vec::new();
                ctx.ensure(!rows[0].is_empty(), "unreachable").await
            })
        }

        const PANICKING: Scenario = Scenario {
            name: "indexes_empty_rows",
            group: "meta",
            markers: &[Marker::Regression],
            run: indexes_empty_rows,
        };

        #[tokio::test]
        async fn test_panic_is_an_error_and_session_closes() {
            let dir = tempfile::tempdir().unwrap();
            let runner = Runner::new(
                mock_settings(&dir),
                RunOptions::default()
                    .with_backend(Backend::Mock)
                    .with_reruns(1, Duration::from_millis(10)),
            );
            let joined = tokio::spawn(async move { runner.run_case(PANICKING).await }).await;
            let result = joined.expect("panic escaped run_case");
            assert_eq!(result.status, TestStatus::Error);
            assert_eq!(result.attempts, 2);
            assert!(result.error.unwrap().contains("scenario panicked"));

            let driver = PANICKED_DRIVER.lock().unwrap().take().unwrap();
            assert!(driver.current_url().await.is_err(), "session left open");
        }

        #[tokio::test]
        async fn test_skips_are_not_rerun() {
            let dir = tempfile::tempdir().unwrap();
            let runner = Runner::new(
                mock_settings(&dir),
                RunOptions::default()
                    .with_backend(Backend::Mock)
                    .with_reruns(2, Duration::from_millis(10)),
            );
            let result = runner.run_case(SKIPPING).await;
            assert_eq!(result.status, TestStatus::Skipped);
            assert_eq!(result.attempts, 1);
        }
    }
}
