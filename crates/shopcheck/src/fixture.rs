//! Per-test fixtures: the browser [`Session`] and the [`TestContext`]
//! bundle scenarios run against.
//!
//! ```text
//! Session::launch(name, settings)      test_start
//!   └─► TestContext { session, data }  page objects, flow helpers, ensure()
//!         └─► close(status)            driver.close(), test_end
//! ```

use crate::browser;
use crate::config::Settings;
use crate::data::{ContactMessage, DataManager, TestUser};
use crate::driver::BrowserDriver;
use crate::logging;
use crate::page_object::{BasePage, PageObject};
use crate::pages::{
    AccountCreatedPage, CartPage, ContactUsPage, HomePage, LoginPage, ProductsPage, SignupPage,
};
use crate::result::{ShopError, ShopResult};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// One browser session owned by one test
#[derive(Debug)]
pub struct Session {
    name: String,
    driver: Arc<dyn BrowserDriver>,
    settings: Arc<Settings>,
    closed: AtomicBool,
    started: Instant,
}

impl Session {
    /// Launch the configured browser for the test `name`
    pub async fn launch(name: impl Into<String>, settings: Arc<Settings>) -> ShopResult<Self> {
        let name = name.into();
        let driver = browser::launch(&settings.browser).await?;
        Ok(Self::attach(name, driver, settings))
    }

    /// Wrap an already running driver
    #[must_use]
    pub fn attach(
        name: impl Into<String>,
        driver: Arc<dyn BrowserDriver>,
        settings: Arc<Settings>,
    ) -> Self {
        let name = name.into();
        logging::test_start(&name);
        Self {
            name,
            driver,
            settings,
            closed: AtomicBool::new(false),
            started: Instant::now(),
        }
    }

    /// Test name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Driver shared by this test's page objects
    #[must_use]
    pub const fn driver(&self) -> &Arc<dyn BrowserDriver> {
        &self.driver
    }

    /// Run settings
    #[must_use]
    pub const fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    /// Whether `close` already ran
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Quit the browser and log the outcome. Only the first call acts.
    pub async fn close(&self, status: &str) -> ShopResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let outcome = self.driver.close().await;
        logging::test_end(&self.name, status, Some(self.started.elapsed()));
        logging::browser_action("Closed", Some(&self.name));
        outcome.map_err(ShopError::from)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            tracing::warn!(target: "shopcheck::fixture", test = %self.name, "session dropped without close");
        }
    }
}

/// Everything a scenario needs: session, settings and test data
#[derive(Debug)]
pub struct TestContext {
    session: Session,
    data: DataManager,
}

impl TestContext {
    /// Bundle a session with the configured data files
    #[must_use]
    pub fn new(session: Session) -> Self {
        let data = DataManager::new(session.settings().data.clone());
        Self { session, data }
    }

    /// Launch a browser and bundle it
    pub async fn launch(name: impl Into<String>, settings: Arc<Settings>) -> ShopResult<Self> {
        Ok(Self::new(Session::launch(name, settings).await?))
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.session.settings()
    }

    #[must_use]
    pub const fn data(&self) -> &DataManager {
        &self.data
    }

    // ------------------------------------------------------------------
    // Page objects
    // ------------------------------------------------------------------

    #[must_use]
    pub fn home(&self) -> HomePage {
        HomePage::new(&self.session)
    }

    #[must_use]
    pub fn login(&self) -> LoginPage {
        LoginPage::new(&self.session)
    }

    #[must_use]
    pub fn signup(&self) -> SignupPage {
        SignupPage::new(&self.session)
    }

    #[must_use]
    pub fn account_created(&self) -> AccountCreatedPage {
        AccountCreatedPage::new(&self.session)
    }

    #[must_use]
    pub fn products(&self) -> ProductsPage {
        ProductsPage::new(&self.session)
    }

    #[must_use]
    pub fn cart(&self) -> CartPage {
        CartPage::new(&self.session)
    }

    #[must_use]
    pub fn contact_us(&self) -> ContactUsPage {
        ContactUsPage::new(&self.session)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub async fn navigate_to_home(&self) -> ShopResult<HomePage> {
        let page = self.home();
        page.open().await?;
        Ok(page)
    }

    pub async fn navigate_to_products(&self) -> ShopResult<ProductsPage> {
        let page = self.products();
        page.open().await?;
        Ok(page)
    }

    pub async fn navigate_to_cart(&self) -> ShopResult<CartPage> {
        let page = self.cart();
        page.open().await?;
        Ok(page)
    }

    pub async fn navigate_to_contact_us(&self) -> ShopResult<ContactUsPage> {
        let page = self.contact_us();
        page.open().await?;
        Ok(page)
    }

    pub async fn navigate_to_login(&self) -> ShopResult<LoginPage> {
        let page = self.login();
        page.open().await?;
        Ok(page)
    }

    // ------------------------------------------------------------------
    // Flows
    // ------------------------------------------------------------------

    /// Register a freshly generated user; `None` when the confirmation
    /// page does not show
    pub async fn register_new_user(&self) -> ShopResult<Option<TestUser>> {
        let user = self.data.generate_test_user(false)?;
        let login = self.navigate_to_login().await?;
        login.signup(&user.name, &user.email).await?;

        let signup = self.signup();
        if !signup.verify_signup_page_loaded().await? {
            tracing::error!(target: "shopcheck::fixture", email = %user.email, "signup form did not open");
            return Ok(None);
        }
        signup.complete_registration(&user).await?;

        let created = self.account_created();
        if created.verify_account_created_page_loaded().await? {
            logging::step(&format!("Registered user: {}", user.email));
            Ok(Some(user))
        } else {
            tracing::error!(target: "shopcheck::fixture", email = %user.email, "registration not confirmed");
            Ok(None)
        }
    }

    /// Log in; still being on `/login` afterwards means it failed
    pub async fn login_user(&self, email: &str, password: &str) -> ShopResult<bool> {
        let login = self.navigate_to_login().await?;
        login.login(email, password).await?;
        let url = login
            .wait_for_page_redirect(self.settings().explicit_wait)
            .await?;
        Ok(!url.contains(LoginPage::PATH))
    }

    /// Add the `index`-th listed product and dismiss the modal; true when
    /// the modal confirmed the add
    pub async fn add_product_to_cart(&self, index: usize) -> ShopResult<bool> {
        let products = self.navigate_to_products().await?;
        products.add_product_to_cart_by_index(index).await?;
        let added = products.verify_add_to_cart_modal().await?;
        if added {
            products.continue_shopping().await?;
        }
        Ok(added)
    }

    /// Search from the products page; true when results are listed
    pub async fn perform_search(&self, term: &str) -> ShopResult<bool> {
        let products = self.navigate_to_products().await?;
        products.search_and_verify_results(term).await
    }

    /// Submit the contact form; true when the success banner shows
    pub async fn submit_contact_form(&self, message: &ContactMessage) -> ShopResult<bool> {
        let contact = self.navigate_to_contact_us().await?;
        contact.submit_contact_form(message, None).await?;
        contact.verify_success_message().await
    }

    /// Empty the cart so the next test starts clean
    pub async fn cleanup(&self) -> ShopResult<()> {
        let cart = self.navigate_to_cart().await?;
        cart.clear_cart().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Outcomes
    // ------------------------------------------------------------------

    /// Fail the test unless `condition` holds, saving a screenshot and the
    /// page source first
    pub async fn ensure(&self, condition: bool, message: impl Into<String>) -> ShopResult<()> {
        if condition {
            return Ok(());
        }
        let message = message.into();
        let artifacts = self.capture_failure().await?;
        tracing::error!(target: "shopcheck::fixture", test = %self.session.name(), %message, ?artifacts, "assertion failed");
        Err(ShopError::assertion(message))
    }

    /// Stop the test as skipped
    pub fn skip<T>(&self, reason: impl Into<String>) -> ShopResult<T> {
        let reason = reason.into();
        logging::step(&format!("Skipping: {reason}"));
        Err(ShopError::skipped(reason))
    }

    /// Screenshot and page source named after the test
    pub async fn capture_failure(&self) -> ShopResult<Vec<PathBuf>> {
        let base = BasePage::new(&self.session, "/");
        let stem = format!("{}_failure", artifact_stem(self.session.name()));
        let mut saved = Vec::new();
        saved.extend(base.take_screenshot(&stem).await?);
        saved.extend(base.save_page_source(&stem).await?);
        Ok(saved)
    }

    /// Close the session with the test's final status
    pub async fn close(&self, status: &str) -> ShopResult<()> {
        self.session.close(status).await
    }
}

/// File-name-safe form of a test name
#[must_use]
pub fn artifact_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::storefront::Storefront;
    use crate::mock::MockDriver;

    #[test]
    fn test_artifact_stem() {
        assert_eq!(artifact_stem("cart::add item"), "cart__add_item");
        assert_eq!(artifact_stem("test_search-1"), "test_search-1");
    }

    mod session_tests {
        use super::*;

        #[tokio::test]
        async fn test_close_is_idempotent() {
            let driver = Arc::new(MockDriver::new("https://shop.test"));
            let session = Session::attach("close_twice", driver.clone(), Arc::new(Settings::default()));
            assert!(!session.is_closed());
            session.close("passed").await.unwrap();
            session.close("passed").await.unwrap();
            assert!(session.is_closed());
            assert!(driver.is_closed());
        }
    }

    mod context_tests {
        use super::*;

        #[tokio::test]
        async fn test_ensure_saves_artifacts_on_failure() {
            let shop = Storefront::start().await;
            let ctx = shop.context();
            ctx.navigate_to_home().await.unwrap();
            assert!(ctx.ensure(true, "holds").await.is_ok());

            let err = ctx.ensure(false, "cart should not be empty").await.unwrap_err();
            assert!(err.is_assertion());
            let shots = std::fs::read_dir(ctx.settings().screenshots_dir()).unwrap().count();
            let sources = std::fs::read_dir(ctx.settings().page_sources_dir()).unwrap().count();
            assert_eq!((shots, sources), (1, 1));
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_skip() {
            let shop = Storefront::start().await;
            let err = shop.context().skip::<()>("no browser").unwrap_err();
            assert!(err.is_skip());
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_register_then_login() {
            let shop = Storefront::start().await;
            let ctx = shop.context();
            let user = ctx.register_new_user().await.unwrap().unwrap();
            assert!(shop.has_account(&user.email));
            assert!(ctx.login_user(&user.email, &user.password).await.unwrap());
            assert!(!ctx.login_user(&user.email, "not-the-password").await.unwrap());
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_add_search_contact_cleanup() {
            let shop = Storefront::start().await;
            let ctx = shop.context();
            assert!(ctx.add_product_to_cart(0).await.unwrap());
            assert_eq!(shop.cart().len(), 1);
            assert!(ctx.perform_search("top").await.unwrap());
            let message = ctx.data().generate_contact_data();
            assert!(ctx.submit_contact_form(&message).await.unwrap());
            ctx.cleanup().await.unwrap();
            assert!(shop.cart().is_empty());
            shop.finish().await;
        }
    }
}
