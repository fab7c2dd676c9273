//! Login / signup entry page (`/login`).

use crate::fixture::Session;
use crate::locator::ElementQuery;
use crate::logging;
use crate::page_object::{BasePage, PageObject};
use crate::result::ShopResult;
use std::time::Duration;

/// Two side-by-side forms: existing-account login and new-user signup
/// Login and new-user signup forms, side by side
#[derive(Debug, Clone)]
pub struct LoginPage {
    base: BasePage,
}

impl LoginPage {
    /// Route serving both forms
    pub const PATH: &'static str = "/login";

    // Signup form
    /// "New User Signup!" heading
    pub const NEW_USER_SIGNUP: ElementQuery = ElementQuery::xpath("//h2[text()='New User Signup!']");
    /// Name field of the signup form
    pub const SIGNUP_NAME_INPUT: ElementQuery = ElementQuery::xpath("//input[@data-qa='signup-name']");
    /// Email field of the signup form
    pub const SIGNUP_EMAIL_INPUT: ElementQuery = ElementQuery::xpath("//input[@data-qa='signup-email']");
    /// Submits the signup form and, for a fresh email, moves to `/signup`
    pub const SIGNUP_BUTTON: ElementQuery = ElementQuery::xpath("//button[@data-qa='signup-button']");

    // Login form
    /// "Login to your account" heading
    pub const LOGIN_TO_ACCOUNT: ElementQuery = ElementQuery::xpath("//h2[text()='Login to your account']");
    /// Email field of the login form
    pub const LOGIN_EMAIL_INPUT: ElementQuery = ElementQuery::xpath("//input[@data-qa='login-email']");
    /// Password field of the login form
    pub const LOGIN_PASSWORD_INPUT: ElementQuery = ElementQuery::xpath("//input[@data-qa='login-password']");
    /// Submits the login form
    pub const LOGIN_BUTTON: ElementQuery = ElementQuery::xpath("//button[@data-qa='login-button']");

    // Messages
    /// Any red form error under either form
    pub const ERROR_MESSAGE: ElementQuery = ElementQuery::xpath("//p[contains(@style, 'color: red')]");
    /// Signup error for a registered email
    pub const EMAIL_ALREADY_EXISTS_ERROR: ElementQuery = ElementQuery::xpath("//p[text()='Email Address already exist!']");
    /// Login error for bad credentials
    pub const INCORRECT_LOGIN_ERROR: ElementQuery = ElementQuery::xpath("//p[text()='Your email or password is incorrect!']");

    /// Login page bound to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, Self::PATH),
        }
    }

    /// Both form headings are visible
    pub async fn verify_login_page_loaded(&self) -> ShopResult<bool> {
        logging::step("Verifying login page loaded");
        self.verify_loaded().await
    }

    pub async fn enter_signup_name(&self, name: &str) -> ShopResult<&Self> {
        if !self.base.ui().type_text(&Self::SIGNUP_NAME_INPUT, name, true).await? {
            tracing::error!(target: "shopcheck::pages", "failed to enter signup name");
        }
        Ok(self)
    }

    pub async fn enter_signup_email(&self, email: &str) -> ShopResult<&Self> {
        if !self.base.ui().type_text(&Self::SIGNUP_EMAIL_INPUT, email, true).await? {
            tracing::error!(target: "shopcheck::pages", "failed to enter signup email");
        }
        Ok(self)
    }

    /// Submit the signup form as filled
    pub async fn click_signup_button(&self) -> ShopResult<&Self> {
        logging::step("Clicking signup button");
        self.base.ui().click(&Self::SIGNUP_BUTTON).await?;
        Ok(self)
    }

    /// Fill the signup form and submit it
    pub async fn signup(&self, name: &str, email: &str) -> ShopResult<&Self> {
        logging::step(&format!("Signing up new user: {name} <{email}>"));
        self.enter_signup_name(name).await?;
        self.enter_signup_email(email).await?;
        self.click_signup_button().await
    }

    pub async fn enter_login_email(&self, email: &str) -> ShopResult<&Self> {
        if !self.base.ui().type_text(&Self::LOGIN_EMAIL_INPUT, email, true).await? {
            tracing::error!(target: "shopcheck::pages", "failed to enter login email");
        }
        Ok(self)
    }

    pub async fn enter_login_password(&self, password: &str) -> ShopResult<&Self> {
        if !self.base.ui().type_text(&Self::LOGIN_PASSWORD_INPUT, password, true).await? {
            tracing::error!(target: "shopcheck::pages", "failed to enter login password");
        }
        Ok(self)
    }

    /// Submit the login form as filled
    pub async fn click_login_button(&self) -> ShopResult<&Self> {
        logging::step("Clicking login button");
        self.base.ui().click(&Self::LOGIN_BUTTON).await?;
        Ok(self)
    }

    /// Fill the login form and submit it
    pub async fn login(&self, email: &str, password: &str) -> ShopResult<&Self> {
        logging::step(&format!("Logging in user: {email}"));
        self.enter_login_email(email).await?;
        self.enter_login_password(password).await?;
        self.click_login_button().await
    }

    /// Heading, both fields and the button of the signup form
    pub async fn verify_signup_form_visible(&self) -> ShopResult<bool> {
        logging::step("Verifying signup form fields");
        self.all_visible(&[
            Self::NEW_USER_SIGNUP,
            Self::SIGNUP_NAME_INPUT,
            Self::SIGNUP_EMAIL_INPUT,
            Self::SIGNUP_BUTTON,
        ])
        .await
    }

    /// Heading, both fields and the button of the login form
    pub async fn verify_login_form_visible(&self) -> ShopResult<bool> {
        logging::step("Verifying login form fields");
        self.all_visible(&[
            Self::LOGIN_TO_ACCOUNT,
            Self::LOGIN_EMAIL_INPUT,
            Self::LOGIN_PASSWORD_INPUT,
            Self::LOGIN_BUTTON,
        ])
        .await
    }

    async fn all_visible(&self, queries: &[ElementQuery]) -> ShopResult<bool> {
        for query in queries {
            if !self.base.verify_element_visible(query).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Text of the red form error, `""` when none shows
    pub async fn error_message(&self) -> ShopResult<String> {
        logging::step("Getting error message");
        self.base.ui().read_text(&Self::ERROR_MESSAGE).await
    }

    /// "Email Address already exist!" shows
    pub async fn verify_email_exists_error(&self) -> ShopResult<bool> {
        logging::step("Verifying email already exists error");
        self.base.verify_element_visible(&Self::EMAIL_ALREADY_EXISTS_ERROR).await
    }

    /// "Your email or password is incorrect!" shows
    pub async fn verify_login_error(&self) -> ShopResult<bool> {
        logging::step("Verifying incorrect login error");
        self.base.verify_element_visible(&Self::INCORRECT_LOGIN_ERROR).await
    }

    /// Empty both login fields
    pub async fn clear_login_form(&self) -> ShopResult<&Self> {
        logging::step("Clearing login form");
        self.base.ui().type_text(&Self::LOGIN_EMAIL_INPUT, "", true).await?;
        self.base.ui().type_text(&Self::LOGIN_PASSWORD_INPUT, "", true).await?;
        Ok(self)
    }

    /// Empty both signup fields
    pub async fn clear_signup_form(&self) -> ShopResult<&Self> {
        logging::step("Clearing signup form");
        self.base.ui().type_text(&Self::SIGNUP_NAME_INPUT, "", true).await?;
        self.base.ui().type_text(&Self::SIGNUP_EMAIL_INPUT, "", true).await?;
        Ok(self)
    }

    /// What the login email field holds
    pub async fn login_email_value(&self) -> ShopResult<String> {
        self.base.ui().read_attribute(&Self::LOGIN_EMAIL_INPUT, "value").await
    }

    /// What the signup name field holds
    pub async fn signup_name_value(&self) -> ShopResult<String> {
        self.base.ui().read_attribute(&Self::SIGNUP_NAME_INPUT, "value").await
    }

    /// Poll the URL every 500 ms until it changes; returns the URL the page
    /// ended on, unchanged when no redirect happened within `timeout`
    pub async fn wait_for_page_redirect(&self, timeout: Duration) -> ShopResult<String> {
        let start = self.base.current_url().await?;
        match self
            .base
            .ui()
            .waiter()
            .wait_for_url_change(&start, Some(timeout))
            .await?
        {
            Some(url) => {
                logging::step(&format!("Page redirected to: {url}"));
                Ok(url)
            }
            None => {
                tracing::warn!(target: "shopcheck::pages", timeout_s = timeout.as_secs_f64(), "no page redirect detected");
                Ok(start)
            }
        }
    }
}

impl PageObject for LoginPage {
    fn path(&self) -> &'static str {
        Self::PATH
    }

    fn page_name(&self) -> &'static str {
        "Login Page"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn signature(&self) -> Vec<ElementQuery> {
        vec![Self::NEW_USER_SIGNUP, Self::LOGIN_TO_ACCOUNT]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::storefront::Storefront;

    mod form_tests {
        use super::*;

        #[tokio::test]
        async fn test_forms_visible() {
            let shop = Storefront::start().await;
            let login = LoginPage::new(shop.session());
            login.open().await.unwrap();
            assert!(login.verify_login_page_loaded().await.unwrap());
            assert!(login.verify_signup_form_visible().await.unwrap());
            assert!(login.verify_login_form_visible().await.unwrap());
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_clear_login_form() {
            let shop = Storefront::start().await;
            let login = LoginPage::new(shop.session());
            login.open().await.unwrap();
            login.enter_login_email("someone@example.com").await.unwrap();
            assert_eq!(login.login_email_value().await.unwrap(), "someone@example.com");
            login.clear_login_form().await.unwrap();
            assert_eq!(login.login_email_value().await.unwrap(), "");
            shop.finish().await;
        }
    }

    mod login_tests {
        use super::*;

        #[tokio::test]
        async fn test_wrong_credentials_show_error() {
            let shop = Storefront::start().await;
            let login = LoginPage::new(shop.session());
            login.open().await.unwrap();
            login.login("nobody@example.com", "wrong").await.unwrap();
            assert!(login.verify_login_error().await.unwrap());
            assert_eq!(
                login.error_message().await.unwrap(),
                "Your email or password is incorrect!"
            );
            assert!(shop.url().contains("/login"));
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_known_account_redirects_home() {
            let shop = Storefront::start().await;
            shop.register_account("Test User", "testuser@example.com", "Test123456");
            let login = LoginPage::new(shop.session());
            login.open().await.unwrap();
            login.login("testuser@example.com", "Test123456").await.unwrap();
            let url = login.wait_for_page_redirect(Duration::from_secs(2)).await.unwrap();
            assert!(!url.contains("/login"));
            shop.finish().await;
        }
    }

    mod signup_tests {
        use super::*;

        #[tokio::test]
        async fn test_existing_email_is_rejected() {
            let shop = Storefront::start().await;
            shop.register_account("Test User", "taken@example.com", "Test123456");
            let login = LoginPage::new(shop.session());
            login.open().await.unwrap();
            login.signup("Someone", "taken@example.com").await.unwrap();
            assert!(login.verify_email_exists_error().await.unwrap());
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_fresh_email_moves_to_signup() {
            let shop = Storefront::start().await;
            let login = LoginPage::new(shop.session());
            login.open().await.unwrap();
            login.signup("Fresh User", "fresh@example.com").await.unwrap();
            assert!(shop.url().ends_with("/signup"));
            shop.finish().await;
        }
    }
}
