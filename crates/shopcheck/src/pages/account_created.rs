//! Confirmation page shown after a successful registration.

use crate::fixture::Session;
use crate::locator::ElementQuery;
use crate::logging;
use crate::page_object::{BasePage, PageObject};
use crate::result::ShopResult;

/// Confirmation shown after registration
#[derive(Debug, Clone)]
pub struct AccountCreatedPage {
    base: BasePage,
}

impl AccountCreatedPage {
    /// Route reached after a successful registration
    pub const PATH: &'static str = "/account_created";

    /// "ACCOUNT CREATED!" heading
    pub const PAGE_TITLE: ElementQuery = ElementQuery::xpath("//h2[@data-qa='account-created']");
    /// Bold text inside the heading
    pub const SUCCESS_MESSAGE: ElementQuery =
        ElementQuery::xpath("//h2[@data-qa='account-created']/b[text()='Account Created!']");
    /// Paragraph starting "Congratulations!"
    pub const CONGRATULATIONS_MESSAGE: ElementQuery = ElementQuery::xpath("//p[contains(text(), 'Congratulations')]");
    /// Leads to the home page with the new session
    pub const CONTINUE_BUTTON: ElementQuery = ElementQuery::xpath("//a[@data-qa='continue-button']");

    /// Confirmation page bound to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, Self::PATH),
        }
    }

    /// Bold success text is visible
    pub async fn verify_account_created_page_loaded(&self) -> ShopResult<bool> {
        logging::step("Verifying account created page loaded");
        self.verify_loaded().await
    }

    /// Heading reads "Account Created!"; the site renders it upper-cased
    pub async fn verify_account_created_title(&self) -> ShopResult<bool> {
        let heading = self.base.ui().read_text(&Self::PAGE_TITLE).await?;
        logging::assertion("Account created title", "ACCOUNT CREATED!", &heading);
        Ok(heading.to_uppercase().contains("ACCOUNT CREATED!"))
    }

    pub async fn verify_success_message(&self) -> ShopResult<bool> {
        logging::step("Verifying account creation success message");
        self.base.verify_element_visible(&Self::SUCCESS_MESSAGE).await
    }

    pub async fn verify_congratulations_message(&self) -> ShopResult<bool> {
        self.base
            .verify_element_visible(&Self::CONGRATULATIONS_MESSAGE)
            .await
    }

    /// Text of the heading
    pub async fn success_message(&self) -> ShopResult<String> {
        self.base.ui().read_text(&Self::SUCCESS_MESSAGE).await
    }

    /// Continue to the home page, logged in
    pub async fn click_continue(&self) -> ShopResult<&Self> {
        logging::step("Clicking continue button");
        self.base.ui().click(&Self::CONTINUE_BUTTON).await?;
        Ok(self)
    }
}

impl PageObject for AccountCreatedPage {
    fn path(&self) -> &'static str {
        Self::PATH
    }

    fn page_name(&self) -> &'static str {
        "Account Created Page"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn signature(&self) -> Vec<ElementQuery> {
        vec![Self::SUCCESS_MESSAGE]
    }
}
