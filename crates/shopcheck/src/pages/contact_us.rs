//! Contact form (`/contact_us`): fields, attachment, the confirm dialog on
//! submit and the success banner.

use crate::data::ContactMessage;
use crate::fixture::Session;
use crate::locator::ElementQuery;
use crate::logging;
use crate::page_object::{BasePage, PageObject};
use crate::result::ShopResult;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Contact form (`/contact_us`)
#[derive(Debug, Clone)]
pub struct ContactUsPage {
    base: BasePage,
}

impl ContactUsPage {
    /// Route of the contact form
    pub const PATH: &'static str = "/contact_us";

    /// "Get In Touch" heading
    pub const GET_IN_TOUCH_TITLE: ElementQuery = ElementQuery::xpath("//h2[text()='Get In Touch']");
    /// Sender name, required
    pub const NAME_INPUT: ElementQuery = ElementQuery::xpath("//input[@data-qa='name']");
    /// Sender email, required and type-checked by the browser
    pub const EMAIL_INPUT: ElementQuery = ElementQuery::xpath("//input[@data-qa='email']");
    /// Message subject
    pub const SUBJECT_INPUT: ElementQuery = ElementQuery::xpath("//input[@data-qa='subject']");
    /// Message body
    pub const MESSAGE_TEXTAREA: ElementQuery = ElementQuery::xpath("//textarea[@data-qa='message']");
    /// Optional attachment
    pub const UPLOAD_FILE_INPUT: ElementQuery = ElementQuery::xpath("//input[@name='upload_file']");
    /// Submits the form. The site first opens a "Press OK to proceed!"
    /// confirm; see [`ContactUsPage::handle_alert`].
    pub const SUBMIT_BUTTON: ElementQuery = ElementQuery::xpath("//input[@data-qa='submit-button']");

    /// Green banner after an accepted submission
    pub const SUCCESS_MESSAGE: ElementQuery = ElementQuery::xpath("//div[contains(@class, 'alert-success')]");
    /// Text of the success banner inside the form area
    pub const SUCCESS_TEXT: ElementQuery = ElementQuery::xpath(
        "//div[contains(text(), 'Success! Your details have been submitted successfully.')]",
    );
    /// "Home" button shown with the success banner
    pub const HOME_BUTTON: ElementQuery = ElementQuery::xpath("//a[contains(@class, 'btn') and text()=' Home']");
    /// Address block next to the form
    pub const CONTACT_INFO: ElementQuery = ElementQuery::xpath("//div[@class='contact-info']");

    /// The success banner follows a round trip with an upload
    const SUCCESS_TIMEOUT: Duration = Duration::from_secs(10);

    /// Contact page bound to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, Self::PATH),
        }
    }

    /// Signature elements are visible
    pub async fn verify_contact_us_page_loaded(&self) -> ShopResult<bool> {
        logging::step("Verifying contact us page loaded");
        self.verify_loaded().await
    }

    /// "Get In Touch" shows
    pub async fn verify_get_in_touch_title(&self) -> ShopResult<bool> {
        self.base.verify_element_visible(&Self::GET_IN_TOUCH_TITLE).await
    }

    pub async fn enter_name(&self, name: &str) -> ShopResult<&Self> {
        self.field(&Self::NAME_INPUT, name).await
    }

    pub async fn enter_email(&self, email: &str) -> ShopResult<&Self> {
        self.field(&Self::EMAIL_INPUT, email).await
    }

    pub async fn enter_subject(&self, subject: &str) -> ShopResult<&Self> {
        self.field(&Self::SUBJECT_INPUT, subject).await
    }

    pub async fn enter_message(&self, message: &str) -> ShopResult<&Self> {
        self.field(&Self::MESSAGE_TEXTAREA, message).await
    }

    async fn field(&self, query: &ElementQuery, value: &str) -> ShopResult<&Self> {
        if !self.base.ui().type_text(query, value, true).await? {
            tracing::error!(target: "shopcheck::pages", query = %query, "failed to fill contact field");
        }
        Ok(self)
    }

    /// Name, email, subject and message from `message`
    pub async fn fill_contact_form(&self, message: &ContactMessage) -> ShopResult<&Self> {
        logging::step("Filling contact form");
        self.enter_name(&message.name).await?;
        self.enter_email(&message.email).await?;
        self.enter_subject(&message.subject).await?;
        self.enter_message(&message.message).await
    }

    /// Attach a file; a missing file is logged and skipped
    pub async fn upload_file(&self, path: &Path) -> ShopResult<bool> {
        if !path.exists() {
            tracing::error!(target: "shopcheck::pages", path = %path.display(), "upload file not found");
            return Ok(false);
        }
        logging::step(&format!("Uploading file: {}", path.display()));
        self.base.ui().upload_file(&Self::UPLOAD_FILE_INPUT, path).await
    }

    /// Scroll to submit and click it; the confirm dialog is left open
    pub async fn click_submit_button(&self) -> ShopResult<&Self> {
        logging::step("Clicking submit button");
        let ui = self.base.ui();
        ui.scroll_into_view(&Self::SUBMIT_BUTTON).await?;
        ui.click(&Self::SUBMIT_BUTTON).await?;
        Ok(self)
    }

    /// Accept the "Press OK to proceed!" confirm, if one is open
    pub async fn handle_alert(&self) -> ShopResult<bool> {
        let accepted = self.base.ui().accept_dialog().await?;
        if accepted {
            logging::step("Alert accepted");
        } else {
            tracing::debug!(target: "shopcheck::pages", "no alert to accept");
        }
        Ok(accepted)
    }

    /// Fill, optionally attach, submit and confirm
    pub async fn submit_contact_form(
        &self,
        message: &ContactMessage,
        attachment: Option<&Path>,
    ) -> ShopResult<&Self> {
        logging::step("Submitting contact form");
        self.fill_contact_form(message).await?;
        if let Some(path) = attachment {
            self.upload_file(path).await?;
        }
        self.click_submit_button().await?;
        self.handle_alert().await?;
        Ok(self)
    }

    /// Success banner shows within ten seconds
    pub async fn verify_success_message(&self) -> ShopResult<bool> {
        logging::step("Verifying success message");
        self.base
            .is_visible_within(&Self::SUCCESS_MESSAGE, Self::SUCCESS_TIMEOUT)
            .await
    }

    /// Text of the success banner
    pub async fn success_message(&self) -> ShopResult<String> {
        self.base.ui().read_text(&Self::SUCCESS_MESSAGE).await
    }

    /// Back to the home page from the success state
    pub async fn click_home_button(&self) -> ShopResult<&Self> {
        logging::step("Clicking home button");
        self.base.ui().click(&Self::HOME_BUTTON).await?;
        Ok(self)
    }

    /// The browser's `validationMessage` for a field, `""` when valid
    pub async fn verify_form_validation(&self, field: &ElementQuery) -> ShopResult<String> {
        let message = self
            .base
            .ui()
            .read_attribute(field, "validationMessage")
            .await?;
        logging::step(&format!("Validation message for {field}: '{message}'"));
        Ok(message)
    }

    /// Current value of each field, keyed `name`, `email`, `subject`, `message`
    pub async fn form_field_values(&self) -> ShopResult<BTreeMap<String, String>> {
        let ui = self.base.ui();
        let mut values = BTreeMap::new();
        for (key, query) in Self::fields() {
            values.insert(key.to_string(), ui.read_attribute(&query, "value").await?);
        }
        Ok(values)
    }

    /// Clear name, email, subject and message
    pub async fn clear_form(&self) -> ShopResult<&Self> {
        logging::step("Clearing contact form");
        for (_, query) in Self::fields() {
            self.base.ui().type_text(&query, "", true).await?;
        }
        Ok(self)
    }

    /// Address block is visible
    pub async fn verify_contact_info_visible(&self) -> ShopResult<bool> {
        self.base.verify_element_visible(&Self::CONTACT_INFO).await
    }

    /// Every input of the form is visible
    pub async fn verify_form_fields_visible(&self) -> ShopResult<bool> {
        for (_, query) in Self::fields() {
            if !self.base.verify_element_visible(&query).await? {
                return Ok(false);
            }
        }
        self.base.verify_element_visible(&Self::SUBMIT_BUTTON).await
    }

    const fn fields() -> [(&'static str, ElementQuery); 4] {
        [
            ("name", Self::NAME_INPUT),
            ("email", Self::EMAIL_INPUT),
            ("subject", Self::SUBJECT_INPUT),
            ("message", Self::MESSAGE_TEXTAREA),
        ]
    }
}

impl PageObject for ContactUsPage {
    fn path(&self) -> &'static str {
        Self::PATH
    }

    fn page_name(&self) -> &'static str {
        "Contact Us Page"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn signature(&self) -> Vec<ElementQuery> {
        vec![Self::GET_IN_TOUCH_TITLE]
    }
}
