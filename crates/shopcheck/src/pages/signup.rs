//! Account information form (`/signup`), reached from the login page's
//! signup form with name and email prefilled.

use crate::data::TestUser;
use crate::fixture::Session;
use crate::locator::ElementQuery;
use crate::logging;
use crate::page_object::{BasePage, PageObject};
use crate::result::ShopResult;
use std::str::FromStr;

/// Form of address on the account form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Title {
    #[default]
    Mr,
    Mrs,
}

impl FromStr for Title {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mr" => Ok(Self::Mr),
            "mrs" => Ok(Self::Mrs),
            other => Err(format!("unknown title: {other}")),
        }
    }
}

/// "Enter Account Information" form of a new registration
#[derive(Debug, Clone)]
pub struct SignupPage {
    base: BasePage,
}

impl SignupPage {
    /// Route of the account details form reached from the signup form
    pub const PATH: &'static str = "/signup";

    /// "Enter Account Information" heading
    pub const ACCOUNT_INFO_TITLE: ElementQuery =
        ElementQuery::xpath("//h2[@class='title text-center']/b[text()='Enter Account Information']");
    /// "Address Information" heading, lower on the same form
    pub const ADDRESS_INFO_TITLE: ElementQuery =
        ElementQuery::xpath("//h2[@class='title text-center']/b[text()='Address Information']");

    /// "Mr." radio
    pub const TITLE_MR: ElementQuery = ElementQuery::id("id_gender1");
    /// "Mrs." radio
    pub const TITLE_MRS: ElementQuery = ElementQuery::id("id_gender2");
    /// Name, prefilled from the signup form
    pub const NAME_INPUT: ElementQuery = ElementQuery::id("name");
    /// Email, prefilled from the signup form
    pub const EMAIL_INPUT: ElementQuery = ElementQuery::id("email");
    /// Account password
    pub const PASSWORD_INPUT: ElementQuery = ElementQuery::id("password");
    /// Day of birth; option values are `1`..`31`
    pub const BIRTH_DAY_SELECT: ElementQuery = ElementQuery::id("days");
    /// Month of birth; options show English month names
    pub const BIRTH_MONTH_SELECT: ElementQuery = ElementQuery::id("months");
    /// Year of birth
    pub const BIRTH_YEAR_SELECT: ElementQuery = ElementQuery::id("years");
    /// "Sign up for our newsletter!"
    pub const NEWSLETTER_CHECKBOX: ElementQuery = ElementQuery::id("newsletter");
    /// "Receive special offers from our partners!"
    pub const SPECIAL_OFFERS_CHECKBOX: ElementQuery = ElementQuery::id("optin");

    /// Address first name
    pub const FIRST_NAME_INPUT: ElementQuery = ElementQuery::id("first_name");
    /// Address last name
    pub const LAST_NAME_INPUT: ElementQuery = ElementQuery::id("last_name");
    /// Optional company line
    pub const COMPANY_INPUT: ElementQuery = ElementQuery::id("company");
    /// Street address, required
    pub const ADDRESS1_INPUT: ElementQuery = ElementQuery::id("address1");
    /// Second address line, optional
    pub const ADDRESS2_INPUT: ElementQuery = ElementQuery::id("address2");
    /// Country dropdown
    pub const COUNTRY_SELECT: ElementQuery = ElementQuery::id("country");
    /// Each `<option>` of the country dropdown
    pub const COUNTRY_OPTIONS: ElementQuery = ElementQuery::xpath("//select[@id='country']/option");
    /// State, free text
    pub const STATE_INPUT: ElementQuery = ElementQuery::id("state");
    /// City
    pub const CITY_INPUT: ElementQuery = ElementQuery::id("city");
    /// Zipcode, free text
    pub const ZIPCODE_INPUT: ElementQuery = ElementQuery::id("zipcode");
    /// Mobile number
    pub const MOBILE_NUMBER_INPUT: ElementQuery = ElementQuery::id("mobile_number");

    /// Submits the form. On success the site moves to `/account_created`.
    pub const CREATE_ACCOUNT_BUTTON: ElementQuery = ElementQuery::xpath("//button[@data-qa='create-account']");
    /// Red banner of a rejected submission
    pub const ERROR_MESSAGE: ElementQuery = ElementQuery::class_name("alert-danger");

    /// Account details page bound to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, Self::PATH),
        }
    }

    /// Account information heading is visible
    pub async fn verify_signup_page_loaded(&self) -> ShopResult<bool> {
        logging::step("Verifying signup page loaded");
        self.verify_loaded().await
    }

    /// Address heading is visible
    pub async fn verify_address_info_section(&self) -> ShopResult<bool> {
        self.base.verify_element_visible(&Self::ADDRESS_INFO_TITLE).await
    }

    /// Tick the Mr. or Mrs. radio
    pub async fn select_title(&self, title: Title) -> ShopResult<&Self> {
        logging::step(&format!("Selecting title: {title:?}"));
        let radio = match title {
            Title::Mr => &Self::TITLE_MR,
            Title::Mrs => &Self::TITLE_MRS,
        };
        self.base.ui().click(radio).await?;
        Ok(self)
    }

    pub async fn enter_password(&self, password: &str) -> ShopResult<&Self> {
        self.base.ui().type_text(&Self::PASSWORD_INPUT, password, true).await?;
        Ok(self)
    }

    /// Day and year by value, month by its visible name
    pub async fn select_date_of_birth(&self, day: &str, month: &str, year: &str) -> ShopResult<&Self> {
        let ui = self.base.ui();
        ui.select_option_by_value(&Self::BIRTH_DAY_SELECT, day).await?;
        ui.select_option_by_text(&Self::BIRTH_MONTH_SELECT, month).await?;
        ui.select_option_by_value(&Self::BIRTH_YEAR_SELECT, year).await?;
        Ok(self)
    }

    /// Tick the newsletter box
    pub async fn check_newsletter(&self) -> ShopResult<&Self> {
        logging::step("Checking newsletter subscription");
        self.base.ui().click(&Self::NEWSLETTER_CHECKBOX).await?;
        Ok(self)
    }

    /// Tick the partner offers box
    pub async fn check_special_offers(&self) -> ShopResult<&Self> {
        logging::step("Checking special offers");
        self.base.ui().click(&Self::SPECIAL_OFFERS_CHECKBOX).await?;
        Ok(self)
    }

    pub async fn enter_first_name(&self, value: &str) -> ShopResult<&Self> {
        self.field(&Self::FIRST_NAME_INPUT, value).await
    }

    pub async fn enter_last_name(&self, value: &str) -> ShopResult<&Self> {
        self.field(&Self::LAST_NAME_INPUT, value).await
    }

    pub async fn enter_company(&self, value: &str) -> ShopResult<&Self> {
        self.field(&Self::COMPANY_INPUT, value).await
    }

    /// Both address lines
    pub async fn enter_address(&self, line1: &str, line2: &str) -> ShopResult<&Self> {
        self.field(&Self::ADDRESS1_INPUT, line1).await?;
        self.field(&Self::ADDRESS2_INPUT, line2).await
    }

    /// Pick a country by its visible name
    pub async fn select_country(&self, country: &str) -> ShopResult<&Self> {
        self.base
            .ui()
            .select_option_by_text(&Self::COUNTRY_SELECT, country)
            .await?;
        Ok(self)
    }

    pub async fn enter_state(&self, value: &str) -> ShopResult<&Self> {
        self.field(&Self::STATE_INPUT, value).await
    }

    pub async fn enter_city(&self, value: &str) -> ShopResult<&Self> {
        self.field(&Self::CITY_INPUT, value).await
    }

    pub async fn enter_zipcode(&self, value: &str) -> ShopResult<&Self> {
        self.field(&Self::ZIPCODE_INPUT, value).await
    }

    pub async fn enter_mobile_number(&self, value: &str) -> ShopResult<&Self> {
        self.field(&Self::MOBILE_NUMBER_INPUT, value).await
    }

    async fn field(&self, query: &ElementQuery, value: &str) -> ShopResult<&Self> {
        if !self.base.ui().type_text(query, value, true).await? {
            tracing::error!(target: "shopcheck::pages", query = %query, "failed to fill field");
        }
        Ok(self)
    }

    /// Password and date of birth
    pub async fn fill_account_information(&self, user: &TestUser) -> ShopResult<&Self> {
        logging::step("Filling account information");
        self.enter_password(&user.password).await?;
        self.select_date_of_birth(&user.birth_day, &user.birth_month, &user.birth_year)
            .await
    }

    /// Name, company, address, country and contact number
    pub async fn fill_address_information(&self, user: &TestUser) -> ShopResult<&Self> {
        logging::step("Filling address information");
        self.enter_first_name(&user.first_name).await?;
        self.enter_last_name(&user.last_name).await?;
        self.enter_company(&user.company).await?;
        self.enter_address(&user.address, &user.address2).await?;
        self.select_country(&user.country).await?;
        self.enter_state(&user.state).await?;
        self.enter_city(&user.city).await?;
        self.enter_zipcode(&user.zipcode).await?;
        self.enter_mobile_number(&user.mobile_number).await
    }

    /// Scroll to the create button and click it
    pub async fn click_create_account(&self) -> ShopResult<&Self> {
        logging::step("Clicking create account button");
        let ui = self.base.ui();
        ui.scroll_into_view(&Self::CREATE_ACCOUNT_BUTTON).await?;
        ui.click(&Self::CREATE_ACCOUNT_BUTTON).await?;
        Ok(self)
    }

    /// Fill every section and submit
    pub async fn complete_registration(&self, user: &TestUser) -> ShopResult<&Self> {
        logging::step(&format!("Completing registration for user: {}", user.display_name()));
        self.select_title(user.title.parse().unwrap_or_default()).await?;
        self.fill_account_information(user).await?;
        self.check_newsletter().await?;
        self.check_special_offers().await?;
        self.fill_address_information(user).await?;
        self.click_create_account().await
    }

    /// Name and email carried over from the signup form
    pub async fn verify_name_and_email_prefilled(&self, name: &str, email: &str) -> ShopResult<bool> {
        let ui = self.base.ui();
        let actual_name = ui.read_attribute(&Self::NAME_INPUT, "value").await?;
        let actual_email = ui.read_attribute(&Self::EMAIL_INPUT, "value").await?;
        logging::assertion("Name prefilled", name, &actual_name);
        logging::assertion("Email prefilled", email, &actual_email);
        Ok(actual_name == name && actual_email == email)
    }

    /// Selected country
    pub async fn selected_country(&self) -> ShopResult<String> {
        self.base.ui().read_attribute(&Self::COUNTRY_SELECT, "value").await
    }

    /// Every country offered in the dropdown
    pub async fn available_countries(&self) -> ShopResult<Vec<String>> {
        let ui = self.base.ui();
        ui.read_all_attributes(&Self::COUNTRY_OPTIONS, "textContent", None)
            .await
            .map(|names| names.into_iter().map(|n| n.trim().to_string()).collect())
    }

    /// Error banner contains `expected`
    pub async fn verify_error_message(&self, expected: &str) -> ShopResult<bool> {
        self.base.verify_element_text(&Self::ERROR_MESSAGE, expected).await
    }

    /// Every required field is visible
    pub async fn verify_all_required_fields_visible(&self) -> ShopResult<bool> {
        for query in [
            &Self::PASSWORD_INPUT,
            &Self::FIRST_NAME_INPUT,
            &Self::LAST_NAME_INPUT,
            &Self::ADDRESS1_INPUT,
            &Self::COUNTRY_SELECT,
            &Self::STATE_INPUT,
            &Self::CITY_INPUT,
            &Self::ZIPCODE_INPUT,
            &Self::MOBILE_NUMBER_INPUT,
        ] {
            if !self.base.verify_element_visible(query).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl PageObject for SignupPage {
    fn path(&self) -> &'static str {
        Self::PATH
    }

    fn page_name(&self) -> &'static str {
        "Signup Page"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn signature(&self) -> Vec<ElementQuery> {
        vec![Self::ACCOUNT_INFO_TITLE]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::data::DataManager;
    use crate::mock::storefront::Storefront;
    use crate::pages::{AccountCreatedPage, LoginPage};

    #[test]
    fn test_title_parse() {
        assert_eq!("MRS".parse::<Title>().unwrap(), Title::Mrs);
        assert_eq!(" mr ".parse::<Title>().unwrap(), Title::Mr);
        assert!("dr".parse::<Title>().is_err());
    }

    #[tokio::test]
    async fn test_registration_reaches_account_created() {
        let shop = Storefront::start().await;
        let user = DataManager::default().generate_test_user(false).unwrap();

        let login = LoginPage::new(shop.session());
        login.open().await.unwrap();
        login.signup(&user.name, &user.email).await.unwrap();

        let signup = SignupPage::new(shop.session());
        assert!(signup.verify_signup_page_loaded().await.unwrap());
        assert!(signup
            .verify_name_and_email_prefilled(&user.name, &user.email)
            .await
            .unwrap());
        assert!(signup.verify_all_required_fields_visible().await.unwrap());
        signup.complete_registration(&user).await.unwrap();

        let created = AccountCreatedPage::new(shop.session());
        assert!(created.verify_account_created_page_loaded().await.unwrap());
        assert!(created.verify_account_created_title().await.unwrap());
        assert!(shop.has_account(&user.email));
        shop.finish().await;
    }

    #[tokio::test]
    async fn test_country_dropdown() {
        let shop = Storefront::start().await;
        let login = LoginPage::new(shop.session());
        login.open().await.unwrap();
        login.signup("Country Check", "country@example.com").await.unwrap();

        let signup = SignupPage::new(shop.session());
        assert_eq!(signup.selected_country().await.unwrap(), "India");
        let countries = signup.available_countries().await.unwrap();
        assert!(countries.contains(&"Canada".to_string()));
        signup.select_country("Canada").await.unwrap();
        assert_eq!(signup.selected_country().await.unwrap(), "Canada");
        shop.finish().await;
    }
}
