//! Home page (`/`): navigation bar, category and brand panels, featured
//! products and the newsletter footer.

use crate::fixture::Session;
use crate::locator::{ElementQuery, Strategy};
use crate::logging;
use crate::page_object::{BasePage, PageObject};
use crate::result::ShopResult;
use std::collections::BTreeMap;
use std::time::Duration;

/// Storefront landing page
#[derive(Debug, Clone)]
pub struct HomePage {
    base: BasePage,
}

impl HomePage {
    /// Route of the landing page
    pub const PATH: &'static str = "/";

    // Header
    /// Site logo in the header; part of the page signature
    pub const LOGO: ElementQuery = ElementQuery::xpath("//img[@alt='Website for automation practice']");
    /// House icon of the "Home" nav entry
    pub const HOME_LINK: ElementQuery = ElementQuery::xpath("//a[contains(@href, '/')]//i[@class='fa fa-home']");
    /// "Products" nav entry
    pub const PRODUCTS_LINK: ElementQuery = ElementQuery::xpath("//a[@href='/products']");
    /// "Cart" nav entry
    pub const CART_LINK: ElementQuery = ElementQuery::xpath("//a[@href='/view_cart']");
    /// "Signup / Login" nav entry, replaced by "Logout" once logged in
    pub const SIGNUP_LOGIN_LINK: ElementQuery = ElementQuery::xpath("//a[@href='/login']");
    /// "Test Cases" nav entry
    pub const TEST_CASES_LINK: ElementQuery = ElementQuery::xpath("//a[@href='/test_cases']");
    /// "Contact us" nav entry
    pub const CONTACT_US_LINK: ElementQuery = ElementQuery::xpath("//a[@href='/contact_us']");
    /// "Logged in as <name>" banner, present only with a session
    pub const LOGGED_IN_AS: ElementQuery = ElementQuery::xpath("//a[contains(text(), 'Logged in as')]");
    /// "Logout" nav entry
    pub const LOGOUT_LINK: ElementQuery = ElementQuery::xpath("//a[@href='/logout']");

    // Category panel
    /// Heading of the left category panel
    pub const CATEGORY_TITLE: ElementQuery = ElementQuery::xpath("//h2[text()='Category']");
    /// Collapsible Women group. The sub-links below are hidden until it
    /// is expanded.
    pub const WOMEN_CATEGORY: ElementQuery = ElementQuery::xpath("//a[@href='#Women']");
    /// Collapsible Men group
    pub const MEN_CATEGORY: ElementQuery = ElementQuery::xpath("//a[@href='#Men']");
    /// Collapsible Kids group
    pub const KIDS_CATEGORY: ElementQuery = ElementQuery::xpath("//a[@href='#Kids']");
    /// Women > Dress (`category_products/1`)
    pub const WOMEN_DRESS: ElementQuery = ElementQuery::xpath("//a[@href='/category_products/1']");
    /// Women > Tops (`category_products/2`)
    pub const WOMEN_TOPS: ElementQuery = ElementQuery::xpath("//a[@href='/category_products/2']");
    /// Men > Tshirts (`category_products/3`)
    pub const MEN_TSHIRTS: ElementQuery = ElementQuery::xpath("//a[@href='/category_products/3']");

    // Brands panel
    /// Heading of the brands panel; see [`HomePage::brand_link`]
    pub const BRANDS_TITLE: ElementQuery = ElementQuery::xpath("//h2[text()='Brands']");

    // Featured items
    /// "Features Items" heading; part of the page signature
    pub const FEATURES_ITEMS_TITLE: ElementQuery = ElementQuery::xpath("//h2[@class='title text-center']");
    /// One card per featured product
    pub const PRODUCT_ITEMS: ElementQuery = ElementQuery::class_name("productinfo");
    /// Name line of each featured card
    pub const PRODUCT_NAMES: ElementQuery = ElementQuery::xpath("//div[@class='productinfo text-center']//p");
    /// Displayed price of each card, e.g. `Rs. 500`
    pub const PRODUCT_PRICES: ElementQuery = ElementQuery::xpath("//div[@class='productinfo text-center']//h2");
    /// "Add to cart" on the card face. Clicking opens the added-to-cart modal.
    pub const ADD_TO_CART_BUTTONS: ElementQuery =
        ElementQuery::xpath("//div[@class='productinfo text-center']//a[contains(@class, 'add-to-cart')]");
    /// "View Product" under each card
    pub const VIEW_PRODUCT_LINKS: ElementQuery = ElementQuery::xpath("//a[contains(text(), 'View Product')]");
    /// Heading of the recommended carousel near the footer
    pub const RECOMMENDED_ITEMS_TITLE: ElementQuery = ElementQuery::xpath("//h2[text()='recommended items']");

    // Footer
    /// Footer newsletter heading
    pub const SUBSCRIPTION_TITLE: ElementQuery = ElementQuery::xpath("//h2[text()='Subscription']");
    /// Newsletter email field (the id is misspelled on the site)
    pub const SUBSCRIBE_EMAIL: ElementQuery = ElementQuery::id("susbscribe_email");
    /// Arrow button next to the email field
    pub const SUBSCRIBE_BUTTON: ElementQuery = ElementQuery::id("subscribe");
    /// "You have been successfully subscribed!" banner
    pub const SUBSCRIBE_SUCCESS: ElementQuery = ElementQuery::class_name("alert-success");
    /// Footer copyright line
    pub const COPYRIGHT: ElementQuery = ElementQuery::xpath("//p[contains(text(), 'Copyright')]");

    /// Wait for the subscription confirmation
    const SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Home page bound to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, Self::PATH),
        }
    }

    /// Brand link in the side panel, e.g. `Polo`
    #[must_use]
    pub fn brand_link(name: &str) -> ElementQuery {
        ElementQuery::new(Strategy::XPath, format!("//a[@href='/brand_products/{name}']"))
    }

    /// Logo and featured items are visible
    pub async fn verify_home_page_loaded(&self) -> ShopResult<bool> {
        logging::step("Verifying home page loaded");
        self.verify_loaded().await
    }

    /// Go to the product listing
    pub async fn click_products_link(&self) -> ShopResult<&Self> {
        self.click_nav("products", &Self::PRODUCTS_LINK).await
    }

    /// Go to the cart
    pub async fn click_cart_link(&self) -> ShopResult<&Self> {
        self.click_nav("cart", &Self::CART_LINK).await
    }

    /// Go to the login / signup page
    pub async fn click_signup_login_link(&self) -> ShopResult<&Self> {
        self.click_nav("signup/login", &Self::SIGNUP_LOGIN_LINK).await
    }

    /// Go to the contact form
    pub async fn click_contact_us_link(&self) -> ShopResult<&Self> {
        self.click_nav("contact us", &Self::CONTACT_US_LINK).await
    }

    pub async fn click_test_cases_link(&self) -> ShopResult<&Self> {
        self.click_nav("test cases", &Self::TEST_CASES_LINK).await
    }

    async fn click_nav(&self, label: &str, query: &ElementQuery) -> ShopResult<&Self> {
        logging::step(&format!("Clicking {label} link"));
        self.base.ui().click(query).await?;
        Ok(self)
    }

    /// Visibility of each header link, keyed `home`, `products`, `cart`,
    /// `signup_login`, `contact_us`
    pub async fn navigation_links(&self) -> ShopResult<BTreeMap<String, bool>> {
        logging::step("Getting navigation links status");
        let mut links = BTreeMap::new();
        for (key, query) in [
            ("home", &Self::HOME_LINK),
            ("products", &Self::PRODUCTS_LINK),
            ("cart", &Self::CART_LINK),
            ("signup_login", &Self::SIGNUP_LOGIN_LINK),
            ("contact_us", &Self::CONTACT_US_LINK),
        ] {
            links.insert(key.to_string(), self.base.is_visible(query).await?);
        }
        Ok(links)
    }

    /// Expand the Women category
    pub async fn click_women_category(&self) -> ShopResult<&Self> {
        logging::step("Expanding women category");
        self.base.ui().click(&Self::WOMEN_CATEGORY).await?;
        Ok(self)
    }

    /// Expand the Men category
    pub async fn click_men_category(&self) -> ShopResult<&Self> {
        logging::step("Expanding men category");
        self.base.ui().click(&Self::MEN_CATEGORY).await?;
        Ok(self)
    }

    /// Expand the Kids category
    pub async fn click_kids_category(&self) -> ShopResult<&Self> {
        logging::step("Expanding kids category");
        self.base.ui().click(&Self::KIDS_CATEGORY).await?;
        Ok(self)
    }

    /// Women > Dress listing
    pub async fn click_women_dress_category(&self) -> ShopResult<&Self> {
        self.click_women_category().await?;
        logging::step("Clicking women dress category");
        self.base.ui().click(&Self::WOMEN_DRESS).await?;
        Ok(self)
    }

    /// Women > Tops listing
    pub async fn click_women_tops_category(&self) -> ShopResult<&Self> {
        self.click_women_category().await?;
        logging::step("Clicking women tops category");
        self.base.ui().click(&Self::WOMEN_TOPS).await?;
        Ok(self)
    }

    /// Men > Tshirts listing
    pub async fn click_men_tshirts_category(&self) -> ShopResult<&Self> {
        self.click_men_category().await?;
        logging::step("Clicking men tshirts category");
        self.base.ui().click(&Self::MEN_TSHIRTS).await?;
        Ok(self)
    }

    /// Open the listing of a brand
    pub async fn click_brand(&self, name: &str) -> ShopResult<&Self> {
        logging::step(&format!("Clicking brand: {name}"));
        self.base.ui().click(&Self::brand_link(name)).await?;
        Ok(self)
    }

    /// Names of the featured products
    pub async fn product_names(&self) -> ShopResult<Vec<String>> {
        let names = self.base.ui().read_all_texts(&Self::PRODUCT_NAMES).await?;
        logging::step(&format!("Got product names: {names:?}"));
        Ok(names)
    }

    /// Prices of the featured products, as displayed
    pub async fn product_prices(&self) -> ShopResult<Vec<String>> {
        let prices = self.base.ui().read_all_texts(&Self::PRODUCT_PRICES).await?;
        logging::step(&format!("Got product prices: {prices:?}"));
        Ok(prices)
    }

    /// Number of featured product cards
    pub async fn product_count(&self) -> ShopResult<usize> {
        let count = self.base.collection_len(&Self::PRODUCT_ITEMS).await?;
        logging::step(&format!("Found {count} products on page"));
        Ok(count)
    }

    /// Click the `index`-th add-to-cart button; out of range is a no-op
    pub async fn add_product_to_cart(&self, index: usize) -> ShopResult<&Self> {
        logging::step(&format!("Adding product {index} to cart"));
        if self.base.in_range(&Self::ADD_TO_CART_BUTTONS, index).await? {
            self.base.ui().scroll_into_view_at(&Self::ADD_TO_CART_BUTTONS, index).await?;
            self.base.ui().click_at(&Self::ADD_TO_CART_BUTTONS, index).await?;
        }
        Ok(self)
    }

    /// Open the detail page of the `index`-th product; out of range is a no-op
    pub async fn view_product(&self, index: usize) -> ShopResult<&Self> {
        logging::step(&format!("Viewing product {index}"));
        if self.base.in_range(&Self::VIEW_PRODUCT_LINKS, index).await? {
            self.base.ui().click_at(&Self::VIEW_PRODUCT_LINKS, index).await?;
        }
        Ok(self)
    }

    /// Scroll to and hover the `index`-th product card
    pub async fn hover_on_product(&self, index: usize) -> ShopResult<&Self> {
        logging::step(&format!("Hovering on product {index}"));
        if self.base.in_range(&Self::PRODUCT_ITEMS, index).await? {
            self.base.ui().scroll_into_view_at(&Self::PRODUCT_ITEMS, index).await?;
            self.base.ui().hover_at(&Self::PRODUCT_ITEMS, index).await?;
        }
        Ok(self)
    }

    /// Category panel heading is visible
    pub async fn verify_categories_section_visible(&self) -> ShopResult<bool> {
        logging::step("Verifying categories section");
        self.base.verify_element_visible(&Self::CATEGORY_TITLE).await
    }

    /// Brands panel heading is visible
    pub async fn verify_brands_section_visible(&self) -> ShopResult<bool> {
        logging::step("Verifying brands section");
        self.base.verify_element_visible(&Self::BRANDS_TITLE).await
    }

    /// Recommended carousel heading shows within the default wait
    pub async fn verify_recommended_items_visible(&self) -> ShopResult<bool> {
        logging::step("Verifying recommended items section");
        self.base.verify_element_visible(&Self::RECOMMENDED_ITEMS_TITLE).await
    }

    /// Footer newsletter heading is visible
    pub async fn verify_subscription_section_visible(&self) -> ShopResult<bool> {
        logging::step("Verifying subscription section");
        self.base.verify_element_visible(&Self::SUBSCRIPTION_TITLE).await
    }

    /// Whether the header shows a logged-in user
    pub async fn verify_logged_in(&self) -> ShopResult<bool> {
        self.base.is_visible(&Self::LOGGED_IN_AS).await
    }

    /// Subscribe from the footer; true once the confirmation shows
    pub async fn subscribe_to_newsletter(&self, email: &str) -> ShopResult<bool> {
        logging::step(&format!("Subscribing to newsletter with email: {email}"));
        let ui = self.base.ui();
        ui.scroll_into_view(&Self::SUBSCRIBE_EMAIL).await?;
        if !ui.type_text(&Self::SUBSCRIBE_EMAIL, email, true).await? {
            return Ok(false);
        }
        if !ui.click(&Self::SUBSCRIBE_BUTTON).await? {
            return Ok(false);
        }
        self.verify_subscription_success().await
    }

    /// Confirmation banner shows within five seconds
    pub async fn verify_subscription_success(&self) -> ShopResult<bool> {
        self.base
            .is_visible_within(&Self::SUBSCRIBE_SUCCESS, Self::SUBSCRIBE_TIMEOUT)
            .await
    }
}

impl PageObject for HomePage {
    fn path(&self) -> &'static str {
        Self::PATH
    }

    fn page_name(&self) -> &'static str {
        "Home Page"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn signature(&self) -> Vec<ElementQuery> {
        vec![Self::LOGO, Self::FEATURES_ITEMS_TITLE]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::storefront;

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_loaded_and_links_visible() {
            let shop = storefront::Storefront::start().await;
            let home = HomePage::new(shop.session());
            assert!(home.open().await.unwrap().verify_home_page_loaded().await.unwrap());
            let links = home.navigation_links().await.unwrap();
            assert_eq!(links.len(), 5);
            assert!(links.values().all(|v| *v));
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_products_link_navigates() {
            let shop = storefront::Storefront::start().await;
            let home = HomePage::new(shop.session());
            home.open().await.unwrap().click_products_link().await.unwrap();
            assert!(shop.url().ends_with("/products"));
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_category_expands_before_subcategory() {
            let shop = storefront::Storefront::start().await;
            let home = HomePage::new(shop.session());
            home.open().await.unwrap();
            home.click_women_dress_category().await.unwrap();
            assert!(shop.url().ends_with("/category_products/1"));
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_brand_link() {
            let shop = storefront::Storefront::start().await;
            let home = HomePage::new(shop.session());
            home.open().await.unwrap().click_brand("Polo").await.unwrap();
            assert!(shop.url().ends_with("/brand_products/Polo"));
            shop.finish().await;
        }
    }

    mod product_tests {
        use super::*;

        #[tokio::test]
        async fn test_featured_products() {
            let shop = storefront::Storefront::start().await;
            let home = HomePage::new(shop.session());
            home.open().await.unwrap();
            let names = home.product_names().await.unwrap();
            assert_eq!(names[0], "Blue Top");
            assert_eq!(home.product_count().await.unwrap(), names.len());
            assert!(home.product_prices().await.unwrap()[0].starts_with("Rs."));
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_out_of_range_add_is_noop() {
            let shop = storefront::Storefront::start().await;
            let home = HomePage::new(shop.session());
            home.open().await.unwrap().add_product_to_cart(99).await.unwrap();
            assert!(shop.cart().is_empty());
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_add_to_cart_records_item() {
            let shop = storefront::Storefront::start().await;
            let home = HomePage::new(shop.session());
            home.open().await.unwrap().add_product_to_cart(1).await.unwrap();
            assert_eq!(shop.cart(), vec!["Men Tshirt".to_string()]);
            shop.finish().await;
        }
    }

    mod subscription_tests {
        use super::*;

        #[tokio::test]
        async fn test_subscribe_shows_confirmation() {
            let shop = storefront::Storefront::start().await;
            let home = HomePage::new(shop.session());
            home.open().await.unwrap();
            assert!(home.verify_subscription_section_visible().await.unwrap());
            assert!(home.subscribe_to_newsletter("reader@example.com").await.unwrap());
            shop.finish().await;
        }
    }
}
