//! Product listing (`/products`): search, product cards, the add-to-cart
//! modal and the category and brand side panels.

use crate::fixture::Session;
use crate::locator::{ElementQuery, Strategy};
use crate::logging;
use crate::page_object::{BasePage, PageObject};
use crate::result::ShopResult;
use crate::wait::Readiness;
use std::time::Duration;

/// Product listing and search results
#[derive(Debug, Clone)]
pub struct ProductsPage {
    base: BasePage,
}

impl ProductsPage {
    /// Route of the full listing; searches land on `/products?search=`
    pub const PATH: &'static str = "/products";

    /// "All Products" heading of the unfiltered listing
    pub const ALL_PRODUCTS_TITLE: ElementQuery = ElementQuery::xpath("//h2[text()='All Products']");
    /// Search field above the listing
    pub const SEARCH_INPUT: ElementQuery = ElementQuery::id("search_product");
    /// Magnifier button submitting the search
    pub const SEARCH_BUTTON: ElementQuery = ElementQuery::id("submit_search");
    /// Heading that replaces "All Products" after a search
    pub const SEARCHED_PRODUCTS_TITLE: ElementQuery =
        ElementQuery::xpath("//h2[@class='title text-center' and text()='Searched Products']");

    /// One card per listed product
    pub const PRODUCT_ITEMS: ElementQuery = ElementQuery::class_name("productinfo");
    /// Name line of each card. The site renders some blank ones, which
    /// the readers below drop.
    pub const PRODUCT_NAMES: ElementQuery = ElementQuery::xpath("//div[@class='productinfo text-center']//p");
    /// Price of each card as displayed
    pub const PRODUCT_PRICES: ElementQuery = ElementQuery::xpath("//div[@class='productinfo text-center']//h2");
    /// "View Product" link per card
    pub const VIEW_PRODUCT_LINKS: ElementQuery = ElementQuery::xpath("//a[contains(text(), 'View Product')]");
    /// "Add to cart" on the card face
    pub const ADD_TO_CART_BUTTONS: ElementQuery =
        ElementQuery::xpath("//div[@class='productinfo text-center']//a[contains(@class, 'add-to-cart')]");
    /// "Add to cart" on the overlay that slides in on hover
    pub const OVERLAY_ADD_TO_CART: ElementQuery =
        ElementQuery::xpath("//div[@class='overlay-content']//a[contains(@class, 'add-to-cart')]");

    /// Left sidebar with the category groups
    pub const CATEGORY_PANEL: ElementQuery = ElementQuery::xpath("//div[@class='left-sidebar']");
    /// Brands box below the categories
    pub const BRANDS_PANEL: ElementQuery = ElementQuery::xpath("//div[@class='brands_products']");
    /// Each brand entry, text like `(6)Polo`
    pub const BRAND_LINKS: ElementQuery = ElementQuery::xpath("//div[@class='brands_products']//li/a");

    /// Modal confirming an add-to-cart
    pub const CART_MODAL: ElementQuery = ElementQuery::xpath("//div[@id='cartModal']");
    /// "Added!" title of the modal
    pub const MODAL_TITLE: ElementQuery = ElementQuery::xpath("//h4[@class='modal-title']");
    /// Closes the modal
    pub const CONTINUE_SHOPPING_BUTTON: ElementQuery = ElementQuery::xpath("//button[text()='Continue Shopping']");
    /// Modal link to the cart
    pub const VIEW_CART_BUTTON: ElementQuery = ElementQuery::xpath("//u[text()='View Cart']");

    /// Shown when a search or filter finds nothing
    pub const NO_PRODUCTS_MESSAGE: ElementQuery = ElementQuery::xpath("//p[contains(text(), 'No products found')]");

    /// How long the add-to-cart modal may take to appear
    const MODAL_TIMEOUT: Duration = Duration::from_secs(5);
    /// Short grace for the hover overlay before falling back to the card button
    const OVERLAY_TIMEOUT: Duration = Duration::from_secs(1);

    /// Listing page bound to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, Self::PATH),
        }
    }

    /// Brand link whose href names `brand`
    #[must_use]
    pub fn brand_link(brand: &str) -> ElementQuery {
        ElementQuery::new(
            Strategy::XPath,
            format!("//a[contains(@href, '/brand_products/{brand}')]"),
        )
    }

    /// Signature elements are visible
    pub async fn verify_products_page_loaded(&self) -> ShopResult<bool> {
        logging::step("Verifying products page loaded");
        self.verify_loaded().await
    }

    /// Unfiltered listing heading shows
    pub async fn verify_all_products_title(&self) -> ShopResult<bool> {
        logging::step("Verifying 'All Products' title");
        self.base.verify_element_visible(&Self::ALL_PRODUCTS_TITLE).await
    }

    /// Search results heading shows
    pub async fn verify_searched_products_title(&self) -> ShopResult<bool> {
        logging::step("Verifying 'Searched Products' title");
        self.base
            .verify_element_visible(&Self::SEARCHED_PRODUCTS_TITLE)
            .await
    }

    /// Type the term and submit the search
    pub async fn search_product(&self, term: &str) -> ShopResult<&Self> {
        logging::step(&format!("Searching for product: {term}"));
        let ui = self.base.ui();
        ui.type_text(&Self::SEARCH_INPUT, term, true).await?;
        ui.click(&Self::SEARCH_BUTTON).await?;
        ui.wait_for_page_load(None).await?;
        Ok(self)
    }

    /// Search, then require the results title and at least one product
    pub async fn search_and_verify_results(&self, term: &str) -> ShopResult<bool> {
        self.search_product(term).await?;
        if !self.verify_searched_products_title().await? {
            return Ok(false);
        }
        self.verify_products_visible().await
    }

    /// At least one listed name contains `term`, ignoring case
    pub async fn verify_search_results_contain_term(&self, term: &str) -> ShopResult<bool> {
        logging::step(&format!("Verifying search results contain term: {term}"));
        let names = self.product_names().await?;
        let needle = term.to_lowercase();
        match names.iter().find(|n| n.to_lowercase().contains(&needle)) {
            Some(name) => {
                logging::step(&format!("Found matching product: {name}"));
                Ok(true)
            }
            None => {
                tracing::warn!(target: "shopcheck::pages", term, ?names, "no product matches search term");
                Ok(false)
            }
        }
    }

    /// What the search field holds right now
    pub async fn search_input_value(&self) -> ShopResult<String> {
        self.base.ui().read_attribute(&Self::SEARCH_INPUT, "value").await
    }

    /// Listed product names, blanks dropped
    pub async fn product_names(&self) -> ShopResult<Vec<String>> {
        let mut names = self.base.ui().read_all_texts(&Self::PRODUCT_NAMES).await?;
        names.retain(|n| !n.is_empty());
        logging::step(&format!("Got product names: {names:?}"));
        Ok(names)
    }

    /// Listed prices, blanks dropped
    pub async fn product_prices(&self) -> ShopResult<Vec<String>> {
        let mut prices = self.base.ui().read_all_texts(&Self::PRODUCT_PRICES).await?;
        prices.retain(|p| !p.is_empty());
        Ok(prices)
    }

    /// Number of product cards on the page
    pub async fn product_count(&self) -> ShopResult<usize> {
        let count = self.base.collection_len(&Self::PRODUCT_ITEMS).await?;
        logging::step(&format!("Found {count} products on page"));
        Ok(count)
    }

    /// At least one card is listed
    pub async fn verify_products_visible(&self) -> ShopResult<bool> {
        Ok(self.product_count().await? > 0)
    }

    /// Hover the card, click its overlay button, falling back to the
    /// card's own button when the overlay does not show
    pub async fn add_product_to_cart_by_index(&self, index: usize) -> ShopResult<&Self> {
        logging::step(&format!("Adding product {index} to cart"));
        if !self.base.in_range(&Self::ADD_TO_CART_BUTTONS, index).await? {
            return Ok(self);
        }
        self.hover_over_product(index).await?;
        let ui = self.base.ui();
        let overlay = ui
            .waiter()
            .resolve_nth(
                &Self::OVERLAY_ADD_TO_CART,
                index,
                Readiness::Clickable,
                Some(Self::OVERLAY_TIMEOUT),
            )
            .await?;
        let clicked = match overlay {
            Some(_) => ui.click_at(&Self::OVERLAY_ADD_TO_CART, index).await?,
            None => false,
        };
        if !clicked {
            tracing::debug!(target: "shopcheck::pages", index, "overlay button unavailable, using card button");
            ui.click_at(&Self::ADD_TO_CART_BUTTONS, index).await?;
        }
        Ok(self)
    }

    /// Add the first product whose listed name contains `name`; false when
    /// no product matches
    pub async fn add_product_to_cart_by_name(&self, name: &str) -> ShopResult<bool> {
        let names = self.product_names().await?;
        match names.iter().position(|n| n.contains(name)) {
            Some(index) => {
                self.add_product_to_cart_by_index(index).await?;
                Ok(true)
            }
            None => {
                tracing::error!(target: "shopcheck::pages", name, "product not found on page");
                Ok(false)
            }
        }
    }

    /// Open the detail page of the `index`-th product
    pub async fn view_product_details(&self, index: usize) -> ShopResult<&Self> {
        logging::step(&format!("Clicking view product for index: {index}"));
        if self.base.in_range(&Self::VIEW_PRODUCT_LINKS, index).await? {
            let ui = self.base.ui();
            ui.scroll_into_view_at(&Self::VIEW_PRODUCT_LINKS, index).await?;
            ui.click_at(&Self::VIEW_PRODUCT_LINKS, index).await?;
        }
        Ok(self)
    }

    /// Bring the `index`-th card into view
    pub async fn scroll_to_product(&self, index: usize) -> ShopResult<&Self> {
        if self.base.in_range(&Self::PRODUCT_ITEMS, index).await? {
            self.base
                .ui()
                .scroll_into_view_at(&Self::PRODUCT_ITEMS, index)
                .await?;
        }
        Ok(self)
    }

    /// Hover the `index`-th card to reveal its overlay
    pub async fn hover_over_product(&self, index: usize) -> ShopResult<&Self> {
        logging::step(&format!("Hovering on product {index}"));
        if self.base.in_range(&Self::PRODUCT_ITEMS, index).await? {
            let ui = self.base.ui();
            ui.scroll_into_view_at(&Self::PRODUCT_ITEMS, index).await?;
            ui.hover_at(&Self::PRODUCT_ITEMS, index).await?;
        }
        Ok(self)
    }

    /// The "Added!" modal shows within five seconds
    pub async fn verify_add_to_cart_modal(&self) -> ShopResult<bool> {
        logging::step("Verifying modal appeared");
        self.base
            .is_visible_within(&Self::CART_MODAL, Self::MODAL_TIMEOUT)
            .await
    }

    /// Dismiss the modal and stay on the listing
    pub async fn continue_shopping(&self) -> ShopResult<&Self> {
        logging::step("Clicking continue shopping");
        let ui = self.base.ui();
        if ui.click(&Self::CONTINUE_SHOPPING_BUTTON).await? {
            ui.waiter()
                .wait_until_absent(&Self::CART_MODAL, Some(Self::MODAL_TIMEOUT))
                .await?;
        }
        Ok(self)
    }

    /// Follow the modal's "View Cart" link
    pub async fn view_cart_from_modal(&self) -> ShopResult<&Self> {
        logging::step("Clicking view cart from modal");
        self.base.ui().click(&Self::VIEW_CART_BUTTON).await?;
        Ok(self)
    }

    pub async fn verify_category_panel_visible(&self) -> ShopResult<bool> {
        self.base.verify_element_visible(&Self::CATEGORY_PANEL).await
    }

    pub async fn verify_brands_panel_visible(&self) -> ShopResult<bool> {
        self.base.verify_element_visible(&Self::BRANDS_PANEL).await
    }

    /// Brand names in the side panel, without their product counts
    pub async fn brand_names(&self) -> ShopResult<Vec<String>> {
        let raw = self.base.ui().read_all_texts(&Self::BRAND_LINKS).await?;
        let brands: Vec<String> = raw
            .iter()
            .map(|t| strip_count(t))
            .filter(|t| !t.is_empty())
            .collect();
        logging::step(&format!("Found brands: {brands:?}"));
        Ok(brands)
    }

    /// Open the listing of `brand`
    pub async fn click_brand_by_name(&self, brand: &str) -> ShopResult<&Self> {
        logging::step(&format!("Clicking brand: {brand}"));
        self.base.ui().click(&Self::brand_link(brand)).await?;
        Ok(self)
    }

    /// "No products found" shows
    pub async fn verify_no_products_message(&self) -> ShopResult<bool> {
        self.base
            .verify_element_visible(&Self::NO_PRODUCTS_MESSAGE)
            .await
    }
}

impl PageObject for ProductsPage {
    fn path(&self) -> &'static str {
        Self::PATH
    }

    fn page_name(&self) -> &'static str {
        "Products Page"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn signature(&self) -> Vec<ElementQuery> {
        vec![Self::ALL_PRODUCTS_TITLE]
    }
}

/// `(6)Polo` → `Polo`
fn strip_count(text: &str) -> String {
    let text = text.trim();
    match (text.starts_with('('), text.find(')')) {
        (true, Some(end)) => text[end + 1..].trim().to_string(),
        _ => text.to_string(),
    }
}
