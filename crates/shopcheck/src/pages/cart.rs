//! Shopping cart (`/view_cart`).

use crate::fixture::Session;
use crate::locator::ElementQuery;
use crate::logging;
use crate::page_object::{BasePage, PageObject};
use crate::result::ShopResult;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Snapshot of the cart as displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Rows in the table
    pub item_count: usize,
    /// Name of each row, in table order
    pub product_names: Vec<String>,
    /// Displayed total, `"N/A"` when the page shows none
    pub total_amount: String,
    /// `item_count == 0`
    pub is_empty: bool,
}

/// The cart table and its empty state
#[derive(Debug, Clone)]
pub struct CartPage {
    base: BasePage,
}

impl CartPage {
    /// Route of the cart
    pub const PATH: &'static str = "/view_cart";

    /// "Home > Shopping Cart" trail; shown with or without items
    pub const BREADCRUMB: ElementQuery = ElementQuery::xpath("//ol[@class='breadcrumb']");
    /// Table of rows, absent when the cart is empty
    pub const CART_TABLE: ElementQuery = ElementQuery::id("cart_info_table");
    /// One `<tr>` per product in the cart
    pub const CART_ITEMS: ElementQuery = ElementQuery::xpath("//tbody/tr");
    /// Product name per row
    pub const PRODUCT_NAMES: ElementQuery = ElementQuery::xpath("//td[@class='cart_description']//h4/a");
    /// Unit price per row
    pub const PRODUCT_PRICES: ElementQuery = ElementQuery::xpath("//td[@class='cart_price']//p");
    /// Quantity label per row, as rendered by the shop
    pub const PRODUCT_QUANTITIES: ElementQuery = ElementQuery::xpath("//td[@class='cart_quantity']//button");
    /// Line total per row
    pub const PRODUCT_TOTALS: ElementQuery = ElementQuery::xpath("//td[@class='cart_total']//p");
    /// Editable quantity per row, on shops that offer one
    pub const QUANTITY_INPUTS: ElementQuery = ElementQuery::xpath("//td[@class='cart_quantity']//input");
    /// Row delete cross
    pub const DELETE_BUTTONS: ElementQuery = ElementQuery::xpath("//td[@class='cart_delete']//a");
    /// "Cart is empty!"
    pub const EMPTY_CART_MESSAGE: ElementQuery = ElementQuery::xpath("//b[contains(text(), 'Cart is empty')]");
    /// "here" link under the empty message
    pub const BACK_TO_PRODUCTS: ElementQuery = ElementQuery::xpath("//span[@id='empty_cart']//a[@href='/products']");
    /// Starts checkout; a guest gets the login modal instead
    pub const PROCEED_TO_CHECKOUT_BUTTON: ElementQuery = ElementQuery::xpath("//a[text()='Proceed To Checkout']");
    /// Cart total row
    pub const TOTAL_AMOUNT: ElementQuery = ElementQuery::xpath("//tr[@id='total_amount']//p");

    /// How long a removed row may take to disappear
    const ROW_REMOVAL_TIMEOUT: Duration = Duration::from_secs(5);
    /// Ceiling on delete attempts in `clear_cart`
    const MAX_CLEAR_ATTEMPTS: usize = 50;

    /// Cart page bound to a session
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            base: BasePage::new(session, Self::PATH),
        }
    }

    /// Breadcrumb is visible
    pub async fn verify_cart_page_loaded(&self) -> ShopResult<bool> {
        logging::step("Verifying cart page loaded");
        self.verify_loaded().await
    }

    /// "Cart is empty!" shows
    pub async fn verify_cart_is_empty(&self) -> ShopResult<bool> {
        self.base.is_visible(&Self::EMPTY_CART_MESSAGE).await
    }

    /// At least one row
    pub async fn verify_cart_has_items(&self) -> ShopResult<bool> {
        Ok(self.cart_items_count().await? > 0)
    }

    /// Rows in the cart table right now
    pub async fn cart_items_count(&self) -> ShopResult<usize> {
        let count = self.base.ui().count(&Self::CART_ITEMS).await?;
        logging::step(&format!("Cart contains {count} items"));
        Ok(count)
    }

    /// Product name of every row, in table order
    pub async fn product_names_in_cart(&self) -> ShopResult<Vec<String>> {
        self.column(&Self::PRODUCT_NAMES).await
    }

    /// Unit price of every row as displayed
    pub async fn product_prices_in_cart(&self) -> ShopResult<Vec<String>> {
        self.column(&Self::PRODUCT_PRICES).await
    }

    /// Rendered quantity of every row
    pub async fn product_quantities_in_cart(&self) -> ShopResult<Vec<String>> {
        self.column(&Self::PRODUCT_QUANTITIES).await
    }

    /// Line total of every row as displayed
    pub async fn product_totals_in_cart(&self) -> ShopResult<Vec<String>> {
        self.column(&Self::PRODUCT_TOTALS).await
    }

    /// One cell per row; an empty cart has none to wait for
    async fn column(&self, query: &ElementQuery) -> ShopResult<Vec<String>> {
        if self.cart_items_count().await? == 0 {
            return Ok(Vec::new());
        }
        self.base.ui().read_all_texts(query).await
    }

    /// Displayed total, `""` when the page shows none
    pub async fn total_amount(&self) -> ShopResult<String> {
        if !self.base.is_visible(&Self::TOTAL_AMOUNT).await? {
            return Ok(String::new());
        }
        self.base.ui().read_text(&Self::TOTAL_AMOUNT).await
    }

    /// Delete the `index`-th row and wait for it to go
    pub async fn delete_product_by_index(&self, index: usize) -> ShopResult<&Self> {
        logging::step(&format!("Deleting product at index {index}"));
        let before = self.cart_items_count().await?;
        if index >= before {
            tracing::error!(target: "shopcheck::pages", index, rows = before, "product index not found");
            return Ok(self);
        }
        if self.base.ui().click_at(&Self::DELETE_BUTTONS, index).await? {
            let gone = self
                .base
                .ui()
                .waiter()
                .wait_for_count(&Self::CART_ITEMS, |n| n < before, Some(Self::ROW_REMOVAL_TIMEOUT))
                .await?;
            if gone.is_none() {
                tracing::warn!(target: "shopcheck::pages", index, "deleted row still shown");
            }
        }
        Ok(self)
    }

    /// Delete the first row whose product name contains `name`
    pub async fn delete_product_by_name(&self, name: &str) -> ShopResult<bool> {
        let names = self.product_names_in_cart().await?;
        match names.iter().position(|n| n.contains(name)) {
            Some(index) => {
                self.delete_product_by_index(index).await?;
                Ok(true)
            }
            None => {
                tracing::error!(target: "shopcheck::pages", name, "product not in cart");
                Ok(false)
            }
        }
    }

    /// Delete rows until the cart is empty or no delete makes progress
    pub async fn clear_cart(&self) -> ShopResult<&Self> {
        logging::step("Clearing cart");
        for _ in 0..Self::MAX_CLEAR_ATTEMPTS {
            let before = self.cart_items_count().await?;
            if before == 0 {
                return Ok(self);
            }
            self.delete_product_by_index(0).await?;
            if self.cart_items_count().await? >= before {
                tracing::warn!(target: "shopcheck::pages", rows = before, "cart row could not be removed");
                break;
            }
        }
        Ok(self)
    }

    /// Type a new quantity into the `index`-th row, reload the cart and read
    /// the row's displayed quantity. True only when the shop kept `quantity`;
    /// the input's own `value` is not evidence.
    pub async fn update_product_quantity(&self, index: usize, quantity: u32) -> ShopResult<bool> {
        logging::step(&format!("Updating product {index} quantity to {quantity}"));
        if !self.base.in_range(&Self::QUANTITY_INPUTS, index).await? {
            return Ok(false);
        }
        let ui = self.base.ui();
        let wanted = quantity.to_string();
        if !ui.type_text_at(&Self::QUANTITY_INPUTS, index, &wanted, true).await? {
            return Ok(false);
        }
        ui.refresh().await?;
        let shown = self.product_quantities_in_cart().await?;
        let actual = shown.get(index).map_or("", |q| q.trim());
        logging::assertion("Cart quantity after reload", &wanted, actual);
        Ok(actual.parse::<u32>().ok() == Some(quantity))
    }

    /// Whether rows carry an editable quantity field rather than a label
    pub async fn has_editable_quantities(&self) -> ShopResult<bool> {
        Ok(self.base.ui().count(&Self::QUANTITY_INPUTS).await? > 0)
    }

    /// Displayed quantity of the first row naming `name`
    pub async fn verify_product_quantity(&self, name: &str, expected: &str) -> ShopResult<bool> {
        let names = self.product_names_in_cart().await?;
        let quantities = self.product_quantities_in_cart().await?;
        match names
            .iter()
            .position(|n| n.contains(name))
            .and_then(|i| quantities.get(i))
        {
            Some(actual) => {
                logging::assertion("Product quantity", expected, actual);
                Ok(actual == expected)
            }
            None => {
                tracing::error!(target: "shopcheck::pages", name, "product not in cart");
                Ok(false)
            }
        }
    }

    /// Click "Proceed To Checkout"
    pub async fn proceed_to_checkout(&self) -> ShopResult<&Self> {
        logging::step("Clicking proceed to checkout");
        self.base.ui().click(&Self::PROCEED_TO_CHECKOUT_BUTTON).await?;
        Ok(self)
    }

    /// From an empty cart back to the product listing
    pub async fn continue_shopping(&self) -> ShopResult<&Self> {
        self.base.ui().click(&Self::BACK_TO_PRODUCTS).await?;
        Ok(self)
    }

    /// Some row names `name`
    pub async fn verify_product_in_cart(&self, name: &str) -> ShopResult<bool> {
        logging::step(&format!("Verifying product '{name}' in cart"));
        let names = self.product_names_in_cart().await?;
        logging::assertion("Product in cart", name, &format!("{names:?}"));
        Ok(names.iter().any(|n| n.contains(name)))
    }

    /// Rows, names and total in one snapshot; the rows are counted once so
    /// `item_count` and `is_empty` always agree
    pub async fn cart_summary(&self) -> ShopResult<CartSummary> {
        let item_count = self.cart_items_count().await?;
        let product_names = if item_count == 0 {
            Vec::new()
        } else {
            self.base.ui().read_all_texts(&Self::PRODUCT_NAMES).await?
        };
        let total = self.total_amount().await?;
        let summary = CartSummary {
            item_count,
            product_names,
            total_amount: if total.is_empty() { "N/A".to_string() } else { total },
            is_empty: item_count == 0,
        };
        logging::step(&format!("Cart summary: {summary:?}"));
        Ok(summary)
    }

    /// Elements expected for the cart's current state: the breadcrumb plus
    /// either the empty message or the table and checkout button
    pub async fn verify_cart_page_elements(&self) -> ShopResult<BTreeMap<String, bool>> {
        let mut checks = BTreeMap::new();
        checks.insert(
            "breadcrumb".to_string(),
            self.base.is_visible(&Self::BREADCRUMB).await?,
        );
        if self.cart_items_count().await? == 0 {
            checks.insert(
                "empty_cart_message".to_string(),
                self.base.is_visible(&Self::EMPTY_CART_MESSAGE).await?,
            );
        } else {
            checks.insert(
                "cart_table".to_string(),
                self.base.is_visible(&Self::CART_TABLE).await?,
            );
            checks.insert(
                "proceed_to_checkout".to_string(),
                self.base.is_visible(&Self::PROCEED_TO_CHECKOUT_BUTTON).await?,
            );
        }
        Ok(checks)
    }
}

impl PageObject for CartPage {
    fn path(&self) -> &'static str {
        Self::PATH
    }

    fn page_name(&self) -> &'static str {
        "Cart Page"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn signature(&self) -> Vec<ElementQuery> {
        vec![Self::BREADCRUMB]
    }
}

fn price_pattern() -> Option<&'static Regex> {
    static PRICE: OnceLock<Option<Regex>> = OnceLock::new();
    PRICE.get_or_init(|| Regex::new(r"\d[\d,]*").ok()).as_ref()
}

/// Amount in a displayed price such as `Rs. 500` or `Rs. 1,500`
#[must_use]
pub fn parse_price(text: &str) -> Option<u64> {
    let amount = price_pattern()?.find(text)?;
    amount.as_str().replace(',', "").parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::storefront::Storefront;
    use proptest::prelude::*;

    mod price_tests {
        use super::*;

        #[test]
        fn test_parse_price() {
            assert_eq!(parse_price("Rs. 500"), Some(500));
            assert_eq!(parse_price(" Rs. 1,500 "), Some(1500));
            assert_eq!(parse_price("N/A"), None);
        }

        proptest! {
            #[test]
            fn prop_displayed_price_parses(amount in 0u64..1_000_000) {
                prop_assert_eq!(parse_price(&format!("Rs. {amount}")), Some(amount));
            }
        }
    }

    mod empty_cart_tests {
        use super::*;

        #[tokio::test]
        async fn test_empty_cart_summary() {
            let shop = Storefront::start().await;
            let cart = CartPage::new(shop.session());
            cart.open().await.unwrap();
            assert!(cart.verify_cart_page_loaded().await.unwrap());
            assert!(cart.verify_cart_is_empty().await.unwrap());
            let summary = cart.cart_summary().await.unwrap();
            assert_eq!(summary.item_count, 0);
            assert!(summary.is_empty);
            assert_eq!(summary.total_amount, "N/A");
            let checks = cart.verify_cart_page_elements().await.unwrap();
            assert_eq!(checks.get("empty_cart_message"), Some(&true));
            cart.continue_shopping().await.unwrap();
            assert!(shop.url().ends_with("/products"));
            shop.finish().await;
        }
    }

    mod filled_cart_tests {
        use super::*;

        async fn cart_with(shop: &Storefront, products: &[&str]) -> CartPage {
            for name in products {
                shop.put_in_cart(name);
            }
            let cart = CartPage::new(shop.session());
            cart.open().await.unwrap();
            cart
        }

        #[tokio::test]
        async fn test_rows_and_totals() {
            let shop = Storefront::start().await;
            let cart = cart_with(&shop, &["Blue Top", "Men Tshirt", "Blue Top"]).await;
            assert_eq!(cart.cart_items_count().await.unwrap(), 2);
            assert!(cart.verify_product_in_cart("Men Tshirt").await.unwrap());
            assert!(cart.verify_product_quantity("Blue Top", "2").await.unwrap());
            let prices = cart.product_prices_in_cart().await.unwrap();
            let totals = cart.product_totals_in_cart().await.unwrap();
            assert_eq!(parse_price(&totals[0]), parse_price(&prices[0]).map(|p| p * 2));
            let checks = cart.verify_cart_page_elements().await.unwrap();
            assert!(checks.values().all(|v| *v));
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_delete_by_name_and_clear() {
            let shop = Storefront::start().await;
            let cart = cart_with(&shop, &["Blue Top", "Men Tshirt", "Winter Top"]).await;
            assert!(cart.delete_product_by_name("Men Tshirt").await.unwrap());
            assert_eq!(
                cart.product_names_in_cart().await.unwrap(),
                vec!["Blue Top".to_string(), "Winter Top".to_string()]
            );
            cart.clear_cart().await.unwrap();
            assert_eq!(cart.cart_items_count().await.unwrap(), 0);
            assert!(shop.cart().is_empty());
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_out_of_range_delete_leaves_cart() {
            let shop = Storefront::start().await;
            let cart = cart_with(&shop, &["Blue Top"]).await;
            cart.delete_product_by_index(3).await.unwrap();
            assert_eq!(cart.cart_items_count().await.unwrap(), 1);
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_quantity_update_survives_reload() {
            let shop = Storefront::start().await;
            let cart = cart_with(&shop, &["Blue Top"]).await;
            assert!(cart.update_product_quantity(0, 3).await.unwrap());
            assert_eq!(cart.product_quantities_in_cart().await.unwrap(), vec!["3".to_string()]);
            let prices = cart.product_prices_in_cart().await.unwrap();
            let totals = cart.product_totals_in_cart().await.unwrap();
            assert_eq!(parse_price(&totals[0]), parse_price(&prices[0]).map(|p| p * 3));
            assert!(!cart.update_product_quantity(5, 3).await.unwrap());
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_rejected_quantity_is_not_reported_as_updated() {
            let shop = Storefront::start().await;
            let cart = cart_with(&shop, &["Blue Top", "Men Tshirt"]).await;
            // the shop ignores zero, though the input now holds "0"
            assert!(!cart.update_product_quantity(1, 0).await.unwrap());
            assert_eq!(
                cart.product_quantities_in_cart().await.unwrap(),
                vec!["1".to_string(), "1".to_string()]
            );
            shop.finish().await;
        }

        #[tokio::test]
        async fn test_summary_of_filled_cart() {
            let shop = Storefront::start().await;
            let cart = cart_with(&shop, &["Blue Top", "Men Tshirt", "Blue Top"]).await;
            let summary = cart.cart_summary().await.unwrap();
            assert_eq!(summary.item_count, 2);
            assert!(!summary.is_empty);
            assert_eq!(summary.product_names, vec!["Blue Top".to_string(), "Men Tshirt".to_string()]);
            assert_eq!(summary.total_amount, "Rs. 1400");
            shop.finish().await;
        }
    }
}
