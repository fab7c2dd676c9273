//! Scripted storefront on top of [`MockDriver`].
//!
//! [`Site`] registers every page the page objects know, answering to the
//! same queries, with handlers that keep a small shop state: cart rows,
//! accounts, the logged-in user, subscribers and contact messages.
//! [`Storefront`] bundles a site with a session and throwaway settings for
//! tests.

use super::{MockAction, MockDriver, MockElement, MockPage, MockWorld};
use crate::browser::BrowserConfig;
use crate::config::Settings;
use crate::data::{DataManager, MONTHS};
use crate::fixture::{Session, TestContext};
use crate::locator::ElementQuery;
use crate::pages::{
    AccountCreatedPage, CartPage, ContactUsPage, HomePage, LoginPage, ProductsPage, SignupPage,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// Origin the test storefront is served from
pub const ORIGIN: &str = "https://shop.test";

const REQUIRED: &str = "Please fill out this field.";
const MISSING_AT: &str = "Please include an '@' in the email address.";
const INCORRECT_LOGIN: &str = "Your email or password is incorrect!";
const EMAIL_EXISTS: &str = "Email Address already exist!";
const CONTACT_SUCCESS: &str = "Success! Your details have been submitted successfully.";
const CONFIRM_SUBMIT: &str = "Press OK to proceed!";

const PRODUCT_INFORMATION: ElementQuery = ElementQuery::xpath("//div[@class='product-information']/h2");

#[derive(Debug)]
struct Product {
    id: u32,
    name: &'static str,
    price: u32,
    category: u32,
    brand: &'static str,
}

impl Product {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || category_label(self.category).to_lowercase().contains(needle)
    }
}

const CATALOGUE: &[Product] = &[
    Product { id: 1, name: "Blue Top", price: 500, category: 2, brand: "Polo" },
    Product { id: 2, name: "Men Tshirt", price: 400, category: 3, brand: "H&M" },
    Product { id: 3, name: "Sleeveless Dress", price: 1000, category: 1, brand: "Madame" },
    Product { id: 4, name: "Stylish Dress", price: 1500, category: 1, brand: "Madame" },
    Product { id: 5, name: "Winter Top", price: 600, category: 2, brand: "Mast & Harbour" },
    Product { id: 6, name: "Summer White Top", price: 400, category: 2, brand: "H&M" },
    Product { id: 7, name: "Madame Top For Women", price: 1000, category: 2, brand: "Madame" },
    Product { id: 8, name: "Fancy Green Top", price: 700, category: 2, brand: "Polo" },
    Product { id: 9, name: "Soft Stretch Jeans", price: 799, category: 4, brand: "Mast & Harbour" },
    Product { id: 10, name: "Cotton Silk Hand Block Print Saree", price: 3000, category: 5, brand: "Biba" },
    Product { id: 11, name: "Kids Printed Cotton Shirt", price: 650, category: 6, brand: "Babyhug" },
];

const CATEGORIES: std::ops::RangeInclusive<u32> = 1..=6;

const BRANDS: &[(&str, usize)] = &[
    ("Polo", 6),
    ("H&M", 5),
    ("Madame", 5),
    ("Mast & Harbour", 3),
    ("Babyhug", 4),
    ("Allen Solly Junior", 3),
    ("Kookie Kids", 3),
    ("Biba", 5),
];

const COUNTRIES: &[&str] = &[
    "India",
    "United States",
    "Canada",
    "Australia",
    "Israel",
    "New Zealand",
    "Singapore",
];

const fn category_label(category: u32) -> &'static str {
    match category {
        1 => "Women - Dress",
        2 => "Women - Tops",
        3 => "Men - Tshirts",
        4 => "Men - Jeans",
        5 => "Women - Saree",
        _ => "Kids - Tops & Shirts",
    }
}

fn product(id: u32) -> Option<&'static Product> {
    CATALOGUE.iter().find(|p| p.id == id)
}

fn price(amount: u32) -> String {
    format!("Rs. {amount}")
}

fn node(tag: &str, text: impl Into<String>) -> MockElement {
    MockElement::new(tag).text(text)
}

fn input() -> MockElement {
    MockElement::new("input")
}

fn link(target: &str) -> MockElement {
    MockElement::new("a").on_click(MockAction::navigate(target))
}

fn select(options: impl IntoIterator<Item = (String, String)>) -> MockElement {
    options
        .into_iter()
        .fold(MockElement::new("select"), |el, (value, text)| el.option(value, text))
}

/// Flag every empty field with the browser's required message; true when
/// none is empty
fn validate_required(w: &mut MockWorld, fields: &[ElementQuery]) -> bool {
    let page = w.current_page_mut();
    let mut valid = true;
    for field in fields {
        for el in page.matches_mut(field) {
            let empty = el.value().map_or(true, |v| v.trim().is_empty());
            valid &= !empty;
            let message = if empty { REQUIRED } else { "" };
            el.attributes
                .insert("validationMessage".to_string(), message.to_string());
        }
    }
    valid
}

/// Show one of the red login-page errors; only one is rendered at a time
/// `type=email` check: an address without `@` is flagged and blocks the
/// submit
fn validate_email(w: &mut MockWorld, field: &ElementQuery) -> bool {
    let email = w.value_of(field).unwrap_or_default();
    if email.contains('@') {
        return true;
    }
    w.current_page_mut().matches_mut(field).for_each(|e| {
        e.attributes
            .insert("validationMessage".to_string(), MISSING_AT.to_string());
    });
    false
}

fn show_form_error(w: &mut MockWorld, specific: &ElementQuery, message: &str) {
    let page = w.current_page_mut();
    for query in [LoginPage::INCORRECT_LOGIN_ERROR, LoginPage::EMAIL_ALREADY_EXISTS_ERROR] {
        page.matches_mut(&query).for_each(|e| e.visible = query == *specific);
    }
    page.remove_all(&LoginPage::ERROR_MESSAGE);
    page.push(LoginPage::ERROR_MESSAGE, node("p", message));
}

fn show(w: &mut MockWorld, queries: &[ElementQuery]) {
    let page = w.current_page_mut();
    for query in queries {
        page.matches_mut(query).for_each(|e| e.visible = true);
    }
}

#[derive(Debug, Clone)]
struct Account {
    name: String,
    password: String,
}

#[derive(Debug, Clone, Copy)]
struct CartRow {
    id: u32,
    quantity: u32,
}

#[derive(Debug, Default)]
struct ShopState {
    cart: Vec<CartRow>,
    accounts: BTreeMap<String, Account>,
    logged_in: Option<String>,
    subscribers: Vec<String>,
    messages: usize,
}

/// The storefront's pages and state
#[derive(Debug, Clone, Default)]
pub struct Site {
    state: Arc<Mutex<ShopState>>,
}

impl Site {
    /// Empty shop: no accounts, empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock session serving this site from `origin`
    #[must_use]
    pub fn driver(&self, origin: &str) -> Arc<MockDriver> {
        let driver = MockDriver::new(origin);
        driver.update(|w| self.install(w));
        Arc::new(driver)
    }

    /// Names of the cart rows, in the order they were added
    #[must_use]
    pub fn cart_names(&self) -> Vec<String> {
        self.lock()
            .cart
            .iter()
            .filter_map(|row| product(row.id))
            .map(|p| p.name.to_string())
            .collect()
    }

    /// Register an account directly
    pub fn add_account(&self, name: &str, email: &str, password: &str) {
        self.lock().accounts.insert(
            email.to_string(),
            Account {
                name: name.to_string(),
                password: password.to_string(),
            },
        );
    }

    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        self.lock().accounts.contains_key(email)
    }

    /// Display name of the logged-in user
    #[must_use]
    pub fn logged_in_as(&self) -> Option<String> {
        self.lock().logged_in.clone()
    }

    #[must_use]
    pub fn subscribers(&self) -> Vec<String> {
        self.lock().subscribers.clone()
    }

    /// Contact messages accepted so far
    #[must_use]
    pub fn messages_sent(&self) -> usize {
        self.lock().messages
    }

    fn lock(&self) -> MutexGuard<'_, ShopState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handler(&self, f: impl Fn(&Self, &mut MockWorld) + Send + Sync + 'static) -> MockAction {
        let site = self.clone();
        MockAction::run(move |w| f(&site, w))
    }

    fn install(&self, w: &mut MockWorld) {
        let st = self.lock();
        self.render_static(w, &st);
        self.render_cart(w, &st);
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn render_static(&self, w: &mut MockWorld, st: &ShopState) {
        *w.page_mut(HomePage::PATH) = self.home_page(st);
        let all: Vec<&'static Product> = CATALOGUE.iter().collect();
        *w.page_mut(ProductsPage::PATH) = self.listing(
            st,
            "Automation Exercise - All Products",
            (ProductsPage::ALL_PRODUCTS_TITLE, "All Products"),
            &all,
            "",
        );
        *w.page_mut(LoginPage::PATH) = self.login_page(st);
        *w.page_mut(ContactUsPage::PATH) = self.contact_page(st);
        *w.page_mut("/test_cases") = self.chrome(MockPage::new("Automation Exercise - Test Cases"), st);

        for category in CATEGORIES {
            let products: Vec<&'static Product> =
                CATALOGUE.iter().filter(|p| p.category == category).collect();
            let heading = format!("{} Products", category_label(category));
            *w.page_mut(&format!("/category_products/{category}")) = self.listing(
                st,
                "Automation Exercise - Category Products",
                (HomePage::FEATURES_ITEMS_TITLE, &heading),
                &products,
                "",
            );
        }
        for (brand, _) in BRANDS {
            let products: Vec<&'static Product> =
                CATALOGUE.iter().filter(|p| p.brand == *brand).collect();
            let heading = format!("Brand - {brand} Products");
            *w.page_mut(&format!("/brand_products/{brand}")) = self.listing(
                st,
                "Automation Exercise - Brand Products",
                (HomePage::FEATURES_ITEMS_TITLE, &heading),
                &products,
                "",
            );
        }
        for p in CATALOGUE {
            *w.page_mut(&format!("/product_details/{}", p.id)) = self
                .chrome(MockPage::new("Automation Exercise - Product Details"), st)
                .with(PRODUCT_INFORMATION, node("h2", p.name));
        }
    }

    /// Header navigation and subscription footer shared by every page
    fn chrome(&self, page: MockPage, st: &ShopState) -> MockPage {
        let mut page = page
            .with(HomePage::LOGO, MockElement::new("img"))
            .with(
                HomePage::HOME_LINK,
                MockElement::new("i").on_click(MockAction::navigate("/")),
            )
            .with(HomePage::PRODUCTS_LINK, link(ProductsPage::PATH).text("Products"))
            .with(HomePage::CART_LINK, link(CartPage::PATH).text("Cart"));
        match &st.logged_in {
            Some(name) => {
                page.push(HomePage::LOGOUT_LINK, node("a", "Logout").on_click(self.handler(Self::on_logout)));
                page.push(HomePage::LOGGED_IN_AS, node("a", format!("Logged in as {name}")));
            }
            None => page.push(HomePage::SIGNUP_LOGIN_LINK, link(LoginPage::PATH).text("Signup / Login")),
        }
        page.with(HomePage::TEST_CASES_LINK, link("/test_cases").text("Test Cases"))
            .with(HomePage::CONTACT_US_LINK, link(ContactUsPage::PATH).text("Contact us"))
            .with(HomePage::SUBSCRIPTION_TITLE, node("h2", "Subscription"))
            .with(HomePage::SUBSCRIBE_EMAIL, input())
            .with(
                HomePage::SUBSCRIBE_BUTTON,
                MockElement::new("button").on_click(self.handler(Self::on_subscribe)),
            )
            .with(
                HomePage::SUBSCRIBE_SUCCESS,
                node("div", "You have been successfully subscribed!").hidden(),
            )
            .with(HomePage::COPYRIGHT, node("p", "Copyright © 2021 All rights reserved"))
    }

    fn product_cards(&self, mut page: MockPage, products: &[&'static Product]) -> MockPage {
        for p in products {
            let id = p.id;
            page.push(
                ProductsPage::PRODUCT_ITEMS,
                MockElement::new("div").on_hover(MockAction::Show(ProductsPage::OVERLAY_ADD_TO_CART)),
            );
            page.push(ProductsPage::PRODUCT_PRICES, node("h2", price(p.price)));
            page.push(ProductsPage::PRODUCT_NAMES, node("p", p.name));
            page.push(
                ProductsPage::ADD_TO_CART_BUTTONS,
                node("a", "Add to cart").on_click(self.handler(move |site, w| site.add_to_cart(w, id, true))),
            );
            page.push(
                ProductsPage::OVERLAY_ADD_TO_CART,
                node("a", "Add to cart")
                    .hidden()
                    .on_click(self.handler(move |site, w| site.add_to_cart(w, id, true))),
            );
            page.push(
                ProductsPage::VIEW_PRODUCT_LINKS,
                link(&format!("/product_details/{id}")).text("View Product"),
            );
        }
        page
    }

    /// Hidden "Added!" modal
    fn cart_modal(page: MockPage) -> MockPage {
        let mut dismiss = node("button", "Continue Shopping").hidden();
        for query in Self::modal_parts() {
            dismiss = dismiss.on_click(MockAction::Hide(query));
        }
        page.with(ProductsPage::CART_MODAL, MockElement::new("div").hidden())
            .with(ProductsPage::MODAL_TITLE, node("h4", "Added!").hidden())
            .with(ProductsPage::CONTINUE_SHOPPING_BUTTON, dismiss)
            .with(
                ProductsPage::VIEW_CART_BUTTON,
                node("u", "View Cart")
                    .hidden()
                    .on_click(MockAction::navigate(CartPage::PATH)),
            )
    }

    const fn modal_parts() -> [ElementQuery; 4] {
        [
            ProductsPage::CART_MODAL,
            ProductsPage::MODAL_TITLE,
            ProductsPage::CONTINUE_SHOPPING_BUTTON,
            ProductsPage::VIEW_CART_BUTTON,
        ]
    }

    fn home_page(&self, st: &ShopState) -> MockPage {
        let mut page = self
            .chrome(MockPage::new("Automation Exercise"), st)
            .with(HomePage::CATEGORY_TITLE, node("h2", "Category"))
            .with(
                HomePage::WOMEN_CATEGORY,
                node("a", "Women")
                    .on_click(MockAction::Show(HomePage::WOMEN_DRESS))
                    .on_click(MockAction::Show(HomePage::WOMEN_TOPS)),
            )
            .with(HomePage::WOMEN_DRESS, link("/category_products/1").text("Dress").hidden())
            .with(HomePage::WOMEN_TOPS, link("/category_products/2").text("Tops").hidden())
            .with(
                HomePage::MEN_CATEGORY,
                node("a", "Men").on_click(MockAction::Show(HomePage::MEN_TSHIRTS)),
            )
            .with(HomePage::MEN_TSHIRTS, link("/category_products/3").text("Tshirts").hidden())
            .with(HomePage::KIDS_CATEGORY, node("a", "Kids"))
            .with(HomePage::BRANDS_TITLE, node("h2", "Brands"));
        for (brand, _) in BRANDS {
            page.push(
                HomePage::brand_link(brand),
                link(&format!("/brand_products/{brand}")).text(*brand),
            );
        }
        page.push(HomePage::FEATURES_ITEMS_TITLE, node("h2", "Features Items"));
        let all: Vec<&'static Product> = CATALOGUE.iter().collect();
        let mut page = self.product_cards(page, &all);
        page.push(HomePage::RECOMMENDED_ITEMS_TITLE, node("h2", "recommended items"));
        Self::cart_modal(page)
    }

    fn listing(
        &self,
        st: &ShopState,
        title: &str,
        heading: (ElementQuery, &str),
        products: &[&'static Product],
        term: &str,
    ) -> MockPage {
        let (heading_query, heading_text) = heading;
        let mut page = self
            .chrome(MockPage::new(title), st)
            .with(heading_query, node("h2", heading_text))
            .with(ProductsPage::SEARCH_INPUT, input().attr("value", term))
            .with(
                ProductsPage::SEARCH_BUTTON,
                MockElement::new("button").on_click(self.handler(Self::on_search)),
            )
            .with(ProductsPage::CATEGORY_PANEL, MockElement::new("div"))
            .with(ProductsPage::BRANDS_PANEL, MockElement::new("div"));
        for (brand, count) in BRANDS {
            page.push(ProductsPage::BRAND_LINKS, node("a", format!("({count}){brand}")));
            page.push(
                ProductsPage::brand_link(brand),
                link(&format!("/brand_products/{brand}")),
            );
        }
        let mut page = self.product_cards(page, products);
        if products.is_empty() {
            page.push(ProductsPage::NO_PRODUCTS_MESSAGE, node("p", "No products found"));
        }
        Self::cart_modal(page)
    }

    fn render_cart(&self, w: &mut MockWorld, st: &ShopState) {
        let mut page = self
            .chrome(MockPage::new("Automation Exercise - Checkout"), st)
            .with(CartPage::BREADCRUMB, node("ol", "Home Shopping Cart"));
        if st.cart.is_empty() {
            page.push(CartPage::EMPTY_CART_MESSAGE, node("b", "Cart is empty!"));
            page.push(CartPage::BACK_TO_PRODUCTS, link(ProductsPage::PATH).text("here"));
        } else {
            page.push(CartPage::CART_TABLE, MockElement::new("table"));
            let mut total = 0;
            for row in &st.cart {
                let Some(p) = product(row.id) else { continue };
                let line = p.price * row.quantity;
                total += line;
                let id = row.id;
                page.push(CartPage::CART_ITEMS, MockElement::new("tr").attr("id", format!("product-{id}")));
                page.push(CartPage::PRODUCT_NAMES, node("a", p.name));
                page.push(CartPage::PRODUCT_PRICES, node("p", price(p.price)));
                page.push(CartPage::PRODUCT_QUANTITIES, node("button", row.quantity.to_string()));
                page.push(
                    CartPage::QUANTITY_INPUTS,
                    input()
                        .attr("value", row.quantity.to_string())
                        .attr("data-product-id", id.to_string())
                        .on_change(self.handler(move |site, w| site.set_quantity(w, id))),
                );
                page.push(CartPage::PRODUCT_TOTALS, node("p", price(line)));
                page.push(
                    CartPage::DELETE_BUTTONS,
                    MockElement::new("a").on_click(self.handler(move |site, w| site.remove_from_cart(w, id))),
                );
            }
            page.push(CartPage::TOTAL_AMOUNT, node("p", price(total)));
            page.push(
                CartPage::PROCEED_TO_CHECKOUT_BUTTON,
                link("/checkout").text("Proceed To Checkout"),
            );
        }
        *w.page_mut(CartPage::PATH) = page;
    }

    fn login_page(&self, st: &ShopState) -> MockPage {
        self.chrome(MockPage::new("Automation Exercise - Signup / Login"), st)
            .with(LoginPage::LOGIN_TO_ACCOUNT, node("h2", "Login to your account"))
            .with(LoginPage::LOGIN_EMAIL_INPUT, input())
            .with(LoginPage::LOGIN_PASSWORD_INPUT, input())
            .with(LoginPage::INCORRECT_LOGIN_ERROR, node("p", INCORRECT_LOGIN).hidden())
            .with(
                LoginPage::LOGIN_BUTTON,
                node("button", "Login").on_click(self.handler(Self::on_login)),
            )
            .with(LoginPage::NEW_USER_SIGNUP, node("h2", "New User Signup!"))
            .with(LoginPage::SIGNUP_NAME_INPUT, input())
            .with(LoginPage::SIGNUP_EMAIL_INPUT, input())
            .with(LoginPage::EMAIL_ALREADY_EXISTS_ERROR, node("p", EMAIL_EXISTS).hidden())
            .with(
                LoginPage::SIGNUP_BUTTON,
                node("button", "Signup").on_click(self.handler(Self::on_signup)),
            )
    }

    fn signup_page(&self, st: &ShopState, name: &str, email: &str) -> MockPage {
        let mut page = self
            .chrome(MockPage::new("Automation Exercise - Signup"), st)
            .with(SignupPage::ACCOUNT_INFO_TITLE, node("b", "Enter Account Information"))
            .with(SignupPage::TITLE_MR, input())
            .with(SignupPage::TITLE_MRS, input())
            .with(SignupPage::NAME_INPUT, input().attr("value", name))
            .with(SignupPage::EMAIL_INPUT, input().attr("value", email))
            .with(SignupPage::PASSWORD_INPUT, input())
            .with(
                SignupPage::BIRTH_DAY_SELECT,
                select((1..=31).map(|d| (d.to_string(), d.to_string()))),
            )
            .with(
                SignupPage::BIRTH_MONTH_SELECT,
                select(
                    MONTHS
                        .iter()
                        .enumerate()
                        .map(|(i, m)| ((i + 1).to_string(), (*m).to_string())),
                ),
            )
            .with(
                SignupPage::BIRTH_YEAR_SELECT,
                select((1900..=2021).rev().map(|y| (y.to_string(), y.to_string()))),
            )
            .with(SignupPage::NEWSLETTER_CHECKBOX, input())
            .with(SignupPage::SPECIAL_OFFERS_CHECKBOX, input())
            .with(SignupPage::ADDRESS_INFO_TITLE, node("b", "Address Information"))
            .with(SignupPage::FIRST_NAME_INPUT, input())
            .with(SignupPage::LAST_NAME_INPUT, input())
            .with(SignupPage::COMPANY_INPUT, input())
            .with(SignupPage::ADDRESS1_INPUT, input())
            .with(SignupPage::ADDRESS2_INPUT, input())
            .with(
                SignupPage::COUNTRY_SELECT,
                select(COUNTRIES.iter().map(|c| ((*c).to_string(), (*c).to_string())))
                    .attr("value", COUNTRIES[0])
                    .text(COUNTRIES[0]),
            );
        for country in COUNTRIES {
            page.push(
                SignupPage::COUNTRY_OPTIONS,
                MockElement::new("option")
                    .attr("value", *country)
                    .attr("textContent", *country),
            );
        }
        page.with(SignupPage::STATE_INPUT, input())
            .with(SignupPage::CITY_INPUT, input())
            .with(SignupPage::ZIPCODE_INPUT, input())
            .with(SignupPage::MOBILE_NUMBER_INPUT, input())
            .with(
                SignupPage::CREATE_ACCOUNT_BUTTON,
                node("button", "Create Account").on_click(self.handler(Self::on_create_account)),
            )
    }

    fn account_created_page(&self, st: &ShopState, name: &str) -> MockPage {
        let name = name.to_string();
        self.chrome(MockPage::new("Automation Exercise - Account Created"), st)
            .with(AccountCreatedPage::PAGE_TITLE, node("h2", "ACCOUNT CREATED!"))
            .with(AccountCreatedPage::SUCCESS_MESSAGE, node("b", "Account Created!"))
            .with(
                AccountCreatedPage::CONGRATULATIONS_MESSAGE,
                node("p", "Congratulations! Your new account has been successfully created!"),
            )
            .with(
                AccountCreatedPage::CONTINUE_BUTTON,
                node("a", "Continue").on_click(self.handler(move |site, w| site.on_continue(w, &name))),
            )
    }

    fn contact_page(&self, st: &ShopState) -> MockPage {
        self.chrome(MockPage::new("Automation Exercise - Contact Us"), st)
            .with(ContactUsPage::GET_IN_TOUCH_TITLE, node("h2", "Get In Touch"))
            .with(ContactUsPage::NAME_INPUT, input().attr("placeholder", "Name"))
            .with(ContactUsPage::EMAIL_INPUT, input().attr("placeholder", "Email"))
            .with(ContactUsPage::SUBJECT_INPUT, input().attr("placeholder", "Subject"))
            .with(
                ContactUsPage::MESSAGE_TEXTAREA,
                MockElement::new("textarea").attr("placeholder", "Your Message Here"),
            )
            .with(ContactUsPage::UPLOAD_FILE_INPUT, input().attr("type", "file"))
            .with(
                ContactUsPage::SUBMIT_BUTTON,
                input()
                    .attr("value", "Submit")
                    .on_click(self.handler(Self::on_contact_submit)),
            )
            .with(ContactUsPage::SUCCESS_MESSAGE, node("div", CONTACT_SUCCESS).hidden())
            .with(ContactUsPage::SUCCESS_TEXT, node("div", CONTACT_SUCCESS).hidden())
            .with(ContactUsPage::HOME_BUTTON, link(HomePage::PATH).text(" Home").hidden())
            .with(ContactUsPage::CONTACT_INFO, node("div", "Feedback For Us"))
    }

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    fn add_to_cart(&self, w: &mut MockWorld, id: u32, with_modal: bool) {
        let mut st = self.lock();
        match st.cart.iter_mut().find(|row| row.id == id) {
            Some(row) => row.quantity += 1,
            None => st.cart.push(CartRow { id, quantity: 1 }),
        }
        self.render_cart(w, &st);
        drop(st);
        if with_modal {
            show(w, &Self::modal_parts());
        }
    }

    fn remove_from_cart(&self, w: &mut MockWorld, id: u32) {
        let mut st = self.lock();
        st.cart.retain(|row| row.id != id);
        self.render_cart(w, &st);
    }

    /// Commit a typed quantity; anything but a positive number is ignored
    fn set_quantity(&self, w: &mut MockWorld, id: u32) {
        let key = id.to_string();
        let typed = w.current_page().and_then(|page| {
            page.matches(&CartPage::QUANTITY_INPUTS)
                .find(|e| e.attributes.get("data-product-id") == Some(&key))
                .and_then(|e| e.value().map(str::to_string))
        });
        let mut st = self.lock();
        if let (Some(row), Some(quantity)) = (
            st.cart.iter_mut().find(|row| row.id == id),
            typed.and_then(|t| t.trim().parse::<u32>().ok()).filter(|q| *q > 0),
        ) {
            row.quantity = quantity;
        }
        self.render_cart(w, &st);
    }

    fn on_search(&self, w: &mut MockWorld) {
        let term = w
            .value_of(&ProductsPage::SEARCH_INPUT)
            .unwrap_or_default()
            .trim()
            .to_string();
        let needle = term.to_lowercase();
        let found: Vec<&'static Product> = CATALOGUE.iter().filter(|p| p.matches(&needle)).collect();
        let url = format!("{}?search={}", ProductsPage::PATH, term.replace(' ', "+"));
        let st = self.lock();
        *w.page_mut(&url) = self.listing(
            &st,
            "Automation Exercise - All Products",
            (ProductsPage::SEARCHED_PRODUCTS_TITLE, "Searched Products"),
            &found,
            &term,
        );
        drop(st);
        w.navigate(&url);
    }

    fn on_login(&self, w: &mut MockWorld) {
        if !validate_required(w, &[LoginPage::LOGIN_EMAIL_INPUT, LoginPage::LOGIN_PASSWORD_INPUT]) {
            return;
        }
        let email = w.value_of(&LoginPage::LOGIN_EMAIL_INPUT).unwrap_or_default();
        let password = w.value_of(&LoginPage::LOGIN_PASSWORD_INPUT).unwrap_or_default();
        let mut st = self.lock();
        let name = st
            .accounts
            .get(email.trim())
            .filter(|a| a.password == password)
            .map(|a| a.name.clone());
        if let Some(name) = name {
            st.logged_in = Some(name);
            self.render_static(w, &st);
            self.render_cart(w, &st);
            drop(st);
            w.navigate(HomePage::PATH);
        } else {
            drop(st);
            show_form_error(w, &LoginPage::INCORRECT_LOGIN_ERROR, INCORRECT_LOGIN);
        }
    }

    fn on_signup(&self, w: &mut MockWorld) {
        if !validate_required(w, &[LoginPage::SIGNUP_NAME_INPUT, LoginPage::SIGNUP_EMAIL_INPUT])
            || !validate_email(w, &LoginPage::SIGNUP_EMAIL_INPUT)
        {
            return;
        }
        let name = w.value_of(&LoginPage::SIGNUP_NAME_INPUT).unwrap_or_default();
        let email = w.value_of(&LoginPage::SIGNUP_EMAIL_INPUT).unwrap_or_default();
        let st = self.lock();
        if st.accounts.contains_key(email.trim()) {
            drop(st);
            show_form_error(w, &LoginPage::EMAIL_ALREADY_EXISTS_ERROR, EMAIL_EXISTS);
            return;
        }
        *w.page_mut(SignupPage::PATH) = self.signup_page(&st, name.trim(), email.trim());
        drop(st);
        w.navigate(SignupPage::PATH);
    }

    fn on_create_account(&self, w: &mut MockWorld) {
        let required = [
            SignupPage::PASSWORD_INPUT,
            SignupPage::FIRST_NAME_INPUT,
            SignupPage::LAST_NAME_INPUT,
            SignupPage::ADDRESS1_INPUT,
            SignupPage::STATE_INPUT,
            SignupPage::CITY_INPUT,
            SignupPage::ZIPCODE_INPUT,
            SignupPage::MOBILE_NUMBER_INPUT,
        ];
        if !validate_required(w, &required) {
            return;
        }
        let name = w.value_of(&SignupPage::NAME_INPUT).unwrap_or_default();
        let email = w.value_of(&SignupPage::EMAIL_INPUT).unwrap_or_default();
        let password = w.value_of(&SignupPage::PASSWORD_INPUT).unwrap_or_default();
        let mut st = self.lock();
        st.accounts.insert(
            email,
            Account {
                name: name.clone(),
                password,
            },
        );
        *w.page_mut(AccountCreatedPage::PATH) = self.account_created_page(&st, &name);
        drop(st);
        w.navigate(AccountCreatedPage::PATH);
    }

    fn on_continue(&self, w: &mut MockWorld, name: &str) {
        let mut st = self.lock();
        st.logged_in = Some(name.to_string());
        self.render_static(w, &st);
        self.render_cart(w, &st);
        drop(st);
        w.navigate(HomePage::PATH);
    }

    fn on_logout(&self, w: &mut MockWorld) {
        let mut st = self.lock();
        st.logged_in = None;
        self.render_static(w, &st);
        self.render_cart(w, &st);
        drop(st);
        w.navigate(LoginPage::PATH);
    }

    fn on_subscribe(&self, w: &mut MockWorld) {
        if !validate_email(w, &HomePage::SUBSCRIBE_EMAIL) {
            return;
        }
        let email = w.value_of(&HomePage::SUBSCRIBE_EMAIL).unwrap_or_default();
        self.lock().subscribers.push(email);
        show(w, &[HomePage::SUBSCRIBE_SUCCESS]);
    }

    fn on_contact_submit(&self, w: &mut MockWorld) {
        if !validate_required(w, &[ContactUsPage::NAME_INPUT, ContactUsPage::EMAIL_INPUT]) {
            return;
        }
        if !validate_email(w, &ContactUsPage::EMAIL_INPUT) {
            return;
        }
        self.lock().messages += 1;
        w.open_dialog(CONFIRM_SUBMIT);
        show(
            w,
            &[
                ContactUsPage::SUCCESS_MESSAGE,
                ContactUsPage::SUCCESS_TEXT,
                ContactUsPage::HOME_BUTTON,
            ],
        );
    }
}

/// A [`Site`] with a session attached, for tests
#[derive(Debug)]
pub struct Storefront {
    site: Site,
    driver: Arc<MockDriver>,
    context: TestContext,
}

impl Storefront {
    /// Fresh shop with the browser on the home page
    pub async fn start() -> Self {
        let site = Site::new();
        let driver = site.driver(ORIGIN);
        let reports = std::env::temp_dir().join(format!("shopcheck-{}", Uuid::new_v4().simple()));
        let session = Session::attach("storefront", driver.clone(), Arc::new(Self::settings(reports)));
        if let Err(e) = session.driver().navigate(HomePage::PATH).await {
            tracing::warn!(target: "shopcheck::mock", error = %e, "storefront did not open the home page");
        }
        Self {
            site,
            driver,
            context: TestContext::new(session),
        }
    }

    /// Settings pointing at the storefront, with short waits and artifacts
    /// under `reports`
    #[must_use]
    pub fn settings(reports: PathBuf) -> Settings {
        let data = DataManager::in_dir(&reports.join("data")).files().clone();
        Settings {
            base_url: ORIGIN.to_string(),
            browser: BrowserConfig {
                headless: true,
                implicit_wait: Duration::from_secs(1),
                page_load_timeout: Duration::from_secs(1),
                ..BrowserConfig::default()
            },
            explicit_wait: Duration::from_secs(1),
            reports_dir: reports,
            data,
            ..Settings::default()
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        self.context.session()
    }

    #[must_use]
    pub const fn context(&self) -> &TestContext {
        &self.context
    }

    #[must_use]
    pub const fn driver(&self) -> &Arc<MockDriver> {
        &self.driver
    }

    #[must_use]
    pub const fn site(&self) -> &Site {
        &self.site
    }

    /// URL the browser is on
    #[must_use]
    pub fn url(&self) -> String {
        self.driver.inspect(|w| w.current_url().to_string())
    }

    /// Product names in the cart
    #[must_use]
    pub fn cart(&self) -> Vec<String> {
        self.site.cart_names()
    }

    /// Put a catalogue product in the cart without going through the UI
    pub fn put_in_cart(&self, name: &str) {
        match CATALOGUE.iter().find(|p| p.name == name) {
            Some(p) => self.driver.update(|w| self.site.add_to_cart(w, p.id, false)),
            None => tracing::warn!(target: "shopcheck::mock", name, "no such product in the storefront"),
        }
    }

    pub fn register_account(&self, name: &str, email: &str, password: &str) {
        self.site.add_account(name, email, password);
    }

    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        self.site.has_account(email)
    }

    /// Close the session and remove the artifacts
    pub async fn finish(self) {
        if let Err(e) = self.context.close("passed").await {
            tracing::warn!(target: "shopcheck::mock", error = %e, "storefront session did not close");
        }
        let reports = &self.context.settings().reports_dir;
        if reports.exists() {
            if let Err(e) = std::fs::remove_dir_all(reports) {
                tracing::debug!(target: "shopcheck::mock", path = %reports.display(), error = %e, "cannot remove storefront reports");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::driver::BrowserDriver;

    #[test]
    fn test_catalogue_search() {
        let dresses: Vec<&str> = CATALOGUE
            .iter()
            .filter(|p| p.matches("dress"))
            .map(|p| p.name)
            .collect();
        assert_eq!(dresses, vec!["Sleeveless Dress", "Stylish Dress"]);
        assert!(CATALOGUE.iter().all(|p| BRANDS.iter().any(|(b, _)| *b == p.brand)));
    }

    #[tokio::test]
    async fn test_cart_page_follows_state() {
        let site = Site::new();
        let driver = site.driver(ORIGIN);
        driver.navigate(CartPage::PATH).await.unwrap();
        assert_eq!(driver.observe(&CartPage::EMPTY_CART_MESSAGE).await.unwrap().len(), 1);

        driver.update(|w| site.add_to_cart(w, 1, false));
        driver.update(|w| site.add_to_cart(w, 1, false));
        driver.reload().await.unwrap();
        assert_eq!(driver.observe(&CartPage::CART_ITEMS).await.unwrap().len(), 1);
        assert_eq!(
            driver.read_text(&CartPage::PRODUCT_TOTALS, 0).await.unwrap(),
            "Rs. 1000"
        );

        driver.click(&CartPage::DELETE_BUTTONS, 0).await.unwrap();
        assert!(driver.observe(&CartPage::CART_ITEMS).await.unwrap().is_empty());
        assert!(site.cart_names().is_empty());
    }

    #[tokio::test]
    async fn test_login_marks_header() {
        let site = Site::new();
        site.add_account("Asha", "asha@example.com", "secret1");
        let driver = site.driver(ORIGIN);
        driver.navigate(LoginPage::PATH).await.unwrap();
        driver.type_text(&LoginPage::LOGIN_EMAIL_INPUT, 0, "asha@example.com", true).await.unwrap();
        driver.type_text(&LoginPage::LOGIN_PASSWORD_INPUT, 0, "secret1", true).await.unwrap();
        driver.click(&LoginPage::LOGIN_BUTTON, 0).await.unwrap();

        assert_eq!(driver.current_url().await.unwrap(), format!("{ORIGIN}/"));
        assert_eq!(site.logged_in_as().as_deref(), Some("Asha"));
        assert_eq!(
            driver.read_text(&HomePage::LOGGED_IN_AS, 0).await.unwrap(),
            "Logged in as Asha"
        );

        driver.click(&HomePage::LOGOUT_LINK, 0).await.unwrap();
        assert!(site.logged_in_as().is_none());
        assert!(driver.current_url().await.unwrap().ends_with(LoginPage::PATH));
    }

    #[tokio::test]
    async fn test_empty_login_sets_validation_message() {
        let site = Site::new();
        let driver = site.driver(ORIGIN);
        driver.navigate(LoginPage::PATH).await.unwrap();
        driver.click(&LoginPage::LOGIN_BUTTON, 0).await.unwrap();
        assert_eq!(
            driver
                .read_attribute(&LoginPage::LOGIN_EMAIL_INPUT, 0, "validationMessage")
                .await
                .unwrap()
                .as_deref(),
            Some(REQUIRED)
        );
        assert!(driver.current_url().await.unwrap().ends_with(LoginPage::PATH));
    }

    #[tokio::test]
    async fn test_subscribe_records_email() {
        let site = Site::new();
        let driver = site.driver(ORIGIN);
        driver.navigate(HomePage::PATH).await.unwrap();
        driver.type_text(&HomePage::SUBSCRIBE_EMAIL, 0, "no-at-sign", true).await.unwrap();
        driver.click(&HomePage::SUBSCRIBE_BUTTON, 0).await.unwrap();
        assert!(site.subscribers().is_empty());

        driver.type_text(&HomePage::SUBSCRIBE_EMAIL, 0, "reader@example.com", true).await.unwrap();
        driver.click(&HomePage::SUBSCRIBE_BUTTON, 0).await.unwrap();
        assert_eq!(site.subscribers(), vec!["reader@example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_storefront_starts_on_home() {
        let shop = Storefront::start().await;
        assert_eq!(shop.url(), format!("{ORIGIN}/"));
        assert!(shop.session().settings().reports_dir.starts_with(std::env::temp_dir()));
        shop.put_in_cart("Winter Top");
        shop.put_in_cart("No Such Thing");
        assert_eq!(shop.cart(), vec!["Winter Top".to_string()]);
        shop.finish().await;
    }
}
