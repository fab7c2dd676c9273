//! Storefront page objects.
//!
//! One type per logical page, each a [`BasePage`](crate::page_object::BasePage)
//! plus the element queries and verbs of that page.

mod account_created;
mod cart;
mod contact_us;
mod home;
mod login;
mod products;
mod signup;

pub use account_created::AccountCreatedPage;
pub use cart::{parse_price, CartPage, CartSummary};
pub use contact_us::ContactUsPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use products::ProductsPage;
pub use signup::{SignupPage, Title};
