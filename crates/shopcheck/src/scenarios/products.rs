//! Product listing: search, the add-to-cart modal, category and brand
//! panels.

use super::{current_url, lands_on, loaded, timed, Marker, Scenario, ScenarioFuture};
use crate::fixture::TestContext;
use crate::logging;
use crate::page_object::PageObject;
use crate::pages::{CartPage, ProductsPage};
use crate::result::ShopResult;
use std::time::Duration;

/// Search terms and whether the catalogue should return products for them
const SEARCH_CASES: &[(&str, bool)] = &[
    ("top", true),
    ("dress", true),
    ("tshirt", true),
    ("jeans", true),
    ("saree", true),
    ("kids", true),
    ("nonexistent", false),
];

const SPECIAL_SEARCHES: &[&str] = &["@#$%", "123", "   ", "!@#$%^&*()"];

const PAGE_LOAD_BUDGET: Duration = Duration::from_secs(15);
const SEARCH_BUDGET: Duration = Duration::from_secs(10);

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "page_loads",
        group: "products",
        markers: &[Marker::Smoke, Marker::Product],
        run: page_loads,
    },
    Scenario {
        name: "view_product_details",
        group: "products",
        markers: &[Marker::Product],
        run: view_product_details,
    },
    Scenario {
        name: "search_basic",
        group: "products",
        markers: &[Marker::Smoke, Marker::Product],
        run: search_basic,
    },
    Scenario {
        name: "search_dress_end_to_end",
        group: "products",
        markers: &[Marker::Smoke, Marker::Product, Marker::Regression],
        run: search_dress_end_to_end,
    },
    Scenario {
        name: "search_terms",
        group: "products",
        markers: &[Marker::Product],
        run: search_terms,
    },
    Scenario {
        name: "empty_search",
        group: "products",
        markers: &[Marker::Product],
        run: empty_search,
    },
    Scenario {
        name: "special_character_search",
        group: "products",
        markers: &[Marker::Product, Marker::Regression],
        run: special_character_search,
    },
    Scenario {
        name: "add_to_cart_from_listing",
        group: "products",
        markers: &[Marker::Smoke, Marker::Cart],
        run: add_to_cart_from_listing,
    },
    Scenario {
        name: "continue_shopping",
        group: "products",
        markers: &[Marker::Cart],
        run: continue_shopping,
    },
    Scenario {
        name: "category_panel",
        group: "products",
        markers: &[Marker::Product],
        run: category_panel,
    },
    Scenario {
        name: "brands_panel",
        group: "products",
        markers: &[Marker::Product],
        run: brands_panel,
    },
    Scenario {
        name: "brand_filtering",
        group: "products",
        markers: &[Marker::Product],
        run: brand_filtering,
    },
    Scenario {
        name: "hover_effect",
        group: "products",
        markers: &[Marker::Product],
        run: hover_effect,
    },
    Scenario {
        name: "page_performance",
        group: "products",
        markers: &[Marker::Slow],
        run: page_performance,
    },
    Scenario {
        name: "search_response_time",
        group: "products",
        markers: &[Marker::Slow],
        run: search_response_time,
    },
    Scenario {
        name: "refresh_recovery",
        group: "products",
        markers: &[Marker::Regression],
        run: refresh_recovery,
    },
    Scenario {
        name: "data_integrity",
        group: "products",
        markers: &[Marker::Product],
        run: data_integrity,
    },
];

async fn open_products(ctx: &TestContext) -> ShopResult<ProductsPage> {
    loaded(ctx, ctx.navigate_to_products().await?).await
}

fn page_loads(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        ctx.ensure(
            products.verify_all_products_title().await?,
            "'All Products' title not visible",
        )
        .await?;
        ctx.ensure(products.verify_products_visible().await?, "no products visible")
            .await?;
        let count = products.product_count().await?;
        ctx.ensure(count > 0, format!("expected products, found {count}"))
            .await
    })
}

fn view_product_details(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        products.view_product_details(0).await?;
        let (arrived, url) = lands_on(ctx, "/product_details/").await?;
        ctx.ensure(arrived, format!("view product led to {url}")).await
    })
}

fn search_basic(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        products.search_product("top").await?;
        ctx.ensure(
            products.verify_searched_products_title().await?,
            "'Searched Products' title not visible",
        )
        .await?;
        ctx.ensure(products.verify_products_visible().await?, "search returned nothing")
            .await?;
        ctx.ensure(
            products.verify_search_results_contain_term("top").await?,
            "no result mentions 'top'",
        )
        .await
    })
}

/// Search "dress": the searched title shows and a result names a dress
fn search_dress_end_to_end(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let found = ctx.perform_search("dress").await?;
        ctx.ensure(found, "searching 'dress' listed no products").await?;
        let products = ctx.products();
        ctx.ensure(
            products.verify_searched_products_title().await?,
            "'Searched Products' title not visible",
        )
        .await?;
        let names = products.product_names().await?;
        ctx.ensure(
            names.iter().any(|n| n.to_lowercase().contains("dress")),
            format!("no result contains 'dress': {names:?}"),
        )
        .await
    })
}

fn search_terms(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        for &(term, expect_results) in SEARCH_CASES {
            logging::step(&format!("Search case: '{term}'"));
            let products = open_products(ctx).await?;
            products.search_product(term).await?;
            ctx.ensure(
                products.verify_searched_products_title().await?,
                format!("'Searched Products' title missing for '{term}'"),
            )
            .await?;
            let has_results = products.verify_products_visible().await?;
            if expect_results {
                ctx.ensure(has_results, format!("'{term}' returned no products"))
                    .await?;
                ctx.ensure(
                    products.verify_search_results_contain_term(term).await?,
                    format!("no result mentions '{term}'"),
                )
                .await?;
            } else {
                tracing::info!(target: "shopcheck::scenarios", term, has_results, "search without expected results");
            }
        }
        Ok(())
    })
}

fn empty_search(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        products.search_product("").await?;
        ctx.ensure(
            products
                .base()
                .verify_element_visible(&ProductsPage::SEARCH_INPUT)
                .await?,
            "search box gone after an empty search",
        )
        .await
    })
}

fn special_character_search(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        for term in SPECIAL_SEARCHES {
            let products = open_products(ctx).await?;
            products.search_product(term).await?;
            ctx.ensure(
                products
                    .base()
                    .verify_element_visible(&ProductsPage::SEARCH_INPUT)
                    .await?,
                format!("page unusable after searching '{term}'"),
            )
            .await?;
        }
        Ok(())
    })
}

fn add_to_cart_from_listing(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        products.add_product_to_cart_by_index(0).await?;
        ctx.ensure(
            products.verify_add_to_cart_modal().await?,
            "add-to-cart modal did not appear",
        )
        .await?;
        products.view_cart_from_modal().await?;
        let (arrived, url) = lands_on(ctx, CartPage::PATH).await?;
        ctx.ensure(arrived, format!("view cart led to {url}")).await?;
        ctx.ensure(ctx.cart().verify_cart_has_items().await?, "cart is empty")
            .await
    })
}

fn continue_shopping(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        products.add_product_to_cart_by_index(0).await?;
        ctx.ensure(
            products.verify_add_to_cart_modal().await?,
            "add-to-cart modal did not appear",
        )
        .await?;
        products.continue_shopping().await?;
        let url = current_url(ctx).await?;
        ctx.ensure(
            url.contains(ProductsPage::PATH),
            format!("continue shopping left the listing: {url}"),
        )
        .await?;
        ctx.ensure(
            products
                .base()
                .verify_element_not_visible(&ProductsPage::CART_MODAL)
                .await?,
            "modal still open after continue shopping",
        )
        .await
    })
}

fn category_panel(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        ctx.ensure(
            products.verify_category_panel_visible().await?,
            "category panel not visible",
        )
        .await
    })
}

fn brands_panel(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        ctx.ensure(
            products.verify_brands_panel_visible().await?,
            "brands panel not visible",
        )
        .await?;
        let brands = products.brand_names().await?;
        ctx.ensure(!brands.is_empty(), "no brands listed").await
    })
}

fn brand_filtering(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        products.click_brand_by_name("Polo").await?;
        let (arrived, url) = lands_on(ctx, "/brand_products/Polo").await?;
        ctx.ensure(arrived, format!("brand Polo led to {url}")).await
    })
}

fn hover_effect(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        products.hover_over_product(0).await?;
        ctx.ensure(
            products
                .base()
                .verify_element_visible(&ProductsPage::ALL_PRODUCTS_TITLE)
                .await?,
            "listing broken after hovering a product",
        )
        .await
    })
}

fn page_performance(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let (visible, elapsed) = timed("Products page load time", async {
            let products = open_products(ctx).await?;
            products.verify_products_visible().await
        })
        .await?;
        ctx.ensure(visible, "products never became visible").await?;
        ctx.ensure(
            elapsed < PAGE_LOAD_BUDGET,
            format!("products page took {:.2}s", elapsed.as_secs_f64()),
        )
        .await
    })
}

fn search_response_time(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        let (titled, elapsed) = timed("Search response time", async {
            products.search_product("top").await?;
            products.verify_searched_products_title().await
        })
        .await?;
        ctx.ensure(titled, "search results never showed").await?;
        ctx.ensure(
            elapsed < SEARCH_BUDGET,
            format!("search took {:.2}s", elapsed.as_secs_f64()),
        )
        .await
    })
}

fn refresh_recovery(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        products.base().ui().refresh().await?;
        products.base().ui().wait_for_page_load(None).await?;
        ctx.ensure(
            products.verify_all_products_title().await?,
            "listing did not recover after a reload",
        )
        .await
    })
}

fn data_integrity(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = open_products(ctx).await?;
        let names = products.product_names().await?;
        let prices = products.product_prices().await?;
        ctx.ensure(!names.is_empty(), "no product names").await?;
        ctx.ensure(
            names.iter().all(|n| !n.trim().is_empty()),
            format!("blank product name in {names:?}"),
        )
        .await?;
        ctx.ensure(!prices.is_empty(), "no product prices").await?;
        let malformed: Vec<&String> = prices
            .iter()
            .filter(|p| !(p.contains("Rs.") || p.contains('$') || p.contains('₹')))
            .collect();
        ctx.ensure(malformed.is_empty(), format!("malformed prices: {malformed:?}"))
            .await?;
        if names.len() != prices.len() {
            tracing::warn!(target: "shopcheck::scenarios", names = names.len(), prices = prices.len(), "name and price counts differ");
        }
        Ok(())
    })
}
