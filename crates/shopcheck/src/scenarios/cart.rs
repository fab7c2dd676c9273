//! Shopping cart: adding from home and the listing, row removal, quantities,
//! totals and persistence across pages.

use super::{lands_on, loaded, timed, Marker, Scenario, ScenarioFuture};
use crate::fixture::TestContext;
use crate::logging;
use crate::pages::{parse_price, CartPage};
use crate::result::ShopResult;
use std::time::Duration;

const OPERATIONS_BUDGET: Duration = Duration::from_secs(20);
const CAPACITY_ATTEMPTS: usize = 5;

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "page_loads",
        group: "cart",
        markers: &[Marker::Smoke, Marker::Cart],
        run: page_loads,
    },
    Scenario {
        name: "empty_cart_display",
        group: "cart",
        markers: &[Marker::Cart],
        run: empty_cart_display,
    },
    Scenario {
        name: "add_from_home",
        group: "cart",
        markers: &[Marker::Smoke, Marker::Cart],
        run: add_from_home,
    },
    Scenario {
        name: "add_from_products_page",
        group: "cart",
        markers: &[Marker::Cart],
        run: add_from_products_page,
    },
    Scenario {
        name: "remove_product",
        group: "cart",
        markers: &[Marker::Cart],
        run: remove_product,
    },
    Scenario {
        name: "product_information",
        group: "cart",
        markers: &[Marker::Cart],
        run: product_information,
    },
    Scenario {
        name: "update_quantity",
        group: "cart",
        markers: &[Marker::Cart],
        run: update_quantity,
    },
    Scenario {
        name: "add_multiple_products",
        group: "cart",
        markers: &[Marker::Cart],
        run: add_multiple_products,
    },
    Scenario {
        name: "proceed_to_checkout",
        group: "cart",
        markers: &[Marker::Cart],
        run: proceed_to_checkout,
    },
    Scenario {
        name: "total_amount",
        group: "cart",
        markers: &[Marker::Cart],
        run: total_amount,
    },
    Scenario {
        name: "clear_cart",
        group: "cart",
        markers: &[Marker::Cart],
        run: clear_cart,
    },
    Scenario {
        name: "persistence",
        group: "cart",
        markers: &[Marker::Cart],
        run: persistence,
    },
    Scenario {
        name: "operations_performance",
        group: "cart",
        markers: &[Marker::Slow],
        run: operations_performance,
    },
    Scenario {
        name: "capacity_limits",
        group: "cart",
        markers: &[Marker::Cart, Marker::Slow],
        run: capacity_limits,
    },
];

async fn open_cart(ctx: &TestContext) -> ShopResult<CartPage> {
    loaded(ctx, ctx.navigate_to_cart().await?).await
}

/// Add the first listed product; fails the scenario when the modal never
/// confirms it
async fn seed_cart(ctx: &TestContext) -> ShopResult<()> {
    let added = ctx.add_product_to_cart(0).await?;
    ctx.ensure(added, "adding a product to the cart failed").await
}

fn page_loads(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let cart = open_cart(ctx).await?;
        let checks = cart.verify_cart_page_elements().await?;
        let missing: Vec<&String> = checks
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(name, _)| name)
            .collect();
        ctx.ensure(missing.is_empty(), format!("cart page is missing {missing:?}"))
            .await
    })
}

fn empty_cart_display(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let cart = open_cart(ctx).await?;
        if cart.verify_cart_has_items().await? {
            cart.clear_cart().await?;
        }
        ctx.ensure(cart.verify_cart_is_empty().await?, "cart should be empty")
            .await
    })
}

/// Add the first home product: the cart holds at least one row and names it
fn add_from_home(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let home = loaded(ctx, ctx.navigate_to_home().await?).await?;
        let names = home.product_names().await?;
        let Some(first) = names.first().cloned() else {
            return ctx.skip("home page lists no products");
        };
        logging::step(&format!("Product to add: {first}"));
        home.add_product_to_cart(0).await?;

        let cart = open_cart(ctx).await?;
        let count = cart.cart_items_count().await?;
        ctx.ensure(count >= 1, format!("expected a cart row, found {count}"))
            .await?;
        let in_cart = cart.product_names_in_cart().await?;
        ctx.ensure(
            in_cart.iter().any(|n| n.contains(&first)),
            format!("cart should hold '{first}', holds {in_cart:?}"),
        )
        .await
    })
}

fn add_from_products_page(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let products = loaded(ctx, ctx.navigate_to_products().await?).await?;
        let names = products.product_names().await?;
        let Some(first) = names.first().cloned() else {
            return ctx.skip("listing shows no products");
        };
        products.add_product_to_cart_by_index(0).await?;
        if products.verify_add_to_cart_modal().await? {
            products.view_cart_from_modal().await?;
        } else {
            ctx.navigate_to_cart().await?;
        }

        let cart = ctx.cart();
        ctx.ensure(cart.verify_cart_has_items().await?, "cart is empty")
            .await?;
        ctx.ensure(
            cart.verify_product_in_cart(&first).await?,
            format!("cart should hold '{first}'"),
        )
        .await
    })
}

fn remove_product(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        seed_cart(ctx).await?;
        let cart = open_cart(ctx).await?;
        ctx.ensure(cart.verify_cart_has_items().await?, "cart is empty")
            .await?;
        let before = cart.cart_items_count().await?;
        cart.delete_product_by_index(0).await?;
        let after = cart.cart_items_count().await?;
        ctx.ensure(
            after < before,
            format!("row count should drop: {before} before, {after} after"),
        )
        .await
    })
}

fn product_information(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        seed_cart(ctx).await?;
        let cart = open_cart(ctx).await?;
        let summary = cart.cart_summary().await?;
        ctx.ensure(!summary.product_names.is_empty(), "cart shows no product names")
            .await?;
        ctx.ensure(
            summary.product_names.iter().all(|n| !n.trim().is_empty()),
            format!("blank product name in {:?}", summary.product_names),
        )
        .await?;

        let prices = cart.product_prices_in_cart().await?;
        ctx.ensure(!prices.is_empty(), "cart shows no prices").await?;
        ctx.ensure(
            prices.iter().all(|p| p.contains("Rs.") || p.contains('$')),
            format!("malformed prices: {prices:?}"),
        )
        .await?;

        let quantities = cart.product_quantities_in_cart().await?;
        ctx.ensure(!quantities.is_empty(), "cart shows no quantities")
            .await?;
        ctx.ensure(
            quantities
                .iter()
                .all(|q| q.trim().parse::<u32>().is_ok_and(|n| n > 0)),
            format!("quantities should be positive integers: {quantities:?}"),
        )
        .await
    })
}

/// Set the first row to 2 and require the reloaded cart to show 2. A cart
/// without an editable quantity field skips.
fn update_quantity(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        seed_cart(ctx).await?;
        let cart = open_cart(ctx).await?;
        if cart.product_quantities_in_cart().await?.is_empty() {
            return ctx.skip("cart has no rows");
        }
        if !cart.has_editable_quantities().await? {
            return ctx.skip("cart renders quantities read-only");
        }
        let updated = cart.update_product_quantity(0, 2).await?;
        ctx.ensure(updated, "reloaded cart does not show quantity 2").await
    })
}

fn add_multiple_products(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.cleanup().await?;
        let home = loaded(ctx, ctx.navigate_to_home().await?).await?;
        home.add_product_to_cart(0).await?;
        let products = ctx.products();
        if products.verify_add_to_cart_modal().await? {
            products.continue_shopping().await?;
        }
        home.add_product_to_cart(1).await?;

        let cart = open_cart(ctx).await?;
        let count = cart.cart_items_count().await?;
        ctx.ensure(count >= 2, format!("expected at least 2 rows, found {count}"))
            .await
    })
}

fn proceed_to_checkout(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        seed_cart(ctx).await?;
        let cart = open_cart(ctx).await?;
        let checks = cart.verify_cart_page_elements().await?;
        ctx.ensure(
            checks.get("proceed_to_checkout").copied().unwrap_or(false),
            "checkout button not visible",
        )
        .await?;
        cart.proceed_to_checkout().await?;
        let (at_checkout, url) = lands_on(ctx, "/checkout").await?;
        ctx.ensure(
            at_checkout || url.contains("/login"),
            format!("checkout should lead to /checkout or /login, got {url}"),
        )
        .await
    })
}

fn total_amount(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        seed_cart(ctx).await?;
        let cart = open_cart(ctx).await?;
        let total = cart.total_amount().await?;
        if total.is_empty() {
            logging::step("Cart shows no total; nothing to check");
            return Ok(());
        }
        ctx.ensure(
            total.contains("Rs.") || total.contains('$'),
            format!("malformed total: '{total}'"),
        )
        .await?;
        let line_sum: u64 = cart
            .product_totals_in_cart()
            .await?
            .iter()
            .filter_map(|t| parse_price(t))
            .sum();
        ctx.ensure(
            parse_price(&total) == Some(line_sum),
            format!("total {total} does not match line totals {line_sum}"),
        )
        .await
    })
}

fn clear_cart(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        seed_cart(ctx).await?;
        let cart = open_cart(ctx).await?;
        ctx.ensure(cart.verify_cart_has_items().await?, "cart is empty")
            .await?;
        cart.clear_cart().await?;
        ctx.ensure(cart.verify_cart_is_empty().await?, "cart should be empty")
            .await
    })
}

fn persistence(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        seed_cart(ctx).await?;
        let cart = open_cart(ctx).await?;
        let names_before = cart.product_names_in_cart().await?;
        let count_before = cart.cart_items_count().await?;

        ctx.navigate_to_home().await?;
        let cart = open_cart(ctx).await?;
        let names_after = cart.product_names_in_cart().await?;
        let count_after = cart.cart_items_count().await?;
        ctx.ensure(
            count_after == count_before,
            format!("row count changed from {count_before} to {count_after}"),
        )
        .await?;
        ctx.ensure(
            names_after == names_before,
            format!("cart changed from {names_before:?} to {names_after:?}"),
        )
        .await
    })
}

fn operations_performance(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let (added, add_time) = timed("Add to cart time", ctx.add_product_to_cart(0)).await?;
        ctx.ensure(added, "adding a product failed").await?;
        let (cart, load_time) = timed("Cart page load time", open_cart(ctx)).await?;
        if cart.verify_cart_has_items().await? {
            timed("Delete from cart time", cart.delete_product_by_index(0)).await?;
        }
        let total = add_time + load_time;
        ctx.ensure(
            total < OPERATIONS_BUDGET,
            format!("cart operations took {:.2}s", total.as_secs_f64()),
        )
        .await
    })
}

fn capacity_limits(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.cleanup().await?;
        for attempt in 1..=CAPACITY_ATTEMPTS {
            match ctx.add_product_to_cart(0).await {
                Ok(true) => logging::step(&format!("Added item {attempt}")),
                Ok(false) => tracing::warn!(target: "shopcheck::scenarios", attempt, "add not confirmed"),
                Err(err) if err.is_assertion() => return Err(err),
                Err(err) => {
                    tracing::warn!(target: "shopcheck::scenarios", attempt, %err, "add failed");
                    break;
                }
            }
        }
        let cart = open_cart(ctx).await?;
        let rows = cart.cart_items_count().await?;
        logging::step(&format!("Cart rows after {CAPACITY_ATTEMPTS} adds: {rows}"));
        ctx.ensure(
            cart.verify_cart_page_loaded().await?,
            "cart page unusable after repeated adds",
        )
        .await
    })
}
