//! Home page: layout, header navigation, categories, brands and the
//! newsletter footer.

use super::{lands_on, loaded, Marker, Scenario, ScenarioFuture};
use crate::data::generate_random_email;
use crate::fixture::TestContext;
use crate::page_object::PageObject;
use crate::pages::HomePage;

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "page_loads",
        group: "home",
        markers: &[Marker::Smoke],
        run: page_loads,
    },
    Scenario {
        name: "navigation_links",
        group: "home",
        markers: &[Marker::Navigation],
        run: navigation_links,
    },
    Scenario {
        name: "products_display",
        group: "home",
        markers: &[Marker::Product],
        run: products_display,
    },
    Scenario {
        name: "category_navigation",
        group: "home",
        markers: &[Marker::Product],
        run: category_navigation,
    },
    Scenario {
        name: "brand_navigation",
        group: "home",
        markers: &[Marker::Product],
        run: brand_navigation,
    },
    Scenario {
        name: "email_subscription",
        group: "home",
        markers: &[Marker::Subscription],
        run: email_subscription,
    },
    Scenario {
        name: "recommended_items",
        group: "home",
        markers: &[Marker::Product],
        run: recommended_items,
    },
    Scenario {
        name: "page_scrolling",
        group: "home",
        markers: &[Marker::Navigation],
        run: page_scrolling,
    },
    Scenario {
        name: "script_error_recovery",
        group: "home",
        markers: &[Marker::Regression],
        run: script_error_recovery,
    },
];

fn page_loads(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let home = loaded(ctx, ctx.navigate_to_home().await?).await?;
        let title = home.base().ui().title().await?;
        ctx.ensure(
            title.contains("Automation Exercise"),
            format!("unexpected page title: {title}"),
        )
        .await?;
        ctx.ensure(
            home.base().verify_element_visible(&HomePage::LOGO).await?,
            "logo not visible",
        )
        .await?;
        ctx.ensure(
            home.base()
                .verify_element_visible(&HomePage::FEATURES_ITEMS_TITLE)
                .await?,
            "features items section not visible",
        )
        .await
    })
}

fn navigation_links(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        loaded(ctx, ctx.navigate_to_home().await?).await?;
        let links = ctx.home().navigation_links().await?;
        let missing: Vec<&String> = links
            .iter()
            .filter(|(_, visible)| !**visible)
            .map(|(name, _)| name)
            .collect();
        ctx.ensure(missing.is_empty(), format!("header links not visible: {missing:?}"))
            .await?;

        ctx.home().click_products_link().await?;
        let (arrived, url) = lands_on(ctx, "/products").await?;
        ctx.ensure(arrived, format!("products link led to {url}")).await?;

        ctx.navigate_to_home().await?.click_signup_login_link().await?;
        let (arrived, url) = lands_on(ctx, "/login").await?;
        ctx.ensure(arrived, format!("signup/login link led to {url}")).await?;

        ctx.navigate_to_home().await?.click_contact_us_link().await?;
        let (arrived, url) = lands_on(ctx, "/contact_us").await?;
        ctx.ensure(arrived, format!("contact link led to {url}")).await
    })
}

fn products_display(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let home = loaded(ctx, ctx.navigate_to_home().await?).await?;
        let count = home.product_count().await?;
        ctx.ensure(count > 0, "home page lists no products").await?;
        let names = home.product_names().await?;
        ctx.ensure(!names.is_empty(), "no product names read").await?;
        let prices = home.product_prices().await?;
        ctx.ensure(!prices.is_empty(), "no product prices read").await?;

        home.view_product(0).await?;
        let (arrived, url) = lands_on(ctx, "/product_details/").await?;
        ctx.ensure(arrived, format!("view product led to {url}")).await
    })
}

fn category_navigation(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let home = loaded(ctx, ctx.navigate_to_home().await?).await?;
        ctx.ensure(
            home.verify_categories_section_visible().await?,
            "category section not visible",
        )
        .await?;

        home.click_women_dress_category().await?;
        let (arrived, url) = lands_on(ctx, "/category_products/1").await?;
        ctx.ensure(arrived, format!("women > dress led to {url}")).await?;

        ctx.navigate_to_home()
            .await?
            .click_men_tshirts_category()
            .await?;
        let (arrived, url) = lands_on(ctx, "/category_products/3").await?;
        ctx.ensure(arrived, format!("men > tshirts led to {url}")).await
    })
}

fn brand_navigation(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let home = loaded(ctx, ctx.navigate_to_home().await?).await?;
        ctx.ensure(
            home.verify_brands_section_visible().await?,
            "brands section not visible",
        )
        .await?;
        for brand in ["Polo", "H&M"] {
            ctx.navigate_to_home().await?.click_brand(brand).await?;
            let (arrived, url) = lands_on(ctx, &format!("/brand_products/{brand}")).await?;
            ctx.ensure(arrived, format!("brand {brand} led to {url}")).await?;
        }
        Ok(())
    })
}

fn email_subscription(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let home = loaded(ctx, ctx.navigate_to_home().await?).await?;
        home.base().scroll_to_bottom().await?;
        ctx.ensure(
            home.verify_subscription_section_visible().await?,
            "subscription section not visible",
        )
        .await?;
        let email = generate_random_email("example.com");
        ctx.ensure(
            home.subscribe_to_newsletter(&email).await?,
            format!("subscribing {email} did not confirm"),
        )
        .await
    })
}

fn recommended_items(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let home = loaded(ctx, ctx.navigate_to_home().await?).await?;
        home.base()
            .ui()
            .scroll_into_view(&HomePage::RECOMMENDED_ITEMS_TITLE)
            .await?;
        ctx.ensure(
            home.verify_recommended_items_visible().await?,
            "recommended items not visible",
        )
        .await
    })
}

fn page_scrolling(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let home = loaded(ctx, ctx.navigate_to_home().await?).await?;
        home.base().scroll_to_bottom().await?;
        ctx.ensure(
            home.base().verify_element_visible(&HomePage::COPYRIGHT).await?,
            "footer not visible after scrolling down",
        )
        .await?;
        home.base().scroll_to_top().await?;
        ctx.ensure(
            home.base().verify_element_visible(&HomePage::LOGO).await?,
            "logo not visible after scrolling up",
        )
        .await
    })
}

fn script_error_recovery(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let home = loaded(ctx, ctx.navigate_to_home().await?).await?;
        home.base()
            .ui()
            .run_script("nonExistentFunction();", &[])
            .await?;
        ctx.ensure(
            home.base().verify_element_visible(&HomePage::LOGO).await?,
            "page unusable after a script error",
        )
        .await?;
        home.base().ui().refresh().await?;
        ctx.ensure(home.verify_home_page_loaded().await?, "home page did not reload")
            .await
    })
}
