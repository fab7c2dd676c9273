//! Registration and login.

use super::{current_url, lands_on, loaded, timed, Marker, Scenario, ScenarioFuture};
use crate::fixture::TestContext;
use crate::logging;
use crate::page_object::PageObject;
use crate::pages::{HomePage, LoginPage};
use crate::result::ShopResult;
use serde_json::{Map, Value};
use std::time::Duration;

const LOGIN_BUDGET: Duration = Duration::from_secs(10);

const SQL_PAYLOADS: &[&str] = &[
    "' OR '1'='1",
    "admin'--",
    "' OR 1=1--",
    "'; DROP TABLE users; --",
];

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "registration_success",
        group: "auth",
        markers: &[Marker::Smoke, Marker::Login],
        run: registration_success,
    },
    Scenario {
        name: "existing_email_rejected",
        group: "auth",
        markers: &[Marker::Login, Marker::Regression],
        run: existing_email_rejected,
    },
    Scenario {
        name: "registration_form_validation",
        group: "auth",
        markers: &[Marker::Login],
        run: registration_form_validation,
    },
    Scenario {
        name: "valid_login",
        group: "auth",
        markers: &[Marker::Smoke, Marker::Login],
        run: valid_login,
    },
    Scenario {
        name: "invalid_login",
        group: "auth",
        markers: &[Marker::Login, Marker::Regression],
        run: invalid_login,
    },
    Scenario {
        name: "empty_credentials",
        group: "auth",
        markers: &[Marker::Login],
        run: empty_credentials,
    },
    Scenario {
        name: "login_form_validation",
        group: "auth",
        markers: &[Marker::Login],
        run: login_form_validation,
    },
    Scenario {
        name: "login_cases",
        group: "auth",
        markers: &[Marker::Login, Marker::Regression],
        run: login_cases,
    },
    Scenario {
        name: "registration_and_login_flow",
        group: "auth",
        markers: &[Marker::Smoke, Marker::Login],
        run: registration_and_login_flow,
    },
    Scenario {
        name: "sql_injection_protection",
        group: "auth",
        markers: &[Marker::Login, Marker::Regression],
        run: sql_injection_protection,
    },
    Scenario {
        name: "login_response_time",
        group: "auth",
        markers: &[Marker::Login, Marker::Slow],
        run: login_response_time,
    },
];

async fn open_login(ctx: &TestContext) -> ShopResult<LoginPage> {
    loaded(ctx, ctx.navigate_to_login().await?).await
}

async fn ensure_still_on_login(ctx: &TestContext, what: &str) -> ShopResult<()> {
    let url = current_url(ctx).await?;
    ctx.ensure(
        url.contains(LoginPage::PATH),
        format!("{what} left the login page for {url}"),
    )
    .await
}

fn registration_success(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let user = ctx.data().generate_test_user(false)?;
        let login = open_login(ctx).await?;
        ctx.ensure(login.verify_signup_form_visible().await?, "signup form not visible")
            .await?;
        login.signup(&user.display_name(), &user.email).await?;

        let signup = ctx.signup();
        ctx.ensure(
            signup.verify_signup_page_loaded().await?,
            "account information form did not open",
        )
        .await?;
        ctx.ensure(
            signup
                .verify_name_and_email_prefilled(&user.display_name(), &user.email)
                .await?,
            "name and email were not carried over",
        )
        .await?;
        signup.complete_registration(&user).await?;

        let created = ctx.account_created();
        ctx.ensure(
            created.verify_account_created_page_loaded().await?,
            "account created page not shown",
        )
        .await?;
        ctx.ensure(
            created.verify_success_message().await?,
            "registration success message missing",
        )
        .await?;
        created.click_continue().await?;
        let url = current_url(ctx).await?;
        ctx.ensure(!url.contains(LoginPage::PATH), format!("continue led back to {url}"))
            .await
    })
}

fn existing_email_rejected(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let Some(user) = ctx.register_new_user().await? else {
            return ctx.skip("could not register a user to collide with");
        };
        ctx.account_created().click_continue().await?;
        ctx.home().base().ui().click(&HomePage::LOGOUT_LINK).await?;

        let login = open_login(ctx).await?;
        login.signup("Another User", &user.email).await?;
        ctx.ensure(
            login.verify_email_exists_error().await?,
            format!("signing up {} twice showed no error", user.email),
        )
        .await?;
        let message = login.error_message().await?;
        ctx.ensure(
            message.contains("Email Address already exist!"),
            format!("unexpected error text: {message}"),
        )
        .await?;
        ensure_still_on_login(ctx, "duplicate signup").await
    })
}

fn registration_form_validation(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let login = open_login(ctx).await?;
        login.signup("", "").await?;
        ensure_still_on_login(ctx, "empty signup").await?;

        login.clear_signup_form().await?;
        login.signup("Test User", "invalid-email").await?;
        ensure_still_on_login(ctx, "signup with a malformed email").await
    })
}

fn valid_login(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let Some(user) = ctx.data().stored_user("valid_user")? else {
            return ctx.skip("no valid_user in the users file; run setup-data first");
        };
        ctx.ensure(
            ctx.login_user(&user.email, &user.password).await?,
            format!("login as {} was rejected", user.email),
        )
        .await?;
        ctx.ensure(
            ctx.home().verify_logged_in().await?,
            "header does not show the logged-in user",
        )
        .await
    })
}

fn invalid_login(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let login = open_login(ctx).await?;
        login.login("invalid@example.com", "wrongpassword").await?;
        ctx.ensure(login.verify_login_error().await?, "no incorrect-login error")
            .await?;
        ensure_still_on_login(ctx, "invalid login").await
    })
}

fn empty_credentials(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let login = open_login(ctx).await?;
        login.login("", "").await?;
        ensure_still_on_login(ctx, "empty login").await
    })
}

fn login_form_validation(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let login = open_login(ctx).await?;
        ctx.ensure(login.verify_login_form_visible().await?, "login form not visible")
            .await?;
        login.enter_login_email("test@example.com").await?;
        login.enter_login_password("password").await?;
        let value = login.login_email_value().await?;
        ctx.ensure(
            value == "test@example.com",
            format!("email field reads back '{value}'"),
        )
        .await?;
        login.clear_login_form().await?;
        let value = login.login_email_value().await?;
        ctx.ensure(value.is_empty(), format!("cleared email field still reads '{value}'"))
            .await
    })
}

/// `login_tests` rows from the scenarios file, or the built-in set
fn login_rows(ctx: &TestContext) -> ShopResult<Vec<(String, String, bool)>> {
    let field = |row: &Map<String, Value>, key: &str| {
        row.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let rows: Vec<(String, String, bool)> = ctx
        .data()
        .scenario_data("login_tests")?
        .iter()
        .map(|row| {
            (
                field(row, "email"),
                field(row, "password"),
                field(row, "expected_result") == "success",
            )
        })
        .collect();
    if !rows.is_empty() {
        return Ok(rows);
    }
    let valid = ctx.data().valid_user()?;
    Ok(vec![
        (valid.email, valid.password, true),
        ("invalid@email.com".into(), "wrongpass".into(), false),
        (String::new(), String::new(), false),
    ])
}

fn login_cases(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let mut mismatches = Vec::new();
        for (email, password, should_pass) in login_rows(ctx)? {
            let passed = ctx.login_user(&email, &password).await?;
            logging::assertion(
                &format!("Login '{email}'"),
                &should_pass.to_string(),
                &passed.to_string(),
            );
            if passed != should_pass {
                mismatches.push(email.clone());
            }
            if passed {
                ctx.home().base().ui().click(&HomePage::LOGOUT_LINK).await?;
            }
        }
        ctx.ensure(
            mismatches.is_empty(),
            format!("unexpected login outcome for {mismatches:?}"),
        )
        .await
    })
}

fn registration_and_login_flow(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let Some(user) = ctx.register_new_user().await? else {
            return ctx.skip("registration did not complete");
        };
        ctx.account_created().click_continue().await?;
        ctx.ensure(ctx.home().verify_logged_in().await?, "not logged in after registering")
            .await?;

        ctx.home().base().ui().click(&HomePage::LOGOUT_LINK).await?;
        let (arrived, url) = lands_on(ctx, LoginPage::PATH).await?;
        ctx.ensure(arrived, format!("logout led to {url}")).await?;

        ctx.ensure(
            ctx.login_user(&user.email, &user.password).await?,
            format!("new account {} could not log back in", user.email),
        )
        .await?;
        ctx.ensure(ctx.home().verify_logged_in().await?, "header missing after login")
            .await
    })
}

fn sql_injection_protection(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        for payload in SQL_PAYLOADS {
            let passed = ctx.login_user(payload, "password").await?;
            ctx.ensure(!passed, format!("payload {payload:?} logged in"))
                .await?;
        }
        ensure_still_on_login(ctx, "injection attempts").await
    })
}

fn login_response_time(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let (_, elapsed) = timed(
            "Login response time",
            ctx.login_user("timing@example.com", "wrongpassword"),
        )
        .await?;
        ctx.ensure(
            elapsed < LOGIN_BUDGET,
            format!("login took {:.2}s", elapsed.as_secs_f64()),
        )
        .await
    })
}
