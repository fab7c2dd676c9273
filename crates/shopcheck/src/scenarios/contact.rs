//! Contact form: submission, browser-side validation, attachment and
//! payload handling.

use super::{current_url, loaded, timed, Marker, Scenario, ScenarioFuture};
use crate::data::ContactMessage;
use crate::fixture::TestContext;
use crate::logging;
use crate::page_object::PageObject;
use crate::pages::ContactUsPage;
use crate::result::ShopResult;
use std::time::Duration;
use uuid::Uuid;

const SUBMIT_BUDGET: Duration = Duration::from_secs(15);

const XSS_PAYLOADS: &[&str] = &[
    "<script>alert('XSS')</script>",
    "javascript:alert('XSS')",
    "<img src=x onerror=alert('XSS')>",
    "';alert('XSS');//",
];

/// A form row and whether the site should accept it
struct FormCase {
    name: String,
    email: &'static str,
    subject: String,
    message: String,
    accepted: bool,
}

fn form_cases() -> Vec<FormCase> {
    let case = |name: &str, email, subject: &str, message: &str, accepted| FormCase {
        name: name.to_string(),
        email,
        subject: subject.to_string(),
        message: message.to_string(),
        accepted,
    };
    vec![
        case("John Doe", "john@example.com", "Test Subject", "Test Message", true),
        case("", "test@example.com", "Subject", "Message", false),
        case("Test User", "", "Subject", "Message", false),
        case("Test User", "invalid-email", "Subject", "Message", false),
        case("Test User", "test@example.com", "", "Message", false),
        case("Test User", "test@example.com", "Subject", "", false),
        case(&"A".repeat(100), "test@example.com", "Subject", "Message", true),
        case("Test User", "test@example.com", &"A".repeat(200), "Message", true),
        case("Test User", "test@example.com", "Subject", &"A".repeat(1000), true),
    ]
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "page_loads",
        group: "contact",
        markers: &[Marker::Smoke, Marker::Contact],
        run: page_loads,
    },
    Scenario {
        name: "submit_success",
        group: "contact",
        markers: &[Marker::Smoke, Marker::Contact],
        run: submit_success,
    },
    Scenario {
        name: "submit_complete",
        group: "contact",
        markers: &[Marker::Contact],
        run: submit_complete,
    },
    Scenario {
        name: "empty_form_submission",
        group: "contact",
        markers: &[Marker::Contact],
        run: empty_form_submission,
    },
    Scenario {
        name: "empty_name_stays_on_form",
        group: "contact",
        markers: &[Marker::Contact, Marker::Regression],
        run: empty_name_stays_on_form,
    },
    Scenario {
        name: "invalid_email_validation",
        group: "contact",
        markers: &[Marker::Contact],
        run: invalid_email_validation,
    },
    Scenario {
        name: "form_validation_cases",
        group: "contact",
        markers: &[Marker::Contact],
        run: form_validation_cases,
    },
    Scenario {
        name: "file_upload",
        group: "contact",
        markers: &[Marker::Contact],
        run: file_upload,
    },
    Scenario {
        name: "return_to_home",
        group: "contact",
        markers: &[Marker::Contact, Marker::Navigation],
        run: return_to_home,
    },
    Scenario {
        name: "form_clear",
        group: "contact",
        markers: &[Marker::Contact],
        run: form_clear,
    },
    Scenario {
        name: "submission_response_time",
        group: "contact",
        markers: &[Marker::Slow],
        run: submission_response_time,
    },
    Scenario {
        name: "xss_protection",
        group: "contact",
        markers: &[Marker::Regression],
        run: xss_protection,
    },
    Scenario {
        name: "refresh_recovery",
        group: "contact",
        markers: &[Marker::Regression],
        run: refresh_recovery,
    },
    Scenario {
        name: "form_accessibility",
        group: "contact",
        markers: &[Marker::Contact],
        run: form_accessibility,
    },
];

async fn open_contact(ctx: &TestContext) -> ShopResult<ContactUsPage> {
    loaded(ctx, ctx.navigate_to_contact_us().await?).await
}

async fn ensure_still_on_form(ctx: &TestContext, why: &str) -> ShopResult<()> {
    let url = current_url(ctx).await?;
    ctx.ensure(
        url.contains(ContactUsPage::PATH),
        format!("{why}: left the form for {url}"),
    )
    .await
}

fn page_loads(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let contact = open_contact(ctx).await?;
        ctx.ensure(
            contact.verify_get_in_touch_title().await?,
            "'Get In Touch' title not visible",
        )
        .await?;
        ctx.ensure(
            contact.verify_form_fields_visible().await?,
            "contact form incomplete",
        )
        .await
    })
}

fn submit_success(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let message = ctx.data().generate_contact_data();
        let contact = open_contact(ctx).await?;
        contact.fill_contact_form(&message).await?;
        contact.click_submit_button().await?;
        contact.handle_alert().await?;
        ctx.ensure(
            contact.verify_success_message().await?,
            "success message not shown",
        )
        .await
    })
}

fn submit_complete(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let message = ctx.data().generate_contact_data();
        let sent = ctx.submit_contact_form(&message).await?;
        ctx.ensure(sent, "contact submission did not succeed").await
    })
}

fn empty_form_submission(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let contact = open_contact(ctx).await?;
        contact.click_submit_button().await?;
        ensure_still_on_form(ctx, "empty form submitted").await
    })
}

/// An empty name blocks the submit: no confirm dialog, a validation
/// message on the field, and the browser stays on `/contact_us`
fn empty_name_stays_on_form(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let mut message = ctx.data().generate_contact_data();
        message.name.clear();
        let contact = open_contact(ctx).await?;
        contact.fill_contact_form(&message).await?;
        contact.click_submit_button().await?;
        let confirmed = contact.handle_alert().await?;
        ctx.ensure(!confirmed, "submit was confirmed without a name")
            .await?;
        let validation = contact
            .verify_form_validation(&ContactUsPage::NAME_INPUT)
            .await?;
        if validation.is_empty() {
            tracing::warn!(target: "shopcheck::scenarios", "name field reports no validation message");
        }
        ensure_still_on_form(ctx, "submitted without a name").await
    })
}

fn invalid_email_validation(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let contact = open_contact(ctx).await?;
        contact
            .fill_contact_form(&ContactMessage {
                name: "Test User".to_string(),
                email: "invalid-email".to_string(),
                subject: "Test Subject".to_string(),
                message: "Test Message".to_string(),
            })
            .await?;
        contact.click_submit_button().await?;
        ensure_still_on_form(ctx, "invalid email submitted").await
    })
}

fn form_validation_cases(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        for case in form_cases() {
            let label: String = case.name.chars().take(20).collect();
            logging::step(&format!("Form case: name='{label}', email='{}'", case.email));
            let contact = open_contact(ctx).await?;
            contact
                .fill_contact_form(&ContactMessage {
                    name: case.name.clone(),
                    email: case.email.to_string(),
                    subject: case.subject.clone(),
                    message: case.message.clone(),
                })
                .await?;
            contact.click_submit_button().await?;
            contact.handle_alert().await?;
            if case.accepted {
                ctx.ensure(
                    contact.verify_success_message().await?,
                    format!("valid form rejected: name='{label}'"),
                )
                .await?;
            } else {
                ensure_still_on_form(ctx, &format!("invalid form accepted: name='{label}', email='{}'", case.email))
                    .await?;
            }
        }
        Ok(())
    })
}

fn file_upload(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let dir = ctx.settings().reports_dir.join("uploads");
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("upload_{}.txt", Uuid::new_v4().simple()));
        std::fs::write(&path, "This is a test file for contact form upload.")?;

        let outcome = async {
            let message = ctx.data().generate_contact_data();
            let contact = open_contact(ctx).await?;
            contact.submit_contact_form(&message, Some(&path)).await?;
            ctx.ensure(
                contact.verify_success_message().await?,
                "submission with an attachment failed",
            )
            .await
        }
        .await;

        if let Err(err) = std::fs::remove_file(&path) {
            tracing::warn!(target: "shopcheck::scenarios", path = %path.display(), %err, "could not remove upload file");
        }
        outcome
    })
}

fn return_to_home(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let message = ctx.data().generate_contact_data();
        let sent = ctx.submit_contact_form(&message).await?;
        ctx.ensure(sent, "contact submission did not succeed").await?;

        let contact = ctx.contact_us();
        if !contact
            .base()
            .is_visible(&ContactUsPage::HOME_BUTTON)
            .await?
        {
            logging::step("No home button after submit; nothing to follow");
            return Ok(());
        }
        contact.click_home_button().await?;
        let url = current_url(ctx).await?;
        let base = ctx.settings().base_url.trim_end_matches('/');
        ctx.ensure(
            url == base || url == format!("{base}/"),
            format!("home button led to {url}"),
        )
        .await
    })
}

fn form_clear(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let contact = open_contact(ctx).await?;
        contact
            .fill_contact_form(&ContactMessage {
                name: "Test User".to_string(),
                email: "test@example.com".to_string(),
                subject: "Test Subject".to_string(),
                message: "Test Message".to_string(),
            })
            .await?;
        let values = contact.form_field_values().await?;
        ctx.ensure(
            values.get("name").map(String::as_str) == Some("Test User"),
            format!("name field holds {:?}", values.get("name")),
        )
        .await?;
        ctx.ensure(
            values.get("email").map(String::as_str) == Some("test@example.com"),
            format!("email field holds {:?}", values.get("email")),
        )
        .await?;

        contact.clear_form().await?;
        let values = contact.form_field_values().await?;
        ctx.ensure(
            values.values().all(String::is_empty),
            format!("fields not cleared: {values:?}"),
        )
        .await
    })
}

fn submission_response_time(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let message = ctx.data().generate_contact_data();
        let contact = open_contact(ctx).await?;
        let (shown, elapsed) = timed("Contact form submission time", async {
            contact.submit_contact_form(&message, None).await?;
            contact.verify_success_message().await
        })
        .await?;
        ctx.ensure(shown, "success message not shown").await?;
        ctx.ensure(
            elapsed < SUBMIT_BUDGET,
            format!("submission took {:.2}s", elapsed.as_secs_f64()),
        )
        .await
    })
}

fn xss_protection(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        for payload in XSS_PAYLOADS {
            let contact = open_contact(ctx).await?;
            contact
                .fill_contact_form(&ContactMessage {
                    name: (*payload).to_string(),
                    email: "test@example.com".to_string(),
                    subject: (*payload).to_string(),
                    message: (*payload).to_string(),
                })
                .await?;
            contact.click_submit_button().await?;
            contact.handle_alert().await?;
            let source = contact.base().page_source().await?;
            ctx.ensure(
                !source.contains(payload) || !source.contains("alert"),
                format!("payload reflected unescaped: {payload}"),
            )
            .await?;
        }
        Ok(())
    })
}

fn refresh_recovery(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let contact = open_contact(ctx).await?;
        let message = ctx.data().generate_contact_data();
        contact.fill_contact_form(&message).await?;
        contact.base().ui().refresh().await?;
        contact.base().ui().wait_for_page_load(None).await?;
        ctx.ensure(
            contact.verify_contact_us_page_loaded().await?,
            "contact page did not recover after a reload",
        )
        .await?;
        ctx.ensure(
            contact.verify_form_fields_visible().await?,
            "form fields missing after a reload",
        )
        .await
    })
}

fn form_accessibility(ctx: &TestContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let contact = open_contact(ctx).await?;
        let ui = contact.base().ui();
        let placeholder = ui
            .read_attribute(&ContactUsPage::NAME_INPUT, "placeholder")
            .await?;
        let data_qa = ui.read_attribute(&ContactUsPage::NAME_INPUT, "data-qa").await?;
        ctx.ensure(
            !placeholder.is_empty() || !data_qa.is_empty(),
            "name field has neither a placeholder nor a data-qa label",
        )
        .await?;
        ctx.ensure(
            ui.click(&ContactUsPage::NAME_INPUT).await?,
            "name field cannot take focus",
        )
        .await
    })
}
