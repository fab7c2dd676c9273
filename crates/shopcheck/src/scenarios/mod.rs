//! Registered storefront scenarios.
//!
//! Each group module exposes a `SCENARIOS` table. An entry pairs a name and
//! its markers with a plain `fn` that boxes the scenario's future, so the
//! whole catalogue is `'static` data the runner can filter and fan out.
//!
//! ```text
//! catalogue() ─► select(suite, -m expr, --filter) ─► runner workers
//!                                                     └─► (scenario.run)(&ctx)
//! ```

mod auth;
mod cart;
mod contact;
mod home;
mod products;

use crate::fixture::TestContext;
use crate::page_object::{BasePage, PageObject};
use crate::result::{ShopError, ShopResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Boxed future of one scenario run, borrowing its context
pub type ScenarioFuture<'a> = Pin<Box<dyn Future<Output = ShopResult<()>> + Send + 'a>>;

/// Entry point of a scenario
pub type ScenarioFn = for<'a> fn(&'a TestContext) -> ScenarioFuture<'a>;

// =============================================================================
// Markers
// =============================================================================

/// Selection label attached to a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Smoke,
    Regression,
    Login,
    Product,
    Cart,
    Contact,
    Navigation,
    Subscription,
    Slow,
}

impl Marker {
    pub const ALL: [Self; 9] = [
        Self::Smoke,
        Self::Regression,
        Self::Login,
        Self::Product,
        Self::Cart,
        Self::Contact,
        Self::Navigation,
        Self::Subscription,
        Self::Slow,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Regression => "regression",
            Self::Login => "login",
            Self::Product => "product",
            Self::Cart => "cart",
            Self::Contact => "contact",
            Self::Navigation => "navigation",
            Self::Subscription => "subscription",
            Self::Slow => "slow",
        }
    }

    /// One-line meaning, as `list --markers` prints it
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Smoke => "fast checks of the critical paths",
            Self::Regression => "full regression coverage",
            Self::Login => "registration and login",
            Self::Product => "product listing, search and filters",
            Self::Cart => "shopping cart",
            Self::Contact => "contact form",
            Self::Navigation => "header links and page movement",
            Self::Subscription => "newsletter subscription",
            Self::Slow => "timing measurements",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Marker {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ShopError::config(format!("unknown marker '{}'", s.trim())))
    }
}

/// Marker selection in the `-m` style: alternatives separated by `or` or
/// `,`, terms within an alternative joined by `and`, each term optionally
/// negated with `not`.
///
/// `smoke and not slow`, `login or cart`, `smoke,contact`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerExpr {
    alternatives: Vec<Vec<Term>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Term {
    negated: bool,
    marker: Marker,
}

impl MarkerExpr {
    /// Expression matching any scenario carrying one of `markers`
    #[must_use]
    pub fn any_of(markers: &[Marker]) -> Self {
        Self {
            alternatives: markers
                .iter()
                .map(|&marker| vec![Term { negated: false, marker }])
                .collect(),
        }
    }

    #[must_use]
    pub fn matches(&self, markers: &[Marker]) -> bool {
        self.alternatives.iter().any(|terms| {
            terms
                .iter()
                .all(|t| markers.contains(&t.marker) != t.negated)
        })
    }
}

impl FromStr for MarkerExpr {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace(',', " or ");
        let mut alternatives = Vec::new();
        for alternative in normalized.split(" or ") {
            let mut terms = Vec::new();
            for term in alternative.split(" and ") {
                let term = term.trim();
                if term.is_empty() {
                    return Err(ShopError::config(format!("empty term in marker expression '{s}'")));
                }
                let (negated, name) = match term.strip_prefix("not ") {
                    Some(rest) => (true, rest),
                    None => (false, term),
                };
                terms.push(Term {
                    negated,
                    marker: name.parse()?,
                });
            }
            alternatives.push(terms);
        }
        Ok(Self { alternatives })
    }
}

impl fmt::Display for MarkerExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .alternatives
            .iter()
            .map(|terms| {
                terms
                    .iter()
                    .map(|t| {
                        if t.negated {
                            format!("not {}", t.marker)
                        } else {
                            t.marker.to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" and ")
            })
            .collect();
        f.write_str(&rendered.join(" or "))
    }
}

// =============================================================================
// Scenarios
// =============================================================================

/// A registered test case
#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub group: &'static str,
    pub markers: &'static [Marker],
    pub run: ScenarioFn,
}

impl Scenario {
    /// `group::name`
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}::{}", self.group, self.name)
    }

    #[must_use]
    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }

    /// Case-insensitive substring match on the id
    #[must_use]
    pub fn matches_filter(&self, filter: &str) -> bool {
        self.id().to_lowercase().contains(&filter.to_lowercase())
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

/// Every registered scenario, grouped in page order
#[must_use]
pub fn catalogue() -> Vec<Scenario> {
    [
        home::SCENARIOS,
        products::SCENARIOS,
        cart::SCENARIOS,
        contact::SCENARIOS,
        auth::SCENARIOS,
    ]
    .concat()
}

/// Look a scenario up by `group::name` or bare name
#[must_use]
pub fn find(id: &str) -> Option<Scenario> {
    catalogue()
        .into_iter()
        .find(|s| s.id() == id || s.name == id)
}

// =============================================================================
// Shared scenario helpers
// =============================================================================

/// Fail the scenario unless `page` shows its signature elements
pub(crate) async fn loaded<P: PageObject>(ctx: &TestContext, page: P) -> ShopResult<P> {
    let ok = page.verify_loaded().await?;
    ctx.ensure(ok, format!("{} failed to load", page.page_name()))
        .await?;
    Ok(page)
}

/// Wait for the URL to contain `fragment`; returns whether it did and the
/// URL the browser ended on
pub(crate) async fn lands_on(ctx: &TestContext, fragment: &str) -> ShopResult<(bool, String)> {
    let base = BasePage::new(ctx.session(), "/");
    let arrived = base.ui().waiter().wait_for_url_contains(fragment, None).await?;
    Ok((arrived, base.current_url().await?))
}

/// URL the browser is on now
pub(crate) async fn current_url(ctx: &TestContext) -> ShopResult<String> {
    BasePage::new(ctx.session(), "/").current_url().await
}

/// Run `f` and log how long it took
pub(crate) async fn timed<T, F>(metric: &str, f: F) -> ShopResult<(T, Duration)>
where
    F: Future<Output = ShopResult<T>>,
{
    let started = Instant::now();
    let value = f.await?;
    let elapsed = started.elapsed();
    crate::logging::performance(metric, elapsed.as_secs_f64(), "seconds");
    Ok((value, elapsed))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    mod marker_tests {
        use super::*;

        #[test]
        fn test_marker_round_trip_through_str() {
            for marker in Marker::ALL {
                assert_eq!(marker.as_str().parse::<Marker>().unwrap(), marker);
            }
            assert_eq!(" Smoke ".parse::<Marker>().unwrap(), Marker::Smoke);
        }

        #[test]
        fn test_unknown_marker_is_config_error() {
            let err = "flaky".parse::<Marker>().unwrap_err();
            assert!(matches!(err, ShopError::Config { .. }));
        }

        #[test]
        fn test_marker_serializes_lowercase() {
            let json = serde_json::to_string(&[Marker::Smoke, Marker::Subscription]).unwrap();
            assert_eq!(json, r#"["smoke","subscription"]"#);
        }
    }

    mod expr_tests {
        use super::*;

        #[test]
        fn test_single_marker() {
            let expr: MarkerExpr = "smoke".parse().unwrap();
            assert!(expr.matches(&[Marker::Smoke, Marker::Cart]));
            assert!(!expr.matches(&[Marker::Cart]));
        }

        #[test]
        fn test_or_and_comma_are_alternatives() {
            for text in ["login or cart", "login,cart", "login, cart"] {
                let expr: MarkerExpr = text.parse().unwrap();
                assert!(expr.matches(&[Marker::Login]), "{text}");
                assert!(expr.matches(&[Marker::Cart]), "{text}");
                assert!(!expr.matches(&[Marker::Contact]), "{text}");
            }
        }

        #[test]
        fn test_and_not() {
            let expr: MarkerExpr = "cart and not slow".parse().unwrap();
            assert!(expr.matches(&[Marker::Cart]));
            assert!(!expr.matches(&[Marker::Cart, Marker::Slow]));
            assert!(!expr.matches(&[Marker::Slow]));
        }

        #[test]
        fn test_not_alone_matches_unmarked() {
            let expr: MarkerExpr = "not slow".parse().unwrap();
            assert!(expr.matches(&[]));
            assert!(!expr.matches(&[Marker::Slow]));
        }

        #[test]
        fn test_rejects_garbage() {
            assert!("smoke and".parse::<MarkerExpr>().is_err());
            assert!("smoke or bogus".parse::<MarkerExpr>().is_err());
        }

        #[test]
        fn test_display_normalizes_commas() {
            let expr: MarkerExpr = "smoke,not slow".parse().unwrap();
            assert_eq!(expr.to_string(), "smoke or not slow");
        }

        #[test]
        fn test_any_of() {
            let expr = MarkerExpr::any_of(&[Marker::Login, Marker::Contact]);
            assert!(expr.matches(&[Marker::Contact]));
            assert!(!expr.matches(&[Marker::Product]));
        }

        proptest! {
            #[test]
            fn prop_display_parses_back(indices in prop::collection::vec((any::<bool>(), 0usize..9), 1..4)) {
                let rendered: Vec<String> = indices
                    .iter()
                    .map(|(neg, i)| {
                        let m = Marker::ALL[*i];
                        if *neg { format!("not {m}") } else { m.to_string() }
                    })
                    .collect();
                let expr: MarkerExpr = rendered.join(" and ").parse().unwrap();
                let reparsed: MarkerExpr = expr.to_string().parse().unwrap();
                prop_assert_eq!(expr, reparsed);
            }
        }
    }

    mod catalogue_tests {
        use super::*;

        #[test]
        fn test_ids_are_unique() {
            let all = catalogue();
            let ids: HashSet<String> = all.iter().map(Scenario::id).collect();
            assert_eq!(ids.len(), all.len());
        }

        #[test]
        fn test_every_group_has_a_smoke_case() {
            let all = catalogue();
            for group in ["home", "products", "cart", "contact", "auth"] {
                assert!(
                    all.iter().any(|s| s.group == group && s.has_marker(Marker::Smoke)),
                    "{group} has no smoke scenario"
                );
            }
        }

        #[test]
        fn test_every_scenario_is_marked() {
            assert!(catalogue().iter().all(|s| !s.markers.is_empty()));
        }

        #[test]
        fn test_find_by_id_and_name() {
            let by_id = find("products::search_dress_end_to_end").unwrap();
            assert_eq!(by_id.group, "products");
            assert!(find("search_dress_end_to_end").is_some());
            assert!(find("no_such_case").is_none());
        }

        #[test]
        fn test_filter_is_case_insensitive() {
            let s = find("contact::empty_name_stays_on_form").unwrap();
            assert!(s.matches_filter("EMPTY_NAME"));
            assert!(s.matches_filter("contact::"));
            assert!(!s.matches_filter("cart"));
        }
    }
}
