//! Element queries: how a page object names the nodes it works with.
//!
//! A query is a strategy plus a pattern. It carries no live handle; every
//! resolve renders it to a JavaScript expression and evaluates it against
//! the current document, so a query can match nothing, one node, or many.
//!
//! ```text
//! ElementQuery::xpath("//a[@href='/products']")
//!        │
//!        ▼  to_nodes_expr("document")
//! (() => { const r = document.evaluate(...ORDERED_NODE_SNAPSHOT_TYPE...); ... })()
//!        │
//!        ▼  driver observe / act
//! [HTMLAnchorElement, ...]
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// How the pattern of a query is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// `id` attribute
    Id,
    /// `name` attribute
    Name,
    /// A single class name
    ClassName,
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
}

impl Strategy {
    /// Short label used in logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::ClassName => "class",
            Self::Css => "css",
            Self::XPath => "xpath",
        }
    }
}

/// A symbolic description of how to find nodes in the rendered page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementQuery {
    strategy: Strategy,
    pattern: Cow<'static, str>,
}

impl ElementQuery {
    /// Query by `id`
    #[must_use]
    pub const fn id(pattern: &'static str) -> Self {
        Self::borrowed(Strategy::Id, pattern)
    }

    /// Query by `name` attribute
    #[must_use]
    pub const fn name(pattern: &'static str) -> Self {
        Self::borrowed(Strategy::Name, pattern)
    }

    /// Query by class name
    #[must_use]
    pub const fn class_name(pattern: &'static str) -> Self {
        Self::borrowed(Strategy::ClassName, pattern)
    }

    /// Query by CSS selector
    #[must_use]
    pub const fn css(pattern: &'static str) -> Self {
        Self::borrowed(Strategy::Css, pattern)
    }

    /// Query by XPath
    #[must_use]
    pub const fn xpath(pattern: &'static str) -> Self {
        Self::borrowed(Strategy::XPath, pattern)
    }

    /// Query with a pattern built at runtime
    #[must_use]
    pub fn new(strategy: Strategy, pattern: impl Into<String>) -> Self {
        Self {
            strategy,
            pattern: Cow::Owned(pattern.into()),
        }
    }

    const fn borrowed(strategy: Strategy, pattern: &'static str) -> Self {
        Self {
            strategy,
            pattern: Cow::Borrowed(pattern),
        }
    }

    /// Strategy of this query
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Raw pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// JavaScript expression evaluating to an `Array` of matching nodes
    /// under `root` (a `Document` expression), in document order.
    #[must_use]
    pub fn to_nodes_expr(&self, root: &str) -> String {
        let p = self.pattern();
        match self.strategy {
            Strategy::Id => {
                format!("((d) => {{ const e = d.getElementById({p:?}); return e ? [e] : []; }})({root})")
            }
            Strategy::Name => format!("Array.from({root}.getElementsByName({p:?}))"),
            Strategy::ClassName => format!("Array.from({root}.getElementsByClassName({p:?}))"),
            Strategy::Css => format!("Array.from({root}.querySelectorAll({p:?}))"),
            Strategy::XPath => format!(
                "((d) => {{ const r = d.evaluate({p:?}, d, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 const out = []; for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); return out; }})({root})"
            ),
        }
    }

    /// CSS equivalent, when one exists. XPath has none.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        let p = self.pattern();
        match self.strategy {
            Strategy::Id => Some(format!("[id={p:?}]")),
            Strategy::Name => Some(format!("[name={p:?}]")),
            Strategy::ClassName => Some(format!(".{p}")),
            Strategy::Css => Some(p.to_string()),
            Strategy::XPath => None,
        }
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.pattern)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const LOGO: ElementQuery = ElementQuery::xpath("//img[@alt='Website for automation practice']");

    mod construction_tests {
        use super::*;

        #[test]
        fn test_const_query() {
            assert_eq!(LOGO.strategy(), Strategy::XPath);
            assert_eq!(LOGO.pattern(), "//img[@alt='Website for automation practice']");
        }

        #[test]
        fn test_runtime_query_equals_const() {
            let built = ElementQuery::new(
                Strategy::XPath,
                format!("//img[@alt='{}']", "Website for automation practice"),
            );
            assert_eq!(built, LOGO);
        }

        #[test]
        fn test_display() {
            assert_eq!(ElementQuery::id("subscribe").to_string(), "id=subscribe");
            assert_eq!(
                ElementQuery::class_name("productinfo").to_string(),
                "class=productinfo"
            );
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_xpath_uses_ordered_snapshot() {
            let js = LOGO.to_nodes_expr("document");
            assert!(js.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
            assert!(js.contains("document.evaluate") || js.contains("d.evaluate"));
            assert!(js.ends_with("(document)"));
        }

        #[test]
        fn test_id_returns_array() {
            let js = ElementQuery::id("cart_info_table").to_nodes_expr("document");
            assert!(js.contains("getElementById(\"cart_info_table\")"));
            assert!(js.contains("e ? [e] : []"));
        }

        #[test]
        fn test_css_and_class() {
            let css = ElementQuery::css("div.modal").to_nodes_expr("root");
            assert_eq!(css, "Array.from(root.querySelectorAll(\"div.modal\"))");
            let class = ElementQuery::class_name("alert-success").to_nodes_expr("document");
            assert_eq!(
                class,
                "Array.from(document.getElementsByClassName(\"alert-success\"))"
            );
        }

        #[test]
        fn test_pattern_quotes_are_escaped() {
            let q = ElementQuery::new(Strategy::XPath, "//p[text()=\"say \\\"hi\\\"\"]");
            let js = q.to_nodes_expr("document");
            assert!(js.contains("\\\""));
        }

        #[test]
        fn test_to_css() {
            assert_eq!(
                ElementQuery::name("upload_file").to_css().as_deref(),
                Some("[name=\"upload_file\"]")
            );
            assert_eq!(
                ElementQuery::class_name("modal").to_css().as_deref(),
                Some(".modal")
            );
            assert!(LOGO.to_css().is_none());
        }
    }

    proptest! {
        #[test]
        fn prop_rendered_expr_embeds_escaped_pattern(pattern in "[a-zA-Z0-9_'\\[\\]@/=-]{1,40}") {
            let q = ElementQuery::new(Strategy::Css, pattern.clone());
            let js = q.to_nodes_expr("document");
            let quoted = format!("{pattern:?}");
            prop_assert!(js.contains(&quoted));
        }

        #[test]
        fn prop_display_roundtrips_pattern(pattern in "[a-z_]{1,20}") {
            let q = ElementQuery::new(Strategy::Id, pattern.clone());
            prop_assert_eq!(q.to_string(), format!("id={pattern}"));
        }
    }
}
