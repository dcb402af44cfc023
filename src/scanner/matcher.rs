// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Text search strategies
//!
//! Each strategy is one structural query. Live drivers evaluate the XPath
//! form; the native engine evaluates [`TextMatcher::matches`] with the same
//! XPath 1.0 string semantics (`text()` in a string context is the first
//! direct text node, `.` is the full string value).

use crate::dom::xpath::xpath_literal;
use crate::dom::Element;

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// Attributes inspected by the attribute strategy
pub const SEARCHED_ATTRIBUTES: &[&str] = &["title", "alt", "placeholder"];

/// A text lookup strategy
pub trait TextMatcher: Send + Sync {
    /// Display label, e.g. `Strategy 3`
    fn label(&self) -> &'static str;

    /// The XPath expression this strategy evaluates for `query`
    fn xpath(&self, query: &str) -> String;

    /// Whether `element` satisfies this strategy for `query`
    fn matches(&self, element: &Element, query: &str) -> bool;
}

fn first_text(element: &Element) -> String {
    element.direct_texts().into_iter().next().unwrap_or_default()
}

/// Strategy 1: some direct text node equals the query
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactText;

impl TextMatcher for ExactText {
    fn label(&self) -> &'static str {
        "Strategy 1"
    }

    fn xpath(&self, query: &str) -> String {
        format!("//*[text()={}]", xpath_literal(query))
    }

    fn matches(&self, element: &Element, query: &str) -> bool {
        element.direct_texts().iter().any(|t| t == query)
    }
}

/// Strategy 2: the first direct text node contains the query
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainsText;

impl TextMatcher for ContainsText {
    fn label(&self) -> &'static str {
        "Strategy 2"
    }

    fn xpath(&self, query: &str) -> String {
        format!("//*[contains(text(), {})]", xpath_literal(query))
    }

    fn matches(&self, element: &Element, query: &str) -> bool {
        first_text(element).contains(query)
    }
}

/// Strategy 3: the first direct text node contains the query's first word
///
/// Identical to [`ContainsText`] for single-word queries.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstWord;

impl FirstWord {
    fn word(query: &str) -> &str {
        query.split_whitespace().next().unwrap_or(query)
    }
}

impl TextMatcher for FirstWord {
    fn label(&self) -> &'static str {
        "Strategy 3"
    }

    fn xpath(&self, query: &str) -> String {
        format!("//*[contains(text(), {})]", xpath_literal(Self::word(query)))
    }

    fn matches(&self, element: &Element, query: &str) -> bool {
        first_text(element).contains(Self::word(query))
    }
}

/// Strategy 4: case-insensitive containment in the first direct text node
///
/// Only ASCII letters are folded on the document side, like `translate()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CaseInsensitive;

impl TextMatcher for CaseInsensitive {
    fn label(&self) -> &'static str {
        "Strategy 4"
    }

    fn xpath(&self, query: &str) -> String {
        format!(
            "//*[contains(translate(text(), '{}', '{}'), {})]",
            UPPER,
            LOWER,
            xpath_literal(&query.to_lowercase())
        )
    }

    fn matches(&self, element: &Element, query: &str) -> bool {
        first_text(element)
            .to_ascii_lowercase()
            .contains(&query.to_lowercase())
    }
}

/// Strategy 5: `title`, `alt` or `placeholder` contains the query
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributeText;

impl TextMatcher for AttributeText {
    fn label(&self) -> &'static str {
        "Strategy 5"
    }

    fn xpath(&self, query: &str) -> String {
        let literal = xpath_literal(query);
        let tests: Vec<String> = SEARCHED_ATTRIBUTES
            .iter()
            .map(|attr| format!("@{}[contains(., {})]", attr, literal))
            .collect();
        format!("//*[{}]", tests.join(" or "))
    }

    fn matches(&self, element: &Element, query: &str) -> bool {
        SEARCHED_ATTRIBUTES.iter().any(|attr| {
            element
                .get_attribute(attr)
                .map(|v| v.contains(query))
                .unwrap_or(false)
        })
    }
}

/// Strategy 6: the element's full descendant text contains the query
#[derive(Debug, Default, Clone, Copy)]
pub struct DescendantText;

impl TextMatcher for DescendantText {
    fn label(&self) -> &'static str {
        "Strategy 6"
    }

    fn xpath(&self, query: &str) -> String {
        format!("//*[contains(., {})]", xpath_literal(query))
    }

    fn matches(&self, element: &Element, query: &str) -> bool {
        element.text_content().contains(query)
    }
}

/// The fixed strategy battery, in evaluation order
pub fn default_matchers() -> Vec<Box<dyn TextMatcher>> {
    vec![
        Box::new(ExactText),
        Box::new(ContainsText),
        Box::new(FirstWord),
        Box::new(CaseInsensitive),
        Box::new(AttributeText),
        Box::new(DescendantText),
    ]
}
