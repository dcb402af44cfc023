// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Structural paths (XPath-like locators)
//!
//! Two conventions are produced here:
//!
//! - [`element_locator`]: the live-driver form. An element with an id
//!   short-circuits to `//*[@id='..']`, the body is `/html/body`, and every
//!   other step carries a 1-based index among same-tag siblings.
//! - [`absolute_path`]: the static-markup form. Always rooted at the
//!   document, indexes only where a parent has several same-tag children.
//!
//! [`resolve`] finds an element again from either form, plus the generic
//! `//tag` fallback.

use crate::error::{Error, Result};

use super::document::Document;
use super::element::Element;

/// Locator used when a structural path cannot be computed
pub const FALLBACK_LOCATOR: &str = "//iframe";

/// Compute the live-driver locator of an element
pub fn element_locator(element: &Element) -> String {
    build_locator(element).unwrap_or_else(|| FALLBACK_LOCATOR.to_string())
}

fn build_locator(element: &Element) -> Option<String> {
    if let Some(id) = element.id().filter(|id| !id.is_empty()) {
        return Some(format!("//*[@id={}]", xpath_literal(&id)));
    }

    let tag = element.local_name();
    if tag.is_empty() {
        return None;
    }
    if tag == "body" && element.parent_element().map(|p| p.local_name()).as_deref() == Some("html")
    {
        return Some("/html/body".to_string());
    }

    let prefix = match element.parent_element() {
        Some(parent) => build_locator(&parent)?,
        // Parent is the document node
        None if element.parent().map(|p| p.is_document()).unwrap_or(false) => String::new(),
        None => return None,
    };

    Some(format!(
        "{}/{}[{}]",
        prefix,
        tag,
        element.same_tag_position()
    ))
}

/// Compute the static absolute path of an element
pub fn absolute_path(element: &Element) -> String {
    let mut parts = Vec::new();
    let mut current = Some(element.clone());

    while let Some(el) = current {
        let tag = el.local_name();
        if el.same_tag_count() > 1 {
            parts.push(format!("/{}[{}]", tag, el.same_tag_position()));
        } else {
            parts.push(format!("/{}", tag));
        }
        current = el.parent_element();
    }

    if parts.is_empty() {
        return "/".to_string();
    }
    parts.reverse();
    parts.concat()
}

/// Quote a string as an XPath 1.0 literal
///
/// Strings holding both quote kinds are split into a `concat(..)` call.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let pieces: Vec<String> = value
        .split('\'')
        .map(|piece| format!("'{}'", piece))
        .collect();
    format!("concat({})", pieces.join(", \"'\", "))
}

/// One `tag[n]` step of a path
#[derive(Debug, PartialEq, Eq)]
struct Step {
    tag: String,
    index: usize,
}

fn parse_steps(path: &str, locator: &str) -> Result<Vec<Step>> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|raw| {
            let (tag, index) = match raw.find('[') {
                Some(open) => {
                    let close = raw
                        .strip_suffix(']')
                        .ok_or_else(|| Error::locator(locator, format!("bad step '{}'", raw)))?;
                    let index = close[open + 1..]
                        .parse::<usize>()
                        .map_err(|_| Error::locator(locator, format!("bad index in '{}'", raw)))?;
                    (&raw[..open], index)
                }
                None => (raw, 1),
            };
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(Error::locator(locator, format!("unsupported step '{}'", raw)));
            }
            Ok(Step {
                tag: tag.to_lowercase(),
                index,
            })
        })
        .collect()
}

fn walk_steps(start: Element, steps: &[Step], locator: &str) -> Result<Element> {
    steps.iter().try_fold(start, |current, step| {
        current
            .nth_child_with_tag(&step.tag, step.index)
            .ok_or_else(|| Error::locator(locator, format!("no element for step {}[{}]", step.tag, step.index)))
    })
}

/// Resolve a locator against a document
pub fn resolve(doc: &Document, locator: &str) -> Result<Element> {
    let locator = locator.trim();

    // //*[@id='x'] optionally followed by relative steps
    if let Some(rest) = locator.strip_prefix("//*[@id=") {
        let quote = rest
            .chars()
            .next()
            .filter(|c| *c == '\'' || *c == '"')
            .ok_or_else(|| Error::locator(locator, "expected quoted id"))?;
        let body = &rest[1..];
        let end = body
            .find(quote)
            .ok_or_else(|| Error::locator(locator, "unterminated id literal"))?;
        let id = &body[..end];
        let tail = body[end + 1..]
            .strip_prefix(']')
            .ok_or_else(|| Error::locator(locator, "expected ']' after id"))?;

        let anchor = doc
            .get_element_by_id(id)
            .ok_or_else(|| Error::locator(locator, format!("no element with id '{}'", id)))?;
        let steps = parse_steps(tail, locator)?;
        return walk_steps(anchor, &steps, locator);
    }

    // //tag: first element with that tag
    if let Some(tag) = locator.strip_prefix("//") {
        if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return doc
                .get_elements_by_tag_name(tag)
                .into_iter()
                .next()
                .ok_or_else(|| Error::locator(locator, format!("no <{}> element", tag)));
        }
        return Err(Error::locator(locator, "unsupported expression"));
    }

    if locator.starts_with('/') {
        let steps = parse_steps(locator, locator)?;
        let (first, rest) = steps
            .split_first()
            .ok_or_else(|| Error::locator(locator, "empty path"))?;
        let root = doc
            .document_element()
            .filter(|html| first.tag == html.local_name() && first.index == 1)
            .ok_or_else(|| Error::locator(locator, format!("root is not {}", first.tag)))?;
        return walk_steps(root, rest, locator);
    }

    Err(Error::locator(locator, "unsupported expression"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const PAGE: &str = "<html><head><title>T</title></head><body>\
        <div>a</div><div><iframe name=\"one\"></iframe><iframe id=\"two\"></iframe>\
        <iframe name=\"three\"></iframe></div></body></html>";

    #[test]
    fn test_element_locator_conventions() {
        let doc = parse_html(PAGE).unwrap();
        let frames = doc.frames();
        assert_eq!(element_locator(&frames[0]), "/html/body/div[2]/iframe[1]");
        assert_eq!(element_locator(&frames[1]), "//*[@id='two']");
        assert_eq!(element_locator(&frames[2]), "/html/body/div[2]/iframe[3]");
        assert_eq!(element_locator(&doc.body().unwrap()), "/html/body");

        let title = doc.query_selector("title").unwrap();
        assert_eq!(element_locator(&title), "/html[1]/head[1]/title[1]");
    }

    #[test]
    fn test_locator_under_id_anchor() {
        let doc = parse_html("<body><div id=\"box\"><p>x</p><p>y</p></div></body>").unwrap();
        let ps = doc.query_selector_all("p");
        assert_eq!(element_locator(&ps[1]), "//*[@id='box']/p[2]");
        assert_eq!(resolve(&doc, "//*[@id='box']/p[2]").unwrap(), ps[1]);
    }

    #[test]
    fn test_id_locator_quotes_id() {
        let doc = parse_html(r#"<body><iframe id="it's"></iframe><p id='say "it&apos;s"'></p></body>"#).unwrap();
        let frame = doc.frames().remove(0);
        assert_eq!(element_locator(&frame), r#"//*[@id="it's"]"#);
        assert_eq!(resolve(&doc, &element_locator(&frame)).unwrap(), frame);

        let p = doc.query_selector("p").unwrap();
        assert_eq!(
            element_locator(&p),
            r#"//*[@id=concat('say "it', "'", 's"')]"#
        );
    }

    #[test]
    fn test_absolute_path() {
        let doc = parse_html(PAGE).unwrap();
        let frames = doc.frames();
        assert_eq!(absolute_path(&frames[1]), "/html/body/div[2]/iframe[2]");

        let doc = parse_html("<body><div><iframe></iframe></div></body>").unwrap();
        assert_eq!(absolute_path(&doc.frames()[0]), "/html/body/div/iframe");
    }

    #[test]
    fn test_resolve_round_trips_live_locators() {
        let doc = parse_html(PAGE).unwrap();
        for frame in doc.frames() {
            let locator = element_locator(&frame);
            assert_eq!(resolve(&doc, &locator).unwrap(), frame, "{}", locator);
        }
        let title = doc.query_selector("title").unwrap();
        assert_eq!(resolve(&doc, "/html[1]/head[1]/title[1]").unwrap(), title);
    }

    #[test]
    fn test_resolve_fallback_and_errors() {
        let doc = parse_html(PAGE).unwrap();
        assert_eq!(resolve(&doc, FALLBACK_LOCATOR).unwrap(), doc.frames()[0]);
        assert!(resolve(&doc, "//*[@id='missing']").is_err());
        assert!(resolve(&doc, "/html/body/div[9]").is_err());
        assert!(resolve(&doc, "id('two')").is_err());
    }

    #[test]
    fn test_xpath_literal() {
        assert_eq!(xpath_literal("WMS"), "'WMS'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal("a'b\"c"),
            "concat('a', \"'\", 'b\"c')"
        );
    }
}
