// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Static frame lookup
//!
//! Finds frame-like elements in raw markup whose attributes, or inline
//! `srcdoc` document, contain a piece of text. Nothing is fetched and no
//! frame is entered.

use tracing::debug;

use crate::dom::{parse_html, xpath::absolute_path, Element};
use crate::error::{Error, Result};

/// Absolute paths of the `iframe`/`frame` elements mentioning `query`
///
/// Matching is case-insensitive. Paths are in document order.
pub fn find_frame_locators(html: &str, query: &str) -> Result<Vec<String>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(Error::invalid_input("search text is required"));
    }
    let needle = query.to_lowercase();
    let doc = parse_html(html)?;

    let mut paths = Vec::new();
    for frame in doc.query_selector_all("iframe, frame") {
        if mentions(&frame, &needle) {
            paths.push(absolute_path(&frame));
        }
    }
    debug!(count = paths.len(), "static frame lookup");
    Ok(paths)
}

fn mentions(frame: &Element, needle: &str) -> bool {
    let attributes = frame
        .attributes()
        .into_iter()
        .map(|(_, value)| value)
        .collect::<Vec<_>>()
        .join(" ");
    if attributes.to_lowercase().contains(needle) {
        return true;
    }

    let Some(srcdoc) = frame.get_attribute("srcdoc") else {
        return false;
    };
    match parse_html(&srcdoc) {
        Ok(inner) => inner
            .root()
            .descendant_texts()
            .join(" ")
            .to_lowercase()
            .contains(needle),
        Err(e) => {
            debug!(error = %e, "unparseable srcdoc skipped");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_match() {
        let html = r#"<div><iframe src="a.html"></iframe></div>
            <div><iframe title="x"></iframe><iframe alt="WMS report"></iframe></div>"#;
        let paths = find_frame_locators(html, "wms").unwrap();
        assert_eq!(paths, vec!["/html/body/div[2]/iframe[2]"]);
    }

    #[test]
    fn test_srcdoc_text_match() {
        let html = r#"<iframe srcdoc="<p>Quarterly <b>NWFR</b> totals</p>"></iframe>"#;
        assert_eq!(find_frame_locators(html, "nwfr").unwrap(), vec!["/html/body/iframe"]);
        assert!(find_frame_locators(html, "missing").unwrap().is_empty());
    }

    #[test]
    fn test_srcdoc_text_spans_inline_markup() {
        let html = r#"<iframe srcdoc="<p><span>Net</span><b>Total</b>due</p>"></iframe>"#;
        assert_eq!(
            find_frame_locators(html, "net total due").unwrap(),
            vec!["/html/body/iframe"]
        );
        assert!(find_frame_locators(html, "due net").unwrap().is_empty());
    }

    #[test]
    fn test_document_order() {
        let html = r#"<iframe name="report-a"></iframe><p><iframe name="report-b"></iframe></p>"#;
        assert_eq!(
            find_frame_locators(html, "REPORT").unwrap(),
            vec!["/html/body/iframe", "/html/body/p/iframe"]
        );
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(matches!(
            find_frame_locators("<iframe></iframe>", "  "),
            Err(Error::InvalidInput(_))
        ));
    }
}
