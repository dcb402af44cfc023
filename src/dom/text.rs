// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Rendered text extraction
//!
//! Approximates `innerText`: non-rendered subtrees are skipped, block
//! boundaries become line breaks and whitespace runs collapse.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::node::{NodeData, NodeId, NodeType};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"[ \t\r\n\f]+").unwrap();
    static ref DISPLAY_NONE: Regex = Regex::new(r"(?i)display\s*:\s*none").unwrap();
}

/// Elements whose content is never rendered
const NON_RENDERED: &[&str] = &[
    "head", "script", "style", "noscript", "template", "iframe", "frame", "object", "title",
    "meta", "link",
];

/// Elements that start and end on their own line
const BLOCK_LEVEL: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "frameset", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section",
    "summary", "table", "tbody", "tfoot", "thead", "tr", "ul",
];

/// Compute the rendered text of a node
pub(crate) fn inner_text(nodes: &HashMap<NodeId, NodeData>, node_id: NodeId) -> String {
    let mut raw = String::new();
    collect(nodes, node_id, &mut raw);

    raw.split('\n')
        .map(|line| WHITESPACE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect(nodes: &HashMap<NodeId, NodeData>, node_id: NodeId, out: &mut String) {
    let Some(node) = nodes.get(&node_id) else {
        return;
    };

    match node.node_type {
        NodeType::Text => {
            if let Some(ref text) = node.text_content {
                // Newlines inside source text are plain whitespace
                out.push_str(&text.replace('\n', " "));
            }
        }
        NodeType::Document => {
            for &child in &node.children {
                collect(nodes, child, out);
            }
        }
        NodeType::Element => {
            let tag = node.tag_name.as_deref().unwrap_or_default();
            if NON_RENDERED.contains(&tag) || is_hidden(node) {
                return;
            }
            if tag == "br" {
                out.push('\n');
                return;
            }

            let block = BLOCK_LEVEL.contains(&tag);
            if block {
                out.push('\n');
            }
            for &child in &node.children {
                collect(nodes, child, out);
            }
            if block {
                out.push('\n');
            } else if matches!(tag, "td" | "th") {
                out.push(' ');
            }
        }
        _ => {}
    }
}

fn is_hidden(node: &NodeData) -> bool {
    if node.attributes.contains_key("hidden") {
        return true;
    }
    node.attributes
        .get("style")
        .map(|s| DISPLAY_NONE.is_match(s))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_html;

    #[test]
    fn test_block_elements_break_lines() {
        let doc = parse_html(
            "<body><h1>Title</h1><div>First   line</div><p>Second<br>Third</p></body>",
        )
        .unwrap();
        let body = doc.body().unwrap();
        assert_eq!(body.inner_text(), "Title\nFirst line\nSecond\nThird");
    }

    #[test]
    fn test_non_rendered_content_skipped() {
        let doc = parse_html(
            "<html><head><title>T</title><style>p{}</style></head>\
             <body><script>var x = 1;</script><span hidden>secret</span>\
             <span style=\"display: none\">gone</span><span>shown</span></body></html>",
        )
        .unwrap();
        assert_eq!(doc.body().unwrap().inner_text(), "shown");
    }
}
