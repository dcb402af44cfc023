// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DOM engine for HTML parsing and inspection
//!
//! Provides a read-only DOM built on top of html5ever, with the queries
//! the frame scanner needs: selectors, rendered text and XPath locators.

mod document;
mod element;
mod node;
mod parser;
mod selector;
mod text;
pub mod xpath;

pub use document::Document;
pub use element::Element;
pub use node::{Node, NodeId, NodeType};
pub use parser::{parse_html, parse_html_with_url};
pub use selector::Selector;
