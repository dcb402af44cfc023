// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Document representation

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use url::Url;

use super::element::Element;
use super::node::{Node, NodeData, NodeId, NodeStore, NodeType};
use super::selector::Selector;

/// HTML Document representation
#[derive(Debug, Clone)]
pub struct Document {
    /// Document URL
    pub url: Option<Url>,
    /// Document title
    title: Arc<RwLock<String>>,
    /// Root node ID
    root_id: NodeId,
    /// Node storage
    pub(crate) nodes: NodeStore,
    /// Document element (<html>) ID
    document_element_id: Option<NodeId>,
    /// Body element ID
    body_id: Option<NodeId>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        let root_id = NodeId::new();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, NodeData::document());

        Self {
            url: None,
            title: Arc::new(RwLock::new(String::new())),
            root_id,
            nodes: Arc::new(RwLock::new(nodes)),
            document_element_id: None,
            body_id: None,
        }
    }

    /// Create a document with URL
    pub fn with_url(url: Url) -> Self {
        let mut doc = Self::new();
        doc.url = Some(url);
        doc
    }

    /// Get document URL as string
    pub fn url_string(&self) -> Option<String> {
        self.url.as_ref().map(|u| u.to_string())
    }

    /// Get document title
    pub fn title(&self) -> String {
        self.title.read().clone()
    }

    /// Set document title
    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.write() = title.into();
    }

    /// Get the document element (<html>)
    pub fn document_element(&self) -> Option<Element> {
        self.document_element_id
            .and_then(|id| Element::from_id(id, self.nodes.clone()))
    }

    /// Get the <body> element
    pub fn body(&self) -> Option<Element> {
        self.body_id
            .and_then(|id| Element::from_id(id, self.nodes.clone()))
    }

    /// Set document element IDs (called during parsing)
    pub(crate) fn set_elements(&mut self, document_element: Option<NodeId>, body: Option<NodeId>) {
        self.document_element_id = document_element;
        self.body_id = body;
    }

    /// Get the root node
    pub fn root(&self) -> Node {
        Node::new(self.root_id, self.nodes.clone())
    }

    /// Whether the element belongs to this document
    pub fn contains(&self, element: &Element) -> bool {
        Arc::ptr_eq(element.store(), &self.nodes) && element.is_attached()
    }

    /// Query selector - find first matching element
    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        let sel = Selector::parse(selector).ok()?;
        self.elements().into_iter().find(|e| sel.matches(e))
    }

    /// Query selector all - find all matching elements
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        match Selector::parse(selector) {
            Ok(sel) => self.elements().into_iter().filter(|e| sel.matches(e)).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Every element in document order
    pub fn elements(&self) -> Vec<Element> {
        let nodes = self.nodes.read();
        let mut order = Vec::new();
        walk_elements(&nodes, self.root_id, &mut order);
        drop(nodes);

        order
            .into_iter()
            .filter_map(|id| Element::from_id(id, self.nodes.clone()))
            .collect()
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.elements()
            .into_iter()
            .find(|e| e.get_attribute("id").as_deref() == Some(id))
    }

    /// Get the first element carrying the given `name` attribute
    pub fn get_element_by_name(&self, name: &str) -> Option<Element> {
        self.elements()
            .into_iter()
            .find(|e| e.get_attribute("name").as_deref() == Some(name))
    }

    /// Get elements by tag name
    pub fn get_elements_by_tag_name(&self, tag: &str) -> Vec<Element> {
        let tag = tag.to_lowercase();
        self.elements()
            .into_iter()
            .filter(|e| e.local_name() == tag)
            .collect()
    }

    /// Frame-like elements: every `iframe`, then every legacy `frame`
    pub fn frames(&self) -> Vec<Element> {
        let mut frames = self.get_elements_by_tag_name("iframe");
        frames.extend(self.get_elements_by_tag_name("frame"));
        frames
    }

    /// Get all text content
    pub fn text_content(&self) -> String {
        self.root().text_content()
    }

    /// Rendered text of the body (empty when there is no body)
    pub fn body_text(&self) -> String {
        self.body().map(|b| b.inner_text()).unwrap_or_default()
    }
}

fn walk_elements(nodes: &HashMap<NodeId, NodeData>, id: NodeId, out: &mut Vec<NodeId>) {
    let Some(node) = nodes.get(&id) else {
        return;
    };
    if node.node_type == NodeType::Element {
        out.push(id);
    }
    for &child in &node.children {
        walk_elements(nodes, child, out);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_document_creation() {
        let doc = Document::new();
        assert!(doc.url.is_none());
        assert!(doc.title().is_empty());
        assert!(doc.frames().is_empty());
    }

    #[test]
    fn test_query_selector() {
        let doc = parse_html("<html><body><div id='test'>Hello</div></body></html>").unwrap();
        let elem = doc.get_element_by_id("test");
        assert!(elem.is_some());
        assert_eq!(elem.unwrap().text_content(), "Hello");
    }

    #[test]
    fn test_frames_iframes_before_frames() {
        let doc = parse_html(
            "<html><frameset><frame name=\"legacy\"></frameset></html>",
        )
        .unwrap();
        let frames = doc.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].get_attribute("name").as_deref(), Some("legacy"));

        let doc = parse_html(
            "<body><iframe id=\"one\"></iframe><div><iframe id=\"two\"></iframe></div></body>",
        )
        .unwrap();
        let ids: Vec<_> = doc.frames().iter().filter_map(|f| f.id()).collect();
        assert_eq!(ids, vec!["one", "two"]);
    }

    #[test]
    fn test_contains() {
        let a = parse_html("<p id=\"x\">a</p>").unwrap();
        let b = parse_html("<p id=\"x\">b</p>").unwrap();
        let p = a.get_element_by_id("x").unwrap();
        assert!(a.contains(&p));
        assert!(!b.contains(&p));
    }
}
