// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! DOM Node types

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::text;

/// Shared node storage of one document
pub(crate) type NodeStore = Arc<RwLock<HashMap<NodeId, NodeData>>>;

/// Unique node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a new unique node ID
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Document node
    Document,
    /// Element node (like <div>, <p>, etc.)
    Element,
    /// Text node
    Text,
    /// Comment node
    Comment,
    /// Document type node (<!DOCTYPE>)
    DocumentType,
}

/// Internal node data
#[derive(Debug)]
pub struct NodeData {
    /// Node type
    pub node_type: NodeType,
    /// Tag name (for elements, lowercase)
    pub tag_name: Option<String>,
    /// Text content (for text/comment nodes)
    pub text_content: Option<String>,
    /// Attributes (for elements)
    pub attributes: HashMap<String, String>,
    /// Attribute names in source order
    pub attribute_order: Vec<String>,
    /// Parent node ID
    pub parent: Option<NodeId>,
    /// Child node IDs
    pub children: Vec<NodeId>,
}

impl NodeData {
    fn empty(node_type: NodeType) -> Self {
        Self {
            node_type,
            tag_name: None,
            text_content: None,
            attributes: HashMap::new(),
            attribute_order: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Create a new element node data
    pub fn element(tag_name: impl Into<String>) -> Self {
        let mut data = Self::empty(NodeType::Element);
        data.tag_name = Some(tag_name.into().to_lowercase());
        data
    }

    /// Create a new text node data
    pub fn text(content: impl Into<String>) -> Self {
        let mut data = Self::empty(NodeType::Text);
        data.text_content = Some(content.into());
        data
    }

    /// Create a new comment node data
    pub fn comment(content: impl Into<String>) -> Self {
        let mut data = Self::empty(NodeType::Comment);
        data.text_content = Some(content.into());
        data
    }

    /// Create a new doctype node data
    pub fn doctype() -> Self {
        Self::empty(NodeType::DocumentType)
    }

    /// Create a new document node data
    pub fn document() -> Self {
        Self::empty(NodeType::Document)
    }

    /// Add an attribute, keeping source order
    pub fn push_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        if !self.attributes.contains_key(&name) {
            self.attribute_order.push(name.clone());
        }
        self.attributes.insert(name, value.into());
    }
}

/// A reference to a node in the DOM tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Node ID
    pub id: NodeId,
    /// Reference to document's node storage
    nodes: NodeStore,
}

impl Node {
    /// Create a new node reference
    pub(crate) fn new(id: NodeId, nodes: NodeStore) -> Self {
        Self { id, nodes }
    }

    pub(crate) fn store(&self) -> &NodeStore {
        &self.nodes
    }

    /// Whether the node still exists in its document
    pub fn is_attached(&self) -> bool {
        self.nodes.read().contains_key(&self.id)
    }

    /// Get the node type
    pub fn node_type(&self) -> NodeType {
        self.nodes
            .read()
            .get(&self.id)
            .map(|n| n.node_type)
            .unwrap_or(NodeType::Element)
    }

    /// Get the tag name (uppercase, like browsers)
    pub fn tag_name(&self) -> Option<String> {
        self.local_name().map(|t| t.to_uppercase())
    }

    /// Get the tag name in lowercase
    pub fn local_name(&self) -> Option<String> {
        self.nodes
            .read()
            .get(&self.id)
            .and_then(|n| n.tag_name.clone())
    }

    /// Get the string value: all descendant text, concatenated
    pub fn text_content(&self) -> String {
        self.descendant_texts().concat()
    }

    /// Get every descendant text node's contents, in document order
    pub fn descendant_texts(&self) -> Vec<String> {
        let nodes = self.nodes.read();
        let mut out = Vec::new();
        collect_texts(&nodes, self.id, &mut out);
        out
    }

    /// Get the contents of the direct text children, in order
    pub fn direct_texts(&self) -> Vec<String> {
        let nodes = self.nodes.read();
        nodes
            .get(&self.id)
            .map(|n| {
                n.children
                    .iter()
                    .filter_map(|id| nodes.get(id))
                    .filter(|c| c.node_type == NodeType::Text)
                    .filter_map(|c| c.text_content.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the rendered text, the way a browser reports `innerText`
    pub fn inner_text(&self) -> String {
        let nodes = self.nodes.read();
        text::inner_text(&nodes, self.id)
    }

    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.nodes
            .read()
            .get(&self.id)
            .and_then(|n| n.attributes.get(&name.to_lowercase()).cloned())
    }

    /// Check if has an attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.nodes
            .read()
            .get(&self.id)
            .map(|n| n.attributes.contains_key(&name.to_lowercase()))
            .unwrap_or(false)
    }

    /// Get all attributes in source order
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.nodes
            .read()
            .get(&self.id)
            .map(|n| {
                n.attribute_order
                    .iter()
                    .filter_map(|k| n.attributes.get(k).map(|v| (k.clone(), v.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get parent node
    pub fn parent(&self) -> Option<Node> {
        self.nodes
            .read()
            .get(&self.id)
            .and_then(|n| n.parent)
            .map(|id| Node::new(id, self.nodes.clone()))
    }

    /// Get child nodes
    pub fn children(&self) -> Vec<Node> {
        self.nodes
            .read()
            .get(&self.id)
            .map(|n| {
                n.children
                    .iter()
                    .map(|&id| Node::new(id, self.nodes.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        self.node_type() == NodeType::Text
    }

    /// Check if this is the document node
    pub fn is_document(&self) -> bool {
        self.node_type() == NodeType::Document
    }
}

fn collect_texts(nodes: &HashMap<NodeId, NodeData>, node_id: NodeId, out: &mut Vec<String>) {
    let Some(node) = nodes.get(&node_id) else {
        return;
    };
    match node.node_type {
        NodeType::Text => out.extend(node.text_content.clone()),
        NodeType::Element | NodeType::Document => {
            for &child in &node.children {
                collect_texts(nodes, child, out);
            }
        }
        _ => {}
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_node_id() {
        let id1 = NodeId::new();
        let id2 = NodeId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_node_data() {
        let mut element = NodeData::element("DIV");
        assert_eq!(element.tag_name, Some("div".to_string()));
        assert_eq!(element.node_type, NodeType::Element);

        element.push_attribute("Title", "x");
        element.push_attribute("alt", "y");
        assert_eq!(element.attribute_order, vec!["title", "alt"]);

        let text = NodeData::text("Hello");
        assert_eq!(text.text_content, Some("Hello".to_string()));
        assert_eq!(text.node_type, NodeType::Text);
    }

    #[test]
    fn test_direct_texts_and_string_value() {
        let doc = parse_html("<p>Hello <b>big</b> world</p>").unwrap();
        let p = doc.query_selector("p").unwrap();
        assert_eq!(p.direct_texts(), vec!["Hello ", " world"]);
        assert_eq!(p.text_content(), "Hello big world");
        assert_eq!(p.descendant_texts(), vec!["Hello ", "big", " world"]);
    }
}
