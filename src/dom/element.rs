// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Element-specific DOM operations

use super::node::{Node, NodeId, NodeStore, NodeType};
use super::selector::Selector;

/// Element node with extended operations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    /// Inner node reference
    pub node: Node,
}

impl Element {
    /// Create a new element from a node
    pub fn new(node: Node) -> Option<Self> {
        if node.node_type() == NodeType::Element {
            Some(Self { node })
        } else {
            None
        }
    }

    /// Create element from node ID
    pub(crate) fn from_id(id: NodeId, nodes: NodeStore) -> Option<Self> {
        Self::new(Node::new(id, nodes))
    }

    /// Get the tag name (uppercase)
    pub fn tag_name(&self) -> String {
        self.node.tag_name().unwrap_or_default()
    }

    /// Get local name (lowercase)
    pub fn local_name(&self) -> String {
        self.node.local_name().unwrap_or_default()
    }

    /// Get element ID
    pub fn id(&self) -> Option<String> {
        self.node.get_attribute("id")
    }

    /// Get an attribute
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.node.get_attribute(name)
    }

    /// Check if has attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.node.has_attribute(name)
    }

    /// Get all attributes in source order
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.node.attributes()
    }

    /// Get the string value (all descendant text)
    pub fn text_content(&self) -> String {
        self.node.text_content()
    }

    /// Get the rendered text
    pub fn inner_text(&self) -> String {
        self.node.inner_text()
    }

    /// Get parent element
    pub fn parent_element(&self) -> Option<Element> {
        self.node.parent().and_then(Element::new)
    }

    /// Get child elements (only element nodes)
    pub fn children(&self) -> Vec<Element> {
        self.node
            .children()
            .into_iter()
            .filter_map(Element::new)
            .collect()
    }

    /// Get the 1-based position among element siblings sharing this tag
    pub fn same_tag_position(&self) -> usize {
        let tag = self.local_name();
        let Some(parent) = self.node.parent() else {
            return 1;
        };

        let mut position = 1;
        for sibling in parent.children() {
            if sibling.id == self.node.id {
                break;
            }
            if sibling.is_element() && sibling.local_name().as_deref() == Some(tag.as_str()) {
                position += 1;
            }
        }
        position
    }

    /// Count element siblings (including self) sharing this tag
    pub fn same_tag_count(&self) -> usize {
        let tag = self.local_name();
        match self.node.parent() {
            Some(parent) => parent
                .children()
                .iter()
                .filter(|c| c.is_element() && c.local_name().as_deref() == Some(tag.as_str()))
                .count(),
            None => 1,
        }
    }

    /// Find the nth (1-based) child element with the given tag
    pub fn nth_child_with_tag(&self, tag: &str, n: usize) -> Option<Element> {
        self.children()
            .into_iter()
            .filter(|c| c.local_name().eq_ignore_ascii_case(tag))
            .nth(n.checked_sub(1)?)
    }

    /// Query selector all - find all matching descendants (and self)
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        match Selector::parse(selector) {
            Ok(sel) => {
                let mut results = Vec::new();
                self.collect_matching(&sel, &mut results);
                results
            }
            Err(_) => Vec::new(),
        }
    }

    fn collect_matching(&self, selector: &Selector, results: &mut Vec<Element>) {
        if selector.matches(&self.node) {
            results.push(self.clone());
        }
        for child in self.children() {
            child.collect_matching(selector, results);
        }
    }

    /// Check if element matches a selector
    pub fn matches(&self, selector: &str) -> bool {
        Selector::parse(selector)
            .map(|sel| sel.matches(&self.node))
            .unwrap_or(false)
    }

    /// Get src for frames, images, scripts, etc.
    pub fn src(&self) -> Option<String> {
        self.get_attribute("src")
    }

    /// Whether this is an `iframe` or legacy `frame` element
    pub fn is_frame(&self) -> bool {
        matches!(self.local_name().as_str(), "iframe" | "frame")
    }
}

impl std::ops::Deref for Element {
    type Target = Node;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_html;

    #[test]
    fn test_same_tag_position() {
        let doc = parse_html(
            "<body><div>a</div><iframe name=\"one\"></iframe><div>b</div><iframe name=\"two\"></iframe></body>",
        )
        .unwrap();
        let frames = doc.query_selector_all("iframe");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].same_tag_position(), 1);
        assert_eq!(frames[1].same_tag_position(), 2);
        assert_eq!(frames[1].same_tag_count(), 2);
    }

    #[test]
    fn test_nth_child_with_tag() {
        let doc = parse_html("<body><p>1</p><span>x</span><p>2</p></body>").unwrap();
        let body = doc.body().unwrap();
        let second = body.nth_child_with_tag("p", 2).unwrap();
        assert_eq!(second.text_content(), "2");
        assert!(body.nth_child_with_tag("p", 0).is_none());
        assert!(body.nth_child_with_tag("p", 3).is_none());
    }
}
