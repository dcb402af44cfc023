// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan records

use serde::{Deserialize, Serialize};

/// Label of the top-level document in hierarchy paths
pub const ROOT_LABEL: &str = "main_page";

/// Separator used when rendering hierarchy paths
pub const PATH_SEPARATOR: &str = " → ";

/// Render a hierarchy path for display
pub fn display_path(path: &[String]) -> String {
    path.join(PATH_SEPARATOR)
}

/// One discovered frame-like element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Position among the frames of its context
    pub index: usize,
    pub id: String,
    pub name: String,
    pub src: String,
    pub title: String,
    #[serde(rename = "class")]
    pub class_name: String,
    /// Structural path within the parent context
    pub locator: String,
    /// Labels from the top-level document down to this frame
    pub hierarchy_path: Vec<String>,
    pub accessible: bool,
    pub error_message: Option<String>,
    pub content_preview: Option<String>,
    /// Matches found inside this frame
    pub matches: Vec<MatchRecord>,
    /// Inventory index of the record of the enclosing frame
    pub parent: Option<usize>,
}

impl FrameRecord {
    /// Nesting depth; top-level frames are at depth 1
    pub fn depth(&self) -> usize {
        self.hierarchy_path.len().saturating_sub(1)
    }

    /// This frame's own label
    pub fn label(&self) -> &str {
        self.hierarchy_path
            .last()
            .map(String::as_str)
            .unwrap_or(ROOT_LABEL)
    }

    /// Hierarchy path joined for display
    pub fn path_display(&self) -> String {
        display_path(&self.hierarchy_path)
    }

    /// Mark the frame as not enterable
    pub fn mark_inaccessible(&mut self, error: impl Into<String>) {
        self.accessible = false;
        self.error_message = Some(error.into());
    }
}

/// One (strategy, element) hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Hierarchy path of the context the element was found in
    pub location_path: Vec<String>,
    /// e.g. `Strategy 2`
    pub strategy: String,
    /// XPath expression the strategy evaluated
    pub xpath_used: String,
    /// Structural path of the matched element
    pub element_locator: String,
    pub tag: String,
    pub text_snippet: String,
    pub query: String,
}

impl MatchRecord {
    /// Location path joined for display
    pub fn location_display(&self) -> String {
        display_path(&self.location_path)
    }
}

/// Aggregate search output of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub search_text: String,
    pub total_locations_found: usize,
    pub locations: Vec<MatchRecord>,
}

impl SearchResults {
    /// Empty results for a query
    pub fn new(search_text: impl Into<String>) -> Self {
        Self {
            search_text: search_text.into(),
            total_locations_found: 0,
            locations: Vec::new(),
        }
    }

    /// Append the matches of one context
    pub fn extend(&mut self, matches: &[MatchRecord]) {
        self.total_locations_found += matches.len();
        self.locations.extend_from_slice(matches);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_and_label() {
        let record = FrameRecord {
            index: 0,
            id: "outer".into(),
            name: String::new(),
            src: String::new(),
            title: String::new(),
            class_name: String::new(),
            locator: "//*[@id='outer']".into(),
            hierarchy_path: vec![ROOT_LABEL.into(), "id='outer'".into()],
            accessible: true,
            error_message: None,
            content_preview: None,
            matches: Vec::new(),
            parent: None,
        };
        assert_eq!(record.depth(), 1);
        assert_eq!(record.label(), "id='outer'");
        assert_eq!(record.path_display(), "main_page → id='outer'");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["class"], "");
    }

    #[test]
    fn test_search_results_extend() {
        let mut results = SearchResults::new("Hello");
        let hit = MatchRecord {
            location_path: vec![ROOT_LABEL.into()],
            strategy: "Strategy 1".into(),
            xpath_used: "//*[text()='Hello']".into(),
            element_locator: "/html/body/p[1]".into(),
            tag: "p".into(),
            text_snippet: "Hello".into(),
            query: "Hello".into(),
        };
        results.extend(&[hit.clone(), hit]);
        assert_eq!(results.total_locations_found, 2);
        assert_eq!(results.locations.len(), 2);
    }
}
