// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Client-facing result views

use serde::Serialize;

use crate::report::ScanReport;

use super::events::CompletionSummary;

/// Summary block of finished scan results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub total_iframes: usize,
    pub accessible_iframes: usize,
    pub inaccessible_iframes: usize,
    pub total_matches: usize,
    pub search_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameView {
    pub path: String,
    pub id: String,
    pub name: String,
    pub src: String,
    pub title: String,
    pub class: String,
    pub xpath: String,
    pub accessible: bool,
    pub error: String,
    pub preview: String,
    pub matches_found: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchView {
    pub location_path: String,
    pub element_tag: String,
    pub element_text: String,
    pub element_xpath: String,
    pub strategy_used: String,
    pub found_text: String,
}

/// Results as served by the results endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResults {
    pub summary: ResultSummary,
    pub iframes: Vec<FrameView>,
    pub matches: Vec<MatchView>,
}

impl ScanResults {
    pub fn completion_summary(&self) -> CompletionSummary {
        CompletionSummary {
            total_iframes: self.summary.total_iframes,
            accessible_iframes: self.summary.accessible_iframes,
            total_matches: self.summary.total_matches,
        }
    }
}

impl From<&ScanReport> for ScanResults {
    fn from(report: &ScanReport) -> Self {
        let summary = ResultSummary {
            total_iframes: report.scan_summary.total_iframes_found,
            accessible_iframes: report.scan_summary.accessible_iframes,
            inaccessible_iframes: report.scan_summary.inaccessible_iframes,
            total_matches: report.total_matches(),
            search_text: report
                .search_results
                .as_ref()
                .map(|r| r.search_text.clone())
                .unwrap_or_default(),
        };

        let iframes = report
            .iframe_details
            .iter()
            .map(|d| FrameView {
                path: d.hierarchy_path.clone(),
                id: d.id.clone(),
                name: d.name.clone(),
                src: d.src.clone(),
                title: d.title.clone(),
                class: d.class.clone(),
                xpath: d.xpath.clone(),
                accessible: d.is_accessible,
                error: d.error_message.clone().unwrap_or_default(),
                preview: d.content_preview.clone().unwrap_or_default(),
                matches_found: d.text_found_count,
            })
            .collect();

        let matches = report
            .search_results
            .iter()
            .flat_map(|r| r.locations.iter())
            .map(|m| MatchView {
                location_path: m.location_display(),
                element_tag: m.tag.clone(),
                element_text: m.text_snippet.clone(),
                element_xpath: m.element_locator.clone(),
                strategy_used: m.strategy.clone(),
                found_text: m.query.clone(),
            })
            .collect();

        Self {
            summary,
            iframes,
            matches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{BrowserConfig, ScanInput};
    use crate::scanner::Scanner;

    #[tokio::test]
    async fn test_views_from_report() {
        let mut scanner = Scanner::native(BrowserConfig::for_testing()).unwrap();
        let report = scanner
            .scan(
                &ScanInput::Html("<iframe id='a' srcdoc='<p>Hello</p>'></iframe>".into()),
                Some("Hello"),
            )
            .await
            .unwrap();
        let results = ScanResults::from(&report);

        assert_eq!(results.summary.total_iframes, 1);
        assert_eq!(results.summary.search_text, "Hello");
        assert_eq!(results.summary.total_matches, results.matches.len());
        assert_eq!(results.iframes[0].path, "main_page → id='a'");
        assert_eq!(results.iframes[0].error, "");
        assert!(results
            .matches
            .iter()
            .any(|m| m.location_path == "main_page → id='a'" && m.element_tag == "p"));
    }
}
