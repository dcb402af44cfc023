// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan reports
//!
//! A [`ScanReport`] is plain data built once at the end of a scan. It
//! serializes to JSON for programmatic consumers and renders to a console
//! report with [`render`].

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::scanner::{display_path, FrameRecord, SearchResults};

const RULE_WIDE: usize = 80;
const RULE_NARROW: usize = 60;

/// Locations listed in a completion summary
pub const SUMMARY_LOCATIONS: usize = 5;

/// Frame counts of one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_iframes_found: usize,
    pub accessible_iframes: usize,
    pub inaccessible_iframes: usize,
}

/// Display-oriented view of one frame record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDetail {
    pub hierarchy_path: String,
    pub id: String,
    pub name: String,
    pub src: String,
    pub title: String,
    pub class: String,
    pub xpath: String,
    pub is_accessible: bool,
    pub error_message: Option<String>,
    pub content_preview: Option<String>,
    pub text_found_count: usize,
}

impl From<&FrameRecord> for FrameDetail {
    fn from(record: &FrameRecord) -> Self {
        Self {
            hierarchy_path: record.path_display(),
            id: record.id.clone(),
            name: record.name.clone(),
            src: record.src.clone(),
            title: record.title.clone(),
            class: record.class_name.clone(),
            xpath: record.locator.clone(),
            is_accessible: record.accessible,
            error_message: record.error_message.clone(),
            content_preview: record.content_preview.clone(),
            text_found_count: record.matches.len(),
        }
    }
}

/// Aggregate output of one scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub scan_summary: ScanSummary,
    pub iframe_details: Vec<FrameDetail>,
    pub search_results: Option<SearchResults>,
    /// Full records, in discovery order
    #[serde(skip)]
    pub frames: Vec<FrameRecord>,
}

impl ScanReport {
    pub fn new(frames: Vec<FrameRecord>, search_results: Option<SearchResults>) -> Self {
        let accessible = frames.iter().filter(|f| f.accessible).count();
        Self {
            scan_summary: ScanSummary {
                total_iframes_found: frames.len(),
                accessible_iframes: accessible,
                inaccessible_iframes: frames.len() - accessible,
            },
            iframe_details: frames.iter().map(FrameDetail::from).collect(),
            search_results,
            frames,
        }
    }

    /// Number of matches across all contexts
    pub fn total_matches(&self) -> usize {
        self.search_results
            .as_ref()
            .map_or(0, |r| r.total_locations_found)
    }
}

/// Render the console report
pub fn render(report: &ScanReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &ScanReport) -> std::fmt::Result {
    let wide = "=".repeat(RULE_WIDE);
    let narrow = "-".repeat(RULE_NARROW);

    writeln!(out, "{}", wide)?;
    writeln!(out, "IFRAME SCAN REPORT")?;
    writeln!(out, "{}", wide)?;

    let summary = &report.scan_summary;
    writeln!(out, "\nSCAN SUMMARY:")?;
    writeln!(out, "   Total iframes found: {}", summary.total_iframes_found)?;
    writeln!(out, "   Accessible iframes: {}", summary.accessible_iframes)?;
    writeln!(out, "   Inaccessible iframes: {}", summary.inaccessible_iframes)?;

    if let Some(ref search) = report.search_results {
        writeln!(out, "\nSEARCH RESULTS for '{}':", search.search_text)?;
        writeln!(out, "   Total matches found: {}", search.total_locations_found)?;
    }

    writeln!(out, "\nIFRAME DETAILS:")?;
    writeln!(out, "{}", narrow)?;
    if report.iframe_details.is_empty() {
        writeln!(out, "   No iframes found on this page.")?;
    }
    for (i, frame) in report.iframe_details.iter().enumerate() {
        let status = if frame.is_accessible { "Accessible" } else { "Blocked" };
        writeln!(out, "\n   #{}. {}", i + 1, frame.hierarchy_path)?;
        writeln!(out, "       Status: {}", status)?;
        for (label, value) in [
            ("ID", &frame.id),
            ("Name", &frame.name),
            ("Source", &frame.src),
            ("Title", &frame.title),
        ] {
            if !value.is_empty() {
                writeln!(out, "       {}: {}", label, value)?;
            }
        }
        if let Some(preview) = frame.content_preview.as_deref().filter(|p| !p.is_empty()) {
            writeln!(out, "       Preview: {}", preview)?;
        }
        if frame.text_found_count > 0 {
            writeln!(out, "       Found {} text match(es)!", frame.text_found_count)?;
        }
        if let Some(ref error) = frame.error_message {
            writeln!(out, "       Error: {}", error)?;
        }
    }

    if let Some(search) = report.search_results.as_ref().filter(|s| !s.locations.is_empty()) {
        writeln!(out, "\nDETAILED SEARCH RESULTS:")?;
        writeln!(out, "{}", narrow)?;
        for (i, hit) in search.locations.iter().enumerate() {
            writeln!(out, "\n   Match #{}:", i + 1)?;
            writeln!(out, "       Location: {}", hit.location_display())?;
            writeln!(out, "       Strategy: {}", hit.strategy)?;
            writeln!(out, "       Element: <{}>", hit.tag)?;
            writeln!(out, "       Text: {}", hit.text_snippet)?;
            writeln!(out, "       XPath: {}", hit.element_locator)?;
        }
    }

    writeln!(out, "\n{}", wide)
}

/// Short closing summary: counts plus the first few match locations
pub fn completion_summary(report: &ScanReport, search_text: Option<&str>) -> String {
    let mut lines = vec![
        "SCAN COMPLETE".to_string(),
        format!("   Found {} iframe(s)", report.scan_summary.total_iframes_found),
    ];

    let Some(text) = search_text else {
        return lines.join("\n");
    };
    let locations = report
        .search_results
        .as_ref()
        .map(|r| r.locations.as_slice())
        .unwrap_or_default();

    lines.push(format!(
        "   Found '{}' in {} location(s)",
        text,
        report.total_matches()
    ));
    if locations.is_empty() {
        lines.push(format!("Text '{}' not found", text));
        return lines.join("\n");
    }

    lines.push("\nFound in these locations:".to_string());
    for (i, hit) in locations.iter().take(SUMMARY_LOCATIONS).enumerate() {
        lines.push(format!("   {}. {}", i + 1, display_path(&hit.location_path)));
    }
    if locations.len() > SUMMARY_LOCATIONS {
        lines.push(format!(
            "   ... and {} more",
            locations.len() - SUMMARY_LOCATIONS
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{MatchRecord, ROOT_LABEL};

    fn record(label: &str, accessible: bool) -> FrameRecord {
        FrameRecord {
            index: 0,
            id: label.into(),
            name: String::new(),
            src: String::new(),
            title: String::new(),
            class_name: "ad".into(),
            locator: format!("//*[@id='{}']", label),
            hierarchy_path: vec![ROOT_LABEL.into(), format!("id='{}'", label)],
            accessible,
            error_message: (!accessible).then(|| "blocked".to_string()),
            content_preview: accessible.then(|| "Content: Hello".to_string()),
            matches: Vec::new(),
            parent: None,
        }
    }

    fn hit(path: &[&str]) -> MatchRecord {
        MatchRecord {
            location_path: path.iter().map(|s| s.to_string()).collect(),
            strategy: "Strategy 1".into(),
            xpath_used: "//*[text()='Hello']".into(),
            element_locator: "/html/body/p[1]".into(),
            tag: "p".into(),
            text_snippet: "Hello".into(),
            query: "Hello".into(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut ok = record("frameB", true);
        ok.matches.push(hit(&[ROOT_LABEL, "id='frameB'"]));
        let report = ScanReport::new(vec![record("frameA", false), ok], None);

        assert_eq!(report.scan_summary.total_iframes_found, 2);
        assert_eq!(report.scan_summary.accessible_iframes, 1);
        assert_eq!(report.scan_summary.inaccessible_iframes, 1);
        assert_eq!(report.iframe_details[1].text_found_count, 1);
        assert_eq!(report.iframe_details[0].hierarchy_path, "main_page → id='frameA'");
    }

    #[test]
    fn test_json_shape() {
        let report = ScanReport::new(vec![record("a", true)], Some(SearchResults::new("x")));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["scan_summary"]["total_iframes_found"], 1);
        assert_eq!(json["iframe_details"][0]["class"], "ad");
        assert_eq!(json["iframe_details"][0]["xpath"], "//*[@id='a']");
        assert_eq!(json["search_results"]["search_text"], "x");
        assert!(json.get("frames").is_none());
    }

    #[test]
    fn test_render_sections() {
        let empty = render(&ScanReport::new(Vec::new(), None));
        assert!(empty.contains("Total iframes found: 0"));
        assert!(empty.contains("No iframes found on this page."));
        assert!(!empty.contains("SEARCH RESULTS"));

        let mut results = SearchResults::new("Hello");
        results.extend(&[hit(&[ROOT_LABEL, "id='a'"])]);
        let text = render(&ScanReport::new(
            vec![record("a", true), record("b", false)],
            Some(results),
        ));
        assert!(text.contains("SEARCH RESULTS for 'Hello':"));
        assert!(text.contains("Status: Blocked"));
        assert!(text.contains("Error: blocked"));
        assert!(text.contains("Preview: Content: Hello"));
        assert!(text.contains("Location: main_page → id='a'"));
        assert!(text.contains("Element: <p>"));
        assert!(text.contains("XPath: /html/body/p[1]"));
    }

    #[test]
    fn test_completion_summary_lists_first_five() {
        let mut results = SearchResults::new("Hello");
        let hits: Vec<_> = (0..7)
            .map(|i| hit(&[ROOT_LABEL, &format!("iframe_{}", i)]))
            .collect();
        results.extend(&hits);
        let report = ScanReport::new(Vec::new(), Some(results));

        let summary = completion_summary(&report, Some("Hello"));
        assert!(summary.contains("Found 'Hello' in 7 location(s)"));
        assert!(summary.contains("5. main_page → iframe_4"));
        assert!(!summary.contains("iframe_5"));
        assert!(summary.contains("... and 2 more"));

        let none = completion_summary(&ScanReport::new(Vec::new(), Some(SearchResults::new("x"))), Some("x"));
        assert!(none.contains("Text 'x' not found"));
    }
}
