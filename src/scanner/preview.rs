// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Content previews of browsing contexts

use crate::browser::FrameDriver;
use crate::error::Result;

use super::ScanOptions;

/// Separator between preview lines
pub const LINE_SEPARATOR: &str = " | ";

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Condense visible text: truncate, drop blank lines, keep the first few
pub fn condense(text: &str, max_chars: usize, max_lines: usize) -> String {
    truncate_chars(text, max_chars)
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(max_lines)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Summarize the current context as `Title: .. | Content: ..`
///
/// Never fails; errors are embedded in the returned text.
pub async fn content_preview<D: FrameDriver>(driver: &mut D, options: &ScanOptions) -> String {
    match try_preview(driver, options).await {
        Ok(preview) => preview,
        Err(e) => format!("Error getting preview: {}", e),
    }
}

async fn try_preview<D: FrameDriver>(driver: &mut D, options: &ScanOptions) -> Result<String> {
    let title = driver.title().await?;
    let text = driver.body_text().await?;
    let preview = condense(&text, options.preview_chars, options.preview_lines);

    if title.is_empty() {
        Ok(format!("Content: {}", preview))
    } else {
        Ok(format!("Title: {} | Content: {}", title, preview))
    }
}
