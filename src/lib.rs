// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Kehys - Iframe Scanner
//!
//! Finds every frame on a page, however deeply nested, and searches all of
//! them for a piece of text.
//!
//! ## Features
//!
//! - Recursive discovery of `iframe` and `frame` elements up to depth 10
//! - Same-origin enforcement when entering frames
//! - Six complementary text search strategies, run in every accessible frame
//! - Structural locators for each frame and match
//! - Console and JSON reports
//! - Static markup fallback that needs no frame loading at all
//! - Web orchestrator with live progress over server-sent events
//! - Optional WebDriver backend (`webdriver` feature)
//!
//! ## Example
//!
//! ```rust,no_run
//! use kehys::{BrowserConfig, ScanInput, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scanner = Scanner::native(BrowserConfig::default())?;
//!     let input = ScanInput::Url("https://example.com".into());
//!
//!     let report = scanner.scan(&input, Some("Hello")).await?;
//!     println!("{}", kehys::report::render(&report));
//!
//!     scanner.close().await;
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod dom;
pub mod error;
pub mod http;
pub mod markup;
pub mod report;
pub mod scanner;
pub mod server;

// Re-exports for convenience

// Browser session
pub use browser::{BrowserConfig, BrowserSession, By, DriverKind, FrameDriver, NativeDriver, ScanInput};

#[cfg(feature = "webdriver")]
pub use browser::WebDriverDriver;

// Scanning
pub use scanner::{
    run_scan, run_scan_until, EventSink, FrameRecord, MatchRecord, ScanEvent, ScanOptions, ScanPhase, Scanner,
    SearchResults, TextMatcher,
};

// Reports
pub use report::{ScanReport, ScanSummary};

// Static fallback
pub use markup::find_frame_locators;

// Server
pub use server::{serve, ServerConfig};

// Error
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
