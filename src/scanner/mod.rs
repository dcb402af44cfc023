// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Iframe scanner
//!
//! Loads a page, walks every reachable frame and optionally searches all of
//! them for a piece of text:
//!
//! - [`walker`] discovers the frame hierarchy
//! - [`preview`] summarizes each entered frame
//! - [`matcher`] holds the six text strategies
//! - [`search`] runs the strategies in every accessible context

pub mod events;
pub mod matcher;
pub mod preview;
pub mod record;
pub mod search;
pub mod walker;

pub use events::{EventSink, LogLevel, ScanEvent, ScanPhase};
pub use matcher::{
    default_matchers, AttributeText, CaseInsensitive, ContainsText, DescendantText, ExactText,
    FirstWord, TextMatcher, SEARCHED_ATTRIBUTES,
};
pub use preview::content_preview;
pub use record::{display_path, FrameRecord, MatchRecord, SearchResults, PATH_SEPARATOR, ROOT_LABEL};
pub use search::{search_context, search_everywhere};
pub use walker::{discover, frame_label};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::browser::{BrowserConfig, BrowserSession, DriverKind, FrameDriver, NativeDriver, ScanInput};
use crate::error::{Error, Result};
use crate::report::ScanReport;

/// Limits applied while scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Deepest frame nesting that is enumerated
    pub max_depth: usize,
    /// Characters of body text considered for a preview
    pub preview_chars: usize,
    /// Non-empty lines kept in a preview
    pub preview_lines: usize,
    /// Characters kept in a match snippet
    pub snippet_chars: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            preview_chars: 200,
            preview_lines: 3,
            snippet_chars: 100,
        }
    }
}

/// Runs scans over one browser session
pub struct Scanner<D: FrameDriver> {
    session: BrowserSession<D>,
    options: ScanOptions,
    matchers: Vec<Box<dyn TextMatcher>>,
    events: EventSink,
}

impl Scanner<NativeDriver> {
    /// Scanner backed by the in-process engine
    pub fn native(config: BrowserConfig) -> Result<Self> {
        let driver = NativeDriver::new(config.clone())?;
        Ok(Self::new(BrowserSession::new(driver, config), ScanOptions::default()))
    }
}

impl<D: FrameDriver> Scanner<D> {
    pub fn new(session: BrowserSession<D>, options: ScanOptions) -> Self {
        Self {
            session,
            options,
            matchers: default_matchers(),
            events: EventSink::none(),
        }
    }

    /// Publish progress on `events`
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Replace the strategy battery
    pub fn with_matchers(mut self, matchers: Vec<Box<dyn TextMatcher>>) -> Self {
        self.matchers = matchers;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn session(&mut self) -> &mut BrowserSession<D> {
        &mut self.session
    }

    /// Load `input`, discover its frames and search them when `search_text`
    /// is non-blank
    ///
    /// Only session-level failures are returned; frame and strategy errors
    /// end up in the report.
    pub async fn scan(&mut self, input: &ScanInput, search_text: Option<&str>) -> Result<ScanReport> {
        let outcome = self.run(input, search_text).await;
        self.session.return_to_top().await;
        if let Err(ref e) = outcome {
            self.events.error(format!("Scan failed: {}", e));
        }
        outcome
    }

    async fn run(&mut self, input: &ScanInput, search_text: Option<&str>) -> Result<ScanReport> {
        match input {
            ScanInput::Url(url) => self
                .events
                .phase(ScanPhase::Loading, format!("Loading URL: {}", url)),
            ScanInput::Html(_) => self.events.phase(ScanPhase::Loading, "Loading HTML content"),
        }
        self.session.load(input).await?;

        self.events
            .phase(ScanPhase::Discovering, "Discovering iframe hierarchy");
        let mut frames = discover(&mut self.session, &self.options, &self.events).await?;
        let accessible = frames.iter().filter(|f| f.accessible).count();
        self.events.info(format!(
            "Found {} iframes ({} accessible)",
            frames.len(),
            accessible
        ));

        let query = search_text.map(str::trim).filter(|q| !q.is_empty());
        let results = match query {
            Some(query) => {
                self.events
                    .phase(ScanPhase::Searching, format!("Searching for: '{}'", query));
                let results = search_everywhere(
                    &mut self.session,
                    &mut frames,
                    &self.matchers,
                    query,
                    &self.options,
                    &self.events,
                )
                .await?;
                self.events.info(format!(
                    "Found {} text location(s)",
                    results.total_locations_found
                ));
                Some(results)
            }
            None => None,
        };

        self.events.phase(ScanPhase::Finalizing, "Processing results");
        Ok(ScanReport::new(frames, results))
    }

    /// Release the browser session
    pub async fn close(&mut self) {
        self.session.close().await;
    }
}

/// Build a scanner for `config.driver`, run one scan and close it
pub async fn run_scan(
    config: BrowserConfig,
    options: ScanOptions,
    input: &ScanInput,
    search_text: Option<&str>,
    events: EventSink,
) -> Result<ScanReport> {
    run_scan_until(config, options, input, search_text, events, CancellationToken::new()).await
}

/// Like [`run_scan`], giving up with [`Error::Cancelled`] once `cancel`
/// fires
///
/// The browser session is closed either way.
pub async fn run_scan_until(
    config: BrowserConfig,
    options: ScanOptions,
    input: &ScanInput,
    search_text: Option<&str>,
    events: EventSink,
    cancel: CancellationToken,
) -> Result<ScanReport> {
    events.phase(ScanPhase::Initializing, "Starting browser session");
    match config.driver {
        DriverKind::Native => {
            let driver = NativeDriver::new(config.clone())?;
            let session = BrowserSession::new(driver, config);
            let scanner = Scanner::new(session, options).with_events(events);
            scan_once(scanner, input, search_text, &cancel).await
        }
        #[cfg(feature = "webdriver")]
        DriverKind::WebDriver => {
            let driver = crate::browser::WebDriverDriver::connect(&config).await?;
            let session = BrowserSession::new(driver, config);
            let scanner = Scanner::new(session, options).with_events(events);
            scan_once(scanner, input, search_text, &cancel).await
        }
        #[cfg(not(feature = "webdriver"))]
        DriverKind::WebDriver => Err(Error::session(
            "WebDriver support is not compiled in; rebuild with --features webdriver",
        )),
    }
}

async fn scan_once<D: FrameDriver>(
    mut scanner: Scanner<D>,
    input: &ScanInput,
    search_text: Option<&str>,
    cancel: &CancellationToken,
) -> Result<ScanReport> {
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!("scan cancelled, closing browser session");
            Err(Error::Cancelled)
        }
        outcome = scanner.scan(input, search_text) => outcome,
    };
    scanner.close().await;
    outcome
}
