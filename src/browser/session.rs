// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser session wrapper
//!
//! Owns one driver and exposes the load and frame-switch primitives the
//! scanner is written against.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use super::config::BrowserConfig;
use super::driver::FrameDriver;
use crate::error::{Error, Result};

/// What to load into the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanInput {
    /// Navigate to a URL
    Url(String),
    /// Inject raw HTML as the document
    Html(String),
}

impl ScanInput {
    /// Build an input from optional parts
    ///
    /// Blank values count as absent. When both are given the URL wins.
    pub fn from_parts(url: Option<String>, html: Option<String>) -> Result<Self> {
        let url = url.filter(|u| !u.trim().is_empty());
        let html = html.filter(|h| !h.trim().is_empty());
        match (url, html) {
            (Some(url), _) => Ok(ScanInput::Url(url.trim().to_string())),
            (None, Some(html)) => Ok(ScanInput::Html(html)),
            (None, None) => Err(Error::invalid_input("either a URL or HTML source is required")),
        }
    }

    /// The URL, when this is a URL input
    pub fn url(&self) -> Option<&str> {
        match self {
            ScanInput::Url(url) => Some(url),
            ScanInput::Html(_) => None,
        }
    }

    /// The HTML source, when this is an HTML input
    pub fn html(&self) -> Option<&str> {
        match self {
            ScanInput::Html(html) => Some(html),
            ScanInput::Url(_) => None,
        }
    }
}

/// A browser session over any driver
pub struct BrowserSession<D: FrameDriver> {
    driver: D,
    config: BrowserConfig,
    closed: bool,
}

impl<D: FrameDriver> BrowserSession<D> {
    /// Wrap a driver
    pub fn new(driver: D, config: BrowserConfig) -> Self {
        Self {
            driver,
            config,
            closed: false,
        }
    }

    /// Session configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// The underlying driver
    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Load a URL or raw HTML as the top-level document
    pub async fn load(&mut self, input: &ScanInput) -> Result<()> {
        if self.closed {
            return Err(Error::session("browser session is closed"));
        }

        match input {
            ScanInput::Url(raw) => {
                let url = Url::parse(raw)
                    .map_err(|e| Error::invalid_input(format!("invalid URL '{}': {}", raw, e)))?;
                info!(url = %url, "loading page");
                self.driver.goto(&url).await?;

                if !self.config.settle_delay.is_zero() {
                    debug!(delay_ms = self.config.settle_delay.as_millis() as u64, "waiting for page to settle");
                    tokio::time::sleep(self.config.settle_delay).await;
                }
            }
            ScanInput::Html(html) => {
                info!(bytes = html.len(), "loading HTML source");
                self.driver.load_html(html).await?;
            }
        }
        Ok(())
    }

    /// Switch into a frame element of the current context
    pub async fn enter_frame(&mut self, element: &D::Element) -> Result<()> {
        self.driver.enter_frame(element).await.map_err(|e| {
            if e.is_frame_access() || e.is_fatal() {
                e
            } else {
                Error::frame(e.to_string())
            }
        })
    }

    /// Switch up one level
    pub async fn return_to_parent(&mut self) -> Result<()> {
        self.driver.enter_parent_frame().await
    }

    /// Switch to the top-level document; failures are ignored
    pub async fn return_to_top(&mut self) {
        if let Err(e) = self.driver.enter_default_content().await {
            debug!(error = %e, "could not return to top-level document");
        }
    }

    /// Release the driver; safe to call more than once
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.driver.quit().await {
            warn!(error = %e, "error closing browser session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{By, NativeDriver};

    fn session() -> BrowserSession<NativeDriver> {
        let config = BrowserConfig::for_testing();
        BrowserSession::new(NativeDriver::new(config.clone()).unwrap(), config)
    }

    #[test]
    fn test_scan_input_from_parts() {
        assert_eq!(
            ScanInput::from_parts(Some("https://a.test".into()), Some("<p>".into())).unwrap(),
            ScanInput::Url("https://a.test".into())
        );
        assert_eq!(
            ScanInput::from_parts(Some("  ".into()), Some("<p>x</p>".into())).unwrap(),
            ScanInput::Html("<p>x</p>".into())
        );
        assert!(matches!(
            ScanInput::from_parts(None, Some(String::new())),
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_is_invalid_input() {
        let mut session = session();
        let err = session
            .load(&ScanInput::Url("not a url".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_frame_switching() {
        let mut session = session();
        session
            .load(&ScanInput::Html(
                "<iframe id=\"f\" srcdoc=\"<p>in</p>\"></iframe><p>out</p>".into(),
            ))
            .await
            .unwrap();

        let frame = session.driver().find_element(&By::Id("f".into())).await.unwrap();
        session.enter_frame(&frame).await.unwrap();
        assert_eq!(session.driver().body_text().await.unwrap(), "in");

        session.return_to_top().await;
        assert_eq!(session.driver().body_text().await.unwrap(), "out");

        // Elements of another context cannot be entered
        session.enter_frame(&frame).await.unwrap();
        let err = session.enter_frame(&frame).await.unwrap_err();
        assert!(err.is_frame_access());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut session = session();
        session.close().await;
        session.close().await;
        assert!(session.is_closed());
        session.return_to_top().await;
        assert!(session.load(&ScanInput::Html("<p>x</p>".into())).await.is_err());
    }
}
