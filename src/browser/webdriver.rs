// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! WebDriver-backed driver (chromedriver, geckodriver)
//!
//! Enabled with the `webdriver` cargo feature. Search strategies run as
//! XPath queries inside the real browser.

use async_trait::async_trait;
use base64::Engine as _;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use super::config::BrowserConfig;
use super::driver::{By, FrameDriver};
use crate::dom::xpath::{xpath_literal, FALLBACK_LOCATOR};
use crate::error::{Error, Result};
use crate::scanner::TextMatcher;

/// Computes the structural path of `arguments[0]`
const LOCATOR_SCRIPT: &str = r#"
function literal(value) {
    if (value.indexOf("'") < 0) {
        return "'" + value + "'";
    }
    if (value.indexOf('"') < 0) {
        return '"' + value + '"';
    }
    return "concat('" + value.split("'").join("', \"'\", '") + "')";
}
function locate(element) {
    if (element.id) {
        return '//*[@id=' + literal(element.id) + ']';
    }
    if (element === document.body) {
        return '/html/body';
    }
    var parent = element.parentNode;
    if (!parent || parent.nodeType !== 1) {
        return parent === document ? '/' + element.tagName.toLowerCase() + '[1]' : null;
    }
    var ix = 0;
    var siblings = parent.childNodes;
    for (var i = 0; i < siblings.length; i++) {
        var sibling = siblings[i];
        if (sibling === element) {
            var prefix = locate(parent);
            return prefix === null ? null : prefix + '/' + element.tagName.toLowerCase() + '[' + (ix + 1) + ']';
        }
        if (sibling.nodeType === 1 && sibling.tagName === element.tagName) {
            ix++;
        }
    }
    return null;
}
return locate(arguments[0]);
"#;

/// Whether the browser behind the client is gone
fn session_lost(e: &CmdError) -> bool {
    match e {
        CmdError::Lost(_) | CmdError::Failed(_) | CmdError::NotW3C(_) => true,
        CmdError::Standard(wd) => matches!(
            wd.error,
            ErrorStatus::InvalidSessionId | ErrorStatus::SessionNotCreated
        ),
        _ => false,
    }
}

/// Map a command error, keeping session loss fatal
fn or_lost(e: CmdError, local: impl FnOnce(CmdError) -> Error) -> Error {
    if session_lost(&e) {
        Error::session(format!("browser session lost: {}", e))
    } else {
        local(e)
    }
}

fn cmd(e: CmdError) -> Error {
    or_lost(e, |e| Error::other(e.to_string()))
}

/// Driver talking to a WebDriver endpoint through `fantoccini`
pub struct WebDriverDriver {
    client: Client,
    closed: bool,
}

impl WebDriverDriver {
    /// Start a browser session on the configured endpoint
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            format!("--user-agent={}", config.user_agent),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
        }
        if config.disable_web_security {
            args.push("--disable-web-security".to_string());
            args.push("--disable-features=VizDisplayCompositor".to_string());
        }
        if config.ignore_https_errors {
            args.push("--ignore-certificate-errors".to_string());
        }

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        if config.ignore_https_errors {
            caps.insert("acceptInsecureCerts".to_string(), json!(true));
        }

        info!(endpoint = %config.webdriver_url, headless = config.headless, "connecting to WebDriver");
        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| Error::session(format!("failed to start browser: {}", e)))?;

        client
            .update_timeouts(TimeoutConfiguration::new(
                Some(config.timeout),
                Some(config.timeout),
                None,
            ))
            .await
            .map_err(cmd)?;

        Ok(Self {
            client,
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::session("browser session is closed"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FrameDriver for WebDriverDriver {
    type Element = Element;

    async fn goto(&mut self, url: &Url) -> Result<()> {
        self.ensure_open()?;
        self.client.goto(url.as_str()).await.map_err(|e| {
            Error::navigation_failed(url.as_str(), None, e.to_string())
        })
    }

    async fn load_html(&mut self, html: &str) -> Result<()> {
        self.ensure_open()?;
        let data_url = format!(
            "data:text/html;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(html.as_bytes())
        );
        self.client
            .goto(&data_url)
            .await
            .map_err(|e| Error::session(format!("failed to load HTML source: {}", e)))
    }

    async fn find_frames(&mut self) -> Result<Vec<Element>> {
        self.ensure_open()?;
        let mut frames = self
            .client
            .find_all(Locator::Css("iframe"))
            .await
            .map_err(cmd)?;
        frames.extend(
            self.client
                .find_all(Locator::Css("frame"))
                .await
                .map_err(cmd)?,
        );
        Ok(frames)
    }

    async fn find_element(&mut self, by: &By) -> Result<Element> {
        self.ensure_open()?;
        let found = match by {
            By::Id(id) => self.client.find(Locator::Id(id)).await,
            By::Name(name) => {
                let xpath = format!("//*[@name={}]", xpath_literal(name));
                self.client.find(Locator::XPath(&xpath)).await
            }
            By::Locator(locator) => self.client.find(Locator::XPath(locator)).await,
        };
        found.map_err(|e| or_lost(e, |e| Error::NoSuchElement(format!("{}: {}", by, e))))
    }

    async fn find_matching(
        &mut self,
        matcher: &dyn TextMatcher,
        query: &str,
    ) -> Result<Vec<Element>> {
        self.ensure_open()?;
        let xpath = matcher.xpath(query);
        self.client
            .find_all(Locator::XPath(&xpath))
            .await
            .map_err(|e| or_lost(e, |e| Error::strategy(matcher.label(), e.to_string())))
    }

    async fn attribute(&mut self, element: &Element, name: &str) -> Result<Option<String>> {
        element.attr(name).await.map_err(cmd)
    }

    async fn tag_name(&mut self, element: &Element) -> Result<String> {
        element
            .tag_name()
            .await
            .map(|t| t.to_lowercase())
            .map_err(cmd)
    }

    async fn visible_text(&mut self, element: &Element) -> Result<String> {
        element.text().await.map_err(cmd)
    }

    async fn locator(&mut self, element: &Element) -> Result<String> {
        let arg = serde_json::to_value(element)?;
        let value = self
            .client
            .execute(LOCATOR_SCRIPT, vec![arg])
            .await
            .map_err(cmd)?;
        Ok(value
            .as_str()
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_LOCATOR)
            .to_string())
    }

    async fn enter_frame(&mut self, element: &Element) -> Result<()> {
        self.ensure_open()?;
        element
            .clone()
            .enter_frame()
            .await
            .map(|_| ())
            .map_err(|e| or_lost(e, |e| Error::frame(e.to_string())))
    }

    async fn enter_parent_frame(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.client.enter_parent_frame().await.map_err(cmd)
    }

    async fn enter_default_content(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.client.enter_frame(None).await.map_err(cmd)
    }

    async fn title(&mut self) -> Result<String> {
        self.ensure_open()?;
        self.client.title().await.map_err(cmd)
    }

    async fn body_text(&mut self) -> Result<String> {
        self.ensure_open()?;
        let body = self
            .client
            .find(Locator::Css("body"))
            .await
            .map_err(|e| or_lost(e, |e| Error::NoSuchElement(e.to_string())))?;
        body.text().await.map_err(cmd)
    }

    async fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!("closing WebDriver session");
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| Error::session(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantoccini::error::WebDriver;
    use std::io;

    #[test]
    fn test_lost_connection_is_fatal() {
        let err = cmd(CmdError::Lost(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "browser crashed",
        )));
        assert!(matches!(err, Error::Session(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_dead_session_is_fatal() {
        for status in [ErrorStatus::InvalidSessionId, ErrorStatus::SessionNotCreated] {
            let err = cmd(CmdError::Standard(WebDriver::new(status, "session gone")));
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn test_element_errors_stay_local() {
        let stale = CmdError::Standard(WebDriver::new(
            ErrorStatus::StaleElementReference,
            "element is stale",
        ));
        assert!(!cmd(stale).is_fatal());

        let missing = CmdError::NoSuchElement(WebDriver::new(ErrorStatus::NoSuchElement, "none"));
        let err = or_lost(missing, |e| Error::frame(e.to_string()));
        assert!(err.is_frame_access());
        assert!(!err.is_fatal());
    }
}
