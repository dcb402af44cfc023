// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Native in-process driver
//!
//! Documents are parsed with html5ever and kept in memory. The current
//! browsing context is the top of a stack of entered frame documents.

use async_trait::async_trait;
use tracing::{debug, warn};
use url::{Origin, Url};

use super::config::BrowserConfig;
use super::driver::{By, FrameDriver};
use super::frame::FrameLoader;
use crate::dom::xpath::{self, element_locator};
use crate::dom::{parse_html_with_url, Document, Element};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::scanner::TextMatcher;

/// In-process driver backed by the crate's own DOM
pub struct NativeDriver {
    config: BrowserConfig,
    client: HttpClient,
    frames: FrameLoader,
    top: Option<Document>,
    top_origin: Option<Origin>,
    stack: Vec<Document>,
    closed: bool,
}

impl NativeDriver {
    /// Create a new native driver
    pub fn new(config: BrowserConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http_config())?;
        let frames = FrameLoader::new(client.clone(), config.disable_web_security);

        Ok(Self {
            config,
            client,
            frames,
            top: None,
            top_origin: None,
            stack: Vec::new(),
            closed: false,
        })
    }

    /// Number of frames entered below the top-level document
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The document of the current browsing context
    pub fn current_document(&self) -> Result<&Document> {
        if self.closed {
            return Err(Error::session("browser session is closed"));
        }
        self.stack
            .last()
            .or(self.top.as_ref())
            .ok_or_else(|| Error::session("no document loaded"))
    }

    fn set_top(&mut self, doc: Document, origin: Option<Origin>) {
        self.frames.clear();
        self.stack.clear();
        self.top = Some(doc);
        self.top_origin = origin;
    }

    fn ensure_attached(&self, element: &Element) -> Result<()> {
        if self.current_document()?.contains(element) {
            Ok(())
        } else {
            Err(Error::NoSuchElement(
                "stale element reference: element is not part of the current frame".into(),
            ))
        }
    }
}

#[async_trait]
impl FrameDriver for NativeDriver {
    type Element = Element;

    async fn goto(&mut self, url: &Url) -> Result<()> {
        if self.closed {
            return Err(Error::session("browser session is closed"));
        }
        let response = self.client.fetch_document(url).await?;
        if !response.is_html() {
            warn!(url = %response.url, content_type = ?response.content_type(), "document is not served as HTML");
        }

        let doc = parse_html_with_url(&response.text_lossy(), Some(response.url.clone()))?;
        let origin = response.url.origin();
        debug!(url = %response.url, title = %doc.title(), "top-level document loaded");
        self.set_top(doc, Some(origin).filter(|o| o.is_tuple()));
        Ok(())
    }

    async fn load_html(&mut self, html: &str) -> Result<()> {
        if self.closed {
            return Err(Error::session("browser session is closed"));
        }
        let base = self.config.base_url.clone();
        let origin = base.as_ref().map(|u| u.origin()).filter(|o| o.is_tuple());
        let doc = parse_html_with_url(html, base)?;
        self.set_top(doc, origin);
        Ok(())
    }

    async fn find_frames(&mut self) -> Result<Vec<Element>> {
        Ok(self.current_document()?.frames())
    }

    async fn find_element(&mut self, by: &By) -> Result<Element> {
        let doc = self.current_document()?;
        let found = match by {
            By::Id(id) => doc.get_element_by_id(id),
            By::Name(name) => doc.get_element_by_name(name),
            By::Locator(locator) => Some(xpath::resolve(doc, locator)?),
        };
        found.ok_or_else(|| Error::NoSuchElement(format!("no element matches {}", by)))
    }

    async fn find_matching(
        &mut self,
        matcher: &dyn TextMatcher,
        query: &str,
    ) -> Result<Vec<Element>> {
        Ok(self
            .current_document()?
            .elements()
            .into_iter()
            .filter(|e| matcher.matches(e, query))
            .collect())
    }

    async fn attribute(&mut self, element: &Element, name: &str) -> Result<Option<String>> {
        self.ensure_attached(element)?;
        Ok(element.get_attribute(name))
    }

    async fn tag_name(&mut self, element: &Element) -> Result<String> {
        self.ensure_attached(element)?;
        Ok(element.local_name())
    }

    async fn visible_text(&mut self, element: &Element) -> Result<String> {
        self.ensure_attached(element)?;
        Ok(element.inner_text())
    }

    async fn locator(&mut self, element: &Element) -> Result<String> {
        self.ensure_attached(element)?;
        Ok(element_locator(element))
    }

    async fn enter_frame(&mut self, element: &Element) -> Result<()> {
        self.ensure_attached(element)
            .map_err(|e| Error::frame(e.to_string()))?;
        if !element.is_frame() {
            return Err(Error::frame(format!(
                "<{}> is not a frame element",
                element.local_name()
            )));
        }

        let parent_url = self.current_document()?.url.clone();
        let doc = self
            .frames
            .load(element, parent_url.as_ref(), self.top_origin.as_ref())
            .await?;
        self.stack.push(doc);
        Ok(())
    }

    async fn enter_parent_frame(&mut self) -> Result<()> {
        self.current_document()?;
        // At the top level this is a no-op, as in WebDriver
        self.stack.pop();
        Ok(())
    }

    async fn enter_default_content(&mut self) -> Result<()> {
        self.current_document()?;
        self.stack.clear();
        Ok(())
    }

    async fn title(&mut self) -> Result<String> {
        Ok(self.current_document()?.title())
    }

    async fn body_text(&mut self) -> Result<String> {
        let doc = self.current_document()?;
        doc.body()
            .map(|b| b.inner_text())
            .ok_or_else(|| Error::NoSuchElement("no such element: body".into()))
    }

    async fn quit(&mut self) -> Result<()> {
        self.closed = true;
        self.stack.clear();
        self.frames.clear();
        self.top = None;
        Ok(())
    }
}
