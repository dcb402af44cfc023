// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Automation driver abstraction
//!
//! A driver owns exactly one "current browsing context". Frame switches
//! mutate it, so every method takes `&mut self`.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::scanner::TextMatcher;

/// Element lookup strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum By {
    /// `id` attribute
    Id(String),
    /// `name` attribute
    Name(String),
    /// Structural path
    Locator(String),
}

impl std::fmt::Display for By {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            By::Id(id) => write!(f, "id={}", id),
            By::Name(name) => write!(f, "name={}", name),
            By::Locator(locator) => write!(f, "locator={}", locator),
        }
    }
}

/// A browser automation backend
#[async_trait]
pub trait FrameDriver: Send {
    /// Handle to an element of some browsing context
    type Element: Clone + Send + Sync + 'static;

    /// Navigate the top-level context to a URL
    async fn goto(&mut self, url: &Url) -> Result<()>;

    /// Replace the top-level document with raw HTML
    async fn load_html(&mut self, html: &str) -> Result<()>;

    /// All `iframe` elements, then all `frame` elements, of the current context
    async fn find_frames(&mut self) -> Result<Vec<Self::Element>>;

    /// First element of the current context matching `by`
    async fn find_element(&mut self, by: &By) -> Result<Self::Element>;

    /// Elements of the current context satisfying a search strategy, in document order
    async fn find_matching(
        &mut self,
        matcher: &dyn TextMatcher,
        query: &str,
    ) -> Result<Vec<Self::Element>>;

    /// Attribute value (`None` when absent)
    async fn attribute(&mut self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Lowercase tag name
    async fn tag_name(&mut self, element: &Self::Element) -> Result<String>;

    /// Rendered text of an element
    async fn visible_text(&mut self, element: &Self::Element) -> Result<String>;

    /// Structural path of an element within the current context
    async fn locator(&mut self, element: &Self::Element) -> Result<String>;

    /// Switch into a frame element of the current context
    async fn enter_frame(&mut self, element: &Self::Element) -> Result<()>;

    /// Switch to the parent of the current context
    async fn enter_parent_frame(&mut self) -> Result<()>;

    /// Switch to the top-level document
    async fn enter_default_content(&mut self) -> Result<()>;

    /// Title of the current context's document
    async fn title(&mut self) -> Result<String>;

    /// Rendered text of the current context's body
    async fn body_text(&mut self) -> Result<String>;

    /// Release the driver
    async fn quit(&mut self) -> Result<()>;
}
