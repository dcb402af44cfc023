// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Frame document loading
//!
//! Resolves what a frame element embeds and turns it into a [`Document`].
//! Inline sources (`srcdoc`, `about:blank`, `data:`) never touch the
//! network. Network sources are fetched only when same-origin with the
//! top-level document, unless web security is disabled.

use std::collections::HashMap;

use base64::Engine as _;
use tracing::debug;
use url::{Origin, Url};

use crate::dom::{parse_html_with_url, Document, Element, NodeId};
use crate::error::{Error, Result};
use crate::http::HttpClient;

/// What a frame element embeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    /// Inline `srcdoc` markup
    Srcdoc(String),
    /// `about:blank`, `javascript:` or a missing `src`
    Blank,
    /// Decoded `data:` URL payload
    Data(String),
    /// Document fetched over the network
    Remote(Url),
}

impl FrameSource {
    /// Determine the source of a frame element
    ///
    /// `srcdoc` wins over `src`, as in browsers. Relative `src` values
    /// resolve against `base`.
    pub fn of(element: &Element, base: Option<&Url>) -> Result<Self> {
        if let Some(srcdoc) = element.get_attribute("srcdoc") {
            return Ok(FrameSource::Srcdoc(srcdoc));
        }

        let src = element.src().unwrap_or_default();
        let src = src.trim();
        let lower = src.to_ascii_lowercase();

        if src.is_empty() || lower.starts_with("about:") || lower.starts_with("javascript:") {
            return Ok(FrameSource::Blank);
        }
        if lower.starts_with("data:") {
            return decode_data_url(src).map(FrameSource::Data);
        }

        let url = match Url::parse(src) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = base.ok_or_else(|| {
                    Error::frame(format!("cannot resolve relative src '{}' without a base URL", src))
                })?;
                base.join(src)?
            }
            Err(e) => return Err(Error::frame(format!("invalid src '{}': {}", src, e))),
        };

        match url.scheme() {
            "http" | "https" => Ok(FrameSource::Remote(url)),
            other => Err(Error::frame(format!("unsupported frame scheme '{}'", other))),
        }
    }
}

/// Decode a `data:` URL into text
fn decode_data_url(src: &str) -> Result<String> {
    let rest = &src["data:".len()..];
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::frame("malformed data: URL"))?;

    let bytes = if meta.to_ascii_lowercase().ends_with(";base64") {
        let cleaned: String = percent_decode(payload)
            .into_iter()
            .map(char::from)
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| Error::frame(format!("invalid base64 in data: URL: {}", e)))?
    } else {
        percent_decode(payload)
    };

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Loads and caches frame documents
pub struct FrameLoader {
    client: HttpClient,
    disable_web_security: bool,
    cache: HashMap<NodeId, Document>,
}

impl FrameLoader {
    /// Create a new frame loader
    pub fn new(client: HttpClient, disable_web_security: bool) -> Self {
        Self {
            client,
            disable_web_security,
            cache: HashMap::new(),
        }
    }

    /// Forget every loaded frame document
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Number of cached frame documents
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Load the document embedded by `element`
    ///
    /// `parent_url` is the URL of the document holding the element and
    /// `top_origin` the origin of the top-level document (`None` when opaque).
    pub async fn load(
        &mut self,
        element: &Element,
        parent_url: Option<&Url>,
        top_origin: Option<&Origin>,
    ) -> Result<Document> {
        if let Some(doc) = self.cache.get(&element.node.id) {
            return Ok(doc.clone());
        }

        let doc = match FrameSource::of(element, parent_url)? {
            FrameSource::Srcdoc(html) => parse_html_with_url(&html, parent_url.cloned())?,
            FrameSource::Blank => parse_html_with_url("", parent_url.cloned())?,
            FrameSource::Data(html) => parse_html_with_url(&html, None)?,
            FrameSource::Remote(url) => {
                self.check_origin(&url, top_origin)?;
                debug!(url = %url, "fetching frame document");
                let response = self
                    .client
                    .fetch_document(&url)
                    .await
                    .map_err(|e| Error::frame(format!("failed to load {}: {}", url, e)))?;
                parse_html_with_url(&response.text_lossy(), Some(response.url.clone()))?
            }
        };

        self.cache.insert(element.node.id, doc.clone());
        Ok(doc)
    }

    fn check_origin(&self, url: &Url, top_origin: Option<&Origin>) -> Result<()> {
        if self.disable_web_security {
            return Ok(());
        }
        match top_origin {
            Some(origin) if *origin == url.origin() => Ok(()),
            Some(origin) => Err(Error::frame(format!(
                "Blocked a frame with origin \"{}\" from accessing a cross-origin frame at {}",
                origin.ascii_serialization(),
                url
            ))),
            None => Err(Error::frame(format!(
                "Blocked a frame with origin \"null\" from accessing a cross-origin frame at {}",
                url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn first_frame(html: &str) -> Element {
        parse_html(html).unwrap().frames().remove(0)
    }

    #[test]
    fn test_source_resolution() {
        let base = Url::parse("https://example.com/app/index.html").unwrap();

        let frame = first_frame("<iframe srcdoc=\"<p>x</p>\" src=\"other.html\"></iframe>");
        assert_eq!(
            FrameSource::of(&frame, Some(&base)).unwrap(),
            FrameSource::Srcdoc("<p>x</p>".into())
        );

        let frame = first_frame("<iframe src=\"inner.html\"></iframe>");
        assert_eq!(
            FrameSource::of(&frame, Some(&base)).unwrap(),
            FrameSource::Remote(Url::parse("https://example.com/app/inner.html").unwrap())
        );
        assert!(FrameSource::of(&frame, None).unwrap_err().is_frame_access());

        let frame = first_frame("<iframe></iframe>");
        assert_eq!(FrameSource::of(&frame, None).unwrap(), FrameSource::Blank);

        let frame = first_frame("<iframe src=\"ftp://example.com/x\"></iframe>");
        assert!(FrameSource::of(&frame, None).is_err());
    }

    #[test]
    fn test_data_urls() {
        assert_eq!(
            decode_data_url("data:text/html,%3Cp%3EHi%20there%3C/p%3E").unwrap(),
            "<p>Hi there</p>"
        );
        assert_eq!(
            decode_data_url("data:text/html;base64,PHA+SGk8L3A+").unwrap(),
            "<p>Hi</p>"
        );
        assert!(decode_data_url("data:text/html").is_err());
        assert_eq!(percent_decode("100%"), b"100%".to_vec());
    }

    #[tokio::test]
    async fn test_cross_origin_refused() {
        let top = Url::parse("https://example.com/").unwrap();
        let frame = first_frame("<iframe src=\"https://ads.example.net/x\"></iframe>");
        let mut loader = FrameLoader::new(HttpClient::new().unwrap(), false);

        let err = loader
            .load(&frame, Some(&top), Some(&top.origin()))
            .await
            .unwrap_err();
        assert!(err.is_frame_access());
        assert!(err.to_string().contains("cross-origin"));
        assert_eq!(loader.cached(), 0);
    }

    #[tokio::test]
    async fn test_inline_documents_cached() {
        let frame = first_frame("<iframe srcdoc=\"<title>Inner</title><p>Hello</p>\"></iframe>");
        let mut loader = FrameLoader::new(HttpClient::new().unwrap(), false);

        let doc = loader.load(&frame, None, None).await.unwrap();
        assert_eq!(doc.title(), "Inner");
        assert_eq!(doc.body_text(), "Hello");

        let again = loader.load(&frame, None, None).await.unwrap();
        assert_eq!(again.root(), doc.root());
        assert_eq!(loader.cached(), 1);

        loader.clear();
        assert_eq!(loader.cached(), 0);
    }
}
