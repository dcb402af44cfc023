// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::response::Response;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Default headers
    pub default_headers: HeaderMap,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            "accept",
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        default_headers.insert(
            "accept-language",
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            default_headers,
            proxy: None,
        }
    }
}

/// HTTP client with a shared cookie store
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(config.default_headers.clone())
            .cookie_store(true);

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::invalid_input(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build().map_err(|e| Error::session(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Execute a GET request
    pub async fn get(&self, url: &Url) -> Result<Response> {
        let start = Instant::now();
        let response = self.client.get(url.clone()).send().await?;

        let redirected = response.url() != url;
        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        let elapsed = start.elapsed();

        debug!(
            url = %final_url,
            status = status.as_u16(),
            ms = elapsed.as_millis() as u64,
            redirected,
            "fetched"
        );

        Ok(Response::new(status, headers, body, final_url).with_transfer(redirected, elapsed))
    }

    /// Fetch an HTML document, failing on non-success status codes
    pub async fn fetch_document(&self, url: &Url) -> Result<Response> {
        let response = self.get(url).await.map_err(|e| match e {
            Error::Http(ref inner) if inner.is_timeout() => {
                Error::timeout(format!("GET {}", url), self.config.timeout.as_millis() as u64)
            }
            other => other,
        })?;

        if !response.is_success() {
            return Err(Error::navigation_failed(
                url.as_str(),
                Some(response.status_code()),
                format!("server answered {}", response.status),
            ));
        }
        Ok(response)
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}
