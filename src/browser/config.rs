// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser session configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{HttpClientConfig, DEFAULT_USER_AGENT};

/// Which automation driver backs a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// In-process HTML engine
    #[default]
    Native,
    /// Remote WebDriver endpoint (chromedriver, geckodriver)
    WebDriver,
}

/// Browser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window (WebDriver only)
    pub headless: bool,
    /// Timeout for document fetches and driver scripts
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Pause after a URL load before inspecting the page
    #[serde(with = "duration_secs")]
    pub settle_delay: Duration,
    /// User agent string
    pub user_agent: String,
    /// Base URL for documents supplied as raw HTML
    pub base_url: Option<Url>,
    /// Allow entering frames from other origins
    pub disable_web_security: bool,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Driver backing the session
    pub driver: DriverKind,
    /// WebDriver endpoint
    pub webdriver_url: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout: Duration::from_secs(20),
            settle_delay: Duration::from_secs(3),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: None,
            disable_web_security: false,
            ignore_https_errors: false,
            proxy: None,
            driver: DriverKind::Native,
            webdriver_url: "http://localhost:9515".to_string(),
        }
    }
}

impl BrowserConfig {
    /// Create a new browser config
    pub fn new() -> Self {
        Self::default()
    }

    /// Show or hide the browser window
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the settle delay applied after URL loads
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the base URL used for raw HTML documents
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Allow cross-origin frame access
    pub fn disable_web_security(mut self, disable: bool) -> Self {
        self.disable_web_security = disable;
        self
    }

    /// Ignore HTTPS errors
    pub fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.ignore_https_errors = ignore;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Select the driver
    pub fn driver(mut self, driver: DriverKind) -> Self {
        self.driver = driver;
        self
    }

    /// Set the WebDriver endpoint
    pub fn webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    /// Config for fast local runs: no settle delay
    pub fn for_testing() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    /// HTTP client settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            accept_invalid_certs: self.ignore_https_errors,
            proxy: self.proxy.clone(),
            ..Default::default()
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("duration must be a non-negative number"));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config() {
        let config = BrowserConfig::new()
            .user_agent("Custom Agent")
            .timeout(Duration::from_secs(60))
            .disable_web_security(true);

        assert_eq!(config.user_agent, "Custom Agent");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.disable_web_security);
        assert!(config.headless);
        assert_eq!(config.settle_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: BrowserConfig =
            serde_json::from_str(r#"{"headless": false, "settle_delay": 0.5, "driver": "webdriver"}"#)
                .unwrap();
        assert!(!config.headless);
        assert_eq!(config.settle_delay, Duration::from_millis(500));
        assert_eq!(config.driver, DriverKind::WebDriver);
        assert_eq!(config.timeout, Duration::from_secs(20));

        assert!(serde_json::from_str::<BrowserConfig>(r#"{"timeout": -1}"#).is_err());
    }

    #[test]
    fn test_http_config() {
        let config = BrowserConfig::new().ignore_https_errors(true);
        let http = config.http_config();
        assert!(http.accept_invalid_certs);
        assert_eq!(http.timeout, Duration::from_secs(20));
    }
}
