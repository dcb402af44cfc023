// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for Kehys
//!
//! Errors local to one frame or one search strategy are recorded as data on
//! the scan output. Only session-level failures abort a scan.

use thiserror::Error;

/// Result type alias for Kehys operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Kehys
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied neither URL nor HTML, or omitted a required search text
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A frame could not be entered (cross-origin, stale handle, detached element)
    #[error("Frame access error: {reason}")]
    FrameAccess {
        reason: String,
        frame: Option<String>,
    },

    /// One structural query failed to execute
    #[error("Search strategy '{strategy}' failed: {reason}")]
    SearchStrategy { strategy: String, reason: String },

    /// The automation driver failed to start or crashed
    #[error("Browser session error: {0}")]
    Session(String),

    /// The initial document could not be loaded
    #[error("Navigation failed to {url}: {reason}")]
    NavigationFailed {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTML parsing failed
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// A structural path could not be computed or resolved
    #[error("Locator '{locator}' failed: {reason}")]
    Locator { locator: String, reason: String },

    /// Element lookup found nothing
    #[error("No such element: {0}")]
    NoSuchElement(String),

    /// Selector parsing error
    #[error("Invalid selector: {0}")]
    Selector(String),

    /// Timeout error
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The scan was stopped before it finished
    #[error("Scan cancelled")]
    Cancelled,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a frame access error
    pub fn frame(reason: impl Into<String>) -> Self {
        Error::FrameAccess {
            reason: reason.into(),
            frame: None,
        }
    }

    /// Create a frame access error naming the frame
    pub fn frame_with_label(reason: impl Into<String>, frame: impl Into<String>) -> Self {
        Error::FrameAccess {
            reason: reason.into(),
            frame: Some(frame.into()),
        }
    }

    /// Create a search strategy error
    pub fn strategy(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::SearchStrategy {
            strategy: strategy.into(),
            reason: reason.into(),
        }
    }

    /// Create a session error
    pub fn session<S: Into<String>>(msg: S) -> Self {
        Error::Session(msg.into())
    }

    /// Create a navigation error with context
    pub fn navigation_failed(
        url: impl Into<String>,
        status: Option<u16>,
        reason: impl Into<String>,
    ) -> Self {
        Error::NavigationFailed {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Create a locator error
    pub fn locator(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Locator {
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Whether this error aborts the whole scan
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Session(_)
                | Error::Cancelled
                | Error::NavigationFailed { .. }
                | Error::Http(_)
                | Error::Timeout { .. }
        )
    }

    /// Check if this is a frame access error
    pub fn is_frame_access(&self) -> bool {
        matches!(self, Error::FrameAccess { .. })
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::NavigationFailed { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;

    /// Turn any failure into a frame access error for the given frame
    fn frame_context(self, frame: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }

    fn frame_context(self, frame: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::FrameAccess { reason, .. } => Error::frame_with_label(reason, frame),
            other => Error::frame_with_label(other.to_string(), frame),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::session("driver crashed").is_fatal());
        assert!(Error::Cancelled.is_fatal());
        assert!(Error::navigation_failed("https://example.com", Some(500), "boom").is_fatal());
        assert!(!Error::frame("cross-origin").is_fatal());
        assert!(!Error::strategy("Strategy 1", "stale").is_fatal());
        assert!(!Error::invalid_input("missing").is_fatal());
    }

    #[test]
    fn test_navigation_status() {
        let err = Error::navigation_failed("https://example.com", Some(404), "Not Found");
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(
            err.to_string(),
            "Navigation failed to https://example.com: Not Found"
        );
    }

    #[test]
    fn test_frame_context() {
        let res: std::result::Result<(), Error> = Err(Error::other("detached"));
        let err = res.frame_context("id='ads'").unwrap_err();
        match err {
            Error::FrameAccess { reason, frame } => {
                assert_eq!(reason, "detached");
                assert_eq!(frame.as_deref(), Some("id='ads'"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
