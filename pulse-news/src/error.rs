//! Error types for the feed layer

use thiserror::Error;

/// Errors that can occur while fetching feeds or scraping articles
#[derive(Debug, Error)]
pub enum NewsError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// HTTP request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Remote returned a non-success status
    #[error("HTTP status {status} for {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Failed to parse a feed or page
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Article scraping failed
    #[error("Scrape failed: {0}")]
    ScrapeFailed(String),
}

impl NewsError {
    /// Whether this failure is routine noise (blocked or missing pages,
    /// slow hosts) that should not be logged at warn level.
    pub fn is_expected(&self) -> bool {
        match self {
            NewsError::Timeout(_) => true,
            NewsError::HttpStatus { status, .. } => matches!(status, 403 | 404),
            _ => false,
        }
    }

    /// Map a reqwest error, distinguishing timeouts from other failures.
    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            NewsError::Timeout(url.to_string())
        } else {
            NewsError::RequestFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_and_missing_pages_are_expected() {
        assert!(NewsError::HttpStatus {
            status: 403,
            url: "https://example.com".to_string()
        }
        .is_expected());
        assert!(NewsError::HttpStatus {
            status: 404,
            url: "https://example.com".to_string()
        }
        .is_expected());
        assert!(NewsError::Timeout("https://example.com".to_string()).is_expected());
    }

    #[test]
    fn server_errors_are_not_expected() {
        assert!(!NewsError::HttpStatus {
            status: 500,
            url: "https://example.com".to_string()
        }
        .is_expected());
        assert!(!NewsError::RequestFailed("connection refused".to_string()).is_expected());
    }
}
