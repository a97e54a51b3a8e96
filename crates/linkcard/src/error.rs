// ABOUTME: Error types for the link metadata pipeline: the Error enum and its ErrorCode category.
// ABOUTME: Provides typed errors with convenience constructors and boolean helpers.

use std::fmt;
use std::time::Duration;

/// Error codes representing the categories of pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Network,
    Timeout,
    Parse,
    Cache,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Network => "network error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Parse => "parse error",
            ErrorCode::Cache => "cache error",
        };
        write!(f, "{}", s)
    }
}

/// The error type returned by every fallible pipeline operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Transport-level failure after all retries were used up.
    #[error("linkcard: network error for {url}: {message}")]
    Network { message: String, url: String },

    /// The last attempt failed because it timed out.
    #[error("linkcard: request to {url} timed out after {timeout_ms}ms", timeout_ms = .timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    /// The HTML could not be turned into a metadata record.
    #[error("linkcard: parse error: {message}")]
    Parse { message: String, source_html: String },

    /// Internal cache failure. A plain miss is not an error.
    #[error("linkcard: cache error: {message}")]
    Cache { message: String },
}

impl Error {
    /// Create a Network error.
    pub fn network(message: impl Into<String>, url: impl Into<String>) -> Self {
        Error::Network {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a Timeout error.
    pub fn timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Error::Timeout {
            url: url.into(),
            timeout,
        }
    }

    /// Create a Parse error carrying the HTML that failed.
    pub fn parse(message: impl Into<String>, source_html: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
            source_html: source_html.into(),
        }
    }

    /// Create a Cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Error::Cache {
            message: message.into(),
        }
    }

    /// The category of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Network { .. } => ErrorCode::Network,
            Error::Timeout { .. } => ErrorCode::Timeout,
            Error::Parse { .. } => ErrorCode::Parse,
            Error::Cache { .. } => ErrorCode::Cache,
        }
    }

    /// The URL this error refers to, if it carries one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Network { url, .. } | Error::Timeout { url, .. } => Some(url),
            Error::Parse { .. } | Error::Cache { .. } => None,
        }
    }

    /// Returns true if this is a Network error.
    pub fn is_network(&self) -> bool {
        self.code() == ErrorCode::Network
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code() == ErrorCode::Timeout
    }

    /// Returns true if this is a Parse error.
    pub fn is_parse(&self) -> bool {
        self.code() == ErrorCode::Parse
    }

    /// Returns true if this is a Cache error.
    pub fn is_cache(&self) -> bool {
        self.code() == ErrorCode::Cache
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_reports_millis() {
        let err = Error::timeout("https://example.com", Duration::from_secs(10));
        assert_eq!(
            err.to_string(),
            "linkcard: request to https://example.com timed out after 10000ms"
        );
        assert!(err.is_timeout());
        assert_eq!(err.url(), Some("https://example.com"));
    }

    #[test]
    fn network_carries_url_and_message() {
        let err = Error::network("connection refused", "https://example.com/a");
        assert!(err.is_network());
        assert_eq!(err.code(), ErrorCode::Network);
        assert!(err.to_string().contains("connection refused"));
        assert!(err.to_string().contains("https://example.com/a"));
    }

    #[test]
    fn parse_and_cache_have_no_url() {
        let parse = Error::parse("bad selector", "<html>");
        assert!(parse.is_parse());
        assert_eq!(parse.url(), None);
        if let Error::Parse { source_html, .. } = &parse {
            assert_eq!(source_html, "<html>");
        }

        let cache = Error::cache("lock poisoned");
        assert!(cache.is_cache());
        assert_eq!(cache.to_string(), "linkcard: cache error: lock poisoned");
    }

    #[test]
    fn error_code_display() {
        assert_eq!(ErrorCode::Timeout.to_string(), "timeout");
        assert_eq!(ErrorCode::Parse.to_string(), "parse error");
    }
}
