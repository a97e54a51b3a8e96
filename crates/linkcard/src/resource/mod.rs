// ABOUTME: Fetcher for page content: a pluggable HTTP transport wrapped in a fixed-delay retry loop.
// ABOUTME: The default reqwest transport enforces a content-length limit and decodes the body charset.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::options::FetchOptions;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// A response from the first attempt that did not fail at the transport level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub text: String,
}

impl FetchResult {
    /// Returns true for 2xx statuses. The fetcher itself never checks this.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A failed transport attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    /// True if the transport flagged a timeout or the message says so.
    pub fn indicates_timeout(&self) -> bool {
        if self.timed_out {
            return true;
        }
        let lower = self.message.to_lowercase();
        lower.contains("timeout") || lower.contains("timed out")
    }
}

/// The HTTP GET primitive the fetcher retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        opts: &FetchOptions,
    ) -> std::result::Result<FetchResult, TransportError>;
}

/// Transport backed by a shared reqwest client. Redirects are followed.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten a reqwest error and its sources into one message.
fn describe(err: &reqwest::Error) -> TransportError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = std::error::Error::source(inner);
    }
    TransportError {
        message,
        timed_out: err.is_timeout(),
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        opts: &FetchOptions,
    ) -> std::result::Result<FetchResult, TransportError> {
        let mut request = self
            .client
            .get(url)
            .timeout(opts.timeout)
            .header(reqwest::header::USER_AGENT, &opts.user_agent);
        for (key, value) in &opts.headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| describe(&e))?;

        // Check Content-Length header before reading body
        if let Some(len) = response.content_length() {
            if len as usize > MAX_CONTENT_LENGTH {
                return Err(TransportError::new("content too large"));
            }
        }

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = response.bytes().await.map_err(|e| describe(&e))?;
        if body.len() > MAX_CONTENT_LENGTH {
            return Err(TransportError::new("content too large"));
        }

        Ok(FetchResult {
            status,
            url: url.to_string(),
            final_url,
            text: decode_body(&body, content_type.as_deref()),
            content_type,
        })
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Fetches page content, retrying transport failures with a fixed delay.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    defaults: FetchOptions,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, defaults: FetchOptions) -> Self {
        Self {
            transport,
            defaults,
        }
    }

    /// The options used when a call passes none.
    pub fn defaults(&self) -> &FetchOptions {
        &self.defaults
    }

    /// Fetch `url`, making up to `max_retries + 1` sequential attempts.
    ///
    /// The first response the transport returns is the result, whatever its
    /// status code. Once every attempt has failed, the last failure becomes
    /// `Error::Timeout` if it looks like a timeout and `Error::Network`
    /// otherwise.
    pub async fn fetch_content(
        &self,
        url: &str,
        options: Option<&FetchOptions>,
    ) -> Result<FetchResult> {
        let opts = options.unwrap_or(&self.defaults);
        let attempts = opts.max_retries.saturating_add(1);
        let mut last_error = TransportError::new("no attempt made");

        for attempt in 1..=attempts {
            debug!(url = %url, attempt, attempts, "fetching");
            match self.transport.get(url, opts).await {
                Ok(response) => {
                    if !response.is_success() {
                        debug!(url = %url, status = response.status, "passing through non-success status");
                    }
                    return Ok(response);
                }
                Err(err) => {
                    warn!(url = %url, attempt, error = %err.message, "fetch attempt failed");
                    last_error = err;
                    if attempt < attempts {
                        tokio::time::sleep(opts.retry_delay).await;
                    }
                }
            }
        }

        if last_error.indicates_timeout() {
            Err(Error::timeout(url, opts.timeout))
        } else {
            Err(Error::network(last_error.message, url))
        }
    }
}
