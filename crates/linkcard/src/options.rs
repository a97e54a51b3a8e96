// ABOUTME: Configuration for the pipeline: FetchOptions, CacheOptions, ServiceOptions and the service builder.
// ABOUTME: MetadataServiceBuilder provides a fluent API for constructing MetadataService instances.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::resource::{ReqwestTransport, Transport};
use crate::service::{ImageSaver, MetadataService};

/// Default User-Agent sent with every page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; linkcard/0.1)";

/// Options controlling a single fetch, including its retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Retries after the first attempt; total attempts is `max_retries + 1`.
    pub max_retries: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: HashMap::new(),
        }
    }
}

impl FetchOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// Options for the metadata cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    pub ttl: Duration,
    pub max_items: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_items: 100,
        }
    }
}

/// Service-level configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOptions {
    pub enable_cache: bool,
    /// Replace `image` with the local path once the image is persisted.
    pub prefer_local_images: bool,
    pub fetch: FetchOptions,
    pub cache: CacheOptions,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            enable_cache: true,
            prefer_local_images: false,
            fetch: FetchOptions::default(),
            cache: CacheOptions::default(),
        }
    }
}

/// Builder for constructing MetadataService instances with custom configuration.
#[derive(Clone)]
pub struct MetadataServiceBuilder {
    opts: ServiceOptions,
    http_client: Option<reqwest::Client>,
    transport: Option<Arc<dyn Transport>>,
    image_saver: Option<Arc<dyn ImageSaver>>,
}

impl MetadataServiceBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            opts: ServiceOptions::default(),
            http_client: None,
            transport: None,
            image_saver: None,
        }
    }

    /// Replace all options at once.
    pub fn options(mut self, opts: ServiceOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Enable or disable the metadata cache.
    pub fn enable_cache(mut self, enable: bool) -> Self {
        self.opts.enable_cache = enable;
        self
    }

    /// Rewrite `image` to the persisted path after a successful save.
    pub fn prefer_local_images(mut self, prefer: bool) -> Self {
        self.opts.prefer_local_images = prefer;
        self
    }

    /// Set the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.fetch.timeout = timeout;
        self
    }

    /// Set the number of retries after the first attempt.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.opts.fetch.max_retries = max_retries;
        self
    }

    /// Set the fixed delay between attempts.
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.opts.fetch.retry_delay = retry_delay;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.fetch.user_agent = user_agent.into();
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.fetch.headers.insert(key.into(), value.into());
        self
    }

    /// Set the cache time-to-live.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.opts.cache.ttl = ttl;
        self
    }

    /// Set the cache capacity.
    pub fn cache_max_items(mut self, max_items: usize) -> Self {
        self.opts.cache.max_items = max_items;
        self
    }

    /// Use a custom reqwest client for the default transport.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Use a custom transport instead of reqwest.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Persist extracted images through the given saver.
    pub fn image_saver(mut self, saver: Arc<dyn ImageSaver>) -> Self {
        self.image_saver = Some(saver);
        self
    }

    /// Build the service with the configured options.
    pub fn build(self) -> MetadataService {
        let transport = self.transport.unwrap_or_else(|| match self.http_client {
            Some(client) => Arc::new(ReqwestTransport::with_client(client)),
            None => Arc::new(ReqwestTransport::new()),
        });
        MetadataService::new(self.opts, transport, self.image_saver)
    }
}

impl Default for MetadataServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
