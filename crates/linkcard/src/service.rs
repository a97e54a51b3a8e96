// ABOUTME: MetadataService orchestrating cache lookup, fetch, parse, optional image persistence and cache write.
// ABOUTME: Image persistence goes through an injected ImageSaver and its failures never fail a lookup.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use url::Url;

use crate::cache::{CacheStats, MetadataCache};
use crate::error::Result;
use crate::metadata::LinkMetadata;
use crate::options::{MetadataServiceBuilder, ServiceOptions};
use crate::parser::Parser;
use crate::resource::{Fetcher, Transport};

static IMAGE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpe?g|png|gif|webp|svg|avif|bmp|ico)$").unwrap());

/// Persists a remote image and returns a stable reference to the saved copy.
#[async_trait]
pub trait ImageSaver: Send + Sync {
    async fn save_image(&self, source_url: &str, suggested_file_name: &str)
        -> anyhow::Result<String>;
}

#[async_trait]
impl<F, Fut> ImageSaver for F
where
    F: Fn(String, String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
{
    async fn save_image(
        &self,
        source_url: &str,
        suggested_file_name: &str,
    ) -> anyhow::Result<String> {
        (self)(source_url.to_string(), suggested_file_name.to_string()).await
    }
}

/// Build a file name for a persisted image.
///
/// Format: `{host}-{hash}-{millis}.{ext}`. The hash covers both the page and
/// image URLs, so two cards sharing a title never overwrite each other.
pub fn image_file_name(page_url: &str, image_url: &str, timestamp_millis: i64) -> String {
    let page = Url::parse(page_url).ok();
    let host = page
        .as_ref()
        .and_then(|u| u.host_str())
        .map(|h| {
            h.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
                .collect::<String>()
        })
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "image".to_string());

    let mut hasher = Sha256::new();
    hasher.update(page_url.as_bytes());
    hasher.update(b"\n");
    hasher.update(image_url.as_bytes());
    let digest = hex::encode(hasher.finalize());

    let path = Url::parse(image_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| image_url.to_string());
    let ext = IMAGE_EXTENSION
        .captures(&path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_else(|| "jpg".to_string());

    format!("{}-{}-{}.{}", host, &digest[..12], timestamp_millis, ext)
}

/// The entry point the rest of the application uses to resolve link metadata.
pub struct MetadataService {
    opts: ServiceOptions,
    fetcher: Fetcher,
    parser: Parser,
    cache: MetadataCache,
    image_saver: Option<Arc<dyn ImageSaver>>,
}

impl MetadataService {
    /// Create a new builder for configuring the service.
    pub fn builder() -> MetadataServiceBuilder {
        MetadataServiceBuilder::new()
    }

    pub fn new(
        opts: ServiceOptions,
        transport: Arc<dyn Transport>,
        image_saver: Option<Arc<dyn ImageSaver>>,
    ) -> Self {
        Self {
            fetcher: Fetcher::new(transport, opts.fetch.clone()),
            parser: Parser::new(),
            cache: MetadataCache::new(opts.cache),
            opts,
            image_saver,
        }
    }

    /// Replace the parser, e.g. to change strategy order.
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.opts
    }

    /// Resolve metadata for `url`, from the cache when possible.
    ///
    /// Fetch and parse errors are returned as-is. A failing image save is
    /// logged and the remote image URL is kept.
    pub async fn get_metadata(&self, url: &str) -> Result<LinkMetadata> {
        if self.opts.enable_cache {
            if let Some(cached) = self.cache.get(url)? {
                debug!(url = %url, "metadata cache hit");
                return Ok(cached);
            }
            debug!(url = %url, "metadata cache miss");
        }

        let response = self.fetcher.fetch_content(url, None).await?;
        let mut metadata = self.parser.parse(url, &response.text)?;

        self.persist_image(&mut metadata).await;

        if self.opts.enable_cache {
            self.cache.set(url, &metadata)?;
        }

        Ok(metadata)
    }

    async fn persist_image(&self, metadata: &mut LinkMetadata) {
        let Some(saver) = &self.image_saver else {
            return;
        };
        let Some(image_url) = metadata.image.clone().filter(|i| !i.is_empty()) else {
            return;
        };

        let file_name = image_file_name(&metadata.url, &image_url, Utc::now().timestamp_millis());
        match saver.save_image(&image_url, &file_name).await {
            Ok(local_path) => {
                debug!(image = %image_url, path = %local_path, "saved image locally");
                if self.opts.prefer_local_images {
                    metadata.image = Some(local_path.clone());
                }
                metadata.local_image = Some(local_path);
            }
            Err(e) => {
                warn!(image = %image_url, error = %e, "failed to save image, keeping remote URL");
            }
        }
    }

    /// Drop one entry, or the whole cache when `url` is `None`.
    pub fn clear_cache(&self, url: Option<&str>) -> Result<()> {
        match url {
            Some(url) => self.cache.delete(url),
            None => self.cache.clear(),
        }
    }

    pub fn cache_stats(&self) -> Result<CacheStats> {
        self.cache.get_stats()
    }
}
