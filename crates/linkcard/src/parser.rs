// ABOUTME: Parser turning raw HTML into a LinkMetadata record by merging the strategy outputs in order.
// ABOUTME: Normalizes title and description for embedding and falls back to the URL as the title.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use url::Url;

use crate::error::{Error, Result};
use crate::extractors::Strategy;
use crate::metadata::LinkMetadata;

static LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n\u{2028}\u{2029}]+").unwrap());

/// Strip line breaks, escape backslashes then double quotes, and trim.
///
/// The result can be embedded in a single-quoted YAML-like scalar.
pub fn normalize_text(s: &str) -> String {
    let stripped = LINE_BREAKS.replace_all(s, "");
    stripped
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .trim()
        .to_string()
}

/// Convert a strategy failure into `Error::Parse`, passing typed parse errors through.
fn into_parse_error(err: anyhow::Error, html: &str) -> Error {
    match err.downcast::<Error>() {
        Ok(err @ Error::Parse { .. }) => err,
        Ok(other) => Error::parse(other.to_string(), html),
        Err(err) => Error::parse(format!("{:#}", err), html),
    }
}

/// Runs the extraction strategies over a document and merges their results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parser {
    strategies: Vec<Strategy>,
}

impl Parser {
    /// Parser with Open Graph, Twitter Card and standard tags, in that order.
    pub fn new() -> Self {
        Self::with_strategies(Strategy::DEFAULT_ORDER.to_vec())
    }

    pub fn with_strategies(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Extract metadata for `url` from `html`.
    ///
    /// Every field a strategy finds overwrites the value from the strategies
    /// before it, so with the default order a `<title>` tag wins over
    /// `og:title`. The title is never empty: it falls back to `url`.
    pub fn parse(&self, url: &str, html: &str) -> Result<LinkMetadata> {
        let base = Url::parse(url)
            .map_err(|e| Error::parse(format!("invalid URL {}: {}", url, e), html))?;

        let doc = Html::parse_document(html);

        let mut meta = LinkMetadata {
            url: url.to_string(),
            host: base.host_str().map(str::to_string),
            indent: 0,
            ..Default::default()
        };

        for strategy in &self.strategies {
            let partial = strategy
                .extract(&doc, &base)
                .map_err(|e| into_parse_error(e.context(strategy.name()), html))?;
            meta.apply(partial);
        }

        meta.title = normalize_text(&meta.title);
        meta.description = meta
            .description
            .map(|d| normalize_text(&d))
            .filter(|d| !d.is_empty());

        if meta.title.is_empty() {
            meta.title = url.to_string();
        }

        Ok(meta)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
