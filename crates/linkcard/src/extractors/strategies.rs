// ABOUTME: The extraction strategies run by the parser: Open Graph, Twitter Card and standard HTML tags.
// ABOUTME: Each strategy is a pure function of the document and page URL producing a PartialMetadata.

use scraper::Html;
use url::Url;

use crate::extractors::fields::{first_meta_content, first_text, link_href, meta_content, resolve_url};
use crate::metadata::PartialMetadata;

/// One self-contained extraction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    OpenGraph,
    TwitterCard,
    Standard,
}

impl Strategy {
    /// Registration order. Later strategies overwrite fields set by earlier ones.
    pub const DEFAULT_ORDER: [Strategy; 3] =
        [Strategy::OpenGraph, Strategy::TwitterCard, Strategy::Standard];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::OpenGraph => "open-graph",
            Strategy::TwitterCard => "twitter-card",
            Strategy::Standard => "standard",
        }
    }

    /// Extract the fields this strategy knows about from `doc`.
    pub fn extract(&self, doc: &Html, base: &Url) -> anyhow::Result<PartialMetadata> {
        match self {
            Strategy::OpenGraph => extract_open_graph(doc, base),
            Strategy::TwitterCard => extract_twitter_card(doc, base),
            Strategy::Standard => extract_standard(doc, base),
        }
    }
}

/// Look up an Open Graph key by `property`, then by `name`.
fn og(doc: &Html, key: &str) -> anyhow::Result<Option<String>> {
    first_meta_content(doc, &[("property", key), ("name", key)])
}

/// Look up a Twitter Card key by `name`, then by `property`.
fn twitter(doc: &Html, key: &str) -> anyhow::Result<Option<String>> {
    first_meta_content(doc, &[("name", key), ("property", key)])
}

fn extract_open_graph(doc: &Html, base: &Url) -> anyhow::Result<PartialMetadata> {
    let mut image = og(doc, "og:image")?;
    if image.is_none() {
        image = og(doc, "og:image:url")?;
    }
    if image.is_none() {
        image = og(doc, "og:image:secure_url")?;
    }

    Ok(PartialMetadata {
        title: og(doc, "og:title")?,
        description: og(doc, "og:description")?,
        site_name: og(doc, "og:site_name")?,
        favicon: None,
        image: image.map(|i| resolve_url(base, &i)),
    })
}

fn extract_twitter_card(doc: &Html, base: &Url) -> anyhow::Result<PartialMetadata> {
    let mut image = twitter(doc, "twitter:image")?;
    if image.is_none() {
        image = twitter(doc, "twitter:image:src")?;
    }

    Ok(PartialMetadata {
        title: twitter(doc, "twitter:title")?,
        description: twitter(doc, "twitter:description")?,
        site_name: None,
        favicon: None,
        image: image.map(|i| resolve_url(base, &i)),
    })
}

fn extract_standard(doc: &Html, base: &Url) -> anyhow::Result<PartialMetadata> {
    let title = match first_text(doc, "title")? {
        Some(title) => Some(title),
        None => first_text(doc, "h1")?,
    };

    Ok(PartialMetadata {
        title,
        description: meta_content(doc, "name", "description")?,
        site_name: meta_content(doc, "name", "application-name")?,
        favicon: Some(extract_favicon(doc, base)?),
        image: None,
    })
}

/// `rel="icon"` or `rel="shortcut icon"`, then `apple-touch-icon`, then `/favicon.ico` at the origin.
fn extract_favicon(doc: &Html, base: &Url) -> anyhow::Result<String> {
    let href = match link_href(doc, |rel| rel.contains(&"icon"))? {
        Some(href) => Some(href),
        None => link_href(doc, |rel| {
            rel.contains(&"apple-touch-icon") || rel.contains(&"apple-touch-icon-precomposed")
        })?,
    };

    Ok(match href {
        Some(href) => resolve_url(base, &href),
        None => format!("{}/favicon.ico", base.origin().ascii_serialization()),
    })
}
