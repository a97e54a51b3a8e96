// ABOUTME: Selector helpers shared by the extraction strategies: meta content, element text, link lookups.
// ABOUTME: Every helper trims and treats empty strings as no match; interior whitespace is left alone.

//! Field extraction helpers.
//!
//! Key behaviors:
//! - Meta candidates are tried in order; the first non-empty value wins.
//! - Text is trimmed only. Line breaks survive so the parser can strip them.
//! - An unparsable selector is an error, never a silent miss.

use anyhow::anyhow;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parse a CSS selector, reporting the selector text on failure.
pub fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector `{}`: {}", css, e))
}

/// Returns the trimmed `content` of the first `<meta {attr}="{key}">` with a non-empty value.
pub fn meta_content(doc: &Html, attr: &str, key: &str) -> anyhow::Result<Option<String>> {
    let sel = selector(&format!(r#"meta[{}="{}"]"#, attr, key))?;
    for el in doc.select(&sel) {
        if let Some(content) = el.value().attr("content") {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }
    Ok(None)
}

/// Tries each `(attr, key)` meta lookup in order and returns the first hit.
pub fn first_meta_content(doc: &Html, candidates: &[(&str, &str)]) -> anyhow::Result<Option<String>> {
    for (attr, key) in candidates {
        if let Some(value) = meta_content(doc, attr, key)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Returns the trimmed text of the first element matching `css`.
///
/// Only the first match is looked at. `None` when there is no match or its
/// text is blank.
pub fn first_text(doc: &Html, css: &str) -> anyhow::Result<Option<String>> {
    let sel = selector(css)?;
    Ok(doc
        .select(&sel)
        .next()
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty()))
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Returns the `href` of the first `<link>` whose `rel` tokens satisfy `matches`.
pub fn link_href<F>(doc: &Html, matches: F) -> anyhow::Result<Option<String>>
where
    F: Fn(&[&str]) -> bool,
{
    let sel = selector("link[rel][href]")?;
    for el in doc.select(&sel) {
        let rel = el.value().attr("rel").unwrap_or_default().to_lowercase();
        let tokens: Vec<&str> = rel.split_whitespace().collect();
        if !matches(&tokens) {
            continue;
        }
        if let Some(href) = el.value().attr("href") {
            let trimmed = href.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }
    Ok(None)
}

/// Resolve `href` against `base`. Absolute URLs are returned untouched.
pub fn resolve_url(base: &Url, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    match base.join(href) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}
