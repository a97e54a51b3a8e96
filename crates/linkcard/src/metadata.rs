// ABOUTME: LinkMetadata record resolved for a URL and the PartialMetadata produced by each strategy.
// ABOUTME: Partial records merge with later values overwriting earlier ones field by field.

use serde::{Deserialize, Serialize};

/// Descriptive metadata for a linked page, as embedded in a card block.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetadata {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Remote image URL, or the local path when local images are preferred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Reference to the persisted copy of `image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_image: Option<String>,
    /// Presentation hint owned by the caller.
    #[serde(default)]
    pub indent: i32,
}

impl LinkMetadata {
    /// Returns true if the record carries a non-empty image reference.
    pub fn has_image(&self) -> bool {
        self.image.as_ref().map_or(false, |i| !i.is_empty())
    }

    /// Returns true if the image has been persisted locally.
    pub fn has_local_image(&self) -> bool {
        self.local_image.as_ref().map_or(false, |i| !i.is_empty())
    }

    /// Overlay every field set in `partial` onto this record.
    pub fn apply(&mut self, partial: PartialMetadata) {
        if let Some(title) = partial.title {
            self.title = title;
        }
        if partial.description.is_some() {
            self.description = partial.description;
        }
        if partial.site_name.is_some() {
            self.site_name = partial.site_name;
        }
        if partial.favicon.is_some() {
            self.favicon = partial.favicon;
        }
        if partial.image.is_some() {
            self.image = partial.image;
        }
    }
}

/// The fields one extraction strategy found. `None` means "not found", never "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub site_name: Option<String>,
    pub favicon: Option<String>,
    pub image: Option<String>,
}

impl PartialMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.site_name.is_none()
            && self.favicon.is_none()
            && self.image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn apply_overwrites_only_present_fields() {
        let mut meta = LinkMetadata {
            url: "https://example.com".to_string(),
            title: "First".to_string(),
            description: Some("kept".to_string()),
            image: Some("https://example.com/a.png".to_string()),
            ..Default::default()
        };

        meta.apply(PartialMetadata {
            title: Some("Second".to_string()),
            image: Some("https://example.com/b.png".to_string()),
            ..Default::default()
        });

        assert_eq!(meta.title, "Second");
        assert_eq!(meta.description.as_deref(), Some("kept"));
        assert_eq!(meta.image.as_deref(), Some("https://example.com/b.png"));
    }

    #[test]
    fn serializes_camel_case_and_skips_missing() {
        let meta = LinkMetadata {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            site_name: Some("Example Site".to_string()),
            local_image: Some("attachments/x.png".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "url": "https://example.com",
                "title": "Example",
                "siteName": "Example Site",
                "localImage": "attachments/x.png",
                "indent": 0
            })
        );
    }

    #[test]
    fn deserialize_keeps_indent() {
        let meta: LinkMetadata =
            serde_json::from_str(r#"{"url":"https://a.test","title":"A","indent":2}"#).unwrap();
        assert_eq!(meta.indent, 2);
        assert!(!meta.has_image());
    }

    #[test]
    fn partial_is_empty() {
        assert!(PartialMetadata::default().is_empty());
        let partial = PartialMetadata {
            favicon: Some("https://a.test/favicon.ico".to_string()),
            ..Default::default()
        };
        assert!(!partial.is_empty());
    }
}
