//! Typed per-kind node configuration
//!
//! Each [`NodeKind`] owns one config record. Records are parsed strictly
//! (`deny_unknown_fields`) so a misspelled key is reported instead of silently
//! dropped, and every field has a default so a bare `{}` is a valid starting point.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::node::{NodeKind, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleLevel {
    #[default]
    H1,
    H2,
    H3,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TitleConfig {
    pub text: String,
    pub level: TitleLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationStyle {
    #[default]
    Default,
    Muted,
    Highlight,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct InformationConfig {
    pub content: String,
    pub style: InformationStyle,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MarkdownConfig {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BlogPostsListConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PostConfig {
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ExperienceListConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    #[default]
    Posts,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TagListConfig {
    pub source: TagSource,
    pub custom_tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ViewLinkConfig {
    pub target_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MultiMediaConfig {
    pub media: MediaKind,
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub autoplay: bool,
    pub muted: bool,
    pub controls: bool,
}

impl Default for MultiMediaConfig {
    fn default() -> Self {
        Self {
            media: MediaKind::Image,
            src: String::new(),
            alt: None,
            caption: None,
            autoplay: false,
            muted: false,
            controls: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PdfViewerConfig {
    pub src: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Viewer height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub display_title: bool,
}

impl Default for PdfViewerConfig {
    fn default() -> Self {
        Self {
            src: String::new(),
            title: None,
            height: None,
            display_title: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertVariant {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AlertConfig {
    pub content: String,
    pub variant: AlertVariant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerLayout {
    #[default]
    Stack,
    Inline,
    List,
    Grid,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ContainerConfig {
    pub layout: ContainerLayout,
    pub transparent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Configuration of a node, one variant per [`NodeKind`]
///
/// Serializes as the bare inner record; the kind travels next to it as the node's
/// `type` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeConfig {
    Title(TitleConfig),
    Information(InformationConfig),
    Markdown(MarkdownConfig),
    BlogPostsList(BlogPostsListConfig),
    Post(PostConfig),
    ExperienceList(ExperienceListConfig),
    TagList(TagListConfig),
    ViewLink(ViewLinkConfig),
    MultiMedia(MultiMediaConfig),
    PdfViewer(PdfViewerConfig),
    Alert(AlertConfig),
    Container(ContainerConfig),
}

fn parse<T: serde::de::DeserializeOwned>(kind: NodeKind, value: Value) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(|e| ValidationError::invalid_config(kind, e.to_string()))
}

impl NodeConfig {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeConfig::Title(_) => NodeKind::Title,
            NodeConfig::Information(_) => NodeKind::Information,
            NodeConfig::Markdown(_) => NodeKind::Markdown,
            NodeConfig::BlogPostsList(_) => NodeKind::BlogPostsList,
            NodeConfig::Post(_) => NodeKind::Post,
            NodeConfig::ExperienceList(_) => NodeKind::ExperienceList,
            NodeConfig::TagList(_) => NodeKind::TagList,
            NodeConfig::ViewLink(_) => NodeKind::ViewLink,
            NodeConfig::MultiMedia(_) => NodeKind::MultiMedia,
            NodeConfig::PdfViewer(_) => NodeKind::PdfViewer,
            NodeConfig::Alert(_) => NodeKind::Alert,
            NodeConfig::Container(_) => NodeKind::Container,
        }
    }

    /// All-defaults config for a kind (may not pass [`NodeConfig::validate`])
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Title => NodeConfig::Title(TitleConfig::default()),
            NodeKind::Information => NodeConfig::Information(InformationConfig::default()),
            NodeKind::Markdown => NodeConfig::Markdown(MarkdownConfig::default()),
            NodeKind::BlogPostsList => NodeConfig::BlogPostsList(BlogPostsListConfig::default()),
            NodeKind::Post => NodeConfig::Post(PostConfig::default()),
            NodeKind::ExperienceList => NodeConfig::ExperienceList(ExperienceListConfig::default()),
            NodeKind::TagList => NodeConfig::TagList(TagListConfig::default()),
            NodeKind::ViewLink => NodeConfig::ViewLink(ViewLinkConfig::default()),
            NodeKind::MultiMedia => NodeConfig::MultiMedia(MultiMediaConfig::default()),
            NodeKind::PdfViewer => NodeConfig::PdfViewer(PdfViewerConfig::default()),
            NodeKind::Alert => NodeConfig::Alert(AlertConfig::default()),
            NodeKind::Container => NodeConfig::Container(ContainerConfig::default()),
        }
    }

    /// Parse and validate a JSON config for the given kind
    ///
    /// `null` is treated as `{}`. Unknown fields and wrongly typed values are
    /// reported as [`ValidationError::InvalidConfig`].
    pub fn from_value(kind: NodeKind, value: Value) -> Result<Self, ValidationError> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            Value::Object(map) => Value::Object(map),
            other => {
                return Err(ValidationError::invalid_config(
                    kind,
                    format!("config must be a JSON object, got {}", other),
                ))
            }
        };

        let config = match kind {
            NodeKind::Title => NodeConfig::Title(parse(kind, value)?),
            NodeKind::Information => NodeConfig::Information(parse(kind, value)?),
            NodeKind::Markdown => NodeConfig::Markdown(parse(kind, value)?),
            NodeKind::BlogPostsList => NodeConfig::BlogPostsList(parse(kind, value)?),
            NodeKind::Post => NodeConfig::Post(parse(kind, value)?),
            NodeKind::ExperienceList => NodeConfig::ExperienceList(parse(kind, value)?),
            NodeKind::TagList => NodeConfig::TagList(parse(kind, value)?),
            NodeKind::ViewLink => NodeConfig::ViewLink(parse(kind, value)?),
            NodeKind::MultiMedia => NodeConfig::MultiMedia(parse(kind, value)?),
            NodeKind::PdfViewer => NodeConfig::PdfViewer(parse(kind, value)?),
            NodeKind::Alert => NodeConfig::Alert(parse(kind, value)?),
            NodeKind::Container => NodeConfig::Container(parse(kind, value)?),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Check value-level constraints the type system does not capture
    pub fn validate(&self) -> Result<(), ValidationError> {
        let kind = self.kind();
        let fail = |reason: &str| -> Result<(), ValidationError> {
            Err(ValidationError::invalid_config(kind, reason))
        };

        match self {
            NodeConfig::Title(c) if c.text.trim().is_empty() => fail("text must not be empty"),
            NodeConfig::Post(c) if c.slug.trim().is_empty() => fail("slug must not be empty"),
            NodeConfig::BlogPostsList(c) if c.limit == Some(0) => fail("limit must be positive"),
            NodeConfig::ExperienceList(c) if c.limit == Some(0) => {
                fail("limit must be positive")
            }
            NodeConfig::TagList(c)
                if c.custom_tags.iter().any(|t| t.trim().is_empty()) =>
            {
                fail("customTags must not contain empty tags")
            }
            NodeConfig::ViewLink(c) if !c.target_path.starts_with('/') => {
                fail("targetPath must start with '/'")
            }
            NodeConfig::MultiMedia(c) if c.src.trim().is_empty() => fail("src must not be empty"),
            NodeConfig::PdfViewer(c) if c.src.trim().is_empty() => fail("src must not be empty"),
            NodeConfig::PdfViewer(c) if c.height == Some(0) => fail("height must be positive"),
            _ => Ok(()),
        }
    }

    /// Apply a shallow JSON merge patch and re-validate
    ///
    /// Top-level keys replace existing ones and `null` removes a key (restoring its
    /// default). A `type` key is accepted only if it names the current kind.
    pub fn merge_patch(&self, patch: &Value) -> Result<NodeConfig, ValidationError> {
        let patch = patch.as_object().ok_or(ValidationError::PatchNotObject)?;
        let kind = self.kind();

        let mut merged = match self.to_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        for (key, value) in patch {
            if key == "type" {
                let requested = value
                    .as_str()
                    .ok_or_else(|| ValidationError::invalid_config(kind, "type must be a string"))?
                    .parse::<NodeKind>()?;
                if requested != kind {
                    return Err(ValidationError::TypeChange {
                        from: kind,
                        to: requested,
                    });
                }
                continue;
            }

            if value.is_null() {
                merged.remove(key);
            } else {
                merged.insert(key.clone(), value.clone());
            }
        }

        NodeConfig::from_value(kind, Value::Object(merged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_parses_camel_case_fields() {
        let config = NodeConfig::from_value(
            NodeKind::TagList,
            json!({ "source": "custom", "customTags": ["Rust", "Go"] }),
        )
        .unwrap();

        match config {
            NodeConfig::TagList(c) => {
                assert_eq!(c.source, TagSource::Custom);
                assert_eq!(c.custom_tags, vec!["Rust", "Go"]);
            }
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn test_from_value_rejects_unknown_fields() {
        let err = NodeConfig::from_value(NodeKind::Markdown, json!({ "body": "x" })).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidConfig {
                kind: NodeKind::Markdown,
                ..
            }
        ));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let err = NodeConfig::from_value(NodeKind::Container, json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    fn test_defaults_are_applied() {
        let config =
            NodeConfig::from_value(NodeKind::MultiMedia, json!({ "src": "/a.png" })).unwrap();
        let NodeConfig::MultiMedia(media) = config else {
            panic!("expected MultiMedia");
        };
        assert_eq!(media.media, MediaKind::Image);
        assert!(media.controls);
        assert!(!media.autoplay);
    }

    #[test]
    fn test_pdf_viewer_serializes_display_title() {
        let config = NodeConfig::PdfViewer(PdfViewerConfig {
            src: "/cv.pdf".to_string(),
            ..Default::default()
        });
        assert_eq!(
            config.to_value(),
            json!({ "src": "/cv.pdf", "displayTitle": true })
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(NodeConfig::from_value(NodeKind::Title, json!({ "text": "  " })).is_err());
        assert!(NodeConfig::from_value(NodeKind::Post, json!({})).is_err());
        assert!(NodeConfig::from_value(NodeKind::BlogPostsList, json!({ "limit": 0 })).is_err());
        assert!(
            NodeConfig::from_value(NodeKind::ViewLink, json!({ "targetPath": "blog" })).is_err()
        );
        assert!(NodeConfig::from_value(NodeKind::Container, json!({})).is_ok());
    }

    #[test]
    fn test_merge_patch_is_shallow() {
        let config = NodeConfig::from_value(
            NodeKind::Alert,
            json!({ "content": "old", "variant": "error" }),
        )
        .unwrap();

        let patched = config.merge_patch(&json!({ "content": "new" })).unwrap();
        assert_eq!(
            patched,
            NodeConfig::Alert(AlertConfig {
                content: "new".to_string(),
                variant: AlertVariant::Error,
            })
        );
    }

    #[test]
    fn test_merge_patch_null_restores_default() {
        let config = NodeConfig::from_value(
            NodeKind::BlogPostsList,
            json!({ "tag": "rust", "limit": 5 }),
        )
        .unwrap();

        let patched = config.merge_patch(&json!({ "tag": null })).unwrap();
        assert_eq!(
            patched,
            NodeConfig::BlogPostsList(BlogPostsListConfig {
                tag: None,
                limit: Some(5),
            })
        );
    }

    #[test]
    fn test_merge_patch_rejects_type_change() {
        let config = NodeConfig::default_for(NodeKind::Container);

        let err = config.merge_patch(&json!({ "type": "Markdown" })).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeChange {
                from: NodeKind::Container,
                to: NodeKind::Markdown,
            }
        );

        // Restating the current type is a no-op
        assert_eq!(
            config.merge_patch(&json!({ "type": "Container" })).unwrap(),
            config
        );
    }

    #[test]
    fn test_merge_patch_requires_object() {
        let config = NodeConfig::default_for(NodeKind::Container);
        assert_eq!(
            config.merge_patch(&json!("layout")),
            Err(ValidationError::PatchNotObject)
        );
    }
}
