//! Views: URL paths bound to root nodes
//!
//! A [`View`] maps a normalized URL path to the root of one node tree. Paths are
//! unique across the site and each root node backs at most one view.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::node::{Node, NodeId, NodeKind, ValidationError};

/// Version written into every persisted [`ViewsDocument`]
pub const VIEWS_DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub path: String,
    pub root_node_id: NodeId,
    pub title: String,
    pub browser_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parameters for creating a view
///
/// When `root_node_id` is absent a fresh root node is created, a `Container`
/// unless `root_type`/`root_config` say otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewView {
    pub path: String,
    pub title: String,
    /// Defaults to `title`
    #[serde(default)]
    pub browser_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub root_node_id: Option<NodeId>,
    #[serde(default)]
    pub root_type: Option<NodeKind>,
    #[serde(default)]
    pub root_config: Option<Value>,
}

/// Partial update of a view's metadata or path
///
/// An empty `description` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPatch {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub browser_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ViewPatch {
    pub fn is_empty(&self) -> bool {
        self.path.is_none()
            && self.title.is_none()
            && self.browser_title.is_none()
            && self.description.is_none()
    }
}

/// Persisted form of the whole views configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewsDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub views: Vec<View>,
    /// Sorted by id
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_home_path: Option<String>,
}

fn default_version() -> u32 {
    VIEWS_DOCUMENT_VERSION
}

impl Default for ViewsDocument {
    fn default() -> Self {
        Self {
            version: VIEWS_DOCUMENT_VERSION,
            views: Vec::new(),
            nodes: Vec::new(),
            default_home_path: None,
        }
    }
}

/// Normalize a requested URL path for lookup
///
/// Adds a leading slash, collapses repeated slashes and strips a trailing slash
/// (except for `/` itself). Never fails; lookups of malformed paths simply miss.
pub fn normalize_path(raw: &str) -> String {
    let segments: Vec<&str> = raw.trim().split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

/// Validate a path supplied for a new or renamed view and return it normalized
pub fn validate_path(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('/') {
        return Err(ValidationError::invalid_path(raw, "must start with '/'"));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_path(raw, "must not contain whitespace"));
    }
    if trimmed.contains(['?', '#']) {
        return Err(ValidationError::invalid_path(
            raw,
            "must not contain a query or fragment",
        ));
    }
    Ok(normalize_path(trimmed))
}
