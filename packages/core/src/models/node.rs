//! Node Data Structures
//!
//! This module defines the core `Node` struct and the identifiers and kinds that
//! go with it.
//!
//! # Architecture
//!
//! - **Closed kind set**: every node is one of the [`NodeKind`] variants; the
//!   type-specific configuration lives in [`NodeConfig`], one variant per kind
//! - **Parent pointers**: a node knows its parent and its rank among siblings;
//!   the children index is owned by the node store
//! - **Validated wire form**: `type` and `config` are checked together whenever a
//!   node is deserialized, so a persisted document cannot smuggle in a config that
//!   does not belong to its kind
//!
//! # Examples
//!
//! ```rust
//! use viewtree_core::models::{Node, NodeConfig, NodeId, NodeKind, TitleConfig};
//!
//! let node = Node::new(
//!     NodeId::from("title-1"),
//!     None,
//!     NodeConfig::Title(TitleConfig {
//!         text: "Hello".to_string(),
//!         ..Default::default()
//!     }),
//! );
//! assert_eq!(node.kind(), NodeKind::Title);
//! assert!(node.is_root());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::node_config::NodeConfig;

/// Prefix carried by ids that were assigned locally before the server confirmed them
pub const PROVISIONAL_ID_PREFIX: &str = "tmp-";

/// Validation errors for node configs, view definitions and paths
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid {kind} config: {reason}")]
    InvalidConfig { kind: NodeKind, reason: String },

    #[error("Node type is immutable: cannot change {from} into {to}")]
    TypeChange { from: NodeKind, to: NodeKind },

    #[error("Config patch must be a JSON object")]
    PatchNotObject,

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Invalid view path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("View path already registered: {0}")]
    DuplicatePath(String),

    #[error("Root node '{node_id}' is already bound to view '{path}'")]
    RootAlreadyBound { node_id: String, path: String },

    #[error("Node '{0}' has a parent and cannot be bound to a view")]
    NotARoot(String),

    #[error("Node '{node_id}' is the root of view '{path}' and cannot be moved")]
    ViewRootNotMovable { node_id: String, path: String },

    #[error("Node '{0}' has children; deleting it requires cascade")]
    HasChildren(String),

    #[error("Node id already in use: {0}")]
    DuplicateId(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Placing '{node_id}' under '{parent_id}' would nest deeper than {max_depth} levels")]
    DepthExceeded {
        node_id: String,
        parent_id: String,
        max_depth: usize,
    },
}

impl ValidationError {
    /// Create an invalid config error
    pub fn invalid_config(kind: NodeKind, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            kind,
            reason: reason.into(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Opaque, store-wide unique node identifier
///
/// Server-assigned ids are UUID v4 strings. Ids created by the store mirror for
/// optimistic updates carry the [`PROVISIONAL_ID_PREFIX`] until reconciliation
/// replaces them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a fresh server-side id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Generate a provisional id for optimistic local application
    pub fn provisional() -> Self {
        Self(format!("{}{}", PROVISIONAL_ID_PREFIX, Uuid::new_v4()))
    }

    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(PROVISIONAL_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The closed set of component kinds a node can be
///
/// Adding a kind here forces every exhaustive `match` over kinds (config parsing,
/// validation, resolution) to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Title,
    Information,
    Markdown,
    BlogPostsList,
    Post,
    ExperienceList,
    TagList,
    ViewLink,
    MultiMedia,
    #[serde(rename = "PDFViewer")]
    PdfViewer,
    Alert,
    Container,
}

impl NodeKind {
    pub const ALL: [NodeKind; 12] = [
        NodeKind::Title,
        NodeKind::Information,
        NodeKind::Markdown,
        NodeKind::BlogPostsList,
        NodeKind::Post,
        NodeKind::ExperienceList,
        NodeKind::TagList,
        NodeKind::ViewLink,
        NodeKind::MultiMedia,
        NodeKind::PdfViewer,
        NodeKind::Alert,
        NodeKind::Container,
    ];

    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Title => "Title",
            NodeKind::Information => "Information",
            NodeKind::Markdown => "Markdown",
            NodeKind::BlogPostsList => "BlogPostsList",
            NodeKind::Post => "Post",
            NodeKind::ExperienceList => "ExperienceList",
            NodeKind::TagList => "TagList",
            NodeKind::ViewLink => "ViewLink",
            NodeKind::MultiMedia => "MultiMedia",
            NodeKind::PdfViewer => "PDFViewer",
            NodeKind::Alert => "Alert",
            NodeKind::Container => "Container",
        }
    }

    /// Whether nodes of this kind may have children
    pub fn accepts_children(&self) -> bool {
        match self {
            NodeKind::Container => true,
            NodeKind::Title
            | NodeKind::Information
            | NodeKind::Markdown
            | NodeKind::BlogPostsList
            | NodeKind::Post
            | NodeKind::ExperienceList
            | NodeKind::TagList
            | NodeKind::ViewLink
            | NodeKind::MultiMedia
            | NodeKind::PdfViewer
            | NodeKind::Alert => false,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownNodeType(s.to_string()))
    }
}

/// One configured component instance in a view tree
///
/// # Fields
///
/// - `id`: store-wide unique identifier
/// - `parent_id`: parent node, `None` for roots
/// - `order`: rank among the parent's children (dense `0..n-1`)
/// - `config`: typed configuration; the node's kind is derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeRecord", into = "NodeRecord")]
pub struct Node {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub order: u32,
    pub config: NodeConfig,
}

impl Node {
    /// Create a node with order 0; the node store assigns the real rank on insert
    pub fn new(id: NodeId, parent_id: Option<NodeId>, config: NodeConfig) -> Self {
        Self {
            id,
            parent_id,
            order: 0,
            config,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.config.kind()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Wire form of a node: `{"id","type","parentId","order","config"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    id: NodeId,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default)]
    parent_id: Option<NodeId>,
    #[serde(default)]
    order: u32,
    #[serde(default)]
    config: Value,
}

impl TryFrom<NodeRecord> for Node {
    type Error = ValidationError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        let config = NodeConfig::from_value(record.kind, record.config)?;
        Ok(Node {
            id: record.id,
            parent_id: record.parent_id,
            order: record.order,
            config,
        })
    }
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        NodeRecord {
            kind: node.kind(),
            config: node.config.to_value(),
            id: node.id,
            parent_id: node.parent_id,
            order: node.order,
        }
    }
}
