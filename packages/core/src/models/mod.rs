//! Data Models
//!
//! This module contains the core data structures used throughout ViewTree:
//!
//! - `Node` / `NodeConfig` - typed content nodes forming a forest of view trees
//! - `View` - a URL path bound to one root node
//! - `PostRecord` / `ExperienceRecord` - read-only corpus entries
//! - `ResolvedView` - the render-ready result of resolving a path

mod corpus;
mod node;
mod node_config;
mod resolved;
mod view;

pub use corpus::{split_categories, ExperienceRecord, PostRecord};
pub use node::{Node, NodeId, NodeKind, ValidationError, PROVISIONAL_ID_PREFIX};
pub use node_config::{
    AlertConfig, AlertVariant, BlogPostsListConfig, ContainerConfig, ContainerLayout,
    ExperienceListConfig, InformationConfig, InformationStyle, MarkdownConfig, MediaKind,
    MultiMediaConfig, NodeConfig, PdfViewerConfig, PostConfig, TagListConfig, TagSource,
    TitleConfig, TitleLevel, ViewLinkConfig,
};
pub use resolved::{
    DerivedContent, ResolvedNode, ResolvedView, SeriesLink, SeriesNavigation, TagCount, TocEntry,
};
pub use view::{
    normalize_path, validate_path, NewView, View, ViewPatch, ViewsDocument,
    VIEWS_DOCUMENT_VERSION,
};
