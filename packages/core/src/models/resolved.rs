//! Render-ready output of view resolution

use serde::Serialize;

use super::corpus::{ExperienceRecord, PostRecord};
use super::node::{NodeId, NodeKind};
use super::node_config::NodeConfig;

/// A fully expanded view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedView {
    pub path: String,
    pub title: String,
    pub browser_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub root: ResolvedNode,
}

/// A node with its derived content and its children, recursively
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub config: NodeConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedContent>,
    pub children: Vec<ResolvedNode>,
}

impl ResolvedNode {
    /// Pre-order walk over this node and its descendants
    pub fn walk(&self) -> Vec<&ResolvedNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesLink {
    pub slug: String,
    pub title: String,
}

/// Position of a post within its series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesNavigation {
    pub series: String,
    /// 1-based
    pub position: usize,
    pub total: usize,
    pub previous: Option<SeriesLink>,
    pub next: Option<SeriesLink>,
}

/// Content computed for a node during resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DerivedContent {
    Markdown {
        html: String,
        toc: Vec<TocEntry>,
    },
    /// `post` is `None` when the slug is not in the corpus
    Post {
        post: Option<PostRecord>,
        html: Option<String>,
        toc: Vec<TocEntry>,
        series: Option<SeriesNavigation>,
    },
    Posts {
        posts: Vec<PostRecord>,
    },
    Experiences {
        experiences: Vec<ExperienceRecord>,
    },
    Tags {
        tags: Vec<TagCount>,
    },
    ViewLink {
        target_path: String,
        target_title: Option<String>,
        exists: bool,
    },
}
