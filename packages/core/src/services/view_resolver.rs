//! View Resolver - path lookup and recursive tree expansion
//!
//! Resolution runs against an immutable [`ViewsConfig`] snapshot and takes no
//! locks. It is two steps:
//!
//! 1. **Lookup**: normalize the path (trailing slash stripped, except `/`) and
//!    match it exactly against registered views. No prefix or fallback matching.
//! 2. **Expansion**: depth-first from the view's root, attaching each node's
//!    config, derived content and ordered children.
//!
//! Expansion refuses to trust the stored structure blindly: exceeding the
//! depth limit, reaching a node twice, or a missing root node are integrity
//! errors. The public read logs them and returns `None`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error};

use super::corpus::ContentCorpus;
use super::error::ViewServiceError;
use super::renderer::MarkdownRenderer;
use crate::config::EngineConfig;
use crate::db::ViewsConfig;
use crate::derivation::{
    custom_tag_counts, experiences_listing, posts_listing, series_navigation, table_of_contents,
    tag_frequencies,
};
use crate::models::{
    normalize_path, DerivedContent, Node, NodeConfig, NodeId, ResolvedNode, ResolvedView,
    TagSource, View,
};

/// Exact-match view lookup
pub fn resolve_view_by_path(path: &str, config: &ViewsConfig) -> Option<View> {
    let normalized = normalize_path(path);
    let view = config.view(&normalized).cloned();
    if view.is_none() {
        debug!("No view registered for {}", normalized);
    }
    view
}

/// Expand the subtree under `root_id` without following any node twice
///
/// `derive` computes the derived content of each node; pass `|_| None` for a
/// purely structural tree.
pub fn expand_tree<F>(
    config: &ViewsConfig,
    root_id: &NodeId,
    max_depth: usize,
    mut derive: F,
) -> Result<ResolvedNode, ViewServiceError>
where
    F: FnMut(&Node) -> Option<DerivedContent>,
{
    let mut seen = HashSet::new();
    expand(config, root_id, 0, max_depth, &mut seen, &mut derive)
}

fn expand<F>(
    config: &ViewsConfig,
    id: &NodeId,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<NodeId>,
    derive: &mut F,
) -> Result<ResolvedNode, ViewServiceError>
where
    F: FnMut(&Node) -> Option<DerivedContent>,
{
    if depth > max_depth {
        return Err(ViewServiceError::integrity(format!(
            "tree below '{}' exceeds maximum depth {}",
            id, max_depth
        )));
    }
    if !seen.insert(id.clone()) {
        return Err(ViewServiceError::integrity(format!(
            "node '{}' reached twice during resolution",
            id
        )));
    }

    let node = config
        .node(id.as_str())
        .ok_or_else(|| ViewServiceError::integrity(format!("node '{}' is missing", id)))?;

    let mut children = Vec::with_capacity(config.nodes().child_ids(id.as_str()).len());
    for child_id in config.nodes().child_ids(id.as_str()) {
        children.push(expand(config, child_id, depth + 1, max_depth, seen, derive)?);
    }

    Ok(ResolvedNode {
        id: node.id.clone(),
        kind: node.kind(),
        config: node.config.clone(),
        derived: derive(node),
        children,
    })
}

/// Resolves paths into render-ready trees
#[derive(Clone)]
pub struct ViewResolver {
    renderer: Arc<dyn MarkdownRenderer>,
    corpus: Arc<dyn ContentCorpus>,
    max_depth: usize,
    toc_max_level: u8,
}

impl ViewResolver {
    pub fn new(
        renderer: Arc<dyn MarkdownRenderer>,
        corpus: Arc<dyn ContentCorpus>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            renderer,
            corpus,
            max_depth: config.max_resolution_depth,
            toc_max_level: config.toc_max_level,
        }
    }

    pub fn corpus(&self) -> &Arc<dyn ContentCorpus> {
        &self.corpus
    }

    /// Resolve a path, surfacing integrity errors
    ///
    /// `Ok(None)` means no view is registered for the path.
    pub fn try_resolve(
        &self,
        path: &str,
        config: &ViewsConfig,
    ) -> Result<Option<ResolvedView>, ViewServiceError> {
        let Some(view) = resolve_view_by_path(path, config) else {
            return Ok(None);
        };

        if config.node(view.root_node_id.as_str()).is_none() {
            return Err(ViewServiceError::integrity(format!(
                "view '{}' references missing root node '{}'",
                view.path, view.root_node_id
            )));
        }

        let root = expand_tree(config, &view.root_node_id, self.max_depth, |node| {
            self.derive(node, config)
        })?;
        debug!("Resolved {} ({} nodes)", view.path, root.walk().len());

        Ok(Some(ResolvedView {
            path: view.path,
            title: view.title,
            browser_title: view.browser_title,
            description: view.description,
            root,
        }))
    }

    /// Resolve a path; integrity errors are logged and read as "not found"
    pub fn get_resolved_view_by_path(
        &self,
        path: &str,
        config: &ViewsConfig,
    ) -> Option<ResolvedView> {
        match self.try_resolve(path, config) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!("Failed to resolve view {}: {}", normalize_path(path), e);
                None
            }
        }
    }

    /// Expand the subtree rooted at any node, not only a view root
    ///
    /// `Ok(None)` means the node does not exist.
    pub fn try_resolve_node(
        &self,
        id: &str,
        config: &ViewsConfig,
    ) -> Result<Option<ResolvedNode>, ViewServiceError> {
        let Some(node) = config.node(id) else {
            return Ok(None);
        };
        let resolved = expand_tree(config, &node.id, self.max_depth, |node| {
            self.derive(node, config)
        })?;
        Ok(Some(resolved))
    }

    /// Every view that resolves, in path order
    ///
    /// Views failing integrity checks are logged and left out.
    pub fn resolve_all(&self, config: &ViewsConfig) -> Vec<ResolvedView> {
        config
            .view_paths()
            .iter()
            .filter_map(|path| self.get_resolved_view_by_path(path, config))
            .collect()
    }

    /// Derived content for one node
    pub fn derive(&self, node: &Node, config: &ViewsConfig) -> Option<DerivedContent> {
        match &node.config {
            NodeConfig::Markdown(c) => {
                let rendered = self.renderer.render(&c.content);
                Some(DerivedContent::Markdown {
                    html: rendered.html,
                    toc: table_of_contents(&rendered.headings, self.toc_max_level),
                })
            }
            NodeConfig::Post(c) => Some(self.derive_post(&c.slug)),
            NodeConfig::BlogPostsList(c) => Some(DerivedContent::Posts {
                posts: posts_listing(self.corpus.posts(), c.tag.as_deref(), c.limit),
            }),
            NodeConfig::ExperienceList(c) => Some(DerivedContent::Experiences {
                experiences: experiences_listing(self.corpus.experiences(), c.limit),
            }),
            NodeConfig::TagList(c) => Some(DerivedContent::Tags {
                tags: match c.source {
                    TagSource::Posts => tag_frequencies(self.corpus.posts()),
                    TagSource::Custom => custom_tag_counts(&c.custom_tags),
                },
            }),
            NodeConfig::ViewLink(c) => {
                let target_path = normalize_path(&c.target_path);
                let target = config.view(&target_path);
                Some(DerivedContent::ViewLink {
                    target_title: target.map(|v| v.title.clone()),
                    exists: target.is_some(),
                    target_path,
                })
            }
            NodeConfig::Title(_)
            | NodeConfig::Information(_)
            | NodeConfig::MultiMedia(_)
            | NodeConfig::PdfViewer(_)
            | NodeConfig::Alert(_)
            | NodeConfig::Container(_) => None,
        }
    }

    fn derive_post(&self, slug: &str) -> DerivedContent {
        let Some(post) = self.corpus.post(slug) else {
            debug!("Post '{}' not in corpus", slug);
            return DerivedContent::Post {
                post: None,
                html: None,
                toc: Vec::new(),
                series: None,
            };
        };

        let rendered = self.corpus.post_body(slug).map(|body| self.renderer.render(body));
        let toc = match (&rendered, post.toc) {
            (Some(r), true) => table_of_contents(&r.headings, self.toc_max_level),
            _ => Vec::new(),
        };

        DerivedContent::Post {
            post: Some(post.clone()),
            html: rendered.map(|r| r.html),
            toc,
            series: series_navigation(self.corpus.posts(), slug),
        }
    }
}

#[cfg(test)]
#[path = "view_resolver_test.rs"]
mod view_resolver_test;
