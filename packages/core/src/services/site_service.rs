//! Site Service - read-side façade over the committed views config
//!
//! Pairs the [`MutationPipeline`] (which owns the canonical snapshot) with a
//! [`ViewResolver`]. Every read takes one snapshot up front and works on it, so
//! a resolution never observes a half-applied commit.

use std::sync::Arc;

use tracing::{debug, error};

use super::error::ViewServiceError;
use super::mutation_pipeline::MutationPipeline;
use super::view_resolver::{resolve_view_by_path, ViewResolver};
use crate::db::IntegrityIssue;
use crate::models::{ResolvedNode, ResolvedView, View};

#[derive(Clone)]
pub struct SiteService {
    pipeline: Arc<MutationPipeline>,
    resolver: ViewResolver,
}

impl SiteService {
    pub fn new(pipeline: Arc<MutationPipeline>, resolver: ViewResolver) -> Self {
        Self { pipeline, resolver }
    }

    pub fn pipeline(&self) -> &Arc<MutationPipeline> {
        &self.pipeline
    }

    pub fn resolver(&self) -> &ViewResolver {
        &self.resolver
    }

    /// Exact-match lookup of the view registered at `path`
    pub fn resolve_view_by_path(&self, path: &str) -> Option<View> {
        resolve_view_by_path(path, &self.pipeline.snapshot())
    }

    /// Resolve `path` into a render-ready tree; integrity errors read as `None`
    pub fn get_resolved_view_by_path(&self, path: &str) -> Option<ResolvedView> {
        let snapshot = self.pipeline.snapshot();
        self.resolver.get_resolved_view_by_path(path, &snapshot)
    }

    /// Like [`get_resolved_view_by_path`](Self::get_resolved_view_by_path) but
    /// surfaces integrity errors
    pub fn try_resolve(&self, path: &str) -> Result<Option<ResolvedView>, ViewServiceError> {
        let snapshot = self.pipeline.snapshot();
        self.resolver.try_resolve(path, &snapshot)
    }

    /// Resolve the subtree below one node; unknown ids and integrity errors
    /// read as `None`
    pub fn resolve_node(&self, id: &str) -> Option<ResolvedNode> {
        let snapshot = self.pipeline.snapshot();
        match self.resolver.try_resolve_node(id, &snapshot) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!("Failed to resolve node {}: {}", id, e);
                None
            }
        }
    }

    /// Every resolvable view from one snapshot, in path order
    pub fn get_all_views_resolved(&self) -> Vec<ResolvedView> {
        let snapshot = self.pipeline.snapshot();
        self.resolver.resolve_all(&snapshot)
    }

    /// Resolve the default home view, if one is configured
    pub fn resolve_home(&self) -> Option<ResolvedView> {
        let snapshot = self.pipeline.snapshot();
        let home = snapshot.default_home_path()?;
        debug!("Resolving default home {}", home);
        self.resolver.get_resolved_view_by_path(home, &snapshot)
    }

    /// All registered view paths in lexical order
    pub fn list_view_paths(&self) -> Vec<String> {
        self.pipeline.snapshot().view_paths()
    }

    pub fn default_home_path(&self) -> Option<String> {
        self.pipeline.snapshot().default_home_path().map(str::to_string)
    }

    pub fn integrity_report(&self) -> Vec<IntegrityIssue> {
        self.pipeline.integrity_report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::db::MemoryPersistence;
    use crate::models::{NewView, NodeKind};
    use crate::operations::CreateNodeParams;
    use crate::services::{PulldownRenderer, StaticCorpus};
    use serde_json::json;

    fn service() -> SiteService {
        let config = EngineConfig::default();
        let pipeline = Arc::new(MutationPipeline::new(
            Arc::new(MemoryPersistence::new()),
            config.clone(),
        ));
        let resolver = ViewResolver::new(
            Arc::new(PulldownRenderer::new()),
            Arc::new(StaticCorpus::default()),
            &config,
        );
        SiteService::new(pipeline, resolver)
    }

    fn new_view(path: &str, title: &str) -> NewView {
        NewView {
            path: path.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_reads_follow_commits() {
        let site = service();
        assert!(site.list_view_paths().is_empty());
        assert!(site.resolve_home().is_none());

        let home = site.pipeline().create_view(new_view("/", "Home")).await.unwrap();
        site.pipeline().create_view(new_view("/blog", "Blog")).await.unwrap();
        site.pipeline()
            .create_node(CreateNodeParams::new(
                home.root_node_id.clone(),
                NodeKind::Title,
                json!({ "text": "Welcome" }),
            ))
            .await
            .unwrap();

        assert_eq!(site.list_view_paths(), vec!["/", "/blog"]);
        assert_eq!(site.resolve_view_by_path("/blog/").unwrap().title, "Blog");

        let resolved = site.get_resolved_view_by_path("/").unwrap();
        assert_eq!(resolved.root.children.len(), 1);

        site.pipeline().set_default_home("/").await.unwrap();
        assert_eq!(site.default_home_path().as_deref(), Some("/"));
        assert_eq!(site.resolve_home().unwrap().title, "Home");
    }

    #[tokio::test]
    async fn test_resolve_node_and_all_views() {
        let site = service();
        let home = site.pipeline().create_view(new_view("/", "Home")).await.unwrap();
        let section = site
            .pipeline()
            .create_node(CreateNodeParams::new(
                home.root_node_id.clone(),
                NodeKind::Container,
                json!({}),
            ))
            .await
            .unwrap();
        site.pipeline()
            .create_node(CreateNodeParams::new(
                section.id.clone(),
                NodeKind::Markdown,
                json!({ "content": "## Inside" }),
            ))
            .await
            .unwrap();

        let subtree = site.resolve_node(section.id.as_str()).unwrap();
        assert_eq!(subtree.id, section.id);
        assert_eq!(subtree.children.len(), 1);
        assert!(subtree.children[0].derived.is_some());
        assert!(site.resolve_node("missing").is_none());

        // An orphaned view is skipped, the rest still resolve
        let gone = site.pipeline().create_view(new_view("/gone", "Gone")).await.unwrap();
        site.pipeline().create_view(new_view("/about", "About")).await.unwrap();
        site.pipeline()
            .delete_node(gone.root_node_id.as_str(), true)
            .await
            .unwrap();

        let all = site.get_all_views_resolved();
        let paths: Vec<&str> = all.iter().map(|view| view.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/about"]);
    }

    #[tokio::test]
    async fn test_orphaned_view_reported() {
        let site = service();
        let view = site.pipeline().create_view(new_view("/gone", "Gone")).await.unwrap();
        site.pipeline()
            .delete_node(view.root_node_id.as_str(), true)
            .await
            .unwrap();

        assert!(site.get_resolved_view_by_path("/gone").is_none());
        assert!(site.try_resolve("/gone").is_err());
        assert!(site
            .integrity_report()
            .iter()
            .any(|issue| issue.is_blocking()));
    }
}
