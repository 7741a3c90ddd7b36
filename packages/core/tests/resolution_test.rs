//! End-to-end resolution tests
//!
//! Builds a site on disk (corpus + persisted views), resolves it, reloads it
//! from disk and checks the reloaded site resolves identically.

#[cfg(test)]
mod resolution_tests {
    use std::path::Path;
    use std::sync::Arc;

    use anyhow::Result;
    use serde_json::json;
    use tempfile::TempDir;
    use viewtree_core::{
        CreateNodeParams, DerivedContent, EngineConfig, JsonFilePersistence, MutationPipeline,
        NewView, NodeKind, PulldownRenderer, SiteService, StaticCorpus, TagCount, ViewResolver,
    };

    async fn write_corpus(dir: &Path) -> Result<()> {
        let corpus = json!({
            "posts": [
                { "slug": "hello", "title": "Hello", "date": "2024-01-05",
                  "categories": "Go, go", "series": "Intro", "toc": true },
                { "slug": "again", "title": "Again", "date": "2024-03-01",
                  "categories": ["Rust"], "series": "Intro" }
            ],
            "experiences": [
                { "slug": "acme", "title": "Engineer", "company": "Acme" }
            ]
        });
        tokio::fs::write(dir.join("corpus.json"), serde_json::to_vec_pretty(&corpus)?).await?;
        tokio::fs::create_dir_all(dir.join("posts")).await?;
        tokio::fs::write(
            dir.join("posts").join("hello.md"),
            "# Hello\n\n## Setup\n\n## Setup\n",
        )
        .await?;
        Ok(())
    }

    async fn open_site(dir: &Path) -> Result<SiteService> {
        let config = EngineConfig::default();
        let persistence = Arc::new(JsonFilePersistence::new(dir));
        let pipeline = Arc::new(MutationPipeline::load(persistence, config.clone()).await?);
        let corpus = StaticCorpus::load_dir(dir).await?;
        let resolver = ViewResolver::new(Arc::new(PulldownRenderer::new()), Arc::new(corpus), &config);
        Ok(SiteService::new(pipeline, resolver))
    }

    fn view(path: &str, title: &str) -> NewView {
        NewView {
            path: path.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_site_survives_reload() -> Result<()> {
        let temp_dir = TempDir::new()?;
        write_corpus(temp_dir.path()).await?;

        let site = open_site(temp_dir.path()).await?;
        let pipeline = site.pipeline();

        let home = pipeline.create_view(view("/", "Home")).await?;
        let post_view = pipeline.create_view(view("/posts/hello", "Hello")).await?;
        pipeline.set_default_home("/").await?;

        pipeline
            .create_node(CreateNodeParams::new(
                home.root_node_id.clone(),
                NodeKind::TagList,
                json!({}),
            ))
            .await?;
        pipeline
            .create_node(CreateNodeParams::new(
                home.root_node_id.clone(),
                NodeKind::ViewLink,
                json!({ "targetPath": "/posts/hello" }),
            ))
            .await?;
        pipeline
            .create_node(CreateNodeParams::new(
                post_view.root_node_id.clone(),
                NodeKind::Post,
                json!({ "slug": "hello" }),
            ))
            .await?;

        let resolved_home = site.get_resolved_view_by_path("/").expect("home resolves");
        match &resolved_home.root.children[0].derived {
            Some(DerivedContent::Tags { tags }) => assert_eq!(
                tags,
                &vec![
                    TagCount { tag: "go".to_string(), count: 2 },
                    TagCount { tag: "rust".to_string(), count: 1 },
                ]
            ),
            other => panic!("unexpected derived content {:?}", other),
        }

        let resolved_post = site
            .get_resolved_view_by_path("/posts/hello/")
            .expect("post resolves");
        match &resolved_post.root.children[0].derived {
            Some(DerivedContent::Post { toc, series, html, .. }) => {
                let anchors: Vec<&str> = toc.iter().map(|e| e.anchor.as_str()).collect();
                assert_eq!(anchors, vec!["hello", "setup", "setup-1"]);
                assert!(html.as_deref().unwrap_or_default().contains(r#"id="setup-1""#));
                let series = series.as_ref().expect("series navigation");
                assert_eq!((series.position, series.total), (1, 2));
                assert_eq!(series.next.as_ref().map(|n| n.slug.as_str()), Some("again"));
            }
            other => panic!("unexpected derived content {:?}", other),
        }

        // A second process sees the same site
        let reopened = open_site(temp_dir.path()).await?;
        assert_eq!(reopened.list_view_paths(), vec!["/", "/posts/hello"]);
        assert_eq!(reopened.default_home_path().as_deref(), Some("/"));
        assert_eq!(reopened.get_resolved_view_by_path("/"), Some(resolved_home));
        assert_eq!(
            reopened.get_resolved_view_by_path("/posts/hello"),
            Some(resolved_post)
        );
        assert!(reopened.integrity_report().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_paths_resolve_to_none() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let site = open_site(temp_dir.path()).await?;
        site.pipeline().create_view(view("/blog", "Blog")).await?;

        assert!(site.get_resolved_view_by_path("/blog/extra").is_none());
        assert!(site.get_resolved_view_by_path("/").is_none());
        assert!(site.resolve_view_by_path("/blog/").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_resolution_reads_pre_commit_snapshot() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let site = open_site(temp_dir.path()).await?;
        let home = site.pipeline().create_view(view("/", "Home")).await?;

        let before = site.pipeline().snapshot();
        site.pipeline()
            .create_node(CreateNodeParams::new(
                home.root_node_id.clone(),
                NodeKind::Title,
                json!({ "text": "New" }),
            ))
            .await?;

        let old = site.resolver().get_resolved_view_by_path("/", &before);
        let new = site.get_resolved_view_by_path("/");
        assert_eq!(old.map(|v| v.root.children.len()), Some(0));
        assert_eq!(new.map(|v| v.root.children.len()), Some(1));
        Ok(())
    }
}
