//! Content corpus collaborator
//!
//! Posts, experiences and post bodies are owned outside the engine. The resolver
//! reads them through [`ContentCorpus`]; [`StaticCorpus`] is an in-memory
//! implementation that can also be loaded from a content directory:
//!
//! ```text
//! <dir>/corpus.json        {"posts": [...], "experiences": [...]}
//! <dir>/posts/<slug>.md    post bodies
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use crate::db::PersistenceError;
use crate::models::{ExperienceRecord, PostRecord};

pub trait ContentCorpus: Send + Sync {
    /// Post metadata in corpus order
    fn posts(&self) -> &[PostRecord];

    /// Experiences in display order
    fn experiences(&self) -> &[ExperienceRecord];

    /// Markdown body of a post
    fn post_body(&self, slug: &str) -> Option<&str>;

    fn post(&self, slug: &str) -> Option<&PostRecord> {
        self.posts().iter().find(|p| p.slug == slug)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCorpus {
    posts: Vec<PostRecord>,
    experiences: Vec<ExperienceRecord>,
    bodies: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CorpusIndex {
    posts: Vec<PostRecord>,
    experiences: Vec<ExperienceRecord>,
}

impl StaticCorpus {
    pub fn new(posts: Vec<PostRecord>, experiences: Vec<ExperienceRecord>) -> Self {
        Self {
            posts,
            experiences,
            bodies: HashMap::new(),
        }
    }

    pub fn with_body(mut self, slug: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(slug.into(), body.into());
        self
    }

    /// Load a corpus from a content directory
    ///
    /// A missing `corpus.json` yields an empty corpus; a missing post body is
    /// skipped with a warning.
    pub async fn load_dir(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref();
        let index: CorpusIndex = match tokio::fs::read(dir.join("corpus.json")).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No corpus.json in {}, starting empty", dir.display());
                CorpusIndex::default()
            }
            Err(e) => return Err(PersistenceError::io("corpus", e)),
        };

        let mut bodies = HashMap::new();
        for post in &index.posts {
            let path = dir.join("posts").join(format!("{}.md", post.slug));
            match tokio::fs::read_to_string(&path).await {
                Ok(body) => {
                    bodies.insert(post.slug.clone(), body);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!("Post '{}' has no body at {}", post.slug, path.display());
                }
                Err(e) => return Err(PersistenceError::io("corpus", e)),
            }
        }

        tracing::info!(
            "Loaded corpus: {} posts, {} experiences",
            index.posts.len(),
            index.experiences.len()
        );
        Ok(Self {
            posts: index.posts,
            experiences: index.experiences,
            bodies,
        })
    }
}

impl ContentCorpus for StaticCorpus {
    fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    fn experiences(&self) -> &[ExperienceRecord] {
        &self.experiences
    }

    fn post_body(&self, slug: &str) -> Option<&str> {
        self.bodies.get(slug).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_dir_reads_index_and_bodies() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("posts")).unwrap();
        std::fs::write(
            dir.path().join("corpus.json"),
            r#"{
                "posts": [
                    {"slug": "hello", "title": "Hello", "date": "2024-05-01", "categories": "intro, meta"},
                    {"slug": "draft", "title": "Draft", "date": "2024-06-01"}
                ],
                "experiences": [{"slug": "acme", "title": "Engineer"}]
            }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("posts/hello.md"), "# Hello\n").unwrap();

        let corpus = StaticCorpus::load_dir(dir.path()).await.unwrap();
        assert_eq!(corpus.posts().len(), 2);
        assert_eq!(corpus.experiences().len(), 1);
        assert_eq!(corpus.post_body("hello"), Some("# Hello\n"));
        assert_eq!(corpus.post_body("draft"), None);
        assert_eq!(corpus.post("hello").unwrap().categories, vec!["intro", "meta"]);
    }

    #[tokio::test]
    async fn test_load_empty_dir() {
        let dir = TempDir::new().unwrap();
        let corpus = StaticCorpus::load_dir(dir.path()).await.unwrap();
        assert!(corpus.posts().is_empty());
    }
}
