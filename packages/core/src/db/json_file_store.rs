//! File-backed persistence: one pretty-printed JSON document per namespace
//!
//! Documents live at `<root>/<namespace>.json`. Writes go to a sibling temp file
//! which is then renamed over the target, so readers never see a partial write.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::PersistenceError;
use super::persistence::ViewsPersistence;

#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    root: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, namespace: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::backend(format!(
                "invalid namespace '{}'",
                namespace
            )));
        }
        Ok(self.root.join(format!("{}.json", namespace)))
    }
}

#[async_trait]
impl ViewsPersistence for JsonFilePersistence {
    async fn get(&self, namespace: &str) -> Result<Option<Value>, PersistenceError> {
        let path = self.document_path(namespace)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PersistenceError::io(namespace, e)),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn put(&self, namespace: &str, document: Value) -> Result<(), PersistenceError> {
        let path = self.document_path(namespace)?;
        let tmp_path = self.root.join(format!(".{}.json.tmp", namespace));
        let mut bytes = serde_json::to_vec_pretty(&document)?;
        bytes.push(b'\n');

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PersistenceError::io(namespace, e))?;
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| PersistenceError::io(namespace, e))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| PersistenceError::io(namespace, e))?;

        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
