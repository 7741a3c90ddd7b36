//! Persistence collaborator for the views configuration
//!
//! The engine stores one JSON document per namespace. This module defines the
//! async seam ([`ViewsPersistence`]) and two implementations:
//!
//! - [`MemoryPersistence`] keeps documents in memory and can inject failures,
//!   which is how rollback behaviour is tested
//! - [`RetryingPersistence`] wraps any backend with bounded retry and exponential
//!   backoff for transient failures
//!
//! The file-backed implementation lives in `json_file_store`.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use super::error::PersistenceError;

/// Namespace under which the views configuration is stored
pub const VIEWS_NAMESPACE: &str = "views";

/// Async key-value persistence for whole JSON documents
///
/// Implementations must make `put` atomic per namespace: a failed `put` leaves the
/// previously stored document readable.
#[async_trait]
pub trait ViewsPersistence: Send + Sync {
    /// Read the document stored under `namespace`, `None` if never written
    async fn get(&self, namespace: &str) -> Result<Option<Value>, PersistenceError>;

    /// Replace the document stored under `namespace`
    async fn put(&self, namespace: &str, document: Value) -> Result<(), PersistenceError>;
}

/// In-memory persistence with failure injection
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    documents: RwLock<HashMap<String, Value>>,
    failing_puts: AtomicUsize,
    put_count: AtomicUsize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a namespace
    pub fn with_document(namespace: &str, document: Value) -> Self {
        let mut documents = HashMap::new();
        documents.insert(namespace.to_string(), document);
        Self {
            documents: RwLock::new(documents),
            ..Self::default()
        }
    }

    /// Make the next `n` calls to `put` fail with a backend error
    pub fn fail_next_puts(&self, n: usize) {
        self.failing_puts.store(n, Ordering::SeqCst);
    }

    /// Number of `put` calls received, failed ones included
    pub fn put_count(&self) -> usize {
        self.put_count.load(Ordering::SeqCst)
    }

    /// Current document for a namespace
    pub async fn document(&self, namespace: &str) -> Option<Value> {
        self.documents.read().await.get(namespace).cloned()
    }
}

#[async_trait]
impl ViewsPersistence for MemoryPersistence {
    async fn get(&self, namespace: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.document(namespace).await)
    }

    async fn put(&self, namespace: &str, document: Value) -> Result<(), PersistenceError> {
        self.put_count.fetch_add(1, Ordering::SeqCst);

        let injected = self
            .failing_puts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(PersistenceError::backend(format!(
                "injected failure writing '{}'",
                namespace
            )));
        }

        self.documents
            .write()
            .await
            .insert(namespace.to_string(), document);
        Ok(())
    }
}

/// Retry wrapper with exponential backoff (10ms, 20ms, 40ms, ...)
///
/// Only transient errors are retried; serialization errors fail immediately.
#[derive(Debug)]
pub struct RetryingPersistence<P> {
    inner: P,
    max_retries: u32,
    base_delay: Duration,
}

impl<P: ViewsPersistence> RetryingPersistence<P> {
    /// Wrap `inner`; `max_retries` of 0 means a single attempt
    pub fn new(inner: P, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            base_delay: Duration::from_millis(10),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * (1u32 << attempt.min(16))
    }
}

#[async_trait]
impl<P: ViewsPersistence> ViewsPersistence for RetryingPersistence<P> {
    async fn get(&self, namespace: &str) -> Result<Option<Value>, PersistenceError> {
        let mut attempt = 0;
        loop {
            match self.inner.get(namespace).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    tracing::warn!(
                        "Read of '{}' failed on attempt {}/{}: {}. Retrying...",
                        namespace,
                        attempt + 1,
                        self.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn put(&self, namespace: &str, document: Value) -> Result<(), PersistenceError> {
        let mut attempt = 0;
        loop {
            match self.inner.put(namespace, document.clone()).await {
                Ok(()) => {
                    if attempt > 0 {
                        tracing::debug!(
                            "Write of '{}' succeeded after {} retry(ies)",
                            namespace,
                            attempt
                        );
                    }
                    return Ok(());
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    tracing::warn!(
                        "Write of '{}' failed on attempt {}/{}: {}. Retrying...",
                        namespace,
                        attempt + 1,
                        self.max_retries + 1,
                        e
                    );
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
                Err(e) => {
                    if attempt > 0 {
                        tracing::warn!(
                            "Giving up on write of '{}' after {} attempt(s): {}",
                            namespace,
                            attempt + 1,
                            e
                        );
                    }
                    return Err(e);
                }
            }
        }
    }
}
