//! Mutation Pipeline - validated, persisted, atomic changes to the views config
//!
//! Every mutation follows the same path:
//!
//! 1. Reject immediately in publish mode (`ReadOnly`)
//! 2. Take the single writer lock
//! 3. Clone the committed snapshot into a working copy and apply the change
//! 4. Persist the whole working copy under namespace `views`, bounded by the
//!    configured timeout
//! 5. On success swap the working copy in and broadcast domain events; on any
//!    failure drop the working copy so the committed snapshot is untouched
//!
//! Readers call [`MutationPipeline::snapshot`] and work on the returned `Arc`
//! without holding any lock, so a read that started before a commit keeps seeing
//! the pre-commit tree.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use super::error::ViewServiceError;
use crate::config::EngineConfig;
use crate::db::{
    DomainEvent, IntegrityIssue, PersistenceError, ViewsConfig, ViewsPersistence, VIEWS_NAMESPACE,
};
use crate::models::{NewView, Node, NodeId, View, ViewPatch, ViewsDocument};
use crate::operations::CreateNodeParams;

pub struct MutationPipeline {
    state: RwLock<Arc<ViewsConfig>>,
    write_lock: Mutex<()>,
    persistence: Arc<dyn ViewsPersistence>,
    event_tx: broadcast::Sender<DomainEvent>,
    config: EngineConfig,
}

impl MutationPipeline {
    /// Create a pipeline over an empty views config
    pub fn new(persistence: Arc<dyn ViewsPersistence>, config: EngineConfig) -> Self {
        Self::with_snapshot(persistence, ViewsConfig::new(), config)
    }

    /// Create a pipeline over an existing views config (not re-persisted)
    ///
    /// The config's depth limit is set to `max_resolution_depth` so every
    /// accepted mutation stays resolvable.
    pub fn with_snapshot(
        persistence: Arc<dyn ViewsPersistence>,
        views: ViewsConfig,
        config: EngineConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        let views = views.with_max_depth(config.max_resolution_depth);
        Self {
            state: RwLock::new(Arc::new(views)),
            write_lock: Mutex::new(()),
            persistence,
            event_tx,
            config,
        }
    }

    /// Load the views config from persistence
    ///
    /// A namespace that was never written yields an empty config. Integrity
    /// findings are logged, not fatal: the affected views fail to resolve until
    /// repaired.
    pub async fn load(
        persistence: Arc<dyn ViewsPersistence>,
        config: EngineConfig,
    ) -> Result<Self, ViewServiceError> {
        let views = match persistence.get(VIEWS_NAMESPACE).await? {
            Some(raw) => {
                let document: ViewsDocument =
                    serde_json::from_value(raw).map_err(PersistenceError::from)?;
                ViewsConfig::from_document(document)?
            }
            None => {
                info!("No stored views config, starting empty");
                ViewsConfig::new()
            }
        };

        for issue in views.integrity_report() {
            if issue.is_blocking() {
                error!("Integrity violation in stored views: {}", issue);
            } else {
                warn!("Integrity finding in stored views: {}", issue);
            }
        }

        info!(
            "Loaded {} views and {} nodes",
            views.view_paths().len(),
            views.nodes().len()
        );
        Ok(Self::with_snapshot(persistence, views, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The committed snapshot
    pub fn snapshot(&self) -> Arc<ViewsConfig> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to domain events
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use viewtree_core::{EngineConfig, MemoryPersistence, MutationPipeline};
    /// # let pipeline = MutationPipeline::new(Arc::new(MemoryPersistence::new()), EngineConfig::default());
    /// let mut rx = pipeline.subscribe_to_events();
    /// tokio::spawn(async move {
    ///     while let Ok(event) = rx.recv().await {
    ///         println!("{}", event.event_type());
    ///     }
    /// });
    /// ```
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: DomainEvent) {
        let _ = self.event_tx.send(event);
    }

    fn publish(&self, views: ViewsConfig) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(views);
    }

    /// Apply `apply` to a working copy, persist it and publish it
    async fn commit<T, F>(&self, operation: &str, apply: F) -> Result<T, ViewServiceError>
    where
        F: FnOnce(&mut ViewsConfig) -> Result<(T, Vec<DomainEvent>), ViewServiceError> + Send,
        T: Send,
    {
        if self.config.is_read_only() {
            debug!("Rejected {} in publish mode", operation);
            return Err(ViewServiceError::ReadOnly);
        }

        let _guard = self.write_lock.lock().await;
        let mut working = ViewsConfig::clone(&self.snapshot());

        let (value, events) = match apply(&mut working) {
            Ok(result) => result,
            Err(e) => {
                debug!("Rejected {}: {}", operation, e);
                return Err(e);
            }
        };

        let document = serde_json::to_value(working.to_document()).map_err(PersistenceError::from)?;
        let timeout = self.config.persist_timeout();
        let persisted =
            match tokio::time::timeout(timeout, self.persistence.put(VIEWS_NAMESPACE, document))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(PersistenceError::Timeout(timeout)),
            };
        if let Err(e) = persisted {
            warn!("Rolled back {}: {}", operation, e);
            return Err(e.into());
        }

        self.publish(working);
        info!("Committed {}", operation);
        for event in events {
            self.emit_event(event);
        }
        Ok(value)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn get_node(&self, id: &str) -> Option<Node> {
        self.snapshot().node(id).cloned()
    }

    /// Ordered children of a node
    pub fn get_children(&self, id: &str) -> Result<Vec<Node>, ViewServiceError> {
        let snapshot = self.snapshot();
        let children = snapshot.nodes().get_children(id)?;
        Ok(children.into_iter().cloned().collect())
    }

    pub fn integrity_report(&self) -> Vec<IntegrityIssue> {
        self.snapshot().integrity_report()
    }

    // ========================================================================
    // Node mutations
    // ========================================================================

    /// Create a node under an existing parent
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the config does not fit the node type
    /// - `InvalidParent` if the parent is missing or cannot hold children
    /// - `PersistenceFailure` if the commit could not be stored
    pub async fn create_node(&self, params: CreateNodeParams) -> Result<Node, ViewServiceError> {
        let config = params.parse_config()?;
        self.commit("create_node", move |views| {
            let node = views.create_node(NodeId::generate(), &params.parent_id, config, params.index)?;
            Ok((
                node.clone(),
                vec![DomainEvent::NodeCreated { node }],
            ))
        })
        .await
    }

    /// Shallow-merge `patch` into a node's config; the type cannot change
    pub async fn update_config(&self, id: &str, patch: Value) -> Result<Node, ViewServiceError> {
        self.commit("update_config", |views| {
            let node = views.update_config(id, &patch)?;
            Ok((node.clone(), vec![DomainEvent::NodeUpdated { node }]))
        })
        .await
    }

    /// Move a node under `new_parent_id` at `index` (append when `None`)
    ///
    /// # Errors
    ///
    /// - `CycleDetected` if the new parent is the node or one of its descendants
    /// - `ValidationError` if the node is a view root
    pub async fn move_node(
        &self,
        id: &str,
        new_parent_id: &NodeId,
        index: Option<usize>,
    ) -> Result<Node, ViewServiceError> {
        self.commit("move_node", |views| {
            let previous_parent_id = views
                .node(id)
                .ok_or_else(|| ViewServiceError::node_not_found(id))?
                .parent_id
                .clone();
            let node = views.move_node(id, new_parent_id, index)?;
            Ok((
                node.clone(),
                vec![DomainEvent::NodeMoved {
                    node,
                    previous_parent_id,
                }],
            ))
        })
        .await
    }

    /// Delete a node; with `cascade` its whole subtree goes with it
    ///
    /// Returns the removed ids in pre-order.
    pub async fn delete_node(&self, id: &str, cascade: bool) -> Result<Vec<NodeId>, ViewServiceError> {
        self.commit("delete_node", |views| {
            let ids = views.delete_node(id, cascade)?;
            Ok((ids.clone(), vec![DomainEvent::NodesDeleted { ids }]))
        })
        .await
    }

    // ========================================================================
    // View mutations
    // ========================================================================

    /// Register a view, creating its root node unless one is given
    pub async fn create_view(&self, new: NewView) -> Result<View, ViewServiceError> {
        self.commit("create_view", move |views| {
            let (view, root) = views.create_view(new, NodeId::generate())?;
            let mut events = Vec::with_capacity(2);
            if let Some(node) = root {
                events.push(DomainEvent::NodeCreated { node });
            }
            events.push(DomainEvent::ViewCreated { view: view.clone() });
            Ok((view, events))
        })
        .await
    }

    pub async fn update_view(&self, path: &str, patch: ViewPatch) -> Result<View, ViewServiceError> {
        self.commit("update_view", move |views| {
            let home_before = views.default_home_path().map(str::to_string);
            let previous_path = views
                .view(path)
                .map(|v| v.path.clone())
                .ok_or_else(|| ViewServiceError::view_not_found(path))?;

            let view = views.update_view(path, patch)?;
            let mut events = vec![DomainEvent::ViewUpdated {
                previous_path,
                view: view.clone(),
            }];
            if views.default_home_path() != home_before.as_deref() {
                events.push(DomainEvent::DefaultHomeChanged {
                    path: views.default_home_path().map(str::to_string),
                });
            }
            Ok((view, events))
        })
        .await
    }

    /// Remove a view; its nodes stay and show up as an orphaned subtree
    pub async fn delete_view(&self, path: &str) -> Result<View, ViewServiceError> {
        self.commit("delete_view", |views| {
            let home_before = views.default_home_path().map(str::to_string);
            let view = views.delete_view(path)?;
            let mut events = vec![DomainEvent::ViewDeleted { view: view.clone() }];
            if views.default_home_path() != home_before.as_deref() {
                events.push(DomainEvent::DefaultHomeChanged {
                    path: views.default_home_path().map(str::to_string),
                });
            }
            Ok((view, events))
        })
        .await
    }

    /// Make an existing view the default home
    pub async fn set_default_home(&self, path: &str) -> Result<String, ViewServiceError> {
        self.commit("set_default_home", |views| {
            let path = views.set_default_home(path)?;
            Ok((
                path.clone(),
                vec![DomainEvent::DefaultHomeChanged { path: Some(path) }],
            ))
        })
        .await
    }
}

#[cfg(test)]
#[path = "mutation_pipeline_test.rs"]
mod mutation_pipeline_test;
