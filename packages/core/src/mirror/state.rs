//! StoreMirror - optimistic local copy of the views config
//!
//! The mirror keeps two states:
//!
//! - **confirmed**: the last authoritative snapshot received from the server
//! - **visible**: confirmed plus every pending command replayed in order
//!
//! Commands apply to `visible` immediately and wait in a queue keyed by
//! [`MutationId`]. Each [`Reconciliation`] swaps in the new authoritative base,
//! learns the server id behind any provisional id, rewrites the queue with it
//! and rebuilds `visible` from scratch.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::command::{MirrorCommand, MirrorEvent, MutationId, Reconciliation};
use crate::config::EngineConfig;
use crate::db::ViewsConfig;
use crate::models::{normalize_path, Node, NodeId, ResolvedNode, View};
use crate::services::{expand_tree, ViewServiceError};

pub struct StoreMirror {
    confirmed: Arc<ViewsConfig>,
    visible: ViewsConfig,
    pending: BTreeMap<MutationId, MirrorCommand>,
    id_remap: HashMap<NodeId, NodeId>,
    next_mutation: u64,
    max_depth: usize,
    event_tx: broadcast::Sender<MirrorEvent>,
}

impl StoreMirror {
    pub fn new(snapshot: Arc<ViewsConfig>, config: &EngineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            visible: ViewsConfig::clone(&snapshot).with_max_depth(config.max_resolution_depth),
            confirmed: snapshot,
            pending: BTreeMap::new(),
            id_remap: HashMap::new(),
            next_mutation: 1,
            max_depth: config.max_resolution_depth,
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MirrorEvent> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: MirrorEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Apply a command optimistically and queue it
    ///
    /// A command that does not apply locally is rejected right away and never
    /// queued. References to provisional ids the server already replaced are
    /// rewritten first.
    pub fn dispatch(&mut self, mut command: MirrorCommand) -> Result<MutationId, ViewServiceError> {
        command.remap_ids(&self.id_remap);
        command.apply(&mut self.visible)?;

        let mutation_id = MutationId::new(self.next_mutation);
        self.next_mutation += 1;
        debug!("Applied {} optimistically as {}", command.name(), mutation_id);
        self.pending.insert(mutation_id, command);
        self.emit_event(MirrorEvent::Applied { mutation_id });
        Ok(mutation_id)
    }

    /// The queued command, as it will be sent to the server
    pub fn pending_command(&self, mutation_id: MutationId) -> Option<&MirrorCommand> {
        self.pending.get(&mutation_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, mutation_id: MutationId) -> bool {
        self.pending.contains_key(&mutation_id)
    }

    /// Fold the server's answer into the mirror
    pub fn reconcile(&mut self, reconciliation: Reconciliation) {
        let Reconciliation {
            mutation_id,
            outcome,
            authoritative,
        } = reconciliation;

        let command = self.pending.remove(&mutation_id);
        if command.is_none() {
            warn!("Reconciliation for unknown mutation {}", mutation_id);
        }
        self.confirmed = authoritative;

        match outcome {
            Ok(committed) => {
                let mapping = command.as_ref().and_then(|c| c.id_mapping(&committed));
                if let Some((provisional, server)) = &mapping {
                    debug!("Provisional id {} is now {}", provisional, server);
                    self.id_remap.insert(provisional.clone(), server.clone());
                    for pending in self.pending.values_mut() {
                        pending.remap_ids(&self.id_remap);
                    }
                }
                let (provisional_id, server_id) = mapping.unzip();
                self.emit_event(MirrorEvent::Confirmed {
                    mutation_id,
                    provisional_id,
                    server_id,
                });
            }
            Err(e) => {
                warn!("Mutation {} rejected by server: {}", mutation_id, e);
                self.emit_event(MirrorEvent::Rejected {
                    mutation_id,
                    code: e.code().to_string(),
                    message: e.to_string(),
                });
            }
        }

        self.rebuild();
    }

    fn rebuild(&mut self) {
        let mut visible = ViewsConfig::clone(&self.confirmed).with_max_depth(self.max_depth);
        for (mutation_id, command) in &self.pending {
            if let Err(e) = command.apply(&mut visible) {
                debug!("Pending {} no longer applies: {}", mutation_id, e);
                self.emit_event(MirrorEvent::ReplaySkipped {
                    mutation_id: *mutation_id,
                    message: e.to_string(),
                });
            }
        }
        self.visible = visible;
    }

    /// Server id for `id` once known, otherwise `id` itself
    pub fn canonical_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.id_remap.get(id).map(NodeId::as_str).unwrap_or(id)
    }

    // ========================================================================
    // Selectors
    // ========================================================================

    pub fn confirmed(&self) -> &Arc<ViewsConfig> {
        &self.confirmed
    }

    pub fn visible(&self) -> &ViewsConfig {
        &self.visible
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.visible.node(self.canonical_id(id))
    }

    /// Ordered children; empty for unknown ids
    pub fn children_of(&self, id: &str) -> Vec<&Node> {
        self.visible
            .nodes()
            .get_children(self.canonical_id(id))
            .unwrap_or_default()
    }

    pub fn view(&self, path: &str) -> Option<&View> {
        self.visible.view(&normalize_path(path))
    }

    pub fn view_paths(&self) -> Vec<String> {
        self.visible.view_paths()
    }

    /// Structural tree of the view at `path`, without derived content
    pub fn resolved_tree(&self, path: &str) -> Option<ResolvedNode> {
        let view = self.view(path)?;
        match expand_tree(&self.visible, &view.root_node_id, self.max_depth, |_| None) {
            Ok(tree) => Some(tree),
            Err(e) => {
                debug!("Mirror cannot expand {}: {}", view.path, e);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;
