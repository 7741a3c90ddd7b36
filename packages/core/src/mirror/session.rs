//! MirrorSession - wires a StoreMirror to a MutationPipeline
//!
//! Local commands apply to the mirror at once, then a background worker commits
//! them through the pipeline one at a time in submission order. Each commit
//! produces a [`Reconciliation`] sent back over an mpsc channel; the session
//! folds those into the mirror when asked to (`pump`, `next_reconciliation`,
//! `settle`).
//!
//! The worker stops when the session is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use super::command::{MirrorCommand, MirrorEvent, MutationId, Reconciliation};
use super::state::StoreMirror;
use crate::models::NodeId;
use crate::services::{MutationPipeline, ViewServiceError};

pub struct MirrorSession {
    mirror: StoreMirror,
    command_tx: mpsc::UnboundedSender<(MutationId, MirrorCommand)>,
    reconciliation_rx: mpsc::UnboundedReceiver<Reconciliation>,
}

impl MirrorSession {
    /// Start a session on the pipeline's current snapshot
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(pipeline: Arc<MutationPipeline>) -> Self {
        let mirror = StoreMirror::new(pipeline.snapshot(), pipeline.config());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (reconciliation_tx, reconciliation_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_worker(pipeline, command_rx, reconciliation_tx));
        info!("Mirror session started");

        Self {
            mirror,
            command_tx,
            reconciliation_rx,
        }
    }

    pub fn mirror(&self) -> &StoreMirror {
        &self.mirror
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MirrorEvent> {
        self.mirror.subscribe()
    }

    /// Apply a command locally and hand it to the commit worker
    pub fn submit(&mut self, command: MirrorCommand) -> Result<MutationId, ViewServiceError> {
        self.pump();
        let mutation_id = self.mirror.dispatch(command)?;
        let queued = self
            .mirror
            .pending_command(mutation_id)
            .cloned()
            .ok_or_else(|| ViewServiceError::integrity(format!("mutation {} vanished", mutation_id)))?;

        if self.command_tx.send((mutation_id, queued)).is_err() {
            warn!("Mirror commit worker has stopped; {} stays pending", mutation_id);
        }
        Ok(mutation_id)
    }

    /// Fold every reconciliation that already arrived; returns how many
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(reconciliation) = self.reconciliation_rx.try_recv() {
            self.mirror.reconcile(reconciliation);
            applied += 1;
        }
        applied
    }

    /// Wait for the next reconciliation and fold it
    pub async fn next_reconciliation(&mut self) -> Option<MutationId> {
        let reconciliation = self.reconciliation_rx.recv().await?;
        let mutation_id = reconciliation.mutation_id;
        self.mirror.reconcile(reconciliation);
        Some(mutation_id)
    }

    /// Wait until no command is pending
    pub async fn settle(&mut self) {
        while self.mirror.pending_count() > 0 {
            if self.next_reconciliation().await.is_none() {
                warn!(
                    "Mirror commit worker stopped with {} pending commands",
                    self.mirror.pending_count()
                );
                break;
            }
        }
    }
}

async fn run_worker(
    pipeline: Arc<MutationPipeline>,
    mut commands: mpsc::UnboundedReceiver<(MutationId, MirrorCommand)>,
    reconciliations: mpsc::UnboundedSender<Reconciliation>,
) {
    // Server ids of nodes created by earlier commands in this session
    let mut remap: HashMap<NodeId, NodeId> = HashMap::new();

    while let Some((mutation_id, mut command)) = commands.recv().await {
        command.remap_ids(&remap);
        let outcome = command.commit(&pipeline).await;
        match &outcome {
            Ok(committed) => {
                if let Some((provisional, server)) = command.id_mapping(committed) {
                    remap.insert(provisional, server);
                }
                debug!("Committed {} ({})", mutation_id, command.name());
            }
            Err(e) => debug!("Commit of {} failed: {}", mutation_id, e),
        }

        let reconciliation = Reconciliation {
            mutation_id,
            outcome,
            authoritative: pipeline.snapshot(),
        };
        if reconciliations.send(reconciliation).is_err() {
            break;
        }
    }
    info!("Mirror commit worker shutting down");
}
