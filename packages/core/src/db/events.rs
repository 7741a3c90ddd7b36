//! Domain Events for the views configuration
//!
//! The mutation pipeline emits one or more of these after every committed
//! mutation, on a tokio broadcast channel. Subscribers (the author server's SSE
//! stream, tests, caches) observe changes without coupling to the pipeline.
//!
//! # Event Flow
//!
//! 1. A mutation is validated against a working copy and persisted
//! 2. The working copy becomes the committed snapshot
//! 3. The events describing the change are broadcast
//! 4. Failed mutations emit nothing

use serde::{Deserialize, Serialize};

use crate::models::{Node, NodeId, View};

/// Domain events emitted by the mutation pipeline
///
/// Serialized internally tagged: `{"type":"nodeCreated","node":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DomainEvent {
    /// A node was created (including view roots created with their view)
    NodeCreated { node: Node },

    /// A node's config changed
    NodeUpdated { node: Node },

    /// A node changed parent or position
    NodeMoved {
        node: Node,
        previous_parent_id: Option<NodeId>,
    },

    /// A node and its subtree were removed, ids in pre-order
    NodesDeleted { ids: Vec<NodeId> },

    ViewCreated { view: View },

    /// A view's metadata or path changed
    ViewUpdated { previous_path: String, view: View },

    ViewDeleted { view: View },

    DefaultHomeChanged { path: Option<String> },
}

impl DomainEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::NodeCreated { .. } => "node:created",
            DomainEvent::NodeUpdated { .. } => "node:updated",
            DomainEvent::NodeMoved { .. } => "node:moved",
            DomainEvent::NodesDeleted { .. } => "node:deleted",
            DomainEvent::ViewCreated { .. } => "view:created",
            DomainEvent::ViewUpdated { .. } => "view:updated",
            DomainEvent::ViewDeleted { .. } => "view:deleted",
            DomainEvent::DefaultHomeChanged { .. } => "view:home",
        }
    }
}
