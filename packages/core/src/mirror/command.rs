//! Mirror commands and reconciliation messages

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::db::ViewsConfig;
use crate::models::{NewView, Node, NodeId, View, ViewPatch};
use crate::operations::{CreateNodeParams, MoveNodeParams};
use crate::services::{MutationPipeline, ViewServiceError};

/// Identifies one optimistic mutation within a mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MutationId(u64);

impl MutationId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// A local mutation, applied optimistically and later committed
///
/// Commands that create nodes carry the provisional id the node is shown
/// under until the server assigns the real one.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorCommand {
    CreateNode {
        provisional_id: NodeId,
        params: CreateNodeParams,
    },
    UpdateConfig {
        id: NodeId,
        patch: Value,
    },
    MoveNode {
        id: NodeId,
        params: MoveNodeParams,
    },
    DeleteNode {
        id: NodeId,
        cascade: bool,
    },
    CreateView {
        provisional_root_id: NodeId,
        new: NewView,
    },
    UpdateView {
        path: String,
        patch: ViewPatch,
    },
    DeleteView {
        path: String,
    },
    SetDefaultHome {
        path: String,
    },
}

/// What the server committed for a command
#[derive(Debug, Clone, PartialEq)]
pub enum Committed {
    Node(Node),
    Deleted(Vec<NodeId>),
    View(View),
    Home(String),
}

/// The server's answer to one command
#[derive(Debug)]
pub struct Reconciliation {
    pub mutation_id: MutationId,
    pub outcome: Result<Committed, ViewServiceError>,
    /// Committed snapshot right after the command was handled
    pub authoritative: Arc<ViewsConfig>,
}

/// Notifications for mirror subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MirrorEvent {
    Applied {
        mutation_id: MutationId,
    },
    Confirmed {
        mutation_id: MutationId,
        provisional_id: Option<NodeId>,
        server_id: Option<NodeId>,
    },
    Rejected {
        mutation_id: MutationId,
        code: String,
        message: String,
    },
    /// A pending command no longer applies on top of the new base
    ReplaySkipped {
        mutation_id: MutationId,
        message: String,
    },
}

impl MirrorCommand {
    pub fn create_node(params: CreateNodeParams) -> Self {
        MirrorCommand::CreateNode {
            provisional_id: NodeId::provisional(),
            params,
        }
    }

    pub fn update_config(id: impl Into<NodeId>, patch: Value) -> Self {
        MirrorCommand::UpdateConfig {
            id: id.into(),
            patch,
        }
    }

    pub fn move_node(id: impl Into<NodeId>, new_parent_id: impl Into<NodeId>, index: Option<usize>) -> Self {
        MirrorCommand::MoveNode {
            id: id.into(),
            params: MoveNodeParams {
                new_parent_id: new_parent_id.into(),
                index,
            },
        }
    }

    pub fn delete_node(id: impl Into<NodeId>, cascade: bool) -> Self {
        MirrorCommand::DeleteNode {
            id: id.into(),
            cascade,
        }
    }

    pub fn create_view(new: NewView) -> Self {
        MirrorCommand::CreateView {
            provisional_root_id: NodeId::provisional(),
            new,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MirrorCommand::CreateNode { .. } => "create_node",
            MirrorCommand::UpdateConfig { .. } => "update_config",
            MirrorCommand::MoveNode { .. } => "move_node",
            MirrorCommand::DeleteNode { .. } => "delete_node",
            MirrorCommand::CreateView { .. } => "create_view",
            MirrorCommand::UpdateView { .. } => "update_view",
            MirrorCommand::DeleteView { .. } => "delete_view",
            MirrorCommand::SetDefaultHome { .. } => "set_default_home",
        }
    }

    /// Apply to a local copy, using provisional ids for new nodes
    pub(crate) fn apply(&self, views: &mut ViewsConfig) -> Result<(), ViewServiceError> {
        match self {
            MirrorCommand::CreateNode {
                provisional_id,
                params,
            } => {
                let config = params.parse_config()?;
                views.create_node(provisional_id.clone(), &params.parent_id, config, params.index)?;
            }
            MirrorCommand::UpdateConfig { id, patch } => {
                views.update_config(id.as_str(), patch)?;
            }
            MirrorCommand::MoveNode { id, params } => {
                views.move_node(id.as_str(), &params.new_parent_id, params.index)?;
            }
            MirrorCommand::DeleteNode { id, cascade } => {
                views.delete_node(id.as_str(), *cascade)?;
            }
            MirrorCommand::CreateView {
                provisional_root_id,
                new,
            } => {
                views.create_view(new.clone(), provisional_root_id.clone())?;
            }
            MirrorCommand::UpdateView { path, patch } => {
                views.update_view(path, patch.clone())?;
            }
            MirrorCommand::DeleteView { path } => {
                views.delete_view(path)?;
            }
            MirrorCommand::SetDefaultHome { path } => {
                views.set_default_home(path)?;
            }
        }
        Ok(())
    }

    /// Commit through the pipeline
    pub(crate) async fn commit(
        &self,
        pipeline: &MutationPipeline,
    ) -> Result<Committed, ViewServiceError> {
        match self {
            MirrorCommand::CreateNode { params, .. } => {
                pipeline.create_node(params.clone()).await.map(Committed::Node)
            }
            MirrorCommand::UpdateConfig { id, patch } => pipeline
                .update_config(id.as_str(), patch.clone())
                .await
                .map(Committed::Node),
            MirrorCommand::MoveNode { id, params } => pipeline
                .move_node(id.as_str(), &params.new_parent_id, params.index)
                .await
                .map(Committed::Node),
            MirrorCommand::DeleteNode { id, cascade } => pipeline
                .delete_node(id.as_str(), *cascade)
                .await
                .map(Committed::Deleted),
            MirrorCommand::CreateView { new, .. } => {
                pipeline.create_view(new.clone()).await.map(Committed::View)
            }
            MirrorCommand::UpdateView { path, patch } => pipeline
                .update_view(path, patch.clone())
                .await
                .map(Committed::View),
            MirrorCommand::DeleteView { path } => {
                pipeline.delete_view(path).await.map(Committed::View)
            }
            MirrorCommand::SetDefaultHome { path } => {
                pipeline.set_default_home(path).await.map(Committed::Home)
            }
        }
    }

    /// The provisional id this command introduced and the id the server chose
    pub(crate) fn id_mapping(&self, committed: &Committed) -> Option<(NodeId, NodeId)> {
        match (self, committed) {
            (MirrorCommand::CreateNode { provisional_id, .. }, Committed::Node(node)) => {
                Some((provisional_id.clone(), node.id.clone()))
            }
            (
                MirrorCommand::CreateView {
                    provisional_root_id,
                    new,
                },
                Committed::View(view),
            ) if new.root_node_id.is_none() => {
                Some((provisional_root_id.clone(), view.root_node_id.clone()))
            }
            _ => None,
        }
    }

    /// Rewrite every node reference found in `remap`
    pub(crate) fn remap_ids(&mut self, remap: &HashMap<NodeId, NodeId>) {
        let swap = |id: &mut NodeId| {
            if let Some(server_id) = remap.get(id.as_str()) {
                *id = server_id.clone();
            }
        };
        match self {
            MirrorCommand::CreateNode { params, .. } => swap(&mut params.parent_id),
            MirrorCommand::UpdateConfig { id, .. } | MirrorCommand::DeleteNode { id, .. } => swap(id),
            MirrorCommand::MoveNode { id, params } => {
                swap(id);
                swap(&mut params.new_parent_id);
            }
            MirrorCommand::CreateView { new, .. } => {
                if let Some(root_id) = new.root_node_id.as_mut() {
                    swap(root_id);
                }
            }
            MirrorCommand::UpdateView { .. }
            | MirrorCommand::DeleteView { .. }
            | MirrorCommand::SetDefaultHome { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeKind;
    use serde_json::json;

    #[test]
    fn test_remap_rewrites_references() {
        let provisional = NodeId::provisional();
        let server = NodeId::from("server-1");
        let remap = HashMap::from([(provisional.clone(), server.clone())]);

        let mut create = MirrorCommand::create_node(CreateNodeParams::new(
            provisional.clone(),
            NodeKind::Title,
            json!({ "text": "x" }),
        ));
        create.remap_ids(&remap);
        match &create {
            MirrorCommand::CreateNode { params, .. } => assert_eq!(params.parent_id, server),
            other => panic!("unexpected command {:?}", other),
        }

        let mut moved = MirrorCommand::move_node(provisional.clone(), provisional.clone(), None);
        moved.remap_ids(&remap);
        assert_eq!(
            moved,
            MirrorCommand::MoveNode {
                id: server.clone(),
                params: MoveNodeParams {
                    new_parent_id: server,
                    index: None,
                },
            }
        );
    }

    #[test]
    fn test_id_mapping_only_for_created_nodes() {
        let command = MirrorCommand::create_node(CreateNodeParams::new(
            NodeId::from("root"),
            NodeKind::Container,
            json!({}),
        ));
        let node = Node::new(
            NodeId::from("real"),
            Some(NodeId::from("root")),
            crate::models::NodeConfig::default_for(NodeKind::Container),
        );
        let (from, to) = command.id_mapping(&Committed::Node(node.clone())).unwrap();
        assert!(from.is_provisional());
        assert_eq!(to, NodeId::from("real"));

        let update = MirrorCommand::update_config("real", json!({}));
        assert!(update.id_mapping(&Committed::Node(node)).is_none());
    }

    #[test]
    fn test_event_wire_format() {
        let event = MirrorEvent::Rejected {
            mutation_id: MutationId::new(3),
            code: "CYCLE_DETECTED".to_string(),
            message: "cycle".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "rejected", "mutationId": 3, "code": "CYCLE_DETECTED", "message": "cycle" })
        );
    }
}
