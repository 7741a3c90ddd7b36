//! Integrity findings for a views configuration
//!
//! The node store rejects structural corruption on every mutation, but a
//! persisted document can still carry it (hand edits, older writers). These
//! findings describe what loading found without refusing to load.

use serde::Serialize;
use std::fmt;

use crate::models::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum IntegrityIssue {
    /// A view references a root node that does not exist
    MissingViewRoot { path: String, root_node_id: NodeId },

    /// A view's root node has a parent
    ViewRootHasParent {
        path: String,
        root_node_id: NodeId,
        parent_id: NodeId,
    },

    /// One root node is bound to several views
    SharedRoot {
        root_node_id: NodeId,
        paths: Vec<String>,
    },

    /// A node points at a parent that does not exist
    DanglingParent { node_id: NodeId, parent_id: NodeId },

    /// A node is unreachable because its parent chain loops
    Cycle { node_id: NodeId },

    /// A root subtree that no view references
    OrphanedSubtree { root_node_id: NodeId, size: usize },

    /// A sibling list whose order values are not `0..n-1`
    NonDenseOrder { parent_id: NodeId },
}

impl IntegrityIssue {
    /// Findings that break resolution of some view, as opposed to dead weight
    pub fn is_blocking(&self) -> bool {
        match self {
            IntegrityIssue::MissingViewRoot { .. }
            | IntegrityIssue::ViewRootHasParent { .. }
            | IntegrityIssue::SharedRoot { .. }
            | IntegrityIssue::Cycle { .. } => true,
            IntegrityIssue::DanglingParent { .. }
            | IntegrityIssue::OrphanedSubtree { .. }
            | IntegrityIssue::NonDenseOrder { .. } => false,
        }
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::MissingViewRoot { path, root_node_id } => {
                write!(f, "view '{}' references missing root '{}'", path, root_node_id)
            }
            IntegrityIssue::ViewRootHasParent {
                path,
                root_node_id,
                parent_id,
            } => write!(
                f,
                "root '{}' of view '{}' has parent '{}'",
                root_node_id, path, parent_id
            ),
            IntegrityIssue::SharedRoot {
                root_node_id,
                paths,
            } => write!(
                f,
                "root '{}' is shared by views {}",
                root_node_id,
                paths.join(", ")
            ),
            IntegrityIssue::DanglingParent { node_id, parent_id } => {
                write!(f, "node '{}' has missing parent '{}'", node_id, parent_id)
            }
            IntegrityIssue::Cycle { node_id } => {
                write!(f, "node '{}' sits on a parent cycle", node_id)
            }
            IntegrityIssue::OrphanedSubtree { root_node_id, size } => write!(
                f,
                "subtree '{}' ({} nodes) is not bound to any view",
                root_node_id, size
            ),
            IntegrityIssue::NonDenseOrder { parent_id } => {
                write!(f, "children of '{}' have non-dense order", parent_id)
            }
        }
    }
}
