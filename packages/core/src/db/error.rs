//! Storage Error Types
//!
//! This module defines error types for the storage layer: structural failures of
//! the node forest and I/O failures of the persistence collaborator.

use std::time::Duration;
use thiserror::Error;

use crate::models::ValidationError;

/// Structural errors raised by the node store and views config
///
/// The working copy that produced one of these is discarded by the caller, so
/// none of them leave partial state behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("View not found: {0}")]
    ViewNotFound(String),

    #[error("Invalid parent '{parent_id}': {reason}")]
    InvalidParent { parent_id: String, reason: String },

    #[error("Cycle detected: cannot move '{node_id}' under '{parent_id}'")]
    CycleDetected { node_id: String, parent_id: String },

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl TreeError {
    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound(id.into())
    }

    /// Create a view not found error
    pub fn view_not_found(path: impl Into<String>) -> Self {
        Self::ViewNotFound(path.into())
    }

    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a cycle detected error
    pub fn cycle_detected(node_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self::CycleDetected {
            node_id: node_id.into(),
            parent_id: parent_id.into(),
        }
    }

    /// Create an integrity error
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }
}

/// Errors from a [`ViewsPersistence`](super::ViewsPersistence) collaborator
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O failure for namespace '{namespace}': {source}")]
    Io {
        namespace: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Persistence timed out after {0:?}")]
    Timeout(Duration),

    #[error("Persistence backend error: {0}")]
    Backend(String),
}

impl PersistenceError {
    /// Create an I/O error scoped to a namespace
    pub fn io(namespace: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            namespace: namespace.into(),
            source,
        }
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            PersistenceError::Io { .. }
            | PersistenceError::Timeout(_)
            | PersistenceError::Backend(_) => true,
            PersistenceError::Serialization(_) => false,
        }
    }
}
