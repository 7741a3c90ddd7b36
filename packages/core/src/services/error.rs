//! Service Layer Error Types
//!
//! `ViewServiceError` is the public error taxonomy of the engine. Every write
//! entry point returns it; read paths express "not found" as `Option::None`
//! and only surface integrity problems through logs.

use crate::db::{PersistenceError, TreeError};
use crate::models::ValidationError;
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum ViewServiceError {
    /// A node or view addressed by the caller does not exist
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// The requested parent is missing or cannot hold children
    #[error("Invalid parent '{parent_id}': {reason}")]
    InvalidParent { parent_id: String, reason: String },

    /// The move would make a node its own ancestor
    #[error("Cycle detected: cannot move '{node_id}' under '{parent_id}'")]
    CycleDetected { node_id: String, parent_id: String },

    /// Stored structure violates an invariant (orphaned view, loop, overflow)
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    /// The persistence collaborator failed; nothing was committed
    #[error("Persistence failed: {0}")]
    PersistenceFailure(#[from] PersistenceError),

    /// Malformed input
    #[error("Validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    /// Mutations are disabled in publish mode
    #[error("Engine is read-only in publish mode")]
    ReadOnly,
}

impl ViewServiceError {
    /// Create a not found error for a node
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            what: format!("node '{}'", id.into()),
        }
    }

    /// Create a not found error for a view
    pub fn view_not_found(path: impl Into<String>) -> Self {
        Self::NotFound {
            what: format!("view '{}'", path.into()),
        }
    }

    /// Create an integrity error
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::IntegrityError(msg.into())
    }

    /// Stable machine-readable code, used by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            ViewServiceError::NotFound { .. } => "NOT_FOUND",
            ViewServiceError::InvalidParent { .. } => "INVALID_PARENT",
            ViewServiceError::CycleDetected { .. } => "CYCLE_DETECTED",
            ViewServiceError::IntegrityError(_) => "INTEGRITY_ERROR",
            ViewServiceError::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            ViewServiceError::ValidationError(_) => "VALIDATION_ERROR",
            ViewServiceError::ReadOnly => "READ_ONLY",
        }
    }
}

impl From<TreeError> for ViewServiceError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NodeNotFound(id) => Self::node_not_found(id),
            TreeError::ViewNotFound(path) => Self::view_not_found(path),
            TreeError::InvalidParent { parent_id, reason } => {
                Self::InvalidParent { parent_id, reason }
            }
            TreeError::CycleDetected { node_id, parent_id } => {
                Self::CycleDetected { node_id, parent_id }
            }
            TreeError::Integrity(msg) => Self::IntegrityError(msg),
            TreeError::Validation(e) => Self::ValidationError(e),
        }
    }
}
