//! Storage Layer
//!
//! This module holds the canonical data structures and their persistence:
//!
//! - [`NodeStore`] - the node forest with structural invariant enforcement
//! - [`ViewsConfig`] - views bound to root nodes, plus integrity checks
//! - [`DomainEvent`] - change notifications emitted after commits
//! - [`ViewsPersistence`] - async document persistence seam with memory, JSON
//!   file and retrying implementations
//!
//! # Architecture
//!
//! Everything in this layer is synchronous except persistence. The mutation
//! pipeline clones a `ViewsConfig`, mutates the clone here, persists it through a
//! `ViewsPersistence`, and only then publishes it.

mod error;
pub mod events;
mod integrity;
mod json_file_store;
mod node_store;
mod persistence;
mod views_config;

pub use error::{PersistenceError, TreeError};
pub use events::DomainEvent;
pub use integrity::IntegrityIssue;
pub use json_file_store::JsonFilePersistence;
pub use node_store::NodeStore;
pub use persistence::{MemoryPersistence, RetryingPersistence, ViewsPersistence, VIEWS_NAMESPACE};
pub use views_config::ViewsConfig;
