//! ViewTree Core - view resolution and content composition engine
//!
//! This crate owns the node forest behind a site's views, resolves URL paths
//! into render-ready trees, derives content (rendered markdown, tables of
//! contents, tag tables, series navigation) and applies mutations atomically.
//!
//! # Architecture
//!
//! - **Snapshots**: the canonical [`ViewsConfig`] lives behind an `Arc`; readers
//!   resolve against a snapshot without locks
//! - **Single writer**: every mutation clones the snapshot, validates, persists
//!   the whole document and only then swaps it in
//! - **Closed node kinds**: [`NodeKind`] and [`NodeConfig`] are matched
//!   exhaustively, so adding a kind is a compile-time checklist
//!
//! # Modules
//!
//! - [`models`] - Nodes, views, corpus records and resolved trees
//! - [`db`] - Node store, views config, integrity report, persistence
//! - [`derivation`] - Pure derived-content functions
//! - [`services`] - Mutation pipeline, view resolver, site façade
//! - [`mirror`] - Optimistic client-side mirror of the store
//! - [`operations`] - Mutation request parameters
//! - [`config`] - Engine configuration

pub mod config;
pub mod db;
pub mod derivation;
pub mod mirror;
pub mod models;
pub mod operations;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::{EngineConfig, Mode};
pub use db::{
    DomainEvent, IntegrityIssue, JsonFilePersistence, MemoryPersistence, PersistenceError,
    RetryingPersistence, TreeError, ViewsConfig, ViewsPersistence, VIEWS_NAMESPACE,
};
pub use mirror::{MirrorCommand, MirrorEvent, MirrorSession, MutationId, StoreMirror};
pub use models::*;
pub use operations::{CreateNodeParams, MoveNodeParams};
pub use services::*;
