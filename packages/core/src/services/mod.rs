//! Business Services
//!
//! This module contains the engine's service layer:
//!
//! - `MutationPipeline` - validated, persisted, atomic mutations with rollback
//! - `ViewResolver` - path lookup and tree expansion with derived content
//! - `SiteService` - read façade pairing the two
//! - `MarkdownRenderer` / `ContentCorpus` - collaborator seams used during
//!   derivation
//!
//! Services coordinate between the storage layer and callers. Reads work on
//! immutable snapshots; writes go through the pipeline's single writer.

pub mod corpus;
pub mod error;
pub mod mutation_pipeline;
pub mod renderer;
pub mod site_service;
pub mod view_resolver;

pub use corpus::{ContentCorpus, StaticCorpus};
pub use error::ViewServiceError;
pub use mutation_pipeline::MutationPipeline;
pub use renderer::{MarkdownRenderer, PulldownRenderer, RenderedMarkdown};
pub use site_service::SiteService;
pub use view_resolver::{expand_tree, resolve_view_by_path, ViewResolver};
