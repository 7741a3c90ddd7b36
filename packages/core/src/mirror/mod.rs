//! Store Mirror
//!
//! Client-side state container mirroring the committed views config:
//!
//! - [`StoreMirror`] - node and view tables with selectors, optimistic
//!   application and reconciliation
//! - [`MirrorSession`] - a mirror connected to a `MutationPipeline` through a
//!   background commit worker
//! - [`MirrorCommand`] / [`MirrorEvent`] - what goes in and what subscribers see

mod command;
mod session;
mod state;

pub use command::{Committed, MirrorCommand, MirrorEvent, MutationId, Reconciliation};
pub use session::MirrorSession;
pub use state::StoreMirror;
