//! Content Derivation
//!
//! Pure functions computing the derived content attached to resolved nodes.
//! They are recomputed on every resolution, never cached, and given the same
//! inputs always produce the same order.

mod listing;
mod series;
mod tags;
mod toc;

pub use listing::{experiences_listing, posts_listing};
pub use series::series_navigation;
pub use tags::{custom_tag_counts, tag_frequencies};
pub use toc::{heading_anchors, table_of_contents, HeadingMarker};
