//! Utility functions for ViewTree Core
//!
//! This module provides common utility functions used across the codebase.

mod markdown;

pub use markdown::{slugify, strip_inline_markdown};
