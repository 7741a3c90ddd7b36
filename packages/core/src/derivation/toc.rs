use std::collections::HashSet;

use crate::models::TocEntry;
use crate::utils::{slugify, strip_inline_markdown};

/// A heading found while rendering markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMarker {
    /// 1 for `#`, up to 6
    pub level: u8,
    /// Plain heading text as displayed, no markup
    pub text: String,
}

impl HeadingMarker {
    /// Heading whose text is already plain, as a renderer's text events give it
    pub fn new(level: u8, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Heading taken from markdown source; inline markup is stripped once here
    pub fn from_source(level: u8, source: &str) -> Self {
        Self::new(level, strip_inline_markdown(source))
    }
}

/// Unique anchors for every heading, in document order
///
/// Repeats get `-1`, `-2`, ... appended; a suffixed anchor that collides with
/// a literal heading slug keeps counting.
pub fn heading_anchors(headings: &[HeadingMarker]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    headings
        .iter()
        .map(|heading| {
            let base = slugify(&heading.text);
            let mut anchor = base.clone();
            let mut suffix = 0;
            while used.contains(&anchor) {
                suffix += 1;
                anchor = format!("{}-{}", base, suffix);
            }
            used.insert(anchor.clone());
            anchor
        })
        .collect()
}

/// Table of contents for headings up to `max_level`
///
/// Anchors are assigned over all headings first, so they match the ids the
/// renderer puts on deeper headings that are left out of the table.
pub fn table_of_contents(headings: &[HeadingMarker], max_level: u8) -> Vec<TocEntry> {
    headings
        .iter()
        .zip(heading_anchors(headings))
        .filter(|(heading, _)| heading.level >= 1 && heading.level <= max_level)
        .map(|(heading, anchor)| TocEntry {
            level: heading.level,
            text: heading.text.clone(),
            anchor,
        })
        .collect()
}
