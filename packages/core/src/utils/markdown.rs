//! Markdown text utilities for heading anchors
//!
//! Table-of-contents entries need two things from a heading's source text: a
//! plain display string without inline markup, and a URL-safe anchor.

use regex::Regex;
use std::sync::LazyLock;

/// Inline markup patterns, applied in order
///
/// Images before links (both use brackets), bold before italic (`**` vs `*`).
static INLINE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // ![alt](url) -> alt
        (Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap(), "$1"),
        // [text](url) -> text
        (Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap(), "$1"),
        (Regex::new(r"`([^`]+)`").unwrap(), "$1"),
        (Regex::new(r"\*\*([^*]+)\*\*").unwrap(), "$1"),
        (Regex::new(r"__([^_]+)__").unwrap(), "$1"),
        (Regex::new(r"~~([^~]+)~~").unwrap(), "$1"),
        (Regex::new(r"\*([^*]+)\*").unwrap(), "$1"),
        (Regex::new(r"\b_([^_]+)_\b").unwrap(), "$1"),
        (Regex::new(r"<[^>]+>").unwrap(), ""),
    ]
});

/// Leading ATX heading marker and trailing closing hashes
static HEADING_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}#{1,6}\s+|\s+#+\s*$").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Characters dropped from anchors
static ANCHOR_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s_-]").unwrap());

/// Strip inline markdown from a single line of heading source
///
/// # Examples
///
/// ```
/// use viewtree_core::utils::strip_inline_markdown;
///
/// assert_eq!(strip_inline_markdown("## Using `tokio::spawn`"), "Using tokio::spawn");
/// assert_eq!(strip_inline_markdown("**Bold** and [link](http://x)"), "Bold and link");
/// ```
pub fn strip_inline_markdown(text: &str) -> String {
    let mut result = HEADING_MARKER_RE.replace_all(text, "").to_string();
    for (pattern, replacement) in INLINE_PATTERNS.iter() {
        result = pattern.replace_all(&result, *replacement).to_string();
    }
    WHITESPACE_RE.replace_all(&result, " ").trim().to_string()
}

/// Turn plain heading text into an anchor slug
///
/// Lower-cases, drops punctuation, and joins words with `-`. Returns `section`
/// when nothing usable remains. The text is taken literally; strip markup
/// from source headings first.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let kept = ANCHOR_STRIP_RE.replace_all(&lowered, "");

    let slug = kept
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_heading_markers() {
        assert_eq!(strip_inline_markdown("# Header 1"), "Header 1");
        assert_eq!(strip_inline_markdown("### Closed ###"), "Closed");
    }

    #[test]
    fn test_strip_inline_styles() {
        assert_eq!(strip_inline_markdown("**bold** text"), "bold text");
        assert_eq!(strip_inline_markdown("*italic* and _also_"), "italic and also");
        assert_eq!(strip_inline_markdown("~~gone~~"), "gone");
        assert_eq!(strip_inline_markdown("use `tokio::spawn`"), "use tokio::spawn");
        assert_eq!(strip_inline_markdown("a <em>b</em>"), "a b");
    }

    #[test]
    fn test_strip_links_and_images() {
        assert_eq!(strip_inline_markdown("[Docs](https://docs.rs)"), "Docs");
        assert_eq!(strip_inline_markdown("![logo](a.png) Title"), "logo Title");
    }

    #[test]
    fn test_snake_case_identifiers_survive() {
        assert_eq!(strip_inline_markdown("the my_var_name case"), "the my_var_name case");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("What's new in 1.0?"), "whats-new-in-10");
        assert_eq!(slugify("Vec<T> and 2 * 3"), "vect-and-2-3");
        assert_eq!(slugify("  Spaces   -  and dashes "), "spaces-and-dashes");
        assert_eq!(slugify("Ünïcode Héading"), "ünïcode-héading");
        assert_eq!(slugify("!!!"), "section");
    }
}
