use std::collections::{BTreeMap, BTreeSet};

use crate::models::{split_categories, PostRecord, TagCount};

/// Tag frequency table across all posts
///
/// Tags are trimmed and lower-cased; every occurrence counts, including repeats
/// within one post. Ordered by count descending, then tag ascending.
pub fn tag_frequencies(posts: &[PostRecord]) -> Vec<TagCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for post in posts {
        for category in &post.categories {
            for tag in split_categories(category) {
                *counts.entry(tag.to_lowercase()).or_default() += 1;
            }
        }
    }
    sorted(counts)
}

/// Tag table for an explicit tag list, each distinct tag counted once
pub fn custom_tag_counts(tags: &[String]) -> Vec<TagCount> {
    let distinct: BTreeSet<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    distinct
        .into_iter()
        .map(|tag| TagCount { tag, count: 1 })
        .collect()
}

fn sorted(counts: BTreeMap<String, usize>) -> Vec<TagCount> {
    let mut table: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    // BTreeMap iteration is already lexical; the stable sort keeps it for ties
    table.sort_by(|a, b| b.count.cmp(&a.count));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(slug: &str, categories: &[&str]) -> PostRecord {
        PostRecord {
            slug: slug.to_string(),
            title: slug.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            series: None,
            toc: false,
            summary: None,
        }
    }

    fn tc(tag: &str, count: usize) -> TagCount {
        TagCount {
            tag: tag.to_string(),
            count,
        }
    }

    #[test]
    fn test_case_folding_and_order() {
        let posts = vec![post("a", &["Go", "go"]), post("b", &["Rust"])];
        assert_eq!(tag_frequencies(&posts), vec![tc("go", 2), tc("rust", 1)]);
    }

    #[test]
    fn test_ties_break_lexically() {
        let posts = vec![
            post("a", &["zig", "Async"]),
            post("b", &["rust", "Zig", "async"]),
            post("c", &["Bevy"]),
        ];
        assert_eq!(
            tag_frequencies(&posts),
            vec![tc("async", 2), tc("zig", 2), tc("bevy", 1), tc("rust", 1)]
        );
    }

    #[test]
    fn test_joined_categories_are_split() {
        let posts = vec![post("a", &["rust, async"]), post("b", &["rust"])];
        assert_eq!(tag_frequencies(&posts), vec![tc("rust", 2), tc("async", 1)]);
    }

    #[test]
    fn test_empty_corpus() {
        assert!(tag_frequencies(&[]).is_empty());
    }

    #[test]
    fn test_custom_tags_counted_once() {
        let tags = vec!["Rust".to_string(), "rust".to_string(), " go ".to_string()];
        assert_eq!(custom_tag_counts(&tags), vec![tc("go", 1), tc("rust", 1)]);
    }
}
