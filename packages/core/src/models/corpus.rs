//! Content corpus records (posts and experiences)
//!
//! These are read-only inputs to derivation; the engine never mutates them.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Metadata of one blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub slug: String,
    pub title: String,
    pub date: NaiveDate,
    /// Tags as authored; accepts a list or a single comma/space separated string
    #[serde(default, deserialize_with = "deserialize_categories")]
    pub categories: Vec<String>,
    /// Series title when the post is part of a series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// Whether the rendered post carries a table of contents
    #[serde(default)]
    pub toc: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl PostRecord {
    /// Case-insensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim().to_lowercase();
        self.categories
            .iter()
            .any(|c| c.trim().to_lowercase() == wanted)
    }
}

/// One work experience entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRecord {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoriesRepr {
    List(Vec<String>),
    Joined(String),
}

/// Split a category string on commas and whitespace, dropping empty pieces
pub fn split_categories(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn deserialize_categories<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match CategoriesRepr::deserialize(deserializer)? {
        CategoriesRepr::List(items) => items.iter().flat_map(|s| split_categories(s)).collect(),
        CategoriesRepr::Joined(raw) => split_categories(&raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_categories_accept_joined_string() {
        let post: PostRecord = serde_json::from_value(json!({
            "slug": "a",
            "title": "A",
            "date": "2024-01-02",
            "categories": "rust, async  tokio"
        }))
        .unwrap();
        assert_eq!(post.categories, vec!["rust", "async", "tokio"]);
        assert!(!post.toc);
    }

    #[test]
    fn test_categories_list_entries_are_split() {
        let post: PostRecord = serde_json::from_value(json!({
            "slug": "a",
            "title": "A",
            "date": "2024-01-02",
            "categories": ["Go", "rust, async"]
        }))
        .unwrap();
        assert_eq!(post.categories, vec!["Go", "rust", "async"]);
        assert!(post.has_tag("go"));
        assert!(post.has_tag("ASYNC"));
        assert!(!post.has_tag("python"));
    }
}
