use crate::models::{ExperienceRecord, PostRecord};

/// Posts for a listing: optionally filtered by tag (case-insensitive), newest
/// first, truncated to `limit`
///
/// Posts with equal dates keep their corpus order.
pub fn posts_listing(posts: &[PostRecord], tag: Option<&str>, limit: Option<usize>) -> Vec<PostRecord> {
    let tag = tag.map(str::trim).filter(|t| !t.is_empty());
    let mut selected: Vec<&PostRecord> = posts
        .iter()
        .filter(|post| tag.map_or(true, |t| post.has_tag(t)))
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date));

    selected
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

/// Experiences in corpus order, truncated to `limit`
pub fn experiences_listing(
    experiences: &[ExperienceRecord],
    limit: Option<usize>,
) -> Vec<ExperienceRecord> {
    experiences
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(slug: &str, month: u32, categories: &[&str]) -> PostRecord {
        PostRecord {
            slug: slug.to_string(),
            title: slug.to_string(),
            date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            series: None,
            toc: false,
            summary: None,
        }
    }

    fn slugs(posts: &[PostRecord]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn test_newest_first_and_stable() {
        let posts = vec![
            post("jan", 1, &[]),
            post("mar-a", 3, &[]),
            post("feb", 2, &[]),
            post("mar-b", 3, &[]),
        ];
        assert_eq!(
            slugs(&posts_listing(&posts, None, None)),
            vec!["mar-a", "mar-b", "feb", "jan"]
        );
    }

    #[test]
    fn test_tag_filter_is_case_insensitive() {
        let posts = vec![
            post("a", 1, &["Rust"]),
            post("b", 2, &["go"]),
            post("c", 3, &["rust", "async"]),
        ];
        assert_eq!(slugs(&posts_listing(&posts, Some("RUST"), None)), vec!["c", "a"]);
        assert_eq!(slugs(&posts_listing(&posts, Some(" "), None)).len(), 3);
    }

    #[test]
    fn test_limit_truncates() {
        let posts = vec![post("a", 1, &[]), post("b", 2, &[]), post("c", 3, &[])];
        assert_eq!(slugs(&posts_listing(&posts, None, Some(2))), vec!["c", "b"]);
    }

    #[test]
    fn test_experiences_keep_corpus_order() {
        let experiences: Vec<ExperienceRecord> = ["x", "y", "z"]
            .iter()
            .map(|s| ExperienceRecord {
                slug: s.to_string(),
                title: s.to_string(),
                company: None,
                start_date: None,
                end_date: None,
                summary: None,
            })
            .collect();
        let listed = experiences_listing(&experiences, Some(2));
        assert_eq!(
            listed.iter().map(|e| e.slug.as_str()).collect::<Vec<_>>(),
            vec!["x", "y"]
        );
    }
}
