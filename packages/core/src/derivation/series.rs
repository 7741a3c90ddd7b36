use crate::models::{PostRecord, SeriesLink, SeriesNavigation};

/// Previous/next navigation for a post within its series
///
/// Series members are ordered by date ascending; posts sharing a date keep
/// their corpus order. Returns `None` if the post is unknown or not in a series.
pub fn series_navigation(posts: &[PostRecord], slug: &str) -> Option<SeriesNavigation> {
    let current = posts.iter().find(|p| p.slug == slug)?;
    let series = current.series.as_deref()?.trim();
    if series.is_empty() {
        return None;
    }

    let mut members: Vec<&PostRecord> = posts
        .iter()
        .filter(|p| p.series.as_deref().map(str::trim) == Some(series))
        .collect();
    members.sort_by_key(|p| p.date);

    let index = members.iter().position(|p| p.slug == slug)?;
    let link = |p: &PostRecord| SeriesLink {
        slug: p.slug.clone(),
        title: p.title.clone(),
    };

    Some(SeriesNavigation {
        series: series.to_string(),
        position: index + 1,
        total: members.len(),
        previous: index.checked_sub(1).map(|i| link(members[i])),
        next: members.get(index + 1).map(|p| link(p)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(slug: &str, day: u32, series: Option<&str>) -> PostRecord {
        PostRecord {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            categories: vec![],
            series: series.map(str::to_string),
            toc: false,
            summary: None,
        }
    }

    #[test]
    fn test_middle_of_series() {
        let posts = vec![
            post("part-3", 20, Some("Async")),
            post("unrelated", 5, None),
            post("part-1", 1, Some("Async")),
            post("part-2", 10, Some("Async")),
        ];

        let nav = series_navigation(&posts, "part-2").unwrap();
        assert_eq!(nav.series, "Async");
        assert_eq!(nav.position, 2);
        assert_eq!(nav.total, 3);
        assert_eq!(nav.previous.unwrap().slug, "part-1");
        assert_eq!(nav.next.unwrap().slug, "part-3");
    }

    #[test]
    fn test_equal_dates_keep_corpus_order() {
        let posts = vec![
            post("b", 1, Some("S")),
            post("a", 1, Some("S")),
            post("c", 1, Some("S")),
        ];
        let nav = series_navigation(&posts, "a").unwrap();
        assert_eq!(nav.position, 2);
        assert_eq!(nav.previous.unwrap().slug, "b");
        assert_eq!(nav.next.unwrap().slug, "c");
    }

    #[test]
    fn test_ends_of_series() {
        let posts = vec![post("one", 1, Some("S")), post("two", 2, Some("S"))];
        let first = series_navigation(&posts, "one").unwrap();
        assert!(first.previous.is_none());
        assert_eq!(first.next.unwrap().title, "TWO");

        let last = series_navigation(&posts, "two").unwrap();
        assert!(last.next.is_none());
    }

    #[test]
    fn test_not_in_series() {
        let posts = vec![post("solo", 1, None)];
        assert!(series_navigation(&posts, "solo").is_none());
        assert!(series_navigation(&posts, "missing").is_none());
    }
}
