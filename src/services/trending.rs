use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{ContentItem, Subject};

pub const POPULAR_SUBJECTS_LIMIT: usize = 4;
pub const POPULAR_ITEMS_LIMIT: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectCount {
    pub subject: Subject,
    pub count: usize,
}

/// Most common subjects, busiest first
///
/// Subjects with equal counts keep the order in which they first appear.
pub fn popular_subjects(items: &[ContentItem], limit: usize) -> Vec<SubjectCount> {
    let mut counts: Vec<SubjectCount> = Vec::new();
    for subject in items.iter().filter_map(|item| item.subject) {
        match counts.iter_mut().find(|c| c.subject == subject) {
            Some(entry) => entry.count += 1,
            None => counts.push(SubjectCount { subject, count: 1 }),
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Items with the most engagement (likes + replies); zero-engagement items are skipped
pub fn popular_items(items: &[ContentItem], limit: usize) -> Vec<&ContentItem> {
    let mut scored: Vec<(&ContentItem, u64)> = items
        .iter()
        .map(|item| (item, item.likes as u64 + item.replies as u64))
        .filter(|(_, score)| *score > 0)
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .take(limit)
        .map(|(item, _)| item)
        .collect()
}

/// Items created in the 24 hours leading up to `now`
pub fn created_within_day(items: &[ContentItem], now: DateTime<Utc>) -> Vec<&ContentItem> {
    items
        .iter()
        .filter(|item| now - item.created_at <= Duration::days(1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn now() -> DateTime<Utc> {
        "2025-11-10T12:00:00Z".parse().unwrap()
    }

    fn item(id: &str, subject: Option<Subject>, likes: u32, replies: u32) -> ContentItem {
        ContentItem::new(id, id, Some(Category::Review), subject, now())
            .with_likes(likes)
            .with_replies(replies)
    }

    #[test]
    fn test_popular_subjects_counts_and_limits() {
        let items = vec![
            item("1", Some(Subject::Art), 0, 0),
            item("2", Some(Subject::Math), 0, 0),
            item("3", Some(Subject::Math), 0, 0),
            item("4", None, 0, 0),
            item("5", Some(Subject::Music), 0, 0),
            item("6", Some(Subject::History), 0, 0),
            item("7", Some(Subject::Writing), 0, 0),
        ];

        let top = popular_subjects(&items, POPULAR_SUBJECTS_LIMIT);
        assert_eq!(top.len(), 4);
        assert_eq!(top[0], SubjectCount { subject: Subject::Math, count: 2 });
        assert_eq!(top[1].subject, Subject::Art);
        assert_eq!(top[2].subject, Subject::Music);
        assert_eq!(top[3].subject, Subject::History);
    }

    #[test]
    fn test_popular_items_skips_zero_engagement() {
        let items = vec![
            item("quiet", None, 0, 0),
            item("liked", None, 3, 0),
            item("busy", None, 2, 4),
            item("tied", None, 1, 2),
        ];

        let ids: Vec<&str> = popular_items(&items, POPULAR_ITEMS_LIMIT)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["busy", "liked", "tied"]);
    }

    #[test]
    fn test_created_within_day() {
        let now = now();
        let mut items = vec![item("fresh", None, 0, 0), item("edge", None, 0, 0), item("stale", None, 0, 0)];
        items[1].created_at = now - Duration::days(1);
        items[2].created_at = now - Duration::hours(25);

        let ids: Vec<&str> = created_within_day(&items, now).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["fresh", "edge"]);
    }
}
