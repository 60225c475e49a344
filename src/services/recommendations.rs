use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    models::ContentItem,
    services::features::{feature_vector, max_likes, FeatureVector},
};

/// Upper bound on the number of items `recommend` returns
pub const MAX_RECOMMENDATIONS: usize = 5;

/// A candidate item paired with its similarity to the user's interests
#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem<'a> {
    pub item: &'a ContentItem,
    pub score: f64,
}

/// Mean feature vector of every item the user has liked
///
/// All liked items weigh the same regardless of when they were liked.
/// Returns the all-zero vector when nothing in `items` is liked.
pub fn interest_vector(
    items: &[ContentItem],
    liked: &HashSet<String>,
    max_likes: u32,
    now: DateTime<Utc>,
) -> FeatureVector {
    let liked_vectors: Vec<FeatureVector> = items
        .iter()
        .filter(|item| liked.contains(&item.id))
        .map(|item| feature_vector(item, max_likes, now))
        .collect();

    FeatureVector::mean(&liked_vectors)
}

/// Scores every unliked item against the user's interest vector
///
/// Candidates are sorted by descending cosine similarity. The sort is stable,
/// so equal scores keep the order of `items`. At most [`MAX_RECOMMENDATIONS`]
/// entries are returned; an empty liked set yields an empty result.
pub fn rank<'a>(
    items: &'a [ContentItem],
    liked: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<ScoredItem<'a>> {
    let max_likes = max_likes(items);
    let interest = interest_vector(items, liked, max_likes, now);

    if interest.is_zero() {
        tracing::debug!(liked = liked.len(), "No interest signal, skipping scoring");
        return Vec::new();
    }

    let mut scored: Vec<ScoredItem<'a>> = items
        .iter()
        .filter(|item| !liked.contains(&item.id))
        .map(|item| ScoredItem {
            item,
            score: interest.cosine_similarity(&feature_vector(item, max_likes, now)),
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(MAX_RECOMMENDATIONS);

    tracing::debug!(
        items = items.len(),
        returned = scored.len(),
        "Ranked recommendations"
    );

    scored
}

/// Generates content recommendations for one user
///
/// Based on the categories, subjects, popularity and freshness of the items
/// the user liked, returns up to five unliked items that match their taste.
pub fn recommend<'a>(
    items: &'a [ContentItem],
    liked: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<&'a ContentItem> {
    rank(items, liked, now)
        .into_iter()
        .map(|scored| scored.item)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Subject};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2025-11-10T12:00:00Z".parse().unwrap()
    }

    fn liked(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> Vec<ContentItem> {
        let now = now();
        vec![
            ContentItem::new("A", "Derivatives", Some(Category::Tutoring), Some(Subject::Math), now)
                .with_likes(10),
            ContentItem::new("C", "Portfolio", Some(Category::Feedback), Some(Subject::Art), now),
            ContentItem::new("B", "Chain rule", Some(Category::Tutoring), Some(Subject::Math), now),
            ContentItem::new("D", "Essay", Some(Category::Review), Some(Subject::Writing), now),
            ContentItem::new("E", "Limits", Some(Category::Review), Some(Subject::Math), now),
            ContentItem::new("F", "Labs", Some(Category::Tutoring), Some(Subject::Science), now),
            ContentItem::new("G", "Old", Some(Category::Tutoring), Some(Subject::Math), now - Duration::days(45)),
            ContentItem::new("H", "Mystery", None, None, now),
        ]
    }

    #[test]
    fn test_shared_axes_rank_first() {
        let items = catalog();
        let result = recommend(&items, &liked(&["A"]), now());

        assert_eq!(result[0].id, "B");
        let pos = |id: &str| result.iter().position(|i| i.id == id);
        // C shares nothing but recency, so it sits below B
        assert!(pos("C").map_or(true, |c| c > 0));
    }

    #[test]
    fn test_empty_liked_set_short_circuits() {
        let items = catalog();
        assert!(recommend(&items, &HashSet::new(), now()).is_empty());
    }

    #[test]
    fn test_liked_ids_not_in_collection_give_no_signal() {
        let items = catalog();
        assert!(recommend(&items, &liked(&["missing"]), now()).is_empty());
    }

    #[test]
    fn test_excludes_liked_and_bounds_output() {
        let items = catalog();
        let liked = liked(&["A", "D"]);
        let result = recommend(&items, &liked, now());

        assert!(result.len() <= MAX_RECOMMENDATIONS);
        assert_eq!(result.len(), MAX_RECOMMENDATIONS);
        assert!(result.iter().all(|item| !liked.contains(&item.id)));
    }

    #[test]
    fn test_deterministic() {
        let items = catalog();
        let liked = liked(&["A"]);
        let first: Vec<&str> = recommend(&items, &liked, now()).iter().map(|i| i.id.as_str()).collect();
        for _ in 0..5 {
            let again: Vec<&str> = recommend(&items, &liked, now()).iter().map(|i| i.id.as_str()).collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let now = now();
        let items = vec![
            ContentItem::new("L", "liked", Some(Category::Review), Some(Subject::Art), now),
            ContentItem::new("X2", "x", Some(Category::Review), Some(Subject::Art), now),
            ContentItem::new("X1", "x", Some(Category::Review), Some(Subject::Art), now),
        ];
        let result = recommend(&items, &liked(&["L"]), now);
        let ids: Vec<&str> = result.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["X2", "X1"]);
    }

    #[test]
    fn test_scores_are_descending() {
        let items = catalog();
        let scored = rank(&items, &liked(&["A"]), now());
        assert!(scored.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(scored.iter().all(|s| (0.0..=1.0 + 1e-12).contains(&s.score)));
    }

    #[test]
    fn test_interest_vector_is_mean_of_liked() {
        let items = catalog();
        let max = max_likes(&items);
        let v = interest_vector(&items, &liked(&["A", "C"]), max, now());
        let s = v.as_slice();
        assert_eq!(s[Category::Tutoring.index()], 0.5);
        assert_eq!(s[Category::Feedback.index()], 0.5);
        // popularity: A = 1.0, C = 0.0
        assert_eq!(s[s.len() - 2], 0.5);
        assert_eq!(s[s.len() - 1], 1.0);
    }
}
