//! Numeric encoding of content items.
//!
//! Layout of every vector is fixed: `[category one-hot, subject one-hot,
//! popularity, recency]`. Interest vectors and scoring rely on positional
//! alignment, so all callers go through [`feature_vector`].

use chrono::{DateTime, Utc};

use crate::models::{Category, ContentItem, Subject};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Items older than this many days get a recency score of zero
pub const RECENCY_WINDOW_DAYS: f64 = 30.0;

const CATEGORY_OFFSET: usize = 0;
const SUBJECT_OFFSET: usize = Category::ALL.len();
const POPULARITY_INDEX: usize = SUBJECT_OFFSET + Subject::ALL.len();
const RECENCY_INDEX: usize = POPULARITY_INDEX + 1;

/// Length of every feature vector: |categories| + |subjects| + 2
pub const DIMENSION: usize = RECENCY_INDEX + 1;

/// Fixed-length real vector describing an item or a user's interests
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn zeros() -> Self {
        Self(vec![0.0; DIMENSION])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// True for the all-zero "no signal" vector
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    pub fn dot(&self, other: &FeatureVector) -> f64 {
        self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum()
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Cosine similarity, defined as 0 when either side has zero norm
    pub fn cosine_similarity(&self, other: &FeatureVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        self.dot(other) / denom
    }

    /// Element-wise arithmetic mean; the zero vector when `vectors` is empty
    pub fn mean<'a, I>(vectors: I) -> Self
    where
        I: IntoIterator<Item = &'a FeatureVector>,
    {
        let mut sum = Self::zeros();
        let mut count = 0usize;
        for v in vectors {
            for (acc, x) in sum.0.iter_mut().zip(&v.0) {
                *acc += x;
            }
            count += 1;
        }
        if count > 0 {
            let n = count as f64;
            sum.0.iter_mut().for_each(|acc| *acc /= n);
        }
        sum
    }
}

/// Largest like counter across the whole collection.
///
/// Computed once per scoring pass so every item shares one denominator.
pub fn max_likes(items: &[ContentItem]) -> u32 {
    items.iter().map(|item| item.likes).max().unwrap_or(0)
}

/// `likes / max_likes` clamped to [0, 1]; 0 when nothing has been liked yet
pub fn popularity_score(likes: u32, max_likes: u32) -> f64 {
    if max_likes == 0 {
        return 0.0;
    }
    (likes as f64 / max_likes as f64).clamp(0.0, 1.0)
}

/// Triangular recency window: 1 for now or future, linear down to 0 at 30 days.
pub fn recency_score(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_days = (now - created_at).num_milliseconds() as f64 / MS_PER_DAY;
    if age_days <= 0.0 {
        1.0
    } else if age_days > RECENCY_WINDOW_DAYS {
        0.0
    } else {
        1.0 - age_days / RECENCY_WINDOW_DAYS
    }
}

/// Builds the feature vector for one item
pub fn feature_vector(item: &ContentItem, max_likes: u32, now: DateTime<Utc>) -> FeatureVector {
    let mut v = FeatureVector::zeros();
    if let Some(category) = item.category {
        v.0[CATEGORY_OFFSET + category.index()] = 1.0;
    }
    if let Some(subject) = item.subject {
        v.0[SUBJECT_OFFSET + subject.index()] = 1.0;
    }
    v.0[POPULARITY_INDEX] = popularity_score(item.likes, max_likes);
    v.0[RECENCY_INDEX] = recency_score(item.created_at, now);
    v
}
