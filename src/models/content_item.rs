use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{lenient_label, Category, Subject};

/// Whether an item came from the post board or the session board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Post,
    Session,
}

/// A post or study session that can be liked and recommended
///
/// Liked state is not stored here; the host tracks it as a set of ids per user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: String,
    #[serde(default)]
    pub kind: ContentKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_label")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient_label")]
    pub subject: Option<Subject>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub replies: u32,
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    /// Creates a post with no engagement yet
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: Option<Category>,
        subject: Option<Subject>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ContentKind::Post,
            title: title.into(),
            description: String::new(),
            category,
            subject,
            author_id: None,
            likes: 0,
            replies: 0,
            created_at,
        }
    }

    pub fn with_likes(mut self, likes: u32) -> Self {
        self.likes = likes;
        self
    }

    pub fn with_replies(mut self, replies: u32) -> Self {
        self.replies = replies;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adjusts the like counter by one, never dropping below zero
    pub fn bump_likes(&mut self, liked: bool) {
        self.likes = if liked {
            self.likes.saturating_add(1)
        } else {
            self.likes.saturating_sub(1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_labels_deserialize_to_none() {
        let json = r#"{
            "id": "S-1",
            "kind": "session",
            "title": "Pottery night",
            "category": "meetup",
            "subject": "ceramics",
            "created_at": "2025-11-01T10:30:00Z"
        }"#;

        let item: ContentItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, ContentKind::Session);
        assert_eq!(item.category, None);
        assert_eq!(item.subject, None);
        assert_eq!(item.likes, 0);
    }

    #[test]
    fn test_known_labels_deserialize() {
        let json = r#"{
            "id": "POST-001",
            "title": "Help debugging pointers",
            "category": "tutoring",
            "subject": "computer science",
            "likes": 5,
            "replies": 2,
            "created_at": "2025-11-01T10:30:00Z"
        }"#;

        let item: ContentItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, ContentKind::Post);
        assert_eq!(item.category, Some(Category::Tutoring));
        assert_eq!(item.subject, Some(Subject::ComputerScience));
        assert_eq!(item.likes, 5);
        assert_eq!(item.replies, 2);
    }

    #[test]
    fn test_bump_likes_clamps_at_zero() {
        let mut item = ContentItem::new("A", "a", None, None, Utc::now());
        item.bump_likes(false);
        assert_eq!(item.likes, 0);
        item.bump_likes(true);
        item.bump_likes(true);
        item.bump_likes(false);
        assert_eq!(item.likes, 1);
    }
}
