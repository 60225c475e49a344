use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod comment;
pub mod content_item;

pub use comment::{CommentRecord, CommentTree};
pub use content_item::{ContentItem, ContentKind};

/// Kind of help a post is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Review,
    Feedback,
    Tutoring,
}

impl Category {
    /// Every category, in feature-vector order
    pub const ALL: [Category; 3] = [Category::Review, Category::Feedback, Category::Tutoring];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Review => "review",
            Category::Feedback => "feedback",
            Category::Tutoring => "tutoring",
        }
    }

    /// Position of this category inside its one-hot block
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Academic subject an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    #[serde(rename = "science")]
    Science,
    #[serde(rename = "math")]
    Math,
    #[serde(rename = "writing")]
    Writing,
    #[serde(rename = "computer science")]
    ComputerScience,
    #[serde(rename = "engineering")]
    Engineering,
    #[serde(rename = "art")]
    Art,
    #[serde(rename = "business")]
    Business,
    #[serde(rename = "history")]
    History,
    #[serde(rename = "social studies")]
    SocialStudies,
    #[serde(rename = "music")]
    Music,
    #[serde(rename = "other")]
    Other,
}

impl Subject {
    /// Every subject, in feature-vector order
    pub const ALL: [Subject; 11] = [
        Subject::Science,
        Subject::Math,
        Subject::Writing,
        Subject::ComputerScience,
        Subject::Engineering,
        Subject::Art,
        Subject::Business,
        Subject::History,
        Subject::SocialStudies,
        Subject::Music,
        Subject::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Science => "science",
            Subject::Math => "math",
            Subject::Writing => "writing",
            Subject::ComputerScience => "computer science",
            Subject::Engineering => "engineering",
            Subject::Art => "art",
            Subject::Business => "business",
            Subject::History => "history",
            Subject::SocialStudies => "social studies",
            Subject::Music => "music",
            Subject::Other => "other",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Error returned when a label is not part of the fixed taxonomy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown label: {0}")]
pub struct UnknownLabel(pub String);

impl FromStr for Category {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or(UnknownLabel(needle))
    }
}

impl FromStr for Subject {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Subject::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or(UnknownLabel(needle))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deserializes an optional taxonomy label, mapping unrecognized values to `None`.
///
/// Items with an unknown category or subject are still scored; they just
/// contribute an all-zero block on that axis.
pub fn lenient_label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!(" Tutoring ".parse::<Category>(), Ok(Category::Tutoring));
        assert!("meetup".parse::<Category>().is_err());
    }

    #[test]
    fn test_subject_parse_multi_word() {
        assert_eq!(
            "Computer Science".parse::<Subject>(),
            Ok(Subject::ComputerScience)
        );
        assert_eq!("social studies".parse::<Subject>(), Ok(Subject::SocialStudies));
    }

    #[test]
    fn test_indices_follow_all_order() {
        for (i, c) in Category::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
        for (i, s) in Subject::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn test_subject_serde_uses_display_label() {
        let json = serde_json::to_string(&Subject::ComputerScience).unwrap();
        assert_eq!(json, r#""computer science""#);
        let parsed: Subject = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Subject::ComputerScience);
    }

    #[test]
    fn test_unknown_label_message() {
        let err = "astrology".parse::<Subject>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown label: astrology");
    }
}
