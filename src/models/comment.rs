use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A flat comment as held by the store
///
/// `parent_id` of `None` marks a root-level comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentRecord {
    pub id: String,
    pub thread_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u32,
}

impl CommentRecord {
    pub fn new(
        id: impl Into<String>,
        thread_id: impl Into<String>,
        parent_id: Option<&str>,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            thread_id: thread_id.into(),
            parent_id: parent_id.map(str::to_string),
            author_id: String::new(),
            author_name: String::new(),
            body: body.into(),
            created_at,
            likes: 0,
        }
    }

    pub fn with_author(mut self, author_id: impl Into<String>, author_name: impl Into<String>) -> Self {
        self.author_id = author_id.into();
        self.author_name = author_name.into();
        self
    }
}

/// A comment together with its nested replies
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommentTree {
    #[serde(flatten)]
    pub comment: CommentRecord,
    pub children: Vec<CommentTree>,
}

impl CommentTree {
    /// Total number of nodes in this subtree, including itself
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// The derived drop glue recurses once per reply level.
impl Drop for CommentTree {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}
