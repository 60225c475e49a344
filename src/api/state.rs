use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::error::{AppError, AppResult};
use crate::models::{Category, CommentRecord, CommentTree, ContentItem, Subject};
use crate::services::{
    clock::{Clock, SystemClock},
    debounce::Debouncer,
    recommendations,
    threads::{reply_depth, ThreadCache},
};

/// Deepest reply level a thread accepts; root comments sit at level 0
pub const MAX_REPLY_DEPTH: usize = 32;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    threads: Arc<Mutex<ThreadCache>>,
    refresher: Debouncer<String>,
    clock: Arc<dyn Clock>,
}

/// Inner state that can be modified
#[derive(Default)]
pub struct AppStateInner {
    pub items: Vec<ContentItem>,
    /// Liked item ids per user
    pub likes: HashMap<String, HashSet<String>>,
    /// Flat comment lists keyed by the item they hang off
    pub comments: HashMap<String, CommentLog>,
    /// Last debounced recommendation result per user
    pub feeds: HashMap<String, RecommendationFeed>,
    last_version: u64,
}

/// Flat comment list plus the version token the thread cache keys on
#[derive(Debug, Default)]
pub struct CommentLog {
    pub version: u64,
    pub records: Vec<CommentRecord>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecommendationFeed {
    pub items: Vec<ContentItem>,
    pub refreshing: bool,
    pub computed_at: Option<DateTime<Utc>>,
}

/// Fields a caller may change on an existing item
#[derive(Debug, Default)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Option<Category>>,
    pub subject: Option<Option<Subject>>,
}

/// A comment as submitted, before the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewComment {
    pub parent_id: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
}

impl AppStateInner {
    fn next_version(&mut self) -> u64 {
        self.last_version += 1;
        self.last_version
    }

    pub fn item(&self, id: &str) -> AppResult<&ContentItem> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Item {}", id)))
    }

    fn item_mut(&mut self, id: &str) -> AppResult<&mut ContentItem> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Item {}", id)))
    }

    pub fn insert_item(&mut self, item: ContentItem) -> AppResult<()> {
        if self.items.iter().any(|existing| existing.id == item.id) {
            return Err(AppError::InvalidInput(format!("Item {} already exists", item.id)));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn update_item(&mut self, id: &str, patch: ItemPatch) -> AppResult<ContentItem> {
        let item = self.item_mut(id)?;
        if let Some(title) = patch.title {
            item.title = title;
        }
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(category) = patch.category {
            item.category = category;
        }
        if let Some(subject) = patch.subject {
            item.subject = subject;
        }
        Ok(item.clone())
    }

    /// Removes an item along with its comments and every like pointing at it
    pub fn remove_item(&mut self, id: &str) -> AppResult<ContentItem> {
        let pos = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Item {}", id)))?;
        let removed = self.items.remove(pos);

        self.comments.remove(id);
        for liked in self.likes.values_mut() {
            liked.remove(id);
        }
        Ok(removed)
    }

    pub fn liked_by(&self, user_id: &str) -> HashSet<String> {
        self.likes.get(user_id).cloned().unwrap_or_default()
    }

    /// Flips the user's like on an item and returns whether it is now liked
    pub fn toggle_like(&mut self, user_id: &str, item_id: &str) -> AppResult<bool> {
        self.item(item_id)?;

        let liked = self.likes.entry(user_id.to_string()).or_default();
        let now_liked = if liked.remove(item_id) {
            false
        } else {
            liked.insert(item_id.to_string());
            true
        };

        self.item_mut(item_id)?.bump_likes(now_liked);
        Ok(now_liked)
    }

    /// Current version and records of an item's comment list
    pub fn comment_snapshot(&self, thread_id: &str) -> AppResult<(u64, &[CommentRecord])> {
        self.item(thread_id)?;
        Ok(self
            .comments
            .get(thread_id)
            .map(|log| (log.version, log.records.as_slice()))
            .unwrap_or_default())
    }

    /// Appends a comment to an item's thread
    ///
    /// A reply must point at a comment already in the same thread.
    pub fn add_comment(
        &mut self,
        thread_id: &str,
        new: NewComment,
        id: String,
        now: DateTime<Utc>,
    ) -> AppResult<CommentRecord> {
        if new.body.trim().is_empty() {
            return Err(AppError::InvalidInput("Comment body is empty".to_string()));
        }
        self.item(thread_id)?;

        if let Some(parent) = new.parent_id.as_deref() {
            let records = self
                .comments
                .get(thread_id)
                .map(|log| log.records.as_slice())
                .unwrap_or(&[]);
            let parent_depth = reply_depth(records, parent).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Parent comment {} is not in thread {}",
                    parent, thread_id
                ))
            })?;
            if parent_depth >= MAX_REPLY_DEPTH {
                return Err(AppError::InvalidInput(format!(
                    "Replies nest at most {} levels deep",
                    MAX_REPLY_DEPTH
                )));
            }
        }

        let record = CommentRecord {
            id,
            thread_id: thread_id.to_string(),
            parent_id: new.parent_id,
            author_id: new.author_id,
            author_name: new.author_name,
            body: new.body,
            created_at: now,
            likes: 0,
        };

        let version = self.next_version();
        let log = self.comments.entry(thread_id.to_string()).or_default();
        log.records.push(record.clone());
        log.version = version;

        let item = self.item_mut(thread_id)?;
        item.replies = item.replies.saturating_add(1);

        Ok(record)
    }

    pub fn like_comment(&mut self, thread_id: &str, comment_id: &str) -> AppResult<u32> {
        let log = self
            .comments
            .get_mut(thread_id)
            .ok_or_else(|| AppError::NotFound(format!("Thread {}", thread_id)))?;
        let comment = log
            .records
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| AppError::NotFound(format!("Comment {}", comment_id)))?;

        comment.likes = comment.likes.saturating_add(1);
        let likes = comment.likes;

        self.last_version += 1;
        log.version = self.last_version;
        Ok(likes)
    }
}

impl AppState {
    /// Creates a new empty application state on the wall clock
    pub fn new(refresh_delay: Duration) -> Self {
        Self::with_clock(refresh_delay, Arc::new(SystemClock))
    }

    pub fn with_clock(refresh_delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppStateInner::default())),
            threads: Arc::new(Mutex::new(ThreadCache::new())),
            refresher: Debouncer::new(refresh_delay),
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Scores the user's unliked items right now
    pub async fn recommendations(&self, user_id: &str) -> Vec<(ContentItem, f64)> {
        let now = self.now();
        let inner = self.inner.read().await;
        let liked = inner.liked_by(user_id);

        recommendations::rank(&inner.items, &liked, now)
            .into_iter()
            .map(|scored| (scored.item.clone(), scored.score))
            .collect()
    }

    /// Returns the comment forest for an item, reusing the cached build when
    /// the comment list has not changed since.
    pub async fn thread(&self, thread_id: &str) -> AppResult<Arc<Vec<CommentTree>>> {
        let inner = self.inner.read().await;
        let (version, records) = inner.comment_snapshot(thread_id)?;
        let mut cache = self.threads.lock().await;
        Ok(cache.get_or_build(thread_id, version, records))
    }

    pub async fn forget_thread(&self, thread_id: &str) {
        self.threads.lock().await.invalidate(thread_id);
    }

    pub async fn feed(&self, user_id: &str) -> RecommendationFeed {
        self.inner
            .read()
            .await
            .feeds
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Marks the user's feed stale and recomputes it once likes stop changing
    pub async fn schedule_refresh(&self, user_id: &str) {
        self.inner
            .write()
            .await
            .feeds
            .entry(user_id.to_string())
            .or_default()
            .refreshing = true;

        let state = self.clone();
        let user = user_id.to_string();
        self.refresher
            .schedule(user_id.to_string(), move || async move {
                state.refresh_feed(&user).await;
            })
            .await;
    }

    /// Schedules a refresh for every user who has liked something
    pub async fn schedule_refresh_all(&self) {
        let users: Vec<String> = self.inner.read().await.likes.keys().cloned().collect();
        for user in users {
            self.schedule_refresh(&user).await;
        }
    }

    pub async fn refresh_feed(&self, user_id: &str) {
        let now = self.now();
        let mut inner = self.inner.write().await;
        let liked = inner.liked_by(user_id);
        let items: Vec<ContentItem> = recommendations::recommend(&inner.items, &liked, now)
            .into_iter()
            .cloned()
            .collect();

        tracing::info!(user_id = %user_id, count = items.len(), "Refreshed recommendation feed");

        inner.feeds.insert(
            user_id.to_string(),
            RecommendationFeed {
                items,
                refreshing: false,
                computed_at: Some(now),
            },
        );
    }
}
