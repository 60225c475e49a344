use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{CommentRecord, CommentTree, ContentItem, ContentKind, Subject};
use crate::services::{
    search::{paginate, parse_fields, search, Page},
    trending::{self, SubjectCount, POPULAR_ITEMS_LIMIT, POPULAR_SUBJECTS_LIMIT},
};

use super::state::{ItemPatch, NewComment, RecommendationFeed};
use super::AppState;

const DEFAULT_PAGE_SIZE: usize = 10;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub q: Option<String>,
    /// Comma separated subset of title, description, subject, category
    pub fields: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub kind: ContentKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub subject: Option<String>,
    pub author_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub item_id: String,
    pub liked: bool,
    pub likes: u32,
}

#[derive(Debug, Serialize)]
pub struct ScoredItemResponse {
    #[serde(flatten)]
    pub item: ContentItem,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub parent_id: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct CommentLikeResponse {
    pub comment_id: String,
    pub likes: u32,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub popular_subjects: Vec<SubjectCount>,
    pub popular_items: Vec<ContentItem>,
    pub created_today: Vec<ContentItem>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Search and page through items
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> AppResult<Json<Page<ContentItem>>> {
    let fields = parse_fields(query.fields.as_deref().unwrap_or(""))?;
    let inner = state.inner.read().await;

    let found: Vec<ContentItem> = search(&inner.items, query.q.as_deref().unwrap_or(""), &fields)
        .into_iter()
        .cloned()
        .collect();

    let page = paginate(
        found,
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;
    Ok(Json(page))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<ContentItem>> {
    let inner = state.inner.read().await;
    Ok(Json(inner.item(&item_id)?.clone()))
}

/// Create a new post or session
pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ContentItem>)> {
    let item = ContentItem {
        id: Uuid::new_v4().to_string(),
        kind: request.kind,
        title: request.title,
        description: request.description,
        category: request.category.and_then(|c| c.parse().ok()),
        subject: request.subject.and_then(|s| s.parse::<Subject>().ok()),
        author_id: request.author_id,
        likes: 0,
        replies: 0,
        created_at: request.created_at.unwrap_or_else(|| state.now()),
    };

    tracing::info!(item_id = %item.id, kind = ?item.kind, "Creating item");

    state.inner.write().await.insert_item(item.clone())?;
    state.schedule_refresh_all().await;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Update an item's text or labels; an unrecognized label clears it
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(request): Json<UpdateItemRequest>,
) -> AppResult<Json<ContentItem>> {
    let patch = ItemPatch {
        title: request.title,
        description: request.description,
        category: request.category.map(|c| c.parse().ok()),
        subject: request.subject.map(|s| s.parse().ok()),
    };

    let updated = state.inner.write().await.update_item(&item_id, patch)?;
    state.schedule_refresh_all().await;

    Ok(Json(updated))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<StatusCode> {
    state.inner.write().await.remove_item(&item_id)?;
    state.forget_thread(&item_id).await;
    state.schedule_refresh_all().await;

    tracing::info!(item_id = %item_id, "Deleted item");
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle the user's like on an item
pub async fn toggle_like(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> AppResult<Json<LikeResponse>> {
    let (liked, likes) = {
        let mut inner = state.inner.write().await;
        let liked = inner.toggle_like(&user_id, &item_id)?;
        (liked, inner.item(&item_id)?.likes)
    };

    tracing::info!(user_id = %user_id, item_id = %item_id, liked, "Toggled like");
    // The like counter feeds every user's popularity dimension
    state.schedule_refresh_all().await;

    Ok(Json(LikeResponse {
        item_id,
        liked,
        likes,
    }))
}

pub async fn get_likes(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<String>> {
    let mut liked: Vec<String> = state.inner.read().await.liked_by(&user_id).into_iter().collect();
    liked.sort();
    Json(liked)
}

/// Freshly computed recommendations for a user
pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<ScoredItemResponse>> {
    let scored = state.recommendations(&user_id).await;

    tracing::info!(user_id = %user_id, count = scored.len(), "Computed recommendations");

    Json(
        scored
            .into_iter()
            .map(|(item, score)| ScoredItemResponse { item, score })
            .collect(),
    )
}

/// Last debounced recommendation snapshot for a user
pub async fn get_feed(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<RecommendationFeed> {
    Json(state.feed(&user_id).await)
}

/// Nested comment thread for an item
pub async fn get_thread(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<Vec<CommentTree>>> {
    let forest: Arc<Vec<CommentTree>> = state.thread(&item_id).await?;
    Ok(Json(Vec::clone(&forest)))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentRecord>)> {
    let new = NewComment {
        parent_id: request.parent_id,
        author_id: request.author_id,
        author_name: request.author_name,
        body: request.body,
    };

    let record = state.inner.write().await.add_comment(
        &item_id,
        new,
        Uuid::new_v4().to_string(),
        state.now(),
    )?;

    tracing::info!(
        item_id = %item_id,
        comment_id = %record.id,
        reply = record.parent_id.is_some(),
        "Added comment"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn like_comment(
    State(state): State<AppState>,
    Path((item_id, comment_id)): Path<(String, String)>,
) -> AppResult<Json<CommentLikeResponse>> {
    let likes = state.inner.write().await.like_comment(&item_id, &comment_id)?;
    Ok(Json(CommentLikeResponse { comment_id, likes }))
}

/// Popular subjects, most engaged items and today's items
pub async fn get_trending(State(state): State<AppState>) -> Json<TrendingResponse> {
    let now = state.now();
    let inner = state.inner.read().await;

    Json(TrendingResponse {
        popular_subjects: trending::popular_subjects(&inner.items, POPULAR_SUBJECTS_LIMIT),
        popular_items: trending::popular_items(&inner.items, POPULAR_ITEMS_LIMIT)
            .into_iter()
            .cloned()
            .collect(),
        created_today: trending::created_within_day(&inner.items, now)
            .into_iter()
            .cloned()
            .collect(),
    })
}
