use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Posts and sessions
        .route("/items", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/items/:item_id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        // Likes and recommendations
        .route("/users/:user_id/likes", get(handlers::get_likes))
        .route("/users/:user_id/likes/:item_id", post(handlers::toggle_like))
        .route("/users/:user_id/recommendations", get(handlers::get_recommendations))
        .route("/users/:user_id/feed", get(handlers::get_feed))
        // Comment threads
        .route("/threads/:item_id", get(handlers::get_thread))
        .route("/threads/:item_id/comments", post(handlers::create_comment))
        .route(
            "/threads/:item_id/comments/:comment_id/like",
            post(handlers::like_comment),
        )
        .route("/trending", get(handlers::get_trending))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
