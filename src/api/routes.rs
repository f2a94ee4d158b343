use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{attach_request_id, make_span_with_request_id};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Explore feed
        .route("/explore/feed", get(handlers::fetch_feed))
        .route("/explore/reset", post(handlers::reset_feed))
        // Watch-Now shelves
        .route("/home/shelves", get(handlers::home_shelves))
        // Search
        .route("/search", get(handlers::search_titles))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(attach_request_id))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
