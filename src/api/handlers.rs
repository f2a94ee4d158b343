use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ExploreCategory, ExploreFilters, MediaItem, MediaType};
use crate::services::home::{self, HomeShelves};
use crate::services::session::FeedPhase;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Omitted on the first request; the response returns the assigned id
    pub session_id: Option<Uuid>,
    #[serde(default)]
    pub category: ExploreCategory,
    pub media_type: Option<MediaType>,
    /// Comma-separated certification codes
    pub ratings: Option<String>,
    /// Comma-separated genre ids
    pub genres: Option<String>,
}

impl FeedQuery {
    fn filters(&self) -> AppResult<ExploreFilters> {
        Ok(ExploreFilters {
            media_type: self.media_type,
            ratings: parse_ratings(self.ratings.as_deref()),
            genres: parse_genres(self.genres.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub session_id: Uuid,
    /// Newly accepted items only, ready to append
    pub items: Vec<MediaItem>,
    pub reached_end: bool,
    pub phase: FeedPhase,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ShelvesQuery {
    pub ratings: Option<String>,
    pub genres: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub media_type: Option<MediaType>,
}

fn parse_ratings(raw: Option<&str>) -> HashSet<String> {
    raw.map(|value| value.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default()
}

fn parse_genres(raw: Option<&str>) -> AppResult<HashSet<i32>> {
    let Some(raw) = raw else {
        return Ok(HashSet::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| AppError::InvalidInput(format!("Invalid genre id: {}", s)))
        })
        .collect()
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Loads the next explore feed batch for a session
pub async fn fetch_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedQuery>,
) -> AppResult<Json<FeedResponse>> {
    let filters = params.filters()?;
    let session = state.session(params.session_id).await;

    let batch = state
        .explore
        .fetch_batch(&session, params.category, &filters)
        .await?;

    let session = session.read().await;
    Ok(Json(FeedResponse {
        session_id: session.id(),
        items: batch.items,
        reached_end: batch.reached_end,
        phase: session.phase(),
    }))
}

/// Clears a session's feed back to the empty baseline
pub async fn reset_feed(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> AppResult<StatusCode> {
    let Some(session) = state.get_session(request.session_id).await else {
        return Err(AppError::NotFound(format!(
            "Unknown session {}",
            request.session_id
        )));
    };

    state.explore.reset(&session).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Watch-Now shelves: trending rows plus a hero pick
pub async fn home_shelves(
    State(state): State<AppState>,
    Query(params): Query<ShelvesQuery>,
) -> AppResult<Json<HomeShelves>> {
    let ratings = parse_ratings(params.ratings.as_deref());
    let genres = parse_genres(params.genres.as_deref())?;

    let shelves = home::fetch_shelves(state.catalog.as_ref(), &ratings, &genres).await?;
    Ok(Json(shelves))
}

/// Title search across the catalog
pub async fn search_titles(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<MediaItem>>> {
    let items = state.catalog.search(&params.q, params.media_type).await?;
    Ok(Json(items))
}
