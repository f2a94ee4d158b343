use std::collections::HashSet;
use std::sync::Arc;

use axum_test::TestServer;
use serde_json::Value;

use marquee_api::api::{create_router, AppState};
use marquee_api::error::AppResult;
use marquee_api::models::{MediaId, MediaItem, MediaType, TrendingWindow};
use marquee_api::services::catalog::{CatalogClient, UPSTREAM_PAGE_SIZE};
use marquee_api::services::explore::ExploreService;
use marquee_api::services::seen::SeenItemsProvider;

const PAGES_PER_TYPE: u32 = 3;

fn page_of(media_type: MediaType, first_id: u64, count: usize) -> Vec<MediaItem> {
    // TV sits half a point above the movie with the same index so combined
    // batches sort into an interleaving of both types
    let bias = match media_type {
        MediaType::Movie => 0.0,
        MediaType::Tv => 0.5,
    };
    (0..count as u64)
        .map(|offset| {
            let id = first_id + offset;
            MediaItem {
                id,
                media_type,
                title: format!("{} {}", media_type, id),
                popularity: 100_000.0 - (id % 10_000) as f64 + bias,
                vote_average: 7.0,
                certification: None,
                genre_ids: vec![18],
                poster_path: None,
                backdrop_path: None,
                release_date: None,
            }
        })
        .collect()
}

/// Deterministic catalog: three full discover pages per media type, then a
/// short page; small fixed trending/search batches.
struct FakeCatalog;

impl FakeCatalog {
    fn type_offset(media_type: MediaType) -> u64 {
        match media_type {
            MediaType::Movie => 0,
            MediaType::Tv => 10_000,
        }
    }
}

#[async_trait::async_trait]
impl CatalogClient for FakeCatalog {
    async fn discover(
        &self,
        media_type: MediaType,
        _ratings: &HashSet<String>,
        page: u32,
        _genres: &HashSet<i32>,
    ) -> AppResult<Vec<MediaItem>> {
        if page <= PAGES_PER_TYPE {
            let first_id = Self::type_offset(media_type) + page as u64 * 100;
            Ok(page_of(media_type, first_id, UPSTREAM_PAGE_SIZE))
        } else {
            Ok(vec![])
        }
    }

    async fn trending(
        &self,
        media_type: MediaType,
        _window: TrendingWindow,
    ) -> AppResult<Vec<MediaItem>> {
        Ok(page_of(media_type, Self::type_offset(media_type), 5))
    }

    async fn top_rated(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaItem>> {
        self.discover(media_type, &HashSet::new(), page, &HashSet::new())
            .await
    }

    async fn classics(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaItem>> {
        self.discover(media_type, &HashSet::new(), page, &HashSet::new())
            .await
    }

    async fn recommendations_for(
        &self,
        id: u64,
        media_type: MediaType,
    ) -> AppResult<Vec<MediaItem>> {
        Ok(page_of(media_type, id + 1, 4))
    }

    async fn search(
        &self,
        query: &str,
        media_type: Option<MediaType>,
    ) -> AppResult<Vec<MediaItem>> {
        let media_type = media_type.unwrap_or(MediaType::Movie);
        if query == "matrix" {
            Ok(page_of(media_type, 603, 3))
        } else {
            Ok(vec![])
        }
    }
}

struct FakeSeen;

#[async_trait::async_trait]
impl SeenItemsProvider for FakeSeen {
    async fn seen_items(&self) -> AppResult<Vec<MediaId>> {
        Ok(vec![])
    }
}

fn create_test_server() -> TestServer {
    let catalog: Arc<dyn CatalogClient> = Arc::new(FakeCatalog);
    let seen: Arc<dyn SeenItemsProvider> = Arc::new(FakeSeen);
    let explore = Arc::new(ExploreService::new(catalog.clone(), seen, 20));
    let state = AppState::new(catalog, explore);
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_feed_returns_quota_and_session_id() {
    let server = create_test_server();

    let response = server.get("/explore/feed").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 20);
    assert_eq!(body["reached_end"], false);
    assert!(body["session_id"].as_str().is_some());
    assert_eq!(body["phase"], "idle");
}

#[tokio::test]
async fn test_consecutive_pages_never_overlap() {
    let server = create_test_server();

    let first: Value = server.get("/explore/feed").await.json();
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let second: Value = server
        .get("/explore/feed")
        .add_query_param("session_id", &session_id)
        .await
        .json();

    assert_eq!(second["session_id"].as_str().unwrap(), session_id);

    let ids = |body: &Value| -> Vec<(String, u64)> {
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| {
                (
                    item["media_type"].as_str().unwrap().to_string(),
                    item["id"].as_u64().unwrap(),
                )
            })
            .collect()
    };

    let first_ids = ids(&first);
    let second_ids = ids(&second);
    assert_eq!(second_ids.len(), 20);
    for id in &second_ids {
        assert!(!first_ids.contains(id), "duplicate item across pages: {:?}", id);
    }
}

#[tokio::test]
async fn test_feed_exhausts_and_restarts() {
    let server = create_test_server();

    let first: Value = server.get("/explore/feed").await.json();
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let mut unique: HashSet<(String, u64)> = HashSet::new();
    for item in first["items"].as_array().unwrap() {
        assert!(unique.insert((
            item["media_type"].as_str().unwrap().to_string(),
            item["id"].as_u64().unwrap(),
        )));
    }

    // Keep paging until the catalog runs dry; nothing may repeat on the way
    let mut reached_end = false;
    for _ in 0..10 {
        let body: Value = server
            .get("/explore/feed")
            .add_query_param("session_id", &session_id)
            .await
            .json();
        for item in body["items"].as_array().unwrap() {
            assert!(unique.insert((
                item["media_type"].as_str().unwrap().to_string(),
                item["id"].as_u64().unwrap(),
            )));
        }
        if body["reached_end"] == true {
            reached_end = true;
            break;
        }
    }

    assert!(reached_end);

    // After exhaustion the next request restarts from page 1; the catalog
    // serves the same content, so dedup accepts nothing new.
    let body: Value = server
        .get("/explore/feed")
        .add_query_param("session_id", &session_id)
        .await
        .json();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["reached_end"], false);
}

#[tokio::test]
async fn test_feed_rejects_bad_genre_ids() {
    let server = create_test_server();
    let response = server
        .get("/explore/feed")
        .add_query_param("genres", "28,horror")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_returns_feed_to_baseline() {
    let server = create_test_server();

    let first: Value = server.get("/explore/feed").await.json();
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let response = server
        .post("/explore/reset")
        .json(&serde_json::json!({ "session_id": session_id }))
        .await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    // The same items are acceptable again after the reset
    let again: Value = server
        .get("/explore/feed")
        .add_query_param("session_id", &session_id)
        .await
        .json();
    assert_eq!(again["items"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_reset_unknown_session_is_not_found() {
    let server = create_test_server();
    let response = server
        .post("/explore/reset")
        .json(&serde_json::json!({
            "session_id": "00000000-0000-0000-0000-000000000000"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trending_category_reaches_end_immediately() {
    let server = create_test_server();

    let body: Value = server
        .get("/explore/feed")
        .add_query_param("category", "trending")
        .await
        .json();

    assert_eq!(body["items"].as_array().unwrap().len(), 10);
    assert_eq!(body["reached_end"], true);
    assert_eq!(body["phase"], "exhausted");
}

#[tokio::test]
async fn test_home_shelves() {
    let server = create_test_server();

    let response = server.get("/home/shelves").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["trending_movies"].as_array().unwrap().len(), 5);
    assert_eq!(body["trending_shows"].as_array().unwrap().len(), 5);
    assert_eq!(body["new_releases"].as_array().unwrap().len(), 5);
    assert!(body["hero"].is_object());
}

#[tokio::test]
async fn test_search_titles() {
    let server = create_test_server();

    let response = server
        .get("/search")
        .add_query_param("q", "matrix")
        .await;
    response.assert_status_ok();

    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["id"], 603);
}
