/// TMDB catalog provider
///
/// Thin fetch-and-map wrappers over the TMDB v3 REST API. Every list
/// endpoint returns `CatalogPage`-shaped JSON; responses are mapped to
/// `MediaItem`s with the requested media type stamped on, and cached in
/// Redis under typed keys with per-endpoint TTLs.
use std::collections::HashSet;

use reqwest::Client as HttpClient;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{CatalogPage, MediaItem, MediaType, TrendingWindow},
    services::catalog::CatalogClient,
};

const DISCOVER_CACHE_TTL: u64 = 3600; // 1 hour
const TRENDING_CACHE_TTL: u64 = 1800; // 30 minutes
const RANKED_CACHE_TTL: u64 = 86400; // 1 day
const RECS_CACHE_TTL: u64 = 604800; // 1 week
const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour

/// Titles released up to this date count as classics
const CLASSICS_RELEASE_CEILING: &str = "1999-12-31";

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbCatalog {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    /// Performs one GET against the catalog and parses the page envelope
    async fn fetch_page(&self, path: &str, query: &[(&str, String)]) -> AppResult<CatalogPage> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::CatalogApi(format!(
                "Catalog API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Joins certification filters for the upstream query, sorted so equal
    /// filter sets produce equal cache keys. The `""` all-ratings
    /// placeholder is excluded.
    fn certification_param(ratings: &HashSet<String>) -> String {
        let mut codes: Vec<&str> = ratings
            .iter()
            .map(String::as_str)
            .filter(|r| !r.is_empty())
            .collect();
        codes.sort_unstable();
        codes.join("|")
    }

    /// Joins genre filters ("|" = any-of upstream), sorted for cache keys
    fn genres_param(genres: &HashSet<i32>) -> String {
        let mut ids: Vec<i32> = genres.iter().copied().collect();
        ids.sort_unstable();
        ids.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Release-date query field, which TMDB names differently per media type
    fn release_date_field(media_type: MediaType) -> &'static str {
        match media_type {
            MediaType::Movie => "primary_release_date.lte",
            MediaType::Tv => "first_air_date.lte",
        }
    }
}

#[async_trait::async_trait]
impl CatalogClient for TmdbCatalog {
    async fn discover(
        &self,
        media_type: MediaType,
        ratings: &HashSet<String>,
        page: u32,
        genres: &HashSet<i32>,
    ) -> AppResult<Vec<MediaItem>> {
        let certification = Self::certification_param(ratings);
        let genre_filter = Self::genres_param(genres);
        let key = CacheKey::DiscoverPage {
            media_type,
            page,
            certification: certification.clone(),
            genres: genre_filter.clone(),
        };

        cached!(self.cache, key, DISCOVER_CACHE_TTL, async {
            let mut query = vec![
                ("include_adult", "false".to_string()),
                ("sort_by", "popularity.desc".to_string()),
                ("vote_count.gte", "100".to_string()),
                ("page", page.to_string()),
            ];
            if !certification.is_empty() {
                query.push(("certification_country", "US".to_string()));
                query.push(("certification", certification.clone()));
            }
            if !genre_filter.is_empty() {
                query.push(("with_genres", genre_filter.clone()));
            }

            let fetched = self
                .fetch_page(&format!("/discover/{}", media_type), &query)
                .await?;
            let items: Vec<MediaItem> = fetched
                .results
                .into_iter()
                .map(|entry| entry.into_item(media_type))
                .collect();

            tracing::debug!(
                media_type = %media_type,
                page,
                results = items.len(),
                "Discover page fetched"
            );

            Ok::<_, AppError>(items)
        })
    }

    async fn trending(
        &self,
        media_type: MediaType,
        window: TrendingWindow,
    ) -> AppResult<Vec<MediaItem>> {
        let key = CacheKey::Trending { media_type, window };

        cached!(self.cache, key, TRENDING_CACHE_TTL, async {
            let fetched = self
                .fetch_page(
                    &format!("/trending/{}/{}", media_type, window.as_str()),
                    &[],
                )
                .await?;
            let items: Vec<MediaItem> = fetched
                .results
                .into_iter()
                .map(|entry| entry.into_item(media_type))
                .collect();

            tracing::debug!(
                media_type = %media_type,
                window = window.as_str(),
                results = items.len(),
                "Trending batch fetched"
            );

            Ok::<_, AppError>(items)
        })
    }

    async fn top_rated(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaItem>> {
        let key = CacheKey::TopRated { media_type, page };

        cached!(self.cache, key, RANKED_CACHE_TTL, async {
            let fetched = self
                .fetch_page(
                    &format!("/{}/top_rated", media_type),
                    &[("page", page.to_string())],
                )
                .await?;
            let items: Vec<MediaItem> = fetched
                .results
                .into_iter()
                .map(|entry| entry.into_item(media_type))
                .collect();

            tracing::debug!(media_type = %media_type, page, results = items.len(), "Top-rated page fetched");

            Ok::<_, AppError>(items)
        })
    }

    async fn classics(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaItem>> {
        let key = CacheKey::Classics { media_type, page };

        cached!(self.cache, key, RANKED_CACHE_TTL, async {
            let query = vec![
                ("include_adult", "false".to_string()),
                ("sort_by", "vote_average.desc".to_string()),
                ("vote_count.gte", "1000".to_string()),
                (
                    Self::release_date_field(media_type),
                    CLASSICS_RELEASE_CEILING.to_string(),
                ),
                ("page", page.to_string()),
            ];

            let fetched = self
                .fetch_page(&format!("/discover/{}", media_type), &query)
                .await?;
            let items: Vec<MediaItem> = fetched
                .results
                .into_iter()
                .map(|entry| entry.into_item(media_type))
                .collect();

            tracing::debug!(media_type = %media_type, page, results = items.len(), "Classics page fetched");

            Ok::<_, AppError>(items)
        })
    }

    async fn recommendations_for(
        &self,
        id: u64,
        media_type: MediaType,
    ) -> AppResult<Vec<MediaItem>> {
        let key = CacheKey::Recommendations { media_type, id };

        cached!(self.cache, key, RECS_CACHE_TTL, async {
            let fetched = self
                .fetch_page(&format!("/{}/{}/recommendations", media_type, id), &[])
                .await?;
            let items: Vec<MediaItem> = fetched
                .results
                .into_iter()
                .map(|entry| entry.into_item(media_type))
                .collect();

            tracing::debug!(
                seed_id = id,
                media_type = %media_type,
                results = items.len(),
                "Recommendations fetched"
            );

            Ok::<_, AppError>(items)
        })
    }

    async fn search(
        &self,
        query: &str,
        media_type: Option<MediaType>,
    ) -> AppResult<Vec<MediaItem>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let key = CacheKey::Search {
            media_type,
            query: query.to_string(),
        };

        cached!(self.cache, key, SEARCH_CACHE_TTL, async {
            let scope = media_type.map(|m| m.as_str()).unwrap_or("multi");
            let params = vec![
                ("query", query.to_string()),
                ("include_adult", "false".to_string()),
            ];

            let fetched = self
                .fetch_page(&format!("/search/{}", scope), &params)
                .await?;

            // Multi-search mixes in people; keep only entries that resolve
            // to a media type.
            let items: Vec<MediaItem> = fetched
                .results
                .into_iter()
                .filter_map(|entry| {
                    let stamped = media_type.or_else(|| entry.own_media_type())?;
                    Some(entry.into_item(stamped))
                })
                .collect();

            tracing::info!(query = %query, results = items.len(), "Title search completed");

            Ok::<_, AppError>(items)
        })
    }
}
