use std::collections::HashSet;

/// Catalog query abstraction
///
/// The remote catalog API is consumed through this narrow interface: paged
/// discovery, unpaginated trending, ranked lists, seeded recommendations,
/// and title search. The feed engine never sees URLs or wire formats.
use crate::{
    error::AppResult,
    models::{MediaItem, MediaType, TrendingWindow},
};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

/// Page size of the catalog's paginated list endpoints. A response shorter
/// than this signals the source is at or near exhaustion.
pub const UPSTREAM_PAGE_SIZE: usize = 20;

/// Trait for catalog data sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// One page of filter-driven discovery, ordered by popularity.
    ///
    /// Certification and genre filters are applied server-side where the
    /// upstream supports them; the caller still re-checks compatibility
    /// because list responses omit certification data.
    async fn discover(
        &self,
        media_type: MediaType,
        ratings: &HashSet<String>,
        page: u32,
        genres: &HashSet<i32>,
    ) -> AppResult<Vec<MediaItem>>;

    /// Single unpaginated trending batch for a time window
    async fn trending(
        &self,
        media_type: MediaType,
        window: TrendingWindow,
    ) -> AppResult<Vec<MediaItem>>;

    /// One page of the all-time top-rated list
    async fn top_rated(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaItem>>;

    /// One page of highly rated pre-2000 titles
    async fn classics(&self, media_type: MediaType, page: u32) -> AppResult<Vec<MediaItem>>;

    /// Single batch of recommendations seeded by one item
    async fn recommendations_for(
        &self,
        id: u64,
        media_type: MediaType,
    ) -> AppResult<Vec<MediaItem>>;

    /// Title search; `None` searches both media types at once
    async fn search(
        &self,
        query: &str,
        media_type: Option<MediaType>,
    ) -> AppResult<Vec<MediaItem>>;
}
