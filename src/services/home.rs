use std::collections::HashSet;

use serde::Serialize;

use crate::error::AppResult;
use crate::models::{MediaItem, MediaType, TrendingWindow};
use crate::services::catalog::CatalogClient;
use crate::services::filters::is_compatible;

/// Watch-Now shelf content: three trending rows plus a hero pick
#[derive(Debug, Clone, Serialize)]
pub struct HomeShelves {
    pub hero: Option<MediaItem>,
    pub trending_movies: Vec<MediaItem>,
    pub trending_shows: Vec<MediaItem>,
    pub new_releases: Vec<MediaItem>,
}

/// Assembles the Watch-Now shelves.
///
/// Each row is rating/genre-filtered. The hero is the first filtered
/// trending movie, falling back to the first unfiltered one so the section
/// still renders while strict filters empty the row.
pub async fn fetch_shelves(
    catalog: &dyn CatalogClient,
    ratings: &HashSet<String>,
    genres: &HashSet<i32>,
) -> AppResult<HomeShelves> {
    let weekly_movies = catalog
        .trending(MediaType::Movie, TrendingWindow::Week)
        .await?;
    let weekly_shows = catalog.trending(MediaType::Tv, TrendingWindow::Week).await?;
    let daily_movies = catalog
        .trending(MediaType::Movie, TrendingWindow::Day)
        .await?;

    let keep = |items: &[MediaItem]| -> Vec<MediaItem> {
        items
            .iter()
            .filter(|item| is_compatible(item, ratings, genres))
            .cloned()
            .collect()
    };

    let trending_movies = keep(&weekly_movies);
    let hero = trending_movies
        .first()
        .or_else(|| weekly_movies.first())
        .cloned();

    let shelves = HomeShelves {
        hero,
        trending_movies,
        trending_shows: keep(&weekly_shows),
        new_releases: keep(&daily_movies),
    };

    tracing::debug!(
        trending_movies = shelves.trending_movies.len(),
        trending_shows = shelves.trending_shows.len(),
        new_releases = shelves.new_releases.len(),
        "Watch-Now shelves assembled"
    );

    Ok(shelves)
}
