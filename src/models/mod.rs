use std::collections::HashSet;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Media kind served by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment used by the catalog API ("movie" or "tv")
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity key for a media record across all fetch sources
///
/// Catalog ids are only unique within a media type; movie 603 and tv 603
/// are different records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaId {
    pub media_type: MediaType,
    pub id: u64,
}

impl Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.media_type, self.id)
    }
}

/// A discovered media record
///
/// Immutable once fetched; the feed engine only copies and reorders these,
/// it never edits fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    /// US age certification; `None` when the upstream response carries none
    #[serde(default)]
    pub certification: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
}

impl MediaItem {
    pub fn identity(&self) -> MediaId {
        MediaId {
            media_type: self.media_type,
            id: self.id,
        }
    }
}

/// Explore feed category modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExploreCategory {
    /// Filter-driven discovery, the default mode
    #[default]
    Discover,
    Trending,
    /// Top-rated titles
    Favorites,
    Classics,
    /// Seeded from a random item in the user's seen history
    Recommended,
}

/// Time window for trending queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendingWindow {
    Day,
    Week,
}

impl TrendingWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingWindow::Day => "day",
            TrendingWindow::Week => "week",
        }
    }
}

/// Active filters for a feed request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExploreFilters {
    /// `None` means both movies and TV
    pub media_type: Option<MediaType>,
    /// Certification codes; empty or containing `""` means all ratings
    pub ratings: HashSet<String>,
    /// Genre ids; empty means all genres
    pub genres: HashSet<i32>,
}

// ============================================================================
// Catalog API wire types
// ============================================================================

/// One page of results from the catalog API
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<CatalogEntry>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Raw list entry from the catalog API
///
/// Movies carry `title`/`release_date`, TV carries `name`/`first_air_date`;
/// multi-search entries also carry their own `media_type`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

impl CatalogEntry {
    /// Converts a raw entry into a `MediaItem`, stamping the media type the
    /// request was made for (list endpoints omit it).
    pub fn into_item(self, media_type: MediaType) -> MediaItem {
        MediaItem {
            id: self.id,
            media_type,
            title: self.title.or(self.name).unwrap_or_default(),
            popularity: self.popularity.unwrap_or(0.0),
            vote_average: self.vote_average.unwrap_or(0.0),
            certification: None,
            genre_ids: self.genre_ids,
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            release_date: self.release_date.or(self.first_air_date),
        }
    }

    /// Media type claimed by the entry itself (multi-search), if recognised
    pub fn own_media_type(&self) -> Option<MediaType> {
        match self.media_type.as_deref() {
            Some("movie") => Some(MediaType::Movie),
            Some("tv") => Some(MediaType::Tv),
            _ => None,
        }
    }
}
