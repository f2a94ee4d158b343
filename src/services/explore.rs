use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::models::{ExploreCategory, ExploreFilters, MediaItem, MediaType, TrendingWindow};
use crate::services::catalog::{CatalogClient, UPSTREAM_PAGE_SIZE};
use crate::services::filters::is_compatible;
use crate::services::orchestrator::fetch_enough;
use crate::services::seen::SeenItemsProvider;
use crate::services::session::{FeedSession, FetchTicket};

/// Batch handed back to the caller after one fetch-more operation
///
/// `items` contains only newly accepted records, so the caller can append
/// them without ever re-rendering something it already has.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedBatch {
    pub items: Vec<MediaItem>,
    pub reached_end: bool,
}

/// Result of one strategy run, before the session merge
struct StrategyOutcome {
    items: Vec<MediaItem>,
    movie_pages: u32,
    tv_pages: u32,
    /// Whether this fetch exhausts the source for the active mode
    exhausts: bool,
}

/// Explore feed engine
///
/// Dispatches each fetch-more request to the strategy for the active
/// category, then merges the results into the session under the dedup and
/// stale-generation rules. The catalog and seen-items collaborators are
/// injected once at construction.
pub struct ExploreService {
    catalog: Arc<dyn CatalogClient>,
    seen: Arc<dyn SeenItemsProvider>,
    page_quota: usize,
}

impl ExploreService {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        seen: Arc<dyn SeenItemsProvider>,
        page_quota: usize,
    ) -> Self {
        Self {
            catalog,
            seen,
            page_quota,
        }
    }

    /// Loads the next batch for a session.
    ///
    /// The session is claimed before the first upstream await; a request
    /// arriving while another is in flight returns an empty batch without
    /// touching the network. Results landing after a session reset are
    /// discarded via the generation check in `FeedSession::apply`.
    pub async fn fetch_batch(
        &self,
        session: &RwLock<FeedSession>,
        category: ExploreCategory,
        filters: &ExploreFilters,
    ) -> AppResult<FeedBatch> {
        let ticket = {
            let mut session = session.write().await;
            match session.begin_fetch(category, filters.media_type) {
                Some(ticket) => ticket,
                None => {
                    tracing::debug!(session_id = %session.id(), "fetch already in flight, skipping");
                    return Ok(FeedBatch::default());
                }
            }
        };

        let outcome = self.run_strategy(category, filters, ticket).await;

        let mut session = session.write().await;
        match outcome {
            Ok(strategy) => {
                let reached_end = strategy.exhausts;
                match session.apply(
                    ticket,
                    strategy.items,
                    strategy.movie_pages,
                    strategy.tv_pages,
                    reached_end,
                ) {
                    Some(accepted) => {
                        tracing::info!(
                            session_id = %session.id(),
                            category = ?category,
                            accepted = accepted.len(),
                            reached_end,
                            "Feed batch merged"
                        );
                        Ok(FeedBatch {
                            items: accepted,
                            reached_end,
                        })
                    }
                    None => {
                        tracing::debug!(session_id = %session.id(), "Discarding stale fetch result");
                        Ok(FeedBatch::default())
                    }
                }
            }
            Err(e) => {
                if ticket.generation != session.generation() {
                    tracing::debug!(
                        session_id = %session.id(),
                        error = %e,
                        "Discarding stale fetch error"
                    );
                    return Ok(FeedBatch::default());
                }
                session.abort(ticket);
                Err(e)
            }
        }
    }

    /// Clears a session back to the empty-feed baseline
    pub async fn reset(&self, session: &RwLock<FeedSession>) {
        let mut session = session.write().await;
        tracing::debug!(session_id = %session.id(), "Resetting explore state");
        session.reset();
    }

    async fn run_strategy(
        &self,
        category: ExploreCategory,
        filters: &ExploreFilters,
        ticket: FetchTicket,
    ) -> AppResult<StrategyOutcome> {
        match category {
            ExploreCategory::Discover => {
                let quota = fetch_enough(
                    self.catalog.as_ref(),
                    filters,
                    self.page_quota,
                    ticket.movie_page,
                    ticket.tv_page,
                )
                .await?;
                Ok(StrategyOutcome {
                    items: quota.items,
                    movie_pages: quota.movie_pages,
                    tv_pages: quota.tv_pages,
                    exhausts: quota.exhausted,
                })
            }
            ExploreCategory::Trending => {
                let mut items = self.trending_merged(filters.media_type).await?;
                items.retain(|item| is_compatible(item, &filters.ratings, &filters.genres));
                items.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
                // The upstream trending list is not meaningfully paginated,
                // one batch is all there is.
                Ok(StrategyOutcome {
                    items,
                    movie_pages: 0,
                    tv_pages: 0,
                    exhausts: true,
                })
            }
            ExploreCategory::Favorites | ExploreCategory::Classics => {
                self.ranked_page(category, filters, ticket).await
            }
            ExploreCategory::Recommended => self.recommended(filters).await,
        }
    }

    /// Trending batch for the filtered media type, or both types merged
    async fn trending_merged(&self, media_type: Option<MediaType>) -> AppResult<Vec<MediaItem>> {
        match media_type {
            Some(media_type) => self.catalog.trending(media_type, TrendingWindow::Week).await,
            None => {
                let mut items = self
                    .catalog
                    .trending(MediaType::Movie, TrendingWindow::Week)
                    .await?;
                items.extend(
                    self.catalog
                        .trending(MediaType::Tv, TrendingWindow::Week)
                        .await?,
                );
                Ok(items)
            }
        }
    }

    /// One upstream page per wanted media type, ranked by vote average.
    ///
    /// Favorites and classics accept the upstream page size as-is instead of
    /// seeking a quota; a short page marks the mode exhausted.
    async fn ranked_page(
        &self,
        category: ExploreCategory,
        filters: &ExploreFilters,
        ticket: FetchTicket,
    ) -> AppResult<StrategyOutcome> {
        let wanted: &[MediaType] = match filters.media_type {
            Some(MediaType::Movie) => &[MediaType::Movie],
            Some(MediaType::Tv) => &[MediaType::Tv],
            None => &[MediaType::Movie, MediaType::Tv],
        };

        let mut items = Vec::new();
        let mut movie_pages = 0;
        let mut tv_pages = 0;
        let mut exhausts = false;

        for &media_type in wanted {
            let page = match media_type {
                MediaType::Movie => ticket.movie_page,
                MediaType::Tv => ticket.tv_page,
            };
            let batch = match category {
                ExploreCategory::Favorites => self.catalog.top_rated(media_type, page).await?,
                _ => self.catalog.classics(media_type, page).await?,
            };
            if batch.len() < UPSTREAM_PAGE_SIZE {
                exhausts = true;
            }
            match media_type {
                MediaType::Movie => movie_pages = 1,
                MediaType::Tv => tv_pages = 1,
            }
            items.extend(batch);
        }

        items.retain(|item| is_compatible(item, &filters.ratings, &filters.genres));
        items.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average));

        Ok(StrategyOutcome {
            items,
            movie_pages,
            tv_pages,
            exhausts,
        })
    }

    /// Recommendations seeded from a random seen item, or merged trending
    /// movies+TV when the user has no history yet
    async fn recommended(&self, filters: &ExploreFilters) -> AppResult<StrategyOutcome> {
        let history = self.seen.seen_items().await?;

        let mut items = if history.is_empty() {
            tracing::debug!("No seen history, falling back to trending");
            self.trending_merged(None).await?
        } else {
            let seed = history[rand::rng().random_range(0..history.len())];
            tracing::debug!(seed = %seed, "Seeding recommendations from seen history");
            self.catalog
                .recommendations_for(seed.id, seed.media_type)
                .await?
        };

        items.retain(|item| is_compatible(item, &filters.ratings, &filters.genres));
        items.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));

        Ok(StrategyOutcome {
            items,
            movie_pages: 0,
            tv_pages: 0,
            exhausts: true,
        })
    }
}
