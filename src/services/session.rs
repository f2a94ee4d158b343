use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{ExploreCategory, MediaId, MediaItem, MediaType};

/// Lifecycle phase of a feed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    Idle,
    Loading,
    Exhausted,
}

/// Claim handed out when a fetch is started
///
/// Carries the cursors to fetch from and the generation the results must be
/// applied under. A session reset bumps the generation, so a ticket issued
/// before the reset can no longer mutate the session.
#[derive(Debug, Clone, Copy)]
pub struct FetchTicket {
    pub generation: u64,
    pub movie_page: u32,
    pub tv_page: u32,
}

/// Mutable state of one explore feed
///
/// One instance per explore-tab activation. All mutation goes through
/// `begin_fetch` / `apply` / `abort` / `reset`; the cursors and caches are
/// not reachable for writing from anywhere else.
#[derive(Debug)]
pub struct FeedSession {
    id: Uuid,
    generation: u64,
    phase: FeedPhase,
    movie_page: u32,
    tv_page: u32,
    active_mode: Option<(ExploreCategory, Option<MediaType>)>,
    seen_identities: HashSet<MediaId>,
    cached_feed: Vec<MediaItem>,
}

impl Default for FeedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            generation: 0,
            phase: FeedPhase::Idle,
            movie_page: 1,
            tv_page: 1,
            active_mode: None,
            seen_identities: HashSet::new(),
            cached_feed: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn movie_page(&self) -> u32 {
        self.movie_page
    }

    pub fn tv_page(&self) -> u32 {
        self.tv_page
    }

    /// Full accumulated result set for the session, in fetch/merge order
    pub fn cached_feed(&self) -> &[MediaItem] {
        &self.cached_feed
    }

    /// Returns the session to the empty-feed baseline.
    ///
    /// Cursors back to 1, caches and the identity set cleared, phase `Idle`.
    /// Bumps the generation so any in-flight fetch lands stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = FeedPhase::Idle;
        self.movie_page = 1;
        self.tv_page = 1;
        self.active_mode = None;
        self.seen_identities.clear();
        self.cached_feed.clear();
    }

    /// Claims the session for one fetch-more operation.
    ///
    /// Returns `None` while a fetch is already in flight (the caller must
    /// treat that as a silent no-op). A category or media-type change since
    /// the previous fetch forces a full reset first; a session left
    /// `Exhausted` restarts its cursors at 1 instead.
    pub fn begin_fetch(
        &mut self,
        category: ExploreCategory,
        media_type: Option<MediaType>,
    ) -> Option<FetchTicket> {
        if self.phase == FeedPhase::Loading {
            return None;
        }

        let mode = (category, media_type);
        if self.active_mode.is_some_and(|active| active != mode) {
            tracing::debug!(session_id = %self.id, "mode changed, resetting feed session");
            self.reset();
        }

        if self.phase == FeedPhase::Exhausted {
            tracing::debug!(session_id = %self.id, "restarting exhausted session from page 1");
            self.movie_page = 1;
            self.tv_page = 1;
        }

        self.phase = FeedPhase::Loading;
        self.active_mode = Some(mode);

        Some(FetchTicket {
            generation: self.generation,
            movie_page: self.movie_page,
            tv_page: self.tv_page,
        })
    }

    /// Applies the outcome of a completed fetch.
    ///
    /// Returns the newly accepted (non-duplicate) items, or `None` when the
    /// ticket is stale because the session was reset while the fetch was in
    /// flight. A stale result must be discarded without touching anything.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        items: Vec<MediaItem>,
        movie_pages: u32,
        tv_pages: u32,
        exhausted: bool,
    ) -> Option<Vec<MediaItem>> {
        if ticket.generation != self.generation {
            return None;
        }

        self.movie_page += movie_pages;
        self.tv_page += tv_pages;
        let accepted = self.merge_into_feed(items);
        self.phase = if exhausted {
            FeedPhase::Exhausted
        } else {
            FeedPhase::Idle
        };

        Some(accepted)
    }

    /// Releases the loading claim after a failed fetch.
    ///
    /// Cursors stay where they were so a retry resumes from the same point.
    /// Stale tickets are ignored.
    pub fn abort(&mut self, ticket: FetchTicket) {
        if ticket.generation == self.generation {
            self.phase = FeedPhase::Idle;
        }
    }

    /// Merges a batch into the feed, dropping identities already present.
    ///
    /// Accepted items are appended to the cached feed and returned in input
    /// order; the cached feed is never re-sorted. Membership is O(1) per
    /// item, and an identity stays claimed for the whole session lifetime,
    /// so an item resurfacing from an overlapping source or after a cursor
    /// restart is dropped.
    pub fn merge_into_feed(&mut self, items: Vec<MediaItem>) -> Vec<MediaItem> {
        let mut accepted = Vec::with_capacity(items.len());
        for item in items {
            if self.seen_identities.insert(item.identity()) {
                self.cached_feed.push(item.clone());
                accepted.push(item);
            }
        }
        accepted
    }
}
