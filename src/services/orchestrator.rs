use crate::error::AppResult;
use crate::models::{ExploreFilters, MediaItem, MediaType};
use crate::services::catalog::{CatalogClient, UPSTREAM_PAGE_SIZE};
use crate::services::filters::is_compatible;

/// Result of one quota-seeking fetch round
#[derive(Debug, Default)]
pub struct QuotaOutcome {
    /// Compatible items, popularity-descending, at most `desired` of them
    pub items: Vec<MediaItem>,
    /// Upstream movie pages consumed; the caller advances its cursor by this
    pub movie_pages: u32,
    /// Upstream TV pages consumed
    pub tv_pages: u32,
    /// True when any consulted source returned a short page
    pub exhausted: bool,
}

/// Accumulated pages for a single media type
struct TypeRun {
    items: Vec<MediaItem>,
    pages: u32,
    exhausted: bool,
}

/// Fetches discover pages until `desired` filter-compatible items are
/// gathered or the sources run dry.
///
/// With a specific media type, successive pages are fetched from
/// `movie_start`/`tv_start` for that type alone. With `media_type` unset the
/// quota is split half and half (movies get the odd item); if one type runs
/// dry before covering its half, a single supplemental round from the other
/// type covers the shortfall, continuing from that type's already-advanced
/// cursor. When both types are dry no further rounds are attempted, so a
/// globally exhausted catalog cannot cause unbounded refetching.
pub async fn fetch_enough(
    catalog: &dyn CatalogClient,
    filters: &ExploreFilters,
    desired: usize,
    movie_start: u32,
    tv_start: u32,
) -> AppResult<QuotaOutcome> {
    match filters.media_type {
        Some(MediaType::Movie) => {
            let run = fetch_type(catalog, MediaType::Movie, filters, desired, movie_start).await?;
            Ok(finish(run.items, run.pages, 0, run.exhausted, desired))
        }
        Some(MediaType::Tv) => {
            let run = fetch_type(catalog, MediaType::Tv, filters, desired, tv_start).await?;
            Ok(finish(run.items, 0, run.pages, run.exhausted, desired))
        }
        None => {
            let movie_target = desired.div_ceil(2);
            let tv_target = desired - movie_target;

            let mut movies =
                fetch_type(catalog, MediaType::Movie, filters, movie_target, movie_start).await?;
            let mut tv = fetch_type(catalog, MediaType::Tv, filters, tv_target, tv_start).await?;

            let total = movies.items.len() + tv.items.len();
            if total < desired {
                let shortfall = desired - total;
                match (movies.exhausted, tv.exhausted) {
                    (true, false) => {
                        tracing::debug!(shortfall, "movies exhausted, backfilling from tv");
                        let extra =
                            fetch_type(catalog, MediaType::Tv, filters, shortfall, tv_start + tv.pages)
                                .await?;
                        tv.items.extend(extra.items);
                        tv.pages += extra.pages;
                        tv.exhausted = extra.exhausted;
                    }
                    (false, true) => {
                        tracing::debug!(shortfall, "tv exhausted, backfilling from movies");
                        let extra = fetch_type(
                            catalog,
                            MediaType::Movie,
                            filters,
                            shortfall,
                            movie_start + movies.pages,
                        )
                        .await?;
                        movies.items.extend(extra.items);
                        movies.pages += extra.pages;
                        movies.exhausted = extra.exhausted;
                    }
                    // Both dry: the single supplemental round is the bound,
                    // the caller gets what there is.
                    _ => {}
                }
            }

            let exhausted = movies.exhausted || tv.exhausted;
            let mut items = movies.items;
            items.extend(tv.items);
            Ok(finish(items, movies.pages, tv.pages, exhausted, desired))
        }
    }
}

/// Fetches successive discover pages for one media type.
///
/// Accumulates until the compatible-item count reaches `desired` or a raw
/// page comes back short of the upstream page size. Always consumes at
/// least one page so the cursor makes progress even over an empty page.
/// Surplus items from the last page are kept; the caller truncates.
async fn fetch_type(
    catalog: &dyn CatalogClient,
    media_type: MediaType,
    filters: &ExploreFilters,
    desired: usize,
    start_page: u32,
) -> AppResult<TypeRun> {
    let mut items: Vec<MediaItem> = Vec::new();
    let mut page = start_page;
    let mut pages = 0u32;
    let mut exhausted = false;

    // A zero-item target means this type was not asked for anything; do not
    // burn an upstream page or move its cursor.
    if desired == 0 {
        return Ok(TypeRun {
            items,
            pages,
            exhausted,
        });
    }

    loop {
        let batch = catalog
            .discover(media_type, &filters.ratings, page, &filters.genres)
            .await?;
        let fetched = batch.len();

        items.extend(
            batch
                .into_iter()
                .filter(|item| is_compatible(item, &filters.ratings, &filters.genres)),
        );
        pages += 1;
        page += 1;

        if fetched < UPSTREAM_PAGE_SIZE {
            exhausted = true;
            break;
        }
        if items.len() >= desired {
            break;
        }
    }

    tracing::debug!(
        media_type = %media_type,
        start_page,
        pages,
        gathered = items.len(),
        exhausted,
        "Discover run finished"
    );

    Ok(TypeRun {
        items,
        pages,
        exhausted,
    })
}

fn finish(
    mut items: Vec<MediaItem>,
    movie_pages: u32,
    tv_pages: u32,
    exhausted: bool,
    desired: usize,
) -> QuotaOutcome {
    items.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    items.truncate(desired);
    QuotaOutcome {
        items,
        movie_pages,
        tv_pages,
        exhausted,
    }
}
