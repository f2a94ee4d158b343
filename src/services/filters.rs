use std::collections::HashSet;

use crate::models::MediaItem;

/// Checks whether an item passes the active rating and genre filters.
///
/// Both checks must pass. Pure predicate, no I/O.
pub fn is_compatible(item: &MediaItem, ratings: &HashSet<String>, genres: &HashSet<i32>) -> bool {
    rating_compatible(item.certification.as_deref(), ratings)
        && genre_compatible(&item.genre_ids, genres)
}

/// Rating check for a single certification against the selected filters.
///
/// An empty filter set or a `""` member means "all ratings". Unknown
/// certifications pass: list endpoints routinely omit rating data even when
/// a certification filter was applied at the request level, so filtering
/// them out would drop uncertified items wholesale.
pub fn rating_compatible(certification: Option<&str>, ratings: &HashSet<String>) -> bool {
    if ratings.is_empty() || ratings.contains("") {
        return true;
    }
    match certification {
        None => true,
        Some("N/A") => true,
        Some(cert) => ratings.contains(cert),
    }
}

/// Genre check: passes when no genre filter is active or the item shares at
/// least one genre with the filter set.
pub fn genre_compatible(genre_ids: &[i32], genres: &HashSet<i32>) -> bool {
    genres.is_empty() || genre_ids.iter().any(|id| genres.contains(id))
}
