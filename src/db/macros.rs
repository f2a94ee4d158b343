/// Read-through caching for catalog responses.
///
/// Looks the key up in the cache first and returns the hit if present.
/// Otherwise the block computes the value, which is queued for a background
/// cache write and returned.
///
/// # Arguments
/// * `$cache`: a [`crate::db::Cache`] (anything with `get_from_cache` and
///   `set_in_background`)
/// * `$key`: the [`crate::db::CacheKey`] for the value
/// * `$ttl`: time-to-live for the cached value, in seconds
/// * `$block`: async block producing the value on a miss
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache.get_from_cache(&$key).await? {
            Some(cached) => Ok(cached),
            None => {
                let value = $block.await?;
                $cache.set_in_background(&$key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
