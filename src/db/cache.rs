use std::fmt::Display;

use redis::AsyncCommands;
use redis::Client;

use crate::error::{AppError, AppResult};
use crate::models::{MediaType, TrendingWindow};

/// Typed keys for cached catalog responses
///
/// Filter strings inside keys (`certification`, `genres`) are pre-joined in
/// sorted order by the catalog client, so the same filter set always maps to
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    DiscoverPage {
        media_type: MediaType,
        page: u32,
        certification: String,
        genres: String,
    },
    Trending {
        media_type: MediaType,
        window: TrendingWindow,
    },
    TopRated {
        media_type: MediaType,
        page: u32,
    },
    Classics {
        media_type: MediaType,
        page: u32,
    },
    Recommendations {
        media_type: MediaType,
        id: u64,
    },
    Search {
        media_type: Option<MediaType>,
        query: String,
    },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::DiscoverPage {
                media_type,
                page,
                certification,
                genres,
            } => write!(
                f,
                "discover:{}:p{}:{}:{}",
                media_type, page, certification, genres
            ),
            CacheKey::Trending { media_type, window } => {
                write!(f, "trending:{}:{}", media_type, window.as_str())
            }
            CacheKey::TopRated { media_type, page } => {
                write!(f, "toprated:{}:p{}", media_type, page)
            }
            CacheKey::Classics { media_type, page } => {
                write!(f, "classics:{}:p{}", media_type, page)
            }
            CacheKey::Recommendations { media_type, id } => {
                write!(f, "recs:{}:{}", media_type, id)
            }
            CacheKey::Search { media_type, query } => {
                let scope = media_type.map(|m| m.as_str()).unwrap_or("multi");
                write!(f, "search:{}:{}", scope, query.to_lowercase())
            }
        }
    }
}

/// Creates a Redis client for caching
///
/// Establishes a connection to Redis for fast data caching.
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Cache handler for storing and retrieving catalog responses from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
}

impl Cache {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` on a miss; deserialization failures surface as
    /// internal errors rather than silently refetching.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache without blocking the caller
    ///
    /// The write runs in a spawned task; a failed write only costs a cache
    /// miss later, so errors are logged and dropped.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let client = self.redis_client.clone();
        let key = format!("{}", key);
        tokio::spawn(async move {
            let write = async {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let _: () = conn.set_ex(&key, json, ttl).await?;
                Ok::<_, redis::RedisError>(())
            };
            if let Err(e) = write.await {
                tracing::warn!(error = %e, key = %key, "Failed to write to Redis cache");
            }
        });
    }
}
