use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Catalog API key
    pub tmdb_api_key: String,

    /// Catalog API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Per-user document store base URL
    #[serde(default = "default_user_store_url")]
    pub user_store_url: String,

    /// Document store user whose collections this deployment serves
    #[serde(default = "default_user_store_uid")]
    pub user_store_uid: String,

    /// Bearer token for the document store, if it requires one
    #[serde(default)]
    pub user_store_token: Option<String>,

    /// Minimum number of items a feed page should deliver
    #[serde(default = "default_page_quota")]
    pub page_quota: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_user_store_url() -> String {
    "http://localhost:8085".to_string()
}

fn default_user_store_uid() -> String {
    "default".to_string()
}

fn default_page_quota() -> usize {
    20
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
