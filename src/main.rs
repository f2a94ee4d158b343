use std::sync::Arc;

use marquee_api::api::{create_router, AppState};
use marquee_api::config::Config;
use marquee_api::db::{create_redis_client, Cache};
use marquee_api::services::catalog::TmdbCatalog;
use marquee_api::services::explore::ExploreService;
use marquee_api::services::seen::UserStoreSeenItems;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let cache = Cache::new(redis_client);

    let catalog = Arc::new(TmdbCatalog::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));
    let seen = Arc::new(UserStoreSeenItems::new(
        config.user_store_url.clone(),
        config.user_store_uid.clone(),
        config.user_store_token.clone(),
    ));
    let explore = Arc::new(ExploreService::new(
        catalog.clone(),
        seen,
        config.page_quota,
    ));

    let state = AppState::new(catalog, explore);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
