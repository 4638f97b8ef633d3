use std::sync::Arc;

use chrono::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use learnhub::api::router;
use learnhub::auth::TokenService;
use learnhub::config::Config;
use learnhub::db;
use learnhub::state::AppState;
use learnhub::storage::LocalFileStorage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "learnhub=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new_from_env()?;

    let pool = db::connect(&config.database_url).await?;
    db::migrate(&pool).await?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = AppState {
        db: pool.clone(),
        tokens: Arc::new(TokenService::new(
            &config.jwt_secret,
            Duration::minutes(config.token_ttl_minutes),
        )),
        storage: Arc::new(LocalFileStorage::new(config.upload_dir.clone())),
        max_upload_bytes: config.max_upload_bytes,
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
