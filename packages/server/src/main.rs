use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use server::config::AppConfig;
use server::notify::LogDispatcher;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    server::seed::seed_badge_catalog(&db)
        .await
        .context("Failed to seed badge catalog")?;
    server::seed::ensure_indexes(&db)
        .await
        .context("Failed to ensure indexes")?;

    let cors = build_cors(&config);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        config: Arc::new(config),
        notifier: Arc::new(LogDispatcher),
    };

    let app = server::build_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Engine listening at http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(config.server.cors.max_age));

    if config.server.cors.allow_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .server
            .cors
            .allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}
