use std::sync::Arc;

use anyhow::Context;
use rustflix_catalog::{Catalog, CatalogStore, DEFAULT_SUGGESTION_LIMIT};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // DB path: use RUSTFLIX_DB env or default
    let db_path = std::env::var("RUSTFLIX_DB").unwrap_or_else(|_| "rustflix.db".to_string());
    info!(db_path = %db_path, "connecting to database");

    let pool = rustflix_db::connect(&db_path)
        .await
        .context("failed to connect to database")?;

    // Run migrations
    rustflix_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    let store: Arc<dyn CatalogStore> = Arc::new(rustflix_db::SqliteStore::new(pool));

    // Seed an empty catalog with sample data when asked
    if std::env::var("RUSTFLIX_SEED").is_ok_and(|v| v == "1") {
        let seeded = rustflix_server::seed::run(&store)
            .await
            .context("failed to seed catalog")?;
        if seeded > 0 {
            info!(entries = seeded, "sample catalog seeded");
        }
    }

    let suggestion_limit: usize = std::env::var("RUSTFLIX_SUGGESTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SUGGESTION_LIMIT);

    let catalog = Catalog::new(store).with_suggestion_limit(suggestion_limit);
    let app_state = rustflix_server::state::AppState { catalog };
    let app = rustflix_server::routes::build_router(app_state);

    let bind_addr = std::env::var("RUSTFLIX_BIND").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
