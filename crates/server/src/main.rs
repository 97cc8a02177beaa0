// Hushboard HTTP server
// Decision: Missing DATABASE_URL falls back to in-memory storage (dev mode) instead of refusing to start

use anyhow::{Context, Result};
use hushboard_server::{build_router, storage::StorageBackend, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // RUST_LOG overrides the default filter
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hushboard_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "hushboard starting...");

    let config = ServerConfig::from_env()?;

    let backend = StorageBackend::from_database_url(config.database_url.as_deref())
        .await
        .context("Failed to initialize storage")?;
    if backend.is_dev_mode() {
        tracing::warn!("DATABASE_URL not set; using in-memory storage, data is lost on restart");
    } else {
        tracing::info!("Connected to database");
    }

    tracing::info!(
        base_url = %config.auth.base_url,
        oauth = config.auth.oauth_enabled(),
        session_max_age_secs = config.auth.session_max_age.as_secs(),
        "Authentication configured"
    );
    if !config.auth.oauth_enabled() {
        tracing::warn!("Google OAuth not configured; only local accounts are available");
    }

    let state = AppState::new(&backend, config.auth.clone()).context("Failed to build app state")?;
    let app = build_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!(
        static_dir = %config.static_dir.display(),
        storage = backend.name(),
        "HTTP server listening on {}",
        config.bind_addr
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
