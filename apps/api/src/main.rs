mod company;
mod config;
mod db;
mod employees;
mod errors;
mod export;
mod extract;
mod letters;
mod models;
mod routes;
mod state;
mod store;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::export::{AssetStore, ChromePdfRenderer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting appreciation letters API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL + schema bootstrap
    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;

    let pdf = ChromePdfRenderer::chrome(config.pdf.clone());
    info!(
        "PDF renderer ready (max {} concurrent renders, {}s timeout)",
        config.pdf.max_concurrency,
        config.pdf.timeout.as_secs()
    );

    let assets = AssetStore::new(config.public_dir.clone(), config.public_base_url.clone());
    info!(
        "Serving assets from {} as {}",
        assets.root().display(),
        assets.base_url()
    );

    let state = AppState {
        store: Arc::new(PgStore::new(pool)),
        pdf: Arc::new(pdf),
        assets,
    };

    // No authentication: any caller can read and write every record.
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
