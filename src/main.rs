use axum::{
    middleware::from_fn,
    routing::{get, put},
    Router,
};
use sqlx::SqlitePool;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;

use crate::config::Config;

/// Shared application state. The pool is the only thing shared between
/// requests; each handler checks out its own connection.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,inventory_items=debug".parse().unwrap()),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    info!(url = %config.database_url, "Opening SQLite database...");
    let pool = db::connect(&config.database_url, config.database_max_connections).await?;

    db::ensure_schema(&pool).await?;
    info!("Schema ready.");

    let app = build_router(AppState { db: pool.clone() });

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Shutdown complete.");

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route(
            "/api/ping",
            get(handlers::ping).options(handlers::preflight),
        )

        // ── Items CRUD ──────────────────────────────────────────────────────
        .route(
            "/api/items",
            get(handlers::items::list_items)
                .post(handlers::items::create_item)
                .options(handlers::preflight),
        )
        .route(
            "/api/items/:id",
            put(handlers::items::update_item)
                .delete(handlers::items::delete_item)
                .options(handlers::preflight),
        )

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(middleware::cors_headers))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
