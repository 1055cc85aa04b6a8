//! OTel Inspect API Server
//!
//! This crate exposes the OTel Inspect ingestion core over HTTP. Records are
//! pushed in as JSON, one at a time or in batches, and the assembled trace
//! trees, log collection, metric projections and resource registry are
//! served back for inspection.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio, providing:
//! - `POST /api/v1/ingest` for topic-tagged envelopes
//! - Per-signal ingestion and query routes under `/api/v1/{traces,logs,metrics}`
//! - Chart and table projections under `/api/v1/metrics/{chart,table}`
//! - Resource listing and hub counters under `/api/v1/{resources,stats}`
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod routes;
mod state;

pub use config::{log_format_from_env, Config, LogFormat, DEFAULT_PORT};
pub use routes::{ApiError, IngestSummary, RejectedRecord};
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Runs the OTel Inspect API server.
///
/// This function loads `.env` if present, initializes the server with
/// configuration from environment variables and starts listening for
/// incoming connections. It handles graceful shutdown on SIGTERM/SIGINT
/// signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the OTel Inspect API server with the provided configuration.
///
/// This is useful for testing or when you want to provide configuration programmatically.
///
/// # Errors
///
/// Returns an error if:
/// - The host and port do not form a socket address
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        max_data_points = config.retention.max_data_points,
        "OTel Inspect API server starting"
    );

    let app = create_router(AppState::new(&config.retention));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::ingest_routes(state.clone()))
        .merge(routes::traces_routes(state.clone()))
        .merge(routes::logs_routes(state.clone()))
        .merge(routes::metrics_routes(state.clone()))
        .merge(routes::resources_routes(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
