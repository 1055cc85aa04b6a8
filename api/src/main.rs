//! OTel Inspect API Server Binary
//!
//! Entry point for the OTel Inspect telemetry inspection server.

#![deny(unsafe_code)]

use anyhow::Result;
use api::LogFormat;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match api::log_format_from_env() {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    api::run_server().await
}
