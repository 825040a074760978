//! Liveness endpoint for external process supervision.
//!
//! Shares no state with the tracker; supervisors only need a 200.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tracing::{info, warn};

async fn alive() -> &'static str {
    "Polymarket tracker is running"
}

/// Bind the liveness listener. Failing to bind is a startup error.
pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind health port {port}"))?;
    info!("Health check server on port {port}");
    Ok(listener)
}

/// Serve `/` and `/health` until the process exits.
pub async fn serve(listener: TcpListener) {
    let app = Router::new()
        .route("/", get(alive))
        .route("/health", get(alive));
    if let Err(e) = axum::serve(listener, app).await {
        warn!("Health server failed: {e}");
    }
}
