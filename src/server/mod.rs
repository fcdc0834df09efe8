//! HTTP API server
//!
//! Thin axum layer over [`Scanner`]: request decoding, status mapping and
//! middleware. All scan semantics live in [`crate::scan`].

mod error;
mod routes;

pub use error::{ApiError, ApiResult};
pub use routes::{FixResponse, HealthResponse};

use crate::scan::Scanner;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<Scanner>,
    pub api_key_configured: bool,
}

impl AppState {
    pub fn new(scanner: Arc<Scanner>, api_key_configured: bool) -> Self {
        Self {
            scanner,
            api_key_configured,
        }
    }
}

/// Creates the API router with middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/scan", post(routes::scan))
        .route("/scan/fix", post(routes::fix))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Binds `addr` and serves the API until the process is stopped
pub async fn run_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("UX Scanner API listening on {}", addr);
    tracing::info!("  POST http://{}/scan", addr);
    tracing::info!("  GET  http://{}/api/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server");
}
