//! Axum-based HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::RpcError;
use crate::handlers;
use crate::state::AppState;

/// Build the application router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/verify-transaction", post(handlers::verify_transaction))
        .route(
            "/api/check-transaction",
            get(handlers::check_transaction).post(handlers::list_used_transactions),
        )
        .route("/api/stats", get(handlers::stats))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub struct RpcServer {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, state: Arc<AppState>) -> Self {
        Self { addr, state }
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn start(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RpcError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| RpcError::Bind {
                addr: self.addr,
                source,
            })?;
        let local = listener
            .local_addr()
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("HTTP API listening on {}", local);

        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("HTTP API stopped");
        Ok(())
    }
}
