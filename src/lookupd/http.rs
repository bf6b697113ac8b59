//! HTTP server setup.
//!
//! # Responsibilities
//! - Create Axum Router with the node's handlers
//! - Wire up request tracing
//! - Serve until shutdown, letting in-flight requests finish

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::daemon::DaemonError;
use crate::lifecycle::ShutdownListener;

/// Static description of this node, served on `/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub version: String,
    pub tcp_address: String,
    pub http_address: String,
    pub broadcast_address: Option<String>,
    pub inactive_producer_timeout_secs: u64,
    pub tombstone_lifetime_secs: u64,
}

#[derive(Clone)]
struct AppState {
    info: Arc<NodeInfo>,
}

/// HTTP server for the lookup daemon.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(info: NodeInfo) -> Self {
        let state = AppState {
            info: Arc::new(info),
        };
        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/ping", get(ping))
            .route("/info", get(info))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve on `listener` until shutdown is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownListener) -> Result<(), DaemonError> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "HTTP server starting");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.triggered())
            .await
            .map_err(|source| DaemonError::Serve {
                server: "http",
                source,
            })?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn ping() -> &'static str {
    "OK"
}

async fn info(State(state): State<AppState>) -> Json<NodeInfo> {
    Json(state.info.as_ref().clone())
}
