// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP server implementation.
//!
//! Two routes:
//! - `POST /api/transactions/sync` applies a batch and answers per operation
//! - `GET /health` lets clients probe reachability

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use pk_core::SyncRequest;

use crate::state::{Ledger, ServerState};

/// Path of the batch sync endpoint.
pub const SYNC_PATH: &str = "/api/transactions/sync";

/// Build the router with all routes and shared state.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(SYNC_PATH, post(sync))
        .with_state(state)
}

/// Run the server on the given address until the process exits.
pub async fn run(addr: SocketAddr, state: ServerState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on: {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn sync(State(state): State<ServerState>, Json(request): Json<SyncRequest>) -> Response {
    if state.take_refusal() {
        debug!("refusing sync request");
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "temporarily unavailable");
    }

    debug!(count = request.operations.len(), "sync request");
    match state.apply_batch(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to apply batch: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// A server on a random local port with an in-memory ledger.
///
/// Stops when dropped.
pub struct TestServer {
    addr: SocketAddr,
    state: ServerState,
    _shutdown_tx: oneshot::Sender<()>,
}

impl TestServer {
    /// Start a new test server on a random available port.
    pub async fn start() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let state = ServerState::new(Ledger::open_in_memory()?);
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = router(state.clone());
        tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("Test server error: {}", e);
            }
        });

        Ok(TestServer {
            addr,
            state,
            _shutdown_tx: shutdown_tx,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL clients should be configured with.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
