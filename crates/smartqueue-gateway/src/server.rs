// SPDX-FileCopyrightText: 2026 SmartQueue Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. The gateway is a boundary
//! surface only: handlers translate between HTTP and engine operations and
//! carry no queue logic of their own.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use smartqueue_core::SmartqueueError;
use smartqueue_engine::{CanteenRegistry, ChangeSignal, QueueEngine};

use crate::handlers;
use crate::sse;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The queue engine.
    pub engine: Arc<QueueEngine>,
    /// The canteen registry.
    pub registry: CanteenRegistry,
    /// Change signal feeding the SSE event stream.
    pub signal: ChangeSignal,
}

/// Build the gateway router over the given state.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/menu", get(handlers::get_menu))
        .route("/api/canteens", post(handlers::post_canteen))
        .route("/api/canteens", get(handlers::get_canteens))
        .route("/api/scan", post(handlers::post_scan))
        .route("/api/tokens", post(handlers::post_token))
        .route("/api/tokens/{id}", get(handlers::get_token))
        .route("/api/tokens/{id}/ready", post(handlers::post_ready))
        .route("/api/tokens/{id}/complete", post(handlers::post_complete))
        .route("/api/tokens/{id}/cancel", post(handlers::post_cancel))
        .route("/api/canteens/{id}/queue", get(handlers::get_queue))
        .route(
            "/api/canteens/{id}/position/{token_id}",
            get(handlers::get_position),
        )
        .route("/api/canteens/{id}/stats", get(handlers::get_stats))
        .route("/api/canteens/{id}/traffic", get(handlers::get_traffic))
        .route("/api/canteens/{id}/insights", get(handlers::get_insights))
        .route("/api/events", get(sse::get_events))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway server on `bind_address`, serving until `shutdown` is
/// cancelled.
pub async fn start_server(
    bind_address: &str,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), SmartqueueError> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| SmartqueueError::Gateway {
            message: format!("failed to bind gateway to {bind_address}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {bind_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| SmartqueueError::Gateway {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartqueue_storage::Database;
    use tempfile::tempdir;

    #[tokio::test]
    async fn gateway_state_is_clone() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.db");
        let db = Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());
        let signal = ChangeSignal::new();
        let state = GatewayState {
            engine: Arc::new(QueueEngine::new(
                Arc::clone(&db),
                None,
                signal.clone(),
                Default::default(),
            )),
            registry: CanteenRegistry::new(db, signal.clone()),
            signal,
        };
        let _cloned = state.clone();
    }
}
