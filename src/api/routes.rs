//! Route Definitions
//!
//! Maps URLs to handlers with type-safe routing.

use super::{handlers::*, websocket::websocket_handler};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Service identity
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .route("/ping", get(ping_handler))

        // Stateless play: the client owns the balance
        .route("/spin", post(spin_handler))
        .route("/numbers/:number/neighbors", get(neighbors_handler))

        // Session-backed play
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/:id",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route(
            "/sessions/:id/balance",
            get(get_balance_handler).post(set_balance_handler),
        )
        .route("/sessions/:id/history", get(history_handler))
        .route("/sessions/:id/spin", post(session_spin_handler))

        // Live table events
        .route("/ws", get(websocket_handler))

        // Metrics endpoint for Prometheus
        .route("/metrics", get(metrics_handler))

        // Attach shared state
        .with_state(state)
}
