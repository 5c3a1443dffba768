//! OCS-AI API - local HTTP front end
//!
//! Exposes `/query`, `/info`, `/health` and `/` and forwards questions to the
//! configured chat-completion endpoint.

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

use axum::{
    routing::{any, get},
    Router,
};
use handlers::{health, query};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/info", get(health::info))
        .route("/query", any(query::query_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
