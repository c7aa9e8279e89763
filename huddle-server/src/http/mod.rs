//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{Router, routing::get};
use huddle_core::WS_PATH;
use tower_http::cors::CorsLayer;

use crate::AppState;
use crate::ws::ws_handler;

pub use api::HealthResponse;

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route(WS_PATH, get(ws_handler))
        // Any origin may join the room.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
