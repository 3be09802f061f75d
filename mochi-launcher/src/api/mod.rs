//! API Module
//!
//! HTTP API layer for the launcher.
//! Each submodule handles endpoints for a specific concern.

pub mod backtest;
pub mod echo;
pub mod error;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Launch endpoints
        .route("/backtest", post(backtest::launch_backtest))
        .route("/echo", post(echo::echo))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
