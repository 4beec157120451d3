//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page and form posts
        .route("/", get(handlers::index))
        .route("/search", post(handlers::search))
        .route("/select", post(handlers::select))
        .route("/scrape", post(handlers::scrape))
        .route("/submit", post(handlers::submit))
        // API routes
        .route("/api/state", get(handlers::api_state))
        .route("/api/events", post(handlers::api_event))
        .route("/stats", get(handlers::stats))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
