//! Route definitions for the Draftmill HTTP API.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/worker/run", post(handlers::dispatch::run_worker))
        .route("/worker/status", get(handlers::dispatch::worker_status))
        .route("/jobs", post(handlers::jobs::create_job))
        .route("/jobs/{id}", get(handlers::jobs::get_job));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
