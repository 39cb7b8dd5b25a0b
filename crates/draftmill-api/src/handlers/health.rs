//! Health check handler.

use axum::Json;

use crate::dto::{ApiResponse, HealthResponse};

/// GET /health
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
