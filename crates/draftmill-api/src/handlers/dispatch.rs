//! Worker trigger and status handlers.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use draftmill_core::error::AppError;
use draftmill_worker::queue::QueueStats;
use draftmill_worker::RunOutcome;

use crate::dto::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the shared scheduler secret.
pub const SCHEDULER_SECRET_HEADER: &str = "x-scheduler-secret";

/// POST /api/worker/run
///
/// Invoked by the external scheduler. Reserves and executes at most one
/// job; concurrency comes from overlapping invocations.
pub async fn run_worker(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RunOutcome>, ApiError> {
    verify_scheduler_secret(&headers, &state.config.worker.scheduler_secret)?;

    let outcome = state.dispatcher.run_once().await?;
    Ok(Json(outcome))
}

/// GET /api/worker/status
pub async fn worker_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<QueueStats>>, ApiError> {
    let stats = state.jobs.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

fn verify_scheduler_secret(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let provided = headers
        .get(SCHEDULER_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authentication("Missing scheduler secret"))?;

    if provided != expected {
        return Err(AppError::authentication("Invalid scheduler secret"));
    }
    Ok(())
}
