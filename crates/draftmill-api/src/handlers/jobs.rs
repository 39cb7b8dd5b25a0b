//! Job endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use draftmill_core::error::AppError;
use draftmill_entity::job::model::Job;
use draftmill_worker::queue::EnqueueOptions;

use crate::dto::{ApiResponse, CreateJobRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/jobs
pub async fn create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Job>>), ApiError> {
    if matches!(request.max_attempts, Some(m) if m < 1) {
        return Err(AppError::validation("max_attempts must be at least 1").into());
    }

    let job = state
        .jobs
        .enqueue(
            None,
            &request.payload,
            EnqueueOptions {
                priority: request.priority,
                max_attempts: request.max_attempts,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(job))))
}

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Job>>, ApiError> {
    let job = state
        .job_store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Job {} not found", id)))?;

    Ok(Json(ApiResponse::ok(job)))
}
