//! Request and response DTOs.

use serde::{Deserialize, Serialize};

use draftmill_entity::job::payload::JobPayload;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Request body for job creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    /// Typed job payload.
    pub payload: JobPayload,
    /// Claim-ordering priority (higher first). Defaults to 0.
    #[serde(default)]
    pub priority: i32,
    /// Attempt ceiling. Defaults to the configured default.
    pub max_attempts: Option<i32>,
}
