//! Article entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The pipeline entity whose multi-stage production the job chain advances.
///
/// The dispatcher never touches these fields; stage handlers own them while
/// their job is the one `processing` job for this article.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    /// Unique article identifier.
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Working title.
    pub title: String,
    /// User-supplied description of the article to produce.
    pub brief: String,
    /// Most recently completed pipeline step (snake_case stage name).
    pub current_step: Option<String>,
    /// Latest [`super::progress::StageProgress`] as JSON.
    pub processing_progress: Option<serde_json::Value>,
    /// Stage outputs keyed by output field (JSONB map).
    pub stage_outputs: serde_json::Value,
    /// Job status projection surfaced to the owning user.
    pub job_status: Option<String>,
    /// Job error projection surfaced to the owning user.
    pub job_error: Option<String>,
    /// When the article was created.
    pub created_at: DateTime<Utc>,
    /// When the article was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Read a persisted stage output from the outputs map.
    pub fn stage_output(&self, field: &str) -> Option<&serde_json::Value> {
        self.stage_outputs.get(field)
    }
}
