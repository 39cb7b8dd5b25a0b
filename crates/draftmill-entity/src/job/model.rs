//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::JobStatus;

/// A background job.
///
/// The single source of truth for job existence and terminal state lives
/// in the job store; the fast queue only ever holds job ids.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Unique job identifier, immutable once created.
    pub id: Uuid,
    /// Job type identifier (e.g. `"document_embedding"`, `"article_outline"`).
    pub job_type: String,
    /// Handler-defined payload (JSON). Opaque to the dispatcher.
    pub payload: serde_json::Value,
    /// Current job status.
    pub status: JobStatus,
    /// Number of completed unsuccessful execution attempts.
    pub attempts: i32,
    /// Ceiling on attempts before permanent failure.
    pub max_attempts: i32,
    /// Ordering hint for the database-fallback claim (higher first).
    pub priority: i32,
    /// Result data on completion (JSON).
    pub result: Option<serde_json::Value>,
    /// Error message from the most recent failed attempt.
    pub error: Option<String>,
    /// User who created the job.
    pub created_by: Option<Uuid>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job was last updated. Changes on every status transition.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Whether another execution attempt is allowed after a failure.
    ///
    /// `attempts` counts completed unsuccessful executions, so a job that
    /// failed twice with `max_attempts = 3` gets exactly one more try.
    pub fn retry_allowed(&self) -> bool {
        self.attempts + 1 < self.max_attempts
    }
}

/// Data required to create a new job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJob {
    /// Job type identifier.
    pub job_type: String,
    /// Handler-defined payload.
    pub payload: serde_json::Value,
    /// Maximum attempts.
    pub max_attempts: i32,
    /// Claim-ordering priority (higher first).
    pub priority: i32,
    /// User who created the job.
    pub created_by: Option<Uuid>,
}

impl NewJob {
    /// Materialize a pending [`Job`] with a fresh id and timestamps.
    pub fn into_job(self) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            job_type: self.job_type,
            payload: self.payload,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: self.max_attempts,
            priority: self.priority,
            result: None,
            error: None,
            created_by: self.created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_job(attempts: i32, max_attempts: i32) -> Job {
        let mut job = NewJob {
            job_type: "document_embedding".to_string(),
            payload: serde_json::json!({}),
            max_attempts,
            priority: 0,
            created_by: None,
        }
        .into_job();
        job.attempts = attempts;
        job
    }

    #[test]
    fn test_retry_allowed() {
        assert!(make_job(0, 3).retry_allowed());
        assert!(make_job(1, 3).retry_allowed());
        assert!(!make_job(2, 3).retry_allowed());
        assert!(!make_job(0, 1).retry_allowed());
    }

    #[test]
    fn test_new_job_starts_pending() {
        let job = make_job(0, 3);
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 0);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }
}
