//! PostgreSQL job store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use draftmill_core::error::{AppError, ErrorKind};
use draftmill_core::result::AppResult;
use draftmill_entity::job::model::Job;
use draftmill_entity::job::status::JobStatus;
use draftmill_entity::job::store::JobStore;

/// PostgreSQL-backed [`JobStore`].
///
/// Reservation safety comes from `FOR UPDATE SKIP LOCKED`: the claim is a
/// single `UPDATE … RETURNING` statement, so concurrent dispatchers can
/// never claim the same row. All finalizers require `status = 'processing'`,
/// which makes the terminal states absorbing at the store level.
#[derive(Debug, Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    /// Create a new job store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn insert(&self, job: &Job) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO jobs \
             (id, job_type, payload, status, attempts, max_attempts, priority, \
              result, error, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(job.id)
        .bind(&job.job_type)
        .bind(&job.payload)
        .bind(job.status)
        .bind(job.attempts)
        .bind(job.max_attempts)
        .bind(job.priority)
        .bind(&job.result)
        .bind(&job.error)
        .bind(job.created_by)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert job", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find job", e))
    }

    async fn claim_next_pending(&self) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "UPDATE jobs SET status = 'processing', updated_at = NOW() \
             WHERE id = ( \
                SELECT id FROM jobs \
                WHERE status = 'pending' \
                ORDER BY priority DESC, created_at ASC \
                FOR UPDATE SKIP LOCKED \
                LIMIT 1 \
             ) RETURNING *",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim job", e))
    }

    async fn mark_processing_if_pending(&self, id: Uuid) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "UPDATE jobs SET status = 'processing', updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark job processing", e))
    }

    async fn mark_completed(&self, id: Uuid, result: Option<&serde_json::Value>) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'completed', result = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'processing'",
        )
        .bind(id)
        .bind(result)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete job", e))?;
        Ok(())
    }

    async fn mark_retry(&self, id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'pending', attempts = attempts + 1, error = $2, \
             updated_at = NOW() \
             WHERE id = $1 AND status = 'processing'",
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark job for retry", e)
        })?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'failed', attempts = attempts + 1, error = $2, \
             updated_at = NOW() \
             WHERE id = $1 AND status = 'processing'",
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark job failed", e))?;
        Ok(())
    }

    async fn mark_unrunnable(&self, id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'failed', error = $2, updated_at = NOW() \
             WHERE id = $1 AND status = 'processing'",
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark job unrunnable", e)
        })?;
        Ok(())
    }

    async fn count_by_status(&self, status: JobStatus) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count jobs", e))
    }
}
