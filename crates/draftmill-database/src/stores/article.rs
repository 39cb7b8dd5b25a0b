//! PostgreSQL article store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use draftmill_core::error::{AppError, ErrorKind};
use draftmill_core::result::AppResult;
use draftmill_entity::article::model::Article;
use draftmill_entity::article::progress::StageProgress;
use draftmill_entity::article::stage::ArticleStage;
use draftmill_entity::article::store::ArticleStore;

/// PostgreSQL-backed [`ArticleStore`].
///
/// Stage outputs live in a single JSONB map column so a retried stage
/// overwrites its own field without touching the others.
#[derive(Debug, Clone)]
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    /// Create a new article store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Article>> {
        sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find article", e))
    }

    async fn record_progress(&self, id: Uuid, progress: &StageProgress) -> AppResult<()> {
        let value = serde_json::to_value(progress)?;
        sqlx::query(
            "UPDATE articles SET processing_progress = $2, job_status = 'processing', \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record progress", e))?;
        Ok(())
    }

    async fn write_stage_output(
        &self,
        id: Uuid,
        stage: ArticleStage,
        output: &serde_json::Value,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE articles SET \
             stage_outputs = jsonb_set(stage_outputs, $2, $3), \
             current_step = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(vec![stage.output_field().to_string()])
        .bind(output)
        .bind(stage.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to write stage output", e)
        })?;
        Ok(())
    }

    async fn set_job_failed(&self, id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE articles SET job_status = 'failed', job_error = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to set article job failure", e)
        })?;
        Ok(())
    }
}
