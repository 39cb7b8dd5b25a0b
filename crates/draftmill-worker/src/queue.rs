//! Job enqueue facade and queue inspection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use draftmill_core::result::AppResult;
use draftmill_core::traits::queue::FastQueue;
use draftmill_entity::job::model::{Job, NewJob};
use draftmill_entity::job::payload::JobPayload;
use draftmill_entity::job::status::JobStatus;
use draftmill_entity::job::store::JobStore;

/// Options for enqueuing a job.
#[derive(Debug, Clone, Default)]
pub struct EnqueueOptions {
    /// Claim-ordering priority (higher first). Defaults to 0.
    pub priority: i32,
    /// Attempt ceiling. Defaults to the queue's configured default.
    pub max_attempts: Option<i32>,
}

/// Job creation facade used by user-facing actions and the pipeline
/// chainer.
///
/// Inserts the job row (the store of record) first, then pushes the id to
/// the fast queue best-effort: a failed push only means the job waits for
/// the database-fallback claim path.
#[derive(Debug, Clone)]
pub struct JobQueue {
    /// Authoritative job store.
    store: Arc<dyn JobStore>,
    /// Optional fast queue accelerator.
    fast: Option<Arc<dyn FastQueue>>,
    /// Default attempt ceiling for jobs enqueued without one.
    default_max_attempts: i32,
}

impl JobQueue {
    /// Create a new job queue facade.
    pub fn new(
        store: Arc<dyn JobStore>,
        fast: Option<Arc<dyn FastQueue>>,
        default_max_attempts: i32,
    ) -> Self {
        Self {
            store,
            fast,
            default_max_attempts,
        }
    }

    /// Create and enqueue a new job for the given payload.
    pub async fn enqueue(
        &self,
        created_by: Option<Uuid>,
        payload: &JobPayload,
        options: EnqueueOptions,
    ) -> AppResult<Job> {
        let job = NewJob {
            job_type: payload.job_type().to_string(),
            payload: payload.to_value()?,
            max_attempts: options.max_attempts.unwrap_or(self.default_max_attempts),
            priority: options.priority,
            created_by,
        }
        .into_job();

        self.store.insert(&job).await?;

        if let Some(fast) = &self.fast {
            if let Err(e) = fast.push(job.id).await {
                tracing::warn!(
                    "Fast-queue push failed for job {}; it stays pending for the \
                     database claim path: {}",
                    job.id,
                    e
                );
            }
        }

        tracing::debug!(
            "Enqueued job: id={}, type='{}', priority={}, max_attempts={}",
            job.id,
            job.job_type,
            job.priority,
            job.max_attempts
        );

        Ok(job)
    }

    /// Whether a fast queue is configured.
    pub fn is_queue_configured(&self) -> bool {
        self.fast.is_some()
    }

    /// Number of ready ids in the fast queue, or pending rows when no
    /// fast queue is configured.
    pub async fn queue_size(&self) -> AppResult<u64> {
        match &self.fast {
            Some(fast) => fast.queue_size().await,
            None => Ok(self.store.count_by_status(JobStatus::Pending).await? as u64),
        }
    }

    /// Number of jobs currently `processing` in the store of record.
    pub async fn processing_count(&self) -> AppResult<u64> {
        Ok(self.store.count_by_status(JobStatus::Processing).await? as u64)
    }

    /// Queue statistics for monitoring.
    pub async fn stats(&self) -> AppResult<QueueStats> {
        let pending = self.store.count_by_status(JobStatus::Pending).await?;
        let processing = self.store.count_by_status(JobStatus::Processing).await?;
        let failed = self.store.count_by_status(JobStatus::Failed).await?;

        let fast_queue_depth = match &self.fast {
            Some(fast) => Some(fast.queue_size().await?),
            None => None,
        };

        Ok(QueueStats {
            pending,
            processing,
            failed,
            queue_configured: self.fast.is_some(),
            fast_queue_depth,
        })
    }
}

/// Queue statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    /// Number of pending jobs in the store of record.
    pub pending: i64,
    /// Number of processing jobs in the store of record.
    pub processing: i64,
    /// Number of terminally failed jobs.
    pub failed: i64,
    /// Whether a fast queue is configured.
    pub queue_configured: bool,
    /// Ready ids in the fast queue, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast_queue_depth: Option<u64>,
}
