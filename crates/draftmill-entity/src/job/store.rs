//! Job store contract.

use async_trait::async_trait;
use uuid::Uuid;

use draftmill_core::result::AppResult;

use super::model::Job;
use super::status::JobStatus;

/// The authoritative store of job records.
///
/// Implemented against PostgreSQL in production and by an in-memory fake
/// in tests. The two claim operations are the correctness-critical part of
/// the whole system: each must be a single indivisible read-modify-write so
/// that concurrent dispatchers can never reserve the same job. Every
/// finalizer is conditioned on the job still being `processing`, which
/// makes `completed` and `failed` absorbing.
#[async_trait]
pub trait JobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a freshly created job (status `pending`, attempts 0).
    async fn insert(&self, job: &Job) -> AppResult<()>;

    /// Load a job by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>>;

    /// Atomically claim the next `pending` job, ordered by
    /// `(priority DESC, created_at ASC)`, and mark it `processing`.
    /// This is the database-fallback reservation path.
    async fn claim_next_pending(&self) -> AppResult<Option<Job>>;

    /// Atomically mark the given job `processing` if (and only if) it is
    /// still `pending`. Used to re-validate fast-queue candidates against
    /// the store of record. Returns `None` when the job is gone or was
    /// already claimed elsewhere.
    async fn mark_processing_if_pending(&self, id: Uuid) -> AppResult<Option<Job>>;

    /// Finalize a successful execution: status `completed`, store result.
    async fn mark_completed(&self, id: Uuid, result: Option<&serde_json::Value>) -> AppResult<()>;

    /// Record a failed execution with attempts remaining: increment
    /// `attempts`, store the error, return the job to `pending`.
    async fn mark_retry(&self, id: Uuid, error: &str) -> AppResult<()>;

    /// Record a final failed execution: increment `attempts`, store the
    /// error, status `failed` (terminal).
    async fn mark_failed(&self, id: Uuid, error: &str) -> AppResult<()>;

    /// Fail a job that was never executed (no registered handler). Does
    /// not count an attempt.
    async fn mark_unrunnable(&self, id: Uuid, error: &str) -> AppResult<()>;

    /// Count jobs currently in the given status.
    async fn count_by_status(&self, status: JobStatus) -> AppResult<i64>;
}
