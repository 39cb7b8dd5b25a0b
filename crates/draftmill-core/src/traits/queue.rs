//! Fast-queue trait for pluggable low-latency job pickup backends.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Trait for fast-queue backends (Redis or in-memory).
///
/// The fast queue holds ready-to-run job ids in FIFO order so that the
/// dispatcher does not have to poll the job store under load. It is an
/// accelerator only: the job store remains the store of record, and any
/// backend failure degrades to the database claim path. Ids popped for
/// processing are parked in a processing set until the job is finalized.
#[async_trait]
pub trait FastQueue: Send + Sync + std::fmt::Debug + 'static {
    /// Push a ready job id onto the tail of the queue.
    async fn push(&self, job_id: Uuid) -> AppResult<()>;

    /// Pop the next job id from the head of the queue and move it into the
    /// processing set. Returns `None` if the queue is empty.
    async fn pop(&self) -> AppResult<Option<Uuid>>;

    /// Remove a job id from the processing set once the job is finalized.
    async fn remove_processing(&self, job_id: Uuid) -> AppResult<()>;

    /// Number of ready job ids currently queued.
    async fn queue_size(&self) -> AppResult<u64>;

    /// Number of job ids currently in the processing set.
    async fn processing_count(&self) -> AppResult<u64>;

    /// Check that the queue backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
