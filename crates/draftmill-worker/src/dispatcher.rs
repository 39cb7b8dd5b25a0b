//! Job dispatcher — reserves and executes exactly one job per invocation.

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use draftmill_core::result::AppResult;
use draftmill_core::traits::queue::FastQueue;
use draftmill_entity::job::model::Job;
use draftmill_entity::job::store::JobStore;

use crate::outcome::RunOutcome;
use crate::registry::{HandlerRegistry, JobExecutionError};

/// What the reservation step produced.
#[derive(Debug)]
enum Reservation {
    /// No job available from either path.
    Empty,
    /// A fast-queue candidate lost its re-validation race.
    Stale(Uuid),
    /// A job reserved for this invocation, now `processing`.
    Claimed(Job),
}

/// Dispatches one job per invocation.
///
/// Invoked by an external scheduler (cron tick or webhook); concurrency
/// comes from overlapping invocations, so the reservation step is the sole
/// mutual-exclusion point. There is no handler timeout: a stuck handler
/// holds its `processing` slot until the process dies.
#[derive(Debug)]
pub struct Dispatcher {
    /// Authoritative job store.
    store: Arc<dyn JobStore>,
    /// Optional fast queue accelerator.
    queue: Option<Arc<dyn FastQueue>>,
    /// Handler registry, constructed at startup and injected.
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new(
        store: Arc<dyn JobStore>,
        queue: Option<Arc<dyn FastQueue>>,
        registry: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            store,
            queue,
            registry,
        }
    }

    /// Reserve at most one job and execute it, returning a structured
    /// outcome. Handler errors are caught here and translated into status
    /// transitions; nothing propagates past the returned outcome.
    pub async fn run_once(&self) -> AppResult<RunOutcome> {
        match self.reserve_next().await? {
            Reservation::Empty => {
                tracing::trace!("No jobs available");
                Ok(RunOutcome::NoJobs)
            }
            Reservation::Stale(job_id) => {
                tracing::debug!("Job {} already processed; skipping", job_id);
                Ok(RunOutcome::AlreadyProcessed { job_id })
            }
            Reservation::Claimed(job) => self.execute(job).await,
        }
    }

    /// Reserve the next job.
    ///
    /// Tries the fast queue first; any queue error degrades to the atomic
    /// database claim. Queue candidates are re-validated against the store
    /// of record, whose status field is always authoritative.
    async fn reserve_next(&self) -> AppResult<Reservation> {
        if let Some(queue) = &self.queue {
            match queue.pop().await {
                Ok(Some(job_id)) => {
                    return match self.store.mark_processing_if_pending(job_id).await? {
                        Some(job) => Ok(Reservation::Claimed(job)),
                        None => {
                            // Claimed or finalized through another path.
                            self.clear_in_flight(job_id).await;
                            Ok(Reservation::Stale(job_id))
                        }
                    };
                }
                Ok(None) => {
                    // Queue empty; it may be behind the store of record.
                }
                Err(e) => {
                    tracing::warn!("Fast queue unreachable, using database claim: {}", e);
                }
            }
        }

        match self.store.claim_next_pending().await? {
            Some(job) => Ok(Reservation::Claimed(job)),
            None => Ok(Reservation::Empty),
        }
    }

    /// Execute a reserved job and finalize it through the outcome policy.
    async fn execute(&self, job: Job) -> AppResult<RunOutcome> {
        let started = Instant::now();
        let job_id = job.id;

        let Some(handler) = self.registry.get(&job.job_type) else {
            // Unknown job types are not transient; no attempt is consumed.
            let error = format!("No handler registered for job type '{}'", job.job_type);
            tracing::error!("Job {} unrunnable: {}", job_id, error);
            self.store.mark_unrunnable(job_id, &error).await?;
            self.clear_in_flight(job_id).await;
            return Ok(RunOutcome::FailedPermanently {
                job_id,
                duration_ms: duration_ms(started),
                error,
            });
        };

        tracing::info!(
            "Executing job: id={}, type='{}', attempt={}/{}",
            job_id,
            job.job_type,
            job.attempts + 1,
            job.max_attempts
        );

        match handler.execute(&job).await {
            Ok(result) => {
                self.store.mark_completed(job_id, result.as_ref()).await?;
                self.clear_in_flight(job_id).await;
                tracing::info!("Job {} completed successfully", job_id);
                Ok(RunOutcome::Completed {
                    job_id,
                    duration_ms: duration_ms(started),
                })
            }
            Err(JobExecutionError::Permanent(error)) => {
                tracing::error!("Job {} failed permanently: {}", job_id, error);
                self.store.mark_failed(job_id, &error).await?;
                self.clear_in_flight(job_id).await;
                Ok(RunOutcome::FailedPermanently {
                    job_id,
                    duration_ms: duration_ms(started),
                    error,
                })
            }
            Err(JobExecutionError::Transient(error)) => {
                if job.retry_allowed() {
                    tracing::warn!(
                        "Job {} failed (attempt {}/{}), will retry: {}",
                        job_id,
                        job.attempts + 1,
                        job.max_attempts,
                        error
                    );
                    self.store.mark_retry(job_id, &error).await?;
                    self.clear_in_flight(job_id).await;
                    self.requeue(job_id).await;
                    Ok(RunOutcome::FailedWillRetry {
                        job_id,
                        duration_ms: duration_ms(started),
                        error,
                    })
                } else {
                    tracing::error!(
                        "Job {} failed terminally after {} attempts: {}",
                        job_id,
                        job.attempts + 1,
                        error
                    );
                    self.store.mark_failed(job_id, &error).await?;
                    self.clear_in_flight(job_id).await;
                    Ok(RunOutcome::FailedPermanently {
                        job_id,
                        duration_ms: duration_ms(started),
                        error,
                    })
                }
            }
        }
    }

    /// Remove the job id from the fast queue's processing set. Best
    /// effort: the set is bookkeeping, not the store of record.
    async fn clear_in_flight(&self, job_id: Uuid) {
        if let Some(queue) = &self.queue {
            if let Err(e) = queue.remove_processing(job_id).await {
                tracing::warn!(
                    "Failed to clear in-flight bookkeeping for job {}: {}",
                    job_id,
                    e
                );
            }
        }
    }

    /// Re-push a retryable job id to the fast queue. Best effort: if the
    /// push fails the job stays `pending` for the database claim path.
    async fn requeue(&self, job_id: Uuid) {
        if let Some(queue) = &self.queue {
            if let Err(e) = queue.push(job_id).await {
                tracing::warn!(
                    "Failed to re-queue job {}; database claim path will pick it up: {}",
                    job_id,
                    e
                );
            }
        }
    }
}

fn duration_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
