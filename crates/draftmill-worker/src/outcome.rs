//! Structured outcome of a dispatcher invocation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a single dispatcher invocation did.
///
/// Returned to the external scheduler; errors from handlers never
/// propagate past this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// No job was available from either reservation path.
    NoJobs,
    /// A fast-queue candidate had already been claimed or finalized
    /// elsewhere. Not an error; the reservation race was simply lost.
    AlreadyProcessed {
        /// The stale candidate id.
        job_id: Uuid,
    },
    /// The job completed successfully.
    Completed {
        /// The finished job.
        job_id: Uuid,
        /// Wall-clock execution time.
        duration_ms: u64,
    },
    /// The job failed but has attempts remaining; it was returned to
    /// `pending` and re-queued.
    FailedWillRetry {
        /// The failed job.
        job_id: Uuid,
        /// Wall-clock execution time.
        duration_ms: u64,
        /// The failure message stored on the job.
        error: String,
    },
    /// The job failed terminally: attempts exhausted, permanent handler
    /// failure, or no handler registered.
    FailedPermanently {
        /// The failed job.
        job_id: Uuid,
        /// Wall-clock execution time.
        duration_ms: u64,
        /// The failure message stored on the job.
        error: String,
    },
}

impl RunOutcome {
    /// The job id this outcome refers to, if any.
    pub fn job_id(&self) -> Option<Uuid> {
        match self {
            Self::NoJobs => None,
            Self::AlreadyProcessed { job_id }
            | Self::Completed { job_id, .. }
            | Self::FailedWillRetry { job_id, .. }
            | Self::FailedPermanently { job_id, .. } => Some(*job_id),
        }
    }
}
