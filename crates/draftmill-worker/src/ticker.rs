//! Cron ticker for deployments without an external scheduler.
//!
//! Production normally drives the dispatcher through the HTTP trigger
//! endpoint; the ticker covers self-hosted setups by invoking the
//! dispatcher on a cron schedule in-process.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use draftmill_core::error::AppError;
use draftmill_core::result::AppResult;

use crate::dispatcher::Dispatcher;
use crate::outcome::RunOutcome;

/// In-process dispatch loop on a cron schedule.
pub struct DispatchTicker {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
}

impl std::fmt::Debug for DispatchTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTicker").finish()
    }
}

impl DispatchTicker {
    /// Create a ticker invoking the dispatcher on `schedule` (six-field
    /// cron expression).
    pub async fn new(dispatcher: Arc<Dispatcher>, schedule: &str) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        let tick = CronJob::new_async(schedule, move |_uuid, _lock| {
            let dispatcher = Arc::clone(&dispatcher);
            Box::pin(async move {
                match dispatcher.run_once().await {
                    Ok(RunOutcome::NoJobs) => {}
                    Ok(outcome) => {
                        tracing::debug!("Dispatch tick outcome: {:?}", outcome);
                    }
                    Err(e) => {
                        tracing::error!("Dispatch tick failed: {}", e);
                    }
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create dispatch schedule: {}", e)))?;

        scheduler
            .add(tick)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add dispatch schedule: {}", e)))?;

        Ok(Self { scheduler })
    }

    /// Start ticking.
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Dispatch ticker started");
        Ok(())
    }

    /// Stop ticking.
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Dispatch ticker shut down");
        Ok(())
    }
}
