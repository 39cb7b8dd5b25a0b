//! Handler registry — maps job types to their handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use draftmill_core::error::{AppError, ErrorKind};
use draftmill_entity::job::model::Job;

/// Trait for job handler implementations.
///
/// Handlers are the error boundary: they raise [`JobExecutionError`] on
/// failure and there is no soft-failure return value.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes.
    fn job_type(&self) -> &str;

    /// Execute the job with the given payload.
    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from job execution.
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure — retrying cannot help (bad payload, missing
    /// credential, missing entity). Fails the job immediately.
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure — may succeed on retry (network timeout, rate
    /// limit, malformed upstream response).
    #[error("Transient job failure: {0}")]
    Transient(String),
}

impl From<AppError> for JobExecutionError {
    fn from(err: AppError) -> Self {
        match err.kind {
            // Configuration and validation problems do not heal on retry.
            ErrorKind::Configuration | ErrorKind::Validation | ErrorKind::NotFound => {
                Self::Permanent(err.to_string())
            }
            _ => Self::Transient(err.to_string()),
        }
    }
}

/// Registry of job handlers keyed by job type.
///
/// Constructed once at startup and injected into the dispatcher; there is
/// no module-level handler map.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    /// Registered job handlers by type.
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handler.
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!("Registered job handler for type '{}'", job_type);
        self.handlers.insert(job_type, handler);
    }

    /// Look up the handler for a job type.
    pub fn get(&self, job_type: &str) -> Option<&Arc<dyn JobHandler>> {
        self.handlers.get(job_type)
    }

    /// Check if a handler is registered for a job type.
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }
}
