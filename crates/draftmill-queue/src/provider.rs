//! Fast-queue manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use draftmill_core::config::queue::QueueConfig;
use draftmill_core::error::AppError;
use draftmill_core::result::AppResult;
use draftmill_core::traits::queue::FastQueue;

/// Fast-queue manager that wraps the configured provider.
///
/// The provider is selected at construction time based on configuration.
/// With provider `"none"` construction yields `None` and the dispatcher
/// runs on the database claim path alone.
#[derive(Debug, Clone)]
pub struct FastQueueManager {
    /// The inner queue provider.
    inner: Arc<dyn FastQueue>,
}

impl FastQueueManager {
    /// Create a new fast-queue manager from configuration.
    pub async fn new(config: &QueueConfig) -> AppResult<Option<Self>> {
        let inner: Arc<dyn FastQueue> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis fast-queue provider");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisFastQueue::new(client))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory fast-queue provider");
                Arc::new(crate::memory::MemoryFastQueue::new())
            }
            "none" => {
                info!("Fast queue disabled; dispatcher will use the database claim path");
                return Ok(None);
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown queue provider: '{other}'. Supported: none, memory, redis"
                )));
            }
        };

        Ok(Some(Self { inner }))
    }
}

#[async_trait]
impl FastQueue for FastQueueManager {
    async fn push(&self, job_id: Uuid) -> AppResult<()> {
        self.inner.push(job_id).await
    }

    async fn pop(&self) -> AppResult<Option<Uuid>> {
        self.inner.pop().await
    }

    async fn remove_processing(&self, job_id: Uuid) -> AppResult<()> {
        self.inner.remove_processing(job_id).await
    }

    async fn queue_size(&self) -> AppResult<u64> {
        self.inner.queue_size().await
    }

    async fn processing_count(&self) -> AppResult<u64> {
        self.inner.processing_count().await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
