//! In-memory fast-queue implementation.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashSet;
use uuid::Uuid;

use draftmill_core::result::AppResult;
use draftmill_core::traits::queue::FastQueue;

/// In-memory fast-queue provider for single-process deployments and tests.
#[derive(Debug, Default)]
pub struct MemoryFastQueue {
    /// Ready job ids in FIFO order.
    ready: Mutex<VecDeque<Uuid>>,
    /// Ids popped for processing, pending finalization.
    processing: DashSet<Uuid>,
}

impl MemoryFastQueue {
    /// Create an empty in-memory queue.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FastQueue for MemoryFastQueue {
    async fn push(&self, job_id: Uuid) -> AppResult<()> {
        let mut ready = self.ready.lock().expect("queue mutex poisoned");
        ready.push_back(job_id);
        Ok(())
    }

    async fn pop(&self) -> AppResult<Option<Uuid>> {
        let popped = {
            let mut ready = self.ready.lock().expect("queue mutex poisoned");
            ready.pop_front()
        };
        if let Some(id) = popped {
            self.processing.insert(id);
        }
        Ok(popped)
    }

    async fn remove_processing(&self, job_id: Uuid) -> AppResult<()> {
        self.processing.remove(&job_id);
        Ok(())
    }

    async fn queue_size(&self) -> AppResult<u64> {
        let ready = self.ready.lock().expect("queue mutex poisoned");
        Ok(ready.len() as u64)
    }

    async fn processing_count(&self) -> AppResult<u64> {
        Ok(self.processing.len() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = MemoryFastQueue::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        queue.push(first).await.unwrap();
        queue.push(second).await.unwrap();

        assert_eq!(queue.pop().await.unwrap(), Some(first));
        assert_eq!(queue.pop().await.unwrap(), Some(second));
        assert_eq!(queue.pop().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pop_moves_to_processing() {
        let queue = MemoryFastQueue::new();
        let id = Uuid::new_v4();
        queue.push(id).await.unwrap();

        assert_eq!(queue.queue_size().await.unwrap(), 1);
        assert_eq!(queue.processing_count().await.unwrap(), 0);

        queue.pop().await.unwrap();
        assert_eq!(queue.queue_size().await.unwrap(), 0);
        assert_eq!(queue.processing_count().await.unwrap(), 1);

        queue.remove_processing(id).await.unwrap();
        assert_eq!(queue.processing_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_processing_is_idempotent() {
        let queue = MemoryFastQueue::new();
        let id = Uuid::new_v4();
        queue.remove_processing(id).await.unwrap();
        queue.remove_processing(id).await.unwrap();
        assert_eq!(queue.processing_count().await.unwrap(), 0);
    }
}
