//! Redis fast-queue implementation.

use async_trait::async_trait;
use redis::AsyncCommands;
use uuid::Uuid;

use draftmill_core::error::{AppError, ErrorKind};
use draftmill_core::result::AppResult;
use draftmill_core::traits::queue::FastQueue;

use super::client::RedisClient;

/// Key suffix for the ready list.
const READY_KEY: &str = "jobs:ready";
/// Key suffix for the processing set.
const PROCESSING_KEY: &str = "jobs:processing";

/// Redis-backed fast queue: a FIFO list of ready job ids plus a set of
/// ids currently being processed.
///
/// Pop and park are two commands, not one transaction; an id lost between
/// them is recovered by the database claim path, since the job store is
/// the store of record.
#[derive(Debug, Clone)]
pub struct RedisFastQueue {
    /// Redis client.
    client: RedisClient,
}

impl RedisFastQueue {
    /// Create a new Redis fast queue.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Queue, format!("Redis error: {e}"), e)
    }

    fn ready_key(&self) -> String {
        self.client.prefixed_key(READY_KEY)
    }

    fn processing_key(&self) -> String {
        self.client.prefixed_key(PROCESSING_KEY)
    }
}

#[async_trait]
impl FastQueue for RedisFastQueue {
    async fn push(&self, job_id: Uuid) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .rpush(self.ready_key(), job_id.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn pop(&self) -> AppResult<Option<Uuid>> {
        let mut conn = self.client.conn_mut();
        let popped: Option<String> = conn
            .lpop(self.ready_key(), None)
            .await
            .map_err(Self::map_err)?;

        let Some(raw) = popped else {
            return Ok(None);
        };

        let job_id = Uuid::parse_str(&raw)
            .map_err(|e| AppError::queue(format!("Invalid job id in queue: '{raw}': {e}")))?;

        let _: () = conn
            .sadd(self.processing_key(), raw)
            .await
            .map_err(Self::map_err)?;

        Ok(Some(job_id))
    }

    async fn remove_processing(&self, job_id: Uuid) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let _: () = conn
            .srem(self.processing_key(), job_id.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn queue_size(&self) -> AppResult<u64> {
        let mut conn = self.client.conn_mut();
        let len: u64 = conn.llen(self.ready_key()).await.map_err(Self::map_err)?;
        Ok(len)
    }

    async fn processing_count(&self) -> AppResult<u64> {
        let mut conn = self.client.conn_mut();
        let count: u64 = conn
            .scard(self.processing_key())
            .await
            .map_err(Self::map_err)?;
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
