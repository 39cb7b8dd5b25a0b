//! Document embedding handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use draftmill_entity::job::model::Job;
use draftmill_entity::job::payload::DocumentEmbeddingPayload;

use crate::engine::ContentEngine;
use crate::registry::{JobExecutionError, JobHandler};

/// Embeds a source document's extracted text.
///
/// Single-shot: no article, no chaining.
#[derive(Debug)]
pub struct EmbeddingHandler {
    engine: Arc<dyn ContentEngine>,
}

impl EmbeddingHandler {
    /// Create a new embedding handler.
    pub fn new(engine: Arc<dyn ContentEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl JobHandler for EmbeddingHandler {
    fn job_type(&self) -> &str {
        "document_embedding"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let payload: DocumentEmbeddingPayload = serde_json::from_value(job.payload.clone())
            .map_err(|e| {
                JobExecutionError::Permanent(format!("Invalid embedding payload: {}", e))
            })?;

        tracing::debug!("Embedding document {}", payload.document_id);
        let embedding = self.engine.embed(&payload.text).await?;

        Ok(Some(json!({
            "document_id": payload.document_id,
            "embedding": embedding,
        })))
    }
}
