//! Typed job payloads.
//!
//! Payloads form a tagged union keyed by job kind. The dispatcher treats
//! the stored JSON as opaque; each handler deserializes its own variant at
//! the boundary, so an unparseable payload is a permanent failure there.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::article::stage::ArticleStage;

/// All payload shapes Draftmill jobs carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobPayload {
    /// Single-shot embedding of a source document.
    DocumentEmbedding(DocumentEmbeddingPayload),
    /// One stage of the article production pipeline.
    ArticleStage(ArticleStagePayload),
}

impl JobPayload {
    /// The job type string that selects the handler for this payload.
    pub fn job_type(&self) -> &'static str {
        match self {
            Self::DocumentEmbedding(_) => "document_embedding",
            Self::ArticleStage(p) => p.stage.job_type(),
        }
    }

    /// Serialize the payload for storage on the job row.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Payload for `document_embedding` jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEmbeddingPayload {
    /// Source document to embed.
    pub document_id: Uuid,
    /// Extracted text to embed.
    pub text: String,
}

/// Payload shared by every `article_*` stage job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleStagePayload {
    /// The pipeline stage this job executes.
    pub stage: ArticleStage,
    /// The article being produced.
    pub article_id: Uuid,
}
