//! Per-stage progress reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stage::ArticleStage;

/// Incremental progress of a pipeline stage, projected onto the article.
///
/// Updated by handlers on every meaningful sub-step, independent of job
/// status, so observers can show progress for a job still processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageProgress {
    /// The stage currently executing.
    pub stage: ArticleStage,
    /// Completion percentage, clamped to `[0, 100]`.
    pub percent: u8,
    /// Human-readable progress message.
    pub message: String,
    /// When this progress was reported.
    pub updated_at: DateTime<Utc>,
}

impl StageProgress {
    /// Create a progress report, clamping `percent` to 100.
    pub fn new(stage: ArticleStage, percent: u8, message: impl Into<String>) -> Self {
        Self {
            stage,
            percent: percent.min(100),
            message: message.into(),
            updated_at: Utc::now(),
        }
    }
}
