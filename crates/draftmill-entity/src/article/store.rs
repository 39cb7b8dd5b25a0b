//! Article store contract.

use async_trait::async_trait;
use uuid::Uuid;

use draftmill_core::result::AppResult;

use super::model::Article;
use super::progress::StageProgress;
use super::stage::ArticleStage;

/// Store of article pipeline entities.
///
/// Stage handlers persist outputs and progress through this contract;
/// nothing else writes these fields while a stage job is processing, since
/// at most one job per pipeline is in flight by construction of the chain.
#[async_trait]
pub trait ArticleStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load an article by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Article>>;

    /// Project the latest stage progress onto the article.
    async fn record_progress(&self, id: Uuid, progress: &StageProgress) -> AppResult<()>;

    /// Persist a stage's output under its output field and advance
    /// `current_step` to that stage.
    async fn write_stage_output(
        &self,
        id: Uuid,
        stage: ArticleStage,
        output: &serde_json::Value,
    ) -> AppResult<()>;

    /// Surface a terminal job failure on the article so the caller domain
    /// can show it without querying jobs.
    async fn set_job_failed(&self, id: Uuid, error: &str) -> AppResult<()>;
}
