//! Pipeline chainer — advances the article pipeline one stage at a time.

use std::sync::Arc;

use uuid::Uuid;

use draftmill_core::result::AppResult;
use draftmill_entity::article::stage::ArticleStage;
use draftmill_entity::job::model::Job;
use draftmill_entity::job::payload::{ArticleStagePayload, JobPayload};

use crate::queue::{EnqueueOptions, JobQueue};
use crate::trigger::SelfTrigger;

/// Enqueues the successor of a completed pipeline stage.
///
/// Stage handlers call [`advance`](Self::advance) exactly once, after
/// persisting their output but before returning success, so the pipeline
/// keeps at most one in-flight job per article.
#[derive(Debug, Clone)]
pub struct PipelineChainer {
    jobs: Arc<JobQueue>,
    trigger: Arc<dyn SelfTrigger>,
}

impl PipelineChainer {
    /// Create a chainer over the given queue and trigger strategy.
    pub fn new(jobs: Arc<JobQueue>, trigger: Arc<dyn SelfTrigger>) -> Self {
        Self { jobs, trigger }
    }

    /// Enqueue the first stage of the pipeline for a new article.
    pub async fn start(&self, article_id: Uuid, created_by: Option<Uuid>) -> AppResult<Job> {
        let stage = ArticleStage::first();
        let job = self.enqueue_stage(article_id, stage, created_by).await?;
        tracing::info!(
            "Started article pipeline: article={}, job={}",
            article_id,
            job.id
        );
        self.trigger.fire().await;
        Ok(job)
    }

    /// Enqueue the stage following `completed`, or return `None` when the
    /// pipeline is finished.
    pub async fn advance(
        &self,
        article_id: Uuid,
        completed: ArticleStage,
    ) -> AppResult<Option<Job>> {
        let Some(next) = completed.next() else {
            tracing::info!(
                "Article pipeline finished: article={}, final_stage={}",
                article_id,
                completed
            );
            return Ok(None);
        };

        let job = self.enqueue_stage(article_id, next, None).await?;
        tracing::info!(
            "Chained article pipeline: article={}, {} -> {}, job={}",
            article_id,
            completed,
            next,
            job.id
        );
        self.trigger.fire().await;
        Ok(Some(job))
    }

    async fn enqueue_stage(
        &self,
        article_id: Uuid,
        stage: ArticleStage,
        created_by: Option<Uuid>,
    ) -> AppResult<Job> {
        let payload = JobPayload::ArticleStage(ArticleStagePayload { stage, article_id });
        self.jobs
            .enqueue(created_by, &payload, EnqueueOptions::default())
            .await
    }
}
