//! Research stage handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use draftmill_entity::article::progress::StageProgress;
use draftmill_entity::article::stage::ArticleStage;
use draftmill_entity::article::store::ArticleStore;
use draftmill_entity::job::model::Job;

use crate::chain::PipelineChainer;
use crate::engine::ContentEngine;
use crate::handlers::{decode_stage_payload, load_article, surface_if_permanent};
use crate::registry::{JobExecutionError, JobHandler};

/// Gathers and synthesizes research from the article brief, then chains
/// the outline stage.
#[derive(Debug)]
pub struct ResearchHandler {
    articles: Arc<dyn ArticleStore>,
    engine: Arc<dyn ContentEngine>,
    chain: PipelineChainer,
}

impl ResearchHandler {
    /// Create a new research handler.
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        engine: Arc<dyn ContentEngine>,
        chain: PipelineChainer,
    ) -> Self {
        Self {
            articles,
            engine,
            chain,
        }
    }

    async fn run(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let payload = decode_stage_payload(job)?;
        let article = load_article(&self.articles, payload.article_id).await?;
        let stage = ArticleStage::Research;

        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 0, "Gathering research"),
            )
            .await?;

        let research = self.engine.research(&article.title, &article.brief).await?;

        self.articles
            .write_stage_output(article.id, stage, &research)
            .await?;
        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 100, "Research synthesized"),
            )
            .await?;

        self.chain.advance(article.id, stage).await?;

        Ok(Some(json!({ "article_id": article.id, "stage": stage })))
    }
}

#[async_trait]
impl JobHandler for ResearchHandler {
    fn job_type(&self) -> &str {
        "article_research"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let payload = decode_stage_payload(job)?;
        let result = self.run(job).await;
        surface_if_permanent(&self.articles, payload.article_id, result).await
    }
}
