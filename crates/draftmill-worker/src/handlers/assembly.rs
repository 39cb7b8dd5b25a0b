//! Assembly stage handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use draftmill_entity::article::progress::StageProgress;
use draftmill_entity::article::stage::ArticleStage;
use draftmill_entity::article::store::ArticleStore;
use draftmill_entity::job::model::Job;

use crate::chain::PipelineChainer;
use crate::engine::ContentEngine;
use crate::handlers::{
    decode_stage_payload, load_article, require_stage_output, surface_if_permanent,
};
use crate::registry::{JobExecutionError, JobHandler};

/// Assembles the produced sections into a full draft, then chains the
/// SEO/GEO check.
#[derive(Debug)]
pub struct AssemblyHandler {
    articles: Arc<dyn ArticleStore>,
    engine: Arc<dyn ContentEngine>,
    chain: PipelineChainer,
}

impl AssemblyHandler {
    /// Create a new assembly handler.
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
        let stage = ArticleStage::Assembly;

        let sections =
            require_stage_output(&article, ArticleStage::SectionProduction.output_field())?
                .clone();

        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 0, "Assembling draft"),
            )
            .await?;

        let draft = self.engine.assemble(&article.title, &sections).await?;

        self.articles
            .write_stage_output(article.id, stage, &draft)
            .await?;
        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 100, "Draft assembled"),
            )
            .await?;

        self.chain.advance(article.id, stage).await?;

        Ok(Some(json!({ "article_id": article.id, "stage": stage })))
    }
}

#[async_trait]
impl JobHandler for AssemblyHandler {
    fn job_type(&self) -> &str {
        "article_assembly"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let payload = decode_stage_payload(job)?;
        let result = self.run(job).await;
        surface_if_permanent(&self.articles, payload.article_id, result).await
    }
}
