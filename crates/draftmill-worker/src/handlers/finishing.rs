//! Finishing stage handlers: SEO/GEO check, optimization, interlinking,
//! and metadata. Each reads its predecessor's output, calls one engine
//! operation, persists the result, and chains the next stage.

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

/// Scores the assembled draft for SEO/GEO quality, then chains
/// optimization.
#[derive(Debug)]
pub struct SeoGeoCheckHandler {
    articles: Arc<dyn ArticleStore>,
    engine: Arc<dyn ContentEngine>,
    chain: PipelineChainer,
}

impl SeoGeoCheckHandler {
    /// Create a new SEO/GEO check handler.
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
        let stage = ArticleStage::SeoGeoCheck;

        let draft = require_stage_output(&article, ArticleStage::Assembly.output_field())?;

        self.articles
            .record_progress(article.id, &StageProgress::new(stage, 0, "Scoring draft"))
            .await?;

        let report = self.engine.score(draft).await?;

        self.articles
            .write_stage_output(article.id, stage, &report)
            .await?;
        self.articles
            .record_progress(article.id, &StageProgress::new(stage, 100, "Draft scored"))
            .await?;

        self.chain.advance(article.id, stage).await?;

        Ok(Some(json!({ "article_id": article.id, "stage": stage })))
    }
}

#[async_trait]
impl JobHandler for SeoGeoCheckHandler {
    fn job_type(&self) -> &str {
        "article_seo_geo_check"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let payload = decode_stage_payload(job)?;
        let result = self.run(job).await;
        surface_if_permanent(&self.articles, payload.article_id, result).await
    }
}

/// Rewrites the draft against its score report, then chains interlinking.
#[derive(Debug)]
pub struct OptimizationHandler {
    articles: Arc<dyn ArticleStore>,
    engine: Arc<dyn ContentEngine>,
    chain: PipelineChainer,
}

impl OptimizationHandler {
    /// Create a new optimization handler.
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
        let stage = ArticleStage::Optimization;

        let draft = require_stage_output(&article, ArticleStage::Assembly.output_field())?;
        let report = require_stage_output(&article, ArticleStage::SeoGeoCheck.output_field())?;

        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 0, "Optimizing draft"),
            )
            .await?;

        let optimized = self.engine.optimize(draft, report).await?;

        self.articles
            .write_stage_output(article.id, stage, &optimized)
            .await?;
        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 100, "Draft optimized"),
            )
            .await?;

        self.chain.advance(article.id, stage).await?;

        Ok(Some(json!({ "article_id": article.id, "stage": stage })))
    }
}

#[async_trait]
impl JobHandler for OptimizationHandler {
    fn job_type(&self) -> &str {
        "article_optimization"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let payload = decode_stage_payload(job)?;
        let result = self.run(job).await;
        surface_if_permanent(&self.articles, payload.article_id, result).await
    }
}

/// Inserts internal links into the optimized draft, then chains metadata.
#[derive(Debug)]
pub struct InterlinkingHandler {
    articles: Arc<dyn ArticleStore>,
    engine: Arc<dyn ContentEngine>,
    chain: PipelineChainer,
}

impl InterlinkingHandler {
    /// Create a new interlinking handler.
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
        let stage = ArticleStage::Interlinking;

        let draft = require_stage_output(&article, ArticleStage::Optimization.output_field())?;

        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 0, "Inserting internal links"),
            )
            .await?;

        let interlinked = self.engine.interlink(draft).await?;

        self.articles
            .write_stage_output(article.id, stage, &interlinked)
            .await?;
        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 100, "Internal links inserted"),
            )
            .await?;

        self.chain.advance(article.id, stage).await?;

        Ok(Some(json!({ "article_id": article.id, "stage": stage })))
    }
}

#[async_trait]
impl JobHandler for InterlinkingHandler {
    fn job_type(&self) -> &str {
        "article_interlinking"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let payload = decode_stage_payload(job)?;
        let result = self.run(job).await;
        surface_if_permanent(&self.articles, payload.article_id, result).await
    }
}

/// Produces title/description/slug metadata, finishing the pipeline.
#[derive(Debug)]
pub struct MetadataHandler {
    articles: Arc<dyn ArticleStore>,
    engine: Arc<dyn ContentEngine>,
    chain: PipelineChainer,
}

impl MetadataHandler {
    /// Create a new metadata handler.
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
        let stage = ArticleStage::Metadata;

        let draft = require_stage_output(&article, ArticleStage::Interlinking.output_field())?;

        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 0, "Producing metadata"),
            )
            .await?;

        let metadata = self.engine.metadata(draft).await?;

        self.articles
            .write_stage_output(article.id, stage, &metadata)
            .await?;
        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 100, "Article complete"),
            )
            .await?;

        // Final stage; advance logs completion and enqueues nothing.
        self.chain.advance(article.id, stage).await?;

        Ok(Some(json!({ "article_id": article.id, "stage": stage })))
    }
}

#[async_trait]
impl JobHandler for MetadataHandler {
    fn job_type(&self) -> &str {
        "article_metadata"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let payload = decode_stage_payload(job)?;
        let result = self.run(job).await;
        surface_if_permanent(&self.articles, payload.article_id, result).await
    }
}
