//! Section production stage handler.
//!
//! The long stage of the pipeline. Sections are produced one at a time and
//! persisted individually, keyed by outline index, so a retry resumes from
//! the first missing section instead of reproducing finished work.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

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

/// Produces every outlined section, resuming across retries.
#[derive(Debug)]
pub struct SectionProductionHandler {
    articles: Arc<dyn ArticleStore>,
    engine: Arc<dyn ContentEngine>,
    chain: PipelineChainer,
}

impl SectionProductionHandler {
    /// Create a new section production handler.
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
        let stage = ArticleStage::SectionProduction;

        let outline =
            require_stage_output(&article, ArticleStage::Outline.output_field())?.clone();
        let planned = outline
            .get("sections")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                JobExecutionError::Permanent(format!(
                    "Article {} outline has no sections array",
                    article.id
                ))
            })?
            .len();
        if planned == 0 {
            return Err(JobExecutionError::Permanent(format!(
                "Article {} outline is empty",
                article.id
            )));
        }

        // Anything persisted by an earlier attempt is kept as-is.
        let mut produced: Map<String, Value> = article
            .stage_output(stage.output_field())
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        for index in 0..planned {
            let key = index.to_string();
            if produced.contains_key(&key) {
                tracing::debug!(
                    "Article {}: section {} already produced, skipping",
                    article.id,
                    index
                );
                continue;
            }

            self.articles
                .record_progress(
                    article.id,
                    &StageProgress::new(
                        stage,
                        (index * 100 / planned) as u8,
                        format!("Producing section {} of {}", index + 1, planned),
                    ),
                )
                .await?;

            let section = self
                .engine
                .produce_section(&article.title, &outline, index)
                .await?;

            // Persist before moving on; a later failure keeps this section.
            produced.insert(key, section);
            self.articles
                .write_stage_output(article.id, stage, &Value::Object(produced.clone()))
                .await?;
        }

        self.articles
            .record_progress(
                article.id,
                &StageProgress::new(stage, 100, format!("All {} sections produced", planned)),
            )
            .await?;

        self.chain.advance(article.id, stage).await?;

        Ok(Some(json!({
            "article_id": article.id,
            "stage": stage,
            "sections_produced": planned,
        })))
    }
}

#[async_trait]
impl JobHandler for SectionProductionHandler {
    fn job_type(&self) -> &str {
        "article_section_production"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let payload = decode_stage_payload(job)?;
        let result = self.run(job).await;
        surface_if_permanent(&self.articles, payload.article_id, result).await
    }
}
