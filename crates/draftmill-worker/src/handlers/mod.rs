//! Job handlers.
//!
//! One handler per job type. Stage handlers share a small toolkit here:
//! payload decoding, article loading, and surfacing permanent failures
//! onto the article so its owner sees them without querying jobs.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use draftmill_entity::article::model::Article;
use draftmill_entity::article::store::ArticleStore;
use draftmill_entity::job::model::Job;
use draftmill_entity::job::payload::ArticleStagePayload;

use crate::chain::PipelineChainer;
use crate::engine::ContentEngine;
use crate::registry::{HandlerRegistry, JobExecutionError};

pub mod assembly;
pub mod embedding;
pub mod finishing;
pub mod outline;
pub mod research;
pub mod sections;

pub use assembly::AssemblyHandler;
pub use embedding::EmbeddingHandler;
pub use finishing::{
    InterlinkingHandler, MetadataHandler, OptimizationHandler, SeoGeoCheckHandler,
};
pub use outline::OutlineHandler;
pub use research::ResearchHandler;
pub use sections::SectionProductionHandler;

/// Register every Draftmill handler on the given registry.
pub fn register_all(
    registry: &mut HandlerRegistry,
    articles: Arc<dyn ArticleStore>,
    engine: Arc<dyn ContentEngine>,
    chain: PipelineChainer,
) {
    registry.register(Arc::new(EmbeddingHandler::new(Arc::clone(&engine))));
    registry.register(Arc::new(ResearchHandler::new(
        Arc::clone(&articles),
        Arc::clone(&engine),
        chain.clone(),
    )));
    registry.register(Arc::new(OutlineHandler::new(
        Arc::clone(&articles),
        Arc::clone(&engine),
        chain.clone(),
    )));
    registry.register(Arc::new(SectionProductionHandler::new(
        Arc::clone(&articles),
        Arc::clone(&engine),
        chain.clone(),
    )));
    registry.register(Arc::new(AssemblyHandler::new(
        Arc::clone(&articles),
        Arc::clone(&engine),
        chain.clone(),
    )));
    registry.register(Arc::new(SeoGeoCheckHandler::new(
        Arc::clone(&articles),
        Arc::clone(&engine),
        chain.clone(),
    )));
    registry.register(Arc::new(OptimizationHandler::new(
        Arc::clone(&articles),
        Arc::clone(&engine),
        chain.clone(),
    )));
    registry.register(Arc::new(InterlinkingHandler::new(
        Arc::clone(&articles),
        Arc::clone(&engine),
        chain.clone(),
    )));
    registry.register(Arc::new(MetadataHandler::new(articles, engine, chain)));
}

/// Decode the shared stage payload. An unparseable payload cannot heal on
/// retry.
pub(crate) fn decode_stage_payload(job: &Job) -> Result<ArticleStagePayload, JobExecutionError> {
    serde_json::from_value(job.payload.clone())
        .map_err(|e| JobExecutionError::Permanent(format!("Invalid stage payload: {}", e)))
}

/// Load the article a stage job targets. A missing article is permanent.
pub(crate) async fn load_article(
    articles: &Arc<dyn ArticleStore>,
    article_id: Uuid,
) -> Result<Article, JobExecutionError> {
    match articles.find_by_id(article_id).await {
        Ok(Some(article)) => Ok(article),
        Ok(None) => Err(JobExecutionError::Permanent(format!(
            "Article {} not found",
            article_id
        ))),
        Err(e) => Err(JobExecutionError::from(e)),
    }
}

/// Read a prior stage's persisted output, required by the current stage.
/// Its absence means the chain was corrupted, which no retry fixes.
pub(crate) fn require_stage_output<'a>(
    article: &'a Article,
    field: &str,
) -> Result<&'a Value, JobExecutionError> {
    article.stage_output(field).ok_or_else(|| {
        JobExecutionError::Permanent(format!(
            "Article {} is missing required stage output '{}'",
            article.id, field
        ))
    })
}

/// Project a permanent failure onto the article before returning it.
/// The projection write is best effort; the job row stays authoritative.
pub(crate) async fn surface_if_permanent(
    articles: &Arc<dyn ArticleStore>,
    article_id: Uuid,
    result: Result<Option<Value>, JobExecutionError>,
) -> Result<Option<Value>, JobExecutionError> {
    if let Err(JobExecutionError::Permanent(message)) = &result {
        if let Err(e) = articles.set_job_failed(article_id, message).await {
            tracing::warn!(
                "Failed to surface job failure on article {}: {}",
                article_id,
                e
            );
        }
    }
    result
}
