//! Content generation engine client.
//!
//! Stage handlers never talk to the generation service directly; they go
//! through [`ContentEngine`], which keeps them testable with scripted
//! engines and keeps the HTTP surface in one place.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use draftmill_core::config::generation::GenerationConfig;
use draftmill_core::error::{AppError, ErrorKind};
use draftmill_core::result::AppResult;

/// Generation operations backing the pipeline stages.
#[async_trait]
pub trait ContentEngine: Send + Sync + std::fmt::Debug + 'static {
    /// Gather and synthesize research for a brief.
    async fn research(&self, title: &str, brief: &str) -> AppResult<Value>;

    /// Produce an outline from synthesized research.
    async fn outline(&self, title: &str, research: &Value) -> AppResult<Value>;

    /// Produce one outlined section.
    async fn produce_section(
        &self,
        title: &str,
        outline: &Value,
        section_index: usize,
    ) -> AppResult<Value>;

    /// Assemble produced sections into a full draft.
    async fn assemble(&self, title: &str, sections: &Value) -> AppResult<Value>;

    /// Score a draft for SEO/GEO quality.
    async fn score(&self, draft: &Value) -> AppResult<Value>;

    /// Rewrite a draft against its score report.
    async fn optimize(&self, draft: &Value, report: &Value) -> AppResult<Value>;

    /// Insert internal links into an optimized draft.
    async fn interlink(&self, draft: &Value) -> AppResult<Value>;

    /// Produce title/description/slug metadata for a finished draft.
    async fn metadata(&self, draft: &Value) -> AppResult<Value>;

    /// Embed a source document's text.
    async fn embed(&self, text: &str) -> AppResult<Value>;
}

/// Response envelope of the generation service.
#[derive(Debug, Deserialize)]
struct EngineResponse {
    success: bool,
    data: Option<Value>,
    error: Option<String>,
}

/// HTTP client for the generation service.
#[derive(Debug, Clone)]
pub struct HttpContentEngine {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpContentEngine {
    /// Build a client from configuration.
    pub fn new(config: &GenerationConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Internal,
                    "Failed to build generation HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// POST a request to the generation service and unwrap its envelope.
    async fn call(&self, path: &str, body: Value) -> AppResult<Value> {
        // A missing credential cannot heal on retry.
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::configuration("Generation API key is not configured")
        })?;

        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Generation request to {} failed", path),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Generation service returned {} for {}",
                status, path
            )));
        }

        let envelope: EngineResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Malformed generation response from {}", path),
                e,
            )
        })?;

        if !envelope.success {
            let message = envelope
                .error
                .unwrap_or_else(|| "Generation service reported failure".to_string());
            return Err(AppError::external_service(message));
        }

        envelope.data.ok_or_else(|| {
            AppError::external_service(format!("Generation response from {} had no data", path))
        })
    }
}

#[async_trait]
impl ContentEngine for HttpContentEngine {
    async fn research(&self, title: &str, brief: &str) -> AppResult<Value> {
        self.call("v1/research", json!({ "title": title, "brief": brief }))
            .await
    }

    async fn outline(&self, title: &str, research: &Value) -> AppResult<Value> {
        self.call("v1/outline", json!({ "title": title, "research": research }))
            .await
    }

    async fn produce_section(
        &self,
        title: &str,
        outline: &Value,
        section_index: usize,
    ) -> AppResult<Value> {
        self.call(
            "v1/section",
            json!({ "title": title, "outline": outline, "section_index": section_index }),
        )
        .await
    }

    async fn assemble(&self, title: &str, sections: &Value) -> AppResult<Value> {
        self.call("v1/assemble", json!({ "title": title, "sections": sections }))
            .await
    }

    async fn score(&self, draft: &Value) -> AppResult<Value> {
        self.call("v1/score", json!({ "draft": draft })).await
    }

    async fn optimize(&self, draft: &Value, report: &Value) -> AppResult<Value> {
        self.call("v1/optimize", json!({ "draft": draft, "report": report }))
            .await
    }

    async fn interlink(&self, draft: &Value) -> AppResult<Value> {
        self.call("v1/interlink", json!({ "draft": draft })).await
    }

    async fn metadata(&self, draft: &Value) -> AppResult<Value> {
        self.call("v1/metadata", json!({ "draft": draft })).await
    }

    async fn embed(&self, text: &str) -> AppResult<Value> {
        self.call("v1/embed", json!({ "text": text })).await
    }
}
