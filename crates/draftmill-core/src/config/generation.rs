//! Generation service client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the external content-generation service.
///
/// Draftmill only speaks the call/response contract; the service itself
/// (research, drafting, scoring, embeddings) is an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the generation service.
    pub base_url: String,
    /// API key sent as a bearer token. Stage handlers that require it fail
    /// permanently when it is absent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    300
}
