//! Application state shared across all handlers.

use std::sync::Arc;

use draftmill_core::config::AppConfig;
use draftmill_entity::job::store::JobStore;
use draftmill_worker::queue::JobQueue;
use draftmill_worker::Dispatcher;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Authoritative job store.
    pub job_store: Arc<dyn JobStore>,
    /// Job creation facade.
    pub jobs: Arc<JobQueue>,
    /// The single-job dispatcher driven by the trigger endpoint.
    pub dispatcher: Arc<Dispatcher>,
}
