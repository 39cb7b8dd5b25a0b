//! Shared test helpers for API tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use draftmill_core::config::app::ServerConfig;
use draftmill_core::config::generation::GenerationConfig;
use draftmill_core::config::logging::LoggingConfig;
use draftmill_core::config::queue::QueueConfig;
use draftmill_core::config::worker::WorkerConfig;
use draftmill_core::config::{AppConfig, DatabaseConfig};
use draftmill_core::result::AppResult;
use draftmill_api::{build_router, AppState};
use draftmill_entity::job::model::Job;
use draftmill_entity::job::status::JobStatus;
use draftmill_entity::job::store::JobStore;
use draftmill_worker::queue::JobQueue;
use draftmill_worker::{Dispatcher, HandlerRegistry};

pub const TEST_SECRET: &str = "test-scheduler-secret";

/// In-memory job store backing the router under test.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<Uuid, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: &Job) -> AppResult<()> {
        self.jobs.lock().unwrap().insert(job.id, job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        Ok(self.jobs.lock().unwrap().get(&id).cloned())
    }

    async fn claim_next_pending(&self) -> AppResult<Option<Job>> {
        let mut jobs = self.jobs.lock().unwrap();
        let candidate = jobs
            .values()
            .filter(|j| j.status == JobStatus::Pending)
            .min_by_key(|j| (std::cmp::Reverse(j.priority), j.created_at))
            .map(|j| j.id);
        Ok(candidate.map(|id| {
            let job = jobs.get_mut(&id).unwrap();
            job.status = JobStatus::Processing;
            job.clone()
        }))
    }

    async fn mark_processing_if_pending(&self, id: Uuid) -> AppResult<Option<Job>> {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.get_mut(&id) {
            Some(job) if job.status == JobStatus::Pending => {
                job.status = JobStatus::Processing;
                Ok(Some(job.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_completed(&self, id: Uuid, result: Option<&Value>) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if job.status == JobStatus::Processing {
                job.status = JobStatus::Completed;
                job.result = result.cloned();
            }
        }
        Ok(())
    }

    async fn mark_retry(&self, id: Uuid, error: &str) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if job.status == JobStatus::Processing {
                job.attempts += 1;
                job.status = JobStatus::Pending;
                job.error = Some(error.to_string());
            }
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if job.status == JobStatus::Processing {
                job.attempts += 1;
                job.status = JobStatus::Failed;
                job.error = Some(error.to_string());
            }
        }
        Ok(())
    }

    async fn mark_unrunnable(&self, id: Uuid, error: &str) -> AppResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if job.status == JobStatus::Processing {
                job.status = JobStatus::Failed;
                job.error = Some(error.to_string());
            }
        }
        Ok(())
    }

    async fn count_by_status(&self, status: JobStatus) -> AppResult<i64> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.status == status)
            .count() as i64)
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/unused".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
        },
        queue: QueueConfig::default(),
        worker: WorkerConfig {
            scheduler_secret: TEST_SECRET.to_string(),
            default_max_attempts: 3,
            ticker_enabled: false,
            tick_schedule: "*/10 * * * * *".to_string(),
            inline_trigger: false,
        },
        generation: GenerationConfig {
            base_url: "http://localhost:9".to_string(),
            api_key: None,
            timeout_seconds: 5,
        },
        logging: LoggingConfig::default(),
    }
}

/// Test application context.
pub struct TestApp {
    /// The Axum router for making test requests.
    pub router: Router,
    /// The in-memory store behind the router.
    pub store: Arc<MemoryJobStore>,
}

impl TestApp {
    /// Build a router over an in-memory store and an empty registry.
    pub fn new() -> Self {
        let store = MemoryJobStore::new();
        let store_dyn: Arc<dyn JobStore> = store.clone();

        let jobs = Arc::new(JobQueue::new(store_dyn.clone(), None, 3));
        let dispatcher = Arc::new(Dispatcher::new(
            store_dyn.clone(),
            None,
            Arc::new(HandlerRegistry::new()),
        ));

        let state = AppState {
            config: Arc::new(test_config()),
            job_store: store_dyn,
            jobs,
            dispatcher,
        };

        Self {
            router: build_router(state),
            store,
        }
    }

    /// Send a request and return (status, parsed JSON body).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        secret: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(secret) = secret {
            builder = builder.header("x-scheduler-secret", secret);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
