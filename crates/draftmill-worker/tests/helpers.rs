//! Shared in-memory fakes for worker tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use draftmill_core::error::AppError;
use draftmill_core::result::AppResult;
use draftmill_entity::article::model::Article;
use draftmill_entity::article::progress::StageProgress;
use draftmill_entity::article::stage::ArticleStage;
use draftmill_entity::article::store::ArticleStore;
use draftmill_entity::job::model::Job;
use draftmill_entity::job::status::JobStatus;
use draftmill_entity::job::store::JobStore;
use draftmill_worker::chain::PipelineChainer;
use draftmill_worker::engine::ContentEngine;
use draftmill_worker::handlers;
use draftmill_worker::queue::JobQueue;
use draftmill_worker::registry::{HandlerRegistry, JobExecutionError, JobHandler};
use draftmill_worker::trigger::NoopTrigger;
use draftmill_worker::{Dispatcher, RunOutcome};

/// In-memory job store. Claims are atomic because every operation runs
/// under one mutex, mirroring the row-lock guarantee of the real store.
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

    pub fn all(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().values().cloned().collect()
    }

    pub fn jobs_of_type(&self, job_type: &str) -> Vec<Job> {
        self.jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.job_type == job_type)
            .cloned()
            .collect()
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
            job.updated_at = Utc::now();
            job.clone()
        }))
    }

    async fn mark_processing_if_pending(&self, id: Uuid) -> AppResult<Option<Job>> {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.get_mut(&id) {
            Some(job) if job.status == JobStatus::Pending => {
                job.status = JobStatus::Processing;
                job.updated_at = Utc::now();
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
                job.updated_at = Utc::now();
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
                job.updated_at = Utc::now();
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
                job.updated_at = Utc::now();
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
                job.updated_at = Utc::now();
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

/// In-memory article store.
#[derive(Debug, Default)]
pub struct MemoryArticleStore {
    articles: Mutex<HashMap<Uuid, Article>>,
}

impl MemoryArticleStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, article: Article) {
        self.articles.lock().unwrap().insert(article.id, article);
    }

    pub fn get(&self, id: Uuid) -> Option<Article> {
        self.articles.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Article>> {
        Ok(self.articles.lock().unwrap().get(&id).cloned())
    }

    async fn record_progress(&self, id: Uuid, progress: &StageProgress) -> AppResult<()> {
        let mut articles = self.articles.lock().unwrap();
        if let Some(article) = articles.get_mut(&id) {
            article.processing_progress = Some(serde_json::to_value(progress)?);
            article.job_status = Some("processing".to_string());
            article.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn write_stage_output(
        &self,
        id: Uuid,
        stage: ArticleStage,
        output: &Value,
    ) -> AppResult<()> {
        let mut articles = self.articles.lock().unwrap();
        if let Some(article) = articles.get_mut(&id) {
            article.stage_outputs[stage.output_field()] = output.clone();
            article.current_step = Some(stage.as_str().to_string());
            article.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_job_failed(&self, id: Uuid, error: &str) -> AppResult<()> {
        let mut articles = self.articles.lock().unwrap();
        if let Some(article) = articles.get_mut(&id) {
            article.job_status = Some("failed".to_string());
            article.job_error = Some(error.to_string());
            article.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// Build a fresh article with empty stage outputs.
pub fn new_article(title: &str, brief: &str) -> Article {
    let now = Utc::now();
    Article {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        title: title.to_string(),
        brief: brief.to_string(),
        current_step: None,
        processing_progress: None,
        stage_outputs: json!({}),
        job_status: None,
        job_error: None,
        created_at: now,
        updated_at: now,
    }
}

/// Handler that replays a script of results, one per execution.
#[derive(Debug)]
pub struct ScriptedHandler {
    job_type: String,
    script: Mutex<VecDeque<Result<Option<Value>, JobExecutionError>>>,
}

impl ScriptedHandler {
    pub fn new(
        job_type: &str,
        script: Vec<Result<Option<Value>, JobExecutionError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            job_type: job_type.to_string(),
            script: Mutex::new(script.into()),
        })
    }
}

#[async_trait]
impl JobHandler for ScriptedHandler {
    fn job_type(&self) -> &str {
        &self.job_type
    }

    async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("handler script exhausted")
    }
}

/// Engine returning canned outputs, with optional one-shot section
/// failures. Records every section call for resume assertions.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    fail_section_once: Mutex<HashSet<usize>>,
    pub section_calls: Mutex<Vec<usize>>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next call for `index` fail transiently, once.
    pub fn fail_section_once(&self, index: usize) {
        self.fail_section_once.lock().unwrap().insert(index);
    }

    pub fn section_call_count(&self, index: usize) -> usize {
        self.section_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|i| **i == index)
            .count()
    }
}

#[async_trait]
impl ContentEngine for ScriptedEngine {
    async fn research(&self, title: &str, _brief: &str) -> AppResult<Value> {
        Ok(json!({ "summary": format!("research for {}", title) }))
    }

    async fn outline(&self, _title: &str, _research: &Value) -> AppResult<Value> {
        Ok(json!({
            "sections": [
                { "heading": "Introduction" },
                { "heading": "Body" },
                { "heading": "Conclusion" },
            ]
        }))
    }

    async fn produce_section(
        &self,
        _title: &str,
        _outline: &Value,
        section_index: usize,
    ) -> AppResult<Value> {
        self.section_calls.lock().unwrap().push(section_index);
        if self.fail_section_once.lock().unwrap().remove(&section_index) {
            return Err(AppError::external_service(format!(
                "section {} generation timed out",
                section_index
            )));
        }
        Ok(json!({ "index": section_index, "text": format!("section {}", section_index) }))
    }

    async fn assemble(&self, _title: &str, _sections: &Value) -> AppResult<Value> {
        Ok(json!({ "draft": "assembled" }))
    }

    async fn score(&self, _draft: &Value) -> AppResult<Value> {
        Ok(json!({ "score": 82 }))
    }

    async fn optimize(&self, _draft: &Value, _report: &Value) -> AppResult<Value> {
        Ok(json!({ "draft": "optimized" }))
    }

    async fn interlink(&self, _draft: &Value) -> AppResult<Value> {
        Ok(json!({ "draft": "interlinked" }))
    }

    async fn metadata(&self, _draft: &Value) -> AppResult<Value> {
        Ok(json!({ "title": "Final", "slug": "final" }))
    }

    async fn embed(&self, _text: &str) -> AppResult<Value> {
        Ok(json!([0.1, 0.2, 0.3]))
    }
}

/// Fully wired in-memory pipeline.
pub struct PipelineFixture {
    pub store: Arc<MemoryJobStore>,
    pub articles: Arc<MemoryArticleStore>,
    pub engine: Arc<ScriptedEngine>,
    pub jobs: Arc<JobQueue>,
    pub chainer: PipelineChainer,
    pub dispatcher: Dispatcher,
}

pub fn pipeline_fixture() -> PipelineFixture {
    let store = MemoryJobStore::new();
    let articles = MemoryArticleStore::new();
    let engine = ScriptedEngine::new();

    let store_dyn: Arc<dyn JobStore> = store.clone();
    let jobs = Arc::new(JobQueue::new(store_dyn.clone(), None, 3));
    let chainer = PipelineChainer::new(Arc::clone(&jobs), Arc::new(NoopTrigger));

    let mut registry = HandlerRegistry::new();
    handlers::register_all(
        &mut registry,
        articles.clone() as Arc<dyn ArticleStore>,
        engine.clone() as Arc<dyn ContentEngine>,
        chainer.clone(),
    );

    let dispatcher = Dispatcher::new(store_dyn, None, Arc::new(registry));

    PipelineFixture {
        store,
        articles,
        engine,
        jobs,
        chainer,
        dispatcher,
    }
}

/// Run the dispatcher until it reports no jobs, returning every outcome.
pub async fn drain(dispatcher: &Dispatcher) -> Vec<RunOutcome> {
    let mut outcomes = Vec::new();
    for _ in 0..32 {
        let outcome = dispatcher.run_once().await.expect("dispatch failed");
        if outcome == RunOutcome::NoJobs {
            return outcomes;
        }
        outcomes.push(outcome);
    }
    panic!("dispatcher did not drain within 32 invocations");
}
