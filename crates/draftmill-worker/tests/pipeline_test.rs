//! Article pipeline chaining and stage handler tests.

mod helpers;

use uuid::Uuid;

use draftmill_entity::article::stage::ArticleStage;
use draftmill_entity::job::payload::{
    ArticleStagePayload, DocumentEmbeddingPayload, JobPayload,
};
use draftmill_entity::job::status::JobStatus;
use draftmill_worker::queue::EnqueueOptions;
use draftmill_worker::RunOutcome;

use helpers::{drain, new_article, pipeline_fixture};

#[tokio::test]
async fn test_full_pipeline_runs_to_completion() {
    let fixture = pipeline_fixture();
    let article = new_article("Rust at the edge", "CDN workers in Rust");
    let article_id = article.id;
    fixture.articles.insert(article);

    fixture.chainer.start(article_id, None).await.unwrap();
    let outcomes = drain(&fixture.dispatcher).await;

    assert_eq!(outcomes.len(), ArticleStage::ALL.len());
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, RunOutcome::Completed { .. })));

    let article = fixture.articles.get(article_id).unwrap();
    for stage in ArticleStage::ALL {
        assert!(
            article.stage_output(stage.output_field()).is_some(),
            "missing output for stage {}",
            stage
        );
    }
    assert_eq!(article.current_step.as_deref(), Some("metadata"));

    let jobs = fixture.store.all();
    assert_eq!(jobs.len(), ArticleStage::ALL.len());
    assert!(jobs.iter().all(|j| j.status == JobStatus::Completed));
}

#[tokio::test]
async fn test_each_stage_chains_exactly_one_successor() {
    let fixture = pipeline_fixture();
    let article = new_article("Title", "Brief");
    let article_id = article.id;
    fixture.articles.insert(article);

    fixture.chainer.start(article_id, None).await.unwrap();

    let outcome = fixture.dispatcher.run_once().await.unwrap();
    assert!(matches!(outcome, RunOutcome::Completed { .. }));

    assert_eq!(fixture.store.jobs_of_type("article_outline").len(), 1);
    assert_eq!(fixture.store.all().len(), 2);
}

#[tokio::test]
async fn test_final_stage_enqueues_nothing() {
    let fixture = pipeline_fixture();
    let article = new_article("Title", "Brief");
    let article_id = article.id;
    fixture.articles.insert(article);

    let next = fixture
        .chainer
        .advance(article_id, ArticleStage::Metadata)
        .await
        .unwrap();
    assert!(next.is_none());
    assert!(fixture.store.all().is_empty());
}

#[tokio::test]
async fn test_section_retry_resumes_from_persisted_state() {
    let fixture = pipeline_fixture();
    let article = new_article("Title", "Brief");
    let article_id = article.id;
    fixture.articles.insert(article);
    fixture.engine.fail_section_once(1);

    fixture.chainer.start(article_id, None).await.unwrap();

    // Research and outline succeed; section production fails on section 1.
    assert!(matches!(
        fixture.dispatcher.run_once().await.unwrap(),
        RunOutcome::Completed { .. }
    ));
    assert!(matches!(
        fixture.dispatcher.run_once().await.unwrap(),
        RunOutcome::Completed { .. }
    ));
    assert!(matches!(
        fixture.dispatcher.run_once().await.unwrap(),
        RunOutcome::FailedWillRetry { .. }
    ));

    // Section 0 survived the failed attempt.
    let article = fixture.articles.get(article_id).unwrap();
    let sections = article.stage_output("sections").unwrap();
    assert!(sections.get("0").is_some());
    assert!(sections.get("1").is_none());

    // The retry picks up at section 1 and the pipeline finishes.
    let outcomes = drain(&fixture.dispatcher).await;
    assert!(outcomes
        .iter()
        .all(|o| matches!(o, RunOutcome::Completed { .. })));

    assert_eq!(fixture.engine.section_call_count(0), 1);
    assert_eq!(fixture.engine.section_call_count(1), 2);
    assert_eq!(fixture.engine.section_call_count(2), 1);

    let article = fixture.articles.get(article_id).unwrap();
    assert!(article.stage_output("metadata").is_some());
}

#[tokio::test]
async fn test_missing_prerequisite_output_is_permanent() {
    let fixture = pipeline_fixture();
    let article = new_article("Title", "Brief");
    let article_id = article.id;
    fixture.articles.insert(article);

    // Outline enqueued directly, without research output to read.
    let payload = JobPayload::ArticleStage(ArticleStagePayload {
        stage: ArticleStage::Outline,
        article_id,
    });
    fixture
        .jobs
        .enqueue(None, &payload, EnqueueOptions::default())
        .await
        .unwrap();

    let outcome = fixture.dispatcher.run_once().await.unwrap();
    assert!(matches!(outcome, RunOutcome::FailedPermanently { .. }));

    let article = fixture.articles.get(article_id).unwrap();
    assert_eq!(article.job_status.as_deref(), Some("failed"));
    assert!(article
        .job_error
        .unwrap()
        .contains("synthesized_research"));
}

#[tokio::test]
async fn test_missing_article_is_permanent() {
    let fixture = pipeline_fixture();

    let payload = JobPayload::ArticleStage(ArticleStagePayload {
        stage: ArticleStage::Research,
        article_id: Uuid::new_v4(),
    });
    let job = fixture
        .jobs
        .enqueue(None, &payload, EnqueueOptions::default())
        .await
        .unwrap();

    let outcome = fixture.dispatcher.run_once().await.unwrap();
    assert!(matches!(outcome, RunOutcome::FailedPermanently { .. }));
    assert_eq!(fixture.store.get(job.id).unwrap().status, JobStatus::Failed);
}

#[tokio::test]
async fn test_embedding_job_completes_standalone() {
    let fixture = pipeline_fixture();

    let payload = JobPayload::DocumentEmbedding(DocumentEmbeddingPayload {
        document_id: Uuid::new_v4(),
        text: "source text".to_string(),
    });
    let job = fixture
        .jobs
        .enqueue(None, &payload, EnqueueOptions::default())
        .await
        .unwrap();

    let outcome = fixture.dispatcher.run_once().await.unwrap();
    assert!(matches!(outcome, RunOutcome::Completed { .. }));

    let stored = fixture.store.get(job.id).unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    let result = stored.result.unwrap();
    assert!(result.get("embedding").is_some());
    assert!(fixture.store.all().len() == 1);
}

#[tokio::test]
async fn test_enqueue_uses_stage_job_type() {
    let fixture = pipeline_fixture();
    let article = new_article("Title", "Brief");
    let article_id = article.id;
    fixture.articles.insert(article);

    let job = fixture.chainer.start(article_id, None).await.unwrap();
    assert_eq!(job.job_type, "article_research");
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.max_attempts, 3);
}
