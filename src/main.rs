//! Draftmill Server — background job queue and article pipeline
//! orchestrator.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use draftmill_core::config::AppConfig;
use draftmill_core::error::AppError;
use draftmill_core::traits::queue::FastQueue;
use draftmill_entity::article::store::ArticleStore;
use draftmill_entity::job::store::JobStore;
use draftmill_worker::engine::HttpContentEngine;
use draftmill_worker::handlers;
use draftmill_worker::queue::JobQueue;
use draftmill_worker::trigger::{ChannelTrigger, NoopTrigger, SelfTrigger};
use draftmill_worker::{DispatchTicker, Dispatcher, HandlerRegistry, PipelineChainer};

#[tokio::main]
async fn main() {
    let env = std::env::var("DRAFTMILL_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Draftmill v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = draftmill_database::connection::connect(&config.database).await?;
    draftmill_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Fast queue (optional) ────────────────────────────
    tracing::info!(
        "Initializing fast queue (provider: {})...",
        config.queue.provider
    );
    let fast_queue: Option<Arc<dyn FastQueue>> =
        draftmill_queue::provider::FastQueueManager::new(&config.queue)
            .await?
            .map(|manager| Arc::new(manager) as Arc<dyn FastQueue>);
    match &fast_queue {
        Some(_) => tracing::info!("Fast queue initialized"),
        None => tracing::info!("No fast queue configured; using database claim path only"),
    }

    // ── Step 3: Stores ───────────────────────────────────────────
    let job_store: Arc<dyn JobStore> = Arc::new(
        draftmill_database::stores::job::PgJobStore::new(db_pool.clone()),
    );
    let article_store: Arc<dyn ArticleStore> = Arc::new(
        draftmill_database::stores::article::PgArticleStore::new(db_pool.clone()),
    );

    // ── Step 4: Generation engine client ─────────────────────────
    let engine = Arc::new(HttpContentEngine::new(&config.generation)?);

    // ── Step 5: Queue facade + pipeline chainer ──────────────────
    let jobs = Arc::new(JobQueue::new(
        Arc::clone(&job_store),
        fast_queue.clone(),
        config.worker.default_max_attempts,
    ));

    let (trigger, trigger_rx): (Arc<dyn SelfTrigger>, _) = if config.worker.inline_trigger {
        let (trigger, rx) = ChannelTrigger::new(64);
        (Arc::new(trigger), Some(rx))
    } else {
        (Arc::new(NoopTrigger), None)
    };
    let chainer = PipelineChainer::new(Arc::clone(&jobs), trigger);

    // ── Step 6: Handler registry + dispatcher ────────────────────
    let mut registry = HandlerRegistry::new();
    handlers::register_all(
        &mut registry,
        Arc::clone(&article_store),
        engine,
        chainer.clone(),
    );
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&job_store),
        fast_queue,
        Arc::new(registry),
    ));

    // Inline trigger drain loop for single-process deployments.
    if let Some(mut rx) = trigger_rx {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                if let Err(e) = dispatcher.run_once().await {
                    tracing::error!("Inline dispatch failed: {}", e);
                }
            }
        });
        tracing::info!("Inline dispatch trigger enabled");
    }

    // ── Step 7: Cron ticker (optional) ───────────────────────────
    let mut ticker = if config.worker.ticker_enabled {
        let ticker =
            DispatchTicker::new(Arc::clone(&dispatcher), &config.worker.tick_schedule).await?;
        ticker.start().await?;
        tracing::info!("Dispatch ticker enabled ({})", config.worker.tick_schedule);
        Some(ticker)
    } else {
        None
    };

    // ── Step 8: HTTP server ──────────────────────────────────────
    let app_state = draftmill_api::AppState {
        config: Arc::new(config.clone()),
        job_store,
        jobs,
        dispatcher,
    };
    let app = draftmill_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Draftmill server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    if let Some(ticker) = ticker.as_mut() {
        ticker.shutdown().await?;
    }

    tracing::info!("Draftmill server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
