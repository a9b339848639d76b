//! Command entry points: serve, ingest, process.
//!
//! Each command loads layered configuration, applies CLI overrides, wires
//! the pipeline components it needs and runs. `serve` is the long-running
//! mode; `ingest` and `process` are one-shot passes for cron jobs and
//! manual runs.

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use paperlake_embeddings::{CandleEmbedder, StopwordCleaner};
use paperlake_pipeline::{
    BatchRunner, IngestionOrchestrator, ProcessingOrchestrator, RandomWindowBackoff,
};
use paperlake_service::{router, spawn_processing_loop, AppState};
use paperlake_source::ArxivSource;
use paperlake_storage::{ObjectStore, RocksObjectStore};
use paperlake_types::{ModelSettings, Settings};

fn init_logging(settings: &Settings, log_level_override: Option<&str>) -> Result<()> {
    let level = log_level_override.unwrap_or(&settings.log_level);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn open_store(settings: &Settings) -> Result<Arc<dyn ObjectStore>> {
    if let Some(parent) = settings.db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }
    let store = RocksObjectStore::open(&settings.db_path)
        .with_context(|| format!("Failed to open store at {}", settings.db_path.display()))?;
    Ok(Arc::new(store))
}

/// Model loading downloads files and mmaps weights; keep it off the
/// async scheduler.
async fn load_embedder(model: &ModelSettings) -> Result<Arc<CandleEmbedder>> {
    let repo_id = model.repo_id.clone();
    let cache_dir = model.cache_dir.clone();
    let embedder = tokio::task::spawn_blocking(move || CandleEmbedder::load(&repo_id, cache_dir))
        .await
        .context("Model loading task panicked")?
        .context("Failed to load embedding model")?;
    Ok(Arc::new(embedder))
}

fn build_ingestion(
    settings: &Settings,
    store: Arc<dyn ObjectStore>,
) -> Result<Arc<IngestionOrchestrator>> {
    let source = Arc::new(ArxivSource::new().context("Failed to build HTTP client")?);
    let backoff = Arc::new(RandomWindowBackoff::new(
        settings.ingestion.backoff_min_secs,
        settings.ingestion.backoff_max_secs,
    ));
    Ok(Arc::new(IngestionOrchestrator::new(source, store, backoff)))
}

async fn build_runner(settings: &Settings, store: Arc<dyn ObjectStore>) -> Result<Arc<BatchRunner>> {
    let embedder = load_embedder(&settings.model).await?;
    let processor = Arc::new(ProcessingOrchestrator::new(
        store.clone(),
        Arc::new(StopwordCleaner::default()),
        embedder,
    ));
    Ok(Arc::new(BatchRunner::new(store, processor)))
}

/// Start the HTTP service.
///
/// Serves until SIGINT/SIGTERM, then cancels in-flight pipeline runs and
/// the background loop before returning.
pub async fn run_serve(
    config_path: Option<&str>,
    port_override: Option<u16>,
    db_path_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(port) = port_override {
        settings.http_port = port;
    }
    if let Some(db_path) = db_path_override {
        settings.db_path = db_path.into();
    }
    init_logging(&settings, log_level_override)?;

    info!("PaperLake daemon starting");
    info!("  Database path: {}", settings.db_path.display());
    info!("  HTTP port: {}", settings.http_port);
    info!("  Model: {}", settings.model.repo_id);

    let store = open_store(&settings)?;
    let ingestion = build_ingestion(&settings, store.clone())?;
    let runner = build_runner(&settings, store).await?;

    let cancel = CancellationToken::new();

    let background = if settings.processing.run_on_startup {
        Some(spawn_processing_loop(
            runner.clone(),
            settings.processing.clone(),
            cancel.clone(),
        ))
    } else {
        None
    };

    let app = router(AppState::new(
        ingestion,
        runner,
        settings.ingestion.clone(),
        settings.processing.clone(),
        cancel.clone(),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    let shutdown_cancel = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown_cancel.cancel();
        })
        .await
        .context("Server error")?;

    cancel.cancel();
    if let Some(handle) = background {
        handle.await.context("Background loop panicked")?;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Run one ingestion pass and exit.
pub async fn run_ingest(
    config_path: Option<&str>,
    query_override: Option<&str>,
    max_results_override: Option<usize>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let settings = Settings::load(config_path).context("Failed to load configuration")?;
    init_logging(&settings, log_level_override)?;

    let query = query_override.unwrap_or(&settings.ingestion.default_query);
    let max_results = max_results_override.unwrap_or(settings.ingestion.default_max_results);

    let store = open_store(&settings)?;
    let ingestion = build_ingestion(&settings, store)?;

    let cancel = CancellationToken::new();
    let saved = ingestion.run(query, max_results, &cancel).await?;

    println!("Ingested {} articles for query '{}'", saved, query);
    Ok(())
}

/// Run one processing pass and exit.
pub async fn run_process(
    config_path: Option<&str>,
    limit_override: Option<usize>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let settings = Settings::load(config_path).context("Failed to load configuration")?;
    init_logging(&settings, log_level_override)?;

    let limit = limit_override.unwrap_or(settings.processing.pass_size);

    let store = open_store(&settings)?;
    let runner = build_runner(&settings, store).await?;

    let cancel = CancellationToken::new();
    let stats = runner.run_pass(limit, &cancel).await?;

    println!(
        "Processed {} articles ({} skipped, {} failed)",
        stats.processed, stats.skipped, stats.failed
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            // Without a signal handler the only way out is an external kill.
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
