//! Ingestion orchestrator.
//!
//! Drives the paginated source into the bronze layer:
//! fetch page -> save every record -> randomized backoff -> next page,
//! until the requested count is reached or the source is exhausted.
//!
//! Failure policy: any source error and any bronze put error abort the run
//! immediately. Pages saved before the failure remain valid; the bronze
//! layer never silently drops a record. Cancellation is observed at page
//! boundaries only, so no partially saved page is ever produced by a
//! cancel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use paperlake_source::ArticleSource;
use paperlake_storage::{Collection, ObjectStore};
use paperlake_types::RawEnvelope;

use crate::error::PipelineError;

/// Pause between page fetches.
#[async_trait]
pub trait Backoff: Send + Sync {
    /// Sleep out the backoff interval. Returns false when interrupted by
    /// cancellation.
    async fn wait(&self, cancel: &CancellationToken) -> bool;
}

/// Uniformly random pause inside a fixed window, so fetch timing never
/// forms a pattern the source could rate-limit on.
pub struct RandomWindowBackoff {
    min: Duration,
    max: Duration,
}

impl RandomWindowBackoff {
    /// Window bounds in seconds; `min_secs <= max_secs` expected
    /// (validated at config load).
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self {
            min: Duration::from_secs_f64(min_secs),
            max: Duration::from_secs_f64(max_secs),
        }
    }

    fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let secs = rand::rng().random_range(self.min.as_secs_f64()..self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

#[async_trait]
impl Backoff for RandomWindowBackoff {
    async fn wait(&self, cancel: &CancellationToken) -> bool {
        let pause = self.sample();
        info!(pause_secs = pause.as_secs_f64(), "Backing off before next page");
        tokio::select! {
            _ = tokio::time::sleep(pause) => true,
            _ = cancel.cancelled() => {
                debug!("Backoff interrupted by cancellation");
                false
            }
        }
    }
}

/// Pages articles from a source into the bronze layer.
pub struct IngestionOrchestrator {
    source: Arc<dyn ArticleSource>,
    store: Arc<dyn ObjectStore>,
    backoff: Arc<dyn Backoff>,
}

impl IngestionOrchestrator {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        store: Arc<dyn ObjectStore>,
        backoff: Arc<dyn Backoff>,
    ) -> Self {
        Self {
            source,
            store,
            backoff,
        }
    }

    /// Ingest up to `max_results` articles for `query`.
    ///
    /// Returns the number of records saved. Cancellation stops the run at
    /// the next page boundary and returns the count collected so far.
    pub async fn run(
        &self,
        query: &str,
        max_results: usize,
        cancel: &CancellationToken,
    ) -> Result<usize, PipelineError> {
        let page_size = self.source.page_size();
        let mut collected: usize = 0;
        let mut offset: usize = 0;

        info!(query = query, max_results = max_results, "Starting ingestion run");

        while collected < max_results {
            if cancel.is_cancelled() {
                info!(collected = collected, "Ingestion cancelled at page boundary");
                break;
            }

            debug!(offset = offset, "Fetching page");
            let articles = self.source.fetch(query, page_size, offset).await?;

            if articles.is_empty() {
                info!("Source exhausted, no articles returned");
                break;
            }

            let returned = articles.len();
            for article in articles {
                let envelope = RawEnvelope::new(self.source.source_name(), query, article);
                let key = envelope.article_data.object_key();
                let bytes = serde_json::to_vec(&envelope)?;
                // A failed bronze save is fatal: continuing would drop a
                // source record and break the append-only guarantee.
                self.store.put(Collection::Bronze, &key, &bytes).await?;
            }

            collected += returned;
            // Advance by records returned, not requested, so short or
            // merged pages never skip records.
            offset += returned;

            info!(collected = collected, max_results = max_results, "Page saved");

            if returned < page_size {
                info!("Short page, source exhausted");
                break;
            }

            if collected < max_results && !self.backoff.wait(cancel).await {
                info!(collected = collected, "Ingestion cancelled during backoff");
                break;
            }
        }

        info!(total = collected, "Ingestion run complete");
        Ok(collected)
    }
}
