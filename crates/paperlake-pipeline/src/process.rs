//! Per-item processing orchestrator.
//!
//! One bronze object in, one silver object out:
//! idempotency check -> fetch envelope -> clean -> embed -> save.
//! The silver object only becomes visible after the full record (cleaned
//! text plus embedding) is assembled; there is never a partial record.

use std::sync::Arc;

use tracing::{debug, info};

use paperlake_embeddings::{EmbeddingError, EmbeddingModel, TextCleaner};
use paperlake_storage::{Collection, ObjectStore, StorageError};
use paperlake_types::{ProcessedArticle, RawEnvelope};

use crate::error::PipelineError;
use crate::plan::article_id;

/// Result of processing a single bronze key.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// A silver object already existed for this id; nothing was done.
    Skipped,
    /// A new silver object was created.
    Processed(ProcessedArticle),
}

/// Turns bronze envelopes into silver records, at most once per id.
pub struct ProcessingOrchestrator {
    store: Arc<dyn ObjectStore>,
    cleaner: Arc<dyn TextCleaner>,
    embedder: Arc<dyn EmbeddingModel>,
}

impl ProcessingOrchestrator {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        cleaner: Arc<dyn TextCleaner>,
        embedder: Arc<dyn EmbeddingModel>,
    ) -> Self {
        Self {
            store,
            cleaner,
            embedder,
        }
    }

    /// Process one bronze object into the silver layer.
    pub async fn process_one(&self, bronze_key: &str) -> Result<ProcessOutcome, PipelineError> {
        let id = article_id(bronze_key);
        let silver_key = format!("{}.json", id);

        if self.store.exists(Collection::Silver, &silver_key).await? {
            debug!(id = id, "Already processed, skipping");
            return Ok(ProcessOutcome::Skipped);
        }

        debug!(key = bronze_key, "Processing bronze object");

        let bytes = match self.store.get(Collection::Bronze, bronze_key).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_)) => {
                return Err(PipelineError::data(bronze_key, "bronze object missing"))
            }
            Err(e) => return Err(e.into()),
        };
        let envelope: RawEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| PipelineError::data(bronze_key, format!("invalid envelope: {}", e)))?;
        let article = envelope.article_data;

        // Clean and embed are CPU-bound; run them off the scheduler thread
        // so concurrent ingestion and request handling never stall.
        let cleaner = Arc::clone(&self.cleaner);
        let embedder = Arc::clone(&self.embedder);
        let summary = article.summary.clone();
        let (cleaned, embedding) = tokio::task::spawn_blocking(move || {
            let cleaned = cleaner.clean(&summary);
            let embedding = embedder.embed(&cleaned)?;
            Ok::<_, EmbeddingError>((cleaned, embedding))
        })
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))??;

        let expected = self.embedder.info().dimension;
        if embedding.dimension() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: embedding.dimension(),
            }
            .into());
        }

        let processed = ProcessedArticle {
            id: article.id,
            title: article.title,
            summary: article.summary,
            cleaned_summary: cleaned,
            embedding: embedding.into_values(),
            categories: article.categories,
            published: article.published,
        };

        let payload = serde_json::to_vec(&processed)?;
        self.store
            .put(Collection::Silver, &processed.object_key(), &payload)
            .await?;

        info!(id = %processed.id, "Stored processed article");
        Ok(ProcessOutcome::Processed(processed))
    }
}
