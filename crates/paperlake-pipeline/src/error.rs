//! Pipeline error taxonomy.
//!
//! Source and storage failures abort an ingestion run; data, model, and
//! storage failures during processing are isolated to the offending item
//! by the batch runner.

use thiserror::Error;

use paperlake_embeddings::EmbeddingError;
use paperlake_source::SourceError;
use paperlake_storage::StorageError;

/// Errors surfaced by the orchestrators.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Article source failure (rate limit, protocol, transport).
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Object store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Bronze payload missing or malformed during processing.
    #[error("Malformed bronze payload at {key}: {message}")]
    Data { key: String, message: String },

    /// Clean/embed failure for a specific item.
    #[error("Model error: {0}")]
    Model(#[from] EmbeddingError),

    /// Record could not be serialized for storage.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking worker task was aborted or panicked.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl PipelineError {
    /// Build a data error for a bronze key.
    pub fn data(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Data {
            key: key.into(),
            message: message.into(),
        }
    }
}
