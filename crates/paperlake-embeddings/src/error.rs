//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during cleaning or embedding.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Candle model error
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    /// Tokenizer error
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Model file download failure
    #[error("Failed to download model: {0}")]
    Download(String),

    /// Model file missing or unreadable
    #[error("Model file error: {0}")]
    ModelFile(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Produced vector does not match the declared dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
