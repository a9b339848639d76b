//! Embedding model trait and vector type.

use crate::error::EmbeddingError;

/// A fixed-dimension embedding vector, normalized to unit length.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create an embedding, normalizing the vector to unit length.
    pub fn new(values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let values = if norm > 0.0 {
            values.iter().map(|x| x / norm).collect()
        } else {
            values
        };
        Self { values }
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Take the raw vector out of the wrapper.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

/// Static description of an embedding model.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name (e.g. "all-MiniLM-L6-v2")
    pub name: String,
    /// Declared output dimension; every produced vector has this length.
    pub dimension: usize,
    /// Maximum input length in tokens
    pub max_sequence_length: usize,
}

/// Deterministic text -> vector function with a fixed declared dimension.
///
/// Implementations must be `Send + Sync`. A model that mutates internal
/// state per call must serialize access itself (or be held one-per-worker);
/// unsynchronized shared mutable state is not an acceptable implementation.
pub trait EmbeddingModel: Send + Sync {
    /// Model metadata, including the declared dimension.
    fn info(&self) -> &ModelInfo;

    /// Embed a single text. Deterministic for a fixed model/text pair.
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;
}
