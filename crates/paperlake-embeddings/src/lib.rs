//! # paperlake-embeddings
//!
//! Text cleaning and local embedding generation for the processing stage.
//!
//! Both transformations are pure collaborators behind traits:
//! - [`TextCleaner`]: deterministic text -> text normalization
//! - [`EmbeddingModel`]: text -> fixed-dimension vector
//!
//! [`CandleEmbedder`] runs all-MiniLM-L6-v2 locally via Candle (384
//! dimensions, mean pooling, unit-normalized), with model files cached
//! from HuggingFace Hub. Inference is CPU-bound; callers are expected to
//! run it off any scheduling thread.

pub mod candle;
pub mod cleaner;
pub mod error;
pub mod model;

pub use crate::candle::{CandleEmbedder, EMBEDDING_DIM};
pub use cleaner::{StopwordCleaner, TextCleaner};
pub use error::EmbeddingError;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
