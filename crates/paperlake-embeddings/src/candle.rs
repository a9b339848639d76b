//! Candle-based embedder.
//!
//! Runs sentence-transformers/all-MiniLM-L6-v2 locally: BERT forward pass,
//! attention-masked mean pooling, unit normalization. Model files are
//! fetched once from HuggingFace Hub into a local cache directory.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Output dimension of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Inputs longer than this are truncated before the forward pass.
pub const MAX_SEQ_LENGTH: usize = 256;

/// Default model repository on HuggingFace Hub.
pub const DEFAULT_MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// Local embedder over a BERT sentence-transformer.
///
/// Immutable after load, so a single instance is safe to share across
/// blocking workers.
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl CandleEmbedder {
    /// Load the default model, downloading files on first use.
    pub fn load_default() -> Result<Self, EmbeddingError> {
        Self::load(DEFAULT_MODEL_REPO, None)
    }

    /// Load a model by repository id, caching files under `cache_dir`
    /// (or the platform cache directory when `None`).
    pub fn load(repo_id: &str, cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        let model_dir = ensure_model_files(repo_id, cache_dir)?;
        Self::load_from_dir(repo_id, &model_dir)
    }

    /// Load from a directory already holding config.json, tokenizer.json
    /// and model.safetensors.
    pub fn load_from_dir(repo_id: &str, model_dir: &Path) -> Result<Self, EmbeddingError> {
        info!(repo = repo_id, dir = ?model_dir, "Loading embedding model");

        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(model_dir.join("config.json"))?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelFile(format!("invalid config.json: {}", e)))?;

        let tokenizer = Tokenizer::from_file(model_dir.join("tokenizer.json"))
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                &[model_dir.join("model.safetensors")],
                DType::F32,
                &device,
            )?
        };
        let model = BertModel::load(vb, &config)?;

        let name = repo_id.rsplit('/').next().unwrap_or(repo_id).to_string();
        info!(model = %name, dim = EMBEDDING_DIM, "Embedding model ready");

        Ok(Self {
            model,
            tokenizer,
            device,
            info: ModelInfo {
                name,
                dimension: EMBEDDING_DIM,
                max_sequence_length: MAX_SEQ_LENGTH,
            },
        })
    }
}

impl EmbeddingModel for CandleEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let len = encoding.get_ids().len().min(MAX_SEQ_LENGTH);
        let ids = encoding.get_ids()[..len].to_vec();
        let mask = encoding.get_attention_mask()[..len].to_vec();

        let input_ids = Tensor::from_vec(ids, (1, len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (1, len), &self.device)?;
        let token_type_ids = Tensor::zeros_like(&input_ids)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = mean_pool(&hidden, &attention_mask)?;
        let values: Vec<f32> = pooled.squeeze(0)?.to_vec1()?;

        debug!(tokens = len, "Embedded text");
        Ok(Embedding::new(values))
    }
}

/// Mean over token embeddings, weighted by the attention mask so padding
/// never contributes.
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor, EmbeddingError> {
    let mask = attention_mask
        .unsqueeze(2)?
        .broadcast_as(hidden.shape())?
        .to_dtype(DType::F32)?;

    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;

    Ok(summed.broadcast_div(&counts)?)
}

/// Make sure all model files exist locally, downloading missing ones.
fn ensure_model_files(
    repo_id: &str,
    cache_dir: Option<PathBuf>,
) -> Result<PathBuf, EmbeddingError> {
    let base = cache_dir.unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("paperlake")
            .join("models")
    });
    let model_dir = base.join(repo_id.replace('/', "_"));

    if MODEL_FILES.iter().all(|f| model_dir.join(f).exists()) {
        debug!(dir = ?model_dir, "Using cached model files");
        return Ok(model_dir);
    }

    info!(repo = repo_id, "Downloading model files");
    std::fs::create_dir_all(&model_dir)?;

    let api = hf_hub::api::sync::Api::new().map_err(|e| EmbeddingError::Download(e.to_string()))?;
    let repo = api.model(repo_id.to_string());

    for filename in MODEL_FILES {
        let source = repo
            .get(filename)
            .map_err(|e| EmbeddingError::Download(format!("{}: {}", filename, e)))?;
        std::fs::copy(&source, model_dir.join(filename))?;
        debug!(file = filename, "Downloaded");
    }

    Ok(model_dir)
}
