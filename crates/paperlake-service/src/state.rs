//! Shared handler state.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use paperlake_pipeline::{BatchRunner, IngestionOrchestrator};
use paperlake_types::{IngestionSettings, ProcessingSettings};

/// State injected into every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub ingestion: Arc<IngestionOrchestrator>,
    pub runner: Arc<BatchRunner>,
    pub ingestion_settings: IngestionSettings,
    pub processing_settings: ProcessingSettings,
    /// Cancelled on shutdown; request-driven runs observe it too, so an
    /// in-flight ingestion stops at its next page boundary.
    pub cancel: CancellationToken,
}

impl AppState {
    pub fn new(
        ingestion: Arc<IngestionOrchestrator>,
        runner: Arc<BatchRunner>,
        ingestion_settings: IngestionSettings,
        processing_settings: ProcessingSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ingestion,
            runner,
            ingestion_settings,
            processing_settings,
            cancel,
        }
    }
}
