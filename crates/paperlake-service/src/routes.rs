//! Route table and handlers.
//!
//! Handlers translate query parameters (falling back to configured
//! defaults), call into the pipeline, and render JSON. Pipeline failures
//! surface as a `{"status": "error", "message": ...}` body with a status
//! code keyed on where the failure originated.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::error;

use paperlake_pipeline::PipelineError;

use crate::state::AppState;

/// Build the service router over shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(ingest))
        .route("/process_batch", post(process_batch))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct IngestParams {
    query: Option<String>,
    max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    status: &'static str,
    message: String,
}

async fn ingest(
    State(state): State<AppState>,
    Query(params): Query<IngestParams>,
) -> Result<Json<IngestResponse>, ApiError> {
    let query = params
        .query
        .unwrap_or_else(|| state.ingestion_settings.default_query.clone());
    let max_results = params
        .max_results
        .unwrap_or(state.ingestion_settings.default_max_results);

    let saved = state.ingestion.run(&query, max_results, &state.cancel).await?;

    Ok(Json(IngestResponse {
        status: "success",
        message: format!("Ingested {} articles for query '{}'", saved, query),
    }))
}

#[derive(Debug, Deserialize)]
struct ProcessParams {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ProcessResponse {
    status: &'static str,
    processed: usize,
    skipped: usize,
    failed: usize,
}

async fn process_batch(
    State(state): State<AppState>,
    Query(params): Query<ProcessParams>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let limit = params.limit.unwrap_or(state.processing_settings.pass_size);

    let stats = state.runner.run_pass(limit, &state.cancel).await?;

    Ok(Json(ProcessResponse {
        status: "success",
        processed: stats.processed,
        skipped: stats.skipped,
        failed: stats.failed,
    }))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Pipeline failure rendered as an HTTP response.
struct ApiError(PipelineError);

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self(e)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            // Upstream source failures are not the service's fault.
            PipelineError::Source(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(error = %self.0, "Request failed");
        let body = ErrorBody {
            status: "error",
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
