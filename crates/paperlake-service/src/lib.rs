//! # paperlake-service
//!
//! HTTP surface over the pipeline orchestrators.
//!
//! Three endpoints:
//! - `POST /ingest?query=&max_results=` runs an ingestion pass into bronze
//! - `POST /process_batch?limit=` runs one processing pass into silver
//! - `GET /health` liveness probe
//!
//! The service owns no pipeline logic; it validates parameters, applies
//! configured defaults, and reports outcomes. An optional background loop
//! ([`spawn_processing_loop`]) drains the unprocessed set continuously
//! until the shared cancellation token fires.

pub mod background;
pub mod routes;
pub mod state;

pub use background::spawn_processing_loop;
pub use routes::router;
pub use state::AppState;
