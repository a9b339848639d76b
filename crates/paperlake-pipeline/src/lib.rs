//! # paperlake-pipeline
//!
//! The two-stage orchestration core.
//!
//! Stage one: [`IngestionOrchestrator`] pages through an article source and
//! appends each record to the bronze layer, pausing a randomized interval
//! between pages to stay under the source's rate limits.
//!
//! Stage two: [`ProcessingOrchestrator`] turns one bronze object into a
//! cleaned, embedded silver object, guarded by an existence check so
//! reprocessing is a no-op. [`BatchRunner`] drives passes over the
//! unprocessed set computed by [`plan::unprocessed`], isolating per-item
//! failures so one bad record never sinks a pass.
//!
//! All collaborators (source, store, cleaner, embedder) are injected as
//! capability traits; the orchestrators contain no I/O of their own beyond
//! those seams.

pub mod batch;
pub mod error;
pub mod ingest;
pub mod plan;
pub mod process;

pub use batch::{BatchRunner, PassStats};
pub use error::PipelineError;
pub use ingest::{Backoff, IngestionOrchestrator, RandomWindowBackoff};
pub use plan::{article_id, unprocessed};
pub use process::{ProcessOutcome, ProcessingOrchestrator};
