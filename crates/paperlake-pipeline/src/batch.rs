//! Batch runner over the unprocessed set.
//!
//! A pass lists both layers, plans the unprocessed set, and applies the
//! processing orchestrator to a bounded slice of it. Per-item failures are
//! counted and logged, never propagated: one malformed record must not
//! block the rest of the backlog. Listing failures do propagate, since
//! without listings there is no pass.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use paperlake_storage::{Collection, ObjectStore};

use crate::error::PipelineError;
use crate::plan::unprocessed;
use crate::process::{ProcessOutcome, ProcessingOrchestrator};

/// Counters for one pass (or an accumulated run of passes).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassStats {
    /// Items newly written to silver.
    pub processed: usize,
    /// Items whose silver object already existed.
    pub skipped: usize,
    /// Items that failed and were left for a later pass.
    pub failed: usize,
}

impl PassStats {
    /// Total items touched in the pass.
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }

    fn merge(&mut self, other: &PassStats) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Applies the processing orchestrator across passes until the backlog is
/// drained.
pub struct BatchRunner {
    store: Arc<dyn ObjectStore>,
    processor: Arc<ProcessingOrchestrator>,
}

impl BatchRunner {
    pub fn new(store: Arc<dyn ObjectStore>, processor: Arc<ProcessingOrchestrator>) -> Self {
        Self { store, processor }
    }

    /// Run one bounded pass: process up to `limit` unprocessed items.
    ///
    /// Cancellation is observed between items, never mid-item.
    pub async fn run_pass(
        &self,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<PassStats, PipelineError> {
        let bronze_keys = self.store.list(Collection::Bronze).await?;
        let silver_keys = self.store.list(Collection::Silver).await?;
        let pending = unprocessed(&bronze_keys, &silver_keys);

        if pending.is_empty() {
            debug!("No unprocessed items");
            return Ok(PassStats::default());
        }

        info!(
            pending = pending.len(),
            limit = limit,
            "Starting processing pass"
        );

        let mut stats = PassStats::default();
        for key in pending.iter().take(limit) {
            if cancel.is_cancelled() {
                info!(done = stats.total(), "Pass cancelled between items");
                break;
            }
            match self.processor.process_one(key).await {
                Ok(ProcessOutcome::Processed(_)) => stats.processed += 1,
                Ok(ProcessOutcome::Skipped) => stats.skipped += 1,
                Err(e) => {
                    warn!(key = %key, error = %e, "Item failed, continuing pass");
                    stats.failed += 1;
                }
            }
        }

        info!(
            processed = stats.processed,
            skipped = stats.skipped,
            failed = stats.failed,
            "Pass complete"
        );
        Ok(stats)
    }

    /// Run passes with a short pause in between until no unprocessed items
    /// remain or cancellation fires. Returns accumulated stats.
    pub async fn run_until_complete(
        &self,
        pass_size: usize,
        pause: Duration,
        cancel: &CancellationToken,
    ) -> Result<PassStats, PipelineError> {
        let mut totals = PassStats::default();

        loop {
            if cancel.is_cancelled() {
                info!("Batch loop cancelled");
                break;
            }

            let stats = self.run_pass(pass_size, cancel).await?;
            if stats.total() == 0 {
                info!(
                    processed = totals.processed,
                    "No unprocessed items remain"
                );
                break;
            }
            totals.merge(&stats);

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = cancel.cancelled() => {
                    info!("Batch loop cancelled during pause");
                    break;
                }
            }
        }

        Ok(totals)
    }
}
