//! Background processing loop.
//!
//! When `processing.run_on_startup` is set, the daemon spawns this loop
//! next to the HTTP server. It keeps running small passes so records
//! ingested at any point get processed without an operator calling
//! `/process_batch`, and stops when the shutdown token fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use paperlake_pipeline::BatchRunner;
use paperlake_types::ProcessingSettings;

/// Spawn the autonomous processing loop.
///
/// Pass failures are logged and the loop continues; only cancellation
/// stops it. The handle resolves once the loop has observed the token.
pub fn spawn_processing_loop(
    runner: Arc<BatchRunner>,
    settings: ProcessingSettings,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let pause = Duration::from_secs(settings.pause_secs);
    let pass_size = settings.pass_size;

    tokio::spawn(async move {
        info!(pass_size = pass_size, "Background processing loop started");

        loop {
            if cancel.is_cancelled() {
                break;
            }

            match runner.run_pass(pass_size, &cancel).await {
                Ok(stats) if stats.total() > 0 => {
                    info!(
                        processed = stats.processed,
                        skipped = stats.skipped,
                        failed = stats.failed,
                        "Background pass complete"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Background pass failed, retrying after pause");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = cancel.cancelled() => break,
            }
        }

        info!("Background processing loop stopped");
    })
}
