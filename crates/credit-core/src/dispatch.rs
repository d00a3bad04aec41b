//! Best-effort chunk dispatch
//!
//! Sends rendered chunks through the notifier sequentially, one call per
//! chunk. A failed chunk is logged and skipped; delivery of the remaining
//! chunks continues. There is no retry and no backoff anywhere in the
//! pipeline; callers wanting resilience wrap the sink.

use tracing::{debug, error};

use crate::traits::Notifier;

/// Outcome of dispatching one run's chunks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Chunks the sink accepted
    pub sent: usize,
    /// Chunks that failed (logged, not retried)
    pub failed: usize,
}

impl DispatchSummary {
    /// True when every chunk was accepted
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Send each chunk, in order, through the notifier
pub async fn dispatch_chunks(notifier: &dyn Notifier, chunks: &[String]) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for (index, chunk) in chunks.iter().enumerate() {
        match notifier.send_chunk(chunk).await {
            Ok(()) => {
                debug!(
                    "chunk {}/{} ({} bytes) delivered via {}",
                    index + 1,
                    chunks.len(),
                    chunk.len(),
                    notifier.notifier_name()
                );
                summary.sent += 1;
            }
            Err(e) => {
                // Partial delivery is an accepted outcome.
                error!(
                    "chunk {}/{} failed via {}: {}",
                    index + 1,
                    chunks.len(),
                    notifier.notifier_name(),
                    e
                );
                summary.failed += 1;
            }
        }
    }

    summary
}
