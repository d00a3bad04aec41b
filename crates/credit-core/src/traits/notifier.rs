// # Notifier Trait
//
// Defines the interface for delivering rendered report chunks.
//
// ## Implementations
//
// - Chat webhook: `credit-notify-webhook` crate
// - Test doubles in the contract tests
//
// ## Delivery Contract
//
// Notifiers are single-shot: one call delivers one Markdown chunk or fails.
// Delivery policy is owned by the engine's dispatcher, which sends chunks
// sequentially, logs a failure, and moves on to the next chunk. Because the
// pipeline is deliberately best-effort end to end, implementations must NOT:
//
// - retry or back off internally
// - reorder, buffer, or merge chunks
// - hold state between calls
//
// Callers wanting resilience wrap the sink.

use async_trait::async_trait;

/// Trait for notification sink implementations
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one Markdown-formatted text chunk
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The sink accepted the chunk
    /// - `Err(Error)`: Transport failure or non-success response; the
    ///   dispatcher logs it and continues with the remaining chunks
    async fn send_chunk(&self, content: &str) -> Result<(), crate::Error>;

    /// Get the notifier name (for logging/debugging)
    fn notifier_name(&self) -> &'static str;
}

/// Helper trait for constructing notifiers from configuration
pub trait NotifierFactory: Send + Sync {
    /// Create a Notifier instance from configuration
    fn create(
        &self,
        config: &crate::config::NotifierConfig,
    ) -> Result<Box<dyn Notifier>, crate::Error>;
}
