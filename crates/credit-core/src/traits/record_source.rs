// # Record Source Trait
//
// Defines the interface for fetching the encrypted payload.
//
// ## Implementations
//
// - HTTP endpoint (with optional proxy fallback): `credit-source-http` crate
// - Test doubles in the contract tests
//
// A source returns the raw base64 ciphertext and nothing else. Envelope
// handling (`code`/`msg` checks, transport fallback) belongs to the
// implementation; decryption and payload parsing belong to the engine. A
// fetch failure aborts the run with the stored snapshot left untouched, so
// sources should fail rather than return partial data.

use async_trait::async_trait;

/// Trait for record source implementations
///
/// Implementations must be thread-safe and usable across async tasks. They
/// perform a single fetch per call; the engine never retries, so any
/// multi-candidate fallback must happen inside the source.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the base64 ciphertext for the monitored organization
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The ciphertext, ready for decryption
    /// - `Err(Error)`: Transport failure or an envelope signalling no data;
    ///   the run processes nothing
    async fn fetch_ciphertext(&self) -> Result<String, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}

/// Helper trait for constructing record sources from configuration
pub trait RecordSourceFactory: Send + Sync {
    /// Create a RecordSource instance from configuration
    fn create(
        &self,
        config: &crate::config::SourceConfig,
    ) -> Result<Box<dyn RecordSource>, crate::Error>;
}
