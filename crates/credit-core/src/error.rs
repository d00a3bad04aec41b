//! Error types for the credit monitor
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the credit monitor
///
/// Run-level handling per variant:
/// - `Decryption` / `Parse`: abort the run, leave the snapshot untouched
/// - `RecordField`: exclude the record from alerting, keep it in the report
/// - `Persistence`: log only, never roll back sent notifications
/// - `Dispatch`: log, continue with the remaining chunks
#[derive(Error, Debug)]
pub enum Error {
    /// Ciphertext could not be decoded into a JSON document
    #[error("decryption error: {0}")]
    Decryption(String),

    /// Decrypted document is missing the expected payload shape
    #[error("payload parse error: {0}")]
    Parse(String),

    /// An individual record carries an unusable field
    #[error("record field error: {0}")]
    RecordField(String),

    /// Snapshot store read/write failure
    #[error("snapshot store error: {0}")]
    Persistence(String),

    /// A notification chunk failed to send
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// Record source (fetch) failure
    #[error("record source error: {0}")]
    Source(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a decryption error
    pub fn decryption(msg: impl Into<String>) -> Self {
        Self::Decryption(msg.into())
    }

    /// Create a payload parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a record field error
    pub fn record_field(msg: impl Into<String>) -> Self {
        Self::RecordField(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a dispatch error
    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch(msg.into())
    }

    /// Create a record source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
