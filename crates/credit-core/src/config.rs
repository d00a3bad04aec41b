//! Configuration types for the credit monitor
//!
//! The whole configuration is built once at startup (typically from
//! environment variables in `creditd`) and passed into each component as an
//! immutable value. No component reads process-wide state directly.

use serde::{Deserialize, Serialize};

/// AES block size in bytes; ciphertext length must be a multiple of this
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Main monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Symmetric cipher material for the payload
    pub cipher: CipherConfig,

    /// Record source configuration
    pub source: SourceConfig,

    /// Notification sink configuration
    pub notifier: NotifierConfig,

    /// Snapshot store configuration
    pub snapshot: SnapshotStoreConfig,

    /// Alert window day counts
    #[serde(default)]
    pub alerts: AlertWindows,

    /// Report rendering and dispatch settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl MonitorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.cipher.validate()?;
        self.source.validate()?;
        self.notifier.validate()?;
        self.alerts.validate()?;
        self.report.validate()?;
        Ok(())
    }
}

/// Cipher material for the encrypted payload
///
/// The key and IV are fixed deployment values, not secret-derived and not
/// rotated. The key is used as raw bytes exactly as configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherConfig {
    /// 32-byte AES-256 key
    pub key: Vec<u8>,
    /// 16-byte CBC initialization vector
    pub iv: Vec<u8>,
}

impl CipherConfig {
    /// Validate key and IV lengths
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.key.len() != 32 {
            return Err(crate::Error::config(format!(
                "AES key must be 32 bytes, got {}",
                self.key.len()
            )));
        }
        if self.iv.len() != CIPHER_BLOCK_SIZE {
            return Err(crate::Error::config(format!(
                "AES IV must be {} bytes, got {}",
                CIPHER_BLOCK_SIZE,
                self.iv.len()
            )));
        }
        Ok(())
    }
}

/// Record source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// HTTP endpoint returning the `{code, msg, data}` envelope
    Http {
        /// Endpoint URL
        url: String,
        /// Organization identifier passed as the `cecId` query parameter
        cec_id: String,
        /// Optional proxy URLs tried in order after the direct connection
        #[serde(default)]
        proxies: Vec<String>,
        /// Request timeout in seconds
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },

    /// Custom record source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl SourceConfig {
    /// Validate the source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            SourceConfig::Http {
                url,
                cec_id,
                timeout_secs,
                ..
            } => {
                if url.is_empty() {
                    return Err(crate::Error::config("HTTP source URL cannot be empty"));
                }
                if cec_id.is_empty() {
                    return Err(crate::Error::config("HTTP source cec_id cannot be empty"));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("HTTP source timeout must be > 0"));
                }
                Ok(())
            }
            SourceConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom source factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom source config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the source type name
    pub fn type_name(&self) -> &str {
        match self {
            SourceConfig::Http { .. } => "http",
            SourceConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Notification sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierConfig {
    /// Chat webhook accepting Markdown chunks
    Webhook {
        /// Webhook URL (embeds the credential key)
        url: String,
        /// If true, log instead of POSTing
        #[serde(default)]
        dry_run: bool,
    },

    /// Custom notification sink
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl NotifierConfig {
    /// Validate the notifier configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            NotifierConfig::Webhook { url, .. } => {
                if url.is_empty() {
                    return Err(crate::Error::config("Webhook URL cannot be empty"));
                }
                Ok(())
            }
            NotifierConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom notifier factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom notifier config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the notifier type name
    pub fn type_name(&self) -> &str {
        match self {
            NotifierConfig::Webhook { .. } => "webhook",
            NotifierConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Snapshot store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotStoreConfig {
    /// File-based snapshot store
    File {
        /// Path to the snapshot file
        path: String,
    },

    /// In-memory snapshot store (not persistent)
    #[default]
    Memory,

    /// Custom snapshot store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

/// Alert window day counts
///
/// A record is "new" when its begin date falls within `days_new` days before
/// the run date, and "expiring" when its end date falls within `days_expire`
/// days after it. Both bounds are inclusive. The two classifications are
/// independent booleans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlertWindows {
    /// Days back from "now" within which a begin date counts as new
    #[serde(default = "default_days_new")]
    pub days_new: i64,

    /// Days forward from "now" within which an end date counts as expiring
    #[serde(default = "default_days_expire")]
    pub days_expire: i64,
}

impl AlertWindows {
    /// Validate the window bounds
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.days_new < 0 {
            return Err(crate::Error::config("days_new must be >= 0"));
        }
        if self.days_expire < 0 {
            return Err(crate::Error::config("days_expire must be >= 0"));
        }
        Ok(())
    }
}

impl Default for AlertWindows {
    fn default() -> Self {
        Self {
            days_new: default_days_new(),
            days_expire: default_days_expire(),
        }
    }
}

/// Which notification triggers produce report sections
///
/// Feed-diff changes (first appearance in the feed) and date-window alerts
/// (recency of begin/end dates) are distinct signals and are rendered as
/// separate sections; this enum only selects which of them appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyMode {
    /// Only the added/removed feed-diff sections
    Changes,
    /// Only the date-window alert sections
    Windows,
    /// Both kinds of sections
    All,
}

impl NotifyMode {
    /// Whether feed-diff sections are rendered
    pub fn includes_changes(&self) -> bool {
        matches!(self, NotifyMode::Changes | NotifyMode::All)
    }

    /// Whether date-window sections are rendered
    pub fn includes_windows(&self) -> bool {
        matches!(self, NotifyMode::Windows | NotifyMode::All)
    }
}

/// Report rendering and dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum UTF-8 byte length of a dispatched chunk
    #[serde(default = "default_max_chunk_bytes")]
    pub max_chunk_bytes: usize,

    /// Which alert sections to render
    #[serde(default = "default_notify_mode")]
    pub mode: NotifyMode,

    /// Skip dispatch entirely when there are no changes and no alerts
    #[serde(default)]
    pub only_on_change: bool,
}

impl ReportConfig {
    /// Validate the report settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_chunk_bytes == 0 {
            return Err(crate::Error::config("max_chunk_bytes must be > 0"));
        }
        Ok(())
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: default_max_chunk_bytes(),
            mode: default_notify_mode(),
            only_on_change: false,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the internal event channel
    ///
    /// When full, new engine events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_days_new() -> i64 {
    3
}

fn default_days_expire() -> i64 {
    30
}

fn default_max_chunk_bytes() -> usize {
    4000
}

fn default_notify_mode() -> NotifyMode {
    NotifyMode::All
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_event_channel_capacity() -> usize {
    256
}
