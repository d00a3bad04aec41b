// # Chat Webhook Notifier
//
// This crate provides the chat-webhook notification sink for the credit
// monitor.
//
// ## Wire Format
//
// One POST per chunk:
//
// ```json
// {
//   "msgtype": "markdown",
//   "markdown": { "content": "<the chunk>" }
// }
// ```
//
// A 2xx response means the sink accepted the chunk; anything else (or a
// transport error) is a dispatch error. The engine's dispatcher logs it and
// continues with the next chunk.
//
// ## Constraints
//
// - Makes exactly one HTTP request per `send_chunk` call
// - NO retry or backoff (delivery policy is owned by the engine's
//   dispatcher, which is itself best-effort)
// - NO buffering or state between calls
//
// ## Security
//
// The webhook URL embeds the credential key and never appears in logs or
// debug output.

use std::time::Duration;

use credit_core::ComponentRegistry;
use credit_core::config::NotifierConfig;
use credit_core::traits::{Notifier, NotifierFactory};
use credit_core::{Error, Result};
use tracing::{debug, info};

/// Default HTTP timeout for webhook requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Chat webhook notification sink
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the notifier logs the chunk size and skips the
/// POST. This allows exercising the full pipeline without spamming a real
/// channel.
pub struct WebhookNotifier {
    /// Webhook URL including the credential key
    /// ⚠️ NEVER log this value
    url: String,

    /// HTTP client for webhook requests
    client: reqwest::Client,

    /// If true, log instead of POSTing
    dry_run: bool,
}

// Custom Debug implementation that hides the webhook URL
impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl WebhookNotifier {
    /// Create a new webhook notifier
    pub fn new(url: impl Into<String>, dry_run: bool) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(Error::config("webhook URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::dispatch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url,
            client,
            dry_run,
        })
    }

    /// Create a notifier in live mode
    pub fn new_live(url: impl Into<String>) -> Result<Self> {
        Self::new(url, false)
    }

    /// Create a notifier in dry-run mode
    pub fn new_dry_run(url: impl Into<String>) -> Result<Self> {
        Self::new(url, true)
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send_chunk(&self, content: &str) -> Result<()> {
        if content.is_empty() {
            debug!("skipping empty chunk");
            return Ok(());
        }

        if self.dry_run {
            info!("[dry-run] would deliver {} bytes to webhook", content.len());
            return Ok(());
        }

        let payload = serde_json::json!({
            "msgtype": "markdown",
            "markdown": { "content": content },
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::dispatch(format!("webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::dispatch(format!(
                "webhook returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "webhook"
    }
}

/// Factory for creating webhook notifiers
pub struct WebhookNotifierFactory;

impl NotifierFactory for WebhookNotifierFactory {
    fn create(&self, config: &NotifierConfig) -> Result<Box<dyn Notifier>> {
        match config {
            NotifierConfig::Webhook { url, dry_run } => {
                Ok(Box::new(WebhookNotifier::new(url.clone(), *dry_run)?))
            }
            _ => Err(Error::config("invalid config for webhook notifier")),
        }
    }
}

/// Register the webhook notifier with a registry
pub fn register(registry: &ComponentRegistry) {
    registry.register_notifier("webhook", Box::new(WebhookNotifierFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_creates_notifier() {
        let notifier = WebhookNotifierFactory.create(&NotifierConfig::Webhook {
            url: "https://chat.invalid/hook?key=secret".to_string(),
            dry_run: false,
        });
        assert!(notifier.is_ok());
        assert_eq!(notifier.unwrap().notifier_name(), "webhook");
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(WebhookNotifier::new_live("").is_err());
    }

    #[test]
    fn debug_output_redacts_the_url() {
        let notifier = WebhookNotifier::new_live("https://chat.invalid/hook?key=secret").unwrap();
        let debug = format!("{:?}", notifier);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<REDACTED>"));
    }

    #[tokio::test]
    async fn dry_run_accepts_chunks_without_network() {
        let notifier = WebhookNotifier::new_dry_run("https://chat.invalid/hook?key=k").unwrap();
        notifier.send_chunk("**report**").await.unwrap();
    }

    #[tokio::test]
    async fn empty_chunk_is_skipped() {
        // Even in live mode no request goes out for an empty chunk.
        let notifier = WebhookNotifier::new_live("https://chat.invalid/hook?key=k").unwrap();
        notifier.send_chunk("").await.unwrap();
    }
}
