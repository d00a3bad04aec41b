//! Test doubles and common utilities for the pipeline contract tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use credit_core::config::{
    CipherConfig, EngineConfig, MonitorConfig, NotifierConfig, ReportConfig, SnapshotStoreConfig,
    SourceConfig,
};
use credit_core::error::{Error, Result};
use credit_core::model::{AwardItem, CompanySnapshot};
use credit_core::traits::{Notifier, RecordSource};
use credit_core::{AlertWindows, Decryptor};

/// Fixed run date for deterministic window arithmetic
pub fn run_date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
}

/// Cipher material shared by all contract tests
pub fn test_cipher() -> CipherConfig {
    CipherConfig {
        key: b"6875616E6779696E6875616E6779696E".to_vec(),
        iv: b"sskjKingFree5138".to_vec(),
    }
}

/// A minimal valid configuration backed by in-memory components
pub fn test_config() -> MonitorConfig {
    MonitorConfig {
        cipher: test_cipher(),
        source: SourceConfig::Http {
            url: "http://endpoint.invalid/details".to_string(),
            cec_id: "org-1".to_string(),
            proxies: Vec::new(),
            timeout_secs: 30,
        },
        notifier: NotifierConfig::Webhook {
            url: "https://chat.invalid/hook?key=k".to_string(),
            dry_run: false,
        },
        snapshot: SnapshotStoreConfig::Memory,
        alerts: AlertWindows::default(),
        report: ReportConfig::default(),
        engine: EngineConfig::default(),
    }
}

/// Encrypt a snapshot into the wire envelope the source would deliver
pub fn encrypt_snapshot(snapshot: &CompanySnapshot) -> String {
    let payload = serde_json::json!({ "data": serde_json::to_value(snapshot).unwrap() });
    Decryptor::new(&test_cipher())
        .unwrap()
        .encrypt(payload.to_string().as_bytes())
}

/// An award whose dates sit far outside the default alert windows
pub fn dormant_award(name: &str, doc: &str) -> AwardItem {
    AwardItem {
        project_name: name.to_string(),
        reason: "Quality award".to_string(),
        begin_date: "2020-01-01".to_string(),
        end_date: "2099-01-01".to_string(),
        document_number: Some(doc.to_string()),
        award_value: 1.0,
        ..Default::default()
    }
}

/// A record source that always returns the same ciphertext
pub struct ScriptedSource {
    ciphertext: String,
    fetch_count: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(ciphertext: String) -> Self {
        Self {
            ciphertext,
            fetch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[allow(dead_code)]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RecordSource for ScriptedSource {
    async fn fetch_ciphertext(&self) -> Result<String> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.ciphertext.clone())
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A record source that always fails
pub struct FailingSource;

#[async_trait::async_trait]
impl RecordSource for FailingSource {
    async fn fetch_ciphertext(&self) -> Result<String> {
        Err(Error::source("endpoint unreachable"))
    }

    fn source_name(&self) -> &'static str {
        "failing"
    }
}

/// A notifier that records chunks and can fail on chosen calls
#[derive(Clone)]
pub struct RecordingNotifier {
    chunks: Arc<std::sync::Mutex<Vec<String>>>,
    call_count: Arc<AtomicUsize>,
    /// Zero-based call indices that fail
    fail_on: Arc<Vec<usize>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::failing_on(Vec::new())
    }

    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            chunks: Arc::new(std::sync::Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            fail_on: Arc::new(fail_on),
        }
    }

    /// Chunks the sink accepted, in delivery order
    pub fn delivered(&self) -> Vec<String> {
        self.chunks.lock().unwrap().clone()
    }

    /// Total send attempts, including failed ones
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send_chunk(&self, content: &str) -> Result<()> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&call) {
            return Err(Error::dispatch(format!("simulated failure on call {}", call)));
        }
        self.chunks.lock().unwrap().push(content.to_string());
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}
