// # creditd - Credit Monitor Daemon
//
// The creditd daemon is a THIN integration layer:
// 1. Reading configuration from environment variables
// 2. Setting up the log sink
// 3. Registering record sources, notifiers, and snapshot stores
// 4. Running the monitor engine (once, or on a fixed interval)
//
// All pipeline logic lives in credit-core; nothing here decrypts, diffs, or
// renders.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Endpoint
// - `CREDIT_API_URL`: Rating endpoint URL (required)
// - `CREDIT_CEC_ID`: Organization identifier (required)
// - `CREDIT_PROXY_URLS`: Comma-separated proxy URLs tried after the direct
//   connection (optional)
// - `CREDIT_HTTP_TIMEOUT_SECS`: Fetch timeout (default 30)
//
// ### Cipher
// - `CREDIT_AES_KEY`: 32-byte AES-256 key, used as raw bytes (required)
// - `CREDIT_AES_IV`: 16-byte CBC IV, used as raw bytes (required)
//
// ### Notification
// - `CREDIT_WEBHOOK_URL`: Chat webhook URL (required)
// - `CREDIT_NOTIFY_MODE`: changes | windows | all (default all)
// - `CREDIT_ONLY_ON_CHANGE`: Skip dispatch on quiet runs (default false)
// - `CREDIT_MAX_CHUNK_BYTES`: Chunk byte budget (default 4000)
// - `CREDIT_DRY_RUN`: Log instead of POSTing (default false)
//
// ### Alert windows
// - `CREDIT_DAYS_NEW`: "recently begun" window in days (default 3)
// - `CREDIT_DAYS_EXPIRE`: "expiring soon" window in days (default 30)
//
// ### State & lifecycle
// - `CREDIT_SNAPSHOT_PATH`: Snapshot file path (default company_snapshot.json)
// - `CREDIT_POLL_INTERVAL_SECS`: 0 = run once and exit (default 0)
// - `CREDIT_LOG_LEVEL`: trace | debug | info | warn | error (default info)
//
// ## Example
//
// ```bash
// export CREDIT_API_URL=http://rating.example.net/details
// export CREDIT_CEC_ID=4028e4ef4d5b0ad4
// export CREDIT_AES_KEY=0123456789abcdef0123456789abcdef
// export CREDIT_AES_IV=0123456789abcdef
// export CREDIT_WEBHOOK_URL=https://chat.example.com/hook?key=...
// export CREDIT_SNAPSHOT_PATH=/var/lib/creditd/snapshot.json
//
// creditd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use credit_core::config::{
    AlertWindows, CipherConfig, EngineConfig, MonitorConfig, NotifierConfig, NotifyMode,
    ReportConfig, SnapshotStoreConfig, SourceConfig,
};
use credit_core::{ComponentRegistry, MonitorEngine};

/// Exit codes following systemd conventions
#[derive(Debug, Clone, Copy)]
enum MonitorExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (run aborted)
    RuntimeError = 2,
}

impl From<MonitorExitCode> for ExitCode {
    fn from(code: MonitorExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    api_url: String,
    cec_id: String,
    proxy_urls: Vec<String>,
    http_timeout_secs: u64,
    aes_key: String,
    aes_iv: String,
    webhook_url: String,
    notify_mode: String,
    only_on_change: bool,
    max_chunk_bytes: usize,
    dry_run: bool,
    days_new: i64,
    days_expire: i64,
    snapshot_path: String,
    poll_interval_secs: u64,
    log_level: String,
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            api_url: env::var("CREDIT_API_URL")
                .map_err(|_| anyhow::anyhow!("CREDIT_API_URL is required"))?,
            cec_id: env::var("CREDIT_CEC_ID")
                .map_err(|_| anyhow::anyhow!("CREDIT_CEC_ID is required"))?,
            proxy_urls: env::var("CREDIT_PROXY_URLS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            http_timeout_secs: env::var("CREDIT_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            aes_key: env::var("CREDIT_AES_KEY")
                .map_err(|_| anyhow::anyhow!("CREDIT_AES_KEY is required"))?,
            aes_iv: env::var("CREDIT_AES_IV")
                .map_err(|_| anyhow::anyhow!("CREDIT_AES_IV is required"))?,
            webhook_url: env::var("CREDIT_WEBHOOK_URL")
                .map_err(|_| anyhow::anyhow!("CREDIT_WEBHOOK_URL is required"))?,
            notify_mode: env::var("CREDIT_NOTIFY_MODE").unwrap_or_else(|_| "all".to_string()),
            only_on_change: env_flag("CREDIT_ONLY_ON_CHANGE"),
            max_chunk_bytes: env::var("CREDIT_MAX_CHUNK_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4000),
            dry_run: env_flag("CREDIT_DRY_RUN"),
            days_new: env::var("CREDIT_DAYS_NEW")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            days_expire: env::var("CREDIT_DAYS_EXPIRE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            snapshot_path: env::var("CREDIT_SNAPSHOT_PATH")
                .unwrap_or_else(|_| "company_snapshot.json".to_string()),
            poll_interval_secs: env::var("CREDIT_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            log_level: env::var("CREDIT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!(
                "CREDIT_API_URL must use HTTP or HTTPS scheme. Got: {}",
                self.api_url
            );
        }

        if !self.webhook_url.starts_with("https://") && !self.webhook_url.starts_with("http://") {
            anyhow::bail!("CREDIT_WEBHOOK_URL must use HTTP or HTTPS scheme");
        }

        // The key is used as raw bytes, exactly as configured
        if self.aes_key.len() != 32 {
            anyhow::bail!(
                "CREDIT_AES_KEY must be exactly 32 bytes, got {}",
                self.aes_key.len()
            );
        }
        if self.aes_iv.len() != 16 {
            anyhow::bail!(
                "CREDIT_AES_IV must be exactly 16 bytes, got {}",
                self.aes_iv.len()
            );
        }

        match self.notify_mode.as_str() {
            "changes" | "windows" | "all" => {}
            other => anyhow::bail!(
                "CREDIT_NOTIFY_MODE '{}' is not valid. Valid modes: changes, windows, all",
                other
            ),
        }

        if self.max_chunk_bytes == 0 {
            anyhow::bail!("CREDIT_MAX_CHUNK_BYTES must be > 0");
        }

        if self.days_new < 0 || self.days_expire < 0 {
            anyhow::bail!("CREDIT_DAYS_NEW and CREDIT_DAYS_EXPIRE must be >= 0");
        }

        if !(1..=300).contains(&self.http_timeout_secs) {
            anyhow::bail!(
                "CREDIT_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        if self.poll_interval_secs != 0 && !(30..=86400).contains(&self.poll_interval_secs) {
            anyhow::bail!(
                "CREDIT_POLL_INTERVAL_SECS must be 0 (run once) or between 30 and 86400. Got: {}",
                self.poll_interval_secs
            );
        }

        if self.snapshot_path.is_empty() {
            anyhow::bail!("CREDIT_SNAPSHOT_PATH cannot be empty");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!(
                "CREDIT_LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                other
            ),
        }

        Ok(())
    }

    /// Build the core configuration from the validated environment values
    fn to_monitor_config(&self) -> MonitorConfig {
        let mode = match self.notify_mode.as_str() {
            "changes" => NotifyMode::Changes,
            "windows" => NotifyMode::Windows,
            _ => NotifyMode::All,
        };

        MonitorConfig {
            cipher: CipherConfig {
                key: self.aes_key.as_bytes().to_vec(),
                iv: self.aes_iv.as_bytes().to_vec(),
            },
            source: SourceConfig::Http {
                url: self.api_url.clone(),
                cec_id: self.cec_id.clone(),
                proxies: self.proxy_urls.clone(),
                timeout_secs: self.http_timeout_secs,
            },
            notifier: NotifierConfig::Webhook {
                url: self.webhook_url.clone(),
                dry_run: self.dry_run,
            },
            snapshot: SnapshotStoreConfig::File {
                path: self.snapshot_path.clone(),
            },
            alerts: AlertWindows {
                days_new: self.days_new,
                days_expire: self.days_expire,
            },
            report: ReportConfig {
                max_chunk_bytes: self.max_chunk_bytes,
                mode,
                only_on_change: self.only_on_change,
            },
            engine: EngineConfig::default(),
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return MonitorExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return MonitorExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return MonitorExitCode::ConfigError.into();
    }

    info!("Starting creditd");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MonitorExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => MonitorExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {}", e);
                MonitorExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    // Create component registry (built-in snapshot stores included)
    let registry = ComponentRegistry::new();

    #[cfg(feature = "http")]
    {
        info!("Registering HTTP record source");
        credit_source_http::register(&registry);
    }

    #[cfg(feature = "webhook")]
    {
        info!("Registering webhook notifier");
        credit_notify_webhook::register(&registry);
    }

    let monitor_config = config.to_monitor_config();

    let source = registry.create_source(&monitor_config.source)?;
    let notifier = registry.create_notifier(&monitor_config.notifier)?;
    let store = registry.create_snapshot_store(&monitor_config.snapshot)?;

    let (engine, mut events) = MonitorEngine::new(source, notifier, store, monitor_config)?;

    // Drain engine events into the log
    let event_drain = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "engine event");
        }
    });

    let result = if config.poll_interval_secs == 0 {
        // Single run (cron-style deployment)
        engine.run_once().await.map(|report| log_run(&report))
    } else {
        // Fixed-interval polling until ctrl-c
        let interval = Duration::from_secs(config.poll_interval_secs);
        info!("Polling every {:?}; ctrl-c to stop", interval);

        loop {
            match engine.run_once().await {
                Ok(report) => log_run(&report),
                Err(e) => error!("Run aborted: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }
        Ok(())
    };

    // Closing the engine ends the event stream; drain what is left
    drop(engine);
    let _ = event_drain.await;

    result.map_err(Into::into)
}

/// Log a one-line summary of a completed run
fn log_run(report: &credit_core::RunReport) {
    info!(
        "Run complete for {:?}: +{}/-{} awards, +{}/-{} penalties, {} window alerts, \
         {} chunks sent ({} failed), snapshot saved: {}",
        report.company_name,
        report.awards_added,
        report.awards_removed,
        report.penalties_added,
        report.penalties_removed,
        report.award_alerts + report.penalty_alerts,
        report.chunks_sent,
        report.chunks_failed,
        report.snapshot_saved,
    );
}
