//! Core monitor engine
//!
//! The MonitorEngine is responsible for one run of the pipeline:
//! - Loading the previous snapshot (the diff baseline)
//! - Fetching and decrypting the current payload
//! - Detecting feed changes and evaluating alert windows
//! - Rendering, chunking, and dispatching the report
//! - Persisting the new snapshot unconditionally
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐      ┌───────────┐      ┌───────────────┐
//! │ RecordSource │─────▶│ Decryptor │─────▶│ CompanySnapshot│
//! └──────────────┘      └───────────┘      └───────┬───────┘
//!                                    ┌─────────────┴─────────────┐
//!                                    ▼                           ▼
//!                            ┌──────────────┐           ┌───────────────┐
//!                            │ diff vs. old │           │ alert windows │
//!                            └──────┬───────┘           └───────┬───────┘
//!                                   └───────────┬───────────────┘
//!                                               ▼
//!                              render ─▶ chunk ─▶ dispatch ─▶ save
//! ```
//!
//! The run is strictly sequential. A fetch, decrypt, or parse failure aborts
//! it with nothing rendered, nothing dispatched, and the stored snapshot
//! untouched; the old state stays authoritative for the next run. Dispatch
//! and save failures are logged and never abort the run.

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::alert::evaluate_snapshot;
use crate::config::MonitorConfig;
use crate::crypto::Decryptor;
use crate::diff::diff_snapshots;
use crate::dispatch::dispatch_chunks;
use crate::error::Result;
use crate::model::CompanySnapshot;
use crate::report::{render_report, split_chunks};
use crate::traits::{Notifier, RecordSource, SnapshotStore};

/// Events emitted by the MonitorEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A run began
    RunStarted,

    /// Feed diff computed against the stored snapshot
    ChangesDetected {
        awards_added: usize,
        awards_removed: usize,
        penalties_added: usize,
        penalties_removed: usize,
    },

    /// Alert windows evaluated on the current snapshot
    AlertsEvaluated {
        award_alerts: usize,
        penalty_alerts: usize,
    },

    /// Dispatch skipped (only-on-change mode with a quiet run)
    DispatchSkipped { reason: String },

    /// All chunks attempted
    DispatchCompleted { sent: usize, failed: usize },

    /// New snapshot persisted
    SnapshotSaved,

    /// Snapshot persistence failed (non-fatal)
    SnapshotSaveFailed { error: String },

    /// The run finished
    RunCompleted {
        sent: usize,
        failed: usize,
        snapshot_saved: bool,
    },
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Organization name from the fresh payload
    pub company_name: String,
    /// Feed-diff counts
    pub awards_added: usize,
    pub awards_removed: usize,
    pub penalties_added: usize,
    pub penalties_removed: usize,
    /// Window-alert counts
    pub award_alerts: usize,
    pub penalty_alerts: usize,
    /// Dispatch outcome
    pub chunks_sent: usize,
    pub chunks_failed: usize,
    pub dispatch_skipped: bool,
    /// Whether the new snapshot reached the store
    pub snapshot_saved: bool,
}

/// Core monitor engine
///
/// Owns the injected components and the validated configuration. All
/// operations run on the calling task; the engine spawns nothing.
pub struct MonitorEngine {
    /// Ciphertext source
    source: Box<dyn RecordSource>,

    /// Notification sink for rendered chunks
    notifier: Box<dyn Notifier>,

    /// Persistence for the diff baseline
    store: Box<dyn SnapshotStore>,

    /// Payload decryptor built from the cipher configuration
    decryptor: Decryptor,

    /// Validated configuration
    config: MonitorConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl MonitorEngine {
    /// Create a new monitor engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields
    /// engine events for logging or monitoring.
    pub fn new(
        source: Box<dyn RecordSource>,
        notifier: Box<dyn Notifier>,
        store: Box<dyn SnapshotStore>,
        config: MonitorConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;
        let decryptor = Decryptor::new(&config.cipher)?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            source,
            notifier,
            store,
            decryptor,
            config,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the pipeline once, evaluated against today's date
    pub async fn run_once(&self) -> Result<RunReport> {
        self.run_once_at(chrono::Local::now().date_naive()).await
    }

    /// Run the pipeline once with an explicit run date
    ///
    /// Public so tests can pin the alert-window arithmetic; production
    /// callers use [`MonitorEngine::run_once`].
    pub async fn run_once_at(&self, today: NaiveDate) -> Result<RunReport> {
        self.emit_event(EngineEvent::RunStarted);

        // Baseline. A store read failure degrades to the empty baseline:
        // worse to skip the run than to re-report existing records once.
        let previous = match self.store.load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("snapshot load failed, using empty baseline: {}", e);
                CompanySnapshot::default()
            }
        };

        // Fetch → decrypt → parse. Any failure here aborts the run with the
        // stored snapshot untouched.
        let ciphertext = self.source.fetch_ciphertext().await?;
        let payload = self.decryptor.decrypt(&ciphertext)?;
        let current = CompanySnapshot::from_payload(&payload)?;

        info!(
            "fetched snapshot for {:?}: {} scores, {} awards, {} penalties",
            current.company_name,
            current.scores.len(),
            current.awards.len(),
            current.penalties.len()
        );

        let diff = diff_snapshots(&previous, &current);
        self.emit_event(EngineEvent::ChangesDetected {
            awards_added: diff.awards.added.len(),
            awards_removed: diff.awards.removed.len(),
            penalties_added: diff.penalties.added.len(),
            penalties_removed: diff.penalties.removed.len(),
        });

        let alerts = evaluate_snapshot(&current, today, &self.config.alerts);
        self.emit_event(EngineEvent::AlertsEvaluated {
            award_alerts: alerts.awards.len(),
            penalty_alerts: alerts.penalties.len(),
        });

        let mut report = RunReport {
            company_name: current.company_name.clone(),
            awards_added: diff.awards.added.len(),
            awards_removed: diff.awards.removed.len(),
            penalties_added: diff.penalties.added.len(),
            penalties_removed: diff.penalties.removed.len(),
            award_alerts: alerts.awards.len(),
            penalty_alerts: alerts.penalties.len(),
            ..Default::default()
        };

        // Both notification triggers count here; neither "new" notion may
        // silently suppress the other.
        let quiet_run = diff.is_empty() && alerts.is_empty();
        if self.config.report.only_on_change && quiet_run {
            info!("no changes and no window alerts, skipping dispatch");
            report.dispatch_skipped = true;
            self.emit_event(EngineEvent::DispatchSkipped {
                reason: "no changes and no window alerts".to_string(),
            });
        } else {
            let text = render_report(&current, &diff, &alerts, today, &self.config.report);
            let chunks = split_chunks(&text, self.config.report.max_chunk_bytes);

            let summary = dispatch_chunks(self.notifier.as_ref(), &chunks).await;
            report.chunks_sent = summary.sent;
            report.chunks_failed = summary.failed;
            self.emit_event(EngineEvent::DispatchCompleted {
                sent: summary.sent,
                failed: summary.failed,
            });
        }

        // Persist unconditionally, even when nothing was sent. A failure is
        // logged only: the notifications are already out, and the next run
        // may re-detect the same changes (accepted risk).
        match self.store.save(&current).await {
            Ok(()) => {
                report.snapshot_saved = true;
                self.emit_event(EngineEvent::SnapshotSaved);
            }
            Err(e) => {
                warn!("snapshot save failed (notifications not rolled back): {}", e);
                self.emit_event(EngineEvent::SnapshotSaveFailed {
                    error: e.to_string(),
                });
            }
        }

        self.emit_event(EngineEvent::RunCompleted {
            sent: report.chunks_sent,
            failed: report.chunks_failed,
            snapshot_saved: report.snapshot_saved,
        });

        Ok(report)
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping event");
        }
    }
}
