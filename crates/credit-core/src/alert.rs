//! Alert window evaluation
//!
//! Classifies the records of the *current* snapshot by date recency,
//! independently of change detection. A record is "new" when its begin date
//! is recent and "expiring" when its end date is near; the two flags are
//! independent booleans, so a record may be both, either, or neither.
//!
//! This date-recency notion of "new" is distinct from the change detector's
//! "added" (first appearance in the feed). A record can be old by date but
//! newly added to the feed, and vice versa; the two signals are surfaced
//! separately and never merged.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::AlertWindows;
use crate::error::Error;
use crate::model::{CompanySnapshot, Dated};

/// Wire date format; anything else is an unparsable date
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Window classification of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordAlert {
    /// Display label (project name)
    pub label: String,
    /// Begin date as delivered
    pub begin_date: String,
    /// End date as delivered
    pub end_date: String,
    /// Begin date falls within the `days_new` window
    pub is_new: bool,
    /// End date falls within the `days_expire` window
    pub is_expiring: bool,
}

/// Window alerts for the current snapshot, per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotAlerts {
    pub awards: Vec<RecordAlert>,
    pub penalties: Vec<RecordAlert>,
}

impl SnapshotAlerts {
    /// True when no record tripped either window
    pub fn is_empty(&self) -> bool {
        self.awards.is_empty() && self.penalties.is_empty()
    }
}

/// Parse a wire date, logging the reject
///
/// An unparsable or missing date only suppresses the classification that
/// needs it; the record stays in the full report either way.
fn parse_date(raw: &str, label: &str, field: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            let err = Error::record_field(format!(
                "`{}` has unparsable {} {:?}: {}",
                label, field, raw, e
            ));
            debug!("{}; the record stays in the full report", err);
            None
        }
    }
}

/// Classify a list of records against the alert windows at `today`
///
/// Returns one entry per record that tripped at least one window. Records
/// whose relevant dates cannot be parsed contribute nothing here but remain
/// in the rendered full dump.
pub fn evaluate_records<T: Dated>(
    records: &[T],
    today: NaiveDate,
    windows: &AlertWindows,
) -> Vec<RecordAlert> {
    let new_floor = today - chrono::Duration::days(windows.days_new);
    let expire_ceiling = today + chrono::Duration::days(windows.days_expire);

    records
        .iter()
        .filter_map(|record| {
            let is_new = parse_date(record.begin_date(), record.label(), "begin date")
                .is_some_and(|begin| begin >= new_floor);
            let is_expiring = parse_date(record.end_date(), record.label(), "end date")
                .is_some_and(|end| end <= expire_ceiling);

            if !is_new && !is_expiring {
                return None;
            }

            Some(RecordAlert {
                label: record.label().to_string(),
                begin_date: record.begin_date().to_string(),
                end_date: record.end_date().to_string(),
                is_new,
                is_expiring,
            })
        })
        .collect()
}

/// Evaluate award and penalty windows for the current snapshot
pub fn evaluate_snapshot(
    snapshot: &CompanySnapshot,
    today: NaiveDate,
    windows: &AlertWindows,
) -> SnapshotAlerts {
    SnapshotAlerts {
        awards: evaluate_records(&snapshot.awards, today, windows),
        penalties: evaluate_records(&snapshot.penalties, today, windows),
    }
}
