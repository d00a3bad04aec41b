// # Domain Model
//
// Record types extracted from the decrypted payload, and the snapshot that
// persists them between runs.
//
// ## Wire Format
//
// The decrypted JSON document has the shape:
//
// ```json
// {
//   "data": {
//     "cioName": "Example Construction Group",
//     "cxdamxArray": [ ...ScoreItem ],
//     "lhxwArray":   [ ...AwardItem ],
//     "blxwArray":   [ ...PenaltyItem ]
//   }
// }
// ```
//
// The persisted snapshot file reuses the serde representation of the inner
// `data` object, so a stored snapshot is byte-compatible with what the feed
// delivered. All wire fields default when absent; upstream records are
// frequently sparse.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identity signature of a diffable record
///
/// (project name, reason, begin date, document number or empty string).
/// Signatures are assumed unique per list; two records sharing all four
/// fields are indistinguishable to the change detector.
pub type Signature = (String, String, String, String);

/// A record that can be identified across runs for diffing
pub trait Identified {
    /// The four-field identity signature
    fn signature(&self) -> Signature;
}

/// A record with an activity period, usable for alert window evaluation
pub trait Dated {
    /// Display label for alert lines
    fn label(&self) -> &str;
    /// Begin date as delivered on the wire (`YYYY-MM-DD` when well-formed)
    fn begin_date(&self) -> &str;
    /// End date as delivered on the wire
    fn end_date(&self) -> &str;
}

/// One qualification score entry
///
/// Scores carry no identity signature: they are always rendered in full and
/// never diffed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreItem {
    /// Qualification name
    #[serde(rename = "qualificationName", default)]
    pub qualification_name: String,

    /// Rating grade (e.g. "AAA")
    #[serde(rename = "creditGrade", default)]
    pub grade: String,

    /// Current score
    #[serde(default)]
    pub score: f64,

    /// Base score before adjustments
    #[serde(rename = "baseScore", default)]
    pub base_score: f64,

    /// Total deducted points
    #[serde(rename = "deductScore", default)]
    pub deduction: f64,

    /// Total bonus points
    #[serde(rename = "addScore", default)]
    pub bonus: f64,
}

/// One good-standing (award) record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardItem {
    /// Project / engagement name
    #[serde(rename = "engName", default)]
    pub project_name: String,

    /// Reason the record was granted
    #[serde(default)]
    pub reason: String,

    /// Award level (e.g. provincial, municipal)
    #[serde(rename = "awardLevel", default)]
    pub level: String,

    /// Validity begin date
    #[serde(rename = "beginDate", default)]
    pub begin_date: String,

    /// Validity end date
    #[serde(rename = "endDate", default)]
    pub end_date: String,

    /// Issuing document number; absent for some records
    #[serde(rename = "documentNumber", default)]
    pub document_number: Option<String>,

    /// Points the award contributes
    #[serde(rename = "awardScore", default)]
    pub award_value: f64,
}

impl Identified for AwardItem {
    fn signature(&self) -> Signature {
        (
            self.project_name.clone(),
            self.reason.clone(),
            self.begin_date.clone(),
            self.document_number.clone().unwrap_or_default(),
        )
    }
}

impl Dated for AwardItem {
    fn label(&self) -> &str {
        &self.project_name
    }

    fn begin_date(&self) -> &str {
        &self.begin_date
    }

    fn end_date(&self) -> &str {
        &self.end_date
    }
}

/// One penalty record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyItem {
    /// Project / engagement name
    #[serde(rename = "engName", default)]
    pub project_name: String,

    /// Reason the penalty was imposed
    #[serde(default)]
    pub reason: String,

    /// Penalty category
    #[serde(default)]
    pub category: String,

    /// Validity begin date
    #[serde(rename = "beginDate", default)]
    pub begin_date: String,

    /// Validity end date
    #[serde(rename = "endDate", default)]
    pub end_date: String,

    /// Issuing document number; absent for some records
    #[serde(rename = "documentNumber", default)]
    pub document_number: Option<String>,

    /// Deducted points, signed as delivered; only the magnitude is displayed
    #[serde(rename = "deductScore", default)]
    pub deduct_value: f64,

    /// Penalty notice number
    #[serde(rename = "penaltyNumber", default)]
    pub penalty_number: String,

    /// Name of the enforcing officer
    #[serde(rename = "enforcerName", default)]
    pub enforcer_name: String,

    /// Certificate number of the enforcing officer
    #[serde(rename = "enforcerCertNo", default)]
    pub enforcer_cert_no: String,
}

impl Identified for PenaltyItem {
    fn signature(&self) -> Signature {
        (
            self.project_name.clone(),
            self.reason.clone(),
            self.begin_date.clone(),
            self.document_number.clone().unwrap_or_default(),
        )
    }
}

impl Dated for PenaltyItem {
    fn label(&self) -> &str {
        &self.project_name
    }

    fn begin_date(&self) -> &str {
        &self.begin_date
    }

    fn end_date(&self) -> &str {
        &self.end_date
    }
}

/// Full company state as of the most recent successful run
///
/// Persisted wholesale at the end of every run; there is no partial merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySnapshot {
    /// Organization display name
    #[serde(rename = "cioName", default)]
    pub company_name: String,

    /// Qualification scores, full dump every run
    #[serde(rename = "cxdamxArray", default)]
    pub scores: Vec<ScoreItem>,

    /// Good-standing records
    #[serde(rename = "lhxwArray", default)]
    pub awards: Vec<AwardItem>,

    /// Penalty records
    #[serde(rename = "blxwArray", default)]
    pub penalties: Vec<PenaltyItem>,
}

impl CompanySnapshot {
    /// Extract a snapshot from a decrypted payload document
    ///
    /// Fails with a parse error when the top-level `data` field is absent.
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self> {
        let data = payload
            .get("data")
            .ok_or_else(|| Error::parse("payload missing top-level `data` field"))?;

        serde_json::from_value(data.clone())
            .map_err(|e| Error::parse(format!("payload `data` has unexpected shape: {}", e)))
    }

    /// True when the snapshot holds no records at all
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty() && self.awards.is_empty() && self.penalties.is_empty()
    }
}
