//! Change detection between two record lists
//!
//! Comparison is set-based over record signatures, not positional: reordering
//! a list produces no changes. Awards and penalties are diffed independently;
//! scores are never diffed.

use std::collections::HashSet;

use crate::model::{AwardItem, CompanySnapshot, Identified, PenaltyItem};

/// Added/removed records of one category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDiff<T> {
    /// Records in `new` whose signature is absent from `old`, in `new` order
    pub added: Vec<T>,
    /// Records in `old` whose signature is absent from `new`, in `old` order
    pub removed: Vec<T>,
}

impl<T> RecordDiff<T> {
    /// True when nothing was added or removed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compute the signature-set difference between two record lists
pub fn diff_records<T: Identified + Clone>(old: &[T], new: &[T]) -> RecordDiff<T> {
    let old_signatures: HashSet<_> = old.iter().map(Identified::signature).collect();
    let new_signatures: HashSet<_> = new.iter().map(Identified::signature).collect();

    RecordDiff {
        added: new
            .iter()
            .filter(|item| !old_signatures.contains(&item.signature()))
            .cloned()
            .collect(),
        removed: old
            .iter()
            .filter(|item| !new_signatures.contains(&item.signature()))
            .cloned()
            .collect(),
    }
}

/// Per-category changes between two snapshots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotDiff {
    pub awards: RecordDiff<AwardItem>,
    pub penalties: RecordDiff<PenaltyItem>,
}

impl SnapshotDiff {
    /// True when neither category changed
    pub fn is_empty(&self) -> bool {
        self.awards.is_empty() && self.penalties.is_empty()
    }
}

/// Diff the award and penalty lists of two snapshots
pub fn diff_snapshots(old: &CompanySnapshot, new: &CompanySnapshot) -> SnapshotDiff {
    SnapshotDiff {
        awards: diff_records(&old.awards, &new.awards),
        penalties: diff_records(&old.penalties, &new.penalties),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn award(name: &str, doc: Option<&str>) -> AwardItem {
        AwardItem {
            project_name: name.to_string(),
            reason: "Quality award".to_string(),
            begin_date: "2026-01-01".to_string(),
            end_date: "2027-01-01".to_string(),
            document_number: doc.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn identical_lists_yield_no_changes() {
        let list = vec![award("A", Some("DOC-1")), award("B", Some("DOC-2"))];
        let diff = diff_records(&list, &list);
        assert!(diff.is_empty());
    }

    #[test]
    fn empty_to_empty_yields_no_changes() {
        let diff = diff_records::<AwardItem>(&[], &[]);
        assert!(diff.is_empty());
    }

    #[test]
    fn reordering_is_not_a_change() {
        let old = vec![award("A", Some("DOC-1")), award("B", Some("DOC-2"))];
        let new = vec![award("B", Some("DOC-2")), award("A", Some("DOC-1"))];
        assert!(diff_records(&old, &new).is_empty());
    }

    #[test]
    fn novel_record_is_added() {
        let old = vec![award("A", Some("DOC-1"))];
        let new = vec![award("A", Some("DOC-1")), award("B", Some("DOC-2"))];

        let diff = diff_records(&old, &new);
        assert_eq!(diff.added, vec![award("B", Some("DOC-2"))]);
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn dropped_record_is_removed() {
        let old = vec![award("A", Some("DOC-1")), award("B", Some("DOC-2"))];
        let new = vec![award("A", Some("DOC-1"))];

        let diff = diff_records(&old, &new);
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed, vec![award("B", Some("DOC-2"))]);
    }

    #[test]
    fn added_records_keep_feed_order() {
        let old = vec![award("A", Some("DOC-1"))];
        let new = vec![
            award("C", Some("DOC-3")),
            award("A", Some("DOC-1")),
            award("B", Some("DOC-2")),
        ];

        let diff = diff_records(&old, &new);
        let names: Vec<_> = diff.added.iter().map(|a| a.project_name.as_str()).collect();
        assert_eq!(names, vec!["C", "B"]);
    }

    #[test]
    fn missing_document_number_participates_as_empty() {
        // A record without a document number still diffs; the signature
        // component falls back to the empty string.
        let old = vec![award("A", None)];
        let new = vec![award("A", None)];
        assert!(diff_records(&old, &new).is_empty());

        let new_with_doc = vec![award("A", Some("DOC-1"))];
        let diff = diff_records(&old, &new_with_doc);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.removed.len(), 1);
    }

    #[test]
    fn snapshot_diff_runs_categories_independently() {
        let old = CompanySnapshot {
            awards: vec![award("A", Some("DOC-1"))],
            penalties: vec![PenaltyItem {
                project_name: "P".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let new = CompanySnapshot {
            awards: vec![award("A", Some("DOC-1")), award("B", Some("DOC-2"))],
            penalties: Vec::new(),
            ..Default::default()
        };

        let diff = diff_snapshots(&old, &new);
        assert_eq!(diff.awards.added.len(), 1);
        assert!(diff.awards.removed.is_empty());
        assert!(diff.penalties.added.is_empty());
        assert_eq!(diff.penalties.removed.len(), 1);
    }
}
