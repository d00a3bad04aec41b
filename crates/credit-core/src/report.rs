// # Report Renderer
//
// Formats a snapshot, its feed diff, and its window alerts into Markdown and
// splits the result into transport-sized chunks.
//
// Rendering is a set of pure functions of (data, configuration); nothing in
// here touches clocks, stores, or the network. Section order:
//
// 1. Company header + full score dump (always complete, never filtered)
// 2. Good-standing records + award-value sum
// 3. Penalty records (numbered) + deduction-magnitude sum
// 4. Feed-diff sections and/or date-window sections, per notification mode
//
// Chunk splits happen only at line boundaries; concatenating the chunks
// reproduces the rendered text byte-for-byte.

use std::fmt::Write as _;

use chrono::NaiveDate;
use tracing::warn;

use crate::alert::SnapshotAlerts;
use crate::config::ReportConfig;
use crate::diff::SnapshotDiff;
use crate::model::{AwardItem, CompanySnapshot, PenaltyItem};

/// Render the full Markdown report for one run
pub fn render_report(
    snapshot: &CompanySnapshot,
    diff: &SnapshotDiff,
    alerts: &SnapshotAlerts,
    today: NaiveDate,
    options: &ReportConfig,
) -> String {
    let mut out = String::new();

    let company = if snapshot.company_name.is_empty() {
        "(unnamed organization)"
    } else {
        &snapshot.company_name
    };
    let _ = writeln!(out, "# Credit report — {}", company);
    let _ = writeln!(out, "> Run date: {}", today.format("%Y-%m-%d"));
    let _ = writeln!(out);

    render_scores(&mut out, snapshot);
    render_awards(&mut out, &snapshot.awards);
    render_penalties(&mut out, &snapshot.penalties);

    if options.mode.includes_changes() {
        render_changes(&mut out, diff);
    }
    if options.mode.includes_windows() {
        render_windows(&mut out, alerts);
    }

    out
}

fn render_scores(out: &mut String, snapshot: &CompanySnapshot) {
    let _ = writeln!(
        out,
        "**Qualification scores** ({} entries):",
        snapshot.scores.len()
    );
    for (i, score) in snapshot.scores.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. `{}` — grade {}, score {} (base {}, -{}, +{})",
            i + 1,
            score.qualification_name,
            score.grade,
            score.score,
            score.base_score,
            score.deduction,
            score.bonus,
        );
    }
    let _ = writeln!(out);
}

fn render_awards(out: &mut String, awards: &[AwardItem]) {
    let total: f64 = awards.iter().map(|a| a.award_value).sum();
    let _ = writeln!(
        out,
        "🎖 **Good-standing records** ({} entries, total +{}):",
        awards.len(),
        total
    );
    for (i, award) in awards.iter().enumerate() {
        let _ = writeln!(out, "{}. `{}`", i + 1, award.project_name);
        let _ = writeln!(out, "- Reason: {}", award.reason);
        let _ = writeln!(out, "- Level: {}", award.level);
        let _ = writeln!(
            out,
            "- Document: {}",
            award.document_number.as_deref().unwrap_or("-")
        );
        let _ = writeln!(out, "- Dates: {} → {}", award.begin_date, award.end_date);
        let _ = writeln!(out, "- Value: +{}", award.award_value);
    }
    let _ = writeln!(out);
}

fn render_penalties(out: &mut String, penalties: &[PenaltyItem]) {
    // Deductions arrive signed; the report shows magnitudes.
    let total: f64 = penalties.iter().map(|p| p.deduct_value.abs()).sum();
    let _ = writeln!(
        out,
        "⚠️ **Penalty records** ({} entries, total -{}):",
        penalties.len(),
        total
    );
    for (i, penalty) in penalties.iter().enumerate() {
        let _ = writeln!(out, "{}. `{}`", i + 1, penalty.project_name);
        let _ = writeln!(out, "- Reason: {}", penalty.reason);
        let _ = writeln!(out, "- Category: {}", penalty.category);
        let _ = writeln!(
            out,
            "- Document: {}",
            penalty.document_number.as_deref().unwrap_or("-")
        );
        let _ = writeln!(out, "- Notice: {}", penalty.penalty_number);
        let _ = writeln!(
            out,
            "- Enforcer: {} ({})",
            penalty.enforcer_name, penalty.enforcer_cert_no
        );
        let _ = writeln!(
            out,
            "- Dates: {} → {}",
            penalty.begin_date, penalty.end_date
        );
        let _ = writeln!(out, "- Deduction: -{}", penalty.deduct_value.abs());
    }
    let _ = writeln!(out);
}

fn change_block(out: &mut String, i: usize, name: &str, reason: &str, doc: &str, dates: String) {
    let _ = writeln!(out, "{}. `{}`", i + 1, name);
    let _ = writeln!(out, "- Reason: {}", reason);
    let _ = writeln!(out, "- Document: {}", doc);
    let _ = writeln!(out, "- Dates: {}", dates);
}

fn render_award_changes(out: &mut String, header: &str, records: &[AwardItem]) {
    if records.is_empty() {
        return;
    }
    let _ = writeln!(out, "{} ({} entries):", header, records.len());
    for (i, a) in records.iter().enumerate() {
        change_block(
            out,
            i,
            &a.project_name,
            &a.reason,
            a.document_number.as_deref().unwrap_or("-"),
            format!("{} → {}", a.begin_date, a.end_date),
        );
    }
    let _ = writeln!(out);
}

fn render_penalty_changes(out: &mut String, header: &str, records: &[PenaltyItem]) {
    if records.is_empty() {
        return;
    }
    let _ = writeln!(out, "{} ({} entries):", header, records.len());
    for (i, p) in records.iter().enumerate() {
        change_block(
            out,
            i,
            &p.project_name,
            &p.reason,
            p.document_number.as_deref().unwrap_or("-"),
            format!("{} → {}", p.begin_date, p.end_date),
        );
    }
    let _ = writeln!(out);
}

fn render_changes(out: &mut String, diff: &SnapshotDiff) {
    if diff.is_empty() {
        return;
    }
    render_award_changes(out, "🎉 **Newly listed good-standing records**", &diff.awards.added);
    render_award_changes(out, "📌 **Delisted good-standing records**", &diff.awards.removed);
    render_penalty_changes(out, "⚠️ **Newly listed penalty records**", &diff.penalties.added);
    render_penalty_changes(out, "⌛ **Delisted penalty records**", &diff.penalties.removed);
}

fn render_windows(out: &mut String, alerts: &SnapshotAlerts) {
    if alerts.is_empty() {
        return;
    }
    let _ = writeln!(out, "⏰ **Date-window alerts**:");
    for (category, list) in [("award", &alerts.awards), ("penalty", &alerts.penalties)] {
        for alert in list {
            let mut reasons = Vec::new();
            if alert.is_new {
                reasons.push(format!("recently begun ({})", alert.begin_date));
            }
            if alert.is_expiring {
                reasons.push(format!("expiring soon (ends {})", alert.end_date));
            }
            let _ = writeln!(
                out,
                "- [{}] `{}`: {}",
                category,
                alert.label,
                reasons.join(", ")
            );
        }
    }
    let _ = writeln!(out);
}

/// Split rendered text into chunks of at most `max_bytes` UTF-8 bytes
///
/// Splits happen only at line boundaries; a single line larger than the
/// budget is emitted as its own oversized chunk rather than broken mid-line.
/// Concatenating the returned chunks reproduces `text` byte-for-byte.
pub fn split_chunks(text: &str, max_bytes: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        if !current.is_empty() && current.len() + line.len() > max_bytes {
            chunks.push(std::mem::take(&mut current));
        }
        if line.len() > max_bytes {
            warn!(
                "report line of {} bytes exceeds the {}-byte chunk budget; sending oversized",
                line.len(),
                max_bytes
            );
            chunks.push(line.to_string());
        } else {
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
