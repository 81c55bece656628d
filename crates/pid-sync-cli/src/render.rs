// crates/pid-sync-cli/src/render.rs
// ============================================================================
// Module: Report Rendering
// Description: Text and JSON renderers for reconciliation reports.
// Purpose: Turn a ReconcileReport into operator or machine output.
// Dependencies: clap, pid-sync-core, serde_json
// ============================================================================

//! ## Overview
//! The text renderer prints one block per batch entry: the diagnostic (when
//! requested), then the export line, then the repair line. The JSON renderer
//! emits the report's serde form unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::ValueEnum;
use pid_sync_core::DiagnosisOutcome;
use pid_sync_core::DiagnosticReport;
use pid_sync_core::EntryOutcome;
use pid_sync_core::ExportOutcome;
use pid_sync_core::FailedPidListing;
use pid_sync_core::HashDigest;
use pid_sync_core::OwnerSnapshot;
use pid_sync_core::Pid;
use pid_sync_core::PidRun;
use pid_sync_core::ReconcileReport;
use pid_sync_core::SkipReason;

use crate::t;

// ============================================================================
// SECTION: Output Format
// ============================================================================

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Renders `report` in `format`.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when JSON serialization fails.
pub fn render(report: &ReconcileReport, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

// ============================================================================
// SECTION: Text Rendering
// ============================================================================

/// Renders a report as text lines.
#[must_use]
pub fn render_text(report: &ReconcileReport) -> String {
    let mut lines = Vec::new();
    match report {
        ReconcileReport::Entries {
            entries,
        } => {
            for entry in entries {
                render_entry(entry, &mut lines);
            }
        }
        ReconcileReport::Failed {
            listing,
        } => render_listing(listing, &mut lines),
    }
    let mut output = lines.join("\n");
    output.push('\n');
    output
}

/// Renders one batch entry.
fn render_entry(entry: &EntryOutcome, lines: &mut Vec<String>) {
    match entry {
        EntryOutcome::Rejected {
            input,
            error,
        } => lines.push(t!("entry.rejected", input = input, error = error)),
        EntryOutcome::Skipped {
            input,
            reason: SkipReason::Cancelled,
        } => lines.push(t!("entry.skipped.cancelled", input = input)),
        EntryOutcome::Skipped {
            input,
            reason: SkipReason::Duplicate,
        } => lines.push(t!("entry.skipped.duplicate", input = input)),
        EntryOutcome::Processed(run) => render_run(run, lines),
    }
}

/// Renders everything done for one PID.
fn render_run(run: &PidRun, lines: &mut Vec<String>) {
    match &run.diagnosis {
        DiagnosisOutcome::Skipped => {}
        DiagnosisOutcome::NothingFound => lines.push(t!("report.nothing_found", pid = run.pid)),
        DiagnosisOutcome::Report {
            report,
        } => render_diagnostic(report, lines),
        DiagnosisOutcome::Failed {
            message,
        } => lines.push(t!("report.diagnosis_failed", pid = run.pid, error = message)),
    }
    if let Some(export) = &run.export {
        lines.push(render_export(&run.pid, export));
    }
    if let Some(outcome) = &run.repair {
        lines.push(t!("repair.result", pid = run.pid, outcome = outcome.reason));
    }
}

/// Renders a diagnostic report block.
fn render_diagnostic(report: &DiagnosticReport, lines: &mut Vec<String>) {
    lines.push(t!("report.header", pid = report.pid, owner_type = report.owner_type));
    match &report.local {
        Some(local) => {
            lines.push(t!("report.local.status", status = local.status));
            lines.push(t!("report.local.target", target = or_none(local.target.as_deref())));
        }
        None => lines.push(t!("report.local.missing")),
    }
    if report.registrar.exists {
        let status = report.registrar.status.map_or_else(|| t!("value.none"), |s| s.to_string());
        lines.push(t!("report.registrar.status", status = status));
        lines.push(t!(
            "report.registrar.target",
            target = or_none(report.registrar.target.as_deref())
        ));
    } else {
        lines.push(t!("report.registrar.missing"));
    }
    match report.metadata_matches {
        Some(true) => lines.push(t!("report.metadata.identical")),
        Some(false) => lines.push(t!(
            "report.metadata.differs",
            local = digest_label(report.local_metadata_digest.as_ref()),
            registrar = digest_label(report.registrar_metadata_digest.as_ref())
        )),
        None => lines.push(t!("report.metadata.not_compared")),
    }
    if report.is_degraded() {
        let steps: Vec<&str> = report.degraded.iter().map(|step| step.as_str()).collect();
        lines.push(t!("report.degraded", steps = steps.join(", ")));
    }
    match &report.owner {
        OwnerSnapshot::Dataset(snapshot) => {
            if snapshot.linked.is_empty() {
                lines.push(t!("report.dataset.none"));
            }
            for dataset in &snapshot.linked {
                let current = dataset.current_pid.as_ref().map(Pid::as_str);
                lines.push(t!("report.dataset", key = dataset.key, current = or_none(current)));
            }
            if let Some(listed) = snapshot.pid_in_alternates {
                let value = if listed { t!("value.yes") } else { t!("value.no") };
                lines.push(t!("report.dataset.in_alternates", value = value));
            }
        }
        OwnerSnapshot::Download(snapshot) => match &snapshot.download {
            Some(download) => lines.push(t!(
                "report.download",
                key = download.key,
                status = download.status,
                user = download.requesting_user
            )),
            None => lines.push(t!("report.download.none")),
        },
    }
}

/// Renders an export outcome line.
fn render_export(pid: &Pid, export: &ExportOutcome) -> String {
    match export {
        ExportOutcome::Written {
            location,
        } => t!("export.written", location = location),
        ExportOutcome::NoStoredMetadata => t!("export.no_metadata", pid = pid),
        ExportOutcome::Failed {
            message,
        } => t!("export.failed", pid = pid, error = message),
    }
}

/// Renders the failed PID listing in two labeled sections.
fn render_listing(listing: &FailedPidListing, lines: &mut Vec<String>) {
    lines.push(t!("failed.datasets"));
    lines.extend(listing.datasets.iter().map(ToString::to_string));
    lines.push(t!("failed.downloads"));
    lines.extend(listing.downloads.iter().map(ToString::to_string));
}

/// Returns `value` or the localized "none".
fn or_none(value: Option<&str>) -> String {
    value.map_or_else(|| t!("value.none"), str::to_string)
}

/// Formats a digest as `algorithm:hex`.
fn digest_label(digest: Option<&HashDigest>) -> String {
    digest.map_or_else(|| t!("value.none"), ToString::to_string)
}
