// crates/pid-sync-cli/tests/sinks.rs
// ============================================================================
// Module: CLI Sink Tests
// Description: Integration tests for the export sink and repair journal.
// Purpose: Ensure exported documents and replay requests land on disk intact.
// Dependencies: pid-sync-cli, pid-sync-core, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Exercises the file-backed collaborators the CLI hands to the reconciler.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use pid_sync_cli::export::FileExportSink;
use pid_sync_cli::journal::JournalEntry;
use pid_sync_cli::journal::JournalRepairExecutor;
use pid_sync_core::Dataset;
use pid_sync_core::Download;
use pid_sync_core::DownloadStatus;
use pid_sync_core::ExportSink;
use pid_sync_core::Identity;
use pid_sync_core::Pid;
use pid_sync_core::RepairExecutor;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn pid(raw: &str) -> Pid {
    Pid::parse(raw).unwrap()
}

fn read_journal(executor: &JournalRepairExecutor) -> Vec<JournalEntry> {
    fs::read_to_string(executor.path())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

// ============================================================================
// SECTION: Export Sink
// ============================================================================

#[test]
fn export_writes_document_named_after_pid() {
    let temp = TempDir::new().unwrap();
    let directory = temp.path().join("nested").join("exports");
    let sink = FileExportSink::new(directory.clone());

    let receipt = sink.export(&pid("doi:10.5072/FK2/ABC"), "<resource/>").unwrap();

    let expected = directory.join("10.5072_FK2_ABC_export.xml");
    assert_eq!(sink.target_path(&pid("10.5072/FK2/ABC")), expected);
    assert_eq!(fs::read_to_string(&expected).unwrap(), "<resource/>");
    assert!(receipt.location.ends_with("10.5072_FK2_ABC_export.xml"), "{}", receipt.location);
}

#[test]
fn export_overwrites_previous_document() {
    let temp = TempDir::new().unwrap();
    let sink = FileExportSink::new(temp.path().to_path_buf());
    let target = pid("10.5072/abc");

    sink.export(&target, "<first/>").unwrap();
    sink.export(&target, "<second/>").unwrap();

    assert_eq!(fs::read_to_string(sink.target_path(&target)).unwrap(), "<second/>");
}

#[test]
fn export_reports_unwritable_directory() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();
    let sink = FileExportSink::new(blocker.join("exports"));

    let err = sink.export(&pid("10.5072/abc"), "<resource/>").unwrap_err();
    assert!(err.to_string().contains("unable to create export directory"), "{err}");
}

// ============================================================================
// SECTION: Repair Journal
// ============================================================================

#[test]
fn journal_is_not_created_until_first_replay() {
    let temp = TempDir::new().unwrap();
    let executor = JournalRepairExecutor::new(&temp.path().join("repairs.jsonl"));
    assert!(!executor.path().exists());
}

#[test]
fn journal_appends_dataset_and_download_replays() {
    let temp = TempDir::new().unwrap();
    let executor = JournalRepairExecutor::new(&temp.path().join("repairs.jsonl"));
    let dataset = Dataset {
        key: "D".to_string(),
        current_pid: Some(pid("10.9999/new")),
        alternate_identifiers: Vec::new(),
    };
    let download = Download {
        key: "dl-1".to_string(),
        pid: pid("10.5072/dl-1"),
        status: DownloadStatus::Succeeded,
        requesting_user: "alice".to_string(),
    };
    let identity = Identity {
        name: "download-service".to_string(),
        key: "id-7".to_string(),
    };

    executor.dataset_changed(&dataset, Some(&pid("10.5072/old"))).unwrap();
    executor.download_changed(&download, None, &identity).unwrap();

    let entries = read_journal(&executor);
    assert_eq!(entries.len(), 2);
    match &entries[0] {
        JournalEntry::DatasetChanged {
            dataset_key,
            current_pid,
            prior_pid,
            ..
        } => {
            assert_eq!(dataset_key, "D");
            assert_eq!(current_pid.as_deref(), Some("10.9999/new"));
            assert_eq!(prior_pid.as_deref(), Some("10.5072/old"));
        }
        JournalEntry::DownloadChanged {
            ..
        } => panic!("expected dataset entry first"),
    }
    match &entries[1] {
        JournalEntry::DownloadChanged {
            download_key,
            pid,
            prior_pid,
            acting_identity,
            identity_key,
            ..
        } => {
            assert_eq!(download_key, "dl-1");
            assert_eq!(pid, "10.5072/dl-1");
            assert!(prior_pid.is_none());
            assert_eq!(acting_identity, "download-service");
            assert_eq!(identity_key, "id-7");
        }
        JournalEntry::DatasetChanged {
            ..
        } => panic!("expected download entry second"),
    }
}

#[test]
fn journal_appends_across_executors() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("repairs.jsonl");
    let dataset = Dataset {
        key: "D".to_string(),
        current_pid: Some(pid("10.5072/abc")),
        alternate_identifiers: Vec::new(),
    };

    JournalRepairExecutor::new(&path).dataset_changed(&dataset, None).unwrap();
    let second = JournalRepairExecutor::new(&path);
    second.dataset_changed(&dataset, None).unwrap();

    assert_eq!(read_journal(&second).len(), 2);
}

#[test]
fn journal_open_failure_is_reported() {
    let temp = TempDir::new().unwrap();
    let executor = JournalRepairExecutor::new(&temp.path().join("missing").join("repairs.jsonl"));
    let dataset = Dataset {
        key: "D".to_string(),
        current_pid: Some(pid("10.5072/abc")),
        alternate_identifiers: Vec::new(),
    };

    let err = executor.dataset_changed(&dataset, None).unwrap_err();
    assert!(err.to_string().contains("unable to open journal"), "{err}");
}

#[test]
fn journal_lines_read_back_with_timestamps() {
    let temp = TempDir::new().unwrap();
    let executor = JournalRepairExecutor::new(&temp.path().join("repairs.jsonl"));
    let dataset = Dataset {
        key: "D".to_string(),
        current_pid: Some(pid("10.5072/abc")),
        alternate_identifiers: Vec::new(),
    };

    executor.dataset_changed(&dataset, None).unwrap();

    let line = fs::read_to_string(executor.path()).unwrap();
    let raw: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    let written = raw["timestamp_ms"].as_u64().unwrap();
    assert!(written > 0);
    match serde_json::from_str::<JournalEntry>(line.trim()).unwrap() {
        JournalEntry::DatasetChanged {
            timestamp_ms,
            ..
        } => assert_eq!(timestamp_ms, written),
        JournalEntry::DownloadChanged {
            ..
        } => panic!("expected dataset entry"),
    }
}
