// crates/pid-sync-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate SQLite LocalStore behavior.
// Purpose: Ensure durable persistence and fail-closed row parsing.
// Dependencies: pid-sync-store-sqlite, pid-sync-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed local store, including the
//! alternate-identifier linkage the dataset repair strategy depends on.

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

use pid_sync_core::AlternateIdentifier;
use pid_sync_core::Dataset;
use pid_sync_core::Download;
use pid_sync_core::DownloadStatus;
use pid_sync_core::Identity;
use pid_sync_core::IdentifierKind;
use pid_sync_core::LocalPidRecord;
use pid_sync_core::LocalStore;
use pid_sync_core::OwnerType;
use pid_sync_core::Pid;
use pid_sync_core::PidStatus;
use pid_sync_core::StoreError;
use pid_sync_store_sqlite::SqliteLocalStore;
use pid_sync_store_sqlite::SqliteStoreConfig;
use pid_sync_store_sqlite::SqliteStoreError;
use pid_sync_store_sqlite::SqliteStoreMode;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn pid(raw: &str) -> Pid {
    Pid::parse(raw).unwrap()
}

fn open_store(temp: &TempDir) -> SqliteLocalStore {
    SqliteLocalStore::new(&SqliteStoreConfig::for_path(temp.path().join("store.sqlite"))).unwrap()
}

fn record(raw: &str, owner_type: OwnerType, status: PidStatus) -> LocalPidRecord {
    LocalPidRecord {
        pid: pid(raw),
        owner_type,
        status,
        metadata: Some("<resource/>".to_string()),
        target: Some("https://data.example.org/x".to_string()),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn records_round_trip_through_disk() {
    let temp = TempDir::new().unwrap();
    {
        let store = open_store(&temp);
        store.upsert_record(&record("10.5072/abc", OwnerType::Dataset, PidStatus::Registered)).unwrap();
    }
    let store = open_store(&temp);
    assert_eq!(store.find_owner_type(&pid("10.5072/abc")).unwrap(), Some(OwnerType::Dataset));
    let loaded = store.get_local_record(&pid("10.5072/abc")).unwrap().unwrap();
    assert_eq!(loaded, record("10.5072/abc", OwnerType::Dataset, PidStatus::Registered));
    assert_eq!(store.find_owner_type(&pid("10.5072/missing")).unwrap(), None);
}

#[test]
fn datasets_are_found_by_current_pid_and_doi_alternates() {
    let temp = TempDir::new().unwrap();
    let store = open_store(&temp);
    let rotated = Dataset {
        key: "D".to_string(),
        current_pid: Some(pid("10.9999/new002")),
        alternate_identifiers: vec![
            AlternateIdentifier {
                kind: IdentifierKind::Doi,
                value: "doi:10.5072/old001".to_string(),
            },
            AlternateIdentifier {
                kind: IdentifierKind::Url,
                value: "10.5072/url-only".to_string(),
            },
        ],
    };
    store.upsert_dataset(&rotated).unwrap();

    let by_old = store.find_datasets_by_pid(&pid("10.5072/old001")).unwrap();
    assert_eq!(by_old.len(), 1);
    assert!(by_old[0].has_alternate_pid(&pid("10.5072/old001")));
    assert_eq!(by_old[0].current_pid, Some(pid("10.9999/new002")));

    assert_eq!(store.find_datasets_by_pid(&pid("10.9999/new002")).unwrap().len(), 1);
    assert!(store.find_datasets_by_pid(&pid("10.5072/url-only")).unwrap().is_empty());
}

#[test]
fn upsert_dataset_replaces_alternates() {
    let temp = TempDir::new().unwrap();
    let store = open_store(&temp);
    let mut dataset = Dataset {
        key: "D".to_string(),
        current_pid: Some(pid("10.5072/a")),
        alternate_identifiers: vec![AlternateIdentifier::doi(&pid("10.5072/old"))],
    };
    store.upsert_dataset(&dataset).unwrap();
    dataset.alternate_identifiers.clear();
    store.upsert_dataset(&dataset).unwrap();
    assert!(store.find_datasets_by_pid(&pid("10.5072/old")).unwrap().is_empty());
}

#[test]
fn several_datasets_sharing_a_pid_are_all_returned() {
    let temp = TempDir::new().unwrap();
    let store = open_store(&temp);
    for key in ["D1", "D2"] {
        store
            .upsert_dataset(&Dataset {
                key: key.to_string(),
                current_pid: Some(pid("10.5072/dup")),
                alternate_identifiers: Vec::new(),
            })
            .unwrap();
    }
    let linked = store.find_datasets_by_pid(&pid("10.5072/dup")).unwrap();
    let keys: Vec<&str> = linked.iter().map(|dataset| dataset.key.as_str()).collect();
    assert_eq!(keys, vec!["D1", "D2"]);
}

#[test]
fn downloads_and_identities_resolve() {
    let temp = TempDir::new().unwrap();
    let store = open_store(&temp);
    store
        .upsert_download(&Download {
            key: "dl-1".to_string(),
            pid: pid("10.5072/dl-1"),
            status: DownloadStatus::FileErased,
            requesting_user: "alice".to_string(),
        })
        .unwrap();
    store
        .upsert_identity(&Identity {
            name: "download-service".to_string(),
            key: "id-1".to_string(),
        })
        .unwrap();
    let download = store.find_download_by_pid(&pid("10.5072/dl-1")).unwrap().unwrap();
    assert_eq!(download.status, DownloadStatus::FileErased);
    assert_eq!(store.resolve_identity("download-service").unwrap().unwrap().key, "id-1");
    assert!(store.resolve_identity("nobody").unwrap().is_none());
}

#[test]
fn list_failed_filters_by_owner_type_and_status() {
    let temp = TempDir::new().unwrap();
    let store = open_store(&temp);
    store.upsert_record(&record("10.5072/b", OwnerType::Dataset, PidStatus::Failed)).unwrap();
    store.upsert_record(&record("10.5072/a", OwnerType::Dataset, PidStatus::Failed)).unwrap();
    store.upsert_record(&record("10.5072/c", OwnerType::Dataset, PidStatus::Registered)).unwrap();
    store.upsert_record(&record("10.5072/d", OwnerType::Download, PidStatus::Failed)).unwrap();
    assert_eq!(
        store.list_failed(OwnerType::Dataset).unwrap(),
        vec![pid("10.5072/a"), pid("10.5072/b")]
    );
    assert_eq!(store.list_failed(OwnerType::Download).unwrap(), vec![pid("10.5072/d")]);
}

#[test]
fn corrupted_status_fails_closed() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.sqlite");
    let store = SqliteLocalStore::new(&SqliteStoreConfig::for_path(&path)).unwrap();
    store.upsert_record(&record("10.5072/abc", OwnerType::Dataset, PidStatus::New)).unwrap();
    let connection = rusqlite::Connection::open(&path).unwrap();
    connection
        .execute("UPDATE pid_records SET status = 'mystery' WHERE pid = '10.5072/abc'", [])
        .unwrap();
    let err = store.get_local_record(&pid("10.5072/abc")).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

#[test]
fn rejects_unsupported_schema_version() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.sqlite");
    drop(SqliteLocalStore::new(&SqliteStoreConfig::for_path(&path)).unwrap());
    let connection = rusqlite::Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = 99", []).unwrap();
    drop(connection);
    let result = SqliteLocalStore::new(&SqliteStoreConfig::for_path(&path));
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

#[test]
fn rejects_directory_as_store_path() {
    let temp = TempDir::new().unwrap();
    let mut config = SqliteStoreConfig::for_path(temp.path());
    config.journal_mode = SqliteStoreMode::Delete;
    assert!(matches!(SqliteLocalStore::new(&config), Err(SqliteStoreError::Invalid(_))));
}
