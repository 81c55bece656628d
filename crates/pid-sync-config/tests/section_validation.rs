// crates/pid-sync-config/tests/section_validation.rs
// =============================================================================
// Module: Config Section Validation Tests
// Description: Validate per-section defaults and fail-closed checks.
// Purpose: Ensure invalid registry, registrar, and audit settings are rejected.
// =============================================================================

//! ## Overview
//! Each test starts from a minimal valid document and changes one field.

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

use std::path::Path;

use pid_sync_config::AuditSinkType;
use pid_sync_config::ConfigError;
use pid_sync_config::PidSyncConfig;
use pid_sync_store_sqlite::SqliteStoreMode;

const MINIMAL: &str = r#"
[registry]
prefix = "10.5072"

[registrar]
api_url = "https://api.test.datacite.org"

[store]
path = "pid-sync.sqlite"
"#;

fn with_replacement(from: &str, to: &str) -> String {
    assert!(MINIMAL.contains(from), "fixture lacks {from}");
    MINIMAL.replace(from, to)
}

fn invalid_message(content: &str) -> String {
    match PidSyncConfig::from_toml_str(content) {
        Err(ConfigError::Invalid(message)) => message,
        other => panic!("expected invalid config, got {other:?}"),
    }
}

#[test]
fn minimal_config_applies_defaults() {
    let config = PidSyncConfig::from_toml_str(MINIMAL).unwrap();
    assert_eq!(config.registry.download_identity, "download-service");
    assert_eq!(config.registrar.timeout_ms, 5_000);
    assert_eq!(config.registrar.max_response_bytes, 4 * 1024 * 1024);
    assert!(!config.registrar.allow_http);
    assert!(config.registrar.user_agent.starts_with("pid-sync/"));
    assert_eq!(config.store.journal_mode, SqliteStoreMode::Wal);
    assert_eq!(config.repair.journal_path, Path::new("pid-sync-repairs.jsonl"));
    assert_eq!(config.export.directory, Path::new("."));
    assert_eq!(config.audit.sink, AuditSinkType::Stderr);
}

#[test]
fn missing_required_sections_fail_to_parse() {
    let without_store = MINIMAL.replace("[store]\npath = \"pid-sync.sqlite\"\n", "");
    assert!(matches!(PidSyncConfig::from_toml_str(&without_store), Err(ConfigError::Parse(_))));
}

#[test]
fn unknown_fields_are_rejected() {
    let content = with_replacement("prefix = \"10.5072\"", "prefix = \"10.5072\"\nflavor = \"x\"");
    assert!(matches!(PidSyncConfig::from_toml_str(&content), Err(ConfigError::Parse(_))));
}

#[test]
fn invalid_prefix_is_rejected() {
    let message = invalid_message(&with_replacement("\"10.5072\"", "\"11.5072\""));
    assert!(message.contains("registry.prefix"), "{message}");
}

#[test]
fn blank_download_identity_is_rejected() {
    let content =
        with_replacement("prefix = \"10.5072\"", "prefix = \"10.5072\"\ndownload_identity = \" \"");
    assert!(invalid_message(&content).contains("download_identity"));
}

#[test]
fn cleartext_registrar_requires_opt_in() {
    let content = with_replacement("https://api", "http://api");
    assert!(invalid_message(&content).contains("allow_http"));

    let allowed = with_replacement(
        "api_url = \"https://api.test.datacite.org\"",
        "api_url = \"http://127.0.0.1:8080\"\nallow_http = true",
    );
    assert!(PidSyncConfig::from_toml_str(&allowed).unwrap().registrar.allow_http);
}

#[test]
fn registrar_url_requires_http_scheme() {
    let content = with_replacement("https://api.test.datacite.org", "ftp://api.test.datacite.org");
    assert!(invalid_message(&content).contains("api_url"));
}

#[test]
fn registrar_timeout_is_bounded() {
    for timeout in ["99", "60001"] {
        let content = with_replacement(
            "api_url = \"https://api.test.datacite.org\"",
            &format!("api_url = \"https://api.test.datacite.org\"\ntimeout_ms = {timeout}"),
        );
        assert!(invalid_message(&content).contains("timeout_ms"), "timeout {timeout}");
    }
}

#[test]
fn password_without_username_is_rejected() {
    let content = with_replacement(
        "api_url = \"https://api.test.datacite.org\"",
        "api_url = \"https://api.test.datacite.org\"\npassword = \"secret\"",
    );
    assert!(invalid_message(&content).contains("username"));
}

#[test]
fn file_audit_sink_requires_path() {
    let content = format!("{MINIMAL}\n[audit]\nsink = \"file\"\n");
    assert!(invalid_message(&content).contains("audit.path"));

    let stray = format!("{MINIMAL}\n[audit]\nsink = \"none\"\npath = \"audit.jsonl\"\n");
    assert!(invalid_message(&stray).contains("file sink"));

    let valid = format!("{MINIMAL}\n[audit]\nsink = \"file\"\npath = \"audit.jsonl\"\n");
    let config = PidSyncConfig::from_toml_str(&valid).unwrap();
    assert_eq!(config.audit.sink, AuditSinkType::File);
}

#[test]
fn empty_store_path_is_rejected() {
    let content = with_replacement("path = \"pid-sync.sqlite\"", "path = \"\"");
    assert!(invalid_message(&content).contains("store.path"));
}
