// crates/pid-sync-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for operators and tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `pid-sync.toml`. The config tests parse it, so it stays
//! in sync with the model.

/// Returns a canonical example `pid-sync.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[registry]
prefix = "10.5072"
download_identity = "download-service"

[registrar]
api_url = "https://api.test.datacite.org"
timeout_ms = 5000
max_response_bytes = 4194304
user_agent = "pid-sync/0.1"
# username = "REPO.ACCOUNT"
# password = "secret"
# allow_http = false

[store]
path = "pid-sync.sqlite"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000

[repair]
journal_path = "pid-sync-repairs.jsonl"

[export]
directory = "exports"

[audit]
sink = "file"
path = "pid-sync-audit.jsonl"
"#,
    )
}
