// crates/pid-sync-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Provides the message catalog and translation helpers.
// Purpose: Centralize user-facing strings behind stable keys.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! Every string `pid-sync` prints comes from a small keyed catalog, routed
//! through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `pid`).
/// - `value` is preformatted and should be safe for display.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"pid"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
const CATALOG: &[(&str, &str)] = &[
    ("main.version", "pid-sync {version}"),
    ("input.invalid", "Invalid arguments: {error}"),
    ("config.load_failed", "Failed to load configuration: {error}"),
    ("store.open_failed", "Failed to open local store: {error}"),
    ("registrar.init_failed", "Failed to initialize registrar client: {error}"),
    ("audit.open_failed", "Failed to open audit log {path}: {error}"),
    ("pid_list.read_failed", "Failed to read PID list {path}: {error}"),
    ("run.failed", "Reconciliation failed: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to serialize report: {error}"),
    ("report.header", "PID {pid} ({owner_type})"),
    ("report.nothing_found", "No report can be generated. Nothing found for PID {pid}"),
    ("report.diagnosis_failed", "Diagnosis failed for PID {pid}: {error}"),
    ("report.local.status", "  local status: {status}"),
    ("report.local.missing", "  local record: none"),
    ("report.local.target", "  local target: {target}"),
    ("report.registrar.missing", "  registrar: not found"),
    ("report.registrar.status", "  registrar status: {status}"),
    ("report.registrar.target", "  registrar target: {target}"),
    ("report.metadata.identical", "  metadata: identical"),
    ("report.metadata.differs", "  metadata: differs (local {local}, registrar {registrar})"),
    ("report.metadata.not_compared", "  metadata: not compared"),
    ("report.degraded", "  degraded registrar probes: {steps}"),
    ("report.dataset", "  dataset {key}: current PID {current}"),
    ("report.dataset.none", "  datasets: none linked"),
    ("report.dataset.in_alternates", "  PID listed in alternate identifiers: {value}"),
    ("report.download", "  download {key}: status {status}, requested by {user}"),
    ("report.download.none", "  download: not found"),
    ("export.written", "Exported file saved in {location}"),
    ("export.no_metadata", "Export skipped for PID {pid}: no stored metadata"),
    ("export.failed", "Export failed for PID {pid}: {error}"),
    ("repair.result", "Repair of PID {pid}: {outcome}"),
    ("entry.rejected", "{input} is not a valid PID: {error}"),
    ("entry.skipped.cancelled", "Skipped {input}: run cancelled"),
    ("entry.skipped.duplicate", "Skipped {input}: already processed in this run"),
    ("failed.datasets", "Dataset PIDs with status FAILED:"),
    ("failed.downloads", "Download PIDs with status FAILED:"),
    ("value.none", "none"),
    ("value.yes", "yes"),
    ("value.no", "no"),
];

/// Returns the message catalog.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG_MAP.get_or_init(|| CATALOG.iter().copied().collect())
}

/// Returns the raw catalog entries in declaration order.
#[must_use]
pub fn catalog_entries() -> &'static [(&'static str, &'static str)] {
    CATALOG
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Resolves `key` while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
