// crates/pid-sync-cli/src/lib.rs
// ============================================================================
// Module: PID Sync CLI Library
// Description: Building blocks behind the `pid-sync` binary.
// Purpose: Keep mode validation, list reading, sinks, and rendering testable.
// Dependencies: pid-sync-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `pid-sync` binary is thin: it loads configuration, wires the SQLite
//! store, the registrar client, and the sinks defined here into a
//! [`pid_sync_core::Reconciler`], and renders the report. Every user-facing
//! string goes through the [`t!`](crate::t) catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod export;
pub mod i18n;
pub mod journal;
pub mod modes;
pub mod pid_list;
pub mod render;

#[cfg(test)]
mod tests;
