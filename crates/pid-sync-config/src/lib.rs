// crates/pid-sync-config/src/lib.rs
// ============================================================================
// Module: PID Sync Config Library
// Description: Canonical config model, loading, and validation.
// Purpose: Single source of truth for pid-sync.toml semantics.
// Dependencies: pid-sync-core, pid-sync-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `pid-sync-config` defines the configuration model for the `pid-sync`
//! tool. Loading is bounded (path length, file size, UTF-8) and validation
//! fails closed: a config that parses but names an invalid prefix, a
//! cleartext registrar URL, or an out-of-range timeout is rejected before
//! any store or registrar is touched.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
