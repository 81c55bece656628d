// crates/pid-sync-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Local Store
// Description: Durable LocalStore backend using SQLite WAL.
// Purpose: Provide the system-of-record read side for PID reconciliation.
// Dependencies: pid-sync-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`LocalStore`] implementation holding
//! PID records, datasets with their alternate identifiers, downloads, and
//! identities. Write helpers exist for seeding and for operators importing
//! records; the reconciliation engine itself only reads.
//!
//! [`LocalStore`]: pid_sync_core::LocalStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteLocalStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
