// crates/pid-sync-core/src/interfaces/mod.rs
// ============================================================================
// Module: PID Sync Interfaces
// Description: Collaborator contracts for storage, registrar, repair, export.
// Purpose: Keep the engine free of SQL, HTTP, and filesystem details.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The engine consumes the local store and the registrar through narrow
//! read interfaces and hands repair replays and metadata exports to
//! caller-supplied collaborators. Every collaborator is injected at
//! construction; there is no ambient state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Dataset;
use crate::core::Download;
use crate::core::Identity;
use crate::core::LocalPidRecord;
use crate::core::OwnerType;
use crate::core::Pid;
use crate::core::RegistrarResolution;

// ============================================================================
// SECTION: Local Store
// ============================================================================

/// Local store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("local store io error: {0}")]
    Io(String),
    /// Stored data is corrupted or fails integrity checks.
    #[error("local store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("local store version mismatch: {0}")]
    VersionMismatch(String),
    /// Stored data is invalid.
    #[error("local store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("local store error: {0}")]
    Store(String),
}

/// Read side of the local system-of-record.
pub trait LocalStore {
    /// Returns the owner type indexed for `pid`, if known.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_owner_type(&self, pid: &Pid) -> Result<Option<OwnerType>, StoreError>;

    /// Returns the local PID record, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_local_record(&self, pid: &Pid) -> Result<Option<LocalPidRecord>, StoreError>;

    /// Returns every dataset linked to `pid`.
    ///
    /// A dataset is linked when its current PID equals `pid` or when `pid`
    /// is one of its DOI alternate identifiers, so a dataset that rotated
    /// away from `pid` is still found by the old value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_datasets_by_pid(&self, pid: &Pid) -> Result<Vec<Dataset>, StoreError>;

    /// Returns the download owning `pid`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn find_download_by_pid(&self, pid: &Pid) -> Result<Option<Download>, StoreError>;

    /// Lists PIDs of `owner_type` whose local status is failed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the listing fails.
    fn list_failed(&self, owner_type: OwnerType) -> Result<Vec<Pid>, StoreError>;

    /// Resolves an identity by account name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn resolve_identity(&self, name: &str) -> Result<Option<Identity>, StoreError>;
}

// ============================================================================
// SECTION: Registrar Probe
// ============================================================================

/// Registrar probe errors.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// Request could not be sent or timed out.
    #[error("registrar transport error: {0}")]
    Transport(String),
    /// Registrar answered with an unexpected status.
    #[error("registrar returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Short description.
        message: String,
    },
    /// Registrar response could not be decoded.
    #[error("registrar response invalid: {0}")]
    Invalid(String),
    /// PID is not known to the registrar.
    #[error("pid not found at registrar: {0}")]
    NotFound(String),
}

/// Read-only view of the external registrar.
pub trait RegistrarProbe {
    /// Returns whether the registrar knows `pid`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrarError`] when the registrar cannot be queried.
    fn exists(&self, pid: &Pid) -> Result<bool, RegistrarError>;

    /// Fetches the registrar copy of the metadata document.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrarError`] when the registrar cannot be queried.
    fn fetch_metadata(&self, pid: &Pid) -> Result<Option<String>, RegistrarError>;

    /// Resolves the registrar status and target of `pid`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrarError`] when the registrar cannot be queried.
    fn resolve_status(&self, pid: &Pid) -> Result<RegistrarResolution, RegistrarError>;
}

// ============================================================================
// SECTION: Repair Executor
// ============================================================================

/// Repair executor errors.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Executor failed to carry out the replay.
    #[error("repair executor error: {0}")]
    Failed(String),
}

/// Performs the state-synchronization replay a repair strategy decided on.
///
/// Implementations perform the registrar write and the local status update;
/// the engine only decides that a replay is safe.
pub trait RepairExecutor {
    /// Replays the "dataset state changed" synchronization.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the replay fails.
    fn dataset_changed(
        &self,
        dataset: &Dataset,
        prior_pid: Option<&Pid>,
    ) -> Result<(), ExecutorError>;

    /// Replays the "download state changed" synchronization.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the replay fails.
    fn download_changed(
        &self,
        download: &Download,
        prior_pid: Option<&Pid>,
        acting_identity: &Identity,
    ) -> Result<(), ExecutorError>;
}

// ============================================================================
// SECTION: Export Sink
// ============================================================================

/// Export sink errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Export destination could not be written.
    #[error("export write failed: {0}")]
    Write(String),
}

/// Receipt returned by export sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    /// Location the document was written to.
    pub location: String,
}

/// Persists a stored metadata document to a caller-chosen destination.
pub trait ExportSink {
    /// Exports the metadata document of `pid`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] when writing fails.
    fn export(&self, pid: &Pid, document: &str) -> Result<ExportReceipt, ExportError>;
}
