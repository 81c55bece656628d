// crates/pid-sync-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Local Store
// Description: Simple in-memory local store for tests and embedding callers.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`LocalStore`] for
//! tests and local demos. It is not intended for production use; the SQLite
//! store is the durable backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::Dataset;
use crate::core::Download;
use crate::core::Identity;
use crate::core::LocalPidRecord;
use crate::core::OwnerType;
use crate::core::Pid;
use crate::core::PidStatus;
use crate::interfaces::LocalStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Contents of the in-memory store.
#[derive(Debug, Default)]
struct StoreState {
    /// Local PID records keyed by PID.
    records: BTreeMap<Pid, LocalPidRecord>,
    /// Datasets keyed by resource key.
    datasets: BTreeMap<String, Dataset>,
    /// Downloads keyed by resource key.
    downloads: BTreeMap<String, Download>,
    /// Identities keyed by account name.
    identities: BTreeMap<String, Identity>,
}

/// In-memory local store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLocalStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryLocalStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a local PID record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn insert_record(&self, record: LocalPidRecord) -> Result<(), StoreError> {
        self.lock()?.records.insert(record.pid.clone(), record);
        Ok(())
    }

    /// Inserts or replaces a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn insert_dataset(&self, dataset: Dataset) -> Result<(), StoreError> {
        self.lock()?.datasets.insert(dataset.key.clone(), dataset);
        Ok(())
    }

    /// Inserts or replaces a download.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn insert_download(&self, download: Download) -> Result<(), StoreError> {
        self.lock()?.downloads.insert(download.key.clone(), download);
        Ok(())
    }

    /// Inserts or replaces an identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn insert_identity(&self, identity: Identity) -> Result<(), StoreError> {
        self.lock()?.identities.insert(identity.name.clone(), identity);
        Ok(())
    }

    /// Locks the store state.
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Store("local store mutex poisoned".to_string()))
    }
}

impl LocalStore for InMemoryLocalStore {
    fn find_owner_type(&self, pid: &Pid) -> Result<Option<OwnerType>, StoreError> {
        Ok(self.lock()?.records.get(pid).map(|record| record.owner_type))
    }

    fn get_local_record(&self, pid: &Pid) -> Result<Option<LocalPidRecord>, StoreError> {
        Ok(self.lock()?.records.get(pid).cloned())
    }

    fn find_datasets_by_pid(&self, pid: &Pid) -> Result<Vec<Dataset>, StoreError> {
        Ok(self
            .lock()?
            .datasets
            .values()
            .filter(|dataset| {
                dataset.current_pid.as_ref() == Some(pid) || dataset.has_alternate_pid(pid)
            })
            .cloned()
            .collect())
    }

    fn find_download_by_pid(&self, pid: &Pid) -> Result<Option<Download>, StoreError> {
        Ok(self.lock()?.downloads.values().find(|download| &download.pid == pid).cloned())
    }

    fn list_failed(&self, owner_type: OwnerType) -> Result<Vec<Pid>, StoreError> {
        Ok(self
            .lock()?
            .records
            .values()
            .filter(|record| record.owner_type == owner_type && record.status == PidStatus::Failed)
            .map(|record| record.pid.clone())
            .collect())
    }

    fn resolve_identity(&self, name: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.lock()?.identities.get(name).cloned())
    }
}
