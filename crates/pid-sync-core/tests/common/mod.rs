// crates/pid-sync-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared fakes and fixtures for reconciliation tests.
// Purpose: Provide deterministic collaborators without SQL or HTTP.
// Dependencies: pid-sync-core
// ============================================================================

//! ## Overview
//! Provides a scripted registrar probe, a recording repair executor, and
//! record builders shared by the core integration tests.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only fixtures use unwrap on deterministic inputs."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;

use pid_sync_core::AlternateIdentifier;
use pid_sync_core::Dataset;
use pid_sync_core::Download;
use pid_sync_core::DownloadStatus;
use pid_sync_core::ExecutorError;
use pid_sync_core::ExportError;
use pid_sync_core::ExportReceipt;
use pid_sync_core::ExportSink;
use pid_sync_core::Identity;
use pid_sync_core::InMemoryLocalStore;
use pid_sync_core::LocalPidRecord;
use pid_sync_core::OwnerType;
use pid_sync_core::Pid;
use pid_sync_core::PidPrefix;
use pid_sync_core::PidStatus;
use pid_sync_core::ProbeStep;
use pid_sync_core::RegistrarError;
use pid_sync_core::RegistrarProbe;
use pid_sync_core::RegistrarResolution;
use pid_sync_core::RepairExecutor;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Prefix of locally minted PIDs in every fixture.
pub const LOCAL_PREFIX: &str = "10.5072";

/// Fixed download repair identity in every fixture.
pub const DOWNLOAD_IDENTITY: &str = "download-service";

/// Parses a PID fixture.
pub fn pid(raw: &str) -> Pid {
    Pid::parse(raw).unwrap()
}

/// Returns the local prefix fixture.
pub fn local_prefix() -> PidPrefix {
    PidPrefix::parse(LOCAL_PREFIX).unwrap()
}

/// Builds a local PID record.
pub fn record(raw: &str, owner_type: OwnerType, status: PidStatus, metadata: Option<&str>) -> LocalPidRecord {
    LocalPidRecord {
        pid: pid(raw),
        owner_type,
        status,
        metadata: metadata.map(str::to_string),
        target: Some(format!("https://data.example.org/{raw}")),
    }
}

/// Builds a dataset with DOI alternate identifiers.
pub fn dataset(key: &str, current: Option<&str>, alternates: &[&str]) -> Dataset {
    Dataset {
        key: key.to_string(),
        current_pid: current.map(pid),
        alternate_identifiers: alternates
            .iter()
            .map(|raw| AlternateIdentifier::doi(&pid(raw)))
            .collect(),
    }
}

/// Builds a download.
pub fn download(key: &str, raw: &str, status: DownloadStatus) -> Download {
    Download {
        key: key.to_string(),
        pid: pid(raw),
        status,
        requesting_user: "alice".to_string(),
    }
}

/// Builds the fixed repair identity.
pub fn repair_identity() -> Identity {
    Identity {
        name: DOWNLOAD_IDENTITY.to_string(),
        key: "identity-1".to_string(),
    }
}

/// Store holding a dataset-owned PID whose dataset still holds it.
pub fn store_with_dataset(raw: &str, metadata: Option<&str>) -> InMemoryLocalStore {
    let store = InMemoryLocalStore::new();
    store.insert_record(record(raw, OwnerType::Dataset, PidStatus::Registered, metadata)).unwrap();
    store.insert_dataset(dataset("dataset-1", Some(raw), &[])).unwrap();
    store
}

// ============================================================================
// SECTION: Scripted Registrar Probe
// ============================================================================

/// Registrar entry served by [`ScriptedProbe`].
#[derive(Debug, Clone)]
pub struct RegistrarEntry {
    /// Registrar status.
    pub status: PidStatus,
    /// Registrar target URL.
    pub target: Option<String>,
    /// Registrar metadata document.
    pub metadata: Option<String>,
}

/// Registrar probe answering from a fixed table.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    /// Known PIDs.
    entries: BTreeMap<Pid, RegistrarEntry>,
    /// Steps that fail with a transport error.
    failing: BTreeSet<ProbeStep>,
    /// Call log as `step pid`.
    calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    /// Creates a probe that knows no PIDs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `raw` as registered with the given metadata.
    #[must_use]
    pub fn with_registered(mut self, raw: &str, metadata: Option<&str>) -> Self {
        self.entries.insert(
            pid(raw),
            RegistrarEntry {
                status: PidStatus::Registered,
                target: Some(format!("https://data.example.org/{raw}")),
                metadata: metadata.map(str::to_string),
            },
        );
        self
    }

    /// Makes `step` fail with a transport error.
    #[must_use]
    pub fn failing(mut self, step: ProbeStep) -> Self {
        self.failing.insert(step);
        self
    }

    /// Returns the recorded calls.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Logs a call and fails when the step is scripted to fail.
    fn enter(&self, step: ProbeStep, pid: &Pid) -> Result<(), RegistrarError> {
        self.calls.lock().unwrap().push(format!("{} {pid}", step.as_str()));
        if self.failing.contains(&step) {
            return Err(RegistrarError::Transport("timed out".to_string()));
        }
        Ok(())
    }
}

impl RegistrarProbe for ScriptedProbe {
    fn exists(&self, pid: &Pid) -> Result<bool, RegistrarError> {
        self.enter(ProbeStep::Exists, pid)?;
        Ok(self.entries.contains_key(pid))
    }

    fn fetch_metadata(&self, pid: &Pid) -> Result<Option<String>, RegistrarError> {
        self.enter(ProbeStep::FetchMetadata, pid)?;
        Ok(self.entries.get(pid).and_then(|entry| entry.metadata.clone()))
    }

    fn resolve_status(&self, pid: &Pid) -> Result<RegistrarResolution, RegistrarError> {
        self.enter(ProbeStep::Resolve, pid)?;
        let entry = self
            .entries
            .get(pid)
            .ok_or_else(|| RegistrarError::NotFound(pid.to_string()))?;
        Ok(RegistrarResolution {
            status: entry.status,
            target: entry.target.clone(),
        })
    }
}

// ============================================================================
// SECTION: Recording Executor
// ============================================================================

/// Replay request captured by [`RecordingExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replay {
    /// Dataset state change.
    Dataset {
        /// Dataset key.
        key: String,
        /// Prior PID argument.
        prior_pid: Option<Pid>,
    },
    /// Download state change.
    Download {
        /// Download key.
        key: String,
        /// Prior PID argument.
        prior_pid: Option<Pid>,
        /// Acting identity name.
        identity: String,
    },
}

/// Repair executor that records replay requests.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    /// Recorded replays.
    replays: Mutex<Vec<Replay>>,
    /// Whether every replay fails.
    fail: bool,
}

impl RecordingExecutor {
    /// Creates an executor that accepts every replay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor that rejects every replay.
    pub fn failing() -> Self {
        Self {
            replays: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Returns the recorded replays.
    pub fn replays(&self) -> Vec<Replay> {
        self.replays.lock().unwrap().clone()
    }
}

impl RepairExecutor for RecordingExecutor {
    fn dataset_changed(&self, dataset: &Dataset, prior_pid: Option<&Pid>) -> Result<(), ExecutorError> {
        if self.fail {
            return Err(ExecutorError::Failed("registrar rejected update".to_string()));
        }
        self.replays.lock().unwrap().push(Replay::Dataset {
            key: dataset.key.clone(),
            prior_pid: prior_pid.cloned(),
        });
        Ok(())
    }

    fn download_changed(
        &self,
        download: &Download,
        prior_pid: Option<&Pid>,
        acting_identity: &Identity,
    ) -> Result<(), ExecutorError> {
        if self.fail {
            return Err(ExecutorError::Failed("registrar rejected update".to_string()));
        }
        self.replays.lock().unwrap().push(Replay::Download {
            key: download.key.clone(),
            prior_pid: prior_pid.cloned(),
            identity: acting_identity.name.clone(),
        });
        Ok(())
    }
}

// ============================================================================
// SECTION: Memory Export Sink
// ============================================================================

/// Export sink collecting documents in memory.
#[derive(Debug, Default)]
pub struct MemoryExportSink {
    /// Exported `(pid, document)` pairs.
    documents: Mutex<Vec<(Pid, String)>>,
    /// Whether every export fails.
    fail: bool,
}

impl MemoryExportSink {
    /// Creates a sink accepting every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink rejecting every document.
    pub fn failing() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Returns the exported documents.
    pub fn documents(&self) -> Vec<(Pid, String)> {
        self.documents.lock().unwrap().clone()
    }
}

impl ExportSink for MemoryExportSink {
    fn export(&self, pid: &Pid, document: &str) -> Result<ExportReceipt, ExportError> {
        if self.fail {
            return Err(ExportError::Write("disk full".to_string()));
        }
        self.documents.lock().unwrap().push((pid.clone(), document.to_string()));
        Ok(ExportReceipt {
            location: format!("memory://{}", pid.file_stem()),
        })
    }
}
