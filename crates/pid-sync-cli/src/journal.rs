// crates/pid-sync-cli/src/journal.rs
// ============================================================================
// Module: Repair Journal Executor
// Description: RepairExecutor that appends replay requests as JSON lines.
// Purpose: Hand approved replays to the registrar-writing worker.
// Dependencies: pid-sync-core, serde, serde_json
// ============================================================================

//! ## Overview
//! `pid-sync` never writes to the registrar itself. Each replay the repair
//! strategies approve becomes one JSON line in the journal:
//!
//! ```text
//! {"event":"dataset_changed","timestamp_ms":..,"dataset_key":"D","current_pid":"10.5072/abc","prior_pid":null}
//! {"event":"download_changed","timestamp_ms":..,"download_key":"dl","pid":"10.5072/dl","prior_pid":null,"acting_identity":"download-service","identity_key":"id-1"}
//! ```
//!
//! The file is opened in append mode on the first replay, so runs that
//! repair nothing leave no journal behind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use pid_sync_core::Dataset;
use pid_sync_core::Download;
use pid_sync_core::ExecutorError;
use pid_sync_core::Identity;
use pid_sync_core::Pid;
use pid_sync_core::RepairExecutor;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Journal Entries
// ============================================================================

/// One replay request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEntry {
    /// Replay the dataset state-changed synchronization.
    DatasetChanged {
        /// Request time (milliseconds since epoch).
        timestamp_ms: u64,
        /// Dataset key.
        dataset_key: String,
        /// Dataset's current PID.
        current_pid: Option<String>,
        /// PID being replaced, for rotations.
        prior_pid: Option<String>,
    },
    /// Replay the download state-changed synchronization.
    DownloadChanged {
        /// Request time (milliseconds since epoch).
        timestamp_ms: u64,
        /// Download key.
        download_key: String,
        /// Download PID.
        pid: String,
        /// PID being replaced, if any.
        prior_pid: Option<String>,
        /// Identity the replay acts as.
        acting_identity: String,
        /// Key of the acting identity.
        identity_key: String,
    },
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Repair executor appending [`JournalEntry`] lines to a file.
pub struct JournalRepairExecutor {
    /// Journal path.
    path: PathBuf,
    /// Lazily opened journal handle.
    file: Mutex<Option<File>>,
}

impl JournalRepairExecutor {
    /// Creates an executor journaling to `path`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            file: Mutex::new(None),
        }
    }

    /// Returns the journal path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry, opening the journal on first use.
    fn append(&self, entry: &JournalEntry) -> Result<(), ExecutorError> {
        let line = serde_json::to_string(entry)
            .map_err(|err| ExecutorError::Failed(format!("journal encode failed: {err}")))?;
        let mut guard = self
            .file
            .lock()
            .map_err(|_| ExecutorError::Failed("journal mutex poisoned".to_string()))?;
        if guard.is_none() {
            let file =
                OpenOptions::new().create(true).append(true).open(&self.path).map_err(|err| {
                    ExecutorError::Failed(format!(
                        "unable to open journal {}: {err}",
                        self.path.display()
                    ))
                })?;
            *guard = Some(file);
        }
        let Some(file) = guard.as_mut() else {
            return Err(ExecutorError::Failed("journal unavailable".to_string()));
        };
        writeln!(file, "{line}")
            .and_then(|()| file.flush())
            .map_err(|err| ExecutorError::Failed(format!("journal write failed: {err}")))
    }
}

impl RepairExecutor for JournalRepairExecutor {
    fn dataset_changed(
        &self,
        dataset: &Dataset,
        prior_pid: Option<&Pid>,
    ) -> Result<(), ExecutorError> {
        self.append(&JournalEntry::DatasetChanged {
            timestamp_ms: now_millis(),
            dataset_key: dataset.key.clone(),
            current_pid: dataset.current_pid.as_ref().map(ToString::to_string),
            prior_pid: prior_pid.map(ToString::to_string),
        })
    }

    fn download_changed(
        &self,
        download: &Download,
        prior_pid: Option<&Pid>,
        acting_identity: &Identity,
    ) -> Result<(), ExecutorError> {
        self.append(&JournalEntry::DownloadChanged {
            timestamp_ms: now_millis(),
            download_key: download.key.clone(),
            pid: download.pid.to_string(),
            prior_pid: prior_pid.map(ToString::to_string),
            acting_identity: acting_identity.name.clone(),
            identity_key: acting_identity.key.clone(),
        })
    }
}

/// Returns the current time in milliseconds since epoch.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
