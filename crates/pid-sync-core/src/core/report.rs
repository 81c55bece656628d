// crates/pid-sync-core/src/core/report.rs
// ============================================================================
// Module: Diagnostic Reports and Repair Outcomes
// Description: Transient results produced per PID by diagnosis and repair.
// Purpose: Carry explicit absent fields instead of partial, mutable state.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`DiagnosticReport`] is assembled once, from inputs that were already
//! resolved, and is never mutated or persisted. Fields that could not be
//! obtained are `None`, and every registrar probe call that failed is listed
//! in [`DiagnosticReport::degraded`] so callers can tell reduced precision
//! apart from a genuine "absent at the registrar".
//!
//! A [`RepairOutcome`] reports which gate or branch of a repair strategy
//! fired. Reason codes are stable for programmatic handling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::hashing::document_digest;
use crate::core::pid::Pid;
use crate::core::records::Dataset;
use crate::core::records::Download;
use crate::core::records::DownloadStatus;
use crate::core::records::LocalPidRecord;
use crate::core::records::OwnerType;
use crate::core::records::RegistrarRecord;

// ============================================================================
// SECTION: Owner Snapshots
// ============================================================================

/// Datasets linked to a PID at diagnosis time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    /// Datasets linked to the diagnosed PID (see [`crate::interfaces::LocalStore::find_datasets_by_pid`]).
    pub linked: Vec<Dataset>,
    /// Whether the PID is among the single linked dataset's alternates.
    ///
    /// `None` unless exactly one dataset is linked.
    pub pid_in_alternates: Option<bool>,
}

impl DatasetSnapshot {
    /// Builds a snapshot, recording the alternates signal for a single match.
    #[must_use]
    pub fn new(pid: &Pid, linked: Vec<Dataset>) -> Self {
        let pid_in_alternates = match linked.as_slice() {
            [dataset] => Some(dataset.has_alternate_pid(pid)),
            _ => None,
        };
        Self {
            linked,
            pid_in_alternates,
        }
    }

    /// Returns the linked dataset when exactly one is linked.
    #[must_use]
    pub fn single(&self) -> Option<&Dataset> {
        match self.linked.as_slice() {
            [dataset] => Some(dataset),
            _ => None,
        }
    }
}

/// Download owning a PID at diagnosis time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSnapshot {
    /// Owning download, if the local store still has it.
    pub download: Option<Download>,
}

/// Owner-specific part of a diagnostic report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "owner_type", rename_all = "snake_case")]
pub enum OwnerSnapshot {
    /// Dataset-owned PID.
    Dataset(DatasetSnapshot),
    /// Download-owned PID.
    Download(DownloadSnapshot),
}

impl OwnerSnapshot {
    /// Returns the owner type tag of this snapshot.
    #[must_use]
    pub const fn owner_type(&self) -> OwnerType {
        match self {
            Self::Dataset(_) => OwnerType::Dataset,
            Self::Download(_) => OwnerType::Download,
        }
    }
}

// ============================================================================
// SECTION: Diagnostic Report
// ============================================================================

/// Registrar probe call that failed during diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStep {
    /// Existence check.
    Exists,
    /// Metadata document fetch.
    FetchMetadata,
    /// Status and target resolution.
    Resolve,
}

impl ProbeStep {
    /// Returns the stable label used in audit output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "exists",
            Self::FetchMetadata => "fetch_metadata",
            Self::Resolve => "resolve",
        }
    }
}

/// Registrar-side findings, already resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrarFindings {
    /// Registrar snapshot.
    pub record: RegistrarRecord,
    /// Metadata comparison, `None` when not determinable.
    pub metadata_matches: Option<bool>,
    /// Probe calls that failed.
    pub degraded: Vec<ProbeStep>,
}

/// Full diagnostic for one PID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Diagnosed PID.
    pub pid: Pid,
    /// Owner type the PID was classified as.
    pub owner_type: OwnerType,
    /// Owner data read at diagnosis time.
    pub owner: OwnerSnapshot,
    /// Local PID record, if present.
    pub local: Option<LocalPidRecord>,
    /// Registrar snapshot.
    pub registrar: RegistrarRecord,
    /// Exact-string metadata comparison; `None` when the PID does not exist
    /// at the registrar or the registrar document could not be fetched.
    pub metadata_matches: Option<bool>,
    /// Digest of the locally stored metadata document.
    pub local_metadata_digest: Option<HashDigest>,
    /// Digest of the registrar metadata document.
    pub registrar_metadata_digest: Option<HashDigest>,
    /// Registrar probe calls that failed.
    pub degraded: Vec<ProbeStep>,
}

impl DiagnosticReport {
    /// Assembles a report from resolved parts.
    #[must_use]
    pub fn assemble(
        pid: Pid,
        owner: OwnerSnapshot,
        local: Option<LocalPidRecord>,
        findings: RegistrarFindings,
    ) -> Self {
        let local_metadata_digest =
            document_digest(local.as_ref().and_then(|record| record.metadata.as_deref()));
        let registrar_metadata_digest = document_digest(findings.record.metadata.as_deref());
        Self {
            pid,
            owner_type: owner.owner_type(),
            owner,
            local,
            registrar: findings.record,
            metadata_matches: findings.metadata_matches,
            local_metadata_digest,
            registrar_metadata_digest,
            degraded: findings.degraded,
        }
    }

    /// Returns true when at least one registrar probe call failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

// ============================================================================
// SECTION: Repair Outcomes
// ============================================================================

/// Reason a repair attempt ended the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RepairReason {
    /// PID is unknown to the local store.
    PidNotClassified,
    /// No dataset is linked to the PID.
    NoLinkedDataset,
    /// More than one dataset is linked to the PID.
    AmbiguousDatasets {
        /// Number of linked datasets.
        count: usize,
    },
    /// Linked dataset carries no current PID.
    DatasetMissingCurrentPid,
    /// Dataset still holds the PID; state change replayed without prior PID.
    ReplayedCurrentPid,
    /// Completed rotation replayed with the old PID as prior identifier.
    ReplayedRotation {
        /// Diagnosed (old) PID.
        prior_pid: Pid,
        /// Dataset's current PID.
        current_pid: Pid,
    },
    /// Dataset rotated onto a PID minted under the local prefix.
    RotationToSelfMinted {
        /// Dataset's current PID.
        current_pid: Pid,
    },
    /// Alternate identifiers do not show a completed rotation.
    RotationInvariantUnsatisfied {
        /// Whether the diagnosed PID is among the alternates.
        prior_in_alternates: bool,
        /// Whether the current PID is among the alternates.
        current_in_alternates: bool,
    },
    /// No download owns the PID.
    DownloadNotFound,
    /// Download target may still change.
    DownloadStatusUnstable {
        /// Offending download status.
        status: DownloadStatus,
    },
    /// Download state change replayed.
    ReplayedDownload,
    /// Fixed repair identity is missing from the local store.
    IdentityNotFound {
        /// Identity name that was looked up.
        name: String,
    },
    /// Local store failed during the repair.
    StoreFailure {
        /// Store error message.
        message: String,
    },
    /// Repair executor rejected the replay.
    ExecutorFailure {
        /// Executor error message.
        message: String,
    },
}

impl RepairReason {
    /// Returns the stable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PidNotClassified => "pid_not_classified",
            Self::NoLinkedDataset => "no_linked_dataset",
            Self::AmbiguousDatasets {
                ..
            } => "ambiguous_datasets",
            Self::DatasetMissingCurrentPid => "dataset_missing_current_pid",
            Self::ReplayedCurrentPid => "replayed_current_pid",
            Self::ReplayedRotation {
                ..
            } => "replayed_rotation",
            Self::RotationToSelfMinted {
                ..
            } => "rotation_to_self_minted",
            Self::RotationInvariantUnsatisfied {
                ..
            } => "rotation_invariant_unsatisfied",
            Self::DownloadNotFound => "download_not_found",
            Self::DownloadStatusUnstable {
                ..
            } => "download_status_unstable",
            Self::ReplayedDownload => "replayed_download",
            Self::IdentityNotFound {
                ..
            } => "identity_not_found",
            Self::StoreFailure {
                ..
            } => "store_failure",
            Self::ExecutorFailure {
                ..
            } => "executor_failure",
        }
    }
}

impl fmt::Display for RepairReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PidNotClassified => f.write_str("nothing to repair: pid is unknown locally"),
            Self::NoLinkedDataset => f.write_str("nothing to repair: no dataset is linked"),
            Self::AmbiguousDatasets {
                count,
            } => write!(f, "refused: {count} datasets are linked to the same pid"),
            Self::DatasetMissingCurrentPid => {
                f.write_str("refused: linked dataset has no current pid")
            }
            Self::ReplayedCurrentPid => f.write_str("dataset state change replayed"),
            Self::ReplayedRotation {
                prior_pid,
                current_pid,
            } => write!(f, "dataset rotation replayed ({prior_pid} -> {current_pid})"),
            Self::RotationToSelfMinted {
                current_pid,
            } => write!(
                f,
                "refused: rotation to a self-minted pid ({current_pid}) requires manual handling"
            ),
            Self::RotationInvariantUnsatisfied {
                prior_in_alternates,
                current_in_alternates,
            } => write!(
                f,
                "refused: rotation bookkeeping incomplete (prior in alternates: \
                 {prior_in_alternates}, current in alternates: {current_in_alternates})"
            ),
            Self::DownloadNotFound => f.write_str("nothing to repair: no download owns the pid"),
            Self::DownloadStatusUnstable {
                status,
            } => write!(f, "refused: download status is {status}"),
            Self::ReplayedDownload => f.write_str("download state change replayed"),
            Self::IdentityNotFound {
                name,
            } => write!(f, "refused: identity not found ({name})"),
            Self::StoreFailure {
                message,
            } => write!(f, "failed: local store error ({message})"),
            Self::ExecutorFailure {
                message,
            } => write!(f, "failed: repair executor error ({message})"),
        }
    }
}

/// Result of one repair attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairOutcome {
    /// Whether any safety gate was evaluated past the no-op checks.
    pub attempted: bool,
    /// Whether the state change was replayed.
    pub succeeded: bool,
    /// Branch or gate that decided the outcome.
    pub reason: RepairReason,
}

impl RepairOutcome {
    /// Nothing to repair.
    #[must_use]
    pub const fn noop(reason: RepairReason) -> Self {
        Self {
            attempted: false,
            succeeded: false,
            reason,
        }
    }

    /// A gate refused the repair.
    #[must_use]
    pub const fn refused(reason: RepairReason) -> Self {
        Self {
            attempted: true,
            succeeded: false,
            reason,
        }
    }

    /// The state change was replayed.
    #[must_use]
    pub const fn replayed(reason: RepairReason) -> Self {
        Self {
            attempted: true,
            succeeded: true,
            reason,
        }
    }
}
