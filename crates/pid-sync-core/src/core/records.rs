// crates/pid-sync-core/src/core/records.rs
// ============================================================================
// Module: PID Sync Records
// Description: Owner types, lifecycle states, and local/registrar records.
// Purpose: Provide the serializable data model shared by store and engine.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Records describe what the local system-of-record and the external
//! registrar each believe about a PID. Local records, datasets and downloads
//! are owned by the local store; the engine only reads them. Registrar
//! records are point-in-time snapshots and are never cached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::pid::Pid;

// ============================================================================
// SECTION: Owner Type
// ============================================================================

/// Resource type that owns a PID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
    /// Archival dataset.
    Dataset,
    /// Generated data download.
    Download,
}

impl OwnerType {
    /// Returns the stable label used in storage and audit output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Download => "download",
        }
    }

    /// Parses a stable label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "dataset" => Some(Self::Dataset),
            "download" => Some(Self::Download),
            _ => None,
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Lifecycle Status
// ============================================================================

/// PID lifecycle status, as recorded locally or resolved at the registrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PidStatus {
    /// Minted locally, nothing sent yet.
    New,
    /// Reserved (draft) at the registrar.
    Reserved,
    /// Registered and resolvable.
    Registered,
    /// Deleted.
    Deleted,
    /// Last registrar write failed.
    Failed,
}

impl PidStatus {
    /// Returns the stable label used in storage and audit output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reserved => "reserved",
            Self::Registered => "registered",
            Self::Deleted => "deleted",
            Self::Failed => "failed",
        }
    }

    /// Parses a stable label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "new" => Some(Self::New),
            "reserved" => Some(Self::Reserved),
            "registered" => Some(Self::Registered),
            "deleted" => Some(Self::Deleted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for PidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local record of a PID as last written by the local system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPidRecord {
    /// Identifier.
    pub pid: Pid,
    /// Owning resource type.
    pub owner_type: OwnerType,
    /// Locally recorded lifecycle status.
    pub status: PidStatus,
    /// Serialized descriptive metadata document, if stored.
    pub metadata: Option<String>,
    /// Target URL the PID should resolve to, if known.
    pub target: Option<String>,
}

/// Snapshot of registrar state for a PID.
///
/// `status`, `target` and `metadata` stay `None` when the PID does not exist
/// at the registrar or when the corresponding probe call failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrarRecord {
    /// Whether the registrar knows the PID.
    pub exists: bool,
    /// Resolved registrar status.
    pub status: Option<PidStatus>,
    /// Resolved registrar target URL.
    pub target: Option<String>,
    /// Registrar copy of the metadata document.
    pub metadata: Option<String>,
}

/// Status and target resolved by the registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrarResolution {
    /// Registrar status.
    pub status: PidStatus,
    /// Registrar target URL, if set.
    pub target: Option<String>,
}

// ============================================================================
// SECTION: Datasets
// ============================================================================

/// Kind of an alternate identifier attached to a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    /// Registrar-form PID.
    Doi,
    /// Resolvable URL.
    Url,
    /// Life science identifier.
    Lsid,
    /// Handle system identifier.
    Handle,
    /// Universally unique identifier.
    Uuid,
    /// Anything else.
    Unknown,
}

impl IdentifierKind {
    /// Returns the stable label used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Doi => "doi",
            Self::Url => "url",
            Self::Lsid => "lsid",
            Self::Handle => "handle",
            Self::Uuid => "uuid",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a stable label; unrecognized labels map to [`Self::Unknown`].
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label {
            "doi" => Self::Doi,
            "url" => Self::Url,
            "lsid" => Self::Lsid,
            "handle" => Self::Handle,
            "uuid" => Self::Uuid,
            _ => Self::Unknown,
        }
    }
}

/// Alternate identifier attached to a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlternateIdentifier {
    /// Identifier kind.
    pub kind: IdentifierKind,
    /// Raw identifier value.
    pub value: String,
}

impl AlternateIdentifier {
    /// Creates a DOI-kind alternate identifier for `pid`.
    #[must_use]
    pub fn doi(pid: &Pid) -> Self {
        Self {
            kind: IdentifierKind::Doi,
            value: pid.as_str().to_string(),
        }
    }

    /// Returns true when this is a DOI-kind identifier naming `pid`.
    ///
    /// Values are compared after parsing, so `doi:` and resolver forms match.
    #[must_use]
    pub fn names(&self, pid: &Pid) -> bool {
        self.kind == IdentifierKind::Doi
            && Pid::parse(&self.value).is_ok_and(|candidate| candidate == *pid)
    }
}

/// Dataset as read from the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Opaque resource key.
    pub key: String,
    /// Current PID of the dataset, if any.
    pub current_pid: Option<Pid>,
    /// Identifiers the dataset has held or is otherwise known by.
    pub alternate_identifiers: Vec<AlternateIdentifier>,
}

impl Dataset {
    /// Returns true when `pid` appears among the DOI alternate identifiers.
    #[must_use]
    pub fn has_alternate_pid(&self, pid: &Pid) -> bool {
        self.alternate_identifiers.iter().any(|identifier| identifier.names(pid))
    }
}

// ============================================================================
// SECTION: Downloads
// ============================================================================

/// Lifecycle status of a generated download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    /// Queued for preparation.
    Preparing,
    /// Being generated.
    Running,
    /// Generation finished and the file is available.
    Succeeded,
    /// Cancelled by the requester.
    Cancelled,
    /// Killed by an operator.
    Killed,
    /// Generation failed.
    Failed,
    /// Generation suspended.
    Suspended,
    /// File was produced and later erased.
    FileErased,
}

impl DownloadStatus {
    /// All download statuses, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Preparing,
        Self::Running,
        Self::Succeeded,
        Self::Cancelled,
        Self::Killed,
        Self::Failed,
        Self::Suspended,
        Self::FileErased,
    ];

    /// Returns true for terminal states whose target can no longer change.
    #[must_use]
    pub const fn has_stable_target(self) -> bool {
        matches!(self, Self::Succeeded | Self::FileErased)
    }

    /// Returns the stable label used in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Cancelled => "cancelled",
            Self::Killed => "killed",
            Self::Failed => "failed",
            Self::Suspended => "suspended",
            Self::FileErased => "file_erased",
        }
    }

    /// Parses a stable label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == label)
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Download as read from the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    /// Opaque download key.
    pub key: String,
    /// PID assigned to the download.
    pub pid: Pid,
    /// Download lifecycle status.
    pub status: DownloadStatus,
    /// Name of the user who requested the download.
    pub requesting_user: String,
}

// ============================================================================
// SECTION: Identities
// ============================================================================

/// Identity authorizing a registrar write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account name.
    pub name: String,
    /// Opaque account key in the local store.
    pub key: String,
}
