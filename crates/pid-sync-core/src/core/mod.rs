// crates/pid-sync-core/src/core/mod.rs
// ============================================================================
// Module: PID Sync Core Types
// Description: PID values, records, reports, and repair outcomes.
// Purpose: Provide stable, serializable types shared by every crate.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! Core types are the canonical data model for reconciliation. They carry no
//! behavior beyond validation and small accessors; the engine lives in
//! [`crate::runtime`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hashing;
pub mod pid;
pub mod records;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use pid::MAX_PID_LENGTH;
pub use pid::Pid;
pub use pid::PidError;
pub use pid::PidPrefix;
pub use records::AlternateIdentifier;
pub use records::Dataset;
pub use records::Download;
pub use records::DownloadStatus;
pub use records::Identity;
pub use records::IdentifierKind;
pub use records::LocalPidRecord;
pub use records::OwnerType;
pub use records::PidStatus;
pub use records::RegistrarRecord;
pub use records::RegistrarResolution;
pub use report::DatasetSnapshot;
pub use report::DiagnosticReport;
pub use report::DownloadSnapshot;
pub use report::OwnerSnapshot;
pub use report::ProbeStep;
pub use report::RegistrarFindings;
pub use report::RepairOutcome;
pub use report::RepairReason;
