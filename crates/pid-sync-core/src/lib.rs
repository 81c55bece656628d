// crates/pid-sync-core/src/lib.rs
// ============================================================================
// Module: PID Sync Core Library
// Description: Public API surface for the PID reconciliation engine.
// Purpose: Expose core types, collaborator interfaces, and runtime helpers.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! PID sync core keeps persistent identifiers consistent between the local
//! system of record and the external registrar. It classifies a PID by its
//! owning resource, builds a diagnostic comparing both sides, and decides,
//! under strict safety gates, whether replaying a state synchronization is
//! safe. The registrar write itself is delegated to a [`RepairExecutor`].
//!
//! The crate is backend-agnostic: storage, HTTP, and command surfaces live in
//! sibling crates and plug in through [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use audit::AuditKind;
pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RecordingAuditSink;
pub use audit::StderrAuditSink;
pub use audit::SyncAuditEvent;
pub use interfaces::ExecutorError;
pub use interfaces::ExportError;
pub use interfaces::ExportReceipt;
pub use interfaces::ExportSink;
pub use interfaces::LocalStore;
pub use interfaces::RegistrarError;
pub use interfaces::RegistrarProbe;
pub use interfaces::RepairExecutor;
pub use interfaces::StoreError;
pub use runtime::CancelFlag;
pub use runtime::Classification;
pub use runtime::Classifier;
pub use runtime::DatasetRepairPlan;
pub use runtime::DatasetRepairStrategy;
pub use runtime::DiagnosisOutcome;
pub use runtime::DiagnosticBuilder;
pub use runtime::DownloadRepairStrategy;
pub use runtime::EntryOutcome;
pub use runtime::ExportOutcome;
pub use runtime::FailedPidListing;
pub use runtime::InMemoryLocalStore;
pub use runtime::PidRun;
pub use runtime::ReconcileOptions;
pub use runtime::ReconcileReport;
pub use runtime::ReconcileScope;
pub use runtime::Reconciler;
pub use runtime::ReconcilerSettings;
pub use runtime::RepairStrategy;
pub use runtime::SkipReason;
pub use runtime::plan_dataset_repair;
