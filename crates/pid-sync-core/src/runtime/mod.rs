// crates/pid-sync-core/src/runtime/mod.rs
// ============================================================================
// Module: PID Sync Runtime
// Description: Classification, diagnosis, repair, and orchestration.
// Purpose: Decide when a registrar replay is safe and report why.
// Dependencies: crate::{audit, core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the reconciliation engine. Every collaborator is
//! borrowed or owned explicitly; nothing here performs I/O except through the
//! traits in [`crate::interfaces`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod classifier;
pub mod dataset_repair;
pub mod diagnostic;
pub mod download_repair;
pub mod orchestrator;
pub mod repair;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use classifier::Classification;
pub use classifier::Classifier;
pub use dataset_repair::DatasetRepairPlan;
pub use dataset_repair::DatasetRepairStrategy;
pub use dataset_repair::plan_dataset_repair;
pub use diagnostic::DiagnosticBuilder;
pub use download_repair::DownloadRepairStrategy;
pub use orchestrator::CancelFlag;
pub use orchestrator::DiagnosisOutcome;
pub use orchestrator::EntryOutcome;
pub use orchestrator::ExportOutcome;
pub use orchestrator::FailedPidListing;
pub use orchestrator::PidRun;
pub use orchestrator::ReconcileOptions;
pub use orchestrator::ReconcileReport;
pub use orchestrator::ReconcileScope;
pub use orchestrator::Reconciler;
pub use orchestrator::ReconcilerSettings;
pub use orchestrator::SkipReason;
pub use repair::RepairStrategy;
pub use store::InMemoryLocalStore;
