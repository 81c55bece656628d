// crates/pid-sync-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Reconciliation Orchestrator
// Description: Runs diagnosis, export, and repair over one or many PIDs.
// Purpose: Scope every failure to the PID it occurred on.
// Dependencies: crate::{audit, core, interfaces, runtime}, serde
// ============================================================================

//! ## Overview
//! The orchestrator is a single sequential worker. For each PID in scope it
//! optionally diagnoses, exports the stored metadata document, and repairs
//! through the strategy matching the PID's owner type. Every error is turned
//! into a field of that PID's outcome; a batch is never aborted.
//!
//! Cancellation is coarse: the [`CancelFlag`] is checked between PIDs and
//! every remaining entry is reported as skipped. Duplicate entries in a
//! batch are skipped as well, so one invocation never repairs the same PID
//! twice.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde::Serialize;

use crate::audit::AuditKind;
use crate::audit::AuditSink;
use crate::audit::SyncAuditEvent;
use crate::core::DiagnosticReport;
use crate::core::OwnerType;
use crate::core::Pid;
use crate::core::PidPrefix;
use crate::core::RepairOutcome;
use crate::core::RepairReason;
use crate::interfaces::ExportSink;
use crate::interfaces::LocalStore;
use crate::interfaces::RegistrarProbe;
use crate::interfaces::RepairExecutor;
use crate::interfaces::StoreError;
use crate::runtime::classifier::Classification;
use crate::runtime::classifier::Classifier;
use crate::runtime::dataset_repair::DatasetRepairStrategy;
use crate::runtime::diagnostic::DiagnosticBuilder;
use crate::runtime::download_repair::DownloadRepairStrategy;
use crate::runtime::repair::RepairStrategy;

// ============================================================================
// SECTION: Settings and Requests
// ============================================================================

/// Fixed settings of a reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Namespace prefix of PIDs minted by the local registry.
    pub local_prefix: PidPrefix,
    /// Identity authorizing download repair replays.
    pub download_identity: String,
}

/// Which PIDs a reconciliation run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileScope {
    /// One already-parsed PID.
    Single(Pid),
    /// Raw entries, parsed one by one.
    Batch(Vec<String>),
    /// PIDs currently in failed local status.
    ListFailed,
}

/// Per-PID steps to run.
#[derive(Clone, Copy, Default)]
pub struct ReconcileOptions<'a> {
    /// Skip diagnosis.
    pub skip_diagnostic: bool,
    /// Export sink for stored metadata documents.
    pub export: Option<&'a dyn ExportSink>,
    /// Run the matching repair strategy.
    pub repair: bool,
}

/// Cooperative cancellation flag checked between PIDs.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    /// Shared cancellation state.
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Diagnosis result for one PID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DiagnosisOutcome {
    /// Diagnosis was not requested.
    Skipped,
    /// PID is unknown locally.
    NothingFound,
    /// Diagnostic report, possibly degraded.
    Report {
        /// Assembled report.
        report: Box<DiagnosticReport>,
    },
    /// Local store failed.
    Failed {
        /// Error message.
        message: String,
    },
}

/// Export result for one PID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// Document written.
    Written {
        /// Location reported by the sink.
        location: String,
    },
    /// Local record has no stored metadata document.
    NoStoredMetadata,
    /// Reading or writing the document failed.
    Failed {
        /// Error message.
        message: String,
    },
}

/// Everything done for one parsed PID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PidRun {
    /// PID processed.
    pub pid: Pid,
    /// Diagnosis result.
    pub diagnosis: DiagnosisOutcome,
    /// Export result, when export was requested.
    pub export: Option<ExportOutcome>,
    /// Repair result, when repair was requested.
    pub repair: Option<RepairOutcome>,
}

/// Why an entry was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Cancellation was requested before the entry was reached.
    Cancelled,
    /// The same PID appeared earlier in the batch.
    Duplicate,
}

/// Outcome of one batch entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Entry did not parse as a PID.
    Rejected {
        /// Raw entry.
        input: String,
        /// Parse error message.
        error: String,
    },
    /// Entry was not processed.
    Skipped {
        /// Raw entry.
        input: String,
        /// Skip reason.
        reason: SkipReason,
    },
    /// Entry was processed.
    Processed(PidRun),
}

/// PIDs in failed local status, partitioned by owner type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FailedPidListing {
    /// Failed dataset PIDs.
    pub datasets: Vec<Pid>,
    /// Failed download PIDs.
    pub downloads: Vec<Pid>,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileReport {
    /// Per-entry outcomes, in input order.
    Entries {
        /// Entry outcomes.
        entries: Vec<EntryOutcome>,
    },
    /// Failed PID listing.
    Failed {
        /// Listing.
        listing: FailedPidListing,
    },
}

// ============================================================================
// SECTION: Reconciler
// ============================================================================

/// Sequential reconciliation worker.
pub struct Reconciler<S, R, X, A> {
    /// Local store.
    store: S,
    /// Registrar probe.
    probe: R,
    /// Repair executor.
    executor: X,
    /// Audit sink.
    audit: A,
    /// Fixed settings.
    settings: ReconcilerSettings,
}

impl<S, R, X, A> Reconciler<S, R, X, A>
where
    S: LocalStore,
    R: RegistrarProbe,
    X: RepairExecutor,
    A: AuditSink,
{
    /// Creates a reconciler from its collaborators.
    #[must_use]
    pub fn new(store: S, probe: R, executor: X, audit: A, settings: ReconcilerSettings) -> Self {
        Self {
            store,
            probe,
            executor,
            audit,
            settings,
        }
    }

    /// Returns the local store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the repair executor.
    #[must_use]
    pub const fn executor(&self) -> &X {
        &self.executor
    }

    /// Returns the audit sink.
    #[must_use]
    pub const fn audit(&self) -> &A {
        &self.audit
    }

    /// Runs a reconciliation over `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only when listing failed PIDs fails; per-PID
    /// failures are reported inside the entries.
    pub fn run(
        &self,
        scope: &ReconcileScope,
        options: ReconcileOptions<'_>,
        cancel: &CancelFlag,
    ) -> Result<ReconcileReport, StoreError> {
        match scope {
            ReconcileScope::Single(pid) => Ok(ReconcileReport::Entries {
                entries: vec![EntryOutcome::Processed(self.reconcile_pid(pid, options))],
            }),
            ReconcileScope::Batch(entries) => Ok(ReconcileReport::Entries {
                entries: self.reconcile_batch(entries, options, cancel),
            }),
            ReconcileScope::ListFailed => Ok(ReconcileReport::Failed {
                listing: self.list_failed()?,
            }),
        }
    }

    /// Processes raw batch entries strictly in order.
    pub fn reconcile_batch<E: AsRef<str>>(
        &self,
        entries: &[E],
        options: ReconcileOptions<'_>,
        cancel: &CancelFlag,
    ) -> Vec<EntryOutcome> {
        let mut seen = BTreeSet::new();
        let mut outcomes = Vec::with_capacity(entries.len());
        for entry in entries {
            let input = entry.as_ref();
            if cancel.is_cancelled() {
                outcomes.push(EntryOutcome::Skipped {
                    input: input.to_string(),
                    reason: SkipReason::Cancelled,
                });
                continue;
            }
            let pid = match Pid::parse(input) {
                Ok(pid) => pid,
                Err(err) => {
                    self.audit.record(
                        &SyncAuditEvent::new(AuditKind::PidRejected, input)
                            .with_message(err.to_string()),
                    );
                    outcomes.push(EntryOutcome::Rejected {
                        input: input.to_string(),
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            if !seen.insert(pid.clone()) {
                outcomes.push(EntryOutcome::Skipped {
                    input: input.to_string(),
                    reason: SkipReason::Duplicate,
                });
                continue;
            }
            outcomes.push(EntryOutcome::Processed(self.reconcile_pid(&pid, options)));
        }
        outcomes
    }

    /// Runs the requested steps for one PID.
    pub fn reconcile_pid(&self, pid: &Pid, options: ReconcileOptions<'_>) -> PidRun {
        let diagnosis =
            if options.skip_diagnostic { DiagnosisOutcome::Skipped } else { self.diagnose(pid) };
        let export = options.export.map(|sink| self.export(pid, sink));
        let repair = options.repair.then(|| self.repair(pid));
        PidRun {
            pid: pid.clone(),
            diagnosis,
            export,
            repair,
        }
    }

    /// Diagnoses one PID.
    pub fn diagnose(&self, pid: &Pid) -> DiagnosisOutcome {
        match DiagnosticBuilder::new(&self.store, &self.probe, &self.audit).diagnose(pid) {
            Ok(Some(report)) => DiagnosisOutcome::Report {
                report: Box::new(report),
            },
            Ok(None) => DiagnosisOutcome::NothingFound,
            Err(err) => {
                self.audit.record(
                    &SyncAuditEvent::for_pid(AuditKind::ClassificationFailed, pid)
                        .with_message(err.to_string()),
                );
                DiagnosisOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Exports the stored metadata document of one PID.
    pub fn export(&self, pid: &Pid, sink: &dyn ExportSink) -> ExportOutcome {
        let document = match self.store.get_local_record(pid) {
            Ok(record) => record.and_then(|record| record.metadata),
            Err(err) => return self.export_failed(pid, err.to_string()),
        };
        let Some(document) = document else {
            return ExportOutcome::NoStoredMetadata;
        };
        match sink.export(pid, &document) {
            Ok(receipt) => {
                self.audit.record(
                    &SyncAuditEvent::for_pid(AuditKind::ExportWritten, pid)
                        .with_message(receipt.location.clone()),
                );
                ExportOutcome::Written {
                    location: receipt.location,
                }
            }
            Err(err) => self.export_failed(pid, err.to_string()),
        }
    }

    /// Repairs one PID through the strategy matching its owner type.
    pub fn repair(&self, pid: &Pid) -> RepairOutcome {
        let (owner_type, outcome) = match Classifier::new(&self.store).classify(pid) {
            Ok(Classification::Owned(owner_type)) => {
                (Some(owner_type), self.strategy_repair(pid, owner_type))
            }
            Ok(Classification::NotFound) => {
                (None, RepairOutcome::noop(RepairReason::PidNotClassified))
            }
            Err(err) => (
                None,
                RepairOutcome::refused(RepairReason::StoreFailure {
                    message: err.to_string(),
                }),
            ),
        };
        self.record_repair(pid, owner_type, &outcome);
        outcome
    }

    /// Lists failed PIDs, datasets first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when either listing fails.
    pub fn list_failed(&self) -> Result<FailedPidListing, StoreError> {
        Ok(FailedPidListing {
            datasets: self.store.list_failed(OwnerType::Dataset)?,
            downloads: self.store.list_failed(OwnerType::Download)?,
        })
    }

    /// Dispatches to the repair strategy for `owner_type`.
    fn strategy_repair(&self, pid: &Pid, owner_type: OwnerType) -> RepairOutcome {
        match owner_type {
            OwnerType::Dataset => {
                DatasetRepairStrategy::new(&self.store, &self.executor, &self.settings.local_prefix)
                    .repair(pid)
            }
            OwnerType::Download => DownloadRepairStrategy::new(
                &self.store,
                &self.executor,
                &self.settings.download_identity,
            )
            .repair(pid),
        }
    }

    /// Records the audit event for a repair outcome.
    fn record_repair(&self, pid: &Pid, owner_type: Option<OwnerType>, outcome: &RepairOutcome) {
        let kind = match (outcome.attempted, outcome.succeeded) {
            (_, true) => AuditKind::RepairReplayed,
            (true, false) => AuditKind::RepairRefused,
            (false, false) => AuditKind::RepairNoop,
        };
        let mut event = SyncAuditEvent::for_pid(kind, pid)
            .with_reason(outcome.reason.code())
            .with_message(outcome.reason.to_string());
        if let Some(owner_type) = owner_type {
            event = event.with_owner(owner_type);
        }
        self.audit.record(&event);
    }

    /// Records an export failure.
    fn export_failed(&self, pid: &Pid, message: String) -> ExportOutcome {
        self.audit.record(
            &SyncAuditEvent::for_pid(AuditKind::ExportFailed, pid).with_message(message.clone()),
        );
        ExportOutcome::Failed {
            message,
        }
    }
}
