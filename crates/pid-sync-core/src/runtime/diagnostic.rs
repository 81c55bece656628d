// crates/pid-sync-core/src/runtime/diagnostic.rs
// ============================================================================
// Module: Diagnostic Builder
// Description: Compares local and registrar state for a single PID.
// Purpose: Produce a complete, possibly degraded, diagnostic report.
// Dependencies: crate::{audit, core, interfaces, runtime::classifier}
// ============================================================================

//! ## Overview
//! Diagnosis classifies the PID, reads the owner-specific local state and
//! the local PID record, then probes the registrar. Local store failures are
//! terminal for the PID and are returned as errors. Registrar failures are
//! not: the affected fields stay absent, the failing step is listed in the
//! report, and an audit event is recorded.
//!
//! ## Invariants
//! - Unknown PIDs yield `Ok(None)`; nothing else is read.
//! - `metadata_matches` is `None` whenever the registrar does not know the
//!   PID or its document could not be fetched.
//! - Metadata comparison is exact string equality of the serialized form.
//! - Diagnosis never mutates the local store or the registrar.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::audit::AuditKind;
use crate::audit::AuditSink;
use crate::audit::SyncAuditEvent;
use crate::core::DatasetSnapshot;
use crate::core::DiagnosticReport;
use crate::core::DownloadSnapshot;
use crate::core::LocalPidRecord;
use crate::core::OwnerSnapshot;
use crate::core::OwnerType;
use crate::core::Pid;
use crate::core::ProbeStep;
use crate::core::RegistrarFindings;
use crate::interfaces::LocalStore;
use crate::interfaces::RegistrarError;
use crate::interfaces::RegistrarProbe;
use crate::interfaces::StoreError;
use crate::runtime::classifier::Classification;
use crate::runtime::classifier::Classifier;

// ============================================================================
// SECTION: Diagnostic Builder
// ============================================================================

/// Builds diagnostic reports from the local store and the registrar.
pub struct DiagnosticBuilder<'a, S, R, A> {
    /// Local store.
    store: &'a S,
    /// Registrar probe.
    probe: &'a R,
    /// Audit sink for degraded probes.
    audit: &'a A,
}

impl<'a, S, R, A> DiagnosticBuilder<'a, S, R, A>
where
    S: LocalStore,
    R: RegistrarProbe,
    A: AuditSink,
{
    /// Creates a diagnostic builder.
    #[must_use]
    pub const fn new(store: &'a S, probe: &'a R, audit: &'a A) -> Self {
        Self {
            store,
            probe,
            audit,
        }
    }

    /// Diagnoses `pid`, returning `None` when the PID is unknown locally.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the local store fails; registrar failures
    /// degrade the report instead.
    pub fn diagnose(&self, pid: &Pid) -> Result<Option<DiagnosticReport>, StoreError> {
        let owner_type = match Classifier::new(self.store).classify(pid)? {
            Classification::NotFound => return Ok(None),
            Classification::Owned(owner_type) => owner_type,
        };
        let owner = self.owner_snapshot(pid, owner_type)?;
        let local = self.store.get_local_record(pid)?;
        let findings = self.probe_registrar(pid, owner_type, local.as_ref());
        Ok(Some(DiagnosticReport::assemble(pid.clone(), owner, local, findings)))
    }

    /// Reads the owner-specific local state.
    fn owner_snapshot(
        &self,
        pid: &Pid,
        owner_type: OwnerType,
    ) -> Result<OwnerSnapshot, StoreError> {
        match owner_type {
            OwnerType::Dataset => {
                let linked = self.store.find_datasets_by_pid(pid)?;
                Ok(OwnerSnapshot::Dataset(DatasetSnapshot::new(pid, linked)))
            }
            OwnerType::Download => Ok(OwnerSnapshot::Download(DownloadSnapshot {
                download: self.store.find_download_by_pid(pid)?,
            })),
        }
    }

    /// Probes the registrar, degrading on each failed call.
    fn probe_registrar(
        &self,
        pid: &Pid,
        owner_type: OwnerType,
        local: Option<&LocalPidRecord>,
    ) -> RegistrarFindings {
        let mut findings = RegistrarFindings::default();
        match self.probe.exists(pid) {
            Ok(true) => findings.record.exists = true,
            Ok(false) => return findings,
            Err(err) => {
                self.probe_failed(pid, owner_type, ProbeStep::Exists, &err);
                findings.degraded.push(ProbeStep::Exists);
                return findings;
            }
        }

        match self.probe.fetch_metadata(pid) {
            Ok(document) => {
                let local_document = local.and_then(|record| record.metadata.as_deref());
                findings.metadata_matches = Some(local_document == document.as_deref());
                findings.record.metadata = document;
            }
            Err(err) => {
                self.probe_failed(pid, owner_type, ProbeStep::FetchMetadata, &err);
                findings.degraded.push(ProbeStep::FetchMetadata);
            }
        }

        match self.probe.resolve_status(pid) {
            Ok(resolution) => {
                findings.record.status = Some(resolution.status);
                findings.record.target = resolution.target;
            }
            Err(err) => {
                self.probe_failed(pid, owner_type, ProbeStep::Resolve, &err);
                findings.degraded.push(ProbeStep::Resolve);
            }
        }
        findings
    }

    /// Records a degraded probe step.
    fn probe_failed(&self, pid: &Pid, owner_type: OwnerType, step: ProbeStep, err: &RegistrarError) {
        self.audit.record(
            &SyncAuditEvent::for_pid(AuditKind::ProbeFailed, pid)
                .with_owner(owner_type)
                .with_reason(step.as_str())
                .with_message(err.to_string()),
        );
    }
}
