// crates/pid-sync-core/src/runtime/dataset_repair.rs
// ============================================================================
// Module: Dataset Repair Strategy
// Description: Safety gates for replaying a dataset's registrar sync.
// Purpose: Replay only when the local store can justify the registrar write.
// Dependencies: crate::{core, interfaces, runtime::repair}
// ============================================================================

//! ## Overview
//! Gates, in order:
//! 1. Exactly one dataset is linked to the PID. None is a no-op; several is
//!    a local integrity fault and is refused, never guessed at.
//! 2. If the dataset still holds the PID, replay without a prior PID.
//! 3. Otherwise the dataset rotated. Rotation onto a self-minted PID is
//!    refused. Rotation onto an externally assigned PID is replayed with the
//!    old PID as prior identifier only when the old PID is already among the
//!    alternate identifiers and the new one is not: the local side finished
//!    its bookkeeping and only the registrar is behind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Dataset;
use crate::core::OwnerType;
use crate::core::Pid;
use crate::core::PidPrefix;
use crate::core::RepairOutcome;
use crate::core::RepairReason;
use crate::interfaces::LocalStore;
use crate::interfaces::RepairExecutor;
use crate::runtime::repair::RepairStrategy;

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Decision reached for a single linked dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetRepairPlan {
    /// Replay without a prior PID.
    ReplayCurrent,
    /// Replay with `prior_pid` as the previous identifier.
    ReplayRotation {
        /// Diagnosed (old) PID.
        prior_pid: Pid,
        /// Dataset's current PID.
        current_pid: Pid,
    },
    /// Refuse with the given reason.
    Refuse(RepairReason),
}

/// Decides how to repair `pid` for the single dataset linked to it.
#[must_use]
pub fn plan_dataset_repair(
    pid: &Pid,
    dataset: &Dataset,
    local_prefix: &PidPrefix,
) -> DatasetRepairPlan {
    let Some(current_pid) = dataset.current_pid.as_ref() else {
        return DatasetRepairPlan::Refuse(RepairReason::DatasetMissingCurrentPid);
    };
    if current_pid == pid {
        return DatasetRepairPlan::ReplayCurrent;
    }
    if current_pid.is_minted_under(local_prefix) {
        return DatasetRepairPlan::Refuse(RepairReason::RotationToSelfMinted {
            current_pid: current_pid.clone(),
        });
    }
    let prior_in_alternates = dataset.has_alternate_pid(pid);
    let current_in_alternates = dataset.has_alternate_pid(current_pid);
    if prior_in_alternates && !current_in_alternates {
        DatasetRepairPlan::ReplayRotation {
            prior_pid: pid.clone(),
            current_pid: current_pid.clone(),
        }
    } else {
        DatasetRepairPlan::Refuse(RepairReason::RotationInvariantUnsatisfied {
            prior_in_alternates,
            current_in_alternates,
        })
    }
}

// ============================================================================
// SECTION: Strategy
// ============================================================================

/// Repair strategy for dataset-owned PIDs.
pub struct DatasetRepairStrategy<'a, S, X> {
    /// Local store.
    store: &'a S,
    /// Executor performing the replay.
    executor: &'a X,
    /// Namespace prefix of locally minted PIDs.
    local_prefix: &'a PidPrefix,
}

impl<'a, S, X> DatasetRepairStrategy<'a, S, X>
where
    S: LocalStore,
    X: RepairExecutor,
{
    /// Creates a dataset repair strategy.
    #[must_use]
    pub const fn new(store: &'a S, executor: &'a X, local_prefix: &'a PidPrefix) -> Self {
        Self {
            store,
            executor,
            local_prefix,
        }
    }
}

impl<S, X> RepairStrategy for DatasetRepairStrategy<'_, S, X>
where
    S: LocalStore,
    X: RepairExecutor,
{
    fn owner_type(&self) -> OwnerType {
        OwnerType::Dataset
    }

    fn repair(&self, pid: &Pid) -> RepairOutcome {
        let linked = match self.store.find_datasets_by_pid(pid) {
            Ok(linked) => linked,
            Err(err) => {
                return RepairOutcome::refused(RepairReason::StoreFailure {
                    message: err.to_string(),
                });
            }
        };
        let dataset = match linked.as_slice() {
            [] => return RepairOutcome::noop(RepairReason::NoLinkedDataset),
            [dataset] => dataset,
            _ => {
                return RepairOutcome::refused(RepairReason::AmbiguousDatasets {
                    count: linked.len(),
                });
            }
        };

        let (prior_pid, reason) = match plan_dataset_repair(pid, dataset, self.local_prefix) {
            DatasetRepairPlan::ReplayCurrent => (None, RepairReason::ReplayedCurrentPid),
            DatasetRepairPlan::ReplayRotation {
                prior_pid,
                current_pid,
            } => (
                Some(prior_pid.clone()),
                RepairReason::ReplayedRotation {
                    prior_pid,
                    current_pid,
                },
            ),
            DatasetRepairPlan::Refuse(reason) => return RepairOutcome::refused(reason),
        };
        match self.executor.dataset_changed(dataset, prior_pid.as_ref()) {
            Ok(()) => RepairOutcome::replayed(reason),
            Err(err) => RepairOutcome::refused(RepairReason::ExecutorFailure {
                message: err.to_string(),
            }),
        }
    }
}
