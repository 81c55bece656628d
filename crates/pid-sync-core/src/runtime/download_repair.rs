// crates/pid-sync-core/src/runtime/download_repair.rs
// ============================================================================
// Module: Download Repair Strategy
// Description: Safety gates for replaying a download's registrar sync.
// Purpose: Replay only for downloads whose target can no longer change.
// Dependencies: crate::{core, interfaces, runtime::repair}
// ============================================================================

//! ## Overview
//! Downloads never rotate PIDs, so the replay never carries a prior PID.
//! Only downloads in a terminal, stable-target state are replayed.
//!
//! The registrar write is authorized by a single fixed system identity, not
//! by the download's requesting user. This matches the established repair
//! behavior and is kept deliberately; resolving the requesting user instead
//! would change authorization semantics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::OwnerType;
use crate::core::Pid;
use crate::core::RepairOutcome;
use crate::core::RepairReason;
use crate::interfaces::LocalStore;
use crate::interfaces::RepairExecutor;
use crate::runtime::repair::RepairStrategy;

// ============================================================================
// SECTION: Strategy
// ============================================================================

/// Repair strategy for download-owned PIDs.
pub struct DownloadRepairStrategy<'a, S, X> {
    /// Local store.
    store: &'a S,
    /// Executor performing the replay.
    executor: &'a X,
    /// Name of the fixed identity authorizing the replay.
    identity_name: &'a str,
}

impl<'a, S, X> DownloadRepairStrategy<'a, S, X>
where
    S: LocalStore,
    X: RepairExecutor,
{
    /// Creates a download repair strategy acting as `identity_name`.
    #[must_use]
    pub const fn new(store: &'a S, executor: &'a X, identity_name: &'a str) -> Self {
        Self {
            store,
            executor,
            identity_name,
        }
    }
}

impl<S, X> RepairStrategy for DownloadRepairStrategy<'_, S, X>
where
    S: LocalStore,
    X: RepairExecutor,
{
    fn owner_type(&self) -> OwnerType {
        OwnerType::Download
    }

    fn repair(&self, pid: &Pid) -> RepairOutcome {
        let download = match self.store.find_download_by_pid(pid) {
            Ok(Some(download)) => download,
            Ok(None) => return RepairOutcome::noop(RepairReason::DownloadNotFound),
            Err(err) => {
                return RepairOutcome::refused(RepairReason::StoreFailure {
                    message: err.to_string(),
                });
            }
        };
        if !download.status.has_stable_target() {
            return RepairOutcome::refused(RepairReason::DownloadStatusUnstable {
                status: download.status,
            });
        }
        let identity = match self.store.resolve_identity(self.identity_name) {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                return RepairOutcome::refused(RepairReason::IdentityNotFound {
                    name: self.identity_name.to_string(),
                });
            }
            Err(err) => {
                return RepairOutcome::refused(RepairReason::StoreFailure {
                    message: err.to_string(),
                });
            }
        };
        match self.executor.download_changed(&download, None, &identity) {
            Ok(()) => RepairOutcome::replayed(RepairReason::ReplayedDownload),
            Err(err) => RepairOutcome::refused(RepairReason::ExecutorFailure {
                message: err.to_string(),
            }),
        }
    }
}
