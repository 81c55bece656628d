// crates/pid-sync-core/src/runtime/repair.rs
// ============================================================================
// Module: Repair Strategy Capability
// Description: Shared capability implemented by per-owner repair strategies.
// Purpose: Let the orchestrator pick a strategy by owner-type tag.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Each owner type has exactly one repair strategy. Strategies never retry;
//! a caller wanting a retry re-runs diagnosis and repair from scratch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::OwnerType;
use crate::core::Pid;
use crate::core::RepairOutcome;

// ============================================================================
// SECTION: Repair Strategy
// ============================================================================

/// Safety-gated replay of an owner's state synchronization.
pub trait RepairStrategy {
    /// Owner type this strategy handles.
    fn owner_type(&self) -> OwnerType;

    /// Evaluates the safety gates for `pid` and replays when all pass.
    fn repair(&self, pid: &Pid) -> RepairOutcome;
}
