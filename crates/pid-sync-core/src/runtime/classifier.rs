// crates/pid-sync-core/src/runtime/classifier.rs
// ============================================================================
// Module: PID Classifier
// Description: Resolves which resource type owns a PID.
// Purpose: Separate "unknown locally" from parse and store failures.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Classification looks up the local owner-type index. An unknown PID is a
//! legitimate [`Classification::NotFound`] outcome (registrar-only or never
//! registered identifiers), never an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::OwnerType;
use crate::core::Pid;
use crate::interfaces::LocalStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Result of classifying a PID against the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// PID is owned by a resource of this type.
    Owned(OwnerType),
    /// PID is unknown locally.
    NotFound,
}

/// Classifies PIDs by owning resource type.
pub struct Classifier<'a, S> {
    /// Local store holding the owner-type index.
    store: &'a S,
}

impl<'a, S: LocalStore> Classifier<'a, S> {
    /// Creates a classifier over `store`.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
        }
    }

    /// Classifies `pid`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the owner-type lookup fails.
    pub fn classify(&self, pid: &Pid) -> Result<Classification, StoreError> {
        Ok(self
            .store
            .find_owner_type(pid)?
            .map_or(Classification::NotFound, Classification::Owned))
    }
}
