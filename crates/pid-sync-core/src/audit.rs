// crates/pid-sync-core/src/audit.rs
// ============================================================================
// Module: Reconciliation Audit Logging
// Description: Structured audit events for diagnosis and repair.
// Purpose: Emit JSON-lines records without a global logger.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Non-fatal failures (registrar probe errors, refused repairs, export
//! failures) are recorded as structured events rather than propagated. The
//! sink is injected like every other collaborator so deployments can route
//! events to their preferred pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::OwnerType;
use crate::core::Pid;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    /// Raw PID input failed to parse.
    PidRejected,
    /// Local store failed while classifying or diagnosing.
    ClassificationFailed,
    /// A registrar probe call failed; the report is degraded.
    ProbeFailed,
    /// Repair found nothing to do.
    RepairNoop,
    /// Repair refused by a safety gate or failed.
    RepairRefused,
    /// Repair replayed a state change.
    RepairReplayed,
    /// Stored metadata exported.
    ExportWritten,
    /// Metadata export failed.
    ExportFailed,
}

/// Audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event kind.
    pub kind: AuditKind,
    /// PID concerned, in canonical or raw form.
    pub pid: String,
    /// Owner type when known.
    pub owner_type: Option<OwnerType>,
    /// Stable reason code when applicable.
    pub reason: Option<&'static str>,
    /// Human-readable detail.
    pub message: Option<String>,
}

impl SyncAuditEvent {
    /// Creates an event for `pid` stamped with the current time.
    #[must_use]
    pub fn new(kind: AuditKind, pid: impl Into<String>) -> Self {
        Self {
            event: "pid_sync",
            timestamp_ms: now_millis(),
            kind,
            pid: pid.into(),
            owner_type: None,
            reason: None,
            message: None,
        }
    }

    /// Creates an event for a parsed PID.
    #[must_use]
    pub fn for_pid(kind: AuditKind, pid: &Pid) -> Self {
        Self::new(kind, pid.as_str())
    }

    /// Sets the owner type.
    #[must_use]
    pub const fn with_owner(mut self, owner_type: OwnerType) -> Self {
        self.owner_type = Some(owner_type);
        self
    }

    /// Sets the reason code.
    #[must_use]
    pub const fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for reconciliation events.
pub trait AuditSink {
    /// Record an audit event.
    fn record(&self, event: &SyncAuditEvent);
}

impl<T: AuditSink + ?Sized> AuditSink for &T {
    fn record(&self, event: &SyncAuditEvent) {
        (**self).record(event);
    }
}

impl<T: AuditSink + ?Sized> AuditSink for Box<T> {
    fn record(&self, event: &SyncAuditEvent) {
        (**self).record(event);
    }
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &SyncAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &SyncAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &SyncAuditEvent) {}
}

/// Audit sink that keeps events in memory, for tests and embedding callers.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<SyncAuditEvent>>,
}

impl RecordingAuditSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<SyncAuditEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns the kinds of the recorded events.
    #[must_use]
    pub fn kinds(&self) -> Vec<AuditKind> {
        self.events().iter().map(|event| event.kind).collect()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &SyncAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current unix epoch in milliseconds.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|now| now.as_millis()).unwrap_or_default()
}
