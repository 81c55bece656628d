// crates/pid-sync-cli/src/modes.rs
// ============================================================================
// Module: Operating Modes
// Description: Mutual-exclusivity validation of CLI operating modes.
// Purpose: Reject inconsistent flag combinations before any lookup.
// Dependencies: pid-sync-core, thiserror
// ============================================================================

//! ## Overview
//! `pid-sync` runs in exactly one of three modes: a single PID, a PID list
//! file, or the failed-PID listing. [`ModeFlags::resolve`] checks the flags
//! in a fixed order and reports the first violation:
//! 1. `--list-failed` combined with any of `--pid`, `--pid-list`,
//!    `--export`, `--fix`.
//! 2. `--pid` together with `--pid-list`.
//! 3. `--export` together with `--pid-list`.
//! 4. `--pid` that does not parse, or a `--pid-list` file that is missing.
//!
//! Blank `--pid`/`--pid-list` values count as absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use pid_sync_core::Pid;
use pid_sync_core::PidError;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Mode-relevant CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeFlags {
    /// `--pid` value.
    pub pid: Option<String>,
    /// `--pid-list` value.
    pub pid_list: Option<PathBuf>,
    /// `--list-failed` flag.
    pub list_failed: bool,
    /// `--export` flag.
    pub export: bool,
    /// `--fix` flag.
    pub fix: bool,
}

/// Validated operating mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Process one parsed PID.
    Single(Pid),
    /// Process every entry of a PID list file.
    Batch(PathBuf),
    /// List PIDs in failed local status.
    ListFailed,
}

/// Mode validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModeError {
    /// `--list-failed` was combined with another mode flag.
    #[error("--list-failed must be used alone")]
    ListFailedNotAlone,
    /// Both `--pid` and `--pid-list` were given.
    #[error("--pid and --pid-list can not be used at the same time")]
    PidAndList,
    /// `--export` was combined with `--pid-list`.
    #[error("--export can not be used with --pid-list")]
    ExportWithList,
    /// No mode was selected.
    #[error("one of --pid, --pid-list or --list-failed is required")]
    NoMode,
    /// `--pid` did not parse.
    #[error("{input} is not a valid PID: {source}")]
    InvalidPid {
        /// Raw input.
        input: String,
        /// Parse failure.
        source: PidError,
    },
    /// `--pid-list` file does not exist.
    #[error("PID list can not be found: {0}")]
    ListNotFound(String),
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

impl ModeFlags {
    /// Validates the flag combination and resolves the operating mode.
    ///
    /// # Errors
    ///
    /// Returns [`ModeError`] for the first violated rule.
    pub fn resolve(&self) -> Result<RunMode, ModeError> {
        let pid = self.pid.as_deref().map(str::trim).filter(|value| !value.is_empty());
        let pid_list = self.pid_list.as_deref().filter(|path| !is_blank(path));

        if self.list_failed && (pid.is_some() || pid_list.is_some() || self.export || self.fix) {
            return Err(ModeError::ListFailedNotAlone);
        }
        if pid.is_some() && pid_list.is_some() {
            return Err(ModeError::PidAndList);
        }
        if self.export && pid_list.is_some() {
            return Err(ModeError::ExportWithList);
        }

        if let Some(raw) = pid {
            return Pid::parse(raw).map(RunMode::Single).map_err(|source| ModeError::InvalidPid {
                input: raw.to_string(),
                source,
            });
        }
        if let Some(path) = pid_list {
            if !path.exists() {
                return Err(ModeError::ListNotFound(path.display().to_string()));
            }
            return Ok(RunMode::Batch(path.to_path_buf()));
        }
        if self.list_failed {
            return Ok(RunMode::ListFailed);
        }
        Err(ModeError::NoMode)
    }
}

/// Returns true when a path argument is empty or whitespace.
fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}
