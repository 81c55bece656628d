// crates/pid-sync-cli/src/pid_list.rs
// ============================================================================
// Module: PID List Reader
// Description: Bounded reader for one-PID-per-line list files.
// Purpose: Turn a list file into raw batch entries for the reconciler.
// Dependencies: std, thiserror
// ============================================================================

//! ## Overview
//! Lines are trimmed; blank lines and `#` comments are skipped. Entries are
//! returned raw so that unparsable lines are reported per entry by the
//! reconciler instead of failing the whole batch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a PID list file.
pub const MAX_PID_LIST_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// PID list read failures.
#[derive(Debug, Error)]
pub enum PidListError {
    /// File I/O failure.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// File size exceeds the limit.
    #[error("file is {size} bytes (limit {limit})")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
    /// File is not UTF-8.
    #[error("file must be utf-8")]
    NotUtf8,
}

// ============================================================================
// SECTION: Reading
// ============================================================================

/// Reads and splits a PID list file.
///
/// # Errors
///
/// Returns [`PidListError`] when the file cannot be read, exceeds
/// [`MAX_PID_LIST_BYTES`], or is not UTF-8.
pub fn read_pid_list(path: &Path) -> Result<Vec<String>, PidListError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let limit = u64::try_from(MAX_PID_LIST_BYTES).unwrap_or(u64::MAX);
    if size > limit {
        return Err(PidListError::TooLarge {
            size,
            limit: MAX_PID_LIST_BYTES,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() > MAX_PID_LIST_BYTES {
        return Err(PidListError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: MAX_PID_LIST_BYTES,
        });
    }
    let content = String::from_utf8(bytes).map_err(|_| PidListError::NotUtf8)?;
    Ok(split_pid_list(&content))
}

/// Splits list content into trimmed, non-blank, non-comment entries.
///
/// A leading UTF-8 byte order mark is ignored.
#[must_use]
pub fn split_pid_list(content: &str) -> Vec<String> {
    content
        .strip_prefix('\u{feff}')
        .unwrap_or(content)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
