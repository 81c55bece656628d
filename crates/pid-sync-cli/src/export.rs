// crates/pid-sync-cli/src/export.rs
// ============================================================================
// Module: File Export Sink
// Description: Writes stored metadata documents to a directory.
// Purpose: Back `--export` with `<pid stem>_export.xml` files.
// Dependencies: pid-sync-core
// ============================================================================

//! ## Overview
//! The file name is the PID with `/` replaced by `_`, so a PID can never
//! escape the export directory. The directory is created on first write.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;

use pid_sync_core::ExportError;
use pid_sync_core::ExportReceipt;
use pid_sync_core::ExportSink;
use pid_sync_core::Pid;

// ============================================================================
// SECTION: Sink
// ============================================================================

/// Export sink writing one XML file per PID.
pub struct FileExportSink {
    /// Directory receiving exported documents.
    directory: PathBuf,
}

impl FileExportSink {
    /// Creates a sink writing into `directory`.
    #[must_use]
    pub const fn new(directory: PathBuf) -> Self {
        Self {
            directory,
        }
    }

    /// Returns the path a document for `pid` is written to.
    #[must_use]
    pub fn target_path(&self, pid: &Pid) -> PathBuf {
        self.directory.join(format!("{}_export.xml", pid.file_stem()))
    }
}

impl ExportSink for FileExportSink {
    fn export(&self, pid: &Pid, document: &str) -> Result<ExportReceipt, ExportError> {
        fs::create_dir_all(&self.directory).map_err(|err| {
            ExportError::Write(format!(
                "unable to create export directory {}: {err}",
                self.directory.display()
            ))
        })?;
        let path = self.target_path(pid);
        fs::write(&path, document.as_bytes()).map_err(|err| {
            ExportError::Write(format!("unable to write {}: {err}", path.display()))
        })?;
        let location = fs::canonicalize(&path).unwrap_or(path);
        Ok(ExportReceipt {
            location: location.display().to_string(),
        })
    }
}
