// crates/pid-sync-cli/src/tests/modes.rs
// ============================================================================
// Module: Mode Validation Tests
// Description: Unit tests for operating-mode exclusivity.
// Purpose: Ensure flag conflicts are rejected before any lookup.
// Dependencies: pid-sync-cli modes module, proptest, tempfile
// ============================================================================

use std::path::PathBuf;

use proptest::prelude::*;
use tempfile::NamedTempFile;

use crate::modes::ModeError;
use crate::modes::ModeFlags;
use crate::modes::RunMode;

fn single(pid: &str) -> ModeFlags {
    ModeFlags {
        pid: Some(pid.to_string()),
        ..ModeFlags::default()
    }
}

#[test]
fn single_pid_resolves_to_parsed_pid() {
    let RunMode::Single(pid) = single(" doi:10.5072/abc123 ").resolve().unwrap() else {
        panic!("expected single mode");
    };
    assert_eq!(pid.as_str(), "10.5072/abc123");
}

#[test]
fn invalid_pid_is_an_input_error() {
    let err = single("not-a-pid").resolve().unwrap_err();
    assert!(matches!(err, ModeError::InvalidPid { .. }));
    assert!(err.to_string().starts_with("not-a-pid is not a valid PID"));
}

#[test]
fn pid_and_list_are_exclusive() {
    let flags = ModeFlags {
        pid_list: Some(PathBuf::from("pids.txt")),
        ..single("10.5072/abc")
    };
    assert_eq!(flags.resolve(), Err(ModeError::PidAndList));
}

#[test]
fn export_cannot_be_combined_with_list() {
    let flags = ModeFlags {
        pid_list: Some(PathBuf::from("pids.txt")),
        export: true,
        ..ModeFlags::default()
    };
    assert_eq!(flags.resolve(), Err(ModeError::ExportWithList));
}

#[test]
fn missing_list_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let flags = ModeFlags {
        pid_list: Some(dir.path().join("absent.txt")),
        ..ModeFlags::default()
    };
    assert!(matches!(flags.resolve(), Err(ModeError::ListNotFound(_))));
}

#[test]
fn existing_list_file_resolves_to_batch() {
    let file = NamedTempFile::new().unwrap();
    let flags = ModeFlags {
        pid_list: Some(file.path().to_path_buf()),
        fix: true,
        ..ModeFlags::default()
    };
    assert_eq!(flags.resolve(), Ok(RunMode::Batch(file.path().to_path_buf())));
}

#[test]
fn list_failed_alone_resolves() {
    let flags = ModeFlags {
        list_failed: true,
        ..ModeFlags::default()
    };
    assert_eq!(flags.resolve(), Ok(RunMode::ListFailed));
}

#[test]
fn no_mode_is_rejected() {
    assert_eq!(ModeFlags::default().resolve(), Err(ModeError::NoMode));
    assert_eq!(single("   ").resolve(), Err(ModeError::NoMode));
}

proptest! {
    #[test]
    fn list_failed_rejects_any_companion_flag(
        pid in any::<bool>(),
        list in any::<bool>(),
        export in any::<bool>(),
        fix in any::<bool>(),
    ) {
        prop_assume!(pid || list || export || fix);
        let flags = ModeFlags {
            pid: pid.then(|| "10.5072/abc".to_string()),
            pid_list: list.then(|| PathBuf::from("pids.txt")),
            list_failed: true,
            export,
            fix,
        };
        prop_assert_eq!(flags.resolve(), Err(ModeError::ListFailedNotAlone));
    }
}
