// crates/pid-sync-core/tests/pid.rs
// ============================================================================
// Module: PID Parsing Tests
// Description: Canonical form, presentation prefixes, and rejection rules.
// Purpose: Ensure every entry point sees the same validated identifier.
// Dependencies: pid-sync-core, proptest
// ============================================================================
//! ## Overview
//! Validates registrar-form parsing, case preservation, and the length limit.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use pid_sync_core::MAX_PID_LENGTH;
use pid_sync_core::Pid;
use pid_sync_core::PidError;
use pid_sync_core::PidPrefix;
use proptest::prelude::*;

#[test]
fn parses_canonical_form() {
    let pid = Pid::parse("10.5072/abc123").unwrap();
    assert_eq!(pid.as_str(), "10.5072/abc123");
    assert_eq!(pid.prefix(), "10.5072");
    assert_eq!(pid.suffix(), "abc123");
}

#[test]
fn strips_presentation_prefixes_case_insensitively() {
    for raw in [
        "doi:10.5072/abc123",
        "DOI:10.5072/abc123",
        "https://doi.org/10.5072/abc123",
        "HTTPS://DOI.ORG/10.5072/abc123",
        "http://dx.doi.org/10.5072/abc123",
        "  10.5072/abc123\t",
    ] {
        assert_eq!(Pid::parse(raw).unwrap().as_str(), "10.5072/abc123", "input {raw:?}");
    }
}

#[test]
fn never_case_folds_the_identifier() {
    let upper = Pid::parse("10.5072/ABC").unwrap();
    let lower = Pid::parse("10.5072/abc").unwrap();
    assert_ne!(upper, lower);
    assert_eq!(upper.as_str(), "10.5072/ABC");
}

#[test]
fn suffix_may_contain_slashes() {
    let pid = Pid::parse("10.1000.10/dl/0001").unwrap();
    assert_eq!(pid.prefix(), "10.1000.10");
    assert_eq!(pid.suffix(), "dl/0001");
    assert_eq!(pid.file_stem(), "10.1000.10_dl_0001");
}

#[test]
fn rejects_malformed_inputs() {
    assert_eq!(Pid::parse("   "), Err(PidError::Empty));
    assert!(matches!(Pid::parse("10.5072abc"), Err(PidError::MissingSeparator(_))));
    assert!(matches!(Pid::parse("11.5072/abc"), Err(PidError::InvalidPrefix(_))));
    assert!(matches!(Pid::parse("10./abc"), Err(PidError::InvalidPrefix(_))));
    assert!(matches!(Pid::parse("10.50a2/abc"), Err(PidError::InvalidPrefix(_))));
    assert!(matches!(Pid::parse("10.5072/"), Err(PidError::InvalidSuffix(_))));
    assert!(matches!(Pid::parse("10.5072/a b"), Err(PidError::InvalidSuffix(_))));
}

#[test]
fn rejects_inputs_over_length_limit() {
    let raw = format!("10.5072/{}", "x".repeat(MAX_PID_LENGTH));
    assert!(matches!(Pid::parse(&raw), Err(PidError::TooLong { .. })));
}

#[test]
fn minted_under_compares_prefix_exactly() {
    let prefix = PidPrefix::parse("10.5072").unwrap();
    assert!(Pid::parse("10.5072/x").unwrap().is_minted_under(&prefix));
    assert!(!Pid::parse("10.50721/x").unwrap().is_minted_under(&prefix));
    assert!(!Pid::parse("10.9999/x").unwrap().is_minted_under(&prefix));
}

#[test]
fn serde_round_trip_rejects_invalid_values() {
    let pid: Pid = serde_json::from_str("\"10.5072/abc\"").unwrap();
    assert_eq!(serde_json::to_string(&pid).unwrap(), "\"10.5072/abc\"");
    assert!(serde_json::from_str::<Pid>("\"not-a-pid\"").is_err());
}

proptest! {
    #[test]
    fn canonical_form_reparses_to_itself(
        registrant in "[0-9]{4,5}",
        suffix in "[A-Za-z0-9._;()/:-]{1,40}",
    ) {
        let raw = format!("10.{registrant}/{suffix}");
        let pid = Pid::parse(&raw).unwrap();
        prop_assert_eq!(pid.as_str(), raw.as_str());
        prop_assert_eq!(Pid::parse(pid.as_str()).unwrap(), pid.clone());
        prop_assert_eq!(Pid::parse(&format!("doi:{raw}")).unwrap(), pid);
    }

    #[test]
    fn arbitrary_input_never_panics(raw in ".{0,64}") {
        let _ = Pid::parse(&raw);
    }
}
