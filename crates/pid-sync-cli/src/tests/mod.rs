// crates/pid-sync-cli/src/tests/mod.rs
// ============================================================================
// Module: CLI Unit Tests
// Description: Unit tests for CLI library modules.
// Purpose: Cover catalog, mode validation, list splitting, and rendering.
// Dependencies: pid-sync-cli modules, proptest, tempfile
// ============================================================================

//! ## Overview
//! Groups the per-module unit tests of the CLI library.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod modes;
