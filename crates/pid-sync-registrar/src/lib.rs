// crates/pid-sync-registrar/src/lib.rs
// ============================================================================
// Module: Registrar Client Library
// Description: Registrar probe over the registrar's REST JSON API.
// Purpose: Answer existence, metadata, and status queries with strict limits.
// Dependencies: pid-sync-core, reqwest, url
// ============================================================================

//! ## Overview
//! This crate implements [`RegistrarProbe`] with bounded blocking HTTP
//! requests. Every call is a fresh round trip; nothing is cached between
//! calls, so consecutive diagnoses always observe current registrar state.
//!
//! [`RegistrarProbe`]: pid_sync_core::RegistrarProbe

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::RegistrarClient;
pub use client::RegistrarClientConfig;
