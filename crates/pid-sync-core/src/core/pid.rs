// crates/pid-sync-core/src/core/pid.rs
// ============================================================================
// Module: PID Values
// Description: Canonical persistent identifier values and prefix parsing.
// Purpose: Validate registrar-form identifiers once at every entry point.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Pid`] is an immutable, validated identifier in canonical registrar form
//! (`prefix/suffix`). Parsing strips the common presentation forms (`doi:`,
//! resolver URLs) but never case-folds the identifier: prefixes and suffixes
//! are case-sensitive and equality is exact string equality.
//!
//! ## Invariants
//! - A constructed [`Pid`] always has a valid prefix and a non-empty suffix.
//! - The stored value is the canonical form; presentation prefixes are gone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted length of a raw PID string, in bytes.
pub const MAX_PID_LENGTH: usize = 1024;

/// Presentation forms stripped before validation (matched case-insensitively).
const PRESENTATION_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi:",
];

/// Directory indicator every registrar prefix starts with.
const DIRECTORY_INDICATOR: &str = "10.";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when a raw string is not a valid registrar-form PID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PidError {
    /// Input was empty after trimming.
    #[error("pid is empty")]
    Empty,
    /// Input exceeded [`MAX_PID_LENGTH`].
    #[error("pid exceeds length limit: {actual} bytes (max {max})")]
    TooLong {
        /// Maximum allowed bytes.
        max: usize,
        /// Actual input size in bytes.
        actual: usize,
    },
    /// Input had no `/` between prefix and suffix.
    #[error("pid is missing the prefix/suffix separator: {0}")]
    MissingSeparator(String),
    /// Prefix is not `10.` followed by dot-separated digit groups.
    #[error("invalid pid prefix: {0}")]
    InvalidPrefix(String),
    /// Suffix is empty or contains whitespace/control characters.
    #[error("invalid pid suffix: {0}")]
    InvalidSuffix(String),
}

// ============================================================================
// SECTION: PID Prefix
// ============================================================================

/// Namespace prefix of a PID (for example `10.5072`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PidPrefix(String);

impl PidPrefix {
    /// Parses and validates a bare namespace prefix.
    ///
    /// # Errors
    ///
    /// Returns [`PidError::InvalidPrefix`] when the prefix is malformed.
    pub fn parse(raw: &str) -> Result<Self, PidError> {
        let trimmed = raw.trim();
        validate_prefix(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the prefix as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PidPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for PidPrefix {
    type Error = PidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PidPrefix> for String {
    fn from(value: PidPrefix) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: PID
// ============================================================================

/// Validated persistent identifier in canonical `prefix/suffix` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pid {
    /// Canonical identifier string.
    value: String,
    /// Byte offset of the `/` separating prefix and suffix.
    split: usize,
}

impl Pid {
    /// Parses a raw identifier, accepting the common presentation forms.
    ///
    /// # Errors
    ///
    /// Returns [`PidError`] when the input is not a registrar-form identifier.
    pub fn parse(raw: &str) -> Result<Self, PidError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PidError::Empty);
        }
        if trimmed.len() > MAX_PID_LENGTH {
            return Err(PidError::TooLong {
                max: MAX_PID_LENGTH,
                actual: trimmed.len(),
            });
        }
        let body = strip_presentation_prefix(trimmed);
        let Some((prefix, suffix)) = body.split_once('/') else {
            return Err(PidError::MissingSeparator(body.to_string()));
        };
        validate_prefix(prefix)?;
        validate_suffix(suffix)?;
        Ok(Self {
            value: body.to_string(),
            split: prefix.len(),
        })
    }

    /// Returns the canonical identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the namespace prefix portion.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.value[.. self.split]
    }

    /// Returns the suffix portion.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.value[self.split + 1 ..]
    }

    /// Returns true when this PID was minted under `prefix`.
    #[must_use]
    pub fn is_minted_under(&self, prefix: &PidPrefix) -> bool {
        self.prefix() == prefix.as_str()
    }

    /// Returns a filesystem-safe stem (`/` replaced by `_`).
    #[must_use]
    pub fn file_stem(&self) -> String {
        self.value.replace('/', "_")
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl FromStr for Pid {
    type Err = PidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Pid {
    type Error = PidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Pid> for String {
    fn from(value: Pid) -> Self {
        value.value
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Strips a single presentation prefix, if present.
fn strip_presentation_prefix(value: &str) -> &str {
    for prefix in PRESENTATION_PREFIXES {
        if let Some(head) = value.get(.. prefix.len())
            && head.eq_ignore_ascii_case(prefix)
        {
            return &value[prefix.len() ..];
        }
    }
    value
}

/// Validates `10.` followed by one or more dot-separated digit groups.
fn validate_prefix(prefix: &str) -> Result<(), PidError> {
    let Some(rest) = prefix.strip_prefix(DIRECTORY_INDICATOR) else {
        return Err(PidError::InvalidPrefix(prefix.to_string()));
    };
    let valid = !rest.is_empty()
        && rest
            .split('.')
            .all(|group| !group.is_empty() && group.bytes().all(|byte| byte.is_ascii_digit()));
    if valid { Ok(()) } else { Err(PidError::InvalidPrefix(prefix.to_string())) }
}

/// Validates the suffix is non-empty and printable.
fn validate_suffix(suffix: &str) -> Result<(), PidError> {
    if suffix.is_empty() || suffix.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
        return Err(PidError::InvalidSuffix(suffix.to_string()));
    }
    Ok(())
}
