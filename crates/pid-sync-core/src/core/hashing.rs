// crates/pid-sync-core/src/core/hashing.rs
// ============================================================================
// Module: Metadata Digests
// Description: Content digests for metadata documents.
// Purpose: Let reports identify documents without embedding them.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! Diagnostic reports carry digests of the local and registrar metadata
//! documents so operators can see which copy changed without dumping both.
//! Digests are informational only; metadata equality is always decided by
//! exact string comparison.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Digest
// ============================================================================

/// Digest algorithms a report may cite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 over the UTF-8 bytes of the document.
    Sha256,
}

impl HashAlgorithm {
    /// Returns the stable label used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

/// Digest of one metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Algorithm that produced `value`.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex digest.
    pub value: String,
}

impl HashDigest {
    /// Digests the exact bytes of `document`.
    #[must_use]
    pub fn of_document(document: &str) -> Self {
        let bytes = Sha256::digest(document.as_bytes());
        let mut value = String::with_capacity(bytes.len() * 2);
        for byte in bytes.iter() {
            let _ = write!(value, "{byte:02x}");
        }
        Self {
            algorithm: HashAlgorithm::Sha256,
            value,
        }
    }
}

impl fmt::Display for HashDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.as_str(), self.value)
    }
}

/// Digests an optional document.
#[must_use]
pub fn document_digest(document: Option<&str>) -> Option<HashDigest> {
    document.map(HashDigest::of_document)
}
