//! SHA-256 checksum utilities
//!
//! Definition contents are compared through a single canonical checksum
//! format (`sha256:<hex>`) so drift reports can show short, stable values.

use sha2::{Digest, Sha256};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Shorten a checksum for display, keeping the prefix and 12 hex digits.
pub fn short_checksum(checksum: &str) -> &str {
    let end = (PREFIX.len() + 12).min(checksum.len());
    &checksum[..end]
}
