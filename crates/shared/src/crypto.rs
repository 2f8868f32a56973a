//! Cryptographic utilities for token hashing and log-safe token prefixes.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extracts the prefix from a link token (first 8 characters after "drl_").
///
/// Used for logging and support lookups; never log the full token.
pub fn extract_token_prefix(token: &str) -> Option<&str> {
    if token.starts_with("drl_") && token.len() >= 12 {
        Some(&token[4..12])
    } else {
        None
    }
}
