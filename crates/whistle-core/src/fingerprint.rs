//! Content fingerprints for submitted reports
//!
//! The fingerprint is a lowercase hex SHA-256 over the raw payload bytes. It
//! is taken once at submission and stored next to the report as
//! `blockchain_hash`; nothing here talks to a ledger.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `payload`
pub fn hash(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}
