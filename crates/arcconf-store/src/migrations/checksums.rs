//! Migration checksums
//!
//! The SHA-256 of each migration's SQL is recorded when it is applied and
//! compared on every later start.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of a migration's SQL text
pub fn compute_checksum(sql: &str) -> String {
    hex::encode(Sha256::digest(sql.as_bytes()))
}
