//! Error handling for arcconf-store
//!
//! Wraps arcconf-core ExError with store-specific helpers

use arcconf_core::errors::{ConfError, ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a document validation error
pub fn document_error(source_name: &str, reason: impl Into<String>) -> ConfError {
    ConfError::InvalidDocument {
        source_name: source_name.to_string(),
        reason: reason.into(),
    }
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Store-level failure as seen through the `DirectoryStore` seam
pub fn store_failure(op: &str, err: impl std::fmt::Display) -> ConfError {
    ConfError::Store {
        op: op.to_string(),
        message: err.to_string(),
    }
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
