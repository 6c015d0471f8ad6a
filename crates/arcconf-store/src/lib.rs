//! arcconf Store - persistence for directory entries and documents
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - `SqliteDirectory`, a transactional `DirectoryStore`
//! - A ledger of applied reconciliation runs
//! - YAML configuration documents (format v1) parsed against a schema

pub mod db;
pub mod documents;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use documents::{parse_document_file, parse_document_str, render_document, ArchiveDocument};
pub use errors::Result;
pub use repo::SqliteDirectory;
