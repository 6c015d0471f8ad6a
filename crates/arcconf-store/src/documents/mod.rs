//! YAML configuration documents
//!
//! A document names a device and, optionally, describes its archive
//! extension as a snapshot: field names map to canonical text values and
//! collection names to lists of child mappings. Documents are the desired
//! state fed to reconciliation and the export format of a loaded snapshot.

pub mod format_v1;
pub mod parser;
pub mod render;

pub use format_v1::DocumentV1;
pub use parser::{parse_document_file, parse_document_str};
pub use render::render_document;

use arcconf_core::model::Entity;

/// A parsed document
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveDocument {
    pub device: String,
    /// `None` describes a device without the archive extension
    pub archive: Option<Entity>,
}
