//! arcconf Core - schema-driven configuration reconciliation
//!
//! This crate provides the building blocks for keeping a hierarchical
//! directory store in step with a desired configuration tree:
//! - Declarative schemas of entity types, fields and keyed collections
//! - A typed value codec with default elision and canonical text forms
//! - RFC 4514 style store paths with case-insensitive equality
//! - A semantic entity differ producing attribute mutations
//! - A recursive reconciler producing ordered store operations and a change log
//! - The directory store trait, an in-memory store, plan execution and
//!   snapshot loading

pub mod apply;
pub mod changelog;
pub mod codec;
pub mod diff;
pub mod directory;
pub mod errors;
pub mod load;
pub mod logging_facility;
pub mod model;
pub mod path;
pub mod reconcile;
pub mod schema;
pub mod serializer;
pub mod value;

// Re-export commonly used types
pub use apply::apply_plan;
pub use changelog::{ChangeKind, ChangeLog, ChangeRecord, Verbosity};
pub use diff::Mutation;
pub use directory::{DirectoryStore, MemoryDirectory};
pub use errors::{ConfError, ExError, ExErrorKind, Result};
pub use load::{load_snapshot, LoadOutcome};
pub use model::{AttributeSet, Entity, Key};
pub use path::{Path, Rdn};
pub use reconcile::{reconcile, ReconcilePlan, StoreOp};
pub use schema::Schema;
pub use value::Value;
