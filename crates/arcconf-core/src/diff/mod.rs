//! Entity diff engine.
//!
//! Compares two entities of the same type field by field, in schema order,
//! and produces the attribute mutations that turn the stored form of the
//! first into the stored form of the second.
//!
//! ## Entry point
//!
//! ```ignore
//! use arcconf_core::diff::diff;
//!
//! let mutations = diff(&stored, &desired)?;
//! ```
//!
//! ## Guarantees
//!
//! - **Semantic comparison**: values are compared decoded, so `PT60S` versus
//!   `PT1M` or a reordered set never yields a mutation.
//! - **Default elision**: moving a field to its default removes the stored
//!   attribute instead of writing the default.
//! - **Own fields only**: child collections are handled by the reconciler.

pub mod engine;
pub mod model;

pub use engine::diff;
pub use model::Mutation;
