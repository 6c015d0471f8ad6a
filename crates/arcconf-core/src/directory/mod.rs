//! Hierarchical directory store abstraction.
//!
//! The reconciler plans against this trait and [`crate::apply`] executes
//! plans through it. [`MemoryDirectory`] is the in-process implementation;
//! the `arcconf-store` crate provides a persistent one.
//!
//! Search results are always ordered by normalized path.

pub mod memory;

pub use memory::MemoryDirectory;

use crate::diff::Mutation;
use crate::errors::Result;
use crate::model::AttributeSet;
use crate::path::Path;
use crate::schema::OBJECT_CLASS;

/// Extent of a search below its base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The base entry only
    Base,
    /// Direct children of the base, excluding the base
    OneLevel,
    /// The base and all of its descendants
    Subtree,
}

impl Scope {
    /// Whether `candidate` falls within this scope of `base`
    pub fn contains(&self, base: &Path, candidate: &Path) -> bool {
        match self {
            Scope::Base => candidate == base,
            Scope::OneLevel => candidate.is_child_of(base),
            Scope::Subtree => candidate == base || candidate.is_descendant_of(base),
        }
    }
}

/// Entry filter; names and values compare case-insensitively
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Any,
    ObjectClass(String),
    Present(String),
    Equals { attribute: String, value: String },
}

impl Filter {
    pub fn matches(&self, attributes: &AttributeSet) -> bool {
        match self {
            Filter::Any => true,
            Filter::ObjectClass(class) => attributes.has_value(OBJECT_CLASS, class),
            Filter::Present(attribute) => attributes.get(attribute).is_some(),
            Filter::Equals { attribute, value } => attributes.has_value(attribute, value),
        }
    }
}

/// One stored entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: Path,
    pub attributes: AttributeSet,
}

/// Operations a hierarchical store must provide
pub trait DirectoryStore {
    /// Entries within `scope` of `base` matching `filter`, by path
    ///
    /// A missing base yields no entries.
    ///
    /// # Errors
    ///
    /// Driver failures.
    fn search(&self, base: &Path, scope: Scope, filter: &Filter) -> Result<Vec<Entry>>;

    /// Create one entry
    ///
    /// # Errors
    ///
    /// `EntryExists` if the path is taken, `NoSuchEntry` if the parent is
    /// missing.
    fn create_subtree(&mut self, path: &Path, attributes: &AttributeSet) -> Result<()>;

    /// Apply attribute mutations to an existing entry
    ///
    /// # Errors
    ///
    /// `NoSuchEntry` for a missing entry, `NoSuchAttribute` when removing
    /// something that is not there.
    fn modify_attributes(&mut self, path: &Path, mutations: &[Mutation]) -> Result<()>;

    /// Delete an entry and all of its descendants
    ///
    /// # Errors
    ///
    /// `NoSuchEntry` for a missing entry.
    fn delete_subtree(&mut self, path: &Path) -> Result<()>;

    /// Attributes of the entry at `path`, if it exists
    ///
    /// # Errors
    ///
    /// Driver failures.
    fn read(&self, path: &Path) -> Result<Option<AttributeSet>> {
        Ok(self
            .search(path, Scope::Base, &Filter::Any)?
            .into_iter()
            .next()
            .map(|e| e.attributes))
    }

    /// # Errors
    ///
    /// Driver failures.
    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.read(path)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matching() {
        let attrs = AttributeSet::new()
            .with(OBJECT_CLASS, vec!["top".to_string(), "dcmQueue".to_string()])
            .with("dcmQueueName", vec!["Q1".to_string()]);
        assert!(Filter::Any.matches(&attrs));
        assert!(Filter::ObjectClass("DCMQUEUE".to_string()).matches(&attrs));
        assert!(Filter::Present("dcmqueuename".to_string()).matches(&attrs));
        assert!(Filter::Equals {
            attribute: "dcmQueueName".to_string(),
            value: "q1".to_string()
        }
        .matches(&attrs));
        assert!(!Filter::ObjectClass("dcmStorage".to_string()).matches(&attrs));
    }

    #[test]
    fn test_scope_contains() {
        let base = Path::parse("dicomDeviceName=arc").unwrap();
        let child = Path::parse("dcmQueueName=Q1,dicomDeviceName=arc").unwrap();
        let grandchild = Path::parse("cn=x,dcmQueueName=Q1,dicomDeviceName=arc").unwrap();
        assert!(Scope::Base.contains(&base, &base));
        assert!(!Scope::OneLevel.contains(&base, &base));
        assert!(Scope::OneLevel.contains(&base, &child));
        assert!(!Scope::OneLevel.contains(&base, &grandchild));
        assert!(Scope::Subtree.contains(&base, &grandchild));
    }
}
