use super::{DirectoryStore, Entry, Filter, Scope};
use crate::diff::Mutation;
use crate::errors::{ConfError, Result};
use crate::model::AttributeSet;
use crate::path::Path;
use std::collections::BTreeMap;

/// In-memory directory keyed by normalized path
///
/// Entries other than single-RDN roots need an existing parent.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    entries: BTreeMap<Path, AttributeSet>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All stored paths, in order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys()
    }
}

impl DirectoryStore for MemoryDirectory {
    fn search(&self, base: &Path, scope: Scope, filter: &Filter) -> Result<Vec<Entry>> {
        Ok(self
            .entries
            .iter()
            .filter(|(path, attrs)| scope.contains(base, path) && filter.matches(attrs))
            .map(|(path, attrs)| Entry {
                path: path.clone(),
                attributes: attrs.clone(),
            })
            .collect())
    }

    fn create_subtree(&mut self, path: &Path, attributes: &AttributeSet) -> Result<()> {
        if self.entries.contains_key(path) {
            return Err(ConfError::EntryExists {
                path: path.to_string(),
            });
        }
        if path.is_empty() {
            return Err(ConfError::InvalidPath {
                path: String::new(),
                reason: "cannot create the empty path".to_string(),
            });
        }
        if let Some(parent) = path.parent().filter(|p| !p.is_empty()) {
            if !self.entries.contains_key(&parent) {
                return Err(ConfError::NoSuchEntry {
                    path: parent.to_string(),
                });
            }
        }
        self.entries.insert(path.clone(), attributes.clone());
        Ok(())
    }

    fn modify_attributes(&mut self, path: &Path, mutations: &[Mutation]) -> Result<()> {
        let attrs = self
            .entries
            .get_mut(path)
            .ok_or_else(|| ConfError::NoSuchEntry {
                path: path.to_string(),
            })?;
        // Mutations apply atomically per entry
        let mut updated = attrs.clone();
        updated.apply(&path.to_string(), mutations)?;
        *attrs = updated;
        Ok(())
    }

    fn delete_subtree(&mut self, path: &Path) -> Result<()> {
        if !self.entries.contains_key(path) {
            return Err(ConfError::NoSuchEntry {
                path: path.to_string(),
            });
        }
        self.entries
            .retain(|p, _| p != path && !p.is_descendant_of(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OBJECT_CLASS;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    fn entry(class: &str) -> AttributeSet {
        AttributeSet::new().with(OBJECT_CLASS, vec![class.to_string()])
    }

    fn seeded() -> MemoryDirectory {
        let mut dir = MemoryDirectory::new();
        dir.create_subtree(&p("dicomDeviceName=arc"), &entry("dicomDevice"))
            .unwrap();
        dir.create_subtree(&p("dcmQueueName=Q1,dicomDeviceName=arc"), &entry("dcmQueue"))
            .unwrap();
        dir.create_subtree(&p("dcmStorageID=fs1,dicomDeviceName=arc"), &entry("dcmStorage"))
            .unwrap();
        dir
    }

    #[test]
    fn test_create_requires_parent() {
        let mut dir = MemoryDirectory::new();
        let err = dir
            .create_subtree(&p("dcmQueueName=Q1,dicomDeviceName=arc"), &entry("dcmQueue"))
            .unwrap_err();
        assert!(matches!(err, ConfError::NoSuchEntry { .. }));
    }

    #[test]
    fn test_create_existing_fails() {
        let mut dir = seeded();
        let err = dir
            .create_subtree(&p("DCMQUEUENAME=q1,dicomDeviceName=ARC"), &entry("dcmQueue"))
            .unwrap_err();
        assert!(matches!(err, ConfError::EntryExists { .. }));
    }

    #[test]
    fn test_one_level_search_with_filter() {
        let dir = seeded();
        let found = dir
            .search(
                &p("dicomDeviceName=arc"),
                Scope::OneLevel,
                &Filter::ObjectClass("dcmQueue".to_string()),
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, p("dcmQueueName=Q1,dicomDeviceName=arc"));
    }

    #[test]
    fn test_delete_subtree_removes_descendants() {
        let mut dir = seeded();
        dir.delete_subtree(&p("dicomDeviceName=arc")).unwrap();
        assert!(dir.is_empty());
        assert!(dir.delete_subtree(&p("dicomDeviceName=arc")).is_err());
    }

    #[test]
    fn test_failed_modify_leaves_entry_untouched() {
        let mut dir = seeded();
        let path = p("dcmQueueName=Q1,dicomDeviceName=arc");
        let err = dir
            .modify_attributes(
                &path,
                &[
                    Mutation::add("dcmMaxRetries", vec!["3".to_string()]),
                    Mutation::remove("dcmJndiName"),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, ConfError::NoSuchAttribute { .. }));
        assert_eq!(dir.read(&path).unwrap().unwrap(), entry("dcmQueue"));
    }
}
