//! Snapshot loading from a directory store
//!
//! Reads the entry at a path and, recursively, the entries of every child
//! collection, producing the entity tree the reconciler compares against.
//! Child entries are found by a one-level search filtered on the
//! collection's object class.
//!
//! Entries whose key attributes are missing or unparsable cannot be placed
//! in a collection. They are skipped and reported in
//! [`LoadOutcome::skipped`]; a malformed non-key attribute fails the load.

use crate::codec;
use crate::directory::{DirectoryStore, Filter, Scope};
use crate::errors::{ConfError, Result};
use crate::model::{AttributeSet, Entity, Key};
use crate::path::Path;
use crate::schema::{ChildCollection, EntityType, OBJECT_CLASS};
use crate::serializer;
use std::sync::Arc;

/// A stored entry that could not be loaded into its collection
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub path: Path,
    pub collection: String,
    pub error: ConfError,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub entity: Entity,
    pub skipped: Vec<SkippedEntry>,
}

/// Load the snapshot rooted at `path`
///
/// Returns `None` when there is no entry at `path` or it lacks the entity
/// type's object class marker.
///
/// # Errors
///
/// `MalformedValue` for undecodable attributes, or store failures.
pub fn load_snapshot<S>(
    store: &S,
    path: &Path,
    entity_type: &Arc<EntityType>,
) -> Result<Option<LoadOutcome>>
where
    S: DirectoryStore + ?Sized,
{
    let Some(attrs) = store.read(path)? else {
        return Ok(None);
    };
    if !attrs.has_value(OBJECT_CLASS, &entity_type.object_class) {
        return Ok(None);
    }

    let mut skipped = Vec::new();
    let entity = load_entity(store, path, &attrs, entity_type, &mut skipped)?;
    if !skipped.is_empty() {
        tracing::warn!(
            path = %path,
            skipped_len = skipped.len(),
            "entries without usable keys were skipped"
        );
    }
    Ok(Some(LoadOutcome { entity, skipped }))
}

fn load_entity<S>(
    store: &S,
    path: &Path,
    attrs: &AttributeSet,
    entity_type: &Arc<EntityType>,
    skipped: &mut Vec<SkippedEntry>,
) -> Result<Entity>
where
    S: DirectoryStore + ?Sized,
{
    let mut entity = serializer::deserialize(attrs, entity_type)?;

    for collection in &entity_type.children {
        let filter = Filter::ObjectClass(collection.entity_type.object_class.clone());
        for entry in store.search(path, Scope::OneLevel, &filter)? {
            let key = match stored_key(collection, &entry.path, &entry.attributes) {
                Ok(key) => key,
                Err(error) => {
                    skipped.push(SkippedEntry {
                        path: entry.path,
                        collection: collection.name.clone(),
                        error,
                    });
                    continue;
                }
            };
            let child = load_entity(
                store,
                &entry.path,
                &entry.attributes,
                &collection.entity_type,
                skipped,
            )?;
            if !entity.insert_child(&collection.name, key.clone(), child) {
                skipped.push(SkippedEntry {
                    path: entry.path.clone(),
                    collection: collection.name.clone(),
                    error: ConfError::UnknownKey {
                        path: entry.path.to_string(),
                        collection: collection.name.clone(),
                        reason: format!("key {} already loaded", key),
                    },
                });
            }
        }
    }
    Ok(entity)
}

/// Key of a stored child entry, read from its key attributes
fn stored_key(collection: &ChildCollection, path: &Path, attrs: &AttributeSet) -> Result<Key> {
    let unknown = |reason: String| ConfError::UnknownKey {
        path: path.to_string(),
        collection: collection.name.clone(),
        reason,
    };
    let mut parts = Vec::with_capacity(collection.key.len());
    for field in collection.key_fields() {
        let stored = attrs
            .get(&field.attribute)
            .ok_or_else(|| unknown(format!("attribute {} is absent", field.attribute)))?;
        let value = codec::parse_value(field, stored).map_err(|e| unknown(e.to_string()))?;
        parts.push(codec::format_value(&value).concat());
    }
    if parts.len() != collection.key.len() {
        return Err(unknown("key fields missing from entity type".to_string()));
    }
    Ok(Key::new(parts))
}
