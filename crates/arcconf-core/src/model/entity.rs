//! Typed configuration entities
//!
//! An [`Entity`] holds values for the fields of its [`EntityType`] plus keyed
//! child collections. Values are normalized on the way in, so two entities
//! compare equal exactly when they denote the same configuration.
//!
//! Entities are immutable snapshots built by consuming builder methods:
//!
//! ```
//! use arcconf_core::model::Entity;
//! use arcconf_core::schema::Schema;
//!
//! let schema = Schema::archive().unwrap();
//! let queues = schema.root().collection("queues").unwrap();
//! let queue = Entity::new(queues.entity_type.clone())
//!     .with("queueName", "Export1").unwrap()
//!     .with("maxRetries", 3).unwrap();
//! let device = Entity::new(schema.root().clone())
//!     .with_child("queues", queue).unwrap();
//! assert_eq!(device.children("queues").unwrap().len(), 1);
//! ```

use crate::codec;
use crate::errors::{ConfError, Result};
use crate::schema::{ChildCollection, EntityType};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Collection key: canonical text of each key field, in key order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Vec<String>);

impl Key {
    pub fn new(parts: Vec<String>) -> Self {
        Self(parts)
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Key of `child` within `collection`
    ///
    /// # Errors
    ///
    /// `MissingKey` when a key field has no value.
    pub fn of(collection: &ChildCollection, child: &Entity) -> Result<Self> {
        let mut parts = Vec::with_capacity(collection.key.len());
        for name in &collection.key {
            let value = child.get(name).ok_or_else(|| ConfError::MissingKey {
                entity_type: child.entity_type.name.clone(),
                field: name.clone(),
            })?;
            parts.push(codec::format_value(value).concat());
        }
        Ok(Key(parts))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("+"))
    }
}

/// Children of one collection, in key order
pub type Children = BTreeMap<Key, Entity>;

#[derive(Clone)]
pub struct Entity {
    entity_type: Arc<EntityType>,
    values: BTreeMap<String, Value>,
    children: BTreeMap<String, Children>,
}

impl Entity {
    /// Entity with every field at its default and empty collections
    pub fn new(entity_type: Arc<EntityType>) -> Self {
        let values = entity_type
            .fields
            .iter()
            .filter_map(|f| f.default.clone().map(|v| (f.name.clone(), v)))
            .collect();
        let children = entity_type
            .children
            .iter()
            .map(|c| (c.name.clone(), Children::new()))
            .collect();
        Self {
            entity_type,
            values,
            children,
        }
    }

    /// Set a field
    ///
    /// # Errors
    ///
    /// `UnknownField`, `TypeMismatch` or `InvalidValue`.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Result<Self> {
        let def = self.entity_type.require_field(field)?;
        let value = codec::normalize(def, value.into())?;
        self.values.insert(def.name.clone(), value);
        Ok(self)
    }

    /// Reset a field to its default, or to no value when it has none
    pub fn without(mut self, field: &str) -> Result<Self> {
        let def = self.entity_type.require_field(field)?;
        match def.default.clone() {
            Some(default) => self.values.insert(def.name.clone(), default),
            None => self.values.remove(&def.name),
        };
        Ok(self)
    }

    /// Add a child to a collection
    ///
    /// # Errors
    ///
    /// `UnknownCollection`, `TypeMismatch` if the child is of another type,
    /// `MissingKey` or `DuplicateKey`.
    pub fn with_child(mut self, collection: &str, child: Entity) -> Result<Self> {
        let def = self.entity_type.require_collection(collection)?;
        if def.entity_type.name != child.entity_type.name {
            return Err(ConfError::TypeMismatch {
                field: collection.to_string(),
                expected: def.entity_type.name.clone(),
            });
        }
        let key = Key::of(def, &child)?;
        let members = self.children.entry(def.name.clone()).or_default();
        if members.contains_key(&key) {
            return Err(ConfError::DuplicateKey {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        }
        members.insert(key, child);
        Ok(self)
    }

    /// Remove a child by key, returning it
    pub fn take_child(&mut self, collection: &str, key: &Key) -> Option<Entity> {
        self.children.get_mut(collection)?.remove(key)
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    /// Value of a field, `None` for unknown fields and fields without value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn children(&self, collection: &str) -> Option<&Children> {
        self.children.get(collection)
    }

    pub fn child(&self, collection: &str, key: &Key) -> Option<&Entity> {
        self.children.get(collection)?.get(key)
    }

    /// Number of entities in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .values()
            .flat_map(|c| c.values())
            .map(Entity::subtree_len)
            .sum::<usize>()
    }

    pub(crate) fn from_parts(entity_type: Arc<EntityType>, values: BTreeMap<String, Value>) -> Self {
        let mut entity = Entity::new(entity_type);
        entity.values = values;
        entity
    }

    pub(crate) fn insert_child(&mut self, collection: &str, key: Key, child: Entity) -> bool {
        let members = self.children.entry(collection.to_string()).or_default();
        if members.contains_key(&key) {
            return false;
        }
        members.insert(key, child);
        true
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.entity_type.name == other.entity_type.name
            && self.values == other.values
            && self.children == other.children
    }
}

impl Eq for Entity {}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Entity");
        s.field("type", &self.entity_type.name);
        for def in &self.entity_type.fields {
            match self.values.get(&def.name) {
                Some(_) if def.sensitive => {
                    s.field(&def.name, &arcconf_core_types::REDACTED);
                }
                Some(v) => {
                    s.field(&def.name, v);
                }
                None => {}
            }
        }
        s.field("children", &self.children);
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::value::IsoDuration;

    fn schema() -> Schema {
        Schema::archive().unwrap()
    }

    fn queue(schema: &Schema, name: &str) -> Entity {
        Entity::new(schema.entity_type("queue").unwrap().clone())
            .with("queueName", name)
            .unwrap()
    }

    #[test]
    fn test_new_entity_materializes_defaults() {
        let schema = schema();
        let q = queue(&schema, "Q1");
        assert_eq!(q.get("maxRetries"), Some(&Value::Int(0)));
        assert_eq!(
            q.get("retryDelay"),
            Some(&Value::Duration(IsoDuration::from_secs(60)))
        );
        assert_eq!(q.get("jndiName"), None);
    }

    #[test]
    fn test_equivalent_values_compare_equal() {
        let schema = schema();
        let a = queue(&schema, "Q1").with("retryDelay", "PT60S").unwrap();
        let b = queue(&schema, "Q1").with("retryDelay", "PT1M").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let schema = schema();
        let err = queue(&schema, "Q1").with("bogus", 1).unwrap_err();
        assert!(matches!(err, ConfError::UnknownField { .. }));
    }

    #[test]
    fn test_child_without_key_rejected() {
        let schema = schema();
        let nameless = Entity::new(schema.entity_type("queue").unwrap().clone());
        let err = Entity::new(schema.root().clone())
            .with_child("queues", nameless)
            .unwrap_err();
        assert!(matches!(err, ConfError::MissingKey { .. }));
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let schema = schema();
        let err = Entity::new(schema.root().clone())
            .with_child("queues", queue(&schema, "Q1"))
            .unwrap()
            .with_child("queues", queue(&schema, "Q1"))
            .unwrap_err();
        assert!(matches!(err, ConfError::DuplicateKey { .. }));
    }

    #[test]
    fn test_child_type_checked() {
        let schema = schema();
        let err = Entity::new(schema.root().clone())
            .with_child("storages", queue(&schema, "Q1"))
            .unwrap_err();
        assert!(matches!(err, ConfError::TypeMismatch { .. }));
    }

    #[test]
    fn test_children_iterate_in_key_order() {
        let schema = schema();
        let device = Entity::new(schema.root().clone())
            .with_child("queues", queue(&schema, "b"))
            .unwrap()
            .with_child("queues", queue(&schema, "a"))
            .unwrap();
        let keys: Vec<String> = device
            .children("queues")
            .unwrap()
            .keys()
            .map(Key::to_string)
            .collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(device.subtree_len(), 3);
    }

    #[test]
    fn test_without_restores_default() {
        let schema = schema();
        let q = queue(&schema, "Q1").with("maxRetries", 5).unwrap();
        let q = q.without("maxRetries").unwrap();
        assert_eq!(q.get("maxRetries"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_debug_masks_sensitive_fields() {
        let schema = schema();
        let device = Entity::new(schema.root().clone())
            .with("keyStorePin", "s3cret")
            .unwrap();
        let text = format!("{:?}", device);
        assert!(!text.contains("s3cret"));
    }

    #[test]
    fn test_entities_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Entity>();
    }
}
