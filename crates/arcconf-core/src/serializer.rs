//! Entity to attribute set mapping
//!
//! Covers an entity's own fields only; child collections live in separate
//! store entries and are handled by the reconciler and the loader.

use crate::codec;
use crate::errors::Result;
use crate::model::{AttributeSet, Entity};
use crate::schema::{EntityType, OBJECT_CLASS};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Stored attributes for the entity's own fields, in schema order
///
/// Fields at their default and empty lists are left out.
pub fn serialize(entity: &Entity) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    for field in &entity.entity_type().fields {
        if let Some(values) = codec::encode(field, entity.get(&field.name)) {
            attrs.insert(field.attribute.clone(), values);
        }
    }
    attrs
}

/// Attributes for creating a new entry: the object class marker followed by
/// the serialized fields
pub fn serialize_entry(entity: &Entity) -> AttributeSet {
    let mut attrs = AttributeSet::new().with(
        OBJECT_CLASS,
        vec![entity.entity_type().object_class.clone()],
    );
    for attr in serialize(entity).iter() {
        attrs.insert(attr.name.clone(), attr.values.clone());
    }
    attrs
}

/// Entity with own fields decoded from `attrs`; collections start empty
///
/// Attributes the type does not map (including `objectClass`) are ignored.
///
/// # Errors
///
/// `MalformedValue` when a mapped attribute cannot be decoded.
pub fn deserialize(attrs: &AttributeSet, entity_type: &Arc<EntityType>) -> Result<Entity> {
    let mut values = BTreeMap::new();
    for field in &entity_type.fields {
        if let Some(value) = codec::decode(field, attrs.get(&field.attribute))? {
            values.insert(field.name.clone(), value);
        }
    }
    Ok(Entity::from_parts(entity_type.clone(), values))
}
