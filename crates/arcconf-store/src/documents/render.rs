//! Document rendering
//!
//! Writes a snapshot back out in format v1. Fields at their default are
//! left out, exactly as in the store, so a rendered document parses back to
//! the same snapshot.

#![allow(clippy::result_large_err)]

use super::format_v1::DocumentV1;
use arcconf_core::codec;
use arcconf_core::errors::{ConfError, Result};
use arcconf_core::model::Entity;
use serde_yaml::{Mapping, Value as Yaml};

/// YAML text of a document for `device`
pub fn render_document(device: &str, archive: Option<&Entity>) -> Result<String> {
    let doc = DocumentV1 {
        format_version: 1,
        device: device.to_string(),
        archive: archive.map(entity_mapping),
    };
    serde_yaml::to_string(&doc).map_err(|e| ConfError::Serialization {
        message: e.to_string(),
    })
}

fn entity_mapping(entity: &Entity) -> Mapping {
    let ty = entity.entity_type();
    let mut mapping = Mapping::new();

    for field in &ty.fields {
        let Some(values) = codec::encode(field, entity.get(&field.name)) else {
            continue;
        };
        let value = if field.ty.is_list() {
            Yaml::Sequence(values.into_iter().map(Yaml::String).collect())
        } else {
            match values.into_iter().next() {
                Some(text) => Yaml::String(text),
                None => continue,
            }
        };
        mapping.insert(Yaml::String(field.name.clone()), value);
    }

    for collection in &ty.children {
        let Some(children) = entity.children(&collection.name) else {
            continue;
        };
        if children.is_empty() {
            continue;
        }
        let items = children
            .values()
            .map(|child| Yaml::Mapping(entity_mapping(child)))
            .collect();
        mapping.insert(Yaml::String(collection.name.clone()), Yaml::Sequence(items));
    }
    mapping
}
