//! Document parser
//!
//! Structure is checked here; every value goes through the codec, so a bad
//! value is a `MalformedValue` just as it would be when loaded from a store.

#![allow(clippy::result_large_err)]

use super::format_v1::DocumentV1;
use super::ArchiveDocument;
use crate::errors::{document_error, io_error, Result};
use arcconf_core::codec;
use arcconf_core::errors::Result as ConfResult;
use arcconf_core::model::Entity;
use arcconf_core::schema::document::scalar_text;
use arcconf_core::schema::{EntityType, FieldDef, Schema};
use serde_yaml::{Mapping, Value as Yaml};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Parse a document file against `schema`
pub fn parse_document_file(schema: &Schema, path: &Path) -> Result<ArchiveDocument> {
    let content = fs::read_to_string(path).map_err(|e| io_error("read_document", e))?;
    parse_document_str(schema, &content, &path.display().to_string())
}

/// Parse document text; `source_name` names it in errors
pub fn parse_document_str(
    schema: &Schema,
    content: &str,
    source_name: &str,
) -> Result<ArchiveDocument> {
    let doc: DocumentV1 = serde_yaml::from_str(content)
        .map_err(|e| document_error(source_name, format!("YAML parse error: {}", e)))?;

    if doc.format_version != 1 {
        return Err(document_error(
            source_name,
            format!(
                "Unsupported format_version: {}. Expected 1",
                doc.format_version
            ),
        )
        .into());
    }
    if doc.device.trim().is_empty() {
        return Err(document_error(source_name, "device name is empty").into());
    }

    let archive = match &doc.archive {
        Some(mapping) => Some(build_entity(
            source_name,
            schema.root(),
            mapping,
            "archive",
        )?),
        None => None,
    };

    Ok(ArchiveDocument {
        device: doc.device,
        archive,
    })
}

fn build_entity(
    source: &str,
    entity_type: &Arc<EntityType>,
    mapping: &Mapping,
    at: &str,
) -> ConfResult<Entity> {
    let mut entity = Entity::new(entity_type.clone());
    for (name, value) in mapping {
        let Some(name) = name.as_str() else {
            return Err(document_error(source, format!("{}: keys must be strings", at)));
        };

        if let Some(field) = entity_type.field(name) {
            let values = field_values(source, field, value, at)?;
            entity = entity.with(&field.name, codec::parse_value(field, &values)?)?;
        } else if let Some(collection) = entity_type.collection(name) {
            let Some(items) = value.as_sequence() else {
                return Err(document_error(
                    source,
                    format!("{}.{}: expected a list of {}", at, name, collection.entity_type.name),
                ));
            };
            for (i, item) in items.iter().enumerate() {
                let item_at = format!("{}.{}[{}]", at, name, i);
                let Some(item) = item.as_mapping() else {
                    return Err(document_error(source, format!("{}: expected a mapping", item_at)));
                };
                let child = build_entity(source, &collection.entity_type, item, &item_at)?;
                entity = entity.with_child(&collection.name, child)?;
            }
        } else {
            return Err(document_error(
                source,
                format!("{}: {} has no field or collection {}", at, entity_type.name, name),
            ));
        }
    }
    Ok(entity)
}

/// Text values of one field; a lone scalar is accepted for list fields
fn field_values(source: &str, field: &FieldDef, value: &Yaml, at: &str) -> ConfResult<Vec<String>> {
    let not_scalar = || {
        document_error(
            source,
            format!("{}.{}: values must be scalars", at, field.name),
        )
    };
    match value {
        Yaml::Null => Ok(Vec::new()),
        Yaml::Sequence(items) => items
            .iter()
            .map(|item| scalar_text(item).ok_or_else(not_scalar))
            .collect(),
        other => Ok(vec![scalar_text(other).ok_or_else(not_scalar)?]),
    }
}
