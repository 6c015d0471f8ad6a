//! YAML schema document format (version 1)
//!
//! ```yaml
//! schema_version: 1
//! root: device
//! entity_types:
//!   - name: device
//!     object_class: dcmDevice
//!     fields:
//!       - { name: maxRetries, attribute: dcmMaxRetries, type: int, default: 0 }
//!     children:
//!       - { name: queues, entity_type: queue, key: [queueName] }
//! ```
//!
//! Resolution checks that names are unique, key fields exist and are scalar
//! without defaults, defaults parse under their field type, and the type
//! graph has no cycles.

use super::{ChildCollection, EntityType, FieldDef, FieldType, Schema, OBJECT_CLASS};
use crate::codec;
use crate::errors::{ConfError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

pub const SCHEMA_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub schema_version: u32,
    pub root: String,
    pub entity_types: Vec<EntityTypeDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityTypeDoc {
    pub name: String,
    pub object_class: String,
    #[serde(default)]
    pub fields: Vec<FieldDoc>,
    #[serde(default)]
    pub children: Vec<ChildDoc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDoc {
    pub name: String,
    pub attribute: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
    #[serde(default)]
    pub sensitive: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChildDoc {
    pub name: String,
    pub entity_type: String,
    pub key: Vec<String>,
}

/// Text of a YAML scalar as it would be written to the store
///
/// Booleans become `TRUE`/`FALSE`; sequences, mappings and null have no
/// scalar text.
pub fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(true) => Some("TRUE".to_string()),
        serde_yaml::Value::Bool(false) => Some("FALSE".to_string()),
        _ => None,
    }
}

fn invalid(reason: impl Into<String>) -> ConfError {
    ConfError::SchemaInvalid {
        reason: reason.into(),
    }
}

impl SchemaDocument {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| invalid(e.to_string()))
    }

    /// Validate the document and build the shared entity type graph
    pub fn resolve(self) -> Result<Schema> {
        if self.schema_version != SCHEMA_FORMAT_VERSION {
            return Err(invalid(format!(
                "unsupported schema_version {} (expected {})",
                self.schema_version, SCHEMA_FORMAT_VERSION
            )));
        }

        let mut docs = BTreeMap::new();
        for doc in &self.entity_types {
            if docs.insert(doc.name.clone(), doc).is_some() {
                return Err(invalid(format!("entity type {} defined twice", doc.name)));
            }
        }
        if !docs.contains_key(&self.root) {
            return Err(invalid(format!("root type {} is not defined", self.root)));
        }

        let mut resolver = Resolver {
            docs: &docs,
            built: BTreeMap::new(),
            visiting: Vec::new(),
        };
        let root = resolver.build(&self.root)?;
        // Types not reachable from the root are validated too
        for name in docs.keys() {
            resolver.build(name)?;
        }
        Ok(Schema::new(root, resolver.built))
    }
}

struct Resolver<'a> {
    docs: &'a BTreeMap<String, &'a EntityTypeDoc>,
    built: BTreeMap<String, Arc<EntityType>>,
    visiting: Vec<String>,
}

impl Resolver<'_> {
    fn build(&mut self, name: &str) -> Result<Arc<EntityType>> {
        if let Some(ty) = self.built.get(name) {
            return Ok(ty.clone());
        }
        if self.visiting.iter().any(|v| v == name) {
            return Err(invalid(format!(
                "entity type cycle: {} -> {}",
                self.visiting.join(" -> "),
                name
            )));
        }
        let doc = *self
            .docs
            .get(name)
            .ok_or_else(|| invalid(format!("entity type {} is not defined", name)))?;

        self.visiting.push(name.to_string());
        let fields = resolve_fields(doc)?;

        let mut collection_names = HashSet::new();
        let mut children = Vec::with_capacity(doc.children.len());
        for child in &doc.children {
            if !collection_names.insert(child.name.as_str()) {
                return Err(invalid(format!(
                    "{}: collection {} defined twice",
                    doc.name, child.name
                )));
            }
            let entity_type = self.build(&child.entity_type)?;
            check_key(&doc.name, child, &entity_type)?;
            children.push(ChildCollection {
                name: child.name.clone(),
                entity_type,
                key: child.key.clone(),
            });
        }
        self.visiting.pop();

        if doc.object_class.is_empty() {
            return Err(invalid(format!("{}: empty object_class", doc.name)));
        }
        let ty = Arc::new(EntityType {
            name: doc.name.clone(),
            object_class: doc.object_class.clone(),
            fields,
            children,
        });
        self.built.insert(doc.name.clone(), ty.clone());
        Ok(ty)
    }
}

fn resolve_fields(doc: &EntityTypeDoc) -> Result<Vec<FieldDef>> {
    let mut names = HashSet::new();
    let mut attributes = HashSet::new();
    let mut fields = Vec::with_capacity(doc.fields.len());

    for f in &doc.fields {
        let context = format!("{}.{}", doc.name, f.name);
        if !names.insert(f.name.as_str()) {
            return Err(invalid(format!("{}: field defined twice", context)));
        }
        if f.attribute.is_empty() || f.attribute.eq_ignore_ascii_case(OBJECT_CLASS) {
            return Err(invalid(format!(
                "{}: attribute {:?} is reserved or empty",
                context, f.attribute
            )));
        }
        if !attributes.insert(f.attribute.to_ascii_lowercase()) {
            return Err(invalid(format!(
                "{}: attribute {} mapped twice",
                context, f.attribute
            )));
        }

        let ty = FieldType::from_name(&f.ty, f.variants.clone())
            .ok_or_else(|| invalid(format!("{}: unknown type {}", context, f.ty)))?;
        match &ty {
            FieldType::Enum(variants) if variants.is_empty() => {
                return Err(invalid(format!("{}: enum without variants", context)))
            }
            FieldType::Enum(_) => {}
            _ if !f.variants.is_empty() => {
                return Err(invalid(format!("{}: variants on a non-enum field", context)))
            }
            _ => {}
        }

        let mut field = FieldDef::new(&f.name, &f.attribute, ty);
        if let Some(default) = &f.default {
            if field.ty.is_list() {
                return Err(invalid(format!(
                    "{}: list fields always default to empty",
                    context
                )));
            }
            let text = scalar_text(default)
                .ok_or_else(|| invalid(format!("{}: default must be a scalar", context)))?;
            let value = codec::parse_value(&field, &[text])
                .map_err(|e| invalid(format!("{}: bad default: {}", context, e)))?;
            field = field.with_default(value);
        }
        if f.sensitive {
            field = field.sensitive();
        }
        fields.push(field);
    }
    Ok(fields)
}

fn check_key(parent: &str, child: &ChildDoc, ty: &EntityType) -> Result<()> {
    let context = format!("{}.{}", parent, child.name);
    if child.key.is_empty() {
        return Err(invalid(format!("{}: empty key", context)));
    }
    let mut seen = HashSet::new();
    for name in &child.key {
        if !seen.insert(name.as_str()) {
            return Err(invalid(format!("{}: key field {} repeated", context, name)));
        }
        let field = ty
            .field(name)
            .ok_or_else(|| invalid(format!("{}: key field {} not in {}", context, name, ty.name)))?;
        if !field.ty.can_key() {
            return Err(invalid(format!(
                "{}: key field {} has non-scalar type {}",
                context,
                name,
                field.ty.name()
            )));
        }
        if field.default.is_some() {
            return Err(invalid(format!(
                "{}: key field {} must not have a default",
                context, name
            )));
        }
    }
    Ok(())
}
