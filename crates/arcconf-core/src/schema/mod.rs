//! Declarative configuration schema
//!
//! A [`Schema`] describes entity types: their own fields (name, store
//! attribute, semantic type, default) and their keyed child collections.
//! The codec, serializer, differ and reconciler are generic over it, so
//! adding a configuration section means adding schema data, not code.
//!
//! Schemas are written as YAML documents (see [`document`]) and resolved
//! into shared, immutable [`EntityType`] graphs. The archive device schema
//! ships embedded in the crate (see [`archive`]).

pub mod archive;
pub mod document;

use crate::errors::{ConfError, Result};
use crate::model::Key;
use crate::path::Rdn;
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Store attribute holding an entry's object classes
pub const OBJECT_CLASS: &str = "objectClass";

/// Semantic type of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Str,
    Int,
    Bool,
    /// Closed set of variant names
    Enum(Vec<String>),
    Duration,
    Period,
    Size,
    Tag,
    Bytes,
    /// Unordered set of strings
    StrSet,
    /// Ordered sequence of strings
    StrSeq,
    Codes,
    Tags,
    Schedules,
    Properties,
}

impl FieldType {
    /// Parse a type name as written in schema documents
    pub fn from_name(name: &str, variants: Vec<String>) -> Option<Self> {
        let ty = match name {
            "str" => FieldType::Str,
            "int" => FieldType::Int,
            "bool" => FieldType::Bool,
            "enum" => FieldType::Enum(variants),
            "duration" => FieldType::Duration,
            "period" => FieldType::Period,
            "size" => FieldType::Size,
            "tag" => FieldType::Tag,
            "bytes" => FieldType::Bytes,
            "str_set" => FieldType::StrSet,
            "str_seq" => FieldType::StrSeq,
            "codes" => FieldType::Codes,
            "tags" => FieldType::Tags,
            "schedules" => FieldType::Schedules,
            "properties" => FieldType::Properties,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Str => "str",
            FieldType::Int => "int",
            FieldType::Bool => "bool",
            FieldType::Enum(_) => "enum",
            FieldType::Duration => "duration",
            FieldType::Period => "period",
            FieldType::Size => "size",
            FieldType::Tag => "tag",
            FieldType::Bytes => "bytes",
            FieldType::StrSet => "str_set",
            FieldType::StrSeq => "str_seq",
            FieldType::Codes => "codes",
            FieldType::Tags => "tags",
            FieldType::Schedules => "schedules",
            FieldType::Properties => "properties",
        }
    }

    /// Whether the field stores any number of attribute values
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            FieldType::StrSet
                | FieldType::StrSeq
                | FieldType::Codes
                | FieldType::Tags
                | FieldType::Schedules
                | FieldType::Properties
        )
    }

    /// Whether values of this type can appear in a store path
    pub fn can_key(&self) -> bool {
        !self.is_list() && *self != FieldType::Bytes
    }

    /// The empty value of a list type
    pub fn empty_list(&self) -> Option<Value> {
        match self {
            FieldType::StrSet | FieldType::StrSeq => Some(Value::Strings(Vec::new())),
            FieldType::Codes => Some(Value::Codes(Vec::new())),
            FieldType::Tags => Some(Value::Tags(Vec::new())),
            FieldType::Schedules => Some(Value::Schedules(Vec::new())),
            FieldType::Properties => Some(Value::Properties(BTreeMap::new())),
            _ => None,
        }
    }
}

/// One field of an entity type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub attribute: String,
    pub ty: FieldType,
    /// Value assumed when the store holds none; lists default to empty
    pub default: Option<Value>,
    /// Values are masked in change records and logs
    pub sensitive: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, attribute: impl Into<String>, ty: FieldType) -> Self {
        let default = ty.empty_list();
        Self {
            name: name.into(),
            attribute: attribute.into(),
            ty,
            default,
            sensitive: false,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Keyed child collection of an entity type
#[derive(Debug, Clone)]
pub struct ChildCollection {
    pub name: String,
    pub entity_type: Arc<EntityType>,
    /// Names of the key fields; more than one yields a multi-valued RDN
    pub key: Vec<String>,
}

impl ChildCollection {
    /// Key field definitions in key order
    pub fn key_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.key
            .iter()
            .filter_map(|name| self.entity_type.field(name))
    }

    /// Relative path component for a child with the given key
    pub fn rdn(&self, key: &Key) -> Rdn {
        Rdn::new(
            self.key_fields()
                .zip(key.parts())
                .map(|(field, text)| (field.attribute.clone(), text.clone()))
                .collect(),
        )
    }
}

/// A kind of configuration entity
#[derive(Debug)]
pub struct EntityType {
    pub name: String,
    /// Marker written to `objectClass` when an entry of this type is created
    pub object_class: String,
    pub fields: Vec<FieldDef>,
    pub children: Vec<ChildCollection>,
}

impl EntityType {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field stored under `attribute`, matched case-insensitively
    pub fn field_by_attribute(&self, attribute: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.attribute.eq_ignore_ascii_case(attribute))
    }

    pub fn collection(&self, name: &str) -> Option<&ChildCollection> {
        self.children.iter().find(|c| c.name == name)
    }

    pub(crate) fn require_field(&self, name: &str) -> Result<&FieldDef> {
        self.field(name).ok_or_else(|| ConfError::UnknownField {
            entity_type: self.name.clone(),
            field: name.to_string(),
        })
    }

    pub(crate) fn require_collection(&self, name: &str) -> Result<&ChildCollection> {
        self.collection(name)
            .ok_or_else(|| ConfError::UnknownCollection {
                entity_type: self.name.clone(),
                collection: name.to_string(),
            })
    }
}

/// Resolved schema: a root entity type plus every type reachable from it
#[derive(Debug, Clone)]
pub struct Schema {
    root: Arc<EntityType>,
    types: BTreeMap<String, Arc<EntityType>>,
}

impl Schema {
    pub(crate) fn new(root: Arc<EntityType>, types: BTreeMap<String, Arc<EntityType>>) -> Self {
        Self { root, types }
    }

    /// Parse and validate a YAML schema document
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        document::SchemaDocument::from_yaml_str(text)?.resolve()
    }

    /// The embedded archive device schema
    pub fn archive() -> Result<Self> {
        archive::archive_schema()
    }

    pub fn root(&self) -> &Arc<EntityType> {
        &self.root
    }

    pub fn entity_type(&self, name: &str) -> Result<&Arc<EntityType>> {
        self.types
            .get(name)
            .ok_or_else(|| ConfError::UnknownEntityType {
                name: name.to_string(),
            })
    }

    /// All entity types, ordered by name
    pub fn entity_types(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.types.values()
    }
}
