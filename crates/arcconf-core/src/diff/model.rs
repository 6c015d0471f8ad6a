//! Attribute mutation types.

use serde::{Deserialize, Serialize};

/// One attribute-level change to a store entry
///
/// `Remove` with no values removes the whole attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    Add {
        attribute: String,
        values: Vec<String>,
    },
    Replace {
        attribute: String,
        values: Vec<String>,
    },
    Remove {
        attribute: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        values: Vec<String>,
    },
}

impl Mutation {
    pub fn add(attribute: impl Into<String>, values: Vec<String>) -> Self {
        Mutation::Add {
            attribute: attribute.into(),
            values,
        }
    }

    pub fn replace(attribute: impl Into<String>, values: Vec<String>) -> Self {
        Mutation::Replace {
            attribute: attribute.into(),
            values,
        }
    }

    /// Remove the whole attribute
    pub fn remove(attribute: impl Into<String>) -> Self {
        Mutation::Remove {
            attribute: attribute.into(),
            values: Vec::new(),
        }
    }

    /// Remove only the listed values
    pub fn remove_values(attribute: impl Into<String>, values: Vec<String>) -> Self {
        Mutation::Remove {
            attribute: attribute.into(),
            values,
        }
    }

    pub fn attribute(&self) -> &str {
        match self {
            Mutation::Add { attribute, .. }
            | Mutation::Replace { attribute, .. }
            | Mutation::Remove { attribute, .. } => attribute,
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            Mutation::Add { values, .. }
            | Mutation::Replace { values, .. }
            | Mutation::Remove { values, .. } => values,
        }
    }

    /// Same mutation with every value replaced by `placeholder`
    pub fn masked(&self, placeholder: &str) -> Self {
        let mask = |values: &[String]| vec![placeholder.to_string(); values.len()];
        match self {
            Mutation::Add { attribute, values } => Mutation::add(attribute.clone(), mask(values)),
            Mutation::Replace { attribute, values } => {
                Mutation::replace(attribute.clone(), mask(values))
            }
            Mutation::Remove { attribute, values } => {
                Mutation::remove_values(attribute.clone(), mask(values))
            }
        }
    }

    /// Short verb used in summaries
    pub fn verb(&self) -> &'static str {
        match self {
            Mutation::Add { .. } => "add",
            Mutation::Replace { .. } => "replace",
            Mutation::Remove { .. } => "remove",
        }
    }
}
