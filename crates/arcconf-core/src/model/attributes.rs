//! Flat attribute sets as held by a directory entry

use crate::diff::Mutation;
use crate::errors::{ConfError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub values: Vec<String>,
}

/// Attributes of one entry
///
/// Attribute names match case-insensitively. Equality ignores attribute
/// order but not the order of values within an attribute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet {
    attributes: Vec<Attribute>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name)
            .map(|i| self.attributes[i].values.as_slice())
    }

    /// Set an attribute, replacing any existing values; empty values remove it
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        let name = name.into();
        match (self.position(&name), values.is_empty()) {
            (Some(i), true) => {
                self.attributes.remove(i);
            }
            (Some(i), false) => self.attributes[i].values = values,
            (None, true) => {}
            (None, false) => self.attributes.push(Attribute { name, values }),
        }
    }

    pub fn with(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.insert(name, values);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name)
            .map(|i| self.attributes.remove(i).values)
    }

    /// Whether `name` holds `value`, compared case-insensitively
    pub fn has_value(&self, name: &str, value: &str) -> bool {
        self.get(name)
            .is_some_and(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Apply mutations the way a directory server would
    ///
    /// Add appends values, Replace sets them (removing the attribute when
    /// empty), Remove drops either the listed values or the whole attribute.
    ///
    /// # Errors
    ///
    /// `NoSuchAttribute` when removing an attribute or value that is not
    /// present; `path` only names the entry in the error.
    pub fn apply(&mut self, path: &str, mutations: &[Mutation]) -> Result<()> {
        for mutation in mutations {
            match mutation {
                Mutation::Add { attribute, values } => {
                    let mut merged = self.get(attribute).map(<[String]>::to_vec).unwrap_or_default();
                    for v in values {
                        if !merged.contains(v) {
                            merged.push(v.clone());
                        }
                    }
                    self.insert(attribute.clone(), merged);
                }
                Mutation::Replace { attribute, values } => {
                    self.insert(attribute.clone(), values.clone());
                }
                Mutation::Remove { attribute, values } => {
                    let missing = || ConfError::NoSuchAttribute {
                        path: path.to_string(),
                        attribute: attribute.clone(),
                    };
                    let current = self.get(attribute).ok_or_else(missing)?.to_vec();
                    if values.is_empty() {
                        self.remove(attribute);
                        continue;
                    }
                    if values.iter().any(|v| !current.contains(v)) {
                        return Err(missing());
                    }
                    let kept = current.into_iter().filter(|v| !values.contains(v)).collect();
                    self.insert(attribute.clone(), kept);
                }
            }
        }
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))
    }
}

impl PartialEq for AttributeSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .attributes
                .iter()
                .all(|a| other.get(&a.name) == Some(a.values.as_slice()))
    }
}

impl Eq for AttributeSet {}

impl FromIterator<(String, Vec<String>)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut set = AttributeSet::new();
        for (name, values) in iter {
            set.insert(name, values);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vals(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let set = AttributeSet::new().with("dcmMaxRetries", vals(&["3"]));
        assert_eq!(set.get("DCMMAXRETRIES"), Some(&vals(&["3"])[..]));
    }

    #[test]
    fn test_equality_ignores_attribute_order() {
        let a = AttributeSet::new()
            .with("a", vals(&["1"]))
            .with("b", vals(&["2"]));
        let b = AttributeSet::new()
            .with("b", vals(&["2"]))
            .with("a", vals(&["1"]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_apply_add_replace_remove() {
        let mut set = AttributeSet::new().with("dcmTag", vals(&["00100010"]));
        set.apply(
            "cn=x",
            &[
                Mutation::add("dcmTag", vals(&["00100020"])),
                Mutation::replace("dcmMaxRetries", vals(&["5"])),
                Mutation::remove_values("dcmTag", vals(&["00100010"])),
            ],
        )
        .unwrap();
        assert_eq!(set.get("dcmTag"), Some(&vals(&["00100020"])[..]));
        assert_eq!(set.get("dcmMaxRetries"), Some(&vals(&["5"])[..]));

        set.apply("cn=x", &[Mutation::remove("dcmMaxRetries")]).unwrap();
        assert_eq!(set.get("dcmMaxRetries"), None);
    }

    #[test]
    fn test_remove_missing_attribute_fails() {
        let mut set = AttributeSet::new();
        let err = set
            .apply("cn=x", &[Mutation::remove("dcmMaxRetries")])
            .unwrap_err();
        assert!(matches!(err, ConfError::NoSuchAttribute { .. }));
    }

    #[test]
    fn test_empty_replace_removes() {
        let mut set = AttributeSet::new().with("a", vals(&["1"]));
        set.apply("cn=x", &[Mutation::replace("a", vec![])]).unwrap();
        assert!(set.is_empty());
    }
}
