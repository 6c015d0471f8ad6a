//! Hierarchical store paths
//!
//! A [`Path`] is a sequence of relative distinguished names, leaf first,
//! written the LDAP way: `dcmQueueName=Q1,dicomDeviceName=arc,cn=Devices`.
//! Attribute values are escaped per RFC 4514 and multi-valued RDNs join
//! their `attr=value` pairs with `+`.
//!
//! Equality, hashing and ordering use a normalized form that ignores case
//! and the order of pairs within an RDN, matching how directory servers
//! compare names.

use crate::errors::{ConfError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// One path component: one or more `attribute=value` pairs
#[derive(Clone, Debug)]
pub struct Rdn {
    pairs: Vec<(String, String)>,
    norm: String,
}

impl Rdn {
    /// Build from unescaped `(attribute, value)` pairs
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        let mut parts: Vec<String> = pairs
            .iter()
            .map(|(attr, value)| {
                format!("{}={}", attr.to_lowercase(), escape_value(&value.to_lowercase()))
            })
            .collect();
        parts.sort();
        Self {
            pairs,
            norm: parts.join("+"),
        }
    }

    pub fn single(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(vec![(attribute.into(), value.into())])
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Value of `attribute` in this RDN, matched case-insensitively
    pub fn value_of(&self, attribute: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(a, _)| a.eq_ignore_ascii_case(attribute))
            .map(|(_, v)| v.as_str())
    }

    pub fn normalized(&self) -> &str {
        &self.norm
    }
}

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        self.norm == other.norm
    }
}

impl Eq for Rdn {}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (attr, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{}={}", attr, escape_value(value))?;
        }
        Ok(())
    }
}

/// Store path, leaf RDN first
#[derive(Clone, Debug, Default)]
pub struct Path {
    rdns: Vec<Rdn>,
    norm: String,
}

impl Path {
    /// Path made of the given RDNs, leaf first
    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        let norm = rdns
            .iter()
            .map(Rdn::normalized)
            .collect::<Vec<_>>()
            .join(",");
        Self { rdns, norm }
    }

    /// Parse an RFC 4514 string
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` for a missing `=`, an empty attribute type, a
    /// dangling or malformed escape, or escaped bytes that are not UTF-8.
    pub fn parse(text: &str) -> Result<Self> {
        let err = |reason: &str| ConfError::InvalidPath {
            path: text.to_string(),
            reason: reason.to_string(),
        };
        if text.trim().is_empty() {
            return Ok(Path::default());
        }

        let mut rdns = Vec::new();
        let mut pairs = Vec::new();
        let mut attr = String::new();
        let mut value: Vec<u8> = Vec::new();
        let mut in_value = false;
        let mut chars = text.chars().peekable();

        let finish_pair = |attr: &mut String,
                           value: &mut Vec<u8>,
                           in_value: &mut bool,
                           pairs: &mut Vec<(String, String)>|
         -> Result<()> {
            let name = attr.trim();
            if !*in_value {
                return Err(err("attribute without '='"));
            }
            if name.is_empty() {
                return Err(err("empty attribute type"));
            }
            let v = String::from_utf8(std::mem::take(value))
                .map_err(|_| err("escaped bytes are not UTF-8"))?;
            pairs.push((name.to_string(), v));
            attr.clear();
            *in_value = false;
            Ok(())
        };

        while let Some(c) = chars.next() {
            if !in_value {
                match c {
                    '=' => in_value = true,
                    ',' | '+' => return Err(err("attribute without '='")),
                    _ => attr.push(c),
                }
                continue;
            }
            match c {
                '\\' => {
                    let first = chars.next().ok_or_else(|| err("dangling escape"))?;
                    if first.is_ascii_hexdigit() {
                        let second = chars
                            .next()
                            .filter(char::is_ascii_hexdigit)
                            .ok_or_else(|| err("malformed hex escape"))?;
                        let byte = u8::from_str_radix(&format!("{}{}", first, second), 16)
                            .map_err(|_| err("malformed hex escape"))?;
                        value.push(byte);
                    } else {
                        let mut buf = [0u8; 4];
                        value.extend_from_slice(first.encode_utf8(&mut buf).as_bytes());
                    }
                }
                '+' => finish_pair(&mut attr, &mut value, &mut in_value, &mut pairs)?,
                ',' => {
                    finish_pair(&mut attr, &mut value, &mut in_value, &mut pairs)?;
                    rdns.push(Rdn::new(std::mem::take(&mut pairs)));
                    while chars.peek() == Some(&' ') {
                        chars.next();
                    }
                }
                _ => {
                    let mut buf = [0u8; 4];
                    value.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
        finish_pair(&mut attr, &mut value, &mut in_value, &mut pairs)?;
        rdns.push(Rdn::new(pairs));
        Ok(Path::from_rdns(rdns))
    }

    /// Child path one level below this one
    pub fn child(&self, rdn: Rdn) -> Path {
        let mut rdns = Vec::with_capacity(self.rdns.len() + 1);
        rdns.push(rdn);
        rdns.extend(self.rdns.iter().cloned());
        Path::from_rdns(rdns)
    }

    pub fn parent(&self) -> Option<Path> {
        if self.rdns.is_empty() {
            return None;
        }
        Some(Path::from_rdns(self.rdns[1..].to_vec()))
    }

    /// Leaf RDN
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    pub fn depth(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Whether `self` lies strictly below `ancestor`
    pub fn is_descendant_of(&self, ancestor: &Path) -> bool {
        self.rdns.len() > ancestor.rdns.len()
            && self.rdns[self.rdns.len() - ancestor.rdns.len()..]
                .iter()
                .zip(&ancestor.rdns)
                .all(|(a, b)| a == b)
    }

    /// Whether `self` is exactly one level below `parent`
    pub fn is_child_of(&self, parent: &Path) -> bool {
        self.rdns.len() == parent.rdns.len() + 1 && self.is_descendant_of(parent)
    }

    /// Case and pair-order insensitive form used for comparison
    pub fn normalized(&self) -> &str {
        &self.norm
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.norm == other.norm
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.norm.hash(state);
    }
}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Path {
    fn cmp(&self, other: &Self) -> Ordering {
        self.norm.cmp(&other.norm)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", rdn)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Path::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Escape an attribute value for use in a path string
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        match c {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                out.push('\\');
                out.push(c);
            }
            '#' if i == 0 => out.push_str("\\#"),
            ' ' if i == 0 || i == last => out.push_str("\\ "),
            '\0' => out.push_str("\\00"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_and_display() {
        let path = Path::parse("dcmQueueName=Q1,dicomDeviceName=arc,cn=Devices").unwrap();
        assert_eq!(path.depth(), 3);
        assert_eq!(path.rdn().unwrap().value_of("dcmqueuename"), Some("Q1"));
        assert_eq!(path.to_string(), "dcmQueueName=Q1,dicomDeviceName=arc,cn=Devices");
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = Path::parse("cn=Rule1,dicomDeviceName=arc").unwrap();
        let b = Path::parse("CN=rule1,DICOMDEVICENAME=ARC").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_multi_valued_rdn_order_is_irrelevant() {
        let a = Path::parse("dcmAttributeSetType=WADO_RS+dcmAttributeSetID=x,cn=d").unwrap();
        let b = Path::parse("dcmAttributeSetID=x+dcmAttributeSetType=WADO_RS,cn=d").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rdn().unwrap().pairs().len(), 2);
    }

    #[test]
    fn test_escaped_specials() {
        let rdn = Rdn::single("cn", "a,b+c=d");
        let path = Path::from_rdns(vec![rdn]);
        assert_eq!(path.to_string(), "cn=a\\,b\\+c\\=d");
        let back = Path::parse(&path.to_string()).unwrap();
        assert_eq!(back.rdn().unwrap().value_of("cn"), Some("a,b+c=d"));
    }

    #[test]
    fn test_hex_escape() {
        let path = Path::parse("cn=caf\\C3\\A9").unwrap();
        assert_eq!(path.rdn().unwrap().value_of("cn"), Some("café"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Path::parse("cn").is_err());
        assert!(Path::parse("=x").is_err());
        assert!(Path::parse("cn=x\\").is_err());
        assert!(Path::parse("cn=\\zz").is_ok());
        assert!(Path::parse("cn=\\4").is_err());
    }

    #[test]
    fn test_parent_child_relations() {
        let device = Path::parse("dicomDeviceName=arc,cn=Devices").unwrap();
        let queue = device.child(Rdn::single("dcmQueueName", "Q1"));
        assert!(queue.is_child_of(&device));
        assert!(queue.is_descendant_of(&device.parent().unwrap()));
        assert!(!device.is_descendant_of(&queue));
        assert_eq!(queue.parent().unwrap(), device);
    }

    proptest! {
        #[test]
        fn prop_display_parse_round_trip(value in "\\PC{1,16}") {
            let path = Path::from_rdns(vec![Rdn::single("cn", value.clone()), Rdn::single("dc", "x")]);
            let parsed = Path::parse(&path.to_string()).unwrap();
            prop_assert_eq!(parsed.rdn().unwrap().value_of("cn"), Some(value.as_str()));
        }
    }
}
