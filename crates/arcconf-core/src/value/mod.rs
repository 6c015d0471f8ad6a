//! Typed field values
//!
//! Every `Value` is kept in normalized form: set-valued fields are sorted and
//! deduplicated, durations are held as milliseconds, schedules as parsed
//! ranges. Structural equality on normalized values is therefore semantic
//! equality, which is what the differ relies on.

pub mod code;
pub mod duration;
pub mod schedule;
pub mod size;

use std::collections::BTreeMap;

pub use code::Code;
pub use duration::{IsoDuration, Period};
pub use schedule::{ScheduleExpression, ScheduleRange};

/// A decoded field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Enum(String),
    Duration(IsoDuration),
    Period(Period),
    /// Size in bytes
    Size(u64),
    /// DICOM attribute tag
    Tag(u32),
    Bytes(Vec<u8>),
    /// Set or sequence of strings; sets are kept sorted
    Strings(Vec<String>),
    Codes(Vec<Code>),
    Tags(Vec<u32>),
    Schedules(Vec<ScheduleExpression>),
    Properties(BTreeMap<String, String>),
}

impl Value {
    /// Build a string list value
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Strings(items.into_iter().map(Into::into).collect())
    }

    /// Build a properties value from `(key, value)` pairs
    pub fn properties<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Value::Properties(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Short name of the variant, used in type mismatch errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "str",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Enum(_) => "enum",
            Value::Duration(_) => "duration",
            Value::Period(_) => "period",
            Value::Size(_) => "size",
            Value::Tag(_) => "tag",
            Value::Bytes(_) => "bytes",
            Value::Strings(_) => "strings",
            Value::Codes(_) => "codes",
            Value::Tags(_) => "tags",
            Value::Schedules(_) => "schedules",
            Value::Properties(_) => "properties",
        }
    }

    /// True for list-valued variants holding no elements
    pub fn is_empty_list(&self) -> bool {
        match self {
            Value::Strings(v) => v.is_empty(),
            Value::Codes(v) => v.is_empty(),
            Value::Tags(v) => v.is_empty(),
            Value::Schedules(v) => v.is_empty(),
            Value::Properties(v) => v.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<IsoDuration> for Value {
    fn from(d: IsoDuration) -> Self {
        Value::Duration(d)
    }
}

impl From<Period> for Value {
    fn from(p: Period) -> Self {
        Value::Period(p)
    }
}
