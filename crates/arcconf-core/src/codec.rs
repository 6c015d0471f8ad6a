//! Field codec: typed values to and from store attribute values
//!
//! `encode` elides values equal to the field default (and empty lists), so
//! defaults are never written to the store. `decode` restores the default
//! when the store holds nothing. For every normalized value `v`,
//! `decode(encode(v)) == v`.

use crate::errors::{ConfError, Result};
use crate::schema::{FieldDef, FieldType};
use crate::value::{size, Code, IsoDuration, Period, ScheduleExpression, Value};
use arcconf_core_types::Sensitive;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::collections::BTreeMap;

/// Attribute values for `value`, or `None` when nothing should be stored
pub fn encode(field: &FieldDef, value: Option<&Value>) -> Option<Vec<String>> {
    let value = value?;
    if field.default.as_ref() == Some(value) || value.is_empty_list() {
        return None;
    }
    Some(format_value(value))
}

/// Typed value for stored attribute values, falling back to the default
///
/// # Errors
///
/// Returns `MalformedValue` when a stored value cannot be parsed as the
/// field's type.
pub fn decode(field: &FieldDef, stored: Option<&[String]>) -> Result<Option<Value>> {
    match stored {
        None | Some([]) => Ok(field.default.clone()),
        Some(values) => parse_value(field, values).map(Some),
    }
}

/// Canonical text form of a value, one string per attribute value
pub fn format_value(value: &Value) -> Vec<String> {
    match value {
        Value::Str(s) | Value::Enum(s) => vec![s.clone()],
        Value::Int(n) => vec![n.to_string()],
        Value::Bool(true) => vec!["TRUE".to_string()],
        Value::Bool(false) => vec!["FALSE".to_string()],
        Value::Duration(d) => vec![d.to_string()],
        Value::Period(p) => vec![p.to_string()],
        Value::Size(n) => vec![size::format_size(*n)],
        Value::Tag(t) => vec![format_tag(*t)],
        Value::Bytes(b) => vec![BASE64.encode(b)],
        Value::Strings(items) => items.clone(),
        Value::Codes(codes) => codes.iter().map(Code::to_string).collect(),
        Value::Tags(tags) => tags.iter().map(|t| format_tag(*t)).collect(),
        Value::Schedules(s) => s.iter().map(ScheduleExpression::to_string).collect(),
        Value::Properties(map) => map.iter().map(|(k, v)| format!("{}={}", k, v)).collect(),
    }
}

/// Parse stored attribute values as the field's type
///
/// # Errors
///
/// Returns `MalformedValue` naming the attribute and offending text.
pub fn parse_value(field: &FieldDef, values: &[String]) -> Result<Value> {
    if field.ty.is_list() {
        return parse_list(field, values);
    }
    let text = match values {
        [single] => single.as_str(),
        _ => {
            return Err(malformed(
                field,
                &values.join(", "),
                format!("expected a single value, got {}", values.len()),
            ))
        }
    };
    let bad = |reason: String| malformed(field, text, reason);

    let value = match &field.ty {
        FieldType::Str if text.is_empty() => return Err(bad("empty string".to_string())),
        FieldType::Str => Value::Str(text.to_string()),
        FieldType::Enum(variants) => {
            if !variants.iter().any(|v| v == text) {
                return Err(bad(format!("not one of {}", variants.join(", "))));
            }
            Value::Enum(text.to_string())
        }
        FieldType::Int => Value::Int(text.trim().parse().map_err(|_| bad("not an integer".into()))?),
        FieldType::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if text.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                return Err(bad("not TRUE or FALSE".to_string()));
            }
        }
        FieldType::Duration => Value::Duration(text.parse::<IsoDuration>().map_err(bad)?),
        FieldType::Period => Value::Period(text.parse::<Period>().map_err(bad)?),
        FieldType::Size => Value::Size(size::parse_size(text).map_err(bad)?),
        FieldType::Tag => Value::Tag(parse_tag(text).map_err(bad)?),
        FieldType::Bytes => {
            let bytes = BASE64
                .decode(text.trim())
                .map_err(|e| bad(format!("invalid base64: {}", e)))?;
            if bytes.is_empty() {
                return Err(bad("empty binary value".to_string()));
            }
            Value::Bytes(bytes)
        }
        // List types return above
        _ => return Err(bad(format!("{} is not a scalar type", field.ty.name()))),
    };
    Ok(value)
}

fn parse_list(field: &FieldDef, values: &[String]) -> Result<Value> {
    let value = match &field.ty {
        FieldType::StrSet | FieldType::StrSeq => {
            if let Some(empty) = values.iter().find(|v| v.is_empty()) {
                return Err(malformed(field, empty, "empty string".to_string()));
            }
            Value::Strings(values.to_vec())
        }
        FieldType::Codes => Value::Codes(
            values
                .iter()
                .map(|v| v.parse::<Code>().map_err(|r| malformed(field, v, r)))
                .collect::<Result<_>>()?,
        ),
        FieldType::Tags => Value::Tags(
            values
                .iter()
                .map(|v| parse_tag(v).map_err(|r| malformed(field, v, r)))
                .collect::<Result<_>>()?,
        ),
        FieldType::Schedules => Value::Schedules(
            values
                .iter()
                .map(|v| v.parse::<ScheduleExpression>().map_err(|r| malformed(field, v, r)))
                .collect::<Result<_>>()?,
        ),
        FieldType::Properties => {
            let mut map = BTreeMap::new();
            for v in values {
                let (key, val) = v
                    .split_once('=')
                    .ok_or_else(|| malformed(field, v, "expected key=value".to_string()))?;
                if key.is_empty() {
                    return Err(malformed(field, v, "empty property key".to_string()));
                }
                if map.insert(key.to_string(), val.to_string()).is_some() {
                    return Err(malformed(field, v, format!("property {} repeated", key)));
                }
            }
            Value::Properties(map)
        }
        _ => {
            return Err(malformed(
                field,
                &values.join(", "),
                format!("{} is not a list type", field.ty.name()),
            ))
        }
    };
    Ok(canonicalize(&field.ty, value))
}

/// Check a caller-supplied value against the field type and bring it into
/// canonical form
///
/// Text given for a non-text field (`"PT30S"` for a duration) is parsed as
/// if it were a single stored value, so a list field gets one element.
///
/// # Errors
///
/// `TypeMismatch` when the value variant does not fit the field type,
/// `InvalidValue` when it fits but is not acceptable.
pub fn normalize(field: &FieldDef, value: Value) -> Result<Value> {
    let invalid = |reason: &str| ConfError::InvalidValue {
        field: field.name.clone(),
        reason: reason.to_string(),
    };

    let value = match (&field.ty, value) {
        (FieldType::Str, Value::Str(s)) => {
            if s.is_empty() {
                return Err(invalid("empty string"));
            }
            Value::Str(s)
        }
        (FieldType::Enum(variants), Value::Str(s) | Value::Enum(s)) => {
            if !variants.contains(&s) {
                return Err(invalid(&format!("{:?} is not one of {}", s, variants.join(", "))));
            }
            Value::Enum(s)
        }
        (ty, Value::Str(text)) if *ty != FieldType::Bytes => {
            parse_value(field, &[text]).map_err(|e| invalid(&e.to_string()))?
        }
        (FieldType::Bytes, Value::Bytes(b)) => {
            if b.is_empty() {
                return Err(invalid("empty binary value"));
            }
            Value::Bytes(b)
        }
        (FieldType::Int, v @ Value::Int(_))
        | (FieldType::Bool, v @ Value::Bool(_))
        | (FieldType::Duration, v @ Value::Duration(_))
        | (FieldType::Period, v @ Value::Period(_))
        | (FieldType::Size, v @ Value::Size(_))
        | (FieldType::Tag, v @ Value::Tag(_))
        | (FieldType::Tags, v @ Value::Tags(_))
        | (FieldType::Schedules, v @ Value::Schedules(_)) => v,
        (FieldType::StrSet | FieldType::StrSeq, Value::Strings(items)) => {
            if items.iter().any(String::is_empty) {
                return Err(invalid("empty string in list"));
            }
            Value::Strings(items)
        }
        (FieldType::Codes, Value::Codes(codes)) => {
            let bad = codes.iter().any(|c| {
                c.value.is_empty()
                    || c.designator.is_empty()
                    || c.value.contains('^')
                    || c.designator.contains('^')
            });
            if bad {
                return Err(invalid("code value and designator must be non-empty without '^'"));
            }
            Value::Codes(codes)
        }
        (FieldType::Properties, Value::Properties(map)) => {
            if map.keys().any(|k| k.is_empty() || k.contains('=')) {
                return Err(invalid("property keys must be non-empty without '='"));
            }
            Value::Properties(map)
        }
        (ty, _) => {
            return Err(ConfError::TypeMismatch {
                field: field.name.clone(),
                expected: ty.name().to_string(),
            })
        }
    };
    Ok(canonicalize(&field.ty, value))
}

/// Sort and deduplicate unordered list types
///
/// Schedule lists keep the given order; each expression is already
/// canonical once parsed.
fn canonicalize(ty: &FieldType, value: Value) -> Value {
    match (ty, value) {
        (FieldType::StrSet, Value::Strings(mut items)) => {
            items.sort();
            items.dedup();
            Value::Strings(items)
        }
        (FieldType::Codes, Value::Codes(mut codes)) => {
            codes.sort();
            codes.dedup();
            Value::Codes(codes)
        }
        (FieldType::Tags, Value::Tags(mut tags)) => {
            tags.sort_unstable();
            tags.dedup();
            Value::Tags(tags)
        }
        (_, value) => value,
    }
}

fn format_tag(tag: u32) -> String {
    format!("{:08X}", tag)
}

fn parse_tag(text: &str) -> std::result::Result<u32, String> {
    if text.len() != 8 {
        return Err(format!("tag {:?} is not 8 hex digits", text));
    }
    u32::from_str_radix(text, 16).map_err(|_| format!("tag {:?} is not hexadecimal", text))
}

fn malformed(field: &FieldDef, value: &str, reason: String) -> ConfError {
    let value = if field.sensitive {
        Sensitive::new(value).to_string()
    } else {
        value.to_string()
    };
    ConfError::MalformedValue {
        attribute: field.attribute.clone(),
        value,
        reason,
    }
}
