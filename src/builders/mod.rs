//! Resource builders.
//!
//! Each builder takes a validated, fully-resolved configuration object
//! and returns a typed [`ResourceSpec`](crate::assembly::ResourceSpec)
//! plus the cross-reference records it requires. Builders are pure with
//! respect to their inputs: cross-resource needs (table grants, route
//! integrations) are emitted as explicit records rather than performed
//! inline, so grant derivation stays inspectable and testable on its own.
//!
//! Logical naming is a policy, not a side effect: the declared `name`
//! field wins, falling back to the fragment's file or folder stem.

pub mod api;
pub mod function;
pub mod policy;
pub mod site;
pub mod table;

use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::json_kind;
use crate::error::ValidationError;

/// Reads a required string field.
pub(crate) fn require_str<'v>(
    config: &'v serde_json::Map<String, Value>,
    field: &str,
    context: &str,
) -> Result<&'v str, ValidationError> {
    config
        .get(field)
        .ok_or_else(|| ValidationError::shape(context, field, "is missing"))?
        .as_str()
        .ok_or_else(|| {
            ValidationError::shape(
                context,
                field,
                format!(
                    "must be a string, got {}",
                    json_kind(&config[field])
                ),
            )
        })
}

/// Reads a required unsigned integer field.
pub(crate) fn require_u64(
    config: &serde_json::Map<String, Value>,
    field: &str,
    context: &str,
) -> Result<u64, ValidationError> {
    config
        .get(field)
        .ok_or_else(|| ValidationError::shape(context, field, "is missing"))?
        .as_u64()
        .ok_or_else(|| {
            ValidationError::shape(
                context,
                field,
                format!(
                    "must be a non-negative integer, got {}",
                    json_kind(&config[field])
                ),
            )
        })
}

/// Reads a required boolean field.
pub(crate) fn require_bool(
    config: &serde_json::Map<String, Value>,
    field: &str,
    context: &str,
) -> Result<bool, ValidationError> {
    config
        .get(field)
        .ok_or_else(|| ValidationError::shape(context, field, "is missing"))?
        .as_bool()
        .ok_or_else(|| {
            ValidationError::shape(
                context,
                field,
                format!("must be a boolean, got {}", json_kind(&config[field])),
            )
        })
}

/// Reads an optional string field.
pub(crate) fn optional_str(
    config: &serde_json::Map<String, Value>,
    field: &str,
) -> Option<String> {
    config
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Reads an optional unsigned integer field.
pub(crate) fn optional_u64(config: &serde_json::Map<String, Value>, field: &str) -> Option<u64> {
    config.get(field).and_then(Value::as_u64)
}

/// Reads an optional string-valued mapping, coercing scalar values to
/// strings (numbers and booleans are stringified, as fragment authors
/// routinely write `"PORT": 8000`).
pub(crate) fn string_map(
    config: &serde_json::Map<String, Value>,
    field: &str,
    context: &str,
) -> Result<BTreeMap<String, String>, ValidationError> {
    let Some(value) = config.get(field) else {
        return Ok(BTreeMap::new());
    };
    let Some(map) = value.as_object() else {
        return Err(ValidationError::shape(
            context,
            field,
            format!("must be a mapping, got {}", json_kind(value)),
        ));
    };
    map.iter()
        .map(|(k, v)| {
            let s = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(ValidationError::shape(
                        context,
                        format!("{field}.{k}"),
                        format!("must be a scalar, got {}", json_kind(other)),
                    ))
                }
            };
            Ok((k.clone(), s))
        })
        .collect()
}
