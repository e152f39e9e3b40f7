//! Declarative validation rules for resolved configuration.
//!
//! Rules are declared once per resource kind as an ordered slice and
//! applied in order before the builder constructs anything. Validation
//! is pure and total: it never mutates its input, and running it twice
//! on the same configuration always yields the same verdict.
//!
//! Field-shape rules surface the first failure immediately;
//! required-fields and allowed-fields rules batch every offending key
//! into one error so the operator fixes the fragment in a single pass.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::config::{json_kind, FragmentObject};
use crate::error::ValidationError;

/// One declarative check bound to a field path.
#[derive(Debug, Clone, Copy)]
pub enum Rule<'a> {
    /// Every named top-level key must be present. Missing keys are
    /// reported together.
    RequiredFields(&'a [&'a str]),

    /// The named field must be a mapping containing every named
    /// subfield. Missing subfields are reported together.
    RequiredShape {
        /// Top-level field holding the mapping.
        field: &'a str,
        /// Subfields the mapping must contain.
        subfields: &'a [&'a str],
    },

    /// The field's value must be one of a fixed set. Comparison is
    /// case-sensitive unless `lowercase` is set, in which case the value
    /// is lower-cased before lookup (runtime and integration
    /// identifiers use this).
    EnumMembership {
        /// Field path, dotted for nested access.
        field: &'a str,
        /// Allowed values.
        allowed: &'a [&'a str],
        /// Lower-case the value before comparing.
        lowercase: bool,
    },

    /// The field must be a string, list, or map with length > 0.
    NonEmpty(&'a str),

    /// Top-level keys are restricted to the named set. Extra keys are
    /// reported together, sorted.
    AllowedFields(&'a [&'a str]),

    /// The field's value must be a logical name already present in the
    /// named assembly registry.
    ReferenceExists {
        /// Field path, dotted for nested access.
        field: &'a str,
        /// Registry label for error messages (e.g. "table", "function").
        registry: &'a str,
        /// Logical names registered so far.
        names: &'a BTreeSet<String>,
    },
}

/// Applies an ordered rule slice to a resolved configuration object.
///
/// # Errors
///
/// Returns the first failing rule's error; see [`Rule`] for which rules
/// batch multiple offenses into one report.
pub fn apply(
    rules: &[Rule<'_>],
    config: &FragmentObject,
    context: &str,
) -> Result<(), ValidationError> {
    for rule in rules {
        check(rule, config, context)?;
    }
    Ok(())
}

/// Applies a single rule.
fn check(rule: &Rule<'_>, config: &FragmentObject, context: &str) -> Result<(), ValidationError> {
    match rule {
        Rule::RequiredFields(fields) => {
            let missing: Vec<String> = fields
                .iter()
                .filter(|f| !config.contains_key(**f))
                .map(|f| (*f).to_string())
                .collect();
            if missing.is_empty() {
                Ok(())
            } else {
                Err(ValidationError::MissingFields {
                    context: context.to_string(),
                    fields: missing,
                })
            }
        }

        Rule::RequiredShape { field, subfields } => {
            let Some(value) = lookup(config, field) else {
                return Err(ValidationError::shape(
                    context,
                    *field,
                    "required mapping is missing",
                ));
            };
            let Some(map) = value.as_object() else {
                return Err(ValidationError::shape(
                    context,
                    *field,
                    format!("must be a mapping, got {}", json_kind(value)),
                ));
            };
            let missing: Vec<&str> = subfields
                .iter()
                .filter(|s| !map.contains_key(**s))
                .copied()
                .collect();
            if missing.is_empty() {
                Ok(())
            } else {
                Err(ValidationError::shape(
                    context,
                    *field,
                    format!("missing required subfields: {}", missing.join(", ")),
                ))
            }
        }

        Rule::EnumMembership {
            field,
            allowed,
            lowercase,
        } => {
            let Some(value) = lookup(config, field) else {
                return Err(ValidationError::shape(context, *field, "is missing"));
            };
            let Some(s) = value.as_str() else {
                return Err(ValidationError::shape(
                    context,
                    *field,
                    format!("must be a string, got {}", json_kind(value)),
                ));
            };
            let candidate = if *lowercase { s.to_lowercase() } else { s.to_string() };
            if allowed.contains(&candidate.as_str()) {
                Ok(())
            } else {
                Err(ValidationError::InvalidEnum {
                    context: context.to_string(),
                    field: (*field).to_string(),
                    value: s.to_string(),
                    allowed: allowed.join(", "),
                })
            }
        }

        Rule::NonEmpty(field) => {
            let Some(value) = lookup(config, field) else {
                return Err(ValidationError::shape(context, *field, "cannot be empty"));
            };
            let empty = match value {
                Value::String(s) => s.is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map.is_empty(),
                Value::Null => true,
                _ => false,
            };
            if empty {
                Err(ValidationError::shape(context, *field, "cannot be empty"))
            } else {
                Ok(())
            }
        }

        Rule::AllowedFields(allowed) => {
            let mut extra: Vec<String> = config
                .keys()
                .filter(|k| !allowed.contains(&k.as_str()))
                .cloned()
                .collect();
            if extra.is_empty() {
                Ok(())
            } else {
                extra.sort();
                Err(ValidationError::UnknownFields {
                    context: context.to_string(),
                    fields: extra,
                })
            }
        }

        Rule::ReferenceExists {
            field,
            registry,
            names,
        } => {
            let Some(value) = lookup(config, field) else {
                return Err(ValidationError::shape(context, *field, "is missing"));
            };
            let Some(name) = value.as_str() else {
                return Err(ValidationError::shape(
                    context,
                    *field,
                    format!("must be a string, got {}", json_kind(value)),
                ));
            };
            if names.contains(name) {
                Ok(())
            } else {
                Err(ValidationError::unresolved(context, *registry, name))
            }
        }
    }
}

/// Looks up a field by dotted path (`integration.function` descends one
/// mapping per segment).
#[must_use]
pub fn lookup<'v>(config: &'v FragmentObject, path: &str) -> Option<&'v Value> {
    let mut segments = path.split('.');
    let mut current = config.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(v: Value) -> FragmentObject {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_required_fields_pass() {
        let conf = object(json!({"a": 1, "b": 2}));
        assert!(apply(&[Rule::RequiredFields(&["a", "b"])], &conf, "Test").is_ok());
    }

    #[test]
    fn test_required_fields_batches_all_missing() {
        let conf = object(json!({"table_name": "messages"}));
        let err = apply(
            &[Rule::RequiredFields(&["table_name", "billing_mode", "kms_alias"])],
            &conf,
            "Table messages",
        )
        .unwrap_err();
        match err {
            ValidationError::MissingFields { fields, .. } => {
                assert_eq!(fields, vec!["billing_mode", "kms_alias"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_required_shape_batches_missing_subfields() {
        let conf = object(json!({"partition_key": {"name": "pk"}}));
        let err = apply(
            &[Rule::RequiredShape {
                field: "partition_key",
                subfields: &["name", "type"],
            }],
            &conf,
            "Table",
        )
        .unwrap_err();
        assert!(err.to_string().contains("type"));
    }

    #[test]
    fn test_required_shape_rejects_non_mapping() {
        let conf = object(json!({"stage": "dev"}));
        let err = apply(
            &[Rule::RequiredShape {
                field: "stage",
                subfields: &["name"],
            }],
            &conf,
            "Api",
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be a mapping"));
    }

    #[test]
    fn test_enum_membership_case_sensitive() {
        let conf = object(json!({"billing_mode": "pay_per_request"}));
        let err = apply(
            &[Rule::EnumMembership {
                field: "billing_mode",
                allowed: &["PROVISIONED", "PAY_PER_REQUEST"],
                lowercase: false,
            }],
            &conf,
            "Table",
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEnum { .. }));
    }

    #[test]
    fn test_enum_membership_lowercased_identifiers() {
        let conf = object(json!({"runtime": "Python3.12"}));
        assert!(apply(
            &[Rule::EnumMembership {
                field: "runtime",
                allowed: &["python3.12", "python3.11"],
                lowercase: true,
            }],
            &conf,
            "Function",
        )
        .is_ok());
    }

    #[test]
    fn test_non_empty_rejects_empty_collections() {
        for value in [json!({"f": ""}), json!({"f": []}), json!({"f": {}}), json!({"f": null})] {
            let err = apply(&[Rule::NonEmpty("f")], &object(value), "Test").unwrap_err();
            assert!(err.to_string().contains("cannot be empty"));
        }
    }

    #[test]
    fn test_non_empty_accepts_scalars() {
        let conf = object(json!({"f": 0}));
        assert!(apply(&[Rule::NonEmpty("f")], &conf, "Test").is_ok());
    }

    #[test]
    fn test_allowed_fields_lists_extras_sorted() {
        let conf = object(json!({"managed": [], "zeta": 1, "alpha": 2}));
        let err = apply(
            &[Rule::AllowedFields(&["managed", "inline"])],
            &conf,
            "Policy",
        )
        .unwrap_err();
        match err {
            ValidationError::UnknownFields { fields, .. } => {
                assert_eq!(fields, vec!["alpha", "zeta"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reference_exists_dotted_path() {
        let mut names = BTreeSet::new();
        names.insert(String::from("chat"));
        let conf = object(json!({"integration": {"type": "lambda", "function": "chat"}}));
        assert!(apply(
            &[Rule::ReferenceExists {
                field: "integration.function",
                registry: "function",
                names: &names,
            }],
            &conf,
            "Route",
        )
        .is_ok());
    }

    #[test]
    fn test_reference_missing_names_target() {
        let names = BTreeSet::new();
        let conf = object(json!({"table": "messages"}));
        let err = apply(
            &[Rule::ReferenceExists {
                field: "table",
                registry: "table",
                names: &names,
            }],
            &conf,
            "Grant",
        )
        .unwrap_err();
        match err {
            ValidationError::UnresolvedReference { name, registry, .. } => {
                assert_eq!(name, "messages");
                assert_eq!(registry, "table");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rules_applied_in_order() {
        // The first failing rule surfaces; later rules never run.
        let conf = object(json!({}));
        let err = apply(
            &[
                Rule::RequiredFields(&["name"]),
                Rule::NonEmpty("name"),
            ],
            &conf,
            "Test",
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::MissingFields { .. }));
    }

    #[test]
    fn test_validation_never_mutates_input() {
        let conf = object(json!({"a": {"b": 1}}));
        let before = conf.clone();
        let _ = apply(&[Rule::RequiredFields(&["a", "z"])], &conf, "Test");
        assert_eq!(conf, before);
    }
}
