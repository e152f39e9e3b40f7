//! Access-policy document builder.
//!
//! Policy fragments carry exactly two optional sections: `managed`
//! (identifiers of pre-existing managed policies) and `inline` (named
//! statement lists). The statement schema is open beyond its required
//! keys, so statements are kept as validated JSON rather than parsed
//! into a closed type.

use serde_json::Value;

use crate::assembly::{InlinePolicy, PolicyDocument};
use crate::config::{FragmentObject, ResolvedConfig};
use crate::error::{Result, ValidationError};
use crate::validate::{apply, Rule};

/// Top-level keys a policy fragment may carry.
const ALLOWED: &[&str] = &["managed", "inline"];

/// Builds a policy document from a resolved policy fragment.
///
/// # Errors
///
/// Returns a [`ValidationError`] for unknown top-level keys, malformed
/// statement lists, or statements missing their required keys.
pub fn build_document(config: &ResolvedConfig) -> Result<PolicyDocument> {
    let context = format!("Policy document {}", config.source.display());
    from_object(&config.value, &context)
}

/// Builds a policy document from an embedded policy object, as carried
/// inline by a function fragment.
///
/// # Errors
///
/// Same failures as [`build_document`].
pub fn from_object(conf: &FragmentObject, context: &str) -> Result<PolicyDocument> {
    apply(&[Rule::AllowedFields(ALLOWED)], conf, context)?;

    let managed = managed_identifiers(conf, context)?;
    let inline = inline_policies(conf, context)?;

    Ok(PolicyDocument { managed, inline })
}

/// Reads the optional `managed` list of policy identifiers.
fn managed_identifiers(conf: &FragmentObject, context: &str) -> Result<Vec<String>> {
    let Some(value) = conf.get("managed") else {
        return Ok(Vec::new());
    };
    let items = value
        .as_array()
        .ok_or_else(|| ValidationError::shape(context, "managed", "must be a list"))?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ValidationError::shape(context, "managed", "entries must be strings").into()
            })
        })
        .collect()
}

/// Reads the optional `inline` mapping of named statement lists.
fn inline_policies(conf: &FragmentObject, context: &str) -> Result<Vec<InlinePolicy>> {
    let Some(value) = conf.get("inline") else {
        return Ok(Vec::new());
    };
    let map = value
        .as_object()
        .ok_or_else(|| ValidationError::shape(context, "inline", "must be a mapping"))?;

    let mut policies = Vec::with_capacity(map.len());
    for (name, body) in map {
        if name.is_empty() {
            return Err(
                ValidationError::shape(context, "inline", "policy names cannot be empty").into(),
            );
        }
        // A bare statement object is accepted and wrapped into a
        // single-element list.
        let statements: Vec<Value> = match body {
            Value::Array(items) => items.clone(),
            Value::Object(_) => vec![body.clone()],
            other => {
                return Err(ValidationError::shape(
                    context,
                    format!("inline.{name}"),
                    format!(
                        "must be a statement or list of statements, got {}",
                        crate::config::json_kind(other)
                    ),
                )
                .into())
            }
        };

        for (i, statement) in statements.iter().enumerate() {
            check_statement(statement, name, i, context)?;
        }

        policies.push(InlinePolicy {
            name: name.clone(),
            statements,
        });
    }
    Ok(policies)
}

/// Validates one statement: `Effect` and `Action` are required, and at
/// least one of `Resource` or `NotResource` must be present.
fn check_statement(statement: &Value, policy: &str, index: usize, context: &str) -> Result<()> {
    let field = format!("inline.{policy}[{index}]");
    let map = statement
        .as_object()
        .ok_or_else(|| ValidationError::shape(context, &field, "must be a mapping"))?;

    let mut missing = Vec::new();
    for key in ["Effect", "Action"] {
        if !map.contains_key(key) {
            missing.push(key.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields {
            context: format!("{context} statement {field}"),
            fields: missing,
        }
        .into());
    }

    if !map.contains_key("Resource") && !map.contains_key("NotResource") {
        return Err(ValidationError::shape(
            context,
            field,
            "must carry Resource or NotResource",
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoomError;
    use serde_json::json;
    use std::path::PathBuf;

    fn resolved(value: Value) -> ResolvedConfig {
        ResolvedConfig {
            source: PathBuf::from("configs/policies/manage_connections.json"),
            value: value.as_object().unwrap().clone(),
        }
    }

    fn statement() -> Value {
        json!({
            "Effect": "Allow",
            "Action": ["execute-api:ManageConnections"],
            "Resource": ["arn:aws:execute-api:eu-west-1:111122223333:*/dev/POST/@connections/*"]
        })
    }

    #[test]
    fn test_empty_document() {
        let doc = build_document(&resolved(json!({}))).unwrap();
        assert!(doc.managed.is_empty());
        assert!(doc.inline.is_empty());
    }

    #[test]
    fn test_managed_and_inline_sections() {
        let doc = build_document(&resolved(json!({
            "managed": ["AWSLambdaBasicExecutionRole"],
            "inline": {"connections": [statement()]}
        })))
        .unwrap();
        assert_eq!(doc.managed, vec!["AWSLambdaBasicExecutionRole"]);
        assert_eq!(doc.inline.len(), 1);
        assert_eq!(doc.inline[0].name, "connections");
        assert_eq!(doc.inline[0].statements.len(), 1);
    }

    #[test]
    fn test_bare_statement_wrapped_into_list() {
        let doc = build_document(&resolved(json!({
            "inline": {"connections": statement()}
        })))
        .unwrap();
        assert_eq!(doc.inline[0].statements.len(), 1);
    }

    #[test]
    fn test_unknown_keys_rejected_sorted() {
        let err = build_document(&resolved(json!({
            "managed": [],
            "zeta": 1,
            "alpha": 2
        })))
        .unwrap_err();
        match err {
            LoomError::Validation(ValidationError::UnknownFields { fields, .. }) => {
                assert_eq!(fields, vec!["alpha", "zeta"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_statement_missing_keys_batched() {
        let err = build_document(&resolved(json!({
            "inline": {"broken": [{"Resource": ["*"]}]}
        })))
        .unwrap_err();
        match err {
            LoomError::Validation(ValidationError::MissingFields { fields, .. }) => {
                assert_eq!(fields, vec!["Effect", "Action"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_statement_requires_resource_or_not_resource() {
        let err = build_document(&resolved(json!({
            "inline": {"broken": [{"Effect": "Allow", "Action": "s3:GetObject"}]}
        })))
        .unwrap_err();
        assert!(err.to_string().contains("Resource"));
    }

    #[test]
    fn test_statement_with_both_resource_keys_accepted() {
        let doc = build_document(&resolved(json!({
            "inline": {"scoped": [{
                "Effect": "Allow",
                "Action": "s3:GetObject",
                "Resource": "arn:aws:s3:::data-bucket/*",
                "NotResource": "arn:aws:s3:::data-bucket/internal/*"
            }]}
        })))
        .unwrap();
        assert_eq!(doc.inline[0].statements.len(), 1);
    }

    #[test]
    fn test_not_resource_statement_accepted() {
        let doc = build_document(&resolved(json!({
            "inline": {"deny": [{
                "Effect": "Deny",
                "Action": "*",
                "NotResource": "arn:aws:s3:::allowed-bucket/*"
            }]}
        })))
        .unwrap();
        assert_eq!(doc.inline[0].name, "deny");
    }

    #[test]
    fn test_empty_inline_name_rejected() {
        let err = build_document(&resolved(json!({
            "inline": {"": [statement()]}
        })))
        .unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }
}
