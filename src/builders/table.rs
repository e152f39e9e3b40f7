//! Storage table builder.
//!
//! Takes a resolved table fragment (defaults already merged underneath)
//! and produces a typed [`TableSpec`]. Key attribute types, billing
//! mode, stream mode, and projections are upper-cased before lookup;
//! values outside their closed sets are rejected rather than silently
//! coerced to a fallback.

use serde_json::Value;

use crate::assembly::{
    AttributeType, BillingMode, KeyAttribute, Projection, ResourceProperties, ResourceSpec,
    SecondaryIndex, StreamView, TableSpec,
};
use crate::context::EnvironmentContext;
use crate::config::ResolvedConfig;
use crate::error::{Result, ValidationError};
use crate::validate::{apply, Rule};

use super::{optional_u64, require_bool, require_str, string_map};

/// Validation rules applied before construction.
const RULES: &[Rule<'static>] = &[
    Rule::RequiredFields(&["table_name", "partition_key", "billing_mode", "pitr", "kms_alias"]),
    Rule::RequiredShape {
        field: "partition_key",
        subfields: &["name", "type"],
    },
    Rule::NonEmpty("table_name"),
    Rule::NonEmpty("kms_alias"),
];

/// Builds a table spec from a resolved fragment.
///
/// # Errors
///
/// Returns a [`ValidationError`] for missing fields, malformed key
/// shapes, or closed-set values outside their sets.
pub fn build(config: &ResolvedConfig, ctx: &EnvironmentContext) -> Result<ResourceSpec> {
    let logical_name = config.logical_name();
    let context = format!("Table configuration for {logical_name}");
    let conf = &config.value;

    apply(RULES, conf, &context)?;
    if conf.contains_key("sort_key") {
        apply(
            &[Rule::RequiredShape {
                field: "sort_key",
                subfields: &["name", "type"],
            }],
            conf,
            &context,
        )?;
    }

    let partition_key = key_attribute(&conf["partition_key"], "partition_key", &context)?;
    let sort_key = conf
        .get("sort_key")
        .map(|v| key_attribute(v, "sort_key", &context))
        .transpose()?;

    let billing = billing_mode(conf, &context)?;
    let pitr = require_bool(conf, "pitr", &context)?;
    let stream = conf
        .get("stream")
        .and_then(Value::as_str)
        .map(|s| stream_view(s, &context))
        .transpose()?;

    let global_secondary_indexes = secondary_indexes(conf, &context)?;
    let tags = string_map(conf, "tags", &context)?;

    let spec = TableSpec {
        table_name: require_str(conf, "table_name", &context)?.to_string(),
        partition_key,
        sort_key,
        billing,
        pitr,
        kms_alias: require_str(conf, "kms_alias", &context)?.to_string(),
        ttl_attribute: conf
            .get("ttl_attribute")
            .and_then(Value::as_str)
            .map(str::to_string),
        stream,
        global_secondary_indexes,
        tags,
    };

    Ok(ResourceSpec {
        logical_name,
        retain_on_delete: ctx.retain_resources(),
        source: config.source.clone(),
        properties: ResourceProperties::Table(spec),
    })
}

/// Parses a `{name, type}` key attribute.
fn key_attribute(value: &Value, field: &str, context: &str) -> Result<KeyAttribute> {
    let map = value
        .as_object()
        .ok_or_else(|| ValidationError::shape(context, field, "must be a mapping"))?;
    let name = require_str(map, "name", context)?;
    let type_str = require_str(map, "type", context)?;
    let attr_type = match type_str.to_uppercase().as_str() {
        "STRING" => AttributeType::String,
        "NUMBER" => AttributeType::Number,
        "BINARY" => AttributeType::Binary,
        _ => {
            return Err(ValidationError::InvalidEnum {
                context: context.to_string(),
                field: format!("{field}.type"),
                value: type_str.to_string(),
                allowed: String::from("STRING, NUMBER, BINARY"),
            }
            .into())
        }
    };
    Ok(KeyAttribute {
        name: name.to_string(),
        attr_type,
    })
}

/// Parses the billing mode. Capacity units are honored only for
/// provisioned tables; they are ignored for on-demand tables, matching
/// how the provisioning layer treats them.
fn billing_mode(conf: &serde_json::Map<String, Value>, context: &str) -> Result<BillingMode> {
    let raw = require_str(conf, "billing_mode", context)?;
    match raw.to_uppercase().as_str() {
        "PROVISIONED" => Ok(BillingMode::Provisioned {
            rcu: optional_u64(conf, "rcu"),
            wcu: optional_u64(conf, "wcu"),
        }),
        "PAY_PER_REQUEST" => Ok(BillingMode::PayPerRequest),
        _ => Err(ValidationError::InvalidEnum {
            context: context.to_string(),
            field: String::from("billing_mode"),
            value: raw.to_string(),
            allowed: String::from("PROVISIONED, PAY_PER_REQUEST"),
        }
        .into()),
    }
}

/// Parses a stream view identifier.
fn stream_view(raw: &str, context: &str) -> Result<StreamView> {
    match raw.to_uppercase().as_str() {
        "NEW_IMAGE" => Ok(StreamView::NewImage),
        "OLD_IMAGE" => Ok(StreamView::OldImage),
        "NEW_AND_OLD_IMAGES" => Ok(StreamView::NewAndOldImages),
        "KEYS_ONLY" => Ok(StreamView::KeysOnly),
        _ => Err(ValidationError::InvalidEnum {
            context: context.to_string(),
            field: String::from("stream"),
            value: raw.to_string(),
            allowed: String::from("NEW_IMAGE, OLD_IMAGE, NEW_AND_OLD_IMAGES, KEYS_ONLY"),
        }
        .into()),
    }
}

/// Parses the optional global secondary index list.
fn secondary_indexes(
    conf: &serde_json::Map<String, Value>,
    context: &str,
) -> Result<Vec<SecondaryIndex>> {
    let Some(value) = conf.get("global_secondary_indexes") else {
        return Ok(Vec::new());
    };
    let items = value.as_array().ok_or_else(|| {
        ValidationError::shape(context, "global_secondary_indexes", "must be a list")
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let gsi_context = format!("{context} GSI #{i}");
            let map = item.as_object().ok_or_else(|| {
                ValidationError::shape(&gsi_context, format!("global_secondary_indexes[{i}]"), "must be a mapping")
            })?;
            apply(
                &[
                    Rule::RequiredFields(&["index_name", "partition_key", "projection"]),
                    Rule::RequiredShape {
                        field: "partition_key",
                        subfields: &["name", "type"],
                    },
                ],
                map,
                &gsi_context,
            )?;
            if map.contains_key("sort_key") {
                apply(
                    &[Rule::RequiredShape {
                        field: "sort_key",
                        subfields: &["name", "type"],
                    }],
                    map,
                    &gsi_context,
                )?;
            }

            let raw_projection = require_str(map, "projection", &gsi_context)?;
            let projection = match raw_projection.to_uppercase().as_str() {
                "ALL" => Projection::All,
                "KEYS_ONLY" => Projection::KeysOnly,
                "INCLUDE" => Projection::Include,
                _ => {
                    return Err(ValidationError::InvalidEnum {
                        context: gsi_context.clone(),
                        field: String::from("projection"),
                        value: raw_projection.to_string(),
                        allowed: String::from("ALL, KEYS_ONLY, INCLUDE"),
                    }
                    .into())
                }
            };

            Ok(SecondaryIndex {
                index_name: require_str(map, "index_name", &gsi_context)?.to_string(),
                partition_key: key_attribute(&map["partition_key"], "partition_key", &gsi_context)?,
                sort_key: map
                    .get("sort_key")
                    .map(|v| key_attribute(v, "sort_key", &gsi_context))
                    .transpose()?,
                projection,
                rcu: optional_u64(map, "rcu"),
                wcu: optional_u64(map, "wcu"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoomError;
    use serde_json::json;
    use std::path::PathBuf;

    fn ctx(env: &str) -> EnvironmentContext {
        EnvironmentContext {
            env_name: env.to_string(),
            account_id: String::from("111122223333"),
            region: String::from("eu-west-1"),
            partition: String::from("aws"),
            branch: env.to_string(),
            github: crate::context::GithubConfig {
                owner: String::from("acme"),
                repo: String::from("odyssey"),
            },
            connection_id: None,
            connection_arn: None,
        }
    }

    fn resolved(name: &str, value: Value) -> ResolvedConfig {
        ResolvedConfig {
            source: PathBuf::from(format!("configs/tables/{name}.json")),
            value: value.as_object().unwrap().clone(),
        }
    }

    fn minimal() -> Value {
        json!({
            "table_name": "messages-dev",
            "partition_key": {"name": "pk", "type": "STRING"},
            "billing_mode": "PAY_PER_REQUEST",
            "pitr": true,
            "kms_alias": "alias/chat-dev"
        })
    }

    #[test]
    fn test_build_minimal_table() {
        let spec = build(&resolved("messages", minimal()), &ctx("dev")).unwrap();
        assert_eq!(spec.logical_name, "messages");
        assert!(!spec.retain_on_delete);
        let ResourceProperties::Table(table) = &spec.properties else {
            panic!("expected table properties");
        };
        assert_eq!(table.table_name, "messages-dev");
        assert_eq!(table.partition_key.attr_type, AttributeType::String);
        assert_eq!(table.billing, BillingMode::PayPerRequest);
        assert!(table.sort_key.is_none());
    }

    #[test]
    fn test_declared_name_wins_over_stem() {
        let mut value = minimal();
        value["name"] = json!("chat-messages");
        let spec = build(&resolved("messages", value), &ctx("dev")).unwrap();
        assert_eq!(spec.logical_name, "chat-messages");
    }

    #[test]
    fn test_main_environment_retains() {
        let spec = build(&resolved("messages", minimal()), &ctx("main")).unwrap();
        assert!(spec.retain_on_delete);
    }

    #[test]
    fn test_missing_fields_batched() {
        let conf = resolved("messages", json!({"table_name": "m"}));
        let err = build(&conf, &ctx("dev")).unwrap_err();
        match err {
            LoomError::Validation(ValidationError::MissingFields { fields, .. }) => {
                assert_eq!(
                    fields,
                    vec!["partition_key", "billing_mode", "pitr", "kms_alias"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_billing_mode_rejected() {
        let mut value = minimal();
        value["billing_mode"] = json!("ON_DEMAND");
        let err = build(&resolved("messages", value), &ctx("dev")).unwrap_err();
        assert!(matches!(
            err,
            LoomError::Validation(ValidationError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn test_invalid_enum_reports_value_as_written() {
        let mut value = minimal();
        value["billing_mode"] = json!("on_demand");
        let err = build(&resolved("messages", value), &ctx("dev")).unwrap_err();
        match err {
            LoomError::Validation(ValidationError::InvalidEnum { value, .. }) => {
                assert_eq!(value, "on_demand");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_billing_mode_case_insensitive() {
        let mut value = minimal();
        value["billing_mode"] = json!("pay_per_request");
        assert!(build(&resolved("messages", value), &ctx("dev")).is_ok());
    }

    #[test]
    fn test_provisioned_capacity_carried() {
        let mut value = minimal();
        value["billing_mode"] = json!("PROVISIONED");
        value["rcu"] = json!(5);
        value["wcu"] = json!(2);
        let spec = build(&resolved("messages", value), &ctx("dev")).unwrap();
        let ResourceProperties::Table(table) = &spec.properties else {
            panic!("expected table properties");
        };
        assert_eq!(
            table.billing,
            BillingMode::Provisioned {
                rcu: Some(5),
                wcu: Some(2)
            }
        );
    }

    #[test]
    fn test_sort_key_shape_enforced() {
        let mut value = minimal();
        value["sort_key"] = json!({"name": "sk"});
        let err = build(&resolved("messages", value), &ctx("dev")).unwrap_err();
        assert!(err.to_string().contains("sort_key"));
    }

    #[test]
    fn test_invalid_attribute_type_rejected() {
        let mut value = minimal();
        value["partition_key"] = json!({"name": "pk", "type": "FLOAT"});
        let err = build(&resolved("messages", value), &ctx("dev")).unwrap_err();
        assert!(matches!(
            err,
            LoomError::Validation(ValidationError::InvalidEnum { .. })
        ));
    }

    #[test]
    fn test_stream_and_ttl_optional_fields() {
        let mut value = minimal();
        value["stream"] = json!("NEW_AND_OLD_IMAGES");
        value["ttl_attribute"] = json!("expires_at");
        let spec = build(&resolved("messages", value), &ctx("dev")).unwrap();
        let ResourceProperties::Table(table) = &spec.properties else {
            panic!("expected table properties");
        };
        assert_eq!(table.stream, Some(StreamView::NewAndOldImages));
        assert_eq!(table.ttl_attribute.as_deref(), Some("expires_at"));
    }

    #[test]
    fn test_gsi_validation() {
        let mut value = minimal();
        value["global_secondary_indexes"] = json!([{
            "index_name": "by-user",
            "partition_key": {"name": "user_id", "type": "STRING"},
            "projection": "ALL"
        }]);
        let spec = build(&resolved("messages", value), &ctx("dev")).unwrap();
        let ResourceProperties::Table(table) = &spec.properties else {
            panic!("expected table properties");
        };
        assert_eq!(table.global_secondary_indexes.len(), 1);
        assert_eq!(table.global_secondary_indexes[0].projection, Projection::All);
    }

    #[test]
    fn test_gsi_missing_projection_rejected() {
        let mut value = minimal();
        value["global_secondary_indexes"] = json!([{
            "index_name": "by-user",
            "partition_key": {"name": "user_id", "type": "STRING"}
        }]);
        let err = build(&resolved("messages", value), &ctx("dev")).unwrap_err();
        assert!(err.to_string().contains("projection"));
    }
}
