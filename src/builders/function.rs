//! Compute function builder.
//!
//! Functions are folder-based: the orchestrator merges the folder's
//! `config*.json` fragments and fills category defaults before this
//! builder runs, so every required field is present by the time the
//! configuration arrives here unless the author removed one explicitly.
//!
//! Table grants are not performed inline. Each `table_access` entry is
//! validated against the registry of already-built tables and emitted
//! as a [`CrossReference`] record for the graph to check and carry.

use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

use crate::assembly::{
    AccessLevel, CrossReference, FunctionSpec, ReferenceKind, ResourceProperties, ResourceSpec,
    Runtime, TableAccess,
};
use crate::config::{ConfigStore, ResolvedConfig};
use crate::context::EnvironmentContext;
use crate::error::{Result, ValidationError};
use crate::validate::{apply, Rule};

use super::{optional_str, require_str, require_u64, string_map};

/// Validation rules applied before construction.
const RULES: &[Rule<'static>] = &[
    Rule::RequiredFields(&["name", "runtime", "handler", "memory", "timeout"]),
    Rule::NonEmpty("name"),
    Rule::NonEmpty("handler"),
];

/// Builds a function spec plus the table-grant references it declares.
///
/// `tables` is the registry of logical table names built so far; every
/// `table_access` entry must name one of them.
///
/// # Errors
///
/// Returns a [`ValidationError`] for missing fields, unsupported
/// runtimes or access levels, or grants naming unregistered tables.
/// Policy-file resolution failures surface as configuration errors.
pub fn build(
    config: &ResolvedConfig,
    tables: &BTreeSet<String>,
    store: &ConfigStore,
    ctx: &EnvironmentContext,
) -> Result<(ResourceSpec, Vec<CrossReference>)> {
    let logical_name = config.logical_name();
    let context = format!("Function configuration for {logical_name}");
    let conf = &config.value;

    apply(RULES, conf, &context)?;

    let runtime_id = require_str(conf, "runtime", &context)?.to_lowercase();
    let runtime = Runtime::parse(&runtime_id).ok_or_else(|| ValidationError::UnsupportedKind {
        context: context.clone(),
        field: String::from("runtime"),
        value: runtime_id,
        allowed: Runtime::IDENTIFIERS.join(", "),
    })?;

    let policy = resolve_policy(conf, config, store, &context)?;
    let references = table_grants(conf, &logical_name, tables, &context)?;

    let spec = FunctionSpec {
        function_name: optional_str(conf, "function_name"),
        runtime,
        handler: require_str(conf, "handler", &context)?.to_string(),
        memory: require_u64(conf, "memory", &context)?,
        timeout_secs: require_u64(conf, "timeout", &context)?,
        description: optional_str(conf, "description"),
        env: string_map(conf, "env", &context)?,
        tags: string_map(conf, "tags", &context)?,
        policy,
        table_access: references
            .iter()
            .filter_map(|r| match r.kind {
                ReferenceKind::TableAccess { level } => Some(TableAccess {
                    table: r.target.clone(),
                    level,
                }),
                _ => None,
            })
            .collect(),
    };

    let resource = ResourceSpec {
        logical_name,
        retain_on_delete: ctx.retain_resources(),
        source: config.source.clone(),
        properties: ResourceProperties::Function(spec),
    };
    Ok((resource, references))
}

/// Resolves the function's policy: an embedded `policy` object wins over
/// a `policy_file` reference.
fn resolve_policy(
    conf: &serde_json::Map<String, Value>,
    config: &ResolvedConfig,
    store: &ConfigStore,
    context: &str,
) -> Result<Option<crate::assembly::PolicyDocument>> {
    if let Some(embedded) = conf.get("policy") {
        let map = embedded
            .as_object()
            .ok_or_else(|| ValidationError::shape(context, "policy", "must be a mapping"))?;
        return super::policy::from_object(map, context).map(Some);
    }

    let Some(policy_file) = conf.get("policy_file").and_then(Value::as_str) else {
        return Ok(None);
    };
    // The function's own folder shadows the shared policy directory.
    let base = config.source.is_dir().then_some(config.source.as_path());
    let path = store.resolve_policy_path(policy_file, base)?;
    debug!("Resolved policy file for {context}: {}", path.display());
    let resolved = store.load_path(&path)?;
    super::policy::build_document(&resolved).map(Some)
}

/// Validates the declared `table_access` grants and turns them into
/// cross-reference records.
fn table_grants(
    conf: &serde_json::Map<String, Value>,
    logical_name: &str,
    tables: &BTreeSet<String>,
    context: &str,
) -> Result<Vec<CrossReference>> {
    let Some(value) = conf.get("table_access") else {
        return Ok(Vec::new());
    };
    let items = value
        .as_array()
        .ok_or_else(|| ValidationError::shape(context, "table_access", "must be a list"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let grant_context = format!("{context} grant #{i}");
            let map = item.as_object().ok_or_else(|| {
                ValidationError::shape(&grant_context, format!("table_access[{i}]"), "must be a mapping")
            })?;
            apply(
                &[
                    Rule::RequiredFields(&["table", "access"]),
                    Rule::ReferenceExists {
                        field: "table",
                        registry: "table",
                        names: tables,
                    },
                ],
                map,
                &grant_context,
            )?;

            let access_id = require_str(map, "access", &grant_context)?.to_lowercase();
            let level = AccessLevel::parse(&access_id).ok_or_else(|| {
                ValidationError::InvalidEnum {
                    context: grant_context.clone(),
                    field: String::from("access"),
                    value: access_id,
                    allowed: AccessLevel::IDENTIFIERS.join(", "),
                }
            })?;

            Ok(CrossReference {
                from: logical_name.to_string(),
                target: require_str(map, "table", &grant_context)?.to_string(),
                kind: ReferenceKind::TableAccess { level },
            })
        })
        .collect()
}
