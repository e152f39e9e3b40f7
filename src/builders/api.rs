//! Event-API builder.
//!
//! An API folder holds an `api.json` shell plus a `routes/` directory of
//! one fragment per route. Construction is staged to match: the shell is
//! opened and validated first, every route is built against it, and the
//! stage settings are checked last when the shell is finished into a
//! resource spec. A shell that never finishes leaves nothing in the
//! graph.

use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::assembly::{
    CrossReference, EventApiSpec, Integration, IntegrationKind, ReferenceKind, ResourceProperties,
    ResourceSpec, RouteSpec, StageSpec,
};
use crate::config::{source_stem, FragmentObject, ResolvedConfig};
use crate::context::EnvironmentContext;
use crate::error::{Result, ValidationError};
use crate::validate::{apply, lookup, Rule};

use super::require_str;

/// Shell rules, checked when the shell is opened.
const SHELL_RULES: &[Rule<'static>] = &[
    Rule::RequiredFields(&["name", "route_selection_expression"]),
    Rule::NonEmpty("name"),
    Rule::NonEmpty("route_selection_expression"),
];

/// Route rules, checked per route fragment.
const ROUTE_RULES: &[Rule<'static>] = &[
    Rule::RequiredFields(&["route_key", "integration"]),
    Rule::RequiredShape {
        field: "integration",
        subfields: &["type", "function"],
    },
];

/// A validated API shell awaiting its routes and stage.
#[derive(Debug)]
pub struct ApiShell {
    /// Logical name of the API (folder stem).
    pub logical_name: String,
    /// API folder path.
    pub source: PathBuf,
    /// Declared display name.
    pub api_name: String,
    /// Route selection expression.
    pub route_selection_expression: String,
    /// Functions named for connection-management grants.
    pub manage_connections_for: Vec<String>,
    conf: FragmentObject,
}

/// Opens and validates an API shell from its `api.json` fragment.
///
/// The logical name is the API folder's stem, never the declared `name`:
/// routes are keyed under it and folders are unique by construction.
///
/// # Errors
///
/// Returns a [`ValidationError`] for a missing name or route selection
/// expression, or a malformed `manage_connections` list.
pub fn open_shell(
    config: &ResolvedConfig,
    folder: &std::path::Path,
    folder_stem: &str,
) -> Result<ApiShell> {
    let context = format!("API configuration for {folder_stem}");
    let conf = &config.value;
    apply(SHELL_RULES, conf, &context)?;

    let manage_connections_for = match conf.get("manage_connections_for") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ValidationError::shape(
                        &context,
                        "manage_connections_for",
                        "entries must be function names",
                    )
                    .into()
                })
            })
            .collect::<Result<Vec<String>>>()?,
        Some(_) => {
            return Err(
                ValidationError::shape(&context, "manage_connections_for", "must be a list").into(),
            )
        }
    };

    Ok(ApiShell {
        logical_name: folder_stem.to_string(),
        source: folder.to_path_buf(),
        api_name: require_str(conf, "name", &context)?.to_string(),
        route_selection_expression: require_str(conf, "route_selection_expression", &context)?
            .to_string(),
        manage_connections_for,
        conf: conf.clone(),
    })
}

/// Builds one route of an API.
///
/// The route's logical name is `<api>/<fragment file stem>`, so
/// identical route files under different APIs never collide. A `name`
/// key in the fragment has no bearing on it. The integration target
/// must already be a registered function.
///
/// # Errors
///
/// Returns a [`ValidationError`] for missing fields, an integration
/// type outside the supported set, or a target function not in the
/// registry.
pub fn build_route(
    api: &ApiShell,
    config: &ResolvedConfig,
    functions: &BTreeSet<String>,
    ctx: &EnvironmentContext,
) -> Result<(ResourceSpec, CrossReference)> {
    let stem = source_stem(&config.source);
    let logical_name = format!("{}/{stem}", api.logical_name);
    let context = format!("Route configuration for {logical_name}");
    let conf = &config.value;

    apply(ROUTE_RULES, conf, &context)?;
    apply(
        &[Rule::ReferenceExists {
            field: "integration.function",
            registry: "function",
            names: functions,
        }],
        conf,
        &context,
    )?;

    let integration_type = lookup(conf, "integration.type")
        .and_then(Value::as_str)
        .map(str::to_lowercase)
        .ok_or_else(|| ValidationError::shape(&context, "integration.type", "must be a string"))?;
    let kind = match integration_type.as_str() {
        "lambda" => IntegrationKind::Lambda,
        other => {
            return Err(ValidationError::UnsupportedKind {
                context,
                field: String::from("integration.type"),
                value: other.to_string(),
                allowed: IntegrationKind::IDENTIFIERS.join(", "),
            }
            .into())
        }
    };

    let function = lookup(conf, "integration.function")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ValidationError::shape(&context, "integration.function", "must be a string")
        })?
        .to_string();

    let spec = RouteSpec {
        api: api.logical_name.clone(),
        route_key: require_str(conf, "route_key", &context)?.to_string(),
        integration: Integration {
            kind,
            function: function.clone(),
        },
    };

    let reference = CrossReference {
        from: logical_name.clone(),
        target: function,
        kind: ReferenceKind::RouteIntegration,
    };

    let resource = ResourceSpec {
        logical_name,
        retain_on_delete: ctx.retain_resources(),
        source: config.source.clone(),
        properties: ResourceProperties::Route(spec),
    };
    Ok((resource, reference))
}

/// Finishes the shell into an API resource spec, validating the stage
/// settings. Runs after every route so route errors surface first.
///
/// # Errors
///
/// Returns a [`ValidationError`] for a missing or malformed `stage`
/// section.
pub fn finish(shell: ApiShell, ctx: &EnvironmentContext) -> Result<ResourceSpec> {
    let context = format!("API configuration for {}", shell.logical_name);
    apply(
        &[Rule::RequiredShape {
            field: "stage",
            subfields: &["name", "auto_deploy"],
        }],
        &shell.conf,
        &context,
    )?;

    let stage_obj = shell
        .conf
        .get("stage")
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::shape(&context, "stage", "must be a mapping"))?;
    let auto_deploy = stage_obj
        .get("auto_deploy")
        .and_then(Value::as_bool)
        .ok_or_else(|| ValidationError::shape(&context, "stage.auto_deploy", "must be a boolean"))?;

    let spec = EventApiSpec {
        api_name: shell.api_name,
        route_selection_expression: shell.route_selection_expression,
        stage: StageSpec {
            name: require_str(stage_obj, "name", &context)?.to_string(),
            auto_deploy,
        },
        manage_connections_for: shell.manage_connections_for,
    };

    Ok(ResourceSpec {
        logical_name: shell.logical_name,
        retain_on_delete: ctx.retain_resources(),
        source: shell.source,
        properties: ResourceProperties::EventApi(spec),
    })
}
