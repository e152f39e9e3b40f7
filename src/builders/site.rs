//! Static-site builder.

use serde_json::Value;

use crate::assembly::{ResourceProperties, ResourceSpec, SiteSpec};
use crate::context::EnvironmentContext;
use crate::config::ResolvedConfig;
use crate::error::Result;
use crate::validate::{apply, Rule};

use super::require_str;

const RULES: &[Rule<'static>] = &[
    Rule::RequiredFields(&["bucket_name"]),
    Rule::NonEmpty("bucket_name"),
];

/// Default index document when the fragment declares none.
const DEFAULT_INDEX_DOCUMENT: &str = "index.html";

/// Builds a static-site spec from a resolved fragment.
///
/// # Errors
///
/// Returns a [`ValidationError`](crate::error::ValidationError) when the
/// bucket name is missing or empty.
pub fn build(config: &ResolvedConfig, ctx: &EnvironmentContext) -> Result<ResourceSpec> {
    let logical_name = config.logical_name();
    let context = format!("Site configuration for {logical_name}");
    let conf = &config.value;

    apply(RULES, conf, &context)?;

    let spec = SiteSpec {
        bucket_name: require_str(conf, "bucket_name", &context)?.to_string(),
        index_document: conf
            .get("index_document")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_INDEX_DOCUMENT)
            .to_string(),
        public_read_access: conf
            .get("public_read_access")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    };

    Ok(ResourceSpec {
        logical_name,
        retain_on_delete: ctx.retain_resources(),
        source: config.source.clone(),
        properties: ResourceProperties::Site(spec),
    })
}
