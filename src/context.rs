//! Environment context resolution.
//!
//! The context file (`cloudloom.json`) declares one section per deployment
//! environment plus shared settings. Resolution picks the active environment
//! (explicit override, then the declared default, then `dev`), validates the
//! required keys, and produces the immutable [`EnvironmentContext`] that is
//! constructed once per run and shared by reference with every component.
//! All resources in one assembly run therefore see the same variable set.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::config::{read_object, Variables};
use crate::error::{ContextError, LoomError, Result};

/// Default context file name inside the workspace root.
pub const CONTEXT_FILE: &str = "cloudloom.json";

/// Fallback environment name when neither an override nor a declared
/// default is present.
const FALLBACK_ENV: &str = "dev";

/// Default region when the context file does not declare one.
const DEFAULT_REGION: &str = "eu-west-1";

/// Source-control settings shared by every environment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GithubConfig {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

/// The resolved identity of the active deployment environment.
///
/// Immutable after construction. Built exactly once per run and passed
/// by shared reference to every component.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnvironmentContext {
    /// Active environment name (lowercased).
    pub env_name: String,
    /// Target account identifier.
    pub account_id: String,
    /// Target region.
    pub region: String,
    /// Cloud partition, derived from the region prefix.
    pub partition: String,
    /// Source branch for this environment. Defaults to the environment name.
    pub branch: String,
    /// Source-control settings.
    pub github: GithubConfig,
    /// Upstream source connection id, when configured.
    pub connection_id: Option<String>,
    /// Upstream source connection ARN, when configured. Wins over
    /// `connection_id` when both are present.
    pub connection_arn: Option<String>,
}

impl EnvironmentContext {
    /// Resolves the context from the workspace root's `cloudloom.json`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing or malformed, and
    /// [`ContextError::MissingConfiguration`] naming every absent
    /// required key when resolution is incomplete.
    pub fn resolve(root: impl AsRef<Path>, override_env: Option<&str>) -> Result<Self> {
        let path = root.as_ref().join(CONTEXT_FILE);
        info!("Resolving environment context from: {}", path.display());

        let raw = read_object(&path)?;
        Self::resolve_from_value(&raw, override_env, &path)
    }

    /// Resolves the context from an already-loaded context object.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingConfiguration`] naming every absent
    /// required key.
    pub fn resolve_from_value(
        raw: &serde_json::Map<String, Value>,
        override_env: Option<&str>,
        source_path: &Path,
    ) -> Result<Self> {
        // Override first, then the declared default, then the fallback.
        let env_name = override_env
            .map(str::to_string)
            .or_else(|| get_str(raw, "env"))
            .unwrap_or_else(|| FALLBACK_ENV.to_string())
            .to_lowercase();
        debug!("Active environment: {env_name}");

        let region = get_str(raw, "region").unwrap_or_else(|| DEFAULT_REGION.to_string());

        let env_section = raw.get(&env_name).and_then(Value::as_object);
        let account_id = env_section.and_then(|s| get_str(s, "account_id"));
        let branch = env_section
            .and_then(|s| get_str(s, "branch"))
            .unwrap_or_else(|| env_name.clone());
        let connection_id = env_section.and_then(|s| get_str(s, "connection_id"));
        let connection_arn = env_section.and_then(|s| get_str(s, "connection_arn"));

        let github = raw.get("github").and_then(Value::as_object);
        let owner = github.and_then(|g| get_str(g, "owner"));
        let repo = github.and_then(|g| get_str(g, "repo"));

        // Every absent key is reported in one batch.
        let mut missing = Vec::new();
        if account_id.is_none() {
            missing.push(format!("{env_name}.account_id"));
        }
        if owner.is_none() {
            missing.push(String::from("github.owner"));
        }
        if repo.is_none() {
            missing.push(String::from("github.repo"));
        }
        if !missing.is_empty() {
            return Err(LoomError::Context(ContextError::MissingConfiguration {
                source_path: source_path.to_path_buf(),
                keys: missing,
            }));
        }

        let partition = partition_for(&region).to_string();

        Ok(Self {
            env_name,
            account_id: account_id.unwrap_or_default(),
            region,
            partition,
            branch,
            github: GithubConfig {
                owner: owner.unwrap_or_default(),
                repo: repo.unwrap_or_default(),
            },
            connection_id,
            connection_arn,
        })
    }

    /// Returns the effective source connection ARN.
    ///
    /// An explicit `connection_arn` wins; a bare `connection_id` derives
    /// the ARN from the partition, region, and account.
    #[must_use]
    pub fn resolved_connection_arn(&self) -> Option<String> {
        if let Some(arn) = &self.connection_arn {
            return Some(arn.clone());
        }
        self.connection_id.as_ref().map(|id| {
            format!(
                "arn:{}:codestar-connections:{}:{}:connection/{id}",
                self.partition, self.region, self.account_id
            )
        })
    }

    /// Whether resources built for this environment keep their lifecycle
    /// policy set to retain.
    #[must_use]
    pub fn retain_resources(&self) -> bool {
        self.env_name == "main"
    }

    /// Produces the placeholder variable set exposed to fragments.
    #[must_use]
    pub fn variables(&self) -> Variables {
        let mut vars = Variables::new();
        vars.insert(String::from("EnvName"), self.env_name.clone());
        vars.insert(String::from("AccountId"), self.account_id.clone());
        vars.insert(String::from("Region"), self.region.clone());
        vars.insert(String::from("Partition"), self.partition.clone());
        vars.insert(String::from("Branch"), self.branch.clone());
        vars.insert(String::from("GithubOwner"), self.github.owner.clone());
        vars.insert(String::from("GithubRepo"), self.github.repo.clone());
        if let Some(id) = &self.connection_id {
            vars.insert(String::from("ConnectionId"), id.clone());
        }
        if let Some(arn) = self.resolved_connection_arn() {
            vars.insert(String::from("ConnectionArn"), arn);
        }
        vars
    }

    /// Produces the variable set with per-call extras layered on top.
    #[must_use]
    pub fn variables_with(&self, extra: &Variables) -> Variables {
        let mut vars = self.variables();
        for (k, v) in extra {
            vars.insert(k.clone(), v.clone());
        }
        vars
    }
}

/// Derives the cloud partition from the region prefix.
#[must_use]
pub fn partition_for(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else {
        "aws"
    }
}

fn get_str(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
