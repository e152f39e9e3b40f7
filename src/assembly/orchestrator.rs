//! Staged assembly of the resource graph.
//!
//! The engine resolves the environment context once, then runs strictly
//! ordered stages: tables, sites, functions, APIs, and finally the
//! API-level connection-management grants. Each stage fully populates
//! its registry before the next begins, so cross-references only ever
//! look backwards. Any error aborts the run; no partial graph escapes.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::builders;
use crate::config::{ConfigStore, ResourceCategory, Variables};
use crate::context::EnvironmentContext;
use crate::error::{ConfigError, LoomError, Result};

use super::graph::{CrossReference, PolicyAttachment, ReferenceKind, ResourceGraph, ResourceKind};

/// Shared defaults fragment merged underneath every table.
const TABLE_DEFAULTS_FILE: &str = "defaults.json";

/// Prefix of the per-function fragment files merged by the store.
const FUNCTION_CONFIG_PREFIX: &str = "config";

/// Shared policy document granting connection management on an API.
const MANAGE_CONNECTIONS_POLICY: &str = "manage_connections.json";

/// Runs the staged assembly for one workspace and environment.
pub struct AssemblyEngine {
    ctx: EnvironmentContext,
    store: ConfigStore,
}

impl AssemblyEngine {
    /// Resolves the environment context from the workspace root and
    /// prepares the fragment store with the context's variable set.
    ///
    /// # Errors
    ///
    /// Returns context-resolution errors from the workspace's
    /// `cloudloom.json`.
    pub fn new(root: impl Into<PathBuf>, override_env: Option<&str>) -> Result<Self> {
        let root = root.into();
        let ctx = EnvironmentContext::resolve(&root, override_env)?;
        let store = ConfigStore::new(root, ctx.variables());
        Ok(Self { ctx, store })
    }

    /// The resolved environment context.
    #[must_use]
    pub fn context(&self) -> &EnvironmentContext {
        &self.ctx
    }

    /// Runs every stage and returns the fully populated graph.
    ///
    /// # Errors
    ///
    /// Propagates the first failure from any stage; the graph under
    /// construction is dropped.
    pub fn assemble(&self) -> Result<ResourceGraph> {
        info!("Assembling resource graph for environment: {}", self.ctx.env_name);
        let mut graph = ResourceGraph::new(self.ctx.env_name.clone());

        self.assemble_tables(&mut graph)?;
        self.assemble_sites(&mut graph)?;
        self.assemble_functions(&mut graph)?;
        self.assemble_apis(&mut graph)?;

        info!(
            "Assembly complete: {} table(s), {} function(s), {} api(s), {} route(s), {} site(s)",
            graph.count(ResourceKind::Table),
            graph.count(ResourceKind::Function),
            graph.count(ResourceKind::EventApi),
            graph.count(ResourceKind::Route),
            graph.count(ResourceKind::Site),
        );
        Ok(graph)
    }

    /// Stage 1: storage tables, shared defaults merged underneath each.
    fn assemble_tables(&self, graph: &mut ResourceGraph) -> Result<()> {
        let configs = self
            .store
            .load_directory_with_defaults(ResourceCategory::Tables, TABLE_DEFAULTS_FILE)?;
        debug!("Stage 1: {} table fragment(s)", configs.len());

        for config in &configs {
            let spec = builders::table::build(config, &self.ctx)?;
            graph.insert(spec)?;
        }
        Ok(())
    }

    /// Stage 2: static sites. The directory is optional; absence means
    /// no sites, not an error.
    fn assemble_sites(&self, graph: &mut ResourceGraph) -> Result<()> {
        if !self.store.category_dir(ResourceCategory::Sites).is_dir() {
            debug!("Stage 2: no sites directory, skipping");
            return Ok(());
        }
        let configs = self.store.load_directory(ResourceCategory::Sites, &[])?;
        debug!("Stage 2: {} site fragment(s)", configs.len());

        for config in &configs {
            let spec = builders::site::build(config, &self.ctx)?;
            graph.insert(spec)?;
        }
        Ok(())
    }

    /// Stage 3: compute functions, grants resolved against the stage-1
    /// table registry.
    fn assemble_functions(&self, graph: &mut ResourceGraph) -> Result<()> {
        let folders = self.store.find_function_dirs()?;
        debug!("Stage 3: {} function folder(s)", folders.len());
        let tables = graph.names(ResourceKind::Table);

        for folder in &folders {
            let stem = folder_stem(folder)?;
            let defaults = function_defaults(&stem);
            let mut extra = Variables::new();
            extra.insert(String::from("FunctionName"), stem);

            let config =
                self.store
                    .load_folder_merged(folder, FUNCTION_CONFIG_PREFIX, &defaults, &extra)?;
            let (spec, references) =
                builders::function::build(&config, &tables, &self.store, &self.ctx)?;
            graph.insert(spec)?;
            for reference in references {
                graph.link(reference)?;
            }
        }
        Ok(())
    }

    /// Stages 4 and 5: per API folder — shell, routes, stage, then the
    /// connection-management grants the shell declares.
    fn assemble_apis(&self, graph: &mut ResourceGraph) -> Result<()> {
        let folders = self.store.find_api_dirs()?;
        debug!("Stage 4: {} api folder(s)", folders.len());
        let functions = graph.names(ResourceKind::Function);

        for folder in &folders {
            let stem = folder_stem(folder)?;
            let config = self.store.load_path(&folder.join("api.json"))?;
            let shell = builders::api::open_shell(&config, folder, &stem)?;

            for route_file in self.store.find_route_files(folder)? {
                let route_config = self.store.load_path(&route_file)?;
                let (spec, reference) =
                    builders::api::build_route(&shell, &route_config, &functions, &self.ctx)?;
                graph.insert(spec)?;
                graph.link(reference)?;
            }

            let grants = shell.manage_connections_for.clone();
            let spec = builders::api::finish(shell, &self.ctx)?;
            let api_name = spec.logical_name.clone();
            graph.insert(spec)?;

            self.grant_manage_connections(graph, &api_name, &grants)?;
        }
        Ok(())
    }

    /// Stage 5: attaches the shared manage-connections policy to every
    /// function the API names, and records the grant reference.
    fn grant_manage_connections(
        &self,
        graph: &mut ResourceGraph,
        api: &str,
        functions: &[String],
    ) -> Result<()> {
        for function in functions {
            let path = self
                .store
                .resolve_policy_path(MANAGE_CONNECTIONS_POLICY, None)?;
            let resolved = self.store.load_path(&path)?;
            let document = builders::policy::build_document(&resolved)?;

            graph.link(CrossReference {
                from: api.to_string(),
                target: function.clone(),
                kind: ReferenceKind::ConnectionsGrant,
            })?;
            graph.attach(PolicyAttachment {
                function: function.clone(),
                document,
            })?;
        }
        Ok(())
    }
}

/// Category defaults filled into a function folder's merged fragments.
fn function_defaults(stem: &str) -> Vec<(&'static str, Value)> {
    vec![
        ("name", json!(stem)),
        ("runtime", json!("python3.12")),
        ("memory", json!(256)),
        ("timeout", json!(10)),
        ("handler", json!("app.handler")),
    ]
}

/// The final path component of a resource folder.
fn folder_stem(folder: &Path) -> Result<String> {
    folder
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| LoomError::Config(ConfigError::not_found(folder)))
}
