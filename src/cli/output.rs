//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! assembly results to the user in various formats.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::assembly::{ReferenceKind, ResourceGraph, ResourceKind};
use crate::config::{ConfigHasher, Variables};
use crate::context::EnvironmentContext;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Resource row for table display.
#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Retain")]
    retain: String,
    #[tabled(rename = "Source")]
    source: String,
}

/// Cross-reference row for table display.
#[derive(Tabled)]
struct ReferenceRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "Grant")]
    grant: String,
    #[tabled(rename = "Target")]
    target: String,
}

/// Variable row for table display.
#[derive(Tabled)]
struct VariableRow {
    #[tabled(rename = "Variable")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats an assembled graph for display.
    #[must_use]
    pub fn format_graph(&self, graph: &ResourceGraph) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&GraphJson::from(graph)).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_graph_text(graph),
        }
    }

    /// Formats a graph as text.
    fn format_graph_text(graph: &ResourceGraph) -> String {
        let mut output = String::new();

        let _ = write!(
            output,
            "\n🧩 Resource Graph ({})\n   Fingerprint: {}\n\n",
            graph.environment,
            ConfigHasher::short(&graph.fingerprint())
        );

        if graph.specs.is_empty() {
            output.push_str("   No resources assembled.\n");
            return output;
        }

        let rows: Vec<ResourceRow> = graph
            .specs
            .iter()
            .map(|s| ResourceRow {
                kind: s.kind().label().to_string(),
                name: s.logical_name.clone(),
                retain: if s.retain_on_delete {
                    "✓".green().to_string()
                } else {
                    "-".to_string()
                },
                source: Self::truncate(&s.source.display().to_string(), 48),
            })
            .collect();
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');

        if !graph.references.is_empty() {
            let rows: Vec<ReferenceRow> = graph
                .references
                .iter()
                .map(|r| ReferenceRow {
                    from: r.from.clone(),
                    grant: Self::format_reference_kind(r.kind),
                    target: r.target.clone(),
                })
                .collect();
            output.push('\n');
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        let _ = write!(
            output,
            "\nAssembled: {} table(s), {} function(s), {} api(s), {} route(s), {} site(s), {} attachment(s)\n",
            graph.count(ResourceKind::Table).to_string().green(),
            graph.count(ResourceKind::Function).to_string().green(),
            graph.count(ResourceKind::EventApi).to_string().green(),
            graph.count(ResourceKind::Route).to_string().green(),
            graph.count(ResourceKind::Site).to_string().green(),
            graph.attachments.len(),
        );
        output
    }

    /// Formats a validation outcome for display.
    #[must_use]
    pub fn format_validation(&self, graph: &ResourceGraph) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ValidationJson::from(graph)).unwrap_or_default()
            }
            OutputFormat::Text => format!(
                "{} Configuration is valid: {} resource(s), {} reference(s), {} attachment(s)\n",
                "✓".green(),
                graph.specs.len(),
                graph.references.len(),
                graph.attachments.len(),
            ),
        }
    }

    /// Formats the resolved environment and its variable set.
    #[must_use]
    pub fn format_vars(&self, ctx: &EnvironmentContext, vars: &Variables) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&VarsJson::from((ctx, vars))).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = String::new();
                let _ = write!(
                    output,
                    "\n🌍 Environment: {} ({}/{})\n\n",
                    ctx.env_name.bold(),
                    ctx.region,
                    ctx.partition
                );
                let rows: Vec<VariableRow> = vars
                    .iter()
                    .map(|(name, value)| VariableRow {
                        name: format!("${{{name}}}"),
                        value: value.clone(),
                    })
                    .collect();
                output.push_str(&Table::new(rows).to_string());
                output.push('\n');
                output
            }
        }
    }

    /// Formats an error message.
    #[must_use]
    pub fn format_error(&self, error: &crate::error::LoomError) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&ErrorJson {
                    error: error.to_string(),
                })
                .unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {error}\n", "✗".red()),
        }
    }

    /// Formats a reference kind as a short label.
    fn format_reference_kind(kind: ReferenceKind) -> String {
        match kind {
            ReferenceKind::TableAccess { level } => {
                format!("table-access ({})", format!("{level:?}").to_lowercase())
            }
            ReferenceKind::RouteIntegration => String::from("route-integration"),
            ReferenceKind::ConnectionsGrant => String::from("connections-grant"),
        }
    }

    /// Truncates a string to a maximum display length.
    fn truncate(s: &str, max: usize) -> String {
        if s.chars().count() <= max {
            s.to_string()
        } else {
            let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
            format!("{truncated}…")
        }
    }
}

/// JSON representation of an assembled graph.
#[derive(Serialize)]
struct GraphJson<'a> {
    environment: &'a str,
    fingerprint: String,
    #[serde(flatten)]
    graph: &'a ResourceGraph,
}

impl<'a> From<&'a ResourceGraph> for GraphJson<'a> {
    fn from(graph: &'a ResourceGraph) -> Self {
        Self {
            environment: &graph.environment,
            fingerprint: graph.fingerprint(),
            graph,
        }
    }
}

/// JSON representation of a validation outcome.
#[derive(Serialize)]
struct ValidationJson {
    valid: bool,
    resources: usize,
    references: usize,
    attachments: usize,
}

impl From<&ResourceGraph> for ValidationJson {
    fn from(graph: &ResourceGraph) -> Self {
        Self {
            valid: true,
            resources: graph.specs.len(),
            references: graph.references.len(),
            attachments: graph.attachments.len(),
        }
    }
}

/// JSON representation of the resolved variable set.
#[derive(Serialize)]
struct VarsJson<'a> {
    context: &'a EnvironmentContext,
    variables: &'a Variables,
}

impl<'a> From<(&'a EnvironmentContext, &'a Variables)> for VarsJson<'a> {
    fn from((context, variables): (&'a EnvironmentContext, &'a Variables)) -> Self {
        Self { context, variables }
    }
}

/// JSON representation of an error.
#[derive(Serialize)]
struct ErrorJson {
    error: String,
}
