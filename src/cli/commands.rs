//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cloudloom - configuration-driven resource graph assembler.
#[derive(Parser, Debug)]
#[command(name = "cloudloom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace root holding the context file and fragment directories.
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Environment override (wins over the context file's default).
    #[arg(short, long, global = true, env = "CLOUDLOOM_ENV")]
    pub env: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new Cloudloom workspace.
    Init {
        /// Directory to initialize (defaults to current directory).
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Force overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },

    /// Run a full assembly and report the outcome without emitting a graph.
    Validate,

    /// Assemble the resource graph and print it.
    Assemble {
        /// Write the graph as a JSON handoff artifact.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the resolved environment and placeholder variables.
    Vars,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
