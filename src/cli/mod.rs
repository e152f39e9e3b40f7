//! CLI module for the Cloudloom assembler.
//!
//! This module provides the command-line interface for assembling
//! and inspecting resource graphs.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
