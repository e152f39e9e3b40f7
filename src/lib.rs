// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Cloudloom
//!
//! A configuration-driven resource assembler for serverless cloud stacks.
//!
//! ## Overview
//!
//! Cloudloom turns a workspace of JSON configuration fragments into a fully
//! validated resource graph, ready for a provisioning layer to realize:
//!
//! - Declare storage tables, compute functions, event APIs, and static
//!   sites as small per-resource fragments
//! - Merge fragments deterministically with shared defaults underneath
//! - Expand `${Name}` placeholders from a once-resolved environment context
//! - Validate every cross-resource reference before anything is emitted
//!
//! ## Architecture
//!
//! The system is built around **staged assembly over resolved
//! configuration**:
//!
//! 1. **Context**: `cloudloom.json` resolves to one immutable
//!    [`EnvironmentContext`](context::EnvironmentContext)
//! 2. **Resolution**: fragments are located, merged, and expanded by the
//!    [`ConfigStore`](config::ConfigStore)
//! 3. **Assembly**: builders produce typed specs, staged so that
//!    references only ever look backwards
//!
//! ## Modules
//!
//! - [`context`]: Environment context resolution
//! - [`config`]: Fragment discovery, merging, expansion, fingerprinting
//! - [`validate`]: Declarative validation rules
//! - [`builders`]: Per-kind resource builders
//! - [`assembly`]: The resource graph and the staged assembly engine
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```json
//! {
//!   "table_name": "messages-${EnvName}",
//!   "partition_key": {"name": "pk", "type": "STRING"},
//!   "billing_mode": "PAY_PER_REQUEST"
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod assembly;
pub mod builders;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod validate;

// ============================================================================
// Re-exports
// ============================================================================

pub use assembly::{AssemblyEngine, ResourceGraph, ResourceKind, ResourceSpec};
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigHasher, ConfigStore, ResolvedConfig, ResourceCategory, Variables};
pub use context::EnvironmentContext;
pub use error::{LoomError, Result};
