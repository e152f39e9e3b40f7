//! Configuration resolution for the Cloudloom assembly engine.
//!
//! This module handles everything between on-disk fragments and a
//! builder-ready configuration object:
//! - Locating fragments in the fixed category directory layout
//! - Merging fragments under deterministic shallow-override rules
//! - Expanding `${Name}` placeholder tokens
//! - Fingerprinting resolved configuration for idempotence checks

mod expand;
mod hash;
mod store;

pub use expand::{expand, expand_object, expand_str, Variables};
pub use hash::ConfigHasher;
pub use store::{
    shallow_merge, ConfigStore, FragmentObject, ResolvedConfig, ResourceCategory, FUNCTIONS_DIR,
};

pub(crate) use store::{json_kind, read_object, source_stem};
