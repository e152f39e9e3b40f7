//! Error types for the Cloudloom assembly engine.
//!
//! This module provides the error hierarchy for every stage of an assembly
//! run: fragment loading, environment-context resolution, validation,
//! and final graph assembly. Every error aborts the run; none is retryable,
//! the operator fixes the configuration and reruns.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Cloudloom operations.
#[derive(Debug, Error)]
pub enum LoomError {
    /// Fragment loading errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Environment-context resolution errors.
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    /// Validation errors.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Assembly errors.
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while loading configuration fragments from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A fragment file or category directory is missing.
    #[error("Configuration not found: {path}")]
    NotFound {
        /// Path to the missing file or directory.
        path: PathBuf,
    },

    /// A fragment file could not be parsed as a JSON object.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// Path to the malformed file.
        path: PathBuf,
        /// Description of the parse failure.
        message: String,
    },
}

/// Errors raised while resolving the environment context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Required context keys are absent. All missing keys are reported
    /// in a single error so the operator fixes them in one pass.
    #[error("Missing required context keys in {source_path}: {}", keys.join(", "))]
    MissingConfiguration {
        /// Path of the context file that was read.
        source_path: PathBuf,
        /// Every missing key, in declaration order.
        keys: Vec<String>,
    },
}

/// Errors raised by validation rules and resource builders.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Required top-level fields are absent. Batched: every missing
    /// field is named in one error.
    #[error("{context} missing required fields: {}", fields.join(", "))]
    MissingFields {
        /// Description of the configuration being validated.
        context: String,
        /// Every missing field name.
        fields: Vec<String>,
    },

    /// A field does not have the required shape.
    #[error("{context} field '{field}': {message}")]
    FieldShape {
        /// Description of the configuration being validated.
        context: String,
        /// The offending field path.
        field: String,
        /// What is wrong with the shape.
        message: String,
    },

    /// A field's value is not in its closed set.
    #[error("{context} field '{field}' must be one of [{allowed}], got '{value}'")]
    InvalidEnum {
        /// Description of the configuration being validated.
        context: String,
        /// The offending field path.
        field: String,
        /// The rejected value.
        value: String,
        /// Comma-joined allowed values.
        allowed: String,
    },

    /// Unknown top-level keys in a closed fragment schema. Batched:
    /// every extra key is named in one error.
    #[error("{context} has unknown keys: {}", fields.join(", "))]
    UnknownFields {
        /// Description of the configuration being validated.
        context: String,
        /// Every unknown key, sorted.
        fields: Vec<String>,
    },

    /// A runtime or integration identifier outside the supported set.
    #[error("{context}: unsupported {field} '{value}' (supported: {allowed})")]
    UnsupportedKind {
        /// Description of the configuration being validated.
        context: String,
        /// Which closed-set field was rejected.
        field: String,
        /// The rejected identifier.
        value: String,
        /// Comma-joined supported identifiers.
        allowed: String,
    },

    /// A cross-resource reference names a logical name that is not in
    /// the registry built so far.
    #[error("{context}: {registry} '{name}' not found in assembly registry")]
    UnresolvedReference {
        /// Description of the configuration being validated.
        context: String,
        /// Which registry was consulted (e.g. "table", "function").
        registry: String,
        /// The dangling logical name.
        name: String,
    },
}

/// Errors raised while assembling the resource graph.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Two resources of the same kind resolved to the same logical name.
    #[error("Duplicate {kind} logical name: {name}")]
    DuplicateLogicalName {
        /// Resource kind (table, function, route, ...).
        kind: String,
        /// The colliding logical name.
        name: String,
    },
}

/// Result type alias for Cloudloom operations.
pub type Result<T> = std::result::Result<T, LoomError>;

impl LoomError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ConfigError {
    /// Creates a not-found error for the given path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a parse error for the given path.
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl ValidationError {
    /// Creates a field-shape error.
    #[must_use]
    pub fn shape(
        context: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::FieldShape {
            context: context.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an unresolved-reference error.
    #[must_use]
    pub fn unresolved(
        context: impl Into<String>,
        registry: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::UnresolvedReference {
            context: context.into(),
            registry: registry.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_lists_every_field() {
        let err = ValidationError::MissingFields {
            context: String::from("Table configuration for messages"),
            fields: vec![String::from("billing_mode"), String::from("kms_alias")],
        };
        let text = err.to_string();
        assert!(text.contains("billing_mode"));
        assert!(text.contains("kms_alias"));
    }

    #[test]
    fn test_missing_context_keys_lists_every_key() {
        let err = ContextError::MissingConfiguration {
            source_path: PathBuf::from("cloudloom.json"),
            keys: vec![String::from("dev.account_id"), String::from("github.owner")],
        };
        let text = err.to_string();
        assert!(text.contains("dev.account_id"));
        assert!(text.contains("github.owner"));
        assert!(text.contains("cloudloom.json"));
    }

    #[test]
    fn test_unresolved_reference_names_target() {
        let err = ValidationError::unresolved("Grant in chat", "table", "messages");
        assert!(err.to_string().contains("'messages'"));
    }
}
