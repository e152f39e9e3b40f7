//! Deterministic fingerprints for resolved configuration.
//!
//! Fingerprints detect whether two resolution passes produced the same
//! result: loading and merging the same fragments twice must yield the
//! same fingerprint. Fragment maps preserve file key order, so the
//! serialized form is stable for identical inputs.

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::store::FragmentObject;

/// Hasher for resolved-configuration fingerprints.
#[derive(Debug, Default)]
pub struct ConfigHasher;

impl ConfigHasher {
    /// Creates a new hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the fingerprint of one resolved configuration object.
    #[must_use]
    pub fn fingerprint_object(&self, object: &FragmentObject) -> String {
        let mut hasher = Sha256::new();
        hasher.update(
            serde_json::to_string(&Value::Object(object.clone())).unwrap_or_default(),
        );
        hex::encode(hasher.finalize())
    }

    /// Computes one fingerprint over an ordered sequence of serialized
    /// parts. Used for the assembled graph, where each resource spec
    /// contributes its canonical JSON form.
    #[must_use]
    pub fn fingerprint_parts<I, S>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_ref());
        }
        hex::encode(hasher.finalize())
    }

    /// Shortens a fingerprint to 8 characters for display.
    #[must_use]
    pub fn short(hash: &str) -> String {
        hash.chars().take(8).collect()
    }
}
