//! Placeholder expansion for configuration fragments.
//!
//! Fragments may contain `${Name}` tokens in string values. Expansion
//! substitutes each token with the matching environment variable in a
//! single pass: a value produced by substitution is never rescanned, so
//! expansion is bounded even when a variable's value itself contains
//! `${}` syntax. Unknown tokens survive verbatim, which lets fragments
//! reference variables that are only configured in some environments.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// The placeholder variable set, ordered for deterministic output.
pub type Variables = BTreeMap<String, String>;

/// Matches `${identifier}` where identifier is `[A-Za-z0-9_]+`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("placeholder pattern"));

/// Expands every `${Name}` token in a string.
///
/// Tokens without a matching variable are left as the literal original
/// token, `${}` wrapper included.
#[must_use]
pub fn expand_str(input: &str, vars: &Variables) -> String {
    PLACEHOLDER
        .replace_all(input, |caps: &regex::Captures<'_>| {
            vars.get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Recursively expands placeholders in a JSON value.
///
/// Strings are substituted, lists and maps recurse element-wise
/// preserving order and key identity, and all other scalars pass
/// through unchanged.
#[must_use]
pub fn expand(value: &Value, vars: &Variables) -> Value {
    match value {
        Value::String(s) => Value::String(expand_str(s, vars)),
        Value::Array(items) => Value::Array(items.iter().map(|v| expand(v, vars)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), expand(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Expands placeholders in a top-level fragment object.
#[must_use]
pub fn expand_object(
    map: &serde_json::Map<String, Value>,
    vars: &Variables,
) -> serde_json::Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), expand(v, vars)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_known_variable() {
        let v = vars(&[("EnvName", "dev")]);
        assert_eq!(expand_str("table-${EnvName}", &v), "table-dev");
    }

    #[test]
    fn test_unknown_token_preserved_verbatim() {
        assert_eq!(expand_str("${Unknown}", &Variables::new()), "${Unknown}");
    }

    #[test]
    fn test_multiple_tokens_in_one_string() {
        let v = vars(&[("Region", "eu-west-1"), ("AccountId", "123")]);
        assert_eq!(
            expand_str("arn:aws:s3:${Region}:${AccountId}:bucket", &v),
            "arn:aws:s3:eu-west-1:123:bucket"
        );
    }

    #[test]
    fn test_expansion_is_single_pass() {
        // A variable value containing ${} syntax is never re-expanded.
        let v = vars(&[("Outer", "${Inner}"), ("Inner", "leak")]);
        assert_eq!(expand_str("${Outer}", &v), "${Inner}");
    }

    #[test]
    fn test_recurses_into_lists_and_maps() {
        let v = vars(&[("EnvName", "dev")]);
        let value = json!({
            "name": "fn-${EnvName}",
            "tags": ["svc-${EnvName}", 42],
            "nested": {"alias": "alias/key-${EnvName}"}
        });
        let expanded = expand(&value, &v);
        assert_eq!(expanded["name"], "fn-dev");
        assert_eq!(expanded["tags"][0], "svc-dev");
        assert_eq!(expanded["tags"][1], 42);
        assert_eq!(expanded["nested"]["alias"], "alias/key-dev");
    }

    #[test]
    fn test_non_string_scalars_pass_through() {
        let v = vars(&[("EnvName", "dev")]);
        assert_eq!(expand(&json!(10), &v), json!(10));
        assert_eq!(expand(&json!(true), &v), json!(true));
        assert_eq!(expand(&json!(null), &v), json!(null));
    }

    #[test]
    fn test_key_identity_preserved() {
        // Keys are never expanded, only values.
        let v = vars(&[("EnvName", "dev")]);
        let value = json!({"${EnvName}": "x"});
        let expanded = expand(&value, &v);
        assert!(expanded.get("${EnvName}").is_some());
    }
}
