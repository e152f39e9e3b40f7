//! Fragment discovery, loading, and merging.
//!
//! Configuration fragments are JSON objects laid out in a fixed directory
//! structure under the workspace root. The store locates them, merges them
//! under deterministic override rules, and expands placeholders. Merge
//! order is always: shallow merge, fill defaults, expand last, so defaults
//! may themselves contain placeholder tokens.
//!
//! All directory listings are lexicographic. Build order and logical
//! naming depend on that ordering being stable.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ConfigError, LoomError, Result};

use super::expand::{expand_object, Variables};

/// A fragment object, keyed in file order.
pub type FragmentObject = serde_json::Map<String, Value>;

/// Closed set of resource categories, each mapped to a fixed directory
/// under the workspace root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    /// Storage table fragments.
    Tables,
    /// Access-policy documents.
    Policies,
    /// Event-API definitions (one folder per API).
    EventApis,
    /// Static-site fragments.
    Sites,
}

impl ResourceCategory {
    /// Directory for this category, relative to the workspace root.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::Tables => "configs/tables",
            Self::Policies => "configs/policies",
            Self::EventApis => "configs/apis",
            Self::Sites => "configs/sites",
        }
    }
}

/// Directory holding per-function folders, relative to the workspace root.
pub const FUNCTIONS_DIR: &str = "functions";

/// A fully merged and expanded configuration, paired with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// The file (or folder, for multi-part configs) this came from.
    pub source: PathBuf,
    /// The resolved top-level object.
    pub value: FragmentObject,
}

impl ResolvedConfig {
    /// The logical name: the declared `name` field, or the source
    /// file/folder stem when absent.
    #[must_use]
    pub fn logical_name(&self) -> String {
        self.value
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| source_stem(&self.source), str::to_string)
    }
}

/// Loads and merges configuration fragments from the workspace.
#[derive(Debug)]
pub struct ConfigStore {
    /// Workspace root containing the category directories.
    root: PathBuf,
    /// Variable set used for placeholder expansion.
    vars: Variables,
}

impl ConfigStore {
    /// Creates a store rooted at the given workspace directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, vars: Variables) -> Self {
        Self {
            root: root.into(),
            vars,
        }
    }

    /// The directory for a resource category.
    #[must_use]
    pub fn category_dir(&self, category: ResourceCategory) -> PathBuf {
        self.root.join(category.dir())
    }

    /// The directory holding per-function folders.
    #[must_use]
    pub fn functions_dir(&self) -> PathBuf {
        self.root.join(FUNCTIONS_DIR)
    }

    /// Loads exactly one fragment file from a category, expanded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file is missing and
    /// [`ConfigError::Parse`] if it is not a JSON object.
    pub fn load_file(&self, category: ResourceCategory, filename: &str) -> Result<ResolvedConfig> {
        let path = self.category_dir(category).join(filename);
        let raw = read_object(&path)?;
        Ok(ResolvedConfig {
            value: expand_object(&raw, &self.vars),
            source: path,
        })
    }

    /// Loads every `*.json` fragment in a category directory, each
    /// expanded independently, in lexicographic path order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the directory is missing and
    /// [`ConfigError::Parse`] for any malformed fragment.
    pub fn load_directory(
        &self,
        category: ResourceCategory,
        exclude: &[&str],
    ) -> Result<Vec<ResolvedConfig>> {
        let dir = self.category_dir(category);
        let files = list_json_files(&dir, exclude)?;
        debug!("Loading {} fragments from {}", files.len(), dir.display());

        files
            .into_iter()
            .map(|path| {
                let raw = read_object(&path)?;
                Ok(ResolvedConfig {
                    value: expand_object(&raw, &self.vars),
                    source: path,
                })
            })
            .collect()
    }

    /// Loads a category directory, shallow-merging a shared defaults
    /// fragment underneath each other file. File keys win over defaults.
    /// Expansion runs after the merge.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the directory or defaults
    /// file is missing and [`ConfigError::Parse`] for malformed content.
    pub fn load_directory_with_defaults(
        &self,
        category: ResourceCategory,
        defaults_filename: &str,
    ) -> Result<Vec<ResolvedConfig>> {
        let dir = self.category_dir(category);
        // Defaults are read raw; expansion happens only on the merged result.
        let defaults = read_object(&dir.join(defaults_filename))?;
        let files = list_json_files(&dir, &[defaults_filename])?;

        files
            .into_iter()
            .map(|path| {
                let fragment = read_object(&path)?;
                let mut merged = defaults.clone();
                shallow_merge(&mut merged, fragment);
                Ok(ResolvedConfig {
                    value: expand_object(&merged, &self.vars),
                    source: path,
                })
            })
            .collect()
    }

    /// Merges all `<prefix>*.json` fragments inside one resource folder.
    ///
    /// Fragments merge in lexicographic filename order, later files
    /// overriding earlier ones at the top level only. Category defaults
    /// then fill any field still absent, and placeholders expand last,
    /// so defaults may themselves contain tokens.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the folder is missing and
    /// [`ConfigError::Parse`] for malformed fragments.
    pub fn load_folder_merged(
        &self,
        folder: &Path,
        prefix: &str,
        defaults: &[(&str, Value)],
        extra_vars: &Variables,
    ) -> Result<ResolvedConfig> {
        if !folder.is_dir() {
            return Err(LoomError::Config(ConfigError::not_found(folder)));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(folder)?
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension().is_some_and(|ext| ext == "json")
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(prefix))
            })
            .collect();
        files.sort();
        debug!(
            "Merging {} fragment(s) from {}",
            files.len(),
            folder.display()
        );

        let mut merged = FragmentObject::new();
        for path in files {
            shallow_merge(&mut merged, read_object(&path)?);
        }

        for (key, value) in defaults {
            if !merged.contains_key(*key) {
                merged.insert((*key).to_string(), value.clone());
            }
        }

        let mut vars = self.vars.clone();
        for (k, v) in extra_vars {
            vars.insert(k.clone(), v.clone());
        }

        Ok(ResolvedConfig {
            value: expand_object(&merged, &vars),
            source: folder.to_path_buf(),
        })
    }

    /// Finds every function folder: a sorted listing of directories under
    /// `functions/` that contain at least one `config*.json` fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the functions directory is
    /// missing.
    pub fn find_function_dirs(&self) -> Result<Vec<PathBuf>> {
        let root = self.functions_dir();
        let dirs = list_dirs(&root)?;
        Ok(dirs
            .into_iter()
            .filter(|d| has_config_fragment(d))
            .collect())
    }

    /// Finds every event-API folder: a sorted listing of directories
    /// under the API category that contain `api.json` and a `routes/`
    /// sub-directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the API directory is missing.
    pub fn find_api_dirs(&self) -> Result<Vec<PathBuf>> {
        let root = self.category_dir(ResourceCategory::EventApis);
        let dirs = list_dirs(&root)?;
        Ok(dirs
            .into_iter()
            .filter(|d| d.join("api.json").is_file() && d.join("routes").is_dir())
            .collect())
    }

    /// Finds every route file under an API folder's `routes/` directory,
    /// recursively, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the routes directory is
    /// missing.
    pub fn find_route_files(&self, api_dir: &Path) -> Result<Vec<PathBuf>> {
        let routes_dir = api_dir.join("routes");
        if !routes_dir.is_dir() {
            return Err(LoomError::Config(ConfigError::not_found(routes_dir)));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&routes_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| {
                e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "json")
            })
            .map(|e| e.into_path())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Loads one fragment by absolute or workspace-relative path, expanded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] or [`ConfigError::Parse`].
    pub fn load_path(&self, path: &Path) -> Result<ResolvedConfig> {
        let raw = read_object(path)?;
        Ok(ResolvedConfig {
            value: expand_object(&raw, &self.vars),
            source: path.to_path_buf(),
        })
    }

    /// Resolves a policy file reference: the resource's own folder is
    /// checked first, then the shared policy directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] naming the shared-directory path
    /// when neither location has the file.
    pub fn resolve_policy_path(&self, policy_file: &str, base_folder: Option<&Path>) -> Result<PathBuf> {
        let as_path = Path::new(policy_file);
        if as_path.is_absolute() {
            return if as_path.is_file() {
                Ok(as_path.to_path_buf())
            } else {
                Err(LoomError::Config(ConfigError::not_found(as_path)))
            };
        }

        if let Some(base) = base_folder {
            let local = base.join(policy_file);
            if local.is_file() {
                return Ok(local);
            }
        }

        let shared = self.category_dir(ResourceCategory::Policies).join(policy_file);
        if shared.is_file() {
            Ok(shared)
        } else {
            Err(LoomError::Config(ConfigError::not_found(shared)))
        }
    }
}

/// Shallow merge: each top-level key of `over` replaces the entire value
/// at that key in `base`. Nested objects and lists are replaced whole,
/// never deep-merged.
pub fn shallow_merge(base: &mut FragmentObject, over: FragmentObject) {
    for (key, value) in over {
        base.insert(key, value);
    }
}

/// Reads a fragment file as a JSON object.
pub(crate) fn read_object(path: &Path) -> Result<FragmentObject> {
    if !path.is_file() {
        return Err(LoomError::Config(ConfigError::not_found(path)));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoomError::Config(ConfigError::parse(path, format!("read failed: {e}"))))?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| LoomError::Config(ConfigError::parse(path, e.to_string())))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(LoomError::Config(ConfigError::parse(
            path,
            format!(
                "expected a JSON object at the top level, got {}",
                json_kind(&other)
            ),
        ))),
    }
}

/// Human-readable JSON value kind for error messages.
pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Lists `*.json` files in one directory, sorted, minus exclusions.
fn list_json_files(dir: &Path, exclude: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LoomError::Config(ConfigError::not_found(dir)));
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_none_or(|n| !exclude.contains(&n))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Lists sub-directories of one directory, sorted.
fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LoomError::Config(ConfigError::not_found(dir)));
    }
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Whether a folder holds at least one `config*.json` fragment.
fn has_config_fragment(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries.filter_map(std::result::Result::ok).any(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.starts_with("config") && name.ends_with(".json")
        })
    })
}

/// File or folder stem used as a fallback logical name.
pub(crate) fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_json(path: &Path, value: &Value) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn store(root: &Path, pairs: &[(&str, &str)]) -> ConfigStore {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ConfigStore::new(root, vars)
    }

    #[test]
    fn test_load_file_expands_placeholders() {
        let tmp = TempDir::new().unwrap();
        write_json(
            &tmp.path().join("configs/tables/messages.json"),
            &json!({"table_name": "messages-${EnvName}"}),
        );
        let store = store(tmp.path(), &[("EnvName", "dev")]);
        let resolved = store
            .load_file(ResourceCategory::Tables, "messages.json")
            .unwrap();
        assert_eq!(resolved.value["table_name"], "messages-dev");
        assert_eq!(resolved.logical_name(), "messages");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("configs/tables")).unwrap();
        let store = store(tmp.path(), &[]);
        let err = store
            .load_file(ResourceCategory::Tables, "missing.json")
            .unwrap_err();
        assert!(matches!(
            err,
            LoomError::Config(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("configs/tables/bad.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let store = store(tmp.path(), &[]);
        let err = store
            .load_file(ResourceCategory::Tables, "bad.json")
            .unwrap_err();
        assert!(matches!(err, LoomError::Config(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_non_object_top_level_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("configs/tables/list.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2, 3]").unwrap();
        let store = store(tmp.path(), &[]);
        let err = store
            .load_file(ResourceCategory::Tables, "list.json")
            .unwrap_err();
        match err {
            LoomError::Config(ConfigError::Parse { message, .. }) => {
                assert!(message.contains("an array"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_directory_lexicographic_order() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.json", "a.json", "c.json"] {
            write_json(
                &tmp.path().join("configs/tables").join(name),
                &json!({"x": 1}),
            );
        }
        let store = store(tmp.path(), &[]);
        let loaded = store.load_directory(ResourceCategory::Tables, &[]).unwrap();
        let names: Vec<String> = loaded
            .iter()
            .map(|c| c.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json", "c.json"]);
    }

    #[test]
    fn test_load_directory_excludes_named_files() {
        let tmp = TempDir::new().unwrap();
        write_json(&tmp.path().join("configs/tables/a.json"), &json!({"x": 1}));
        write_json(
            &tmp.path().join("configs/tables/defaults.json"),
            &json!({"x": 0}),
        );
        let store = store(tmp.path(), &[]);
        let loaded = store
            .load_directory(ResourceCategory::Tables, &["defaults.json"])
            .unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = store(tmp.path(), &[]);
        let err = store.load_directory(ResourceCategory::Tables, &[]).unwrap_err();
        assert!(matches!(
            err,
            LoomError::Config(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_defaults_merged_underneath_each_file() {
        let tmp = TempDir::new().unwrap();
        write_json(
            &tmp.path().join("configs/tables/defaults.json"),
            &json!({"billing_mode": "PAY_PER_REQUEST", "pitr": true}),
        );
        write_json(
            &tmp.path().join("configs/tables/messages.json"),
            &json!({"table_name": "messages", "pitr": false}),
        );
        let store = store(tmp.path(), &[]);
        let loaded = store
            .load_directory_with_defaults(ResourceCategory::Tables, "defaults.json")
            .unwrap();
        assert_eq!(loaded.len(), 1);
        let conf = &loaded[0].value;
        assert_eq!(conf["billing_mode"], "PAY_PER_REQUEST");
        // File keys win over defaults.
        assert_eq!(conf["pitr"], false);
    }

    #[test]
    fn test_shallow_merge_replaces_nested_objects_whole() {
        let mut base = json!({"key": {"a": 1, "b": 2}})
            .as_object()
            .unwrap()
            .clone();
        let over = json!({"key": {"c": 3}}).as_object().unwrap().clone();
        shallow_merge(&mut base, over);
        // Later fragment replaces the entire nested object.
        assert_eq!(Value::Object(base)["key"], json!({"c": 3}));
    }

    #[test]
    fn test_folder_merge_order_defaults_and_expansion() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("functions/chat");
        write_json(
            &folder.join("config.base.json"),
            &json!({"memory": 512, "handler": "app.main"}),
        );
        write_json(
            &folder.join("config.env.json"),
            &json!({"memory": 1024, "description": "env ${EnvName}"}),
        );
        let store = store(tmp.path(), &[("EnvName", "dev")]);
        let resolved = store
            .load_folder_merged(
                &folder,
                "config",
                &[
                    ("memory", json!(256)),
                    ("runtime", json!("python3.12")),
                    ("name", json!("${EnvName}-fallback")),
                ],
                &Variables::new(),
            )
            .unwrap();
        let conf = &resolved.value;
        // Later file overrides earlier.
        assert_eq!(conf["memory"], 1024);
        // Defaults fill only absent keys, and expand after filling.
        assert_eq!(conf["runtime"], "python3.12");
        assert_eq!(conf["name"], "dev-fallback");
        assert_eq!(conf["description"], "env dev");
        assert_eq!(conf["handler"], "app.main");
    }

    #[test]
    fn test_folder_merge_extra_vars_override() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("functions/chat");
        write_json(&folder.join("config.json"), &json!({"name": "fn-${EnvName}"}));
        let store = store(tmp.path(), &[("EnvName", "dev")]);
        let mut extra = Variables::new();
        extra.insert(String::from("EnvName"), String::from("main"));
        let resolved = store
            .load_folder_merged(&folder, "config", &[], &extra)
            .unwrap();
        assert_eq!(resolved.value["name"], "fn-main");
    }

    #[test]
    fn test_repeated_load_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        write_json(
            &tmp.path().join("configs/tables/messages.json"),
            &json!({"table_name": "m-${EnvName}", "keys": {"pk": "id"}}),
        );
        let store = store(tmp.path(), &[("EnvName", "dev")]);
        let first = store
            .load_file(ResourceCategory::Tables, "messages.json")
            .unwrap();
        let second = store
            .load_file(ResourceCategory::Tables, "messages.json")
            .unwrap();
        assert_eq!(
            serde_json::to_string(&first.value).unwrap(),
            serde_json::to_string(&second.value).unwrap()
        );
    }

    #[test]
    fn test_find_function_dirs_requires_config_fragment() {
        let tmp = TempDir::new().unwrap();
        write_json(
            &tmp.path().join("functions/chat/config.json"),
            &json!({"name": "chat"}),
        );
        fs::create_dir_all(tmp.path().join("functions/empty")).unwrap();
        let store = store(tmp.path(), &[]);
        let dirs = store.find_function_dirs().unwrap();
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].ends_with("chat"));
    }

    #[test]
    fn test_find_api_dirs_requires_api_json_and_routes() {
        let tmp = TempDir::new().unwrap();
        write_json(
            &tmp.path().join("configs/apis/chat/api.json"),
            &json!({"name": "chat"}),
        );
        fs::create_dir_all(tmp.path().join("configs/apis/chat/routes")).unwrap();
        write_json(
            &tmp.path().join("configs/apis/incomplete/api.json"),
            &json!({"name": "x"}),
        );
        let store = store(tmp.path(), &[]);
        let dirs = store.find_api_dirs().unwrap();
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].ends_with("chat"));
    }

    #[test]
    fn test_find_route_files_recursive_sorted() {
        let tmp = TempDir::new().unwrap();
        let api_dir = tmp.path().join("configs/apis/chat");
        write_json(&api_dir.join("routes/b.json"), &json!({"route_key": "b"}));
        write_json(&api_dir.join("routes/a.json"), &json!({"route_key": "a"}));
        write_json(
            &api_dir.join("routes/nested/c.json"),
            &json!({"route_key": "c"}),
        );
        let store = store(tmp.path(), &[]);
        let files = store.find_route_files(&api_dir).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json", "c.json"]);
    }

    #[test]
    fn test_resolve_policy_path_local_folder_first() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("functions/chat");
        write_json(&folder.join("policy.json"), &json!({"inline": {}}));
        write_json(
            &tmp.path().join("configs/policies/policy.json"),
            &json!({"managed": []}),
        );
        let store = store(tmp.path(), &[]);
        let path = store.resolve_policy_path("policy.json", Some(&folder)).unwrap();
        assert!(path.starts_with(&folder));
    }

    #[test]
    fn test_resolve_policy_path_falls_back_to_shared() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("functions/chat");
        fs::create_dir_all(&folder).unwrap();
        write_json(
            &tmp.path().join("configs/policies/shared.json"),
            &json!({"managed": []}),
        );
        let store = store(tmp.path(), &[]);
        let path = store.resolve_policy_path("shared.json", Some(&folder)).unwrap();
        assert!(path.ends_with("configs/policies/shared.json"));
    }

    #[test]
    fn test_resolve_policy_path_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("configs/policies")).unwrap();
        let store = store(tmp.path(), &[]);
        let err = store.resolve_policy_path("nope.json", None).unwrap_err();
        assert!(matches!(
            err,
            LoomError::Config(ConfigError::NotFound { .. })
        ));
    }
}
