//! YAML configuration manager with dotted-path lookups.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::error::{ConfigError, ConfigResult};

/// File name used under the user configuration directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Process-wide manager installed by [`initialize`]
static GLOBAL: RwLock<Option<Arc<ConfigManager>>> = RwLock::new(None);

/// A configuration lookup that did not resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingKey {
    /// Dotted key path as requested
    pub path: String,
    /// Number of failed lookups since the last (re)load
    pub attempts: u32,
}

#[derive(Debug)]
struct LoadedConfig {
    root: Value,
    loaded_at: DateTime<Utc>,
}

/// Loaded YAML configuration
///
/// All accessors take `&self`; the manager is shared behind an `Arc` when
/// installed globally, so the document and the miss counters use interior
/// locking.
#[derive(Debug)]
pub struct ConfigManager {
    path: PathBuf,
    state: RwLock<LoadedConfig>,
    missing: Mutex<BTreeMap<String, u32>>,
}

impl ConfigManager {
    /// Loads the YAML file at `path` (`~` is expanded)
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid YAML,
    /// or its root is not a mapping.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = expand_path(path.as_ref());
        let root = read_document(&path)?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(Self::with_root(path, root))
    }

    /// Builds a manager from YAML text that is not backed by a file
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML or its root is not a
    /// mapping.
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let root = parse_document(text)?;
        Ok(Self::with_root(PathBuf::new(), root))
    }

    fn with_root(path: PathBuf, root: Value) -> Self {
        Self {
            path,
            state: RwLock::new(LoadedConfig {
                root,
                loaded_at: Utc::now(),
            }),
            missing: Mutex::new(BTreeMap::new()),
        }
    }

    /// Path of the backing file (empty for in-memory managers)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Time of the most recent successful load
    pub fn last_loaded(&self) -> DateTime<Utc> {
        self.read_state().loaded_at
    }

    /// Re-reads the backing file and clears recorded misses
    ///
    /// On failure the previously loaded document stays active.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`ConfigManager::load`].
    pub fn reload(&self) -> ConfigResult<()> {
        let root = read_document(&self.path)?;
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.root = root;
            state.loaded_at = Utc::now();
        }
        self.clear_missing();
        tracing::debug!(path = %self.path.display(), "Configuration reloaded");
        Ok(())
    }

    /// Resolves a dotted key path, recording a miss on failure
    ///
    /// Mapping keys are matched as strings, integer segments index into
    /// sequences and empty segments are ignored, so `""` returns the whole
    /// document.
    ///
    /// # Errors
    ///
    /// Returns `MissingKey`, `InvalidIndex` or `IndexOutOfRange`.
    pub fn get(&self, key_path: &str) -> ConfigResult<Value> {
        let result = resolve(&self.read_state().root, key_path).cloned();
        if result.is_err() {
            self.record_missing(key_path);
        }
        result
    }

    /// Resolves a key path, returning `default` on a miss (the miss is
    /// still recorded)
    pub fn get_or(&self, key_path: &str, default: Value) -> Value {
        self.get(key_path).unwrap_or(default)
    }

    /// Resolves a key path without recording a miss
    pub fn get_untracked(&self, key_path: &str) -> Option<Value> {
        resolve(&self.read_state().root, key_path).ok().cloned()
    }

    /// Resolves a key path and deserializes the subtree into `T`
    ///
    /// # Errors
    ///
    /// Returns a lookup error (recorded as a miss) or `Deserialize`.
    pub fn get_as<T: DeserializeOwned>(&self, key_path: &str) -> ConfigResult<T> {
        let value = self.get(key_path)?;
        deserialize_value(key_path, value)
    }

    /// Returns recorded misses sorted by key path
    pub fn missing_keys(&self) -> Vec<MissingKey> {
        self.missing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(path, attempts)| MissingKey {
                path: path.clone(),
                attempts: *attempts,
            })
            .collect()
    }

    /// Forgets all recorded misses
    pub fn clear_missing(&self) {
        self.missing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Returns the top-level keys and values in document order
    pub fn top_level(&self) -> Vec<(String, Value)> {
        match &self.read_state().root {
            Value::Mapping(map) => map
                .iter()
                .map(|(k, v)| (key_to_string(k), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns a copy of the whole document
    pub fn snapshot(&self) -> Value {
        self.read_state().root.clone()
    }

    /// Serializes the document as YAML
    ///
    /// # Errors
    ///
    /// Returns `Serialize` if the document cannot be emitted.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        serde_yaml::to_string(&self.read_state().root)
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Serializes the document as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `Serialize` for documents with non-string mapping keys.
    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(&self.read_state().root)
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    fn record_missing(&self, key_path: &str) {
        let mut missing = self.missing.lock().unwrap_or_else(PoisonError::into_inner);
        *missing.entry(key_path.to_string()).or_insert(0) += 1;
        tracing::debug!(key = key_path, "Configuration key not found");
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, LoadedConfig> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Installs the process-wide configuration manager
///
/// The first call loads `path`. A later call with the same path returns the
/// active manager (reloading it when `force_reload` is set). A later call
/// with a different path fails unless `force_reload` is set, in which case
/// the new file replaces the active manager.
///
/// # Errors
///
/// Returns `AlreadyInitialized` for a conflicting path, or any load error.
pub fn initialize(path: impl AsRef<Path>, force_reload: bool) -> ConfigResult<Arc<ConfigManager>> {
    let requested = expand_path(path.as_ref());
    let mut slot = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);

    if let Some(existing) = slot.as_ref() {
        if existing.path() == requested {
            if force_reload {
                existing.reload()?;
            }
            return Ok(Arc::clone(existing));
        }
        if !force_reload {
            return Err(ConfigError::AlreadyInitialized {
                current: existing.path().to_path_buf(),
                requested,
            });
        }
    }

    let manager = Arc::new(ConfigManager::load(&requested)?);
    *slot = Some(Arc::clone(&manager));
    Ok(manager)
}

/// Returns the process-wide configuration manager
///
/// # Errors
///
/// Returns `NotInitialized` if [`initialize`] has not succeeded yet.
pub fn instance() -> ConfigResult<Arc<ConfigManager>> {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(Arc::clone)
        .ok_or(ConfigError::NotInitialized)
}

/// Default configuration file location (`<config_dir>/nautodog/config.yaml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nautodog").join(DEFAULT_CONFIG_FILE))
}

pub(crate) fn deserialize_value<T: DeserializeOwned>(key_path: &str, value: Value) -> ConfigResult<T> {
    serde_yaml::from_value(value).map_err(|e| ConfigError::Deserialize {
        path: key_path.to_string(),
        reason: e.to_string(),
    })
}

fn resolve<'a>(root: &'a Value, key_path: &str) -> ConfigResult<&'a Value> {
    let mut current = root;
    for segment in key_path.split('.').filter(|s| !s.is_empty()) {
        current = match current {
            Value::Mapping(map) => map
                .get(segment)
                .ok_or_else(|| ConfigError::MissingKey(key_path.to_string()))?,
            Value::Sequence(items) => {
                let index: i64 = segment.parse().map_err(|_| ConfigError::InvalidIndex {
                    segment: segment.to_string(),
                    path: key_path.to_string(),
                })?;
                usize::try_from(index)
                    .ok()
                    .and_then(|i| items.get(i))
                    .ok_or_else(|| ConfigError::IndexOutOfRange {
                        segment: segment.to_string(),
                        path: key_path.to_string(),
                    })?
            }
            _ => return Err(ConfigError::MissingKey(key_path.to_string())),
        };
    }
    Ok(current)
}

fn read_document(path: &Path) -> ConfigResult<Value> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text)
}

fn parse_document(text: &str) -> ConfigResult<Value> {
    let value: Value =
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    match value {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(value),
        other => Err(ConfigError::NotAMapping(value_kind(&other).to_string())),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        None => path.to_path_buf(),
    }
}
