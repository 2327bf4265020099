//! Persistent key/value storage for configuration overrides.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SETTINGS_NAMESPACE;
use crate::error::{Result, VoxError};

/// String key/value storage scoped to one settings namespace.
pub trait SettingsStore: Send + Sync {
    /// Stored value for `key`, or `None` when absent.
    fn get_string(&self, key: &str) -> Result<Option<String>>;
    fn set_string(&self, key: &str, value: &str) -> Result<()>;
    /// Remove `key`; erasing a missing key is not an error.
    fn erase_key(&self, key: &str) -> Result<()>;

    /// Write several entries as one update. Stores that can commit a batch
    /// atomically override this.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.set_string(key, value)?;
        }
        Ok(())
    }

    fn erase_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.erase_key(key)?;
        }
        Ok(())
    }
}

/// File-backed store keeping one TOML file per namespace.
///
/// # Example
/// ```no_run
/// use voxlink::config::{FileSettingsStore, SettingsStore};
///
/// let store = FileSettingsStore::new_default();
/// store.set_string("model_name", "gemini-1.5-pro")?;
/// # Ok::<(), voxlink::error::VoxError>(())
/// ```
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSettingsStore {
    /// Store for the provider configuration namespace under `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_namespace(base_dir, SETTINGS_NAMESPACE)
    }

    pub fn with_namespace(base_dir: impl Into<PathBuf>, namespace: &str) -> Self {
        Self {
            path: base_dir.into().join(format!("{namespace}.toml")),
            write_lock: Mutex::new(()),
        }
    }

    /// Store rooted at `~/.voxlink`.
    pub fn new_default() -> Self {
        Self::new(default_voxlink_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn namespace(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| SETTINGS_NAMESPACE.to_string())
    }

    fn read_values(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(VoxError::Io(err)),
        };
        let file: SettingsFile = toml::from_str(&raw)?;
        Ok(file.values)
    }

    fn write_values(&self, values: BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = SettingsFile {
            version: 1,
            namespace: self.namespace(),
            saved_at: Utc::now(),
            values,
        };
        fs::write(&self.path, toml::to_string(&file)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| VoxError::Settings("settings write lock poisoned".into()))?;
        let mut values = self.read_values()?;
        if apply(&mut values) {
            self.write_values(values)?;
        }
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_values()?.remove(key))
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn erase_key(&self, key: &str) -> Result<()> {
        self.update(|values| values.remove(key).is_some())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.update(|values| {
            for (key, value) in entries {
                values.insert(key.to_string(), value.to_string());
            }
            !entries.is_empty()
        })
    }

    fn erase_many(&self, keys: &[&str]) -> Result<()> {
        self.update(|values| {
            let mut changed = false;
            for key in keys {
                changed |= values.remove(*key).is_some();
            }
            changed
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsFile {
    version: u32,
    namespace: String,
    saved_at: DateTime<Utc>,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// In-memory store, useful for tests and hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| VoxError::Settings("settings lock poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .map_err(|_| VoxError::Settings("settings lock poisoned".into()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn erase_key(&self, key: &str) -> Result<()> {
        self.values
            .write()
            .map_err(|_| VoxError::Settings("settings lock poisoned".into()))?
            .remove(key);
        Ok(())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| VoxError::Settings("settings lock poisoned".into()))?;
        for (key, value) in entries {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

fn default_voxlink_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".voxlink"))
        .unwrap_or_else(|| PathBuf::from(".voxlink"))
}
