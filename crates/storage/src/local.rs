//! Small key/value store for per-device state (score history, in-progress checkpoint).
//!
//! Values are opaque strings; callers store JSON blobs in them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LocalStoreError {
    #[error("local store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("local store contents are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("local store lock poisoned")]
    Poisoned,
}

pub trait LocalStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    /// # Errors
    ///
    /// Returns `LocalStoreError` if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the change cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), LocalStoreError>;
}

/// Process-local store, used by tests and when no state file is configured.
#[derive(Clone, Default)]
pub struct InMemoryLocalStore {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryLocalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for InMemoryLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let guard = self.values.lock().map_err(|_| LocalStoreError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let mut guard = self.values.lock().map_err(|_| LocalStoreError::Poisoned)?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        let mut guard = self.values.lock().map_err(|_| LocalStoreError::Poisoned)?;
        guard.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file, rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store, reading existing values. A missing file starts empty.
    ///
    /// A file that is not a JSON object of strings is moved aside to
    /// `<name>.corrupt` and the store starts empty.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError::Io` if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(values) => values,
                Err(err) => {
                    let aside = sibling(&path, "corrupt");
                    warn!(%err, path = %path.display(), aside = %aside.display(), "discarding unreadable local state");
                    if let Err(err) = std::fs::rename(&path, &aside) {
                        warn!(%err, path = %path.display(), "failed to move unreadable local state aside");
                    }
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(LocalStoreError::Io { path, source }),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), LocalStoreError> {
        let raw = serde_json::to_string_pretty(values)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LocalStoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        // Replaced via rename; the target is never partially written.
        let tmp = sibling(&self.path, "tmp");
        std::fs::write(&tmp, raw).map_err(|source| LocalStoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| LocalStoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// `quiz-state.json` -> `quiz-state.json.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

impl LocalStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let guard = self.values.lock().map_err(|_| LocalStoreError::Poisoned)?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let mut guard = self.values.lock().map_err(|_| LocalStoreError::Poisoned)?;
        guard.insert(key.to_string(), value.to_string());
        self.flush(&guard)
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        let mut guard = self.values.lock().map_err(|_| LocalStoreError::Poisoned)?;
        if guard.remove(key).is_some() {
            self.flush(&guard)?;
        }
        Ok(())
    }
}
