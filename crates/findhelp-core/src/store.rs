//! Durable string key-value storage.
//!
//! Location snapshots and search-session context are persisted through
//! [`KeyValueStore`]. Writes replace the stored value wholesale; when two
//! writers race, the last one wins.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not a JSON object of strings: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait KeyValueStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] when the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the removal cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Process-local store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every mutation rewrites the whole file through a sibling temp file and a
/// rename, so readers never observe a half-written value. The in-memory view
/// only changes once the write has succeeded.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
    /// [`StoreError::Corrupt`] if it is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                    path: path.display().to_string(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "opened state file");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(entries)
            .map_err(|e| io_err(std::io::Error::from(e)))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries();
        let mut next = entries.clone();
        next.insert(key.to_owned(), value.to_owned());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries();
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}
