//! Local key-value persistence for client preferences.
//!
//! Mirrors browser local storage: string values under string keys. Typed
//! access goes through [`StoredValue`], which never lets a storage failure
//! reach the caller.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::StorageError;

pub const FAVORITES_KEY: &str = "verba_latina_favorites";
pub const THEME_KEY: &str = "verba_latina_theme";

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value);
        Ok(())
    }
}

/// A store backed by a single JSON object file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        let mut items = match self.read_all() {
            Ok(items) => items,
            Err(StorageError::Json(e)) => {
                tracing::warn!(path = %self.path.display(), "Replacing corrupt storage file: {}", e);
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        items.insert(key.to_string(), value);

        // Write to a sibling file and rename it over the target so readers never see a partial file.
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(serde_json::to_string_pretty(&items)?.as_bytes())?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Typed, JSON-encoded access to one key, falling back to a default.
pub struct StoredValue<T> {
    key: &'static str,
    default: T,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StoredValue<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub const fn new(key: &'static str, default: T) -> Self {
        Self {
            key,
            default,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Reads the value, returning the default on any failure.
    pub fn load<S: KeyValueStore + ?Sized>(&self, store: &S) -> T {
        match store.get_item(self.key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key = self.key, "Ignoring corrupt stored value: {}", e);
                    self.default.clone()
                }
            },
            Ok(None) => self.default.clone(),
            Err(e) => {
                tracing::warn!(key = self.key, "Storage unavailable, using default: {}", e);
                self.default.clone()
            }
        }
    }

    /// Writes the value. Failures are logged and swallowed.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|raw| store.set_item(self.key, raw));
        if let Err(e) = result {
            tracing::error!(key = self.key, "Could not persist value: {}", e);
        }
    }

    /// Whether anything was ever written under this key.
    pub fn is_stored<S: KeyValueStore + ?Sized>(&self, store: &S) -> bool {
        matches!(store.get_item(self.key), Ok(Some(_)))
    }
}
