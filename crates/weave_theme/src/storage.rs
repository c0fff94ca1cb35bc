//! Key-value storage backends for preferences

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use weave_core::{Result, WeaveError};

/// Durable string key-value storage
pub trait StorageBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Write several values as one unit: either all of them land or none do.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<()>;
}

/// Volatile storage, used in tests and headless runs
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    values: FxHashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated storage
    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// JSON file storage
///
/// The file holds a flat string map. It is read once on open and rewritten in
/// full on every write; a failed write leaves the in-memory map unchanged.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open a store, starting empty if the file is missing or unreadable.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!(
                    "ignoring unreadable preference file {}: {}",
                    path.display(),
                    err
                );
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(values)
            .map_err(|err| WeaveError::Storage(err.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| WeaveError::Storage(err.to_string()))?;
        }
        fs::write(&self.path, content).map_err(|err| {
            WeaveError::Storage(format!("{}: {}", self.path.display(), err))
        })
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<()> {
        let unchanged = entries
            .iter()
            .all(|(key, value)| self.values.get(*key).map(String::as_str) == Some(*value));
        if unchanged {
            return Ok(());
        }
        let mut next = self.values.clone();
        for (key, value) in entries {
            next.insert(key.to_string(), value.to_string());
        }
        self.write(&next)?;
        self.values = next;
        Ok(())
    }
}
