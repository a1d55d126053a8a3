use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::{StoreError, StoreResult};

/// Contract of the host's key-value store: whole-value read, overwrite, erase.
/// No partial updates, no transactions.
pub trait KeyValueStore {
    /// `Ok(None)` when the key has never been written (or was erased).
    fn read(&self, key: &str) -> StoreResult<Option<Value>>;
    fn write(&mut self, key: &str, value: &Value) -> StoreResult<()>;
    /// Erasing a missing key is not an error.
    fn erase(&mut self, key: &str) -> StoreResult<()>;
}

/// Volatile store, used by tests and as a stand-in when no directory is configured.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    entries: HashMap<String, Value>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for InMemoryStore {
    fn read(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &Value) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn erase(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key: `<dir>/<key>.json`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn io_error(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io { key: key.to_string(), source }
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> StoreResult<Option<Value>> {
        let content = match fs::read_to_string(self.path_for(key)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(key, e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Malformed { key: key.to_string(), source })
    }

    fn write(&mut self, key: &str, value: &Value) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;
        let json = serde_json::to_string(value)?;
        // Write-then-rename so a crash mid-write leaves the previous value intact.
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, json).map_err(|e| Self::io_error(key, e))?;
        fs::rename(&tmp, self.path_for(key)).map_err(|e| Self::io_error(key, e))?;
        Ok(())
    }

    fn erase(&mut self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}
