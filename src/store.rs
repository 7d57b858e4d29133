//! Persistent client-side key-value state.
//!
//! The portal keeps two values between sessions: the serialized bookmark list
//! (`newsBookmarks`) and the theme preference (`theme`). [`FileStore`] keeps
//! them in one JSON object on disk; [`MemoryStore`] is a shared in-process map.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access state file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String-to-string storage that survives restarts.
///
/// Writes are synchronous: when `set` returns `Ok`, the value is durable.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// A JSON object file holding every key.
///
/// Holds only the path, so clones address the same file. Each `set` reads the
/// current file, updates one key and replaces the file through a temporary
/// sibling and a rename.
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

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file yet");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    /// A file that no longer parses is replaced, so the state stays writable.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut all = match self.read_all() {
            Err(StoreError::Serialize(e)) => {
                warn!(path = %self.path.display(), error = %e, "Replacing unreadable state file");
                BTreeMap::new()
            }
            other => other?,
        };
        all.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&all)?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), %key, "Persisted state");
        Ok(())
    }
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trips_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("state/portal.json"));

        assert_eq!(store.get("theme").unwrap(), None);
        store.set("theme", "dark".to_string()).unwrap();
        store.set("newsBookmarks", "[]".to_string()).unwrap();

        let reopened = FileStore::new(store.path());
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(reopened.get("newsBookmarks").unwrap().as_deref(), Some("[]"));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get("theme"), Err(StoreError::Serialize(_))));
    }

    #[test]
    fn test_file_store_set_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portal.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut store = FileStore::new(&path);
        store.set("theme", "dark".to_string()).unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get("newsBookmarks").unwrap(), None);
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let mut a = MemoryStore::new();
        let b = a.clone();
        a.set("theme", "light".to_string()).unwrap();
        assert_eq!(b.get("theme").unwrap().as_deref(), Some("light"));
    }
}
