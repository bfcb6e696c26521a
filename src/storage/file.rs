use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{KeyValueStore, StorageError};

/// A key-value store kept in a single JSON object file.
///
/// The whole file is read once when opened and rewritten on every change,
/// which mirrors how browser local storage behaves for a single tab.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; it is
    /// created on the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                StorageError::CorruptFile {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "store file does not exist yet");
                BTreeMap::new()
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        Ok(Self {
            path,
            entries: RefCell::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `entries` to disk. The in-memory map is left to the caller, which
    /// commits it only once this succeeds.
    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Encode {
                key: self.path.display().to_string(),
                source,
            }
        })?;

        // Replace atomically via a sibling temp file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        debug!(path = %self.path.display(), "store flushed");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut next = self.entries.borrow().clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *self.entries.borrow_mut() = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !self.entries.borrow().contains_key(key) {
            return Ok(());
        }
        let mut next = self.entries.borrow().clone();
        next.remove(key);
        self.flush(&next)?;
        *self.entries.borrow_mut() = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path).unwrap();
        store.set("transactions_1", "[]").unwrap();
        store.set("session", "\"1\"").unwrap();
        store.remove("session").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("transactions_1").unwrap(),
            Some("[]".to_string())
        );
        assert_eq!(reopened.get("session").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        let result = FileStore::open(&path);
        assert!(matches!(result, Err(StorageError::CorruptFile { .. })));
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let blocked = dir.path().join("blocked");
        let store = FileStore::open(blocked.join("store.json")).unwrap();

        // A plain file where the parent directory should be
        fs::write(&blocked, "").unwrap();

        let result = store.set("session", "\"1\"");
        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert_eq!(store.get("session").unwrap(), None);

        fs::remove_file(&blocked).unwrap();
        store.set("session", "\"1\"").unwrap();
        assert_eq!(store.get("session").unwrap(), Some("\"1\"".to_string()));
    }

    #[test]
    fn test_failed_remove_keeps_value() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        let store = FileStore::open(nested.join("store.json")).unwrap();
        store.set("session", "\"1\"").unwrap();

        fs::remove_dir_all(&nested).unwrap();
        fs::write(&nested, "").unwrap();

        assert!(store.remove("session").is_err());
        assert_eq!(store.get("session").unwrap(), Some("\"1\"".to_string()));
    }
}
