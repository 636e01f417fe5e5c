//! Key-value stores for snapshots

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid store key {0:?}: only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidKey(String),
}

/// String key-value store; writes replace the previous value
pub trait SnapshotStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
}

/// Store keeping one `<key>.json` file per key in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl SnapshotStore for FileStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        atomic_write(&path, value.as_bytes()).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = value.len(), "stored snapshot");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

/// In-memory store, used by tests and sessions without a writable disk
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
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

impl SnapshotStore for MemoryStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Writes `data` to `{path}.tmp`, syncs it, then renames it over `path`
///
/// A crash mid-write leaves the previous file untouched. On error the
/// temporary file is removed.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = write_then_rename(&tmp_path, path, data);
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_then_rename(tmp_path: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("safety_plan_store_test_{name}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn file_store_round_trip() {
        let dir = test_dir("round_trip");
        let mut store = FileStore::new(&dir);

        assert_eq!(store.get("safetyPlan").unwrap(), None);
        store.put("safetyPlan", "{\"a\":1}").unwrap();
        assert_eq!(store.get("safetyPlan").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(dir.join("safetyPlan.json").exists());
        assert!(!dir.join("safetyPlan.json.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_last_write_wins() {
        let dir = test_dir("overwrite");
        let mut store = FileStore::new(&dir);

        store.put("safetyPlan", "first").unwrap();
        store.put("safetyPlan", "second").unwrap();
        assert_eq!(store.get("safetyPlan").unwrap().as_deref(), Some("second"));

        let files = fs::read_dir(&dir).unwrap().count();
        assert_eq!(files, 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_path_like_keys() {
        let mut store = FileStore::new(test_dir("keys"));
        assert!(matches!(
            store.put("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));

        let mut memory = MemoryStore::new();
        assert!(matches!(
            memory.put("a/b", "x"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = test_dir("failed_rename");
        // a non-empty directory cannot be replaced by a file
        let target = dir.join("occupied");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("inside"), b"x").unwrap();

        assert!(atomic_write(&target, b"data").is_err());
        assert!(!dir.join("occupied.tmp").exists());
        assert!(target.join("inside").is_file());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn memory_store_overwrites() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.put("safetyPlan", "one").unwrap();
        store.put("safetyPlan", "two").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("safetyPlan").unwrap().as_deref(), Some("two"));
    }
}
