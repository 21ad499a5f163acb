//! Key-value persistence behind the session store
//!
//! The session is stored as two entries under fixed keys. Writers go through
//! [`KeyValueStore::apply`], which commits a whole batch or nothing, so the
//! token and the user record never drift apart.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{Result, ScoreguardError};

/// Key of the opaque bearer token
pub const TOKEN_KEY: &str = "token";

/// Key of the serialized user record
pub const USER_KEY: &str = "user";

/// A single mutation in an atomic batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvOp {
    Put(String, String),
    Remove(String),
}

impl KvOp {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        KvOp::Put(key.into(), value.into())
    }

    pub fn remove(key: impl Into<String>) -> Self {
        KvOp::Remove(key.into())
    }
}

/// String key-value persistence
pub trait KeyValueStore: Send + Sync {
    /// Read a single entry
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Apply every operation or none of them
    fn apply(&self, ops: &[KvOp]) -> Result<()>;
}

fn apply_ops(entries: &mut BTreeMap<String, String>, ops: &[KvOp]) {
    for op in ops {
        match op {
            KvOp::Put(key, value) => {
                entries.insert(key.clone(), value.clone());
            }
            KvOp::Remove(key) => {
                entries.remove(key);
            }
        }
    }
}

/// In-process store, used by tests and throwaway runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw entries, bypassing any validation
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.lock().insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn apply(&self, ops: &[KvOp]) -> Result<()> {
        let mut entries = self.entries.lock();
        apply_ops(&mut entries, ops);
        Ok(())
    }
}

/// Single JSON object on disk
///
/// Writes go to a sibling `.tmp` file which is then renamed over the
/// original, so a crash leaves either the old or the new pair.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        // Bytes, not a string: invalid UTF-8 is corruption like any other.
        let content = std::fs::read(&self.path)?;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&content).map_err(|e| {
            ScoreguardError::Persistence(format!(
                "unreadable store {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.get(key).cloned())
    }

    fn apply(&self, ops: &[KvOp]) -> Result<()> {
        let _guard = self.lock.lock();
        // A corrupt file is replaced rather than merged into.
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(ScoreguardError::Persistence(reason)) => {
                tracing::warn!("Discarding corrupt session file: {}", reason);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        apply_ops(&mut entries, ops);
        self.write_all(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_batch() {
        let store = MemoryStore::new();
        store
            .apply(&[KvOp::put(TOKEN_KEY, "t"), KvOp::put(USER_KEY, "{}")])
            .unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("t"));
        assert_eq!(store.len(), 2);

        store
            .apply(&[KvOp::remove(TOKEN_KEY), KvOp::remove(USER_KEY)])
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileStore::new(&path)
            .apply(&[KvOp::put(TOKEN_KEY, "abc"), KvOp::put(USER_KEY, "{}")])
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get(USER_KEY).unwrap().as_deref(), Some("{}"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_removes_file_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::new(&path);

        store.apply(&[KvOp::put(TOKEN_KEY, "abc")]).unwrap();
        assert!(path.exists());

        store.apply(&[KvOp::remove(TOKEN_KEY)]).unwrap();
        assert!(!path.exists());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get(TOKEN_KEY),
            Err(ScoreguardError::Persistence(_))
        ));

        // Clearing over a corrupt file still succeeds.
        store
            .apply(&[KvOp::remove(TOKEN_KEY), KvOp::remove(USER_KEY)])
            .unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_file_store_non_utf8_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get(TOKEN_KEY),
            Err(ScoreguardError::Persistence(_))
        ));

        store.apply(&[KvOp::put(TOKEN_KEY, "fresh")]).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("fresh"));
    }
}
