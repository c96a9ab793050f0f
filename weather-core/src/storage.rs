//! Durable key-value slots backing the search history.
//!
//! The history is written as one JSON document under a single key, so the
//! storage only needs whole-value `get`/`set`.

use std::{
    collections::HashMap,
    fmt::Debug,
    fs, io,
    path::PathBuf,
    sync::Mutex,
};

pub trait KeyValueStorage: Send + Sync + Debug {
    /// Returns `Ok(None)` when nothing has been stored under `key` yet.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Replaces the whole value stored under `key`.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// One file per key, `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Write next to the target and rename over it so readers never see
        // a truncated list.
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }
}

/// In-process storage; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded storage, handy for simulating what a previous run left behind.
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage.lock().insert(key.to_string(), value.to_string());
        storage
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a consistent map: every write is a single insert.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for std::sync::Arc<S> {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get("history").unwrap(), None);
    }

    #[test]
    fn file_storage_creates_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let storage = FileStorage::new(&nested);

        storage.set("history", "[1]").unwrap();
        storage.set("history", "[2]").unwrap();

        assert_eq!(storage.get("history").unwrap().as_deref(), Some("[2]"));
        assert!(storage.path_for("history").ends_with("history.json"));
        assert!(!nested.join(".history.json.tmp").exists());
    }

    #[test]
    fn memory_storage_roundtrip() {
        let storage = MemoryStorage::with_value("history", "[]");
        assert_eq!(storage.get("history").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.get("other").unwrap(), None);

        storage.set("other", "x").unwrap();
        assert_eq!(storage.get("other").unwrap().as_deref(), Some("x"));
    }
}
