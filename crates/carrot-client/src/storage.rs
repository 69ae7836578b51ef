//! Small JSON key-value file standing in for browser local storage.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use carrot_core::favorites::FavoriteStore;

pub const FAVORITES_KEY: &str = "carrot_market_favorites";

pub struct LocalStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalStorage {
    /// The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let _guard = self.lock()?;
        let map = self.read()?;
        match map.get(key) {
            Some(value) => {
                let parsed = serde_json::from_value(value.clone())
                    .with_context(|| format!("unreadable value under {:?}", key))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let _guard = self.lock()?;
        let mut map = self.read()?;
        map.insert(key.to_string(), serde_json::to_value(value)?);
        self.write(&map)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut map = self.read()?;
        if map.remove(key).is_some() {
            self.write(&map)?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|e| anyhow::anyhow!("storage lock poisoned: {}", e))
    }

    fn read(&self) -> Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", self.path.display())),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    /// Writes to a sibling temp file, then renames over the original.
    fn write(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Local storage written: {}", self.path.display());
        Ok(())
    }
}

/// Favorite ids kept under [`FAVORITES_KEY`].
#[derive(Clone)]
pub struct StoredFavorites {
    storage: Arc<LocalStorage>,
}

impl StoredFavorites {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }
}

impl FavoriteStore for StoredFavorites {
    fn load(&self) -> Result<Option<Vec<String>>> {
        self.storage.get(FAVORITES_KEY)
    }

    fn save(&self, ids: &[String]) -> Result<()> {
        self.storage.set(FAVORITES_KEY, &ids)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("carrot-client-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let storage = LocalStorage::open(temp_path("store.json"));
        assert_eq!(storage.get::<Vec<String>>("anything").unwrap(), None);
        storage.remove("anything").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn values_survive_reopen() {
        let path = temp_path("store.json");
        let storage = LocalStorage::open(&path);
        storage.set("a", &vec!["1", "2"]).unwrap();
        storage.set("b", &42).unwrap();
        storage.remove("b").unwrap();

        let reopened = LocalStorage::open(&path);
        assert_eq!(reopened.get::<Vec<String>>("a").unwrap(), Some(vec!["1".into(), "2".into()]));
        assert_eq!(reopened.get::<i64>("b").unwrap(), None);
    }

    #[test]
    fn favorites_use_their_own_key() {
        let storage = Arc::new(LocalStorage::open(temp_path("store.json")));
        let favorites = StoredFavorites::new(storage.clone());
        assert_eq!(favorites.load().unwrap(), None);

        favorites.save(&["x".to_string()]).unwrap();
        assert_eq!(storage.get::<Vec<String>>(FAVORITES_KEY).unwrap(), Some(vec!["x".to_string()]));
    }

    #[test]
    fn malformed_favorites_are_an_error() {
        let storage = Arc::new(LocalStorage::open(temp_path("store.json")));
        storage.set(FAVORITES_KEY, &"not a list").unwrap();
        assert!(StoredFavorites::new(storage).load().is_err());
    }
}
