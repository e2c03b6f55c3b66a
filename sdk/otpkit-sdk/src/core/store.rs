//! Content-addressed storage for tree layers, keyed by hex root.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::tree::Layers;

pub type StoreError = Box<dyn Error + Send + Sync>;

pub trait TreeStore: Send + Sync {
    fn put(&self, root_hex: &str, layers: &Layers) -> Result<(), StoreError>;
    fn get(&self, root_hex: &str) -> Result<Option<Layers>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryTreeStore {
    entries: RwLock<HashMap<String, Layers>>,
}

impl MemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, root_hex: &str) -> bool {
        self.entries.read().contains_key(root_hex)
    }
}

impl TreeStore for MemoryTreeStore {
    fn put(&self, root_hex: &str, layers: &Layers) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert(root_hex.to_string(), layers.clone());
        Ok(())
    }

    fn get(&self, root_hex: &str) -> Result<Option<Layers>, StoreError> {
        Ok(self.entries.read().get(root_hex).cloned())
    }
}

/// One JSON file per root. Writes go through a temporary file and a rename
/// so readers never see a partial entry.
#[derive(Debug, Clone)]
pub struct FileTreeStore {
    dir: PathBuf,
}

impl FileTreeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, root_hex: &str) -> Result<PathBuf, StoreError> {
        if root_hex.is_empty() || !root_hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid root key: {root_hex}").into());
        }
        Ok(self.dir.join(format!("{root_hex}.json")))
    }
}

impl TreeStore for FileTreeStore {
    fn put(&self, root_hex: &str, layers: &Layers) -> Result<(), StoreError> {
        let path = self.entry_path(root_hex)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(layers)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn get(&self, root_hex: &str) -> Result<Option<Layers>, StoreError> {
        let path = self.entry_path(root_hex)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otpkit_state::sha256;

    fn layers() -> Layers {
        let leaves = vec![sha256(b"a"), sha256(b"b")];
        let root = otpkit_state::hash_pair(&leaves[0], &leaves[1]);
        Layers(vec![leaves, vec![root]])
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryTreeStore::new();
        let l = layers();
        let key = l.root_hex().unwrap();
        assert!(store.get(&key).unwrap().is_none());
        store.put(&key, &l).unwrap();
        assert_eq!(store.get(&key).unwrap(), Some(l));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTreeStore::new(dir.path().join("trees"));
        let l = layers();
        let key = l.root_hex().unwrap();
        store.put(&key, &l).unwrap();
        assert!(dir.path().join("trees").join(format!("{key}.json")).exists());
        assert_eq!(store.get(&key).unwrap(), Some(l));
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTreeStore::new(dir.path());
        assert!(store.put("../escape", &layers()).is_err());
        assert!(store.get("").is_err());
    }
}
