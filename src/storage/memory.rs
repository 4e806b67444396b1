//! In-memory storage disk, used for tests and scratch uploads.

use std::collections::BTreeMap;
use std::path::PathBuf;

use imageup_common::{Error, Result};
use parking_lot::RwLock;

use super::{ensure_contained, join_url, Storage, Visibility};

#[derive(Debug, Clone)]
struct StoredFile {
    contents: Vec<u8>,
    visibility: Visibility,
}

/// A disk that keeps files in a map.
pub struct MemoryDisk {
    name: String,
    url: Option<String>,
    files: RwLock<BTreeMap<String, StoredFile>>,
}

impl MemoryDisk {
    pub fn new(name: impl Into<String>, url: Option<String>) -> Self {
        Self {
            name: name.into(),
            url,
            files: RwLock::new(BTreeMap::new()),
        }
    }

    /// All stored paths in sorted order.
    pub fn paths(&self) -> Vec<String> {
        self.files.read().keys().cloned().collect()
    }

    pub fn visibility(&self, path: &str) -> Option<Visibility> {
        self.files.read().get(normalize(path)).map(|f| f.visibility)
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

impl Storage for MemoryDisk {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, path: &str, contents: &[u8], visibility: Visibility) -> Result<()> {
        ensure_contained(&self.name, path)?;
        self.files.write().insert(
            normalize(path).to_string(),
            StoredFile {
                contents: contents.to_vec(),
                visibility,
            },
        );
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .read()
            .get(normalize(path))
            .map(|f| f.contents.clone())
            .ok_or_else(|| Error::storage(&self.name, format!("File not found: {path}")))
    }

    fn exists(&self, path: &str) -> bool {
        self.files.read().contains_key(normalize(path))
    }

    fn delete(&self, path: &str) -> Result<()> {
        ensure_contained(&self.name, path)?;
        self.files.write().remove(normalize(path));
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        join_url(self.url.as_deref(), path)
    }

    fn physical_path(&self, path: &str) -> PathBuf {
        PathBuf::from(format!("memory://{}/{}", self.name, normalize(path)))
    }
}
