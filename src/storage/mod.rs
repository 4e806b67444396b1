//! Storage disks and disk selection.
//!
//! Uploads are written to a named disk. Each disk implements [`Storage`]
//! over storage-relative, `/`-separated paths. The [`DiskManager`] owns the
//! configured disks and hands them out by name.

mod local;
mod memory;

pub use local::LocalDisk;
pub use memory::MemoryDisk;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use imageup_common::paths::is_contained;
use imageup_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::config::{DiskConfig, DiskDriver};

/// Visibility of a stored file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// A storage backend addressed by relative paths.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait Storage: Send + Sync {
    /// Name the disk is registered under.
    fn name(&self) -> &str;

    /// Write `contents` to `path`, creating intermediate directories.
    fn put(&self, path: &str, contents: &[u8], visibility: Visibility) -> Result<()>;

    fn get(&self, path: &str) -> Result<Vec<u8>>;

    fn exists(&self, path: &str) -> bool;

    /// Delete `path`. Deleting a missing file is not an error.
    fn delete(&self, path: &str) -> Result<()>;

    /// Public URL for `path`.
    fn url(&self, path: &str) -> String;

    /// Physical location of `path` on this disk.
    fn physical_path(&self, path: &str) -> PathBuf;
}

/// Reject a path that would resolve outside the disk root.
pub(crate) fn ensure_contained(disk: &str, path: &str) -> Result<()> {
    if is_contained(path) {
        Ok(())
    } else {
        Err(Error::storage(disk, format!("Path escapes the disk root: {path}")))
    }
}

/// Registry of named disks.
#[derive(Clone, Default)]
pub struct DiskManager {
    disks: HashMap<String, Arc<dyn Storage>>,
}

impl DiskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every disk declared in configuration.
    pub fn from_config<'a>(disks: impl IntoIterator<Item = (&'a String, &'a DiskConfig)>) -> Result<Self> {
        let mut manager = Self::new();
        for (name, config) in disks {
            let disk: Arc<dyn Storage> = match config.driver {
                DiskDriver::Local => {
                    let root = config.root.clone().ok_or_else(|| {
                        Error::config(format!("disk `{name}` uses the local driver but has no root"))
                    })?;
                    let root = PathBuf::from(shellexpand::tilde(&root.to_string_lossy()).as_ref());
                    Arc::new(LocalDisk::new(name.clone(), root, config.url.clone()))
                }
                DiskDriver::Memory => Arc::new(MemoryDisk::new(name.clone(), config.url.clone())),
            };
            tracing::debug!(disk = %name, driver = ?config.driver, "registered storage disk");
            manager.disks.insert(name.clone(), disk);
        }
        Ok(manager)
    }

    /// Register (or replace) a disk under its own name.
    pub fn insert(&mut self, disk: Arc<dyn Storage>) {
        self.disks.insert(disk.name().to_string(), disk);
    }

    pub fn with_disk(mut self, disk: Arc<dyn Storage>) -> Self {
        self.insert(disk);
        self
    }

    pub fn disk(&self, name: &str) -> Result<Arc<dyn Storage>> {
        self.disks
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownDisk(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.disks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.disks.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for DiskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("DiskManager").field("disks", &names).finish()
    }
}

/// Join a URL prefix and a storage path.
pub(crate) fn join_url(base: Option<&str>, path: &str) -> String {
    let path = path.trim_start_matches('/');
    match base {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), path),
        None => format!("/{path}"),
    }
}
