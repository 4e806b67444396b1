//! Filesystem-backed storage disk.
//!
//! Files live under `{root}/{path}`; intermediate directories are created on
//! write. On Unix, public files are made world-readable and private files
//! owner-only.

use std::path::PathBuf;

use imageup_common::{Error, Result};

use super::{ensure_contained, join_url, Storage, Visibility};

/// A disk rooted at a local directory.
pub struct LocalDisk {
    name: String,
    root: PathBuf,
    url: Option<String>,
}

impl LocalDisk {
    /// Create a new `LocalDisk`.
    ///
    /// # Arguments
    ///
    /// * `name` - Name the disk is registered under
    /// * `root` - Directory all paths are relative to
    /// * `url` - Public URL prefix for stored files, if the disk is served
    pub fn new(name: impl Into<String>, root: PathBuf, url: Option<String>) -> Self {
        Self {
            name: name.into(),
            root,
            url,
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn checked_path(&self, path: &str) -> Result<PathBuf> {
        ensure_contained(&self.name, path)?;
        Ok(self.full_path(path))
    }
}

impl Storage for LocalDisk {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, path: &str, contents: &[u8], visibility: Visibility) -> Result<()> {
        let file_path = self.checked_path(path)?;

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::storage(
                    &self.name,
                    format!("Failed to create directory {}: {e}", parent.display()),
                )
            })?;
        }

        std::fs::write(&file_path, contents).map_err(|e| {
            Error::storage(
                &self.name,
                format!("Failed to write file {}: {e}", file_path.display()),
            )
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = match visibility {
                Visibility::Public => 0o644,
                Visibility::Private => 0o600,
            };
            std::fs::set_permissions(&file_path, std::fs::Permissions::from_mode(mode)).map_err(
                |e| {
                    Error::storage(
                        &self.name,
                        format!("Failed to set permissions on {}: {e}", file_path.display()),
                    )
                },
            )?;
        }
        #[cfg(not(unix))]
        let _ = visibility;

        Ok(())
    }

    fn get(&self, path: &str) -> Result<Vec<u8>> {
        let file_path = self.checked_path(path)?;
        std::fs::read(&file_path).map_err(|e| {
            Error::storage(
                &self.name,
                format!("Failed to read file {}: {e}", file_path.display()),
            )
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.checked_path(path).is_ok_and(|p| p.is_file())
    }

    fn delete(&self, path: &str) -> Result<()> {
        let file_path = self.checked_path(path)?;
        if file_path.exists() {
            std::fs::remove_file(&file_path).map_err(|e| {
                Error::storage(
                    &self.name,
                    format!("Failed to delete file {}: {e}", file_path.display()),
                )
            })?;
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        join_url(self.url.as_deref(), path)
    }

    fn physical_path(&self, path: &str) -> PathBuf {
        self.full_path(path)
    }
}
