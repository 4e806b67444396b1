//! Inbound upload payloads and the request context they arrive through.

use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use imageup_common::paths::extension_of;
use imageup_common::{FileToken, Result};

/// An uploaded file: raw bytes plus the names it is known by.
///
/// The hashed storage name is generated once, when the payload is created,
/// so every call to [`UploadedFile::hash_name`] returns the same value. Its
/// extension follows the content when it is a recognised image, and the
/// client's filename otherwise.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    original_name: String,
    data: Bytes,
    hash_name: String,
}

impl UploadedFile {
    pub fn new(original_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let original_name = original_name.into();
        let data = data.into();
        let extension = sniff_extension(&data).or_else(|| extension_of(Path::new(&original_name)));
        let hash_name = FileToken::new().file_name(extension.as_deref());

        Self {
            original_name,
            data,
            hash_name,
        }
    }

    /// Read a payload from disk, keeping its file name as the original name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, data))
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Lowercased extension of the original name, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(Path::new(&self.original_name))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Generated unique filename, e.g. `3f2a...9c.jpg`.
    pub fn hash_name(&self) -> &str {
        &self.hash_name
    }
}

fn sniff_extension(data: &[u8]) -> Option<String> {
    image::guess_format(data)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .map(str::to_string)
}

/// Files attached to the request currently being handled.
pub trait RequestFiles {
    fn has_file(&self, name: &str) -> bool;

    fn file(&self, name: &str) -> Option<UploadedFile>;
}

/// Request context backed by a map of input name to file.
#[derive(Debug, Clone, Default)]
pub struct MemoryRequest {
    files: HashMap<String, UploadedFile>,
}

impl MemoryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a file under an input name.
    pub fn with_file(mut self, input: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(input.into(), file);
        self
    }

    pub fn insert(&mut self, input: impl Into<String>, file: UploadedFile) {
        self.files.insert(input.into(), file);
    }
}

impl RequestFiles for MemoryRequest {
    fn has_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    fn file(&self, name: &str) -> Option<UploadedFile> {
        self.files.get(name).cloned()
    }
}
