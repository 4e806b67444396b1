//! The record contract the upload core works against.
//!
//! A host model type implements [`HasUploads`]: it exposes its declared
//! fields, reads and writes string attributes, and persists itself without
//! firing its save listeners. Everything else (field resolution, crop and
//! auto-upload toggles, redeclaring fields at runtime) comes as provided
//! methods backed by the record's [`UploadState`].

use std::collections::BTreeMap;

use imageup_common::Result;

use crate::fields::{
    redeclare, resolve_field_name, resolve_field_options, FieldOptions, FieldRegistry, FieldTable,
    InstanceOverrides,
};
use crate::request::UploadedFile;

/// Per-instance upload state carried by a record.
#[derive(Debug, Clone, Default)]
pub struct UploadState {
    /// Image table set at runtime; replaces the type-level table when present.
    pub image_fields: Option<FieldTable>,
    pub file_fields: Option<FieldTable>,
    /// Pending `[x, y]` crop for the next resize.
    pub crop_coordinates: Option<(u32, u32)>,
    pub auto_upload_disabled: bool,
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the pending crop coordinates.
    pub fn take_crop(&mut self) -> Option<(u32, u32)> {
        self.crop_coordinates.take()
    }
}

pub trait HasUploads {
    /// Image fields declared by the record type.
    fn image_fields(&self) -> FieldTable {
        FieldTable::new()
    }

    /// File fields declared by the record type.
    fn file_fields(&self) -> FieldTable {
        FieldTable::new()
    }

    fn upload_state(&self) -> &UploadState;

    fn upload_state_mut(&mut self) -> &mut UploadState;

    /// Current (possibly unsaved) attribute value.
    fn attribute(&self, field: &str) -> Option<String>;

    /// Attribute value as last persisted.
    fn original(&self, field: &str) -> Option<String>;

    fn set_attribute(&mut self, field: &str, value: String);

    /// Persist without dispatching save events, so the auto-upload
    /// listener does not run again.
    fn save_quietly(&mut self) -> Result<()>;

    /// Instance-level upload directory.
    fn upload_path(&self) -> Option<String> {
        None
    }

    /// Instance-level disk name.
    fn upload_disk(&self) -> Option<String> {
        None
    }

    /// Instance-level auto-upload default.
    fn auto_upload_images(&self) -> Option<bool> {
        None
    }

    /// Custom stored file name for an upload; `None` keeps the hash name.
    fn upload_file_name(&self, _field: &str, _file: &UploadedFile) -> Option<String> {
        None
    }

    /// Image and file tables in effect for this instance.
    fn upload_fields(&self) -> FieldRegistry {
        let state = self.upload_state();
        let images = state
            .image_fields
            .clone()
            .unwrap_or_else(|| self.image_fields());
        let files = state
            .file_fields
            .clone()
            .unwrap_or_else(|| self.file_fields());
        FieldRegistry::new(images, files)
    }

    fn set_images_field(&mut self, fields: FieldTable) -> &mut Self
    where
        Self: Sized,
    {
        let current = self.upload_fields().image_fields().clone();
        let table = redeclare(&self.image_fields(), &current, fields);
        self.upload_state_mut().image_fields = Some(table);
        self
    }

    fn set_files_field(&mut self, fields: FieldTable) -> &mut Self
    where
        Self: Sized,
    {
        let current = self.upload_fields().file_fields().clone();
        let table = redeclare(&self.file_fields(), &current, fields);
        self.upload_state_mut().file_fields = Some(table);
        self
    }

    /// Crop the next resized image at `(x, y)`.
    fn crop_to(&mut self, x: u32, y: u32) -> &mut Self
    where
        Self: Sized,
    {
        self.upload_state_mut().crop_coordinates = Some((x, y));
        self
    }

    fn disable_auto_upload(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.upload_state_mut().auto_upload_disabled = true;
        self
    }

    fn enable_auto_upload(&mut self) -> &mut Self
    where
        Self: Sized,
    {
        self.upload_state_mut().auto_upload_disabled = false;
        self
    }

    /// Whether `name` is declared as an image or a file field.
    fn has_image_field(&self, name: &str) -> bool {
        self.upload_fields().has_field(name)
    }

    fn has_file_field(&self, name: &str) -> bool {
        self.upload_fields().has_file_field(name)
    }

    fn upload_field_name(&self, explicit: Option<&str>) -> Option<String> {
        resolve_field_name(&self.upload_fields(), explicit)
    }

    fn upload_field_options(&self, name: Option<&str>) -> Result<FieldOptions> {
        resolve_field_options(&self.upload_fields(), name)
    }

    fn overrides(&self) -> InstanceOverrides {
        InstanceOverrides {
            upload_path: self.upload_path(),
            upload_disk: self.upload_disk(),
            auto_upload: self.auto_upload_images(),
        }
    }
}

/// A detached in-memory record, declared from configuration or in code.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecord {
    model: String,
    images: FieldTable,
    files: FieldTable,
    attributes: BTreeMap<String, String>,
    original: BTreeMap<String, String>,
    state: UploadState,
    saves: usize,
}

impl MemoryRecord {
    pub fn new(model: impl Into<String>, images: FieldTable, files: FieldTable) -> Self {
        Self {
            model: model.into(),
            images,
            files,
            ..Self::default()
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Set an attribute as if it had been loaded from storage.
    pub fn with_persisted(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        self.attributes.insert(field.clone(), value.clone());
        self.original.insert(field, value);
        self
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Number of quiet saves performed.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl HasUploads for MemoryRecord {
    fn image_fields(&self) -> FieldTable {
        self.images.clone()
    }

    fn file_fields(&self) -> FieldTable {
        self.files.clone()
    }

    fn upload_state(&self) -> &UploadState {
        &self.state
    }

    fn upload_state_mut(&mut self) -> &mut UploadState {
        &mut self.state
    }

    fn attribute(&self, field: &str) -> Option<String> {
        self.attributes.get(field).cloned()
    }

    fn original(&self, field: &str) -> Option<String> {
        self.original.get(field).cloned()
    }

    fn set_attribute(&mut self, field: &str, value: String) {
        self.attributes.insert(field.to_string(), value);
    }

    fn save_quietly(&mut self) -> Result<()> {
        self.original = self.attributes.clone();
        self.saves += 1;
        Ok(())
    }
}
