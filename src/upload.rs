//! The upload orchestrator.
//!
//! [`Uploader`] owns the collaborators (disks, codec, validator, hook
//! handlers) and the process-wide [`UploadSettings`]. Each call resolves an
//! [`UploadContext`] from the record and threads it through validation,
//! resize, storage and the record update; nothing about the call is left
//! behind on the record except the stored path.

use std::sync::Arc;

use imageup_common::paths::join_storage_path;
use imageup_common::Result;

use crate::config::{Config, UploadSettings};
use crate::fields::{
    resolve_crop, resolve_field, resolve_quality, resolve_upload_disk, resolve_upload_path,
    CropMode, FieldKind, FieldOptions,
};
use crate::hooks::{HandlerRegistry, Hook, Payload};
use crate::images::{ImageCodec, ImageHandle, RasterCodec, ResizePlan};
use crate::record::HasUploads;
use crate::request::UploadedFile;
use crate::storage::{DiskManager, Storage, Visibility};
use crate::validation::{RuleValidator, Validator};

/// Everything one upload call needs to know about its target field.
#[derive(Debug, Clone)]
pub struct UploadContext {
    pub field: String,
    pub options: FieldOptions,
    pub kind: FieldKind,
    /// Crop override taken from the record for this call.
    pub crop_override: Option<(u32, u32)>,
}

impl UploadContext {
    /// Resolve the context for `field` (or the first declared field).
    pub fn resolve<R: HasUploads + ?Sized>(record: &R, field: Option<&str>) -> Result<Self> {
        let registry = record.upload_fields();
        let (field, options) = resolve_field(&registry, field)?;
        let kind = registry.kind_of(&field).unwrap_or(FieldKind::Image);

        Ok(Self {
            field,
            options,
            kind,
            crop_override: None,
        })
    }

    pub fn crop(&self) -> CropMode {
        resolve_crop(&self.options, self.crop_override)
    }
}

/// Stores uploads for records.
pub struct Uploader {
    settings: UploadSettings,
    disks: DiskManager,
    codec: Arc<dyn ImageCodec>,
    validator: Arc<dyn Validator>,
    handlers: HandlerRegistry,
}

impl Uploader {
    pub fn builder(settings: UploadSettings) -> UploaderBuilder {
        UploaderBuilder::new(settings)
    }

    /// Build with the default codec and validator and the configured disks.
    pub fn from_config(config: &Config) -> Result<Self> {
        let disks = DiskManager::from_config(&config.disks)?;
        Ok(Self::builder(config.imageup.clone()).disks(disks).build())
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    pub fn disks(&self) -> &DiskManager {
        &self.disks
    }

    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    /// Upload an image (or, for a file field, a file) and return its stored path.
    pub fn upload_image<R: HasUploads>(
        &self,
        record: &mut R,
        file: &UploadedFile,
        field: Option<&str>,
    ) -> Result<String> {
        let mut ctx = UploadContext::resolve(&*record, field)?;

        if let Some(rules) = &ctx.options.rules {
            self.validator.validate(&ctx.field, file, rules)?;
        }

        let overrides = record.overrides();
        let disk_name =
            resolve_upload_disk(&ctx.options, &overrides, &self.settings.upload_disk);
        let disk = self.disks.disk(&disk_name)?;
        let dir = resolve_upload_path(&ctx.options, &overrides, &self.settings.upload_directory);
        let file_name = record
            .upload_file_name(&ctx.field, file)
            .unwrap_or_else(|| file.hash_name().to_string());
        let path = join_storage_path(&dir, &file_name);

        tracing::debug!(
            field = %ctx.field,
            kind = %ctx.kind,
            disk = %disk_name,
            path = %path,
            "resolved upload target"
        );

        match ctx.kind {
            FieldKind::File => self.store_file(disk.as_ref(), &ctx, file, &path)?,
            FieldKind::Image => {
                ctx.crop_override = record.upload_state_mut().take_crop();
                self.store_image(disk.as_ref(), &ctx, file, &path)?;
            }
        }

        let previous = record.original(&ctx.field);

        if ctx.options.updates_database() {
            record.set_attribute(&ctx.field, path.clone());
            record.save_quietly()?;
        }

        if let Some(previous) = previous.filter(|p| !p.is_empty() && *p != path) {
            tracing::debug!(field = %ctx.field, path = %previous, "deleting superseded upload");
            delete_if_exists(disk.as_ref(), &previous)?;
        }

        tracing::info!(field = %ctx.field, disk = %disk_name, path = %path, "stored upload");
        Ok(path)
    }

    /// Same pipeline as [`Uploader::upload_image`]; the field's kind decides
    /// whether the payload is resized.
    pub fn upload_file<R: HasUploads>(
        &self,
        record: &mut R,
        file: &UploadedFile,
        field: Option<&str>,
    ) -> Result<String> {
        self.upload_image(record, file, field)
    }

    fn store_file(
        &self,
        disk: &dyn Storage,
        ctx: &UploadContext,
        file: &UploadedFile,
        path: &str,
    ) -> Result<()> {
        self.run_hook(ctx.options.before_save.as_ref(), &mut Payload::File(file))?;
        disk.put(path, file.data(), Visibility::Public)?;
        self.run_hook(ctx.options.after_save.as_ref(), &mut Payload::File(file))
    }

    fn store_image(
        &self,
        disk: &dyn Storage,
        ctx: &UploadContext,
        file: &UploadedFile,
        path: &str,
    ) -> Result<()> {
        let mut image = self.resize_image(file, &ctx.options, ctx.crop())?;

        self.run_hook(ctx.options.before_save.as_ref(), &mut Payload::Image(&mut *image))?;

        let quality = resolve_quality(&ctx.options, self.settings.resize_image_quality);
        let encoded = image.encode(quality)?;
        disk.put(path, &encoded, Visibility::Public)?;

        self.run_hook(ctx.options.after_save.as_ref(), &mut Payload::Image(&mut *image))?;
        image.release();
        Ok(())
    }

    fn run_hook(&self, hook: Option<&Hook>, payload: &mut Payload<'_>) -> Result<()> {
        match hook {
            Some(hook) => self.handlers.trigger(hook, payload),
            None => Ok(()),
        }
    }

    /// Decode `file` and apply the resize decided by `options` and `crop`.
    pub fn resize_image(
        &self,
        file: &UploadedFile,
        options: &FieldOptions,
        crop: CropMode,
    ) -> Result<Box<dyn ImageHandle>> {
        let mut image = self.codec.decode(file.data())?;
        let plan = ResizePlan::from_options(options, crop);

        tracing::debug!(
            ?plan,
            src_width = image.width(),
            src_height = image.height(),
            "resizing image"
        );
        plan.apply(&mut *image, self.settings.upscale);
        Ok(image)
    }

    /// Public URL of the image stored in `field`.
    ///
    /// An empty value falls back to the field's `placeholder`. A field with
    /// `update_database = false` has no stored value and yields the
    /// placeholder or an empty string.
    pub fn image_url<R: HasUploads>(&self, record: &R, field: Option<&str>) -> Result<String> {
        let ctx = UploadContext::resolve(record, field)?;

        let value = if ctx.options.updates_database() {
            record.original(&ctx.field).unwrap_or_default()
        } else {
            return Ok(ctx.options.placeholder.clone().unwrap_or_default());
        };

        if value.is_empty() {
            if let Some(placeholder) = &ctx.options.placeholder {
                return Ok(placeholder.clone());
            }
        }

        let disk = self.disk_for(record, &ctx.options)?;
        Ok(disk.url(&value))
    }

    pub fn file_url<R: HasUploads>(&self, record: &R, field: Option<&str>) -> Result<String> {
        self.image_url(record, field)
    }

    /// `<img>` tag for an image field, or `""` for unknown and file fields
    /// and whenever the URL cannot be resolved.
    pub fn image_tag<R: HasUploads>(&self, record: &R, field: Option<&str>, attributes: &str) -> String {
        let Some(name) = record.upload_field_name(field) else {
            return String::new();
        };
        if !record.has_image_field(&name) || record.has_file_field(&name) {
            return String::new();
        }

        match self.image_url(record, Some(&name)) {
            Ok(url) if attributes.is_empty() => format!("<img src=\"{url}\" />"),
            Ok(url) => format!("<img src=\"{url}\" {attributes} />"),
            Err(e) => {
                tracing::warn!(field = %name, error = %e, "failed to render image tag");
                String::new()
            }
        }
    }

    /// Delete a stored image from the record's disk; missing files are ignored.
    pub fn delete_image<R: HasUploads>(&self, record: &R, path: &str) -> Result<()> {
        let options = record.upload_field_options(None).unwrap_or_default();
        let disk = self.disk_for(record, &options)?;
        delete_if_exists(disk.as_ref(), path)
    }

    pub fn delete_file<R: HasUploads>(&self, record: &R, path: &str) -> Result<()> {
        self.delete_image(record, path)
    }

    pub(crate) fn disk_for<R: HasUploads + ?Sized>(
        &self,
        record: &R,
        options: &FieldOptions,
    ) -> Result<Arc<dyn Storage>> {
        let name = resolve_upload_disk(options, &record.overrides(), &self.settings.upload_disk);
        self.disks.disk(&name)
    }
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader")
            .field("settings", &self.settings)
            .field("disks", &self.disks)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

pub(crate) fn delete_if_exists(disk: &dyn Storage, path: &str) -> Result<()> {
    if disk.exists(path) {
        disk.delete(path)?;
        tracing::info!(disk = %disk.name(), path = %path, "deleted upload");
    }
    Ok(())
}

/// Builder for [`Uploader`].
pub struct UploaderBuilder {
    settings: UploadSettings,
    disks: DiskManager,
    codec: Option<Arc<dyn ImageCodec>>,
    validator: Option<Arc<dyn Validator>>,
    handlers: HandlerRegistry,
}

impl UploaderBuilder {
    pub fn new(settings: UploadSettings) -> Self {
        Self {
            settings,
            disks: DiskManager::new(),
            codec: None,
            validator: None,
            handlers: HandlerRegistry::new(),
        }
    }

    pub fn disks(mut self, disks: DiskManager) -> Self {
        self.disks = disks;
        self
    }

    pub fn disk(mut self, disk: Arc<dyn Storage>) -> Self {
        self.disks.insert(disk);
        self
    }

    pub fn codec(mut self, codec: impl ImageCodec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn build(self) -> Uploader {
        Uploader {
            settings: self.settings,
            disks: self.disks,
            codec: self
                .codec
                .unwrap_or_else(|| Arc::new(RasterCodec::new())),
            validator: self
                .validator
                .unwrap_or_else(|| Arc::new(RuleValidator::new())),
            handlers: self.handlers,
        }
    }
}
