//! Option resolution: which field an operation targets and which settings
//! apply to it, falling back from field options to instance overrides to
//! global configuration.

use imageup_common::paths::trim_slashes;
use imageup_common::{Error, Result};

use super::declaration::{Crop, FieldOptions};
use super::registry::FieldRegistry;

/// How an image is cropped during resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropMode {
    /// Proportional resize, no cropping.
    Off,
    /// Fill the target box exactly, cropping the excess.
    Fill,
    /// Cut a window anchored at `(x, y)`.
    Offset { x: u32, y: u32 },
}

/// Instance-level overrides a record type may define.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceOverrides {
    pub upload_path: Option<String>,
    pub upload_disk: Option<String>,
    pub auto_upload: Option<bool>,
}

/// The explicit name verbatim, else the first declared field.
pub fn resolve_field_name(registry: &FieldRegistry, explicit: Option<&str>) -> Option<String> {
    match explicit {
        Some(name) => Some(name.to_string()),
        None => registry
            .declared_fields()
            .first()
            .map(|decl| decl.name().to_string()),
    }
}

/// Effective options for a field; empty for a bare-name declaration.
///
/// Fails with [`Error::NoUploadFieldDefined`] when no name is given and no
/// field is declared, and with [`Error::UnknownUploadField`] when a given
/// name is not declared.
pub fn resolve_field_options(registry: &FieldRegistry, name: Option<&str>) -> Result<FieldOptions> {
    let declared = registry.declared_fields();

    let Some(name) = name else {
        return declared
            .first()
            .map(|decl| decl.options_or_default())
            .ok_or(Error::NoUploadFieldDefined);
    };

    declared
        .get(name)
        .map(|decl| decl.options_or_default())
        .ok_or_else(|| Error::unknown_field(name))
}

/// Resolve both name and options in one step.
pub fn resolve_field(
    registry: &FieldRegistry,
    explicit: Option<&str>,
) -> Result<(String, FieldOptions)> {
    let name = resolve_field_name(registry, explicit).ok_or(Error::NoUploadFieldDefined)?;
    let options = resolve_field_options(registry, Some(&name))?;
    Ok((name, options))
}

/// Crop override first, then the field's `crop` option, else no crop.
pub fn resolve_crop(options: &FieldOptions, crop_override: Option<(u32, u32)>) -> CropMode {
    if let Some((x, y)) = crop_override {
        return CropMode::Offset { x, y };
    }

    match options.crop {
        Some(Crop::Toggle(true)) => CropMode::Fill,
        Some(Crop::Offset([x, y])) => CropMode::Offset { x, y },
        Some(Crop::Toggle(false)) | None => CropMode::Off,
    }
}

/// `path` option, else the instance override, else the global directory,
/// trimmed of surrounding slashes.
pub fn resolve_upload_path(
    options: &FieldOptions,
    overrides: &InstanceOverrides,
    global_dir: &str,
) -> String {
    let dir = options
        .path
        .as_deref()
        .filter(|p| !p.is_empty())
        .or(overrides.upload_path.as_deref())
        .unwrap_or(global_dir);
    trim_slashes(dir).to_string()
}

/// `disk` option, else the instance override, else the global disk.
pub fn resolve_upload_disk(
    options: &FieldOptions,
    overrides: &InstanceOverrides,
    global_disk: &str,
) -> String {
    options
        .disk
        .as_deref()
        .filter(|d| !d.is_empty())
        .or(overrides.upload_disk.as_deref())
        .unwrap_or(global_disk)
        .to_string()
}

/// Field `auto_upload`, else the instance override, else the global flag.
pub fn resolve_auto_upload(
    options: &FieldOptions,
    overrides: &InstanceOverrides,
    global_flag: bool,
) -> bool {
    options
        .auto_upload
        .or(overrides.auto_upload)
        .unwrap_or(global_flag)
}

/// Request field carrying the upload for `field`.
pub fn resolve_file_input(field: &str, options: &FieldOptions) -> String {
    options
        .file_input
        .clone()
        .unwrap_or_else(|| field.to_string())
}

/// Encoder quality for the field.
pub fn resolve_quality(options: &FieldOptions, global_quality: u8) -> u8 {
    options.resize_image_quality.unwrap_or(global_quality)
}
