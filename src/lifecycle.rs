//! Post-save and post-delete extension points.
//!
//! The host persistence layer calls [`after_save`] once a record has been
//! saved and [`after_delete`] once it has been deleted, passing the
//! [`Uploader`] to act through. Saves performed by the uploader itself go
//! through [`HasUploads::save_quietly`] and never reach these hooks.

use imageup_common::Result;

use crate::fields::{resolve_auto_upload, resolve_file_input};
use crate::record::HasUploads;
use crate::request::RequestFiles;
use crate::upload::{delete_if_exists, Uploader};

/// Upload every declared field whose file is present in `request`.
///
/// Returns the stored paths in declaration order. The first failing field
/// aborts the remaining ones.
pub fn after_save<R: HasUploads>(
    uploader: &Uploader,
    record: &mut R,
    request: &dyn RequestFiles,
) -> Result<Vec<String>> {
    if record.upload_state().auto_upload_disabled {
        tracing::debug!("auto upload disabled on record, skipping");
        return Ok(Vec::new());
    }

    let declared = record.upload_fields().declared_fields();
    let overrides = record.overrides();
    let mut stored = Vec::new();

    for decl in declared.iter() {
        let options = decl.options_or_default();
        if !resolve_auto_upload(&options, &overrides, uploader.settings().auto_upload_images) {
            continue;
        }

        let input = resolve_file_input(decl.name(), &options);
        if !request.has_file(&input) {
            continue;
        }
        let Some(file) = request.file(&input) else {
            continue;
        };

        tracing::debug!(field = %decl.name(), input = %input, "auto uploading");
        stored.push(uploader.upload_image(record, &file, Some(decl.name()))?);
    }

    Ok(stored)
}

/// Delete the stored file of every declared field.
///
/// `record` must still carry its pre-deletion attribute values. Nothing is
/// deleted unless `auto_delete_images` is enabled.
pub fn after_delete<R: HasUploads>(uploader: &Uploader, record: &R) -> Result<()> {
    if !uploader.settings().auto_delete_images {
        return Ok(());
    }

    for decl in record.upload_fields().declared_fields().iter() {
        let Some(path) = record.original(decl.name()).filter(|p| !p.is_empty()) else {
            continue;
        };
        let disk = uploader.disk_for(record, &decl.options_or_default())?;
        delete_if_exists(disk.as_ref(), &path)?;
    }

    Ok(())
}
