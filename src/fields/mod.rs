//! Upload field declarations, the field registry and option resolution.
//!
//! A record type declares which of its attributes receive images and which
//! receive plain files. Declarations are either bare names or names with a
//! [`FieldOptions`] set. The [`FieldRegistry`] merges the two tables and the
//! resolver functions decide the effective settings for a single operation.

mod declaration;
mod registry;
mod resolver;

pub use declaration::{Crop, FieldDeclaration, FieldKind, FieldOptions, FieldTable};
pub use registry::{redeclare, FieldRegistry};
pub use resolver::{
    resolve_auto_upload, resolve_crop, resolve_field, resolve_field_name, resolve_field_options,
    resolve_file_input, resolve_quality, resolve_upload_disk, resolve_upload_path, CropMode,
    InstanceOverrides,
};
