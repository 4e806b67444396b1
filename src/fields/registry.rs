//! Field registry: the merged view of a record's image and file fields.

use super::declaration::{FieldKind, FieldTable};

/// Image and file declarations in effect for one record instance.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    images: FieldTable,
    files: FieldTable,
}

impl FieldRegistry {
    pub fn new(images: FieldTable, files: FieldTable) -> Self {
        Self { images, files }
    }

    pub fn image_fields(&self) -> &FieldTable {
        &self.images
    }

    pub fn file_fields(&self) -> &FieldTable {
        &self.files
    }

    /// File fields first, then image fields overlaid; an image declaration
    /// wins on a name collision.
    pub fn declared_fields(&self) -> FieldTable {
        let mut merged = self.files.clone();
        merged.merge(&self.images);
        merged
    }

    /// Whether `name` is declared in either table.
    pub fn has_field(&self, name: &str) -> bool {
        self.files.contains(name) || self.images.contains(name)
    }

    pub fn has_file_field(&self, name: &str) -> bool {
        self.files.contains(name)
    }

    /// File registry membership decides the pipeline.
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        if self.files.contains(name) {
            Some(FieldKind::File)
        } else if self.images.contains(name) {
            Some(FieldKind::Image)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.images.is_empty()
    }
}

/// Compute the instance table after a `set_*_field` call.
///
/// When the record type declares fields, the new declarations are merged by
/// key over the table currently in effect. Otherwise the instance table is
/// replaced outright.
pub fn redeclare(type_level: &FieldTable, current: &FieldTable, new: FieldTable) -> FieldTable {
    if type_level.is_empty() {
        return new;
    }

    let mut merged = current.clone();
    merged.merge(&new);
    merged
}
