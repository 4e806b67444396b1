//! Upload field declarations and their recognized options.

use serde::{Deserialize, Serialize};

use crate::hooks::Hook;
use crate::validation::Rules;

/// Whether a declared field goes through the image pipeline or is stored as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Decoded, optionally resized/cropped, then re-encoded.
    Image,
    /// Stored byte-for-byte.
    File,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::File => f.write_str("file"),
        }
    }
}

/// The `crop` option: either a switch or a fixed `[x, y]` offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Crop {
    /// `true` crops to fill the target box; `false` disables cropping.
    Toggle(bool),
    /// Crop a window anchored at this offset.
    Offset([u32; 2]),
}

/// Options recognized on an upload field. Every option is optional; unset
/// options fall back to instance overrides and then global configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    /// Storage disk name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<String>,
    /// Storage-relative directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// URL returned when the field holds no file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Rules>,
    /// Write the stored path back to the record (default `true`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_database: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_upload: Option<bool>,
    /// Request field carrying the file, when it differs from the field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize_image_quality: Option<u8>,
    #[serde(skip_serializing_if = "unserializable_hook")]
    pub before_save: Option<Hook>,
    #[serde(skip_serializing_if = "unserializable_hook")]
    pub after_save: Option<Hook>,
}

fn unserializable_hook(hook: &Option<Hook>) -> bool {
    hook.as_ref().map_or(true, Hook::is_inline)
}

impl FieldOptions {
    /// Empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Crop to fill the `width` x `height` box.
    pub fn crop(mut self, crop: bool) -> Self {
        self.crop = Some(Crop::Toggle(crop));
        self
    }

    /// Crop a window anchored at `(x, y)`.
    pub fn crop_at(mut self, x: u32, y: u32) -> Self {
        self.crop = Some(Crop::Offset([x, y]));
        self
    }

    pub fn disk(mut self, disk: impl Into<String>) -> Self {
        self.disk = Some(disk.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn placeholder(mut self, url: impl Into<String>) -> Self {
        self.placeholder = Some(url.into());
        self
    }

    pub fn rules(mut self, rules: impl Into<Rules>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    pub fn update_database(mut self, update: bool) -> Self {
        self.update_database = Some(update);
        self
    }

    pub fn auto_upload(mut self, auto: bool) -> Self {
        self.auto_upload = Some(auto);
        self
    }

    pub fn file_input(mut self, input: impl Into<String>) -> Self {
        self.file_input = Some(input.into());
        self
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.resize_image_quality = Some(quality);
        self
    }

    pub fn before_save(mut self, hook: Hook) -> Self {
        self.before_save = Some(hook);
        self
    }

    pub fn after_save(mut self, hook: Hook) -> Self {
        self.after_save = Some(hook);
        self
    }

    /// Effective `update_database` flag.
    pub fn updates_database(&self) -> bool {
        self.update_database.unwrap_or(true)
    }

    /// True when either dimension is set.
    pub fn needs_resizing(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }
}

/// One declared upload field: a bare name, or a name with options.
#[derive(Debug, Clone)]
pub enum FieldDeclaration {
    Name(String),
    WithOptions(String, FieldOptions),
}

impl FieldDeclaration {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::WithOptions(name, _) => name,
        }
    }

    /// Declared options; `None` for a bare name.
    pub fn options(&self) -> Option<&FieldOptions> {
        match self {
            Self::Name(_) => None,
            Self::WithOptions(_, options) => Some(options),
        }
    }

    /// Declared options, or an empty set for a bare name.
    pub fn options_or_default(&self) -> FieldOptions {
        self.options().cloned().unwrap_or_default()
    }
}

impl From<&str> for FieldDeclaration {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for FieldDeclaration {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl<S: Into<String>> From<(S, FieldOptions)> for FieldDeclaration {
    fn from((name, options): (S, FieldOptions)) -> Self {
        Self::WithOptions(name.into(), options)
    }
}

/// Config form: a bare string, or an inline table with a `name` key.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDeclaration {
    Name(String),
    Table {
        name: String,
        #[serde(flatten)]
        options: FieldOptions,
    },
}

impl<'de> Deserialize<'de> for FieldDeclaration {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match RawDeclaration::deserialize(deserializer)? {
            RawDeclaration::Name(name) => Self::Name(name),
            RawDeclaration::Table { name, options } => Self::WithOptions(name, options),
        })
    }
}

impl Serialize for FieldDeclaration {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            Self::Name(name) => serializer.serialize_str(name),
            Self::WithOptions(name, options) => {
                let value = serde_json::to_value(options).map_err(serde::ser::Error::custom)?;
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("name", name)?;
                if let serde_json::Value::Object(entries) = value {
                    for (key, val) in entries {
                        map.serialize_entry(&key, &val)?;
                    }
                }
                map.end()
            }
        }
    }
}

/// Ordered table of declared fields, unique by name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FieldTable {
    entries: Vec<FieldDeclaration>,
}

impl FieldTable {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a bare field name.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.insert(FieldDeclaration::Name(name.into()));
        self
    }

    /// Add a field with options.
    pub fn field_with(mut self, name: impl Into<String>, options: FieldOptions) -> Self {
        self.insert(FieldDeclaration::WithOptions(name.into(), options));
        self
    }

    /// Insert by key. A declaration with options replaces an existing entry
    /// in place; a bare name never erases options already declared.
    pub fn insert(&mut self, decl: FieldDeclaration) {
        match self.entries.iter_mut().find(|d| d.name() == decl.name()) {
            Some(existing) => {
                if decl.options().is_some() {
                    *existing = decl;
                }
            }
            None => self.entries.push(decl),
        }
    }

    /// Overlay `other` on top of this table, keeping this table's order.
    pub fn merge(&mut self, other: &FieldTable) {
        for decl in &other.entries {
            self.insert(decl.clone());
        }
    }

    /// Whether `name` is declared, bare or with options.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&FieldDeclaration> {
        self.entries.iter().find(|d| d.name() == name)
    }

    pub fn first(&self) -> Option<&FieldDeclaration> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDeclaration> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(FieldDeclaration::name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<D: Into<FieldDeclaration>> FromIterator<D> for FieldTable {
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        let mut table = FieldTable::new();
        for decl in iter {
            table.insert(decl.into());
        }
        table
    }
}

impl<'de> Deserialize<'de> for FieldTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Vec::<FieldDeclaration>::deserialize(deserializer)?
            .into_iter()
            .collect())
    }
}
