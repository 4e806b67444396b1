use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::fields::FieldTable;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub imageup: UploadSettings,

    #[serde(default = "default_disks")]
    pub disks: BTreeMap<String, DiskConfig>,

    /// Record types declared from configuration, keyed by model name.
    #[serde(default)]
    pub models: BTreeMap<String, ModelConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            imageup: UploadSettings::default(),
            disks: default_disks(),
            models: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Non-fatal problems worth reporting.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let settings = &self.imageup;

        if settings.resize_image_quality > 100 {
            warnings.push(format!(
                "resize_image_quality {} is above 100 and will be clamped",
                settings.resize_image_quality
            ));
        }

        if !self.disks.contains_key(&settings.upload_disk) {
            warnings.push(format!(
                "upload_disk '{}' is not declared under [disks]",
                settings.upload_disk
            ));
        }

        for (name, disk) in &self.disks {
            if disk.driver == DiskDriver::Local && disk.root.is_none() {
                warnings.push(format!("Local disk '{}' has no root", name));
            }
        }

        for (model, fields) in &self.models {
            for decl in fields.image_fields.iter().chain(fields.file_fields.iter()) {
                let Some(disk) = decl.options().and_then(|o| o.disk.as_deref()) else {
                    continue;
                };
                if !self.disks.contains_key(disk) {
                    warnings.push(format!(
                        "Field '{}.{}' uses undeclared disk '{}'",
                        model,
                        decl.name(),
                        disk
                    ));
                }
            }
        }

        warnings
    }
}

/// Process-wide upload defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadSettings {
    #[serde(default = "default_upload_disk")]
    pub upload_disk: String,

    #[serde(default = "default_upload_directory")]
    pub upload_directory: String,

    #[serde(default)]
    pub auto_upload_images: bool,

    #[serde(default = "default_true")]
    pub auto_delete_images: bool,

    #[serde(default = "default_quality")]
    pub resize_image_quality: u8,

    /// Allow resizes to enlarge images smaller than the target box.
    #[serde(default = "default_true")]
    pub upscale: bool,
}

fn default_upload_disk() -> String {
    "public".to_string()
}

fn default_upload_directory() -> String {
    "uploads".to_string()
}

fn default_true() -> bool {
    true
}

fn default_quality() -> u8 {
    80
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            upload_disk: default_upload_disk(),
            upload_directory: default_upload_directory(),
            auto_upload_images: false,
            auto_delete_images: true,
            resize_image_quality: default_quality(),
            upscale: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiskDriver {
    #[default]
    Local,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiskConfig {
    #[serde(default)]
    pub driver: DiskDriver,

    /// Directory files are written under (local driver).
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Public URL prefix for stored paths.
    #[serde(default)]
    pub url: Option<String>,
}

fn default_disks() -> BTreeMap<String, DiskConfig> {
    BTreeMap::from([
        (
            "public".to_string(),
            DiskConfig {
                driver: DiskDriver::Local,
                root: Some(PathBuf::from("storage/app/public")),
                url: Some("/storage".to_string()),
            },
        ),
        (
            "local".to_string(),
            DiskConfig {
                driver: DiskDriver::Local,
                root: Some(PathBuf::from("storage/app")),
                url: None,
            },
        ),
    ])
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub image_fields: FieldTable,

    #[serde(default)]
    pub file_fields: FieldTable,
}
