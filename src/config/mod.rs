mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./imageup.toml",
        "~/.config/imageup/config.toml",
        "/etc/imageup/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Reject configurations that cannot work; log the rest as warnings.
fn validate_config(config: &Config) -> Result<()> {
    if config.imageup.resize_image_quality == 0 {
        anyhow::bail!("resize_image_quality must be between 1 and 100");
    }

    if config.imageup.upload_disk.trim().is_empty() {
        anyhow::bail!("upload_disk cannot be empty");
    }

    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldKind;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.imageup.upload_disk, "public");
        assert_eq!(config.imageup.upload_directory, "uploads");
        assert!(!config.imageup.auto_upload_images);
        assert!(config.imageup.auto_delete_images);
        assert_eq!(config.imageup.resize_image_quality, 80);
        assert!(config.imageup.upscale);
        assert!(config.disks.contains_key("public"));
        assert!(config.disks.contains_key("local"));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn parses_models_and_disks() {
        let file = write_config(
            r#"
[imageup]
upload_disk = "media"
auto_upload_images = true

[disks.media]
driver = "memory"
url = "https://cdn.example.com"

[models.user]
image_fields = ["cover", { name = "avatar", width = 200, crop = true }]
file_fields = [{ name = "resume", path = "docs/" }]
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.imageup.upload_disk, "media");
        assert!(config.imageup.auto_upload_images);
        assert_eq!(config.disks["media"].driver, DiskDriver::Memory);

        let user = &config.models["user"];
        let names: Vec<_> = user.image_fields.names().collect();
        assert_eq!(names, ["cover", "avatar"]);
        assert_eq!(
            user.image_fields.get("avatar").and_then(|d| d.options()).and_then(|o| o.width),
            Some(200)
        );
        assert_eq!(
            crate::fields::FieldRegistry::new(user.image_fields.clone(), user.file_fields.clone())
                .kind_of("resume"),
            Some(FieldKind::File)
        );
    }

    #[test]
    fn zero_quality_is_fatal() {
        let file = write_config("[imageup]\nresize_image_quality = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn unknown_driver_is_fatal() {
        let file = write_config("[disks.s3]\ndriver = \"s3\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn warnings_are_not_fatal() {
        let file = write_config(
            r#"
[imageup]
upload_disk = "missing"
resize_image_quality = 150

[disks.bare]
driver = "local"
"#,
        );
        let config = load_config(file.path()).unwrap();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 3, "{warnings:?}");
    }

    #[test]
    fn explicit_missing_path_errors() {
        let err = load_config_or_default(Some(Path::new("/nonexistent/imageup.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
