mod cli;

use imageup::{
    config::{self, Config},
    fields::FieldKind,
    record::{HasUploads, MemoryRecord},
    request::UploadedFile,
    storage::DiskManager,
    upload::Uploader,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "imageup=trace,imageup_common=debug".to_string()
        } else {
            "imageup=info,imageup_common=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Store { file, model, field } => {
            store_file(&file, &model, field.as_deref(), cli.config.as_deref())
        }
        Commands::Fields { model } => list_fields(&model, cli.config.as_deref()),
        Commands::Url { path, disk } => print_url(&path, disk.as_deref(), cli.config.as_deref()),
        Commands::Delete { path, disk } => {
            delete_path(&path, disk.as_deref(), cli.config.as_deref())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("imageup {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn model_record(config: &Config, model: &str) -> Result<MemoryRecord> {
    let declared = config
        .models
        .get(model)
        .with_context(|| format!("Model '{}' is not declared in the config", model))?;

    Ok(MemoryRecord::new(
        model,
        declared.image_fields.clone(),
        declared.file_fields.clone(),
    ))
}

fn store_file(
    input: &Path,
    model: &str,
    field: Option<&str>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    let mut record = model_record(&config, model)?;
    let uploader = Uploader::from_config(&config)?;
    let file = UploadedFile::from_path(input)
        .with_context(|| format!("Failed to read upload: {:?}", input))?;

    tracing::info!("Storing {:?} for model '{}'", input, model);
    let path = uploader.upload_image(&mut record, &file, field)?;

    let field = record.upload_field_name(field).unwrap_or_default();
    let url = uploader.image_url(&record, Some(&field))?;

    println!("Field: {}", field);
    println!("Path: {}", path);
    if !url.is_empty() {
        println!("URL: {}", url);
    }

    Ok(())
}

fn list_fields(model: &str, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let record = model_record(&config, model)?;
    let registry = record.upload_fields();

    if registry.is_empty() {
        println!("Model '{}' declares no upload fields", model);
        return Ok(());
    }

    for decl in registry.declared_fields().iter() {
        let kind = registry.kind_of(decl.name()).unwrap_or(FieldKind::Image);
        let options = serde_json::to_string(&decl.options_or_default())?;
        println!("{}\t{}\t{}", decl.name(), kind, options);
    }

    Ok(())
}

fn open_disks(config: &Config) -> Result<DiskManager> {
    Ok(DiskManager::from_config(&config.disks)?)
}

fn print_url(path: &str, disk: Option<&str>, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let disk_name = disk.unwrap_or(&config.imageup.upload_disk);
    let disk = open_disks(&config)?.disk(disk_name)?;

    println!("{}", disk.url(path));
    Ok(())
}

fn delete_path(path: &str, disk: Option<&str>, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let disk_name = disk.unwrap_or(&config.imageup.upload_disk);
    let disk = open_disks(&config)?.disk(disk_name)?;

    if !disk.exists(path) {
        println!("Nothing to delete at {} on disk '{}'", path, disk_name);
        return Ok(());
    }

    disk.delete(path)?;
    println!("Deleted {} from disk '{}'", path, disk_name);
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration loaded with {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  ! {}", warning);
        }
    }

    println!("  Upload disk: {}", config.imageup.upload_disk);
    println!("  Upload directory: {}", config.imageup.upload_directory);
    println!("  Auto upload: {}", config.imageup.auto_upload_images);
    println!("  Auto delete: {}", config.imageup.auto_delete_images);
    println!("  Quality: {}", config.imageup.resize_image_quality);
    println!("  Disks: {}", config.disks.len());
    println!("  Models: {}", config.models.len());

    Ok(())
}
