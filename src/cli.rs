use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imageup")]
#[command(author, version, about = "Upload, resize and store images and files for records")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a file through a configured model's upload field
    Store {
        /// File to upload
        #[arg(required = true)]
        file: PathBuf,

        /// Model declared under [models] in the config
        #[arg(short, long)]
        model: String,

        /// Upload field (defaults to the first declared field)
        #[arg(short, long)]
        field: Option<String>,
    },

    /// List the upload fields of a configured model
    Fields {
        /// Model declared under [models] in the config
        #[arg(short, long)]
        model: String,
    },

    /// Print the public URL of a stored path
    Url {
        /// Storage-relative path
        path: String,

        /// Disk name (defaults to upload_disk)
        #[arg(short, long)]
        disk: Option<String>,
    },

    /// Delete a stored file
    Delete {
        /// Storage-relative path
        path: String,

        /// Disk name (defaults to upload_disk)
        #[arg(short, long)]
        disk: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
