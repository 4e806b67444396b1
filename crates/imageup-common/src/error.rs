//! Common error types used throughout imageup.
//!
//! Every failure an upload can hit funnels into [`Error`]: field resolution,
//! validation, storage, image decoding/encoding, hooks and record persistence.

/// Common error type for imageup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No upload field could be resolved because none are declared.
    #[error("No upload fields are defined on the record")]
    NoUploadFieldDefined,

    /// The named field is not declared as an image or file field.
    #[error("Upload field `{0}` is not defined on the record")]
    UnknownUploadField(String),

    /// The uploaded payload was rejected by the configured rules.
    #[error("Validation failed for `{field}`: {}", messages.join("; "))]
    Validation {
        /// The field the rules were declared on.
        field: String,
        /// One message per violated rule.
        messages: Vec<String>,
    },

    /// A storage backend failed to write, read or delete.
    #[error("Storage error on disk `{disk}`: {message}")]
    Storage {
        /// Name of the disk that failed.
        disk: String,
        /// Human-readable error description.
        message: String,
    },

    /// No disk is registered under the requested name.
    #[error("Disk not configured: {0}")]
    UnknownDisk(String),

    /// Decoding or encoding an image failed.
    #[error("Codec error: {0}")]
    Codec(String),

    /// A named hook has no registered handler.
    #[error("No handler registered for hook `{0}`")]
    UnknownHook(String),

    /// A hook ran and reported a failure.
    #[error("Hook error: {0}")]
    Hook(String),

    /// The host record could not be persisted.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration is invalid or refers to something unsupported.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new UnknownUploadField error.
    pub fn unknown_field<S: Into<String>>(field: S) -> Self {
        Self::UnknownUploadField(field.into())
    }

    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(field: S, messages: Vec<String>) -> Self {
        Self::Validation {
            field: field.into(),
            messages,
        }
    }

    /// Create a new Storage error.
    pub fn storage(disk: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Storage {
            disk: disk.into(),
            message: message.to_string(),
        }
    }

    /// Create a new Codec error.
    pub fn codec(message: impl std::fmt::Display) -> Self {
        Self::Codec(message.to_string())
    }

    /// Create a new Hook error.
    pub fn hook<S: Into<String>>(msg: S) -> Self {
        Self::Hook(msg.into())
    }

    /// Create a new Persistence error.
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Short machine-readable name of the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoUploadFieldDefined => "no_upload_field_defined",
            Self::UnknownUploadField(_) => "unknown_upload_field",
            Self::Validation { .. } => "validation_failed",
            Self::Storage { .. } => "storage_failure",
            Self::UnknownDisk(_) => "unknown_disk",
            Self::Codec(_) => "codec_failure",
            Self::UnknownHook(_) => "unknown_hook",
            Self::Hook(_) => "hook_failure",
            Self::Persistence(_) => "persistence_failure",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
