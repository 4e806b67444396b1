//! Random filename tokens for stored uploads.
//!
//! Every uploaded payload gets a [`FileToken`] when it enters the system.
//! The token is rendered as 32 lowercase hex characters and becomes the
//! stem of the stored filename, so two uploads never collide on disk.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique token naming one uploaded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileToken(Uuid);

impl FileToken {
    /// Generate a new random token.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Render the token as a filename, appending `extension` when present.
    ///
    /// # Examples
    ///
    /// ```
    /// use imageup_common::FileToken;
    ///
    /// let token = FileToken::new();
    /// let name = token.file_name(Some("jpg"));
    /// assert!(name.ends_with(".jpg"));
    /// assert_eq!(name.len(), 32 + 4);
    /// ```
    pub fn file_name(&self, extension: Option<&str>) -> String {
        match extension {
            Some(ext) if !ext.is_empty() => format!("{}.{}", self.0.simple(), ext),
            _ => self.0.simple().to_string(),
        }
    }
}

impl Default for FileToken {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FileToken {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for FileToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}
