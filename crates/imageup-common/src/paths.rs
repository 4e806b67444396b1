//! Path utilities for upload naming and storage-relative paths.
//!
//! Storage paths are always `/`-separated and relative to a disk root, so
//! these helpers work on `&str` rather than `Path` except where an on-disk
//! filename is being inspected.

use std::path::{Component, Path};

/// List of supported image file extensions.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];

/// Check if a path has an image file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use imageup_common::paths::is_image_file;
///
/// assert!(is_image_file(Path::new("avatar.jpg")));
/// assert!(is_image_file(Path::new("/path/to/cover.PNG")));
/// assert!(!is_image_file(Path::new("resume.pdf")));
/// ```
pub fn is_image_file(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Lowercased extension of a filename, if it has one.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use imageup_common::paths::extension_of;
///
/// assert_eq!(extension_of(Path::new("Photo.JPG")).as_deref(), Some("jpg"));
/// assert_eq!(extension_of(Path::new("README")), None);
/// ```
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_lowercase())
}

/// Whether two extensions name the same format (`jpg` and `jpeg` match).
pub fn same_extension(a: &str, b: &str) -> bool {
    let norm = |e: &str| match e.to_lowercase().as_str() {
        "jpeg" | "jpe" => "jpg".to_string(),
        other => other.to_string(),
    };
    norm(a) == norm(b)
}

/// Trim leading and trailing `/` from a storage directory.
pub fn trim_slashes(dir: &str) -> &str {
    dir.trim_matches('/')
}

/// Join a storage directory and a filename with a single `/`.
///
/// An empty directory yields the bare filename.
///
/// # Examples
///
/// ```
/// use imageup_common::paths::join_storage_path;
///
/// assert_eq!(join_storage_path("uploads", "a.png"), "uploads/a.png");
/// assert_eq!(join_storage_path("/user/avatar/", "a.png"), "user/avatar/a.png");
/// assert_eq!(join_storage_path("", "a.png"), "a.png");
/// ```
pub fn join_storage_path(dir: &str, file_name: &str) -> String {
    let dir = trim_slashes(dir);
    let file_name = file_name.trim_start_matches('/');
    if dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{dir}/{file_name}")
    }
}

/// Whether a storage path stays inside its disk root.
///
/// A single leading `/` set is ignored, as disks treat paths as relative.
/// Anything else that is not a plain name segment (`..`, `.`, a drive
/// prefix) is rejected, as is an empty path.
///
/// # Examples
///
/// ```
/// use imageup_common::paths::is_contained;
///
/// assert!(is_contained("uploads/a.png"));
/// assert!(is_contained("/uploads/a.png"));
/// assert!(!is_contained("../a.png"));
/// assert!(!is_contained("uploads/../../a.png"));
/// assert!(!is_contained(""));
/// ```
pub fn is_contained(path: &str) -> bool {
    let relative = Path::new(path.trim_start_matches('/'));
    let mut components = relative.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}
