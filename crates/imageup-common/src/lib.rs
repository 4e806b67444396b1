//! Imageup-Common: Shared types and utilities.
//!
//! This crate provides common functionality used across imageup:
//!
//! - **Error Handling**: The unified upload error type and result alias
//! - **Filename Tokens**: Random tokens used to name stored uploads
//! - **Path Utilities**: Extension detection and storage path joining
//!
//! # Examples
//!
//! ```
//! use imageup_common::{Error, Result};
//! use imageup_common::paths::{is_image_file, join_storage_path};
//! use std::path::Path;
//!
//! assert!(is_image_file(Path::new("avatar.png")));
//! assert_eq!(join_storage_path("/uploads/", "a.png"), "uploads/a.png");
//!
//! fn example() -> Result<()> {
//!     Err(Error::unknown_field("avatar"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod paths;

pub use error::{Error, Result};
pub use ids::*;
