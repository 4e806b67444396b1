//! Imageup - image and file uploads for database records
//!
//! A record type declares which of its attributes hold uploaded images and
//! which hold plain files. The [`upload::Uploader`] validates an incoming
//! file, resizes or crops images according to the field's options, writes
//! the result to a storage disk and records the stored path on the record.
//! The [`lifecycle`] functions let a persistence layer upload request files
//! after a save and clean up stored files after a delete.

pub mod config;
pub mod fields;
pub mod hooks;
pub mod images;
pub mod lifecycle;
pub mod record;
pub mod request;
pub mod storage;
pub mod upload;
pub mod validation;

pub use imageup_common::{Error, Result};
