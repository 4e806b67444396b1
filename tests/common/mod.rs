//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], an [`Uploader`] wired to two in-memory disks
//! (`public` and `local`), and a [`User`] record persisted to a shared
//! in-memory table so [`User::fresh`] observes what was actually saved.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use parking_lot::Mutex;

use imageup::config::UploadSettings;
use imageup::fields::FieldTable;
use imageup::record::{HasUploads, UploadState};
use imageup::request::UploadedFile;
use imageup::storage::{MemoryDisk, Storage};
use imageup::upload::Uploader;
use imageup::Result;

type Row = BTreeMap<String, String>;

/// Persisted user rows keyed by id.
#[derive(Clone, Default)]
pub struct UserTable {
    rows: Arc<Mutex<BTreeMap<u64, Row>>>,
}

impl UserTable {
    fn insert(&self) -> u64 {
        let mut rows = self.rows.lock();
        let id = rows.len() as u64 + 1;
        rows.insert(id, Row::new());
        id
    }

    fn load(&self, id: u64) -> Row {
        self.rows.lock().get(&id).cloned().unwrap_or_default()
    }

    fn store(&self, id: u64, row: Row) {
        self.rows.lock().insert(id, row);
    }
}

/// A record type whose field declarations are fixed at construction.
#[derive(Clone)]
pub struct User {
    pub id: u64,
    images: FieldTable,
    files: FieldTable,
    attributes: Row,
    original: Row,
    state: UploadState,
    table: UserTable,
    pub upload_path: Option<String>,
    pub upload_disk: Option<String>,
    pub auto_upload: Option<bool>,
    /// Fixed stored file name, replacing the generated hash name.
    pub file_name: Option<String>,
}

impl User {
    /// Re-read this user from the table.
    pub fn fresh(&self) -> User {
        let row = self.table.load(self.id);
        User {
            attributes: row.clone(),
            original: row,
            state: UploadState::default(),
            ..self.clone()
        }
    }

    /// Persist the current attributes.
    pub fn save(&mut self) {
        self.table.store(self.id, self.attributes.clone());
        self.original = self.attributes.clone();
    }

    pub fn get(&self, field: &str) -> Option<String> {
        self.attributes.get(field).cloned()
    }
}

impl HasUploads for User {
    fn image_fields(&self) -> FieldTable {
        self.images.clone()
    }

    fn file_fields(&self) -> FieldTable {
        self.files.clone()
    }

    fn upload_state(&self) -> &UploadState {
        &self.state
    }

    fn upload_state_mut(&mut self) -> &mut UploadState {
        &mut self.state
    }

    fn attribute(&self, field: &str) -> Option<String> {
        self.attributes.get(field).cloned()
    }

    fn original(&self, field: &str) -> Option<String> {
        self.original.get(field).cloned()
    }

    fn set_attribute(&mut self, field: &str, value: String) {
        self.attributes.insert(field.to_string(), value);
    }

    fn save_quietly(&mut self) -> Result<()> {
        self.save();
        Ok(())
    }

    fn upload_path(&self) -> Option<String> {
        self.upload_path.clone()
    }

    fn upload_disk(&self) -> Option<String> {
        self.upload_disk.clone()
    }

    fn auto_upload_images(&self) -> Option<bool> {
        self.auto_upload
    }

    fn upload_file_name(&self, _field: &str, _file: &UploadedFile) -> Option<String> {
        self.file_name.clone()
    }
}

/// Uploader plus the disks it writes to.
pub struct TestHarness {
    pub uploader: Uploader,
    pub public: Arc<MemoryDisk>,
    pub local: Arc<MemoryDisk>,
    pub users: UserTable,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_settings(UploadSettings::default())
    }

    pub fn with_settings(settings: UploadSettings) -> Self {
        let public = Arc::new(MemoryDisk::new("public", Some("/storage".to_string())));
        let local = Arc::new(MemoryDisk::new("local", None));
        let uploader = Uploader::builder(settings)
            .disk(public.clone())
            .disk(local.clone())
            .build();

        Self {
            uploader,
            public,
            local,
            users: UserTable::default(),
        }
    }

    /// A saved user with the given declarations.
    pub fn user(&self, images: FieldTable, files: FieldTable) -> User {
        User {
            id: self.users.insert(),
            images,
            files,
            attributes: Row::new(),
            original: Row::new(),
            state: UploadState::default(),
            table: self.users.clone(),
            upload_path: None,
            upload_disk: None,
            auto_upload: None,
            file_name: None,
        }
    }

    /// Decode an image stored on the public disk and return its size.
    pub fn stored_dimensions(&self, path: &str) -> (u32, u32) {
        let bytes = self.public.get(path).expect("stored image");
        let img = image::load_from_memory(&bytes).expect("decodable image");
        (img.width(), img.height())
    }
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, format)
        .expect("encode fixture");
    buf.into_inner()
}

/// A generated JPEG upload.
pub fn jpeg(name: &str, width: u32, height: u32) -> UploadedFile {
    UploadedFile::new(name, encode(width, height, ImageFormat::Jpeg))
}

/// A generated PNG upload.
pub fn png(name: &str, width: u32, height: u32) -> UploadedFile {
    UploadedFile::new(name, encode(width, height, ImageFormat::Png))
}

/// A plain-text upload.
pub fn text(name: &str, body: &str) -> UploadedFile {
    UploadedFile::new(name, body.as_bytes().to_vec())
}
