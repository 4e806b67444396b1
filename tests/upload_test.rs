//! Integration tests for the image upload pipeline.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use common::{jpeg, text, TestHarness};
use imageup::fields::{FieldOptions, FieldTable};
use imageup::hooks::{Hook, Payload, UploadHandler};
use imageup::storage::Storage;
use imageup::Error;

fn avatar_user(h: &TestHarness, options: FieldOptions) -> common::User {
    h.user(FieldTable::new().field_with("avatar", options), FieldTable::new())
}

#[test]
fn upload_stores_file_and_updates_record() {
    let h = TestHarness::new();
    let mut user = avatar_user(&h, FieldOptions::new().width(200));
    let file = jpeg("me.jpg", 400, 400);

    let path = h.uploader.upload_image(&mut user, &file, None).unwrap();

    assert_eq!(path, format!("uploads/{}", file.hash_name()));
    assert!(h.public.exists(&path));
    assert_eq!(user.fresh().get("avatar").as_deref(), Some(path.as_str()));
}

#[test]
fn replacing_an_upload_deletes_the_old_file() {
    let h = TestHarness::new();
    let mut user = avatar_user(&h, FieldOptions::new());

    let first = h
        .uploader
        .upload_image(&mut user, &jpeg("a.jpg", 20, 20), None)
        .unwrap();
    let second = h
        .uploader
        .upload_image(&mut user, &jpeg("b.jpg", 20, 20), None)
        .unwrap();

    assert_ne!(first, second);
    assert!(!h.public.exists(&first));
    assert!(h.public.exists(&second));
    assert_eq!(user.fresh().get("avatar"), Some(second));
}

#[test]
fn same_path_is_not_deleted() {
    let h = TestHarness::new();
    let mut user = avatar_user(&h, FieldOptions::new());
    user.file_name = Some("avatar.jpg".to_string());

    let first = h
        .uploader
        .upload_image(&mut user, &jpeg("a.jpg", 20, 20), None)
        .unwrap();
    let second = h
        .uploader
        .upload_image(&mut user, &jpeg("b.jpg", 20, 20), None)
        .unwrap();

    assert_eq!(first, "uploads/avatar.jpg");
    assert_eq!(first, second);
    assert!(h.public.exists(&second));
}

#[test]
fn field_path_and_disk_options_win() {
    let h = TestHarness::new();
    let mut user = avatar_user(&h, FieldOptions::new().path("/profiles/avatars/").disk("local"));
    user.upload_path = Some("ignored".to_string());

    let path = h
        .uploader
        .upload_image(&mut user, &jpeg("a.jpg", 20, 20), None)
        .unwrap();

    assert!(path.starts_with("profiles/avatars/"));
    assert!(h.local.exists(&path));
    assert!(h.public.is_empty());
}

#[test]
fn instance_overrides_beat_global_defaults() {
    let h = TestHarness::new();
    let mut user = avatar_user(&h, FieldOptions::new());
    user.upload_path = Some("/users/1/".to_string());
    user.upload_disk = Some("local".to_string());

    let path = h
        .uploader
        .upload_image(&mut user, &jpeg("a.jpg", 20, 20), None)
        .unwrap();

    assert!(path.starts_with("users/1/"));
    assert!(h.local.exists(&path));
}

#[test]
fn unknown_field_fails_without_io() {
    let h = TestHarness::new();
    let mut user = avatar_user(&h, FieldOptions::new());

    let err = h
        .uploader
        .upload_image(&mut user, &jpeg("a.jpg", 20, 20), Some("banner"))
        .unwrap_err();

    assert_matches!(err, Error::UnknownUploadField(name) if name == "banner");
    assert!(h.public.is_empty());
    assert_eq!(user.fresh().get("banner"), None);
}

#[test]
fn no_declared_fields_fails() {
    let h = TestHarness::new();
    let mut user = h.user(FieldTable::new(), FieldTable::new());

    assert_matches!(
        h.uploader.upload_image(&mut user, &jpeg("a.jpg", 20, 20), None),
        Err(Error::NoUploadFieldDefined)
    );
}

#[test]
fn validation_failure_aborts_before_write() {
    let h = TestHarness::new();
    let mut user = avatar_user(&h, FieldOptions::new().rules("required|image|max:1024"));

    let err = h
        .uploader
        .upload_image(&mut user, &text("notes.txt", "not an image"), None)
        .unwrap_err();

    assert_matches!(err, Error::Validation { field, .. } if field == "avatar");
    assert!(h.public.is_empty());
    assert_eq!(user.fresh().get("avatar"), None);
}

#[test]
fn undecodable_image_is_codec_error() {
    let h = TestHarness::new();
    let mut user = avatar_user(&h, FieldOptions::new().width(10));

    assert_matches!(
        h.uploader
            .upload_image(&mut user, &text("fake.jpg", "garbage"), None),
        Err(Error::Codec(_))
    );
    assert!(h.public.is_empty());
}

#[test]
fn lower_quality_produces_smaller_jpeg() {
    let h = TestHarness::new();
    let mut user = h.user(
        FieldTable::new()
            .field_with("low", FieldOptions::new().quality(10))
            .field_with("high", FieldOptions::new().quality(95)),
        FieldTable::new(),
    );
    let file = jpeg("me.jpg", 256, 256);

    let low = h.uploader.upload_image(&mut user, &file, Some("low")).unwrap();
    let high = h.uploader.upload_image(&mut user, &file, Some("high")).unwrap();

    let low_len = h.public.get(&low).unwrap().len();
    let high_len = h.public.get(&high).unwrap().len();
    assert!(low_len < high_len, "{low_len} >= {high_len}");
}

#[test]
fn inline_hooks_see_the_image() {
    let h = TestHarness::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let after = seen.clone();

    let mut user = avatar_user(
        &h,
        FieldOptions::new()
            .width(200)
            .before_save(Hook::inline(|payload| {
                if let Some(image) = payload.image() {
                    image.resize_exact(10, 10);
                }
                Ok(())
            }))
            .after_save(Hook::inline(move |payload| {
                let image = payload.image().ok_or_else(|| Error::hook("no image"))?;
                after.store(image.width() as usize, Ordering::SeqCst);
                Ok(())
            })),
    );

    let path = h
        .uploader
        .upload_image(&mut user, &jpeg("me.jpg", 400, 400), None)
        .unwrap();

    assert_eq!(h.stored_dimensions(&path), (10, 10));
    assert_eq!(seen.load(Ordering::SeqCst), 10);
}

#[derive(Default)]
struct Halve;

impl UploadHandler for Halve {
    fn handle(&self, payload: &mut Payload<'_>) -> imageup::Result<()> {
        let image = payload.image().ok_or_else(|| Error::hook("expected an image"))?;
        let (w, h) = (image.width(), image.height());
        image.resize_exact(w / 2, h / 2);
        Ok(())
    }
}

#[test]
fn named_hook_resolves_through_registry() {
    let mut h = TestHarness::new();
    h.uploader.handlers_mut().register::<Halve>("shrink");

    let mut user = avatar_user(&h, FieldOptions::new().before_save(Hook::named("shrink")));
    let path = h
        .uploader
        .upload_image(&mut user, &jpeg("me.jpg", 80, 40), None)
        .unwrap();

    assert_eq!(h.stored_dimensions(&path), (40, 20));
}

#[test]
fn unregistered_named_hook_is_an_error() {
    let h = TestHarness::new();
    let mut user = avatar_user(&h, FieldOptions::new().before_save(Hook::named("missing")));

    assert_matches!(
        h.uploader.upload_image(&mut user, &jpeg("me.jpg", 8, 8), None),
        Err(Error::UnknownHook(name)) if name == "missing"
    );
    assert!(h.public.is_empty());
}

#[test]
fn image_url_reads_persisted_value() {
    let h = TestHarness::new();
    let mut user = avatar_user(&h, FieldOptions::new().placeholder("/img/avatar.png"));

    assert_eq!(h.uploader.image_url(&user, None).unwrap(), "/img/avatar.png");

    let path = h
        .uploader
        .upload_image(&mut user, &jpeg("me.jpg", 8, 8), None)
        .unwrap();
    assert_eq!(
        h.uploader.image_url(&user.fresh(), None).unwrap(),
        format!("/storage/{path}")
    );
    assert_eq!(
        h.uploader.image_tag(&user, None, "alt=\"me\""),
        format!("<img src=\"/storage/{path}\" alt=\"me\" />")
    );
}
