//! Benchmarks for the image resize pipeline
//!
//! Measures decode + resize + encode for the three resize plans, plus the
//! pure option resolution that precedes every upload.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use imageup::fields::{resolve_crop, resolve_field, FieldOptions, FieldRegistry, FieldTable};
use imageup::images::{ImageCodec, RasterCodec, ResizePlan};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::time::Duration;

fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

fn bench_resize_plans(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_plans");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let codec = RasterCodec::new();
    let plans = [
        ("fit", FieldOptions::new().width(300).height(300)),
        ("fill", FieldOptions::new().width(300).height(300).crop(true)),
        ("offset", FieldOptions::new().width(300).height(300).crop_at(40, 40)),
    ];

    for (width, height) in [(640, 480), (1920, 1080)] {
        let bytes = jpeg_fixture(width, height);
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        for (name, options) in &plans {
            let plan = ResizePlan::from_options(options, resolve_crop(options, None));
            group.bench_with_input(
                BenchmarkId::new(*name, format!("{width}x{height}")),
                &bytes,
                |b, bytes| {
                    b.iter(|| {
                        let mut image = codec.decode(black_box(bytes)).unwrap();
                        plan.apply(&mut *image, true);
                        image.encode(80).unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_field_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_resolution");

    for size in [2usize, 20, 100] {
        let images: FieldTable = (0..size)
            .map(|i| (format!("image_{i}"), FieldOptions::new().width(100)))
            .collect();
        let files: FieldTable = (0..size).map(|i| format!("file_{i}")).collect();
        let registry = FieldRegistry::new(images, files);
        let last = format!("image_{}", size - 1);

        group.bench_with_input(BenchmarkId::new("first", size), &registry, |b, registry| {
            b.iter(|| resolve_field(black_box(registry), None).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("named", size), &registry, |b, registry| {
            b.iter(|| resolve_field(black_box(registry), Some(&last)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resize_plans, bench_field_resolution);
criterion_main!(benches);
