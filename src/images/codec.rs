//! Image codec contract and its `image`-crate implementation.
//!
//! The orchestrator only ever talks to [`ImageCodec`] and [`ImageHandle`];
//! [`RasterCodec`] is the default backend, decoding with `image` and
//! re-encoding in the source format.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use imageup_common::{Error, Result};

/// A decoded image being transformed in memory.
pub trait ImageHandle: Send {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Resize within the box, preserving aspect ratio. A missing dimension
    /// is derived from the other one.
    fn resize_proportional(&mut self, width: Option<u32>, height: Option<u32>, allow_upsize: bool);

    /// Resize to exactly `width` x `height`, ignoring aspect ratio.
    fn resize_exact(&mut self, width: u32, height: u32);

    /// Scale and center-crop so the result fills `width` x `height`.
    fn crop_to_fill(&mut self, width: u32, height: u32, allow_upsize: bool);

    /// Cut a `width` x `height` window whose top-left corner is `(x, y)`.
    ///
    /// The window is clamped to the source bounds, so a window running past
    /// the right or bottom edge yields a smaller image.
    fn crop_at(&mut self, width: u32, height: u32, x: u32, y: u32);

    /// Encode in the source format. `quality` applies to lossy formats.
    fn encode(&self, quality: u8) -> Result<Vec<u8>>;

    /// Free the decoded pixels.
    fn release(self: Box<Self>) {}
}

/// Decodes raw bytes into an [`ImageHandle`].
pub trait ImageCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn ImageHandle>>;
}

/// Codec backed by the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct RasterCodec {
    filter: FilterType,
}

impl RasterCodec {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCodec for RasterCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn ImageHandle>> {
        let format = image::guess_format(bytes).map_err(Error::codec)?;
        let image = image::load_from_memory_with_format(bytes, format).map_err(Error::codec)?;

        Ok(Box::new(RasterImage {
            image,
            format,
            filter: self.filter,
        }))
    }
}

/// An `image::DynamicImage` plus the format it was decoded from.
pub struct RasterImage {
    image: DynamicImage,
    format: ImageFormat,
    filter: FilterType,
}

impl ImageHandle for RasterImage {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn resize_proportional(&mut self, width: Option<u32>, height: Option<u32>, allow_upsize: bool) {
        let (w, h) = fit_dimensions(
            (self.image.width(), self.image.height()),
            width,
            height,
            allow_upsize,
        );
        if (w, h) != (self.image.width(), self.image.height()) {
            self.image = self.image.resize_exact(w, h, self.filter);
        }
    }

    fn resize_exact(&mut self, width: u32, height: u32) {
        self.image = self.image.resize_exact(width.max(1), height.max(1), self.filter);
    }

    fn crop_to_fill(&mut self, width: u32, height: u32, allow_upsize: bool) {
        let (width, height) = (width.max(1), height.max(1));
        let (src_w, src_h) = (self.image.width(), self.image.height());

        if allow_upsize || (src_w >= width && src_h >= height) {
            self.image = self.image.resize_to_fill(width, height, self.filter);
            return;
        }

        // Source is smaller than the box: cut the largest centered window
        // with the target aspect ratio and leave it at its own scale.
        let (win_w, win_h) = fill_window((src_w, src_h), (width, height));
        let x = (src_w - win_w) / 2;
        let y = (src_h - win_h) / 2;
        self.image = self.image.crop_imm(x, y, win_w, win_h);
    }

    fn crop_at(&mut self, width: u32, height: u32, x: u32, y: u32) {
        self.image = self.image.crop_imm(x, y, width, height);
    }

    fn encode(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());

        match self.format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
                DynamicImage::ImageRgb8(self.image.to_rgb8())
                    .write_with_encoder(encoder)
                    .map_err(Error::codec)?;
            }
            format => {
                self.image.write_to(&mut buf, format).map_err(Error::codec)?;
            }
        }

        Ok(buf.into_inner())
    }
}

/// Target size for a proportional resize of `src` into the given box.
pub fn fit_dimensions(
    src: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    allow_upsize: bool,
) -> (u32, u32) {
    let (src_w, src_h) = (src.0.max(1) as f64, src.1.max(1) as f64);
    let scaled = |value: f64| value.round().max(1.0) as u32;

    let (w, h) = match (width, height) {
        (None, None) => return src,
        (Some(w), None) => (w, scaled(w as f64 * src_h / src_w)),
        (None, Some(h)) => (scaled(h as f64 * src_w / src_h), h),
        (Some(w), Some(h)) => {
            let by_width = scaled(w as f64 * src_h / src_w);
            if by_width <= h {
                (w, by_width)
            } else {
                (scaled(h as f64 * src_w / src_h), h)
            }
        }
    };

    if !allow_upsize && (w > src.0 || h > src.1) {
        return src;
    }
    (w.max(1), h.max(1))
}

/// Largest window inside `src` with the aspect ratio of `target`.
fn fill_window(src: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = src;
    let ratio = target.0 as f64 / target.1 as f64;

    if src_w as f64 / src_h as f64 > ratio {
        let w = ((src_h as f64) * ratio).round().max(1.0) as u32;
        (w.min(src_w), src_h)
    } else {
        let h = ((src_w as f64) / ratio).round().max(1.0) as u32;
        (src_w, h.min(src_h))
    }
}
