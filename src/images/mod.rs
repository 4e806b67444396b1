//! Image decoding, resizing and re-encoding.
//!
//! This module defines the codec contract the upload orchestrator works
//! against, a default implementation on top of the `image` crate, and the
//! pure decision of how an image field's options translate into a resize.

mod codec;
mod resize;

pub use codec::{fit_dimensions, ImageCodec, ImageHandle, RasterCodec, RasterImage};
pub use resize::ResizePlan;
