//! Resize decision for an image field.

use crate::fields::{CropMode, FieldOptions};

use super::codec::ImageHandle;

/// What to do to a decoded image before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePlan {
    /// Neither `width` nor `height` is set.
    Keep,
    /// Crop-to-fill the exact box.
    Fill { width: u32, height: u32 },
    /// Cut a window at a fixed offset.
    Offset { width: u32, height: u32, x: u32, y: u32 },
    /// Proportional fit inside the box.
    Fit {
        width: Option<u32>,
        height: Option<u32>,
    },
}

impl ResizePlan {
    /// Decide the plan from field options and the resolved crop mode.
    ///
    /// The crop box height is `height`, or `width` when only a width is
    /// given; symmetrically the crop width falls back to `height`.
    pub fn from_options(options: &FieldOptions, crop: CropMode) -> Self {
        let (width, height) = match (options.width, options.height) {
            (None, None) => return Self::Keep,
            dims => dims,
        };

        let crop_width = width.or(height).unwrap_or_default();
        let crop_height = height.or(width).unwrap_or_default();

        match crop {
            CropMode::Fill => Self::Fill {
                width: crop_width,
                height: crop_height,
            },
            CropMode::Offset { x, y } => Self::Offset {
                width: crop_width,
                height: crop_height,
                x,
                y,
            },
            CropMode::Off => Self::Fit { width, height },
        }
    }

    /// Run the plan against a decoded image.
    pub fn apply(&self, image: &mut dyn ImageHandle, allow_upsize: bool) {
        match *self {
            Self::Keep => {}
            Self::Fill { width, height } => image.crop_to_fill(width, height, allow_upsize),
            Self::Offset {
                width,
                height,
                x,
                y,
            } => image.crop_at(width, height, x, y),
            Self::Fit { width, height } => image.resize_proportional(width, height, allow_upsize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_without_dimensions() {
        let plan = ResizePlan::from_options(&FieldOptions::new().crop(true), CropMode::Fill);
        assert_eq!(plan, ResizePlan::Keep);
    }

    #[test]
    fn fill_uses_width_for_missing_height() {
        let plan = ResizePlan::from_options(&FieldOptions::new().width(150), CropMode::Fill);
        assert_eq!(
            plan,
            ResizePlan::Fill {
                width: 150,
                height: 150
            }
        );
    }

    #[test]
    fn offset_carries_coordinates() {
        let opts = FieldOptions::new().width(100).height(80);
        let plan = ResizePlan::from_options(&opts, CropMode::Offset { x: 25, y: 10 });
        assert_eq!(
            plan,
            ResizePlan::Offset {
                width: 100,
                height: 80,
                x: 25,
                y: 10
            }
        );
    }

    #[test]
    fn fit_keeps_optional_dimensions() {
        let plan = ResizePlan::from_options(&FieldOptions::new().height(200), CropMode::Off);
        assert_eq!(
            plan,
            ResizePlan::Fit {
                width: None,
                height: Some(200)
            }
        );
    }
}
