use super::{ElementError, Layer, Placement, resolve_offset};
use crate::imaging::operations::{composite, decode, resize_to, round_corners};
use crate::imaging::{Dimensions, Gravity, ScaleMode, gravity_position};
use ::image::RgbaImage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageOptions {
    pub gravity: Gravity,
    /// Target box. The image is fit-scaled only when both sides are set.
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Corner radius in source pixels, applied before scaling.
    pub radius: Option<u32>,
}

/// A raster image layer decoded from bytes.
pub struct Image<'a> {
    source: &'a [u8],
    options: ImageOptions,
}

impl<'a> Image<'a> {
    pub fn new(source: &'a [u8], options: ImageOptions) -> Self {
        Self { source, options }
    }

    /// Decode, round, and scale the source into the layer that gets composited.
    pub fn render(&self) -> Result<RgbaImage, ElementError> {
        let mut layer = decode(self.source)?;

        if let Some(radius) = self.options.radius.filter(|r| *r > 0) {
            layer = round_corners(&layer, radius)?;
        }

        if let (Some(width), Some(height)) = (self.options.width, self.options.height) {
            layer = resize_to(&layer, Dimensions { width, height }, ScaleMode::Fit);
        }
        Ok(layer)
    }
}

impl Layer for Image<'_> {
    fn apply_to(
        &self,
        mut canvas: RgbaImage,
        place: Option<Placement<'_>>,
    ) -> Result<RgbaImage, ElementError> {
        let layer = self.render()?;
        let canvas_dims = Dimensions::of(&canvas);
        let layer_dims = Dimensions::of(&layer);
        let offset = resolve_offset(place, canvas_dims, layer_dims);

        let (x, y) = gravity_position(
            self.options.gravity,
            canvas_dims,
            layer_dims,
            offset.x,
            offset.y,
        );
        composite(&mut canvas, &layer, x, y);
        Ok(canvas)
    }
}
