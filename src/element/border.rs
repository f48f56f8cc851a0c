use super::{ElementError, Layer, Placement, resolve_offset};
use crate::imaging::operations::{composite, solid_fill};
use crate::imaging::{Color, Dimensions, Position, calculate_bands};
use image::RgbaImage;

/// Border fill: one color, or equal-length bands in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fill {
    Solid(Color),
    Bands(Vec<Color>),
}

impl Default for Fill {
    fn default() -> Self {
        Fill::Solid(Color::BLACK)
    }
}

impl Fill {
    /// A one-element list behaves like a single color.
    pub fn from_colors(mut colors: Vec<Color>) -> Self {
        match colors.len() {
            1 => Fill::Solid(colors.remove(0)),
            _ => Fill::Bands(colors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderOptions {
    pub position: Position,
    pub fill: Fill,
}

/// A strip of `size` pixels along one canvas edge.
///
/// The placement offset only moves the strip across its short axis: a
/// bottom border with `y = 10` sits 10px above the bottom edge.
#[derive(Debug, Clone)]
pub struct Border {
    size: u32,
    options: BorderOptions,
}

impl Border {
    pub fn new(size: u32, options: BorderOptions) -> Self {
        Self { size, options }
    }

    fn strip_dimensions(&self, canvas: Dimensions) -> Dimensions {
        if self.options.position.is_vertical() {
            Dimensions {
                width: self.size,
                height: canvas.height,
            }
        } else {
            Dimensions {
                width: canvas.width,
                height: self.size,
            }
        }
    }

    fn render_strip(&self, canvas: Dimensions) -> RgbaImage {
        let dims = self.strip_dimensions(canvas);
        let vertical = self.options.position.is_vertical();

        match &self.options.fill {
            Fill::Solid(color) => solid_fill(dims.width, dims.height, *color),
            Fill::Bands(colors) => {
                let mut strip = solid_fill(dims.width, dims.height, Color::BLACK);
                let long_axis = if vertical { dims.height } else { dims.width };
                for (band, color) in calculate_bands(long_axis, colors.len()).iter().zip(colors) {
                    if vertical {
                        let part = solid_fill(self.size, band.length, *color);
                        composite(&mut strip, &part, 0, band.offset as i64);
                    } else {
                        let part = solid_fill(band.length, self.size, *color);
                        composite(&mut strip, &part, band.offset as i64, 0);
                    }
                }
                strip
            }
        }
    }
}

impl Layer for Border {
    fn apply_to(
        &self,
        mut canvas: RgbaImage,
        place: Option<Placement<'_>>,
    ) -> Result<RgbaImage, ElementError> {
        if self.size == 0 {
            return Ok(canvas);
        }
        let canvas_dims = Dimensions::of(&canvas);
        let strip = self.render_strip(canvas_dims);
        let offset = resolve_offset(place, canvas_dims, Dimensions::of(&strip));
        let size = self.size as i64;

        let (x, y) = match self.options.position {
            Position::Left => (offset.x, 0),
            Position::Right => (canvas_dims.width as i64 - size - offset.x, 0),
            Position::Top => (0, offset.y),
            Position::Bottom => (0, canvas_dims.height as i64 - size - offset.y),
        };
        composite(&mut canvas, &strip, x, y);
        Ok(canvas)
    }
}
