use super::{ElementError, Layer, Placement, resolve_offset};
use crate::imaging::operations::{colorize_mask, composite};
use crate::imaging::{
    Color, DEFAULT_DPI, Dimensions, FontSpec, Gravity, TextRasterizer, TextRequest,
    gravity_position,
};
use image::RgbaImage;

#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub gravity: Gravity,
    /// Wrap width in pixels (only used when the rasterizer can wrap).
    pub width: Option<u32>,
    /// Controls glyph size: pixel size = points × dpi / 72.
    pub dpi: Option<u32>,
    pub color: Color,
    /// `"Family, Style"` description; `None` uses the default sans-serif.
    pub font: Option<String>,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            gravity: Gravity::Nw,
            width: None,
            dpi: None,
            color: Color::BLACK,
            font: None,
        }
    }
}

/// A single-color text layer.
pub struct Text<'a> {
    message: &'a str,
    options: TextOptions,
    rasterizer: &'a dyn TextRasterizer,
}

impl<'a> Text<'a> {
    pub fn new(message: &'a str, options: TextOptions, rasterizer: &'a dyn TextRasterizer) -> Self {
        Self {
            message,
            options,
            rasterizer,
        }
    }

    /// The request handed to the rasterizer. Wrapping is requested only when
    /// the rasterizer supports it; otherwise the message renders unwrapped.
    pub fn request(&self) -> TextRequest {
        let wrap_width = if self.rasterizer.supports_word_wrap() {
            self.options.width
        } else {
            None
        };
        TextRequest {
            text: self.message.to_string(),
            font: self
                .options
                .font
                .as_deref()
                .map(FontSpec::parse)
                .unwrap_or_default(),
            dpi: self.options.dpi.unwrap_or(DEFAULT_DPI),
            wrap_width,
        }
    }

    pub fn render(&self) -> Result<RgbaImage, ElementError> {
        let mask = self.rasterizer.rasterize(&self.request())?;
        Ok(colorize_mask(&mask, self.options.color))
    }
}

impl Layer for Text<'_> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Offset;
    use crate::imaging::backend::tests::MockRasterizer;
    use crate::imaging::operations::solid_fill;

    const INK: Color = Color([0x2f, 0x31, 0x3d]);

    #[test]
    fn request_carries_font_dpi_and_width() {
        let mock = MockRasterizer::new();
        let text = Text::new(
            "Hello",
            TextOptions {
                width: Some(1040),
                dpi: Some(400),
                font: Some("Helvetica, Bold".into()),
                ..Default::default()
            },
            &mock,
        );
        let req = text.request();
        assert_eq!(req.wrap_width, Some(1040));
        assert_eq!(req.dpi, 400);
        assert_eq!(req.font.family, "Helvetica");
        assert_eq!(req.font.weight, 700);
    }

    #[test]
    fn no_wrap_support_renders_unwrapped() {
        let mock = MockRasterizer::without_word_wrap();
        let text = Text::new(
            "Hello",
            TextOptions {
                width: Some(100),
                ..Default::default()
            },
            &mock,
        );
        assert_eq!(text.request().wrap_width, None);
    }

    #[test]
    fn defaults_to_72_dpi_sans_serif() {
        let mock = MockRasterizer::new();
        let req = Text::new("x", TextOptions::default(), &mock).request();
        assert_eq!(req.dpi, 72);
        assert_eq!(req.font, FontSpec::default());
    }

    #[test]
    fn glyphs_take_text_color() {
        let mock = MockRasterizer::new();
        let text = Text::new(
            "ab",
            TextOptions {
                color: INK,
                ..Default::default()
            },
            &mock,
        );
        let out = text.apply_to(solid_fill(100, 50, Color::WHITE), None).unwrap();
        // Two 12px cells at the top-left corner
        assert_eq!(out.get_pixel(0, 0).0, [0x2f, 0x31, 0x3d, 255]);
        assert_eq!(out.get_pixel(23, 11).0, [0x2f, 0x31, 0x3d, 255]);
        assert_eq!(out.get_pixel(24, 0).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(0, 12).0, [255, 255, 255, 255]);
    }

    #[test]
    fn sw_gravity_measures_from_bottom() {
        let mock = MockRasterizer::new();
        let text = Text::new(
            "abc",
            TextOptions {
                gravity: Gravity::Sw,
                color: INK,
                ..Default::default()
            },
            &mock,
        );
        let place = |_: Dimensions, _: Dimensions| Offset::new(10, 20);
        let out = text
            .apply_to(solid_fill(100, 100, Color::WHITE), Some(&place))
            .unwrap();
        // 36x12 layer → y = 100 - 12 - 20 = 68
        assert_eq!(out.get_pixel(10, 68).0[0], 0x2f);
        assert_eq!(out.get_pixel(10, 79).0[0], 0x2f);
        assert_eq!(out.get_pixel(10, 80).0[0], 255);
        assert_eq!(out.get_pixel(10, 67).0[0], 255);
    }

    #[test]
    fn se_gravity_measures_from_bottom_right() {
        let mock = MockRasterizer::new();
        let text = Text::new(
            "ab",
            TextOptions {
                gravity: Gravity::Se,
                color: INK,
                ..Default::default()
            },
            &mock,
        );
        let place = |_: Dimensions, _: Dimensions| Offset::new(10, 10);
        let out = text
            .apply_to(solid_fill(100, 100, Color::WHITE), Some(&place))
            .unwrap();
        // 24x12 layer → x = 100 - 24 - 10 = 66, y = 100 - 12 - 10 = 78
        assert_eq!(out.get_pixel(66, 78).0[0], 0x2f);
        assert_eq!(out.get_pixel(89, 89).0[0], 0x2f);
        assert_eq!(out.get_pixel(90, 89).0[0], 255);
    }
}
