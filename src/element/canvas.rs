use super::{
    Border, BorderOptions, ElementError, Image, ImageOptions, Layer, Placement, Text, TextOptions,
};
use crate::imaging::operations::{composite, decode, resize_to, save_png, solid_fill};
use crate::imaging::{Color, Dimensions, ScaleMode, TextRasterizer};
use image::RgbaImage;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct CanvasOptions<'a> {
    pub background_color: Color,
    /// Encoded raster cover-scaled over the background color.
    pub background_image: Option<&'a [u8]>,
}

impl Default for CanvasOptions<'_> {
    fn default() -> Self {
        Self {
            background_color: Color::WHITE,
            background_image: None,
        }
    }
}

/// The base layer. Owns the pixel buffer and chains the other layers on top.
///
/// ```ignore
/// Canvas::new(1200, 600, &CanvasOptions::default(), &rasterizer)?
///     .border(10, BorderOptions::default(), None)?
///     .text("Hello", TextOptions::default(), Some(&|_, _| Offset::new(80, 100)))?
///     .save(Path::new("card.png"))?;
/// ```
pub struct Canvas<'r> {
    pixels: RgbaImage,
    rasterizer: &'r dyn TextRasterizer,
}

impl<'r> Canvas<'r> {
    pub fn new(
        width: u32,
        height: u32,
        options: &CanvasOptions<'_>,
        rasterizer: &'r dyn TextRasterizer,
    ) -> Result<Self, ElementError> {
        let mut pixels = solid_fill(width, height, options.background_color);

        if let Some(bytes) = options.background_image {
            let background = decode(bytes)?;
            let covered = resize_to(&background, Dimensions { width, height }, ScaleMode::Cover);
            composite(&mut pixels, &covered, 0, 0);
        }

        Ok(Self { pixels, rasterizer })
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::of(&self.pixels)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    fn apply(mut self, layer: &dyn Layer, place: Option<Placement<'_>>) -> Result<Self, ElementError> {
        self.pixels = layer.apply_to(self.pixels, place)?;
        Ok(self)
    }

    pub fn border(
        self,
        size: u32,
        options: BorderOptions,
        place: Option<Placement<'_>>,
    ) -> Result<Self, ElementError> {
        self.apply(&Border::new(size, options), place)
    }

    pub fn image(
        self,
        source: &[u8],
        options: ImageOptions,
        place: Option<Placement<'_>>,
    ) -> Result<Self, ElementError> {
        self.apply(&Image::new(source, options), place)
    }

    pub fn text(
        self,
        message: &str,
        options: TextOptions,
        place: Option<Placement<'_>>,
    ) -> Result<Self, ElementError> {
        let rasterizer = self.rasterizer;
        self.apply(&Text::new(message, options, rasterizer), place)
    }

    /// Write the canvas as PNG, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ElementError> {
        save_png(&self.pixels, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Fill, Offset};
    use crate::imaging::Position;
    use crate::imaging::backend::tests::MockRasterizer;
    use crate::test_helpers::png_bytes;

    const RED: Color = Color([255, 0, 0]);
    const BLUE: Color = Color([0, 0, 255]);

    #[test]
    fn new_fills_background_color() {
        let mock = MockRasterizer::new();
        let canvas = Canvas::new(
            40,
            20,
            &CanvasOptions {
                background_color: BLUE,
                background_image: None,
            },
            &mock,
        )
        .unwrap();
        assert_eq!(
            canvas.dimensions(),
            Dimensions {
                width: 40,
                height: 20
            }
        );
        assert!(canvas.pixels().pixels().all(|p| p.0 == [0, 0, 255, 255]));
    }

    #[test]
    fn background_image_covers_whole_canvas() {
        let mock = MockRasterizer::new();
        let bg = png_bytes(10, 10, RED);
        let canvas = Canvas::new(
            120,
            60,
            &CanvasOptions {
                background_color: BLUE,
                background_image: Some(&bg),
            },
            &mock,
        )
        .unwrap();
        assert_eq!(canvas.pixels().get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(canvas.pixels().get_pixel(119, 59).0, [255, 0, 0, 255]);
    }

    #[test]
    fn bad_background_image_is_error() {
        let mock = MockRasterizer::new();
        let result = Canvas::new(
            10,
            10,
            &CanvasOptions {
                background_image: Some(b"garbage"),
                ..Default::default()
            },
            &mock,
        );
        assert!(matches!(
            result,
            Err(ElementError::Backend(crate::imaging::BackendError::Decode(_)))
        ));
    }

    #[test]
    fn later_layers_draw_over_earlier_ones() {
        let mock = MockRasterizer::new();
        // Text cell at bottom-left, then a border over the same rows
        let place = |_: Dimensions, _: Dimensions| Offset::ZERO;
        let canvas = Canvas::new(50, 50, &CanvasOptions::default(), &mock)
            .unwrap()
            .text(
                "a",
                TextOptions {
                    gravity: crate::imaging::Gravity::Sw,
                    color: BLUE,
                    ..Default::default()
                },
                Some(&place),
            )
            .unwrap()
            .border(
                5,
                BorderOptions {
                    position: Position::Bottom,
                    fill: Fill::Solid(RED),
                },
                None,
            )
            .unwrap();

        assert_eq!(canvas.pixels().get_pixel(0, 49).0, [255, 0, 0, 255]);
        assert_eq!(canvas.pixels().get_pixel(0, 44).0, [0, 0, 255, 255]);
    }

    #[test]
    fn text_uses_canvas_rasterizer() {
        let mock = MockRasterizer::new();
        Canvas::new(100, 100, &CanvasOptions::default(), &mock)
            .unwrap()
            .text("hi", TextOptions::default(), None)
            .unwrap();
        let requests = mock.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].text, "hi");
    }

    #[test]
    fn chained_image_and_save() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mock = MockRasterizer::new();
        let avatar = png_bytes(20, 20, RED);
        let path = tmp.path().join("out/card.png");

        Canvas::new(100, 60, &CanvasOptions::default(), &mock)
            .unwrap()
            .image(&avatar, ImageOptions::default(), None)
            .unwrap()
            .save(&path)
            .unwrap();

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (100, 60));
        assert_eq!(saved.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(saved.get_pixel(20, 20).0, [255, 255, 255]);
    }
}
