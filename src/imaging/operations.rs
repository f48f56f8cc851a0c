//! Compositing primitives.
//!
//! Every layer element is built from these: a solid fill, a ratio resize, a
//! rounded-corner alpha mask, a glyph-mask recolor, and an alpha-blended
//! composite. Canvases are `RgbaImage`s that stay fully opaque: blending an
//! overlay onto an opaque pixel yields an opaque pixel, so each composite
//! is also a flatten.

use super::backend::{BackendError, Dimensions};
use super::calculations::{ScaleMode, calculate_ratio, scaled_dimensions};
use super::params::Color;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use std::path::Path;

/// Result type for imaging operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// A `width × height` rectangle of one color.
pub fn solid_fill(width: u32, height: u32, color: Color) -> RgbaImage {
    RgbaImage::from_pixel(width, height, color.rgba())
}

/// Decode an in-memory raster image (format sniffed from the bytes).
pub fn decode(bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Scale `image` by `ratio` with Lanczos3 resampling.
pub fn resize_by_ratio(image: &RgbaImage, ratio: f64) -> RgbaImage {
    let target = scaled_dimensions(Dimensions::of(image), ratio);
    if target == Dimensions::of(image) {
        return image.clone();
    }
    image::imageops::resize(image, target.width, target.height, FilterType::Lanczos3)
}

/// Scale `image` relative to a target box under `mode`.
pub fn resize_to(image: &RgbaImage, target: Dimensions, mode: ScaleMode) -> RgbaImage {
    let ratio = calculate_ratio(Dimensions::of(image), target, mode);
    resize_by_ratio(image, ratio)
}

/// Render a rounded-rectangle coverage mask of the given size via SVG.
pub fn rounded_mask(size: Dimensions, radius: u32) -> Result<GrayImage> {
    let Dimensions { width, height } = size;
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><rect x="0" y="0" width="{width}" height="{height}" rx="{radius}" ry="{radius}" fill="#ffffff"/></svg>"##
    );
    let tree = usvg::Tree::from_str(&svg, &usvg::Options::default())
        .map_err(|e| BackendError::Rasterize(format!("rounded mask SVG: {e}")))?;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| BackendError::Rasterize(format!("empty mask {width}x{height}")))?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    let alpha: Vec<u8> = pixmap.pixels().iter().map(|p| p.alpha()).collect();
    GrayImage::from_raw(width, height, alpha)
        .ok_or_else(|| BackendError::Rasterize("mask buffer size mismatch".into()))
}

/// Multiply the image's alpha channel by a same-sized rounded mask.
pub fn round_corners(image: &RgbaImage, radius: u32) -> Result<RgbaImage> {
    let mask = rounded_mask(Dimensions::of(image), radius)?;
    let mut out = image.clone();
    for (pixel, coverage) in out.pixels_mut().zip(mask.pixels()) {
        pixel.0[3] = ((pixel.0[3] as u16 * coverage.0[0] as u16) / 255) as u8;
    }
    Ok(out)
}

/// Turn a glyph coverage mask into a flat-colored RGBA layer.
pub fn colorize_mask(mask: &GrayImage, color: Color) -> RgbaImage {
    let [r, g, b] = color.rgb();
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        image::Rgba([r, g, b, mask.get_pixel(x, y).0[0]])
    })
}

/// Alpha-blend `overlay` onto `canvas` with its top-left at `(x, y)`.
///
/// Parts of the overlay outside the canvas are clipped.
pub fn composite(canvas: &mut RgbaImage, overlay: &RgbaImage, x: i64, y: i64) {
    image::imageops::overlay(canvas, overlay, x, y);
}

/// Encode the canvas as PNG, creating parent directories as needed.
pub fn save_png(canvas: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    DynamicImage::ImageRgba8(canvas.clone())
        .to_rgb8()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| BackendError::Encode(format!("{}: {e}", path.display())))
}
