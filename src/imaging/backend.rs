//! Text rasterization capability and shared imaging types.
//!
//! The [`TextRasterizer`] trait is the one seam between layout and font
//! handling: a layer hands over a [`TextRequest`] and gets back a glyph
//! coverage mask. Everything else (fills, scaling, compositing) is plain
//! pixel work in [`operations`](super::operations).
//!
//! The production implementation is
//! [`FontRasterizer`](super::font_rasterizer::FontRasterizer). Tests use a
//! mock that draws one solid cell per character so layout can be asserted
//! without any installed fonts.

use super::params::TextRequest;
use image::GrayImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("No usable font for family {0:?}")]
    FontNotFound(String),
    #[error("Rasterization failed: {0}")]
    Rasterize(String),
}

/// Pixel size of a canvas or layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of<I: image::GenericImageView>(image: &I) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }
}

/// Renders text into an 8-bit coverage mask (255 = fully inside a glyph).
pub trait TextRasterizer {
    /// Whether `TextRequest::wrap_width` is honoured. Layers only ask for
    /// wrapping when this is true; otherwise lines are rendered unwrapped.
    fn supports_word_wrap(&self) -> bool;

    /// Rasterize the request. The mask is at least 1×1.
    fn rasterize(&self, request: &TextRequest) -> Result<GrayImage, BackendError>;
}
