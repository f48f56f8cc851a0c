//! Layer elements.
//!
//! Each element wraps one compositing primitive with a declarative set of
//! parameters. An element is built, applied to a canvas once, and dropped:
//!
//! | Element | Draws |
//! |---|---|
//! | [`Canvas`] | solid background, optional cover-scaled background image; chains the others |
//! | [`Border`] | a strip along one edge, single color or N equal color bands |
//! | [`Image`] | a decoded raster, optional rounded corners, fit-scaled into a box |
//! | [`Text`] | a rasterized string in one flat color |
//!
//! ## Placement
//!
//! Every element is anchored at a [`Gravity`](crate::imaging::Gravity)
//! corner and moved inward by an [`Offset`]. The offset comes from an
//! optional placement callback that sees the canvas and element sizes;
//! without one the offset is `(0, 0)`.
//!
//! ```text
//! nw ──────────────── ne      nw: (x, y)
//! │                    │      ne: (W - w - x, y)
//! │                    │      sw: (x, H - h - y)
//! sw ──────────────── se      se: (W - w - x, H - h - y)
//! ```
//!
//! ## Ordering
//!
//! Layers are composited in call order, so later layers draw over earlier
//! ones. [`Canvas`] methods consume and return the canvas to make the order
//! explicit at the call site.

mod border;
mod canvas;
mod image;
mod text;

pub use self::image::{Image, ImageOptions};
pub use border::{Border, BorderOptions, Fill};
pub use canvas::{Canvas, CanvasOptions};
pub use text::{Text, TextOptions};

use crate::imaging::{BackendError, Dimensions};
use thiserror::Error;

/// Gravity and position are typed, so string validation happens where they
/// are parsed ([`ParamError`](crate::imaging::ParamError)); applying a layer
/// can only fail in the imaging backend.
#[derive(Error, Debug)]
pub enum ElementError {
    #[error("Imaging error: {0}")]
    Backend(#[from] BackendError),
}

/// Pixel offset measured inward from an element's anchor corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub x: i64,
    pub y: i64,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Placement callback: `(canvas size, element size) -> offset`.
pub type Placement<'a> = &'a dyn Fn(Dimensions, Dimensions) -> Offset;

/// Run the placement callback, defaulting to `(0, 0)`.
fn resolve_offset(place: Option<Placement<'_>>, canvas: Dimensions, element: Dimensions) -> Offset {
    place.map(|f| f(canvas, element)).unwrap_or(Offset::ZERO)
}

/// A layer that can be composited onto a canvas.
pub trait Layer {
    /// Draw onto `canvas` and return the new canvas state.
    fn apply_to(
        &self,
        canvas: ::image::RgbaImage,
        place: Option<Placement<'_>>,
    ) -> Result<::image::RgbaImage, ElementError>;
}
