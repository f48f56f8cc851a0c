//! Compositing primitives: pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Solid fill** | `image::RgbaImage::from_pixel` |
//! | **Decode** | `image::load_from_memory` |
//! | **Fit / cover resize** | Lanczos3 `image::imageops::resize` |
//! | **Rounded mask** | SVG `<rect rx>` rendered by `resvg` |
//! | **Text** | [`TextRasterizer`] → [`FontRasterizer`] (`fontdb` + `ttf-parser` + `tiny-skia`) |
//! | **Composite** | `image::imageops::overlay` (alpha blend) |
//! | **Encode** | PNG via `image` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for ratio, gravity, and band math (unit testable)
//! - **Parameters**: Colors, gravity, positions, font descriptions
//! - **Backend**: [`TextRasterizer`] trait + shared error/size types
//! - **Operations**: Pixel-level primitives the layer elements are built from

pub mod backend;
mod calculations;
pub mod font_rasterizer;
pub mod operations;
mod params;

pub use backend::{BackendError, Dimensions, TextRasterizer};
pub use calculations::{
    Band, ScaleMode, calculate_bands, calculate_ratio, gravity_position, scaled_dimensions,
};
pub use font_rasterizer::FontRasterizer;
pub use params::{
    Color, DEFAULT_DPI, DEFAULT_POINT_SIZE, FontSpec, Gravity, ParamError, Position, TextRequest,
};
