//! Parameter types for compositing operations.
//!
//! These types describe *what* to draw, not *how*. They are shared by the
//! layer elements (which decide placement) and the primitives in
//! [`operations`](super::operations) (which touch pixels).
//!
//! ## Types
//!
//! - [`Color`]: an opaque `#RRGGBB` color.
//! - [`Gravity`]: the canvas corner an offset is measured from.
//! - [`Position`]: the canvas edge a border strip is drawn along.
//! - [`FontSpec`]: a `"Family, Style [size]"` font description.
//! - [`TextRequest`]: everything the rasterizer needs to produce a glyph mask.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("Invalid gravity: {0:?} (expected one of nw, ne, sw, se)")]
    InvalidGravity(String),
    #[error("Invalid position: {0:?} (expected one of top, bottom, left, right)")]
    InvalidPosition(String),
    #[error("Invalid color: {0:?} (expected #RRGGBB)")]
    InvalidColor(String),
}

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})$").unwrap());

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0]);
    pub const WHITE: Color = Color([255, 255, 255]);

    pub fn rgb(self) -> [u8; 3] {
        self.0
    }

    pub fn rgba(self) -> image::Rgba<u8> {
        let [r, g, b] = self.0;
        image::Rgba([r, g, b, 255])
    }
}

impl FromStr for Color {
    type Err = ParamError;

    /// Parse exactly `#RRGGBB`. Short forms (`#fff`) and names are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = HEX_COLOR
            .captures(s.trim())
            .ok_or_else(|| ParamError::InvalidColor(s.to_string()))?;
        let channel = |i: usize| u8::from_str_radix(&caps[i], 16).unwrap_or_default();
        Ok(Color([channel(1), channel(2), channel(3)]))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

/// Corner of the canvas an element's offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    #[default]
    Nw,
    Ne,
    Sw,
    Se,
}

impl Gravity {
    /// Whether the x offset is measured from the right edge.
    pub fn mirrors_x(self) -> bool {
        matches!(self, Gravity::Ne | Gravity::Se)
    }

    /// Whether the y offset is measured from the bottom edge.
    pub fn mirrors_y(self) -> bool {
        matches!(self, Gravity::Sw | Gravity::Se)
    }
}

impl FromStr for Gravity {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nw" => Ok(Gravity::Nw),
            "ne" => Ok(Gravity::Ne),
            "sw" => Ok(Gravity::Sw),
            "se" => Ok(Gravity::Se),
            other => Err(ParamError::InvalidGravity(other.to_string())),
        }
    }
}

/// Canvas edge a border strip runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl Position {
    /// Left/right strips run the full canvas height.
    pub fn is_vertical(self) -> bool {
        matches!(self, Position::Left | Position::Right)
    }
}

impl FromStr for Position {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Position::Top),
            "bottom" => Ok(Position::Bottom),
            "left" => Ok(Position::Left),
            "right" => Ok(Position::Right),
            other => Err(ParamError::InvalidPosition(other.to_string())),
        }
    }
}

/// Point size used when a font description carries none.
pub const DEFAULT_POINT_SIZE: f32 = 12.0;

/// Parsed `"Family, Style [size]"` font description.
///
/// - `"Helvetica, Bold"` → family `Helvetica`, weight 700
/// - `"Inter, Semibold Italic 14"` → weight 600, italic, 14pt
/// - `"Georgia"` → weight 400, 12pt
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub weight: u16,
    pub italic: bool,
    pub point_size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            weight: 400,
            italic: false,
            point_size: DEFAULT_POINT_SIZE,
        }
    }
}

impl FontSpec {
    pub fn parse(description: &str) -> Self {
        let mut spec = FontSpec::default();
        let (family, style) = match description.split_once(',') {
            Some((family, style)) => (family.trim(), style.trim()),
            None => (description.trim(), ""),
        };
        if !family.is_empty() {
            spec.family = family.to_string();
        }

        for word in style.split_whitespace() {
            match word.to_ascii_lowercase().as_str() {
                "thin" => spec.weight = 100,
                "light" => spec.weight = 300,
                "regular" | "normal" | "book" => spec.weight = 400,
                "medium" => spec.weight = 500,
                "semibold" | "demibold" => spec.weight = 600,
                "bold" => spec.weight = 700,
                "heavy" | "black" => spec.weight = 900,
                "italic" | "oblique" => spec.italic = true,
                other => {
                    if let Ok(size) = other.parse::<f32>()
                        && size > 0.0
                    {
                        spec.point_size = size;
                    }
                }
            }
        }
        spec
    }
}

/// Dots per inch assumed when a text layer sets none.
pub const DEFAULT_DPI: u32 = 72;

/// A single text rasterization job.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub text: String,
    pub font: FontSpec,
    pub dpi: u32,
    /// Maximum line width in pixels. `None` renders every line unwrapped.
    pub wrap_width: Option<u32>,
}

impl TextRequest {
    /// Glyph em size in pixels: points scaled by `dpi / 72`.
    pub fn pixel_size(&self) -> f32 {
        self.font.point_size * self.dpi as f32 / 72.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_six_digit_hex() {
        let c: Color = "#2f313d".parse().unwrap();
        assert_eq!(c.rgb(), [0x2f, 0x31, 0x3d]);
        assert_eq!(c.to_string(), "#2F313D");
    }

    #[test]
    fn color_rejects_other_forms() {
        for bad in ["#fff", "2f313d", "#2f313g", "red", "", "#2f313d00"] {
            assert!(
                matches!(bad.parse::<Color>(), Err(ParamError::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn gravity_parses_all_corners() {
        assert_eq!("nw".parse::<Gravity>().unwrap(), Gravity::Nw);
        assert_eq!("ne".parse::<Gravity>().unwrap(), Gravity::Ne);
        assert_eq!("sw".parse::<Gravity>().unwrap(), Gravity::Sw);
        assert_eq!("se".parse::<Gravity>().unwrap(), Gravity::Se);
    }

    #[test]
    fn gravity_rejects_unknown() {
        let err = "center".parse::<Gravity>().unwrap_err();
        assert_eq!(err, ParamError::InvalidGravity("center".into()));
    }

    #[test]
    fn gravity_mirroring() {
        assert!(!Gravity::Nw.mirrors_x() && !Gravity::Nw.mirrors_y());
        assert!(Gravity::Ne.mirrors_x() && !Gravity::Ne.mirrors_y());
        assert!(!Gravity::Sw.mirrors_x() && Gravity::Sw.mirrors_y());
        assert!(Gravity::Se.mirrors_x() && Gravity::Se.mirrors_y());
    }

    #[test]
    fn position_parses_and_rejects() {
        assert_eq!("left".parse::<Position>().unwrap(), Position::Left);
        assert!("left".parse::<Position>().unwrap().is_vertical());
        assert!(!"bottom".parse::<Position>().unwrap().is_vertical());
        assert!(matches!(
            "middle".parse::<Position>(),
            Err(ParamError::InvalidPosition(_))
        ));
    }

    #[test]
    fn font_spec_family_and_weight() {
        let spec = FontSpec::parse("Helvetica, Bold");
        assert_eq!(spec.family, "Helvetica");
        assert_eq!(spec.weight, 700);
        assert!(!spec.italic);
        assert_eq!(spec.point_size, DEFAULT_POINT_SIZE);
    }

    #[test]
    fn font_spec_style_words_and_size() {
        let spec = FontSpec::parse("Inter, Semibold Italic 14");
        assert_eq!(spec.family, "Inter");
        assert_eq!(spec.weight, 600);
        assert!(spec.italic);
        assert_eq!(spec.point_size, 14.0);
    }

    #[test]
    fn font_spec_family_only() {
        let spec = FontSpec::parse("Georgia");
        assert_eq!(spec.family, "Georgia");
        assert_eq!(spec.weight, 400);
    }

    #[test]
    fn pixel_size_scales_with_dpi() {
        let req = TextRequest {
            text: "x".into(),
            font: FontSpec::default(),
            dpi: 144,
            wrap_width: None,
        };
        assert_eq!(req.pixel_size(), 24.0);
    }
}
