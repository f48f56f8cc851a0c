//! Pure Rust text rasterizer.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Font discovery | `fontdb::Database` (system fonts + extra directories) |
//! | Face selection | `fontdb::Database::query` (family, weight, style), sans-serif fallback |
//! | Metrics + outlines | `ttf_parser::Face` |
//! | Anti-aliased fill | `tiny_skia::Pixmap::fill_path` |
//!
//! Layout is deliberately simple: left-aligned lines, greedy word wrap on
//! whitespace, explicit `\n` honoured, no kerning or shaping.

use super::backend::{BackendError, TextRasterizer};
use super::params::TextRequest;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use image::GrayImage;
use std::path::PathBuf;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};
use ttf_parser::{Face, OutlineBuilder};

/// Sans-serif families tried, in order, for the generic fallback.
const SANS_SERIF_PREFERENCE: &[&str] = &[
    "Helvetica",
    "Arial",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
];

/// Text rasterizer backed by system fonts.
pub struct FontRasterizer {
    db: Database,
}

impl FontRasterizer {
    /// Load system fonts.
    pub fn new() -> Self {
        Self::with_font_dirs(&[])
    }

    /// Load system fonts plus every font found under `dirs`.
    pub fn with_font_dirs(dirs: &[PathBuf]) -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        for dir in dirs {
            db.load_fonts_dir(dir);
        }

        let available: std::collections::HashSet<String> = db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        if let Some(family) = SANS_SERIF_PREFERENCE
            .iter()
            .find(|f| available.contains(**f))
        {
            db.set_sans_serif_family(*family);
        }

        Self { db }
    }

    /// Number of font faces available.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    fn query(&self, request: &TextRequest) -> Option<fontdb::ID> {
        let style = if request.font.italic {
            Style::Italic
        } else {
            Style::Normal
        };
        let families = [Family::Name(request.font.family.as_str()), Family::SansSerif];
        self.db.query(&Query {
            families: &families,
            weight: Weight(request.font.weight),
            stretch: Stretch::Normal,
            style,
        })
    }
}

impl Default for FontRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRasterizer for FontRasterizer {
    fn supports_word_wrap(&self) -> bool {
        true
    }

    fn rasterize(&self, request: &TextRequest) -> Result<GrayImage, BackendError> {
        let id = self
            .query(request)
            .ok_or_else(|| BackendError::FontNotFound(request.font.family.clone()))?;

        self.db
            .with_face_data(id, |data, index| {
                let face = Face::parse(data, index)
                    .map_err(|e| BackendError::Rasterize(format!("font parse: {e}")))?;
                render(&face, request)
            })
            .ok_or_else(|| BackendError::FontNotFound(request.font.family.clone()))?
    }
}

/// Font-unit metrics scaled to pixels.
struct Metrics {
    scale: f32,
    ascent: f32,
    line_height: f32,
}

impl Metrics {
    fn new(face: &Face, pixel_size: f32) -> Self {
        let scale = pixel_size / face.units_per_em() as f32;
        let ascent = face.ascender() as f32 * scale;
        let descent = face.descender() as f32 * scale;
        let gap = face.line_gap() as f32 * scale;
        Self {
            scale,
            ascent,
            line_height: (ascent - descent + gap).max(1.0),
        }
    }
}

fn advance(face: &Face, ch: char, scale: f32) -> f32 {
    face.glyph_index(ch)
        .and_then(|id| face.glyph_hor_advance(id))
        .unwrap_or(0) as f32
        * scale
}

fn measure(face: &Face, text: &str, scale: f32) -> f32 {
    text.chars().map(|c| advance(face, c, scale)).sum()
}

/// Greedy word wrap. A word wider than `max_width` gets a line of its own.
fn wrap_lines(face: &Face, text: &str, scale: f32, max_width: Option<u32>) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let Some(max) = max_width.map(|w| w as f32) else {
            lines.push(paragraph.to_string());
            continue;
        };

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if !current.is_empty() && measure(face, &candidate, scale) > max {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}

/// Builds a tiny-skia path from glyph outlines, flipping y and placing the
/// glyph at the pen position.
struct GlyphPath<'a> {
    builder: &'a mut PathBuilder,
    scale: f32,
    x: f32,
    baseline: f32,
}

impl GlyphPath<'_> {
    fn px(&self, x: f32) -> f32 {
        self.x + x * self.scale
    }

    fn py(&self, y: f32) -> f32 {
        self.baseline - y * self.scale
    }
}

impl OutlineBuilder for GlyphPath<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.px(x), self.py(y));
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.px(x), self.py(y));
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1, x, y) = (self.px(x1), self.py(y1), self.px(x), self.py(y));
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = (self.px(x1), self.py(y1));
        let (x2, y2) = (self.px(x2), self.py(y2));
        let (x, y) = (self.px(x), self.py(y));
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn render(face: &Face, request: &TextRequest) -> Result<GrayImage, BackendError> {
    let metrics = Metrics::new(face, request.pixel_size());
    let lines = wrap_lines(face, &request.text, metrics.scale, request.wrap_width);

    let widest = lines
        .iter()
        .map(|line| measure(face, line, metrics.scale))
        .fold(0.0f32, f32::max);
    let width = (widest.ceil() as u32).max(1);
    let height = ((metrics.line_height * lines.len() as f32).ceil() as u32).max(1);

    let mut builder = PathBuilder::new();
    for (row, line) in lines.iter().enumerate() {
        let mut pen = GlyphPath {
            builder: &mut builder,
            scale: metrics.scale,
            x: 0.0,
            baseline: metrics.ascent + row as f32 * metrics.line_height,
        };
        for ch in line.chars() {
            let Some(glyph) = face.glyph_index(ch) else {
                continue;
            };
            face.outline_glyph(glyph, &mut pen);
            pen.x += face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * metrics.scale;
        }
    }

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| BackendError::Rasterize(format!("invalid text size {width}x{height}")))?;
    // Whitespace-only text has no outline; return the empty mask.
    if let Some(path) = builder.finish() {
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    let coverage: Vec<u8> = pixmap.pixels().iter().map(|p| p.alpha()).collect();
    GrayImage::from_raw(width, height, coverage)
        .ok_or_else(|| BackendError::Rasterize("mask buffer size mismatch".into()))
}
