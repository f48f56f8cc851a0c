//! Shared test utilities for the og-card test suite.
//!
//! Provides file fixtures, encoded test images, and content-item builders so
//! pipeline tests can set up a site in a few lines.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_png(tmp.path(), "assets/avatar.png", 300, 300, Color::BLACK);
//! let post = post("advanced-markdown-tips", "Advanced Markdown Tips")
//!     .dated(2024, 3, 15)
//!     .tagged(&["markdown", "writing"]);
//! ```

use std::path::{Path, PathBuf};

use crate::content::ContentItem;
use crate::imaging::Color;
use crate::imaging::operations::solid_fill;
use chrono::NaiveDate;
use image::ImageEncoder;

// =========================================================================
// Files
// =========================================================================

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

/// PNG bytes of a solid `width × height` image.
pub fn png_bytes(width: u32, height: u32, color: Color) -> Vec<u8> {
    let img = solid_fill(width, height, color);
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

/// Write a solid PNG to `root/rel`, creating parent directories.
pub fn write_png(root: &Path, rel: &str, width: u32, height: u32, color: Color) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, png_bytes(width, height, color)).unwrap();
    path
}

// =========================================================================
// Content items
// =========================================================================

/// A post with no date, tags, or overrides.
pub fn post(slug: &str, title: &str) -> ContentItem {
    ContentItem::new("posts", slug, title)
}

/// Builder-style tweaks for test items.
pub trait ItemExt {
    fn dated(self, y: i32, m: u32, d: u32) -> Self;
    fn tagged(self, tags: &[&str]) -> Self;
    fn draft(self) -> Self;
    /// Parse `toml` as the item's `og_image` override table.
    fn overriding(self, toml: &str) -> Self;
}

impl ItemExt for ContentItem {
    fn dated(mut self, y: i32, m: u32, d: u32) -> Self {
        self.date = NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(0, 0, 0));
        self
    }

    fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    fn draft(mut self) -> Self {
        self.draft = true;
        self
    }

    fn overriding(mut self, toml: &str) -> Self {
        self.overrides = toml::from_str(toml).unwrap();
        self
    }
}
