//! Card configuration module.
//!
//! Configuration is a raw TOML tree that is layered, then coerced. The site
//! provides the base layer (the `[og_image]` table of `config.toml`); every
//! document may deep-merge its own front-matter `og_image` table on top:
//!
//! ```text
//! stock defaults (implicit, in the accessors)
//!   └── <source>/config.toml [og_image]       site defaults
//!         └── CLI flags (--force, --verbose)   overlay
//!               └── front matter og_image = {…}  per document
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! [og_image]
//! # All options are optional - defaults shown below
//! output_dir = "assets/images/og"   # Relative to the site source
//! force = false                     # Regenerate even if the card exists
//! verbose = false                   # Print progress and skip lines
//! skip_drafts = true                # Drafts get no card
//! enabled = true                    # Set false per document to opt out
//! collections = ["posts"]           # Content types to render (alias: content_types)
//! # image = "assets/avatar.png"     # Avatar drawn top-right
//! # domain = "example.com"          # Footer text bottom-right
//!
//! [og_image.canvas]
//! background_color = "#FFFFFF"
//! # background_image = "assets/og-bg.png"
//! width = 1200
//! height = 600
//!
//! [og_image.header]
//! font_family = "Helvetica, Bold"
//! color = "#2f313d"
//!
//! [og_image.content]
//! font_family = "Helvetica, Regular"
//! color = "#535358"
//!
//! # Absent by default. Its presence turns the bottom border on.
//! # [og_image.border_bottom]
//! # width = 20
//! # fill = ["#211F1F", "#F4CBB2", "#AD5C51"]
//! ```
//!
//! ## Merging
//!
//! Tables merge key-by-key, anything else (scalars *and* arrays) is replaced
//! wholesale by the overlay. A document that sets
//! `og_image = { canvas = { width = 800 } }` keeps the site's canvas color.
//!
//! ## Coercion
//!
//! Accessors never panic on bad input. Integers must be TOML integers or
//! numeric strings, colors must be `#RRGGBB`, and unknown keys are rejected
//! to catch typos early. Every failure is a [`ConfigError::InvalidConfig`]
//! naming the offending key.

use crate::imaging::Color;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Front-matter and `config.toml` key holding the card options.
pub const CONFIG_KEY: &str = "og_image";

pub const DEFAULT_OUTPUT_DIR: &str = "assets/images/og";
pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 600;
/// Space reserved above the bottom edge before any border is added.
pub const BASE_MARGIN_BOTTOM: u32 = 80;

const TOP_LEVEL_KEYS: &[&str] = &[
    "output_dir",
    "force",
    "verbose",
    "skip_drafts",
    "enabled",
    "collections",
    "content_types",
    "image",
    "domain",
    "canvas",
    "header",
    "content",
    "border_bottom",
];
const CANVAS_KEYS: &[&str] = &["background_color", "background_image", "width", "height"];
const TEXT_STYLE_KEYS: &[&str] = &["font_family", "color"];
const BORDER_KEYS: &[&str] = &["width", "fill"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid config value for `{key}`: {reason}")]
    InvalidConfig { key: String, reason: String },
}

fn invalid(key: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidConfig {
        key: key.to_string(),
        reason: reason.into(),
    }
}

// =============================================================================
// Typed records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasConfig {
    pub background_color: Color,
    /// Path relative to the site source.
    pub background_image: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            background_color: Color::WHITE,
            background_image: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Font and color for one class of text (header or content lines).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub font_family: String,
    pub color: Color,
}

impl TextStyle {
    pub fn header_default() -> Self {
        Self {
            font_family: "Helvetica, Bold".to_string(),
            color: Color([0x2f, 0x31, 0x3d]),
        }
    }

    pub fn content_default() -> Self {
        Self {
            font_family: "Helvetica, Regular".to_string(),
            color: Color([0x53, 0x53, 0x58]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderConfig {
    pub width: u32,
    /// One color, or several equal bands in order.
    pub fill: Vec<Color>,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            width: 0,
            fill: vec![Color::BLACK],
        }
    }
}

/// A fully validated configuration for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgImageConfig {
    pub collections: Vec<String>,
    pub output_dir: String,
    pub force: bool,
    pub verbose: bool,
    pub skip_drafts: bool,
    pub enabled: bool,
    pub canvas: CanvasConfig,
    pub header: TextStyle,
    pub content: TextStyle,
    pub image: Option<String>,
    pub domain: Option<String>,
    pub border_bottom: Option<BorderConfig>,
}

impl OgImageConfig {
    /// Vertical space reserved for the stacked footer lines.
    pub fn margin_bottom(&self) -> u32 {
        BASE_MARGIN_BOTTOM.saturating_add(self.border_bottom.as_ref().map_or(0, |b| b.width))
    }
}

impl Default for OgImageConfig {
    fn default() -> Self {
        Self {
            collections: vec!["posts".to_string()],
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            force: false,
            verbose: false,
            skip_drafts: true,
            enabled: true,
            canvas: CanvasConfig::default(),
            header: TextStyle::header_default(),
            content: TextStyle::content_default(),
            image: None,
            domain: None,
            border_bottom: None,
        }
    }
}

// =============================================================================
// Raw configuration tree
// =============================================================================

/// An immutable, mergeable option tree.
///
/// Holds the raw TOML exactly as written; defaults and coercion are applied
/// by the accessors, so an unset key stays unset through any number of
/// merges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    raw: toml::Table,
}

impl Configuration {
    pub fn new(raw: toml::Table) -> Self {
        Self { raw }
    }

    /// Parse a TOML document whose top level is the option table itself.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(toml::from_str(text)?))
    }

    pub fn to_table(&self) -> &toml::Table {
        &self.raw
    }

    /// Deep-merge `other` over `self`, returning a new configuration.
    pub fn merge(&self, other: &Configuration) -> Configuration {
        self.merge_table(&other.raw)
    }

    /// Like [`merge`](Self::merge) but with a bare table, e.g. a front-matter block.
    pub fn merge_table(&self, other: &toml::Table) -> Configuration {
        let merged = merge_toml(
            toml::Value::Table(self.raw.clone()),
            toml::Value::Table(other.clone()),
        );
        match merged {
            toml::Value::Table(raw) => Configuration { raw },
            // Two tables always merge into a table
            _ => self.clone(),
        }
    }

    pub fn collections(&self) -> Result<Vec<String>, ConfigError> {
        let key = if self.raw.contains_key("content_types") {
            "content_types"
        } else {
            "collections"
        };
        match self.raw.get(key) {
            Some(value) => string_list(key, value),
            None => Ok(vec!["posts".to_string()]),
        }
    }

    pub fn output_dir(&self) -> Result<String, ConfigError> {
        self.optional_string("output_dir")
            .map(|dir| dir.unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()))
    }

    pub fn force(&self) -> Result<bool, ConfigError> {
        self.flag("force", false)
    }

    pub fn verbose(&self) -> Result<bool, ConfigError> {
        self.flag("verbose", false)
    }

    pub fn skip_drafts(&self) -> Result<bool, ConfigError> {
        self.flag("skip_drafts", true)
    }

    pub fn enabled(&self) -> Result<bool, ConfigError> {
        self.flag("enabled", true)
    }

    pub fn image(&self) -> Result<Option<String>, ConfigError> {
        self.optional_string("image")
    }

    pub fn domain(&self) -> Result<Option<String>, ConfigError> {
        self.optional_string("domain")
    }

    pub fn canvas(&self) -> Result<CanvasConfig, ConfigError> {
        let mut canvas = CanvasConfig::default();
        let Some(table) = self.section("canvas", CANVAS_KEYS)? else {
            return Ok(canvas);
        };
        if let Some(v) = table.get("background_color") {
            canvas.background_color = color("canvas.background_color", v)?;
        }
        if let Some(v) = table.get("background_image") {
            canvas.background_image = Some(string("canvas.background_image", v)?);
        }
        if let Some(v) = table.get("width") {
            canvas.width = positive_integer("canvas.width", v)?;
        }
        if let Some(v) = table.get("height") {
            canvas.height = positive_integer("canvas.height", v)?;
        }
        Ok(canvas)
    }

    pub fn header(&self) -> Result<TextStyle, ConfigError> {
        self.text_style("header", TextStyle::header_default())
    }

    pub fn content(&self) -> Result<TextStyle, ConfigError> {
        self.text_style("content", TextStyle::content_default())
    }

    /// `None` when the key is unset; the border layer only runs when present.
    ///
    /// The width may not exceed the canvas height.
    pub fn border_bottom(&self) -> Result<Option<BorderConfig>, ConfigError> {
        let Some(table) = self.section("border_bottom", BORDER_KEYS)? else {
            return Ok(None);
        };
        let mut border = BorderConfig::default();
        if let Some(v) = table.get("width") {
            border.width = integer("border_bottom.width", v)?;
            let height = self.canvas()?.height;
            if border.width > height {
                return Err(invalid(
                    "border_bottom.width",
                    format!("{} exceeds the canvas height {height}", border.width),
                ));
            }
        }
        if let Some(v) = table.get("fill") {
            let fill = string_list("border_bottom.fill", v)?
                .iter()
                .map(|s| parse_color("border_bottom.fill", s))
                .collect::<Result<Vec<_>, _>>()?;
            if fill.is_empty() {
                return Err(invalid("border_bottom.fill", "needs at least one color"));
            }
            border.fill = fill;
        }
        Ok(Some(border))
    }

    /// `80 + border width`, the space the footer lines stack above.
    pub fn margin_bottom(&self) -> Result<u32, ConfigError> {
        Ok(BASE_MARGIN_BOTTOM.saturating_add(self.border_bottom()?.map_or(0, |b| b.width)))
    }

    /// Validate every key once and produce the typed configuration.
    pub fn resolve(&self) -> Result<OgImageConfig, ConfigError> {
        if let Some(key) = self.raw.keys().find(|k| !TOP_LEVEL_KEYS.contains(&k.as_str())) {
            return Err(invalid(key, "unknown key"));
        }
        Ok(OgImageConfig {
            collections: self.collections()?,
            output_dir: self.output_dir()?,
            force: self.force()?,
            verbose: self.verbose()?,
            skip_drafts: self.skip_drafts()?,
            enabled: self.enabled()?,
            canvas: self.canvas()?,
            header: self.header()?,
            content: self.content()?,
            image: self.image()?,
            domain: self.domain()?,
            border_bottom: self.border_bottom()?,
        })
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.raw.get(key) {
            None => Ok(default),
            Some(toml::Value::Boolean(b)) => Ok(*b),
            Some(toml::Value::String(s)) => match s.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(invalid(key, format!("expected a boolean, got {s:?}"))),
            },
            Some(other) => Err(invalid(
                key,
                format!("expected a boolean, got {}", other.type_str()),
            )),
        }
    }

    fn optional_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.raw.get(key).map(|v| string(key, v)).transpose()
    }

    /// A sub-table, checked for unknown keys. `None` when unset.
    fn section(&self, key: &str, allowed: &[&str]) -> Result<Option<&toml::Table>, ConfigError> {
        match self.raw.get(key) {
            None => Ok(None),
            Some(toml::Value::Table(table)) => {
                if let Some(unknown) = table.keys().find(|k| !allowed.contains(&k.as_str())) {
                    return Err(invalid(&format!("{key}.{unknown}"), "unknown key"));
                }
                Ok(Some(table))
            }
            Some(other) => Err(invalid(
                key,
                format!("expected a table, got {}", other.type_str()),
            )),
        }
    }

    fn text_style(&self, key: &str, mut style: TextStyle) -> Result<TextStyle, ConfigError> {
        let Some(table) = self.section(key, TEXT_STYLE_KEYS)? else {
            return Ok(style);
        };
        if let Some(v) = table.get("font_family") {
            style.font_family = string(&format!("{key}.font_family"), v)?;
        }
        if let Some(v) = table.get("color") {
            style.color = color(&format!("{key}.color"), v)?;
        }
        Ok(style)
    }
}

// =============================================================================
// Coercion
// =============================================================================

fn string(key: &str, value: &toml::Value) -> Result<String, ConfigError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(key, format!("expected a string, got {}", value.type_str())))
}

/// An array of strings, or a single string standing for a one-element list.
fn string_list(key: &str, value: &toml::Value) -> Result<Vec<String>, ConfigError> {
    match value {
        toml::Value::String(s) => Ok(vec![s.clone()]),
        toml::Value::Array(items) => items.iter().map(|item| string(key, item)).collect(),
        other => Err(invalid(
            key,
            format!("expected a string or list of strings, got {}", other.type_str()),
        )),
    }
}

/// A non-negative integer. Numeric strings are accepted, anything else fails.
fn integer(key: &str, value: &toml::Value) -> Result<u32, ConfigError> {
    let parsed = match value {
        toml::Value::Integer(i) => u32::try_from(*i).ok(),
        toml::Value::String(s) => s.trim().parse::<u32>().ok(),
        other => {
            return Err(invalid(
                key,
                format!("expected an integer, got {}", other.type_str()),
            ));
        }
    };
    parsed.ok_or_else(|| invalid(key, format!("expected a non-negative integer, got {value}")))
}

fn positive_integer(key: &str, value: &toml::Value) -> Result<u32, ConfigError> {
    match integer(key, value)? {
        0 => Err(invalid(key, "must be greater than zero")),
        n => Ok(n),
    }
}

fn color(key: &str, value: &toml::Value) -> Result<Color, ConfigError> {
    parse_color(key, &string(key, value)?)
}

fn parse_color(key: &str, s: &str) -> Result<Color, ConfigError> {
    Color::from_str(s).map_err(|e| invalid(key, e.to_string()))
}

// =============================================================================
// Merging and loading
// =============================================================================

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load the `[og_image]` table from `<source>/config.toml`.
///
/// A missing file or a missing table yields an empty configuration (all
/// defaults). Returns `Err` if the file is not valid TOML or `og_image` is
/// not a table.
pub fn load_site_config(source: &Path) -> Result<Configuration, ConfigError> {
    let config_path = source.join("config.toml");
    if !config_path.exists() {
        return Ok(Configuration::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let mut site: toml::Table = toml::from_str(&content)?;
    match site.remove(CONFIG_KEY) {
        None => Ok(Configuration::default()),
        Some(toml::Value::Table(table)) => Ok(Configuration::new(table)),
        Some(other) => Err(invalid(
            CONFIG_KEY,
            format!("expected a table, got {}", other.type_str()),
        )),
    }
}

/// Returns a fully-commented stock `[og_image]` block with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Social preview card configuration
# ==================================
# Add this block to your site's config.toml. All settings are optional;
# the values shown are the defaults.
#
# Any document can override these in its front matter:
#
#   +++
#   title = "Hello"
#   [og_image]
#   enabled = false
#   +++

[og_image]
# Where cards are written, relative to the site source.
# Cards land at <output_dir>/<type>/<slug>.png
output_dir = "assets/images/og"

# Regenerate cards even when the file already exists.
force = false

# Print a line for every generated or skipped card.
verbose = false

# Drafts get no card.
skip_drafts = true

# Set to false (usually per document) to suppress the card.
enabled = true

# Content types to render. Unknown names are skipped with a warning.
collections = ["posts"]

# Avatar or logo drawn in the top-right corner (150x150, rounded).
# image = "assets/images/avatar.png"

# Footer text drawn in the bottom-right corner.
# domain = "example.com"

# ---------------------------------------------------------------------------
# Canvas
# ---------------------------------------------------------------------------
[og_image.canvas]
background_color = "#FFFFFF"
# Scaled to cover the whole canvas. A missing file is ignored.
# background_image = "assets/images/og-background.png"
width = 1200
height = 600

# ---------------------------------------------------------------------------
# Title text
# ---------------------------------------------------------------------------
[og_image.header]
font_family = "Helvetica, Bold"
color = "#2f313d"

# ---------------------------------------------------------------------------
# Date, tags, and domain text
# ---------------------------------------------------------------------------
[og_image.content]
font_family = "Helvetica, Regular"
color = "#535358"

# ---------------------------------------------------------------------------
# Bottom border (off unless this table is present)
# ---------------------------------------------------------------------------
# A single color or a list of colors drawn as equal bands.
# [og_image.border_bottom]
# width = 20
# fill = ["#211F1F", "#F4CBB2", "#AD5C51", "#9CDAF1", "#7DBBE6"]
"##
}
