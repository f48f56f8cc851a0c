//! Card generation.
//!
//! Walks the configured content types of a [`Site`], decides per document
//! whether a card is needed, renders it with a fixed layout, and writes the
//! resulting image metadata back onto the document.
//!
//! ## Per-Document Flow
//!
//! ```text
//! draft && skip_drafts ───────────────→ Skipped(Draft)
//! merge site config + front-matter og_image
//! enabled == false ───────────────────→ Skipped(Disabled)
//! card exists && !force ──────────────→ Skipped(Exists)   (metadata still written back)
//! canvas → border → avatar → title → date → tags → domain
//! save PNG ───────────────────────────→ Generated          (metadata written back)
//! ```
//!
//! `skip_drafts` comes from the site configuration since a draft's own
//! overrides are never consulted. Every later decision uses the merged
//! per-document configuration.
//!
//! ## Layout
//!
//! The layout is fixed; only fonts, colors, canvas size, the avatar, the
//! domain, and the border are configurable.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  (80,100)                            ┌─────┐ │
//! │  Title, wrapped at 1040px            │avatr│ │  avatar: ne (80,100), 150×150, r=50
//! │  (870px when an avatar is present)   └─────┘ │
//! │                                              │
//! │  March 15, 2024                  example.com │  margin_bottom + 50 when tags exist
//! │  #markdown #writing                          │  margin_bottom
//! ├──────────────────────────────────────────────┤
//! │▓▓▓▓▓▓▓▓▓▓▓▓▓▓ border_bottom ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓│  margin_bottom = 80 + border width
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Isolation
//!
//! A document that fails (bad override, missing avatar, unreadable image)
//! is reported as a [`Failure`] and the run moves on. Re-running with
//! `force = false` retries only the documents without a card.

use crate::config::{ConfigError, Configuration, OgImageConfig};
use crate::content::{ContentItem, ImageMetadata, Site};
use crate::element::{
    BorderOptions, Canvas, CanvasOptions, ElementError, Fill, ImageOptions, Offset, TextOptions,
};
use crate::imaging::{Dimensions, Gravity, Position, TextRasterizer};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Distance of every text block and the avatar from the left/right edge.
const MARGIN_X: i64 = 80;
/// Distance of the title and avatar from the top edge.
const MARGIN_TOP: i64 = 100;
const HEADER_WIDTH: u32 = 1040;
const HEADER_WIDTH_WITH_IMAGE: u32 = 870;
const HEADER_DPI: u32 = 400;
const CONTENT_DPI: u32 = 150;
const AVATAR_SIZE: u32 = 150;
const AVATAR_RADIUS: u32 = 50;
/// Extra lift for the date/domain line when a tags line sits below it.
const LINE_SPACING: u32 = 50;
const DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Rendering failed: {0}")]
    Element(#[from] ElementError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image file not found: {0}")]
    MissingAsset(PathBuf),
}

/// Why a document got no new card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Draft,
    Disabled,
    Exists,
}

/// Progress events, sent as they happen when a channel is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateEvent {
    TypeStarted {
        content_type: String,
        count: usize,
    },
    UnknownContentType {
        content_type: String,
    },
    Generated {
        content_type: String,
        title: String,
        /// Card path relative to the site source.
        path: String,
    },
    Skipped {
        content_type: String,
        title: String,
        reason: SkipReason,
        path: Option<String>,
        /// `verbose` as configured for this document.
        verbose: bool,
    },
    Failed {
        content_type: String,
        title: String,
        error: String,
    },
}

/// A document whose card could not be produced.
#[derive(Debug)]
pub struct Failure {
    pub content_type: String,
    pub slug: String,
    pub source_path: PathBuf,
    pub error: GenerateError,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Absolute paths of the cards written in this run.
    pub generated: Vec<PathBuf>,
    pub skipped: usize,
    pub unknown_types: Vec<String>,
    pub failures: Vec<Failure>,
}

impl GenerateReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

enum Outcome {
    Generated(PathBuf),
    Skipped(SkipReason),
}

/// Where a document's card lives.
struct CardPath {
    absolute: PathBuf,
    /// Relative to the site source, `/`-separated.
    relative: String,
}

fn card_path(source: &Path, config: &OgImageConfig, item: &ContentItem) -> CardPath {
    let relative = format!(
        "{}/{}/{}.png",
        config.output_dir.trim_end_matches('/'),
        item.content_type,
        item.slug
    );
    CardPath {
        absolute: source.join(&relative),
        relative,
    }
}

/// Renders cards for every document of the configured content types.
pub struct Generator<'a> {
    base: Configuration,
    rasterizer: &'a dyn TextRasterizer,
    events: Option<Sender<GenerateEvent>>,
}

impl<'a> Generator<'a> {
    pub fn new(base: Configuration, rasterizer: &'a dyn TextRasterizer) -> Self {
        Self {
            base,
            rasterizer,
            events: None,
        }
    }

    /// Stream [`GenerateEvent`]s to `tx` while generating.
    pub fn with_events(mut self, tx: Sender<GenerateEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    fn emit(&self, event: GenerateEvent) {
        if let Some(tx) = &self.events {
            // Receiver gone means nobody is listening; generation continues
            tx.send(event).ok();
        }
    }

    /// Run over the whole site.
    ///
    /// Returns `Err` only when the site configuration itself is invalid;
    /// per-document problems end up in [`GenerateReport::failures`].
    pub fn generate(&self, site: &mut dyn Site) -> Result<GenerateReport, GenerateError> {
        let site_config = self.base.resolve()?;
        let source = site.source().to_path_buf();
        let mut report = GenerateReport::default();

        for content_type in &site_config.collections {
            let Some(items) = site.items_mut(content_type) else {
                self.emit(GenerateEvent::UnknownContentType {
                    content_type: content_type.clone(),
                });
                report.unknown_types.push(content_type.clone());
                continue;
            };
            self.emit(GenerateEvent::TypeStarted {
                content_type: content_type.clone(),
                count: items.len(),
            });

            for item in items.iter_mut() {
                match self.generate_item(&source, &site_config, item) {
                    Ok(Outcome::Generated(path)) => report.generated.push(path),
                    Ok(Outcome::Skipped(_)) => report.skipped += 1,
                    Err(error) => {
                        self.emit(GenerateEvent::Failed {
                            content_type: item.content_type.clone(),
                            title: item.title.clone(),
                            error: error.to_string(),
                        });
                        report.failures.push(Failure {
                            content_type: item.content_type.clone(),
                            slug: item.slug.clone(),
                            source_path: item.source_path.clone(),
                            error,
                        });
                    }
                }
            }
        }

        Ok(report)
    }

    fn skipped(
        &self,
        item: &ContentItem,
        verbose: bool,
        reason: SkipReason,
        path: Option<String>,
    ) -> Outcome {
        self.emit(GenerateEvent::Skipped {
            content_type: item.content_type.clone(),
            title: item.title.clone(),
            verbose,
            reason,
            path,
        });
        Outcome::Skipped(reason)
    }

    fn generate_item(
        &self,
        source: &Path,
        site_config: &OgImageConfig,
        item: &mut ContentItem,
    ) -> Result<Outcome, GenerateError> {
        if item.draft && site_config.skip_drafts {
            return Ok(self.skipped(item, site_config.verbose, SkipReason::Draft, None));
        }

        let config = self.base.merge_table(&item.overrides).resolve()?;
        if !item.overrides.is_empty() {
            log::debug!(
                "{}: merged front-matter overrides {:?}",
                item.source_path.display(),
                item.overrides
            );
        }
        if !config.enabled {
            return Ok(self.skipped(item, config.verbose, SkipReason::Disabled, None));
        }

        let path = card_path(source, &config, item);
        if path.absolute.exists() && !config.force {
            write_back(item, &config, &path);
            return Ok(self.skipped(
                item,
                config.verbose,
                SkipReason::Exists,
                Some(path.relative),
            ));
        }

        let avatar = match &config.image {
            Some(rel) => Some(read_asset(source, rel)?),
            None => None,
        };
        let background = match &config.canvas.background_image {
            Some(rel) => match read_asset(source, rel) {
                Ok(bytes) => Some(bytes),
                Err(GenerateError::MissingAsset(missing)) => {
                    log::warn!(
                        "Background image {} not found, using background color",
                        missing.display()
                    );
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let canvas = render_card(
            &config,
            item,
            avatar.as_deref(),
            background.as_deref(),
            self.rasterizer,
        )?;
        canvas.save(&path.absolute)?;

        write_back(item, &config, &path);
        self.emit(GenerateEvent::Generated {
            content_type: item.content_type.clone(),
            title: item.title.clone(),
            path: path.relative,
        });
        Ok(Outcome::Generated(path.absolute))
    }
}

/// Attach the card to the item unless it already has an image.
fn write_back(item: &mut ContentItem, config: &OgImageConfig, path: &CardPath) {
    if item.image.is_none() {
        item.image = Some(ImageMetadata {
            path: path.relative.clone(),
            width: Some(config.canvas.width),
            height: Some(config.canvas.height),
            alt: Some(item.title.clone()),
        });
    }
}

fn read_asset(source: &Path, rel: &str) -> Result<Vec<u8>, GenerateError> {
    let path = source.join(rel.trim_start_matches('/'));
    if !path.is_file() {
        return Err(GenerateError::MissingAsset(path));
    }
    Ok(fs::read(&path)?)
}

/// Compose one card. Layers are drawn in order, later ones on top.
pub fn render_card<'r>(
    config: &OgImageConfig,
    item: &ContentItem,
    avatar: Option<&[u8]>,
    background: Option<&[u8]>,
    rasterizer: &'r dyn TextRasterizer,
) -> Result<Canvas<'r>, ElementError> {
    let margin_bottom = config.margin_bottom() as i64;
    let has_tags = !item.tags.is_empty();
    let footer_y = if has_tags {
        margin_bottom + LINE_SPACING as i64
    } else {
        margin_bottom
    };

    let top_left = |_: Dimensions, _: Dimensions| Offset::new(MARGIN_X, MARGIN_TOP);
    let footer = |_: Dimensions, _: Dimensions| Offset::new(MARGIN_X, footer_y);
    let bottom = |_: Dimensions, _: Dimensions| Offset::new(MARGIN_X, margin_bottom);

    let mut canvas = Canvas::new(
        config.canvas.width,
        config.canvas.height,
        &CanvasOptions {
            background_color: config.canvas.background_color,
            background_image: background,
        },
        rasterizer,
    )?;

    if let Some(border) = &config.border_bottom {
        canvas = canvas.border(
            border.width,
            BorderOptions {
                position: Position::Bottom,
                fill: Fill::from_colors(border.fill.clone()),
            },
            None,
        )?;
    }

    if let Some(bytes) = avatar {
        canvas = canvas.image(
            bytes,
            ImageOptions {
                gravity: Gravity::Ne,
                width: Some(AVATAR_SIZE),
                height: Some(AVATAR_SIZE),
                radius: Some(AVATAR_RADIUS),
            },
            Some(&top_left),
        )?;
    }

    canvas = canvas.text(
        &item.title,
        TextOptions {
            gravity: Gravity::Nw,
            width: Some(if avatar.is_some() {
                HEADER_WIDTH_WITH_IMAGE
            } else {
                HEADER_WIDTH
            }),
            dpi: Some(HEADER_DPI),
            color: config.header.color,
            font: Some(config.header.font_family.clone()),
        },
        Some(&top_left),
    )?;

    let content_text = |gravity: Gravity| TextOptions {
        gravity,
        width: None,
        dpi: Some(CONTENT_DPI),
        color: config.content.color,
        font: Some(config.content.font_family.clone()),
    };

    if let Some(date) = item.date {
        let line = date.format(DATE_FORMAT).to_string();
        canvas = canvas.text(&line, content_text(Gravity::Sw), Some(&footer))?;
    }

    if has_tags {
        let line = format_tags(&item.tags);
        canvas = canvas.text(&line, content_text(Gravity::Sw), Some(&bottom))?;
    }

    if let Some(domain) = &config.domain {
        canvas = canvas.text(domain, content_text(Gravity::Se), Some(&footer))?;
    }

    Ok(canvas)
}

/// `["rust", "cli"]` → `"#rust #cli"`.
pub fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}
