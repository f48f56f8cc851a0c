//! # OG Card
//!
//! Social preview (Open Graph) image generator for static site content.
//! Every post, page, or collection document gets a 1200×600 PNG card with
//! its title, date, tags, an optional avatar, and the site's domain.
//!
//! # Architecture: Layered Compositing
//!
//! A card is a [`element::Canvas`] that layers are drawn onto, one after
//! another. Each layer renders itself into an RGBA image and is placed by a
//! gravity plus an offset:
//!
//! ```text
//! Canvas::new ──→ .border(..) ──→ .image(..) ──→ .text(..) ──→ .save(path)
//!     │               │               │               │
//!  solid fill     colored bands   rounded avatar   glyph mask
//!  + background                                    tinted with color
//! ```
//!
//! Text is the only layer that needs fonts; it goes through the
//! [`imaging::TextRasterizer`] trait so layout can be tested with a mock
//! that draws one block per character.
//!
//! # Configuration Cascade
//!
//! ```text
//! built-in defaults
//!   └── [og_image] in <site>/config.toml
//!         └── CLI flags (--force, --verbose)
//!               └── [og_image] in a document's front matter
//! ```
//!
//! Tables merge key by key, so a document can change one color without
//! restating the rest of its section. See [`config::Configuration`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Colors, gravity, geometry math, pixel operations, font rasterization |
//! | [`element`] | Canvas and the border, image, and text layers |
//! | [`config`] | `og_image` configuration: defaults, cascading merge, typed accessors |
//! | [`content`] | Site scanning: `+++` TOML front matter, drafts, collections, manifest |
//! | [`naming`] | `YYYY-MM-DD-slug` filename convention parser |
//! | [`generate`] | Per-document decisions, fixed card layout, metadata write-back |
//! | [`output`] | CLI output formatting |

pub mod config;
pub mod content;
pub mod element;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
