//! Content items and the site they come from.
//!
//! The generator never walks the filesystem itself. It asks a [`Site`] for
//! the items of each configured content type and writes image metadata back
//! onto them. [`ContentSite`] is the filesystem implementation used by the
//! CLI; embedders can implement [`Site`] over their own document store.
//!
//! ## Directory Structure
//!
//! ```text
//! site/                                    # Site source
//! ├── config.toml                          # [og_image] site defaults (optional)
//! ├── about.md                             # pages
//! ├── _posts/
//! │   └── 2024-03-15-advanced-markdown-tips.md   # posts (dated by filename)
//! ├── _drafts/
//! │   └── half-finished-idea.md            # posts, draft = true
//! └── _notes/
//!     └── rust-ownership.md                # notes (any other _<type>/ directory)
//! ```
//!
//! ## Front Matter
//!
//! TOML between `+++` fences at the top of the file:
//!
//! ```text
//! +++
//! title = "Advanced Markdown Tips"
//! date = 2024-03-15T09:30:00
//! tags = ["markdown", "writing"]
//! slug = "markdown-tips"         # default: file stem minus date prefix
//! draft = false
//!
//! [og_image]                     # per-document card overrides
//! domain = "tips.example.com"
//! +++
//! ```
//!
//! Files without front matter are still items; everything is derived from
//! the file name.

use crate::naming::parse_entry_name;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Directories with a leading underscore that never hold content items.
const RESERVED_DIRS: &[&str] = &[
    "_posts", "_drafts", "_site", "_layouts", "_includes", "_data", "_sass", "_plugins",
];

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid front matter in {path}: {reason}")]
    InvalidField { path: PathBuf, reason: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Social image attached to a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Path relative to the site source.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// One document of the site.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub content_type: String,
    pub source_path: PathBuf,
    pub title: String,
    pub date: Option<NaiveDateTime>,
    pub tags: Vec<String>,
    pub slug: String,
    pub draft: bool,
    /// The document's `og_image` front-matter table.
    pub overrides: toml::Table,
    /// Written back by the generator when absent.
    pub image: Option<ImageMetadata>,
}

impl ContentItem {
    /// A minimal item with no date, tags, or overrides.
    pub fn new(content_type: &str, slug: &str, title: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            source_path: PathBuf::new(),
            title: title.to_string(),
            date: None,
            tags: Vec::new(),
            slug: slug.to_string(),
            draft: false,
            overrides: toml::Table::new(),
            image: None,
        }
    }
}

/// The site collaborator: ordered items per content type.
pub trait Site {
    /// Site source directory. Output and asset paths are relative to it.
    fn source(&self) -> &Path;

    /// Items of one content type, `None` when the type is unknown.
    fn items_mut(&mut self, content_type: &str) -> Option<&mut Vec<ContentItem>>;
}

/// A document [`scan`] could not read. The rest of the scan is unaffected.
#[derive(Debug)]
pub struct ScanFailure {
    pub content_type: String,
    pub path: PathBuf,
    pub error: ContentError,
}

/// A site read from disk by [`scan`].
#[derive(Debug, Default)]
pub struct ContentSite {
    source: PathBuf,
    collections: BTreeMap<String, Vec<ContentItem>>,
    failures: Vec<ScanFailure>,
}

impl ContentSite {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            collections: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    /// Register (or replace) a content type with its items.
    pub fn insert(&mut self, content_type: &str, items: Vec<ContentItem>) {
        self.collections.insert(content_type.to_string(), items);
    }

    pub fn items(&self, content_type: &str) -> Option<&[ContentItem]> {
        self.collections.get(content_type).map(Vec::as_slice)
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Documents skipped because they could not be read.
    pub fn failures(&self) -> &[ScanFailure] {
        &self.failures
    }

    /// Every item, grouped by content type in name order.
    pub fn all_items(&self) -> impl Iterator<Item = &ContentItem> {
        self.collections.values().flatten()
    }
}

impl Site for ContentSite {
    fn source(&self) -> &Path {
        &self.source
    }

    fn items_mut(&mut self, content_type: &str) -> Option<&mut Vec<ContentItem>> {
        self.collections.get_mut(content_type)
    }
}

// =============================================================================
// Scanning
// =============================================================================

/// Read every content item under `root`.
///
/// `posts` and `pages` always exist (possibly empty); every other
/// `_<name>/` directory becomes the content type `<name>`.
///
/// A document that cannot be read (unreadable file, malformed front matter)
/// is recorded in [`ContentSite::failures`] and left out. Only errors
/// listing the site itself are returned as `Err`.
pub fn scan(root: &Path) -> Result<ContentSite, ContentError> {
    let mut site = ContentSite::new(root);
    let mut failures = Vec::new();

    let mut posts = collect_items(&root.join("_posts"), "posts", false, &mut failures)?;
    posts.extend(collect_items(&root.join("_drafts"), "posts", true, &mut failures)?);
    posts.sort_by(|a, b| a.source_path.cmp(&b.source_path));
    site.insert("posts", posts);

    site.insert("pages", collect_pages(root, &mut failures)?);

    for dir in collection_dirs(root)? {
        let Some(name) = dir
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix('_'))
        else {
            continue;
        };
        let items = collect_items(&dir, name, false, &mut failures)?;
        site.insert(name, items);
    }

    site.failures = failures;
    Ok(site)
}

fn collection_dirs(root: &Path) -> Result<Vec<PathBuf>, ContentError> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| {
                        n.len() > 1 && n.starts_with('_') && !RESERVED_DIRS.contains(&n)
                    })
        })
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
        .unwrap_or(false)
}

/// Read one document, or record why it could not be read.
fn read_or_record(
    path: &Path,
    content_type: &str,
    failures: &mut Vec<ScanFailure>,
) -> Option<ContentItem> {
    match read_item(path, content_type) {
        Ok(item) => Some(item),
        Err(error) => {
            failures.push(ScanFailure {
                content_type: content_type.to_string(),
                path: path.to_path_buf(),
                error,
            });
            None
        }
    }
}

/// Markdown files anywhere below `dir`. A missing directory has no items.
fn collect_items(
    dir: &Path,
    content_type: &str,
    draft: bool,
    failures: &mut Vec<ScanFailure>,
) -> Result<Vec<ContentItem>, ContentError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut items = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && is_markdown(entry.path())
            && let Some(mut item) = read_or_record(entry.path(), content_type, failures)
        {
            item.draft |= draft;
            items.push(item);
        }
    }
    Ok(items)
}

/// Markdown files directly inside the site root.
fn collect_pages(
    root: &Path,
    failures: &mut Vec<ScanFailure>,
) -> Result<Vec<ContentItem>, ContentError> {
    let mut md_files: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_markdown(p))
        .collect();
    md_files.sort();

    Ok(md_files
        .iter()
        .filter_map(|path| read_or_record(path, "pages", failures))
        .collect())
}

// =============================================================================
// Front matter
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    date: Option<toml::Value>,
    tags: Option<toml::Value>,
    slug: Option<String>,
    draft: Option<bool>,
    og_image: Option<toml::Table>,
    image: Option<toml::Value>,
}

/// Split `+++`-fenced TOML front matter from the body.
fn detect_front_matter(content: &str) -> Option<(&str, &str)> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("+++")
        && let Some(end) = trimmed[3..].find("\n+++")
    {
        let fm = trimmed[3..3 + end].trim();
        let body = trimmed[3 + end + 4..].trim_start_matches(['\r', '\n']);
        return Some((fm, body));
    }
    None
}

/// Build one item from a markdown file.
pub fn read_item(path: &Path, content_type: &str) -> Result<ContentItem, ContentError> {
    let content = fs::read_to_string(path)?;
    let front: FrontMatter = match detect_front_matter(&content) {
        Some((fm, _)) => toml::from_str(fm).map_err(|source| ContentError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?,
        None => FrontMatter::default(),
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = parse_entry_name(&stem);
    let invalid = |reason: String| ContentError::InvalidField {
        path: path.to_path_buf(),
        reason,
    };

    let date = match &front.date {
        Some(value) => Some(parse_date(value).map_err(invalid)?),
        None => parsed.date.and_then(|d| d.and_hms_opt(0, 0, 0)),
    };

    let tags = match &front.tags {
        None => Vec::new(),
        Some(toml::Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        Some(toml::Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                toml::Value::String(s) => Ok(s.clone()),
                other => Err(invalid(format!("tag must be a string, got {other}"))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => return Err(invalid(format!("tags must be a list, got {other}"))),
    };

    let slug = match front.slug {
        Some(slug) => slug,
        None if parsed.slug.is_empty() => stem.clone(),
        None => parsed.slug.clone(),
    };

    let title = front.title.unwrap_or_else(|| match parsed.display_title.as_str() {
        "" => stem.clone(),
        t => t.to_string(),
    });

    let image = match front.image {
        None => None,
        Some(toml::Value::String(path)) => Some(ImageMetadata {
            path,
            width: None,
            height: None,
            alt: None,
        }),
        Some(value @ toml::Value::Table(_)) => Some(
            value
                .try_into()
                .map_err(|e: toml::de::Error| invalid(format!("image: {e}")))?,
        ),
        Some(other) => return Err(invalid(format!("image must be a path or table, got {other}"))),
    };

    Ok(ContentItem {
        content_type: content_type.to_string(),
        source_path: path.to_path_buf(),
        title,
        date,
        tags,
        slug,
        draft: front.draft.unwrap_or(false),
        overrides: front.og_image.unwrap_or_default(),
        image,
    })
}

/// Accepts TOML dates/datetimes and strings like `2024-03-15 09:30:00`.
fn parse_date(value: &toml::Value) -> Result<NaiveDateTime, String> {
    let text = match value {
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::String(s) => s.trim().to_string(),
        other => return Err(format!("date must be a date or string, got {other}")),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Ok(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("unrecognized date {text:?}"))
}

// =============================================================================
// Manifest
// =============================================================================

#[derive(Debug, Serialize)]
struct ManifestEntry<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    slug: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a ImageMetadata>,
}

/// Write every item's type, slug, and image metadata as pretty JSON.
pub fn write_manifest(site: &ContentSite, path: &Path) -> Result<(), ContentError> {
    let entries: Vec<ManifestEntry<'_>> = site
        .all_items()
        .map(|item| ManifestEntry {
            content_type: &item.content_type,
            slug: &item.slug,
            title: &item.title,
            image: item.image.as_ref(),
        })
        .collect();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&entries)?)?;
    Ok(())
}
