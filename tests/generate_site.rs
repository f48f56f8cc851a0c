//! End-to-end: scan a site on disk, generate cards, write the manifest.

use image::GrayImage;
use og_card::config::{self, Configuration};
use og_card::content::{self, ContentSite, Site};
use og_card::generate::{GenerateEvent, GenerateReport, Generator, SkipReason};
use og_card::imaging::{BackendError, FontRasterizer, TextRasterizer, TextRequest};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Draws every request as a single 10×10 block; fonts are irrelevant here.
struct BlockRasterizer;

impl TextRasterizer for BlockRasterizer {
    fn supports_word_wrap(&self) -> bool {
        false
    }

    fn rasterize(&self, _request: &TextRequest) -> Result<GrayImage, BackendError> {
        Ok(GrayImage::from_pixel(10, 10, image::Luma([255])))
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "config.toml",
        r##"
title = "My Blog"

[og_image]
domain = "example.com"
collections = ["posts", "notes"]

[og_image.border_bottom]
width = 10
fill = ["#820C02", "#A1391E"]
"##,
    );
    write(
        tmp.path(),
        "_posts/2024-03-15-advanced-markdown-tips.md",
        "+++\ntitle = \"Advanced Markdown Tips\"\ntags = [\"markdown\", \"writing\"]\n+++\nBody.\n",
    );
    write(
        tmp.path(),
        "_posts/2024-04-01-quiet-post.md",
        "+++\n[og_image]\nenabled = false\n+++\n",
    );
    write(tmp.path(), "_drafts/half-finished.md", "Nothing yet.\n");
    write(tmp.path(), "_notes/rust-ownership.md", "");
    tmp
}

fn run(source: &Path) -> (GenerateReport, Vec<GenerateEvent>, ContentSite) {
    let base = config::load_site_config(source).unwrap();
    let mut site = content::scan(source).unwrap();
    let (tx, rx) = std::sync::mpsc::channel();
    let report = Generator::new(base, &BlockRasterizer)
        .with_events(tx)
        .generate(&mut site)
        .unwrap();
    (report, rx.into_iter().collect(), site)
}

#[test]
fn generates_cards_for_configured_types() {
    let tmp = sample_site();
    let (report, events, site) = run(tmp.path());

    assert!(report.is_success());
    assert_eq!(report.generated.len(), 2);
    // Draft and disabled post
    assert_eq!(report.skipped, 2);

    let card = tmp
        .path()
        .join("assets/images/og/posts/advanced-markdown-tips.png");
    let img = image::open(&card).unwrap();
    assert_eq!((img.width(), img.height()), (1200, 600));
    assert!(
        tmp.path()
            .join("assets/images/og/notes/rust-ownership.png")
            .exists()
    );
    assert!(
        !tmp.path()
            .join("assets/images/og/posts/quiet-post.png")
            .exists()
    );

    let posts = site.items("posts").unwrap();
    let tips = posts
        .iter()
        .find(|p| p.slug == "advanced-markdown-tips")
        .unwrap();
    let meta = tips.image.as_ref().unwrap();
    assert_eq!(meta.path, "assets/images/og/posts/advanced-markdown-tips.png");
    assert_eq!(meta.alt.as_deref(), Some("Advanced Markdown Tips"));

    assert!(events.iter().any(|e| matches!(
        e,
        GenerateEvent::Skipped {
            reason: SkipReason::Draft,
            ..
        }
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        GenerateEvent::Skipped {
            reason: SkipReason::Disabled,
            ..
        }
    )));
}

#[test]
fn second_run_skips_existing_cards_but_records_them() {
    let tmp = sample_site();
    run(tmp.path());
    let (report, _, mut site) = run(tmp.path());

    assert!(report.generated.is_empty());
    assert_eq!(report.skipped, 4);
    let notes = site.items_mut("notes").unwrap();
    assert_eq!(
        notes[0].image.as_ref().unwrap().path,
        "assets/images/og/notes/rust-ownership.png"
    );
}

#[test]
fn force_from_cli_layer_rerenders() {
    let tmp = sample_site();
    run(tmp.path());

    let forced = config::load_site_config(tmp.path())
        .unwrap()
        .merge(&Configuration::parse("force = true").unwrap());
    let mut site = content::scan(tmp.path()).unwrap();
    let report = Generator::new(forced, &BlockRasterizer)
        .generate(&mut site)
        .unwrap();
    assert_eq!(report.generated.len(), 2);
}

#[test]
fn manifest_lists_items_with_images() {
    let tmp = sample_site();
    let (_, _, site) = run(tmp.path());

    let path = tmp.path().join("assets/images/og/manifest.json");
    content::write_manifest(&site, &path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let entries = json.as_array().unwrap();

    let note = entries
        .iter()
        .find(|e| e["slug"] == "rust-ownership")
        .unwrap();
    assert_eq!(note["type"], "notes");
    assert_eq!(note["image"]["width"], 1200);

    let draft = entries
        .iter()
        .find(|e| e["slug"] == "half-finished")
        .unwrap();
    assert!(draft.get("image").is_none());
}

#[test]
fn unreadable_document_does_not_stop_the_run() {
    let tmp = sample_site();
    write(
        tmp.path(),
        "_posts/2024-01-02-bad.md",
        "+++\nog_image = true\n+++\n",
    );
    let (report, _, site) = run(tmp.path());

    assert_eq!(site.failures().len(), 1);
    assert!(site.failures()[0].path.ends_with("_posts/2024-01-02-bad.md"));
    assert!(report.is_success());
    assert_eq!(report.generated.len(), 2);
    assert!(
        tmp.path()
            .join("assets/images/og/posts/advanced-markdown-tips.png")
            .exists()
    );
}

#[test]
fn invalid_site_config_is_fatal() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "config.toml", "[og_image]\nunknown_key = 1\n");
    let base = config::load_site_config(tmp.path()).unwrap();
    let mut site = content::scan(tmp.path()).unwrap();
    assert!(Generator::new(base, &BlockRasterizer).generate(&mut site).is_err());
}

#[test]
#[ignore] // Requires system fonts
fn renders_with_system_fonts() {
    let tmp = sample_site();
    let rasterizer = FontRasterizer::new();
    assert!(rasterizer.face_count() > 0);

    let base = config::load_site_config(tmp.path()).unwrap();
    let mut site = content::scan(tmp.path()).unwrap();
    let report = Generator::new(base, &rasterizer)
        .generate(&mut site)
        .unwrap();
    assert!(report.is_success(), "{:?}", report.failures);
    assert_eq!(report.generated.len(), 2);
}
