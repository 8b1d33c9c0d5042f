//! End-to-end card generation with the real rasterizer.
//!
//! No fonts are supplied, so `resvg` falls back to system fonts (or draws no
//! glyphs at all). Either way the PNGs must exist with the configured size.

use folio::card::{FontSet, ResvgRasterizer};
use folio::config::SiteConfig;
use folio::og::{self, OgError, OgEvent};
use std::path::Path;
use tempfile::TempDir;

fn setup() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/posts");
    let dst = tmp.path().join("posts");
    std::fs::create_dir_all(&dst).unwrap();
    for entry in std::fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), dst.join(entry.file_name())).unwrap();
    }
    tmp
}

fn config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.paths.posts_dir = "posts".into();
    config.paths.og_dir = "og".into();
    config.fonts.stylesheet = None;
    config
}

#[test]
fn writes_one_png_per_eligible_post() {
    let tmp = setup();
    let config = config();
    let rasterizer = ResvgRasterizer::new(&FontSet::default(), &config.card.font_family);

    let report = og::generate(&config, tmp.path(), &rasterizer, None).unwrap();

    let mut slugs: Vec<_> = report.generated.iter().map(|c| c.slug.as_str()).collect();
    slugs.sort();
    assert_eq!(slugs, vec!["Hello-World", "rust-notes"]);
    assert_eq!(report.skipped, vec!["wip-draft.md"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].file, "broken-header.md");

    for card in &report.generated {
        let (w, h) = image::image_dimensions(&card.output).unwrap();
        assert_eq!((w, h), (1200, 630), "{}", card.output.display());
    }
    assert!(!tmp.path().join("og/wip-draft.png").exists());
}

#[test]
fn custom_canvas_size_is_respected() {
    let tmp = setup();
    let mut config = config();
    config.card.width = 600;
    config.card.height = 315;
    let rasterizer = ResvgRasterizer::new(&FontSet::default(), &config.card.font_family);

    let report = og::generate(&config, tmp.path(), &rasterizer, None).unwrap();
    let (w, h) = image::image_dimensions(&report.generated[0].output).unwrap();
    assert_eq!((w, h), (600, 315));
}

#[test]
fn rerun_overwrites_same_files() {
    let tmp = setup();
    let config = config();
    let rasterizer = ResvgRasterizer::new(&FontSet::default(), &config.card.font_family);

    og::generate(&config, tmp.path(), &rasterizer, None).unwrap();
    let first = std::fs::read(tmp.path().join("og/Hello-World.png")).unwrap();
    og::generate(&config, tmp.path(), &rasterizer, None).unwrap();
    let second = std::fs::read(tmp.path().join("og/Hello-World.png")).unwrap();

    assert_eq!(first, second);
    assert_eq!(std::fs::read_dir(tmp.path().join("og")).unwrap().count(), 2);
}

#[test]
fn events_arrive_over_the_channel() {
    let tmp = setup();
    let config = config();
    let rasterizer = ResvgRasterizer::new(&FontSet::default(), &config.card.font_family);

    let (tx, rx) = std::sync::mpsc::channel();
    og::generate(&config, tmp.path(), &rasterizer, Some(tx)).unwrap();
    let events: Vec<OgEvent> = rx.into_iter().collect();

    let generated = events
        .iter()
        .filter(|e| matches!(e, OgEvent::Generated { .. }))
        .count();
    let failed = events
        .iter()
        .filter(|e| matches!(e, OgEvent::Failed { .. }))
        .count();
    assert_eq!((generated, failed), (2, 1));
}

#[test]
fn missing_posts_directory_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let config = config();
    let rasterizer = ResvgRasterizer::new(&FontSet::default(), &config.card.font_family);

    let err = og::generate(&config, tmp.path(), &rasterizer, None).unwrap_err();
    assert!(matches!(err, OgError::SourceMissing(_)));
}
