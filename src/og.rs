//! Open Graph image generation.
//!
//! Turns every eligible post into a `<og_dir>/<slug>.png` card:
//!
//! ```text
//! posts/*.md ──► Post ──► CardText ──► LayoutNode ──► SVG ──► PNG ──► og/<slug>.png
//! ```
//!
//! ## Failure Policy
//!
//! A bad post never stops the batch. Read errors, malformed front-matter,
//! layout violations, rasterization and write errors are recorded against the
//! file in [`OgReport::failed`] and logged; the remaining posts still render.
//! Only conditions that make the whole run meaningless are fatal ([`OgError`]):
//! the posts directory is missing, the output directory cannot be created,
//! or there is nothing to render. A run where every post failed still
//! returns its report, with an empty `generated` list.
//!
//! ## Progress Events
//!
//! [`generate`] optionally reports progress as [`OgEvent`]s over an `mpsc`
//! channel so the CLI can print as cards are produced. Passing `None` keeps
//! the pipeline silent (tests, library use).
//!
//! Output files are overwritten on every run; running twice produces the same
//! set of files.

use crate::card::{self, CardRenderError, CardText, Rasterizer};
use crate::config::SiteConfig;
use crate::post::{self, Post, PostError};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Fatal errors that abort a run.
#[derive(Error, Debug)]
pub enum OgError {
    #[error("Posts directory not found: {0}")]
    SourceMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No eligible posts in {0}")]
    NoPosts(PathBuf),
}

/// Why a single card could not be produced.
#[derive(Error, Debug)]
pub enum CardError {
    #[error(transparent)]
    Post(#[from] PostError),
    #[error(transparent)]
    Render(#[from] CardRenderError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Progress events emitted while generating cards.
#[derive(Debug)]
pub enum OgEvent {
    DraftSkipped { file: String },
    Generated {
        /// 1-based position among generated cards.
        index: usize,
        slug: String,
        title: String,
        output: PathBuf,
    },
    Failed { file: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCard {
    pub slug: String,
    pub title: String,
    pub source: String,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct CardFailure {
    pub file: String,
    pub error: CardError,
}

/// Outcome of a run that was not fatal.
#[derive(Debug, Default)]
pub struct OgReport {
    pub generated: Vec<GeneratedCard>,
    /// File names skipped as drafts.
    pub skipped: Vec<String>,
    pub failed: Vec<CardFailure>,
}

/// File name of the card for `slug`. Page metadata links to the same name.
pub fn image_file_name(slug: &str) -> String {
    format!("{slug}.png")
}

/// Generate cards for every eligible post under `root`.
pub fn generate(
    config: &SiteConfig,
    root: &Path,
    rasterizer: &impl Rasterizer,
    events: Option<Sender<OgEvent>>,
) -> Result<OgReport, OgError> {
    let posts_dir = root.join(&config.paths.posts_dir);
    if !posts_dir.is_dir() {
        return Err(OgError::SourceMissing(posts_dir));
    }
    let listing = post::list_posts(&posts_dir, &config.paths.draft_marker)?;

    let out_dir = root.join(&config.paths.og_dir);
    std::fs::create_dir_all(&out_dir).map_err(|source| OgError::OutputDir {
        path: out_dir.clone(),
        source,
    })?;

    let emit = |event: OgEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };

    let skipped: Vec<String> = listing.drafts.iter().map(|p| post::file_name(p)).collect();
    for file in &skipped {
        tracing::debug!(%file, "skipping draft");
        emit(OgEvent::DraftSkipped { file: file.clone() });
    }

    if listing.posts.is_empty() {
        return Err(OgError::NoPosts(posts_dir));
    }

    let report = listing.posts.iter().fold(
        OgReport {
            skipped,
            ..OgReport::default()
        },
        |mut report, path| {
            let file = post::file_name(path);
            match render_post(path, &out_dir, config, rasterizer) {
                Ok(card) => {
                    tracing::debug!(%file, slug = %card.slug, "card written");
                    emit(OgEvent::Generated {
                        index: report.generated.len() + 1,
                        slug: card.slug.clone(),
                        title: card.title.clone(),
                        output: card.output.clone(),
                    });
                    report.generated.push(card);
                }
                Err(error) => {
                    tracing::error!(%file, %error, "failed to generate card");
                    emit(OgEvent::Failed {
                        file: file.clone(),
                        error: error.to_string(),
                    });
                    report.failed.push(CardFailure { file, error });
                }
            }
            report
        },
    );

    if report.generated.is_empty() {
        tracing::warn!(failed = report.failed.len(), "no card could be generated");
    }
    Ok(report)
}

fn render_post(
    path: &Path,
    out_dir: &Path,
    config: &SiteConfig,
    rasterizer: &impl Rasterizer,
) -> Result<GeneratedCard, CardError> {
    let post = Post::load(path)?;
    let text = CardText::for_post(&config.site.name, &post);
    let png = card::render_card(&text, &config.card, rasterizer)?;

    let output = out_dir.join(image_file_name(&post.slug));
    std::fs::write(&output, png).map_err(|source| CardError::Write {
        path: output.clone(),
        source,
    })?;

    Ok(GeneratedCard {
        slug: post.slug,
        title: post.title,
        source: post.source,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::raster::tests::MockRasterizer;
    use crate::test_helpers::*;
    use std::fs;

    #[test]
    fn generates_cards_and_collects_failures() {
        let tmp = setup_fixtures();
        let config = test_config();
        let raster = MockRasterizer::new();

        let report = generate(&config, tmp.path(), &raster, None).unwrap();

        let slugs: Vec<_> = report.generated.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["Hello-World", "rust-notes"]);
        assert_eq!(report.skipped, vec!["wip-draft.md"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].file, "broken-header.md");
        assert!(matches!(
            report.failed[0].error,
            CardError::Post(PostError::FrontMatter(_))
        ));

        let og = tmp.path().join("og");
        assert_eq!(fs::read(og.join("Hello-World.png")).unwrap(), b"PNG");
        assert!(og.join("rust-notes.png").exists());
        assert!(!og.join("wip-draft.png").exists());
    }

    #[test]
    fn card_svg_carries_site_title_and_excerpt() {
        let tmp = setup_fixtures();
        let raster = MockRasterizer::new();
        generate(&test_config(), tmp.path(), &raster, None).unwrap();

        let rendered = raster.get_rendered();
        assert_eq!(rendered.len(), 2);
        let (svg, width, height) = &rendered[0];
        assert_eq!((*width, *height), (1200, 630));
        assert!(svg.contains("ebadf.me"));
        assert!(svg.contains("Hello, World"));
        assert!(svg.contains("First post on the new site"));
    }

    #[test]
    fn events_report_progress() {
        let tmp = setup_fixtures();
        let (tx, rx) = std::sync::mpsc::channel();
        generate(&test_config(), tmp.path(), &MockRasterizer::new(), Some(tx)).unwrap();

        let events: Vec<OgEvent> = rx.iter().collect();
        assert!(matches!(&events[0], OgEvent::DraftSkipped { file } if file == "wip-draft.md"));
        assert!(matches!(&events[1], OgEvent::Failed { file, .. } if file == "broken-header.md"));
        assert!(matches!(&events[2], OgEvent::Generated { index: 1, slug, .. } if slug == "Hello-World"));
        assert!(matches!(&events[3], OgEvent::Generated { index: 2, .. }));
    }

    #[test]
    fn rerun_overwrites_same_files() {
        let tmp = setup_fixtures();
        let config = test_config();
        generate(&config, tmp.path(), &MockRasterizer::new(), None).unwrap();
        generate(&config, tmp.path(), &MockRasterizer::new(), None).unwrap();
        let mut names: Vec<_> = fs::read_dir(tmp.path().join("og"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["Hello-World.png", "rust-notes.png"]);
    }

    #[test]
    fn missing_posts_dir_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = generate(&test_config(), tmp.path(), &MockRasterizer::new(), None).unwrap_err();
        assert!(matches!(err, OgError::SourceMissing(_)));
    }

    #[test]
    fn only_drafts_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let posts = tmp.path().join("posts");
        fs::create_dir(&posts).unwrap();
        fs::write(posts.join("draft-one.md"), "---\ntitle: x\n---\n").unwrap();
        let err = generate(&test_config(), tmp.path(), &MockRasterizer::new(), None).unwrap_err();
        assert!(matches!(err, OgError::NoPosts(_)));
    }

    #[test]
    fn every_post_failing_still_reports() {
        let tmp = setup_fixtures();
        let raster = MockRasterizer::failing_on("<svg");
        let report = generate(&test_config(), tmp.path(), &raster, None).unwrap();
        assert!(report.generated.is_empty());
        assert_eq!(report.failed.len(), 3);
        assert_eq!(report.skipped, vec!["wip-draft.md"]);
    }

    #[test]
    fn uncreatable_output_dir_is_fatal() {
        let tmp = setup_fixtures();
        fs::write(tmp.path().join("og"), "not a directory").unwrap();
        let err = generate(&test_config(), tmp.path(), &MockRasterizer::new(), None).unwrap_err();
        assert!(matches!(err, OgError::OutputDir { .. }));
    }

    #[test]
    fn image_file_name_keeps_slug_case() {
        assert_eq!(image_file_name("Hello-World"), "Hello-World.png");
    }
}
