//! Post page generation.
//!
//! Writes one standalone HTML document per eligible post plus a JSON index:
//!
//! ```text
//! <pages_dir>/
//! └── blog/
//!     ├── index.json              # summaries, newest first
//!     ├── hello-world/index.html
//!     └── rust-notes/index.html
//! ```
//!
//! Posts are listed and parsed exactly as the `og` pipeline does, so a page
//! lives at `/blog/<slug>` and its `og:image` at `/og/<slug>.png` for the same
//! slug. The failure policy is the same too: a bad post is recorded in
//! [`PagesReport::failed`] and the batch continues.

use crate::config::SiteConfig;
use crate::markdown::Renderer;
use crate::meta::PageMeta;
use crate::post::{self, Post, PostError};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CSS: &str = include_str!("../static/post.css");

/// Fatal errors that abort page generation.
#[derive(Error, Debug)]
pub enum PagesError {
    #[error("Posts directory not found: {0}")]
    SourceMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No eligible posts in {0}")]
    NoPosts(PathBuf),
}

#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Post(#[from] PostError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPage {
    pub slug: String,
    pub title: String,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct PageFailure {
    pub file: String,
    pub error: PageError,
}

#[derive(Debug, Default)]
pub struct PagesReport {
    pub written: Vec<WrittenPage>,
    pub skipped: Vec<String>,
    pub failed: Vec<PageFailure>,
    /// Path of the written `index.json`.
    pub index: PathBuf,
}

/// One entry of `blog/index.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub reading_minutes: u32,
    pub url: String,
    pub image: Option<String>,
}

impl PostSummary {
    pub fn new(post: &Post, config: &SiteConfig) -> Self {
        let meta = PageMeta::for_post(post, config);
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            date: post.date.clone(),
            tags: post.tags.clone(),
            reading_minutes: post.reading_minutes(),
            url: meta.url,
            image: meta.image,
        }
    }
}

/// Render a complete post page.
pub fn render_post_page(post: &Post, config: &SiteConfig, renderer: &Renderer) -> Markup {
    let meta = PageMeta::for_post(post, config);
    let body = renderer.render(&post.body);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                (meta.head())
                style { (PreEscaped(CSS)) }
            }
            body {
                main class="post" {
                    a class="back-link" href="/blogs" { "← Back to posts" }
                    article {
                        header class="post-header" {
                            h1 { (post.title) }
                            div class="post-meta" {
                                @if let Some(date) = &post.date {
                                    time datetime=(date) { (date) }
                                    span { "•" }
                                }
                                span { (post.reading_minutes()) " min read" }
                            }
                            @if !post.tags.is_empty() {
                                ul class="tags" {
                                    @for tag in &post.tags {
                                        li class="tag" { (tag) }
                                    }
                                }
                            }
                        }
                        div class="prose" { (body) }
                        @if let Some(email) = &config.site.contact_email {
                            div class="feedback" {
                                p {
                                    "Have any concerns with this post? Send me an email at "
                                    a href={ "mailto:" (email) } { (email) }
                                    ". I appreciate corrections and thoughtful feedback."
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Write every eligible post page and the post index under `root`.
pub fn write_post_pages(
    config: &SiteConfig,
    root: &Path,
    renderer: &Renderer,
) -> Result<PagesReport, PagesError> {
    let posts_dir = root.join(&config.paths.posts_dir);
    if !posts_dir.is_dir() {
        return Err(PagesError::SourceMissing(posts_dir));
    }
    let listing = post::list_posts(&posts_dir, &config.paths.draft_marker)?;
    if listing.posts.is_empty() {
        return Err(PagesError::NoPosts(posts_dir));
    }

    let blog_dir = root.join(&config.paths.pages_dir).join("blog");
    std::fs::create_dir_all(&blog_dir)?;

    let mut summaries = Vec::new();
    let mut report = PagesReport {
        skipped: listing.drafts.iter().map(|p| post::file_name(p)).collect(),
        ..PagesReport::default()
    };
    for path in &listing.posts {
        let file = post::file_name(path);
        match write_page(path, &blog_dir, config, renderer) {
            Ok((page, summary)) => {
                tracing::debug!(%file, slug = %page.slug, "page written");
                report.written.push(page);
                summaries.push(summary);
            }
            Err(error) => {
                tracing::error!(%file, %error, "failed to write page");
                report.failed.push(PageFailure { file, error });
            }
        }
    }
    if report.written.is_empty() {
        tracing::warn!(failed = report.failed.len(), "no page could be written");
    }

    // Newest first; undated posts last, in file order.
    summaries.sort_by(|a, b| b.date.cmp(&a.date));
    report.index = blog_dir.join("index.json");
    std::fs::write(&report.index, serde_json::to_string_pretty(&summaries)?)?;
    Ok(report)
}

fn write_page(
    path: &Path,
    blog_dir: &Path,
    config: &SiteConfig,
    renderer: &Renderer,
) -> Result<(WrittenPage, PostSummary), PageError> {
    let post = Post::load(path)?;
    let page = render_post_page(&post, config, renderer);

    let dir = blog_dir.join(&post.slug);
    let output = dir.join("index.html");
    std::fs::create_dir_all(&dir)
        .and_then(|()| std::fs::write(&output, page.into_string()))
        .map_err(|source| PageError::Write {
            path: output.clone(),
            source,
        })?;

    let summary = PostSummary::new(&post, config);
    Ok((
        WrittenPage {
            slug: post.slug,
            title: post.title,
            output,
        },
        summary,
    ))
}
