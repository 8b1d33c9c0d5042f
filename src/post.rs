//! Post records and post directory listing.
//!
//! Posts are flat `*.md` files in the posts directory. Both pipelines list
//! them through [`list_posts`] so drafts are skipped identically, and build
//! records through [`Post::parse`] so slugs agree.

use crate::frontmatter::{self, FrontMatterError};
use crate::naming::{self, SlugError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed front-matter: {0}")]
    FrontMatter(#[from] FrontMatterError),
    #[error("Invalid slug: {0}")]
    Slug(#[from] SlugError),
}

/// A post loaded from a markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    /// `excerpt`, falling back to `description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// File name the post was read from.
    pub source: String,
    #[serde(skip)]
    pub body: String,
}

impl Post {
    /// Build a post from a file name and its raw contents.
    pub fn parse(file_name: &str, raw: &str) -> Result<Self, PostError> {
        let (fm, body) = frontmatter::parse(raw)?;
        let stem = naming::file_stem(file_name);
        let slug = naming::derive_slug(fm.slug.as_deref(), Some(stem), fm.title.as_deref())?;
        let title = fm.title.unwrap_or_else(|| slug.clone());
        Ok(Self {
            slug,
            title,
            excerpt: fm.excerpt.or(fm.description),
            date: fm.date,
            tags: fm.tags,
            image: fm.image,
            source: file_name.to_string(),
            body: body.to_string(),
        })
    }

    /// Read and parse a post file.
    pub fn load(path: &Path) -> Result<Self, PostError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&file_name(path), &raw)
    }

    /// Estimated reading time in whole minutes, at least one.
    pub fn reading_minutes(&self) -> u32 {
        const WORDS_PER_MINUTE: usize = 200;
        let words = self.body.split_whitespace().count();
        words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
    }
}

/// Post files found in a posts directory.
#[derive(Debug, Default)]
pub struct PostListing {
    /// Markdown files to process, sorted by file name.
    pub posts: Vec<PathBuf>,
    /// Markdown files skipped because their name contains the draft marker.
    pub drafts: Vec<PathBuf>,
}

/// List `*.md` files directly inside `dir`, separating drafts.
///
/// Returns an IO error if `dir` does not exist or cannot be read.
pub fn list_posts(dir: &Path, draft_marker: &str) -> std::io::Result<PostListing> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("posts directory not found: {}", dir.display()),
        ));
    }

    let mut listing = PostListing::default();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.contains(draft_marker) {
            listing.drafts.push(entry.into_path());
        } else {
            listing.posts.push(entry.into_path());
        }
    }
    Ok(listing)
}

/// Final path component as an owned string, empty if there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_slug_is_used_verbatim() {
        let post = Post::parse("anything.md", "---\ntitle: T\nslug: Mixed-Case\n---\n").unwrap();
        assert_eq!(post.slug, "Mixed-Case");
    }

    #[test]
    fn slug_falls_back_to_file_stem() {
        let post = Post::parse("rust-notes.md", "---\ntitle: Rust Notes\n---\nbody").unwrap();
        assert_eq!(post.slug, "rust-notes");
        assert_eq!(post.title, "Rust Notes");
        assert_eq!(post.body, "body");
    }

    #[test]
    fn title_falls_back_to_slug() {
        let post = Post::parse("untitled.md", "no header at all").unwrap();
        assert_eq!(post.title, "untitled");
        assert_eq!(post.body, "no header at all");
    }

    #[test]
    fn excerpt_falls_back_to_description() {
        let post = Post::parse("a.md", "---\ndescription: From description\n---\n").unwrap();
        assert_eq!(post.excerpt.as_deref(), Some("From description"));

        let post = Post::parse(
            "a.md",
            "---\nexcerpt: From excerpt\ndescription: ignored\n---\n",
        )
        .unwrap();
        assert_eq!(post.excerpt.as_deref(), Some("From excerpt"));
    }

    #[test]
    fn folded_excerpt_is_joined() {
        let post = Post::parse(
            "hello.md",
            "---\ntitle: Hello\nexcerpt: >\n  A folded\n  excerpt line\n---\nbody\n",
        )
        .unwrap();
        assert_eq!(post.excerpt.as_deref(), Some("A folded excerpt line"));
        assert_eq!(post.slug, "hello");
        assert_eq!(post.body, "body\n");
    }

    #[test]
    fn malformed_front_matter_is_error() {
        let result = Post::parse("bad.md", "---\ntitle: x\nnot a pair\n---\n");
        assert!(matches!(result, Err(PostError::FrontMatter(_))));
    }

    #[test]
    fn invalid_explicit_slug_is_error() {
        let result = Post::parse("a.md", "---\nslug: has space\n---\n");
        assert!(matches!(result, Err(PostError::Slug(_))));
    }

    #[test]
    fn reading_minutes_rounds_up() {
        let mut post = Post::parse("a.md", "").unwrap();
        assert_eq!(post.reading_minutes(), 1);
        post.body = "word ".repeat(401);
        assert_eq!(post.reading_minutes(), 3);
    }

    #[test]
    fn list_posts_sorts_and_separates_drafts() {
        let tmp = setup_fixtures();
        let listing = list_posts(&posts_dir(&tmp), "draft").unwrap();
        let names = file_names(&listing.posts);
        assert_eq!(
            names,
            vec!["broken-header.md", "hello-world.md", "rust-notes.md"]
        );
        assert_eq!(file_names(&listing.drafts), vec!["wip-draft.md"]);
    }

    #[test]
    fn list_posts_ignores_subdirectories_and_other_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested/inner.md"), "x").unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        fs::write(tmp.path().join("UPPER.MD"), "x").unwrap();
        let listing = list_posts(tmp.path(), "draft").unwrap();
        assert_eq!(file_names(&listing.posts), vec!["UPPER.MD"]);
    }

    #[test]
    fn list_posts_missing_dir_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = list_posts(&tmp.path().join("missing"), "draft").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn file_name_is_last_component() {
        assert_eq!(file_name(Path::new("/site/posts/a-draft.md")), "a-draft.md");
        assert_eq!(file_name(Path::new("/")), "");
    }

    #[test]
    fn load_reads_file_name_as_source() {
        let tmp = setup_fixtures();
        let post = Post::load(&posts_dir(&tmp).join("rust-notes.md")).unwrap();
        assert_eq!(post.source, "rust-notes.md");
        assert_eq!(post.slug, "rust-notes");
    }
}
