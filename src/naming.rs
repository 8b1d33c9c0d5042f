//! Slug derivation shared by every output keyed by post.
//!
//! The OG generator names images `<slug>.png` and the page writer points
//! `og:image` at the same path, so both go through [`derive_slug`].
//!
//! ## Resolution order
//!
//! 1. Explicit front-matter `slug`, trimmed. Case is preserved and the value is
//!    not re-slugified: `slug: Hello-World` produces `Hello-World.png`. It must
//!    pass [`check_slug`].
//! 2. File name with its extension removed: `rust-notes.md` → `rust-notes`.
//!    A stem that fails [`check_slug`] is slugified instead.
//! 3. Slugified title: `"Hello, World!"` → `hello-world`.
//!
//! Every resolved slug is made of ASCII letters, digits, `-` and `_`, so it is
//! always a single path segment.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug is empty")]
    Empty,
    #[error("slug {0:?} may only contain ASCII letters, digits, '-' and '_'")]
    NotUrlSafe(String),
}

const MAX_SLUG_LEN: usize = 80;

/// Resolve a post slug from its sources, first usable value wins.
///
/// Explicit slugs are checked with [`check_slug`]; an unusable explicit slug
/// is an error rather than a silent fallback, since it would otherwise change
/// the published URL.
pub fn derive_slug(
    explicit: Option<&str>,
    file_stem: Option<&str>,
    title: Option<&str>,
) -> Result<String, SlugError> {
    if let Some(slug) = explicit {
        let slug = slug.trim();
        check_slug(slug)?;
        return Ok(slug.to_string());
    }
    if let Some(stem) = file_stem.map(str::trim).filter(|s| !s.is_empty()) {
        if check_slug(stem).is_ok() {
            return Ok(stem.to_string());
        }
        let slug = slugify(stem);
        if !slug.is_empty() {
            return Ok(slug);
        }
    }
    let slug = title.map(slugify).unwrap_or_default();
    check_slug(&slug)?;
    Ok(slug)
}

/// Strip the final extension from a file name: `post.md` → `post`.
pub fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    }
}

/// Reject slugs that are not a single URL-safe path segment.
pub fn check_slug(slug: &str) -> Result<(), SlugError> {
    if slug.is_empty() {
        return Err(SlugError::Empty);
    }
    let url_safe = slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !url_safe || slug == "." || slug == ".." {
        return Err(SlugError::NotUrlSafe(slug.to_string()));
    }
    Ok(())
}

/// Turn free text into a lowercase, hyphen-separated slug with
/// [`slug::slugify`], cut at the last dash before `MAX_SLUG_LEN`.
pub fn slugify(text: &str) -> String {
    let slug = slug::slugify(text);
    if slug.len() <= MAX_SLUG_LEN {
        return slug;
    }
    let cut = &slug[..MAX_SLUG_LEN];
    match cut.rfind('-') {
        Some(pos) if pos > 0 => cut[..pos].to_string(),
        _ => cut.to_string(),
    }
}
