//! Shared test utilities for the folio test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let listing = list_posts(&posts_dir(&tmp), "draft").unwrap();
//! assert_eq!(file_names(&listing.drafts), vec!["wip-draft.md"]);
//! ```
//!
//! Fixture posts (`fixtures/posts/`):
//!
//! | File | Shape |
//! |------|-------|
//! | `hello-world.md` | explicit mixed-case slug, excerpt, link, quote |
//! | `rust-notes.md` | no slug, description, code block, note, details, table |
//! | `broken-header.md` | malformed front-matter |
//! | `wip-draft.md` | skipped by the draft marker |

use crate::config::SiteConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Posts directory inside a fixture copy.
pub fn posts_dir(tmp: &TempDir) -> PathBuf {
    tmp.path().join("posts")
}

/// Config pointing at the fixture layout, with no network fonts.
pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.paths.posts_dir = "posts".to_string();
    config.paths.og_dir = "og".to_string();
    config.paths.pages_dir = "dist".to_string();
    config.fonts.stylesheet = None;
    config
}

/// Load one fixture post by file name. Panics if it does not parse.
pub fn fixture_post(tmp: &TempDir, file: &str) -> crate::post::Post {
    crate::post::Post::load(&posts_dir(tmp).join(file))
        .unwrap_or_else(|e| panic!("fixture '{file}' failed to load: {e}"))
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// File names of the given paths, in order.
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}
