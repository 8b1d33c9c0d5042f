//! # Folio
//!
//! Build-time tooling for a markdown blog: one Open Graph card per post and
//! a styled HTML rendering of each post body.
//!
//! # Architecture: Two Independent Pipelines
//!
//! Both pipelines start from the same post listing, so a post's card and its
//! page always agree on the slug:
//!
//! ```text
//! og     posts/*.md  →  front-matter  →  layout tree  →  SVG  →  <og_dir>/<slug>.png
//! pages  posts/*.md  →  front-matter  →  markdown tree  →  overrides  →  <pages_dir>/blog/
//! ```
//!
//! A post that fails to parse or render is reported and skipped. A run only
//! fails when its input directory is missing or holds no eligible posts.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`og`] | Card pipeline: list posts, render, write PNGs, report |
//! | [`card`] | Card layout tree, SVG serialization, fonts, rasterization |
//! | [`pages`] | Page pipeline: post pages and `blog/index.json` |
//! | [`markdown`] | Markdown → element tree → component overrides → HTML |
//! | [`meta`] | Title, description, canonical and Open Graph head tags |
//! | [`post`] | Post loading and the eligible/draft listing |
//! | [`frontmatter`] | `---` delimited `key: value` header parser |
//! | [`naming`] | Slug derivation and validation |
//! | [`config`] | `folio.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting for both pipelines |
//!
//! # Design Decisions
//!
//! ## SVG as the Card Intermediate
//!
//! Cards are laid out into an SVG document and rasterized by `resvg`. The SVG
//! is plain text, so layout is testable without fonts or pixels, and the
//! rasterizer sits behind the [`card::Rasterizer`] trait.
//!
//! ## Maud for Pages
//!
//! Page chrome and components are [Maud](https://maud.lambda.xyz/) templates:
//! malformed markup is a build error and interpolation is escaped. Element
//! kinds that come straight from a post are written by a small serializer that
//! drops names it cannot trust.
//!
//! ## Explicit Override Table
//!
//! Component overrides live in a [`markdown::OverrideTable`] value passed to
//! the renderer, never in global state. Tests swap in their own tables.

pub mod card;
pub mod config;
pub mod frontmatter;
pub mod markdown;
pub mod meta;
pub mod naming;
pub mod og;
pub mod output;
pub mod pages;
pub mod post;

#[cfg(test)]
pub(crate) mod test_helpers;
