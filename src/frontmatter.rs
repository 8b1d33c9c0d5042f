//! Front-matter header parsing.
//!
//! A post may start with a `---` delimited YAML block:
//!
//! ```text
//! ---
//! title: "Shipping a Rust CLI"
//! excerpt: >
//!   Notes from the first release,
//!   folded onto one line
//! slug: shipping-a-rust-cli
//! date: 2024-05-01
//! tags: [rust, cli]
//! ---
//! Body markdown starts here.
//! ```
//!
//! The block is deserialized into [`FrontMatter`]. Unknown keys are ignored.
//! `tags` accepts a YAML sequence or a comma separated string. A file without
//! an opening `---` has no front-matter and its whole content is the body.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("front-matter opened on line 1 is never closed")]
    Unterminated,
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Recognized front-matter fields.
///
/// Scalars are trimmed, and empty ones are treated as absent. `slug` is kept
/// even when empty so an explicit empty slug can be rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "non_empty")]
    pub title: Option<String>,
    #[serde(deserialize_with = "non_empty")]
    pub excerpt: Option<String>,
    #[serde(deserialize_with = "non_empty")]
    pub description: Option<String>,
    #[serde(deserialize_with = "trimmed")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "non_empty")]
    pub date: Option<String>,
    #[serde(deserialize_with = "tag_list")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "non_empty")]
    pub image: Option<String>,
}

const DELIMITER: &str = "---";

/// Split a post source into its front-matter and markdown body.
pub fn parse(source: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(header_start) = opening_delimiter(source) else {
        return Ok((FrontMatter::default(), source));
    };

    let mut offset = header_start;
    for line in source[header_start..].split_inclusive('\n') {
        let header_end = offset;
        offset += line.len();
        let line = line.trim_end();
        if line == DELIMITER || line == "..." {
            let header = &source[header_start..header_end];
            return Ok((deserialize(header)?, &source[offset..]));
        }
    }
    Err(FrontMatterError::Unterminated)
}

/// Byte offset just past the opening `---` line, if the source has one.
fn opening_delimiter(source: &str) -> Option<usize> {
    let first_line_end = source.find('\n').map(|i| i + 1).unwrap_or(source.len());
    let first_line = source[..first_line_end].trim_end();
    (first_line == DELIMITER).then_some(first_line_end)
}

fn deserialize(header: &str) -> Result<FrontMatter, FrontMatterError> {
    // A header of blank lines and comments is an empty document, which YAML
    // reads as null rather than as an empty mapping.
    let blank = header
        .lines()
        .map(str::trim)
        .all(|l| l.is_empty() || l.starts_with('#'));
    if blank {
        return Ok(FrontMatter::default());
    }
    Ok(serde_yaml::from_str(header)?)
}

fn trimmed<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(de)?;
    Ok(value.map(|v| v.trim().to_string()))
}

fn non_empty<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(trimmed(de)?.filter(|v| !v.is_empty()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Tags {
    List(Vec<String>),
    Text(String),
}

/// `[a, b]`, an indented `- item` list, or `a, b`. Duplicates are dropped.
fn tag_list<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    let items = match Option::<Tags>::deserialize(de)? {
        None => Vec::new(),
        Some(Tags::List(items)) => items,
        Some(Tags::Text(text)) => text.split(',').map(str::to_string).collect(),
    };
    let mut tags: Vec<String> = Vec::with_capacity(items.len());
    for tag in items.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}
