//! Font acquisition for card rendering.
//!
//! Fonts come from two places, loaded in this order:
//!
//! 1. `[[fonts.sources]]` entries: a local path or URL, tagged explicitly
//!    with family, weight and style in the config.
//! 2. The optional `fonts.stylesheet`: an `@font-face` stylesheet (Google
//!    Fonts style). Each face is tagged from the `font-weight` and
//!    `font-style` declared in its own block, never from its position.
//!
//! A face whose family, weight and style match one already loaded is skipped,
//! so explicit sources win over the stylesheet. Downloads run in parallel.
//! Failures are reported but never fatal: a card renders with whatever fonts
//! did load, and the rasterizer falls back to system fonts if none did.
//!
//! Network access goes through the [`FontFetcher`] trait so tests never
//! touch the network.

use crate::config::{FontStyle, FontsConfig};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {message}")]
    Http { url: String, message: String },
    #[error("{location} is empty")]
    Empty { location: String },
}

/// A loaded font file with the tags it was requested under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontAsset {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    pub data: Vec<u8>,
}

/// Fonts available to the rasterizer, in load order.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    fonts: Vec<FontAsset>,
}

impl FontSet {
    /// Add a font unless one with the same family, weight and style exists.
    /// Returns whether it was added.
    pub fn insert(&mut self, asset: FontAsset) -> bool {
        let duplicate = self.fonts.iter().any(|f| {
            f.family.eq_ignore_ascii_case(&asset.family)
                && f.weight == asset.weight
                && f.style == asset.style
        });
        if !duplicate {
            self.fonts.push(asset);
        }
        !duplicate
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FontAsset> {
        self.fonts.iter()
    }
}

/// One `@font-face` entry from a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    pub url: String,
}

/// A font that could not be loaded.
#[derive(Debug)]
pub struct FontFailure {
    /// Path, URL or stylesheet that failed.
    pub location: String,
    pub error: FontError,
}

/// Result of [`assemble`].
#[derive(Debug, Default)]
pub struct FontLoad {
    pub fonts: FontSet,
    pub failures: Vec<FontFailure>,
}

/// Remote access for stylesheets and font files.
pub trait FontFetcher: Sync {
    fn get_text(&self, url: &str) -> Result<String, FontError>;
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FontError>;
}

/// Blocking HTTP fetcher with a per-request timeout.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    fn get(&self, url: &str) -> Result<ureq::Response, FontError> {
        self.agent.get(url).call().map_err(|e| FontError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl FontFetcher for HttpFetcher {
    fn get_text(&self, url: &str) -> Result<String, FontError> {
        self.get(url)?.into_string().map_err(|e| FontError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FontError> {
        let mut data = Vec::new();
        self.get(url)?
            .into_reader()
            .read_to_end(&mut data)
            .map_err(|e| FontError::Http {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(data)
    }
}

/// Extract `@font-face` entries from a stylesheet.
///
/// Blocks without a `url(...)` source are ignored. A block without
/// `font-family` takes `default_family`; without `font-weight` it is 400.
/// A variable weight range such as `100 900` is tagged with its lower bound.
/// Repeated URLs are listed once.
pub fn parse_stylesheet(css: &str, default_family: &str) -> Vec<FontFace> {
    let mut faces: Vec<FontFace> = Vec::new();
    let mut rest = css;
    while let Some(at) = rest.find("@font-face") {
        rest = &rest[at + "@font-face".len()..];
        let Some(open) = rest.find('{') else { break };
        let Some(close) = rest[open..].find('}') else { break };
        let block = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        let mut face = FontFace {
            family: default_family.to_string(),
            weight: 400,
            style: FontStyle::Normal,
            url: String::new(),
        };
        for decl in block.split(';') {
            let Some((prop, value)) = decl.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match prop.trim().to_ascii_lowercase().as_str() {
                "font-family" => face.family = value.trim_matches(['\'', '"']).to_string(),
                "font-weight" => {
                    if let Some(w) = value.split_whitespace().next().and_then(|w| w.parse().ok())
                    {
                        face.weight = w;
                    }
                }
                "font-style" => {
                    face.style = if value.eq_ignore_ascii_case("normal") {
                        FontStyle::Normal
                    } else {
                        FontStyle::Italic
                    }
                }
                "src" => {
                    if let Some(url) = first_url(value) {
                        face.url = url;
                    }
                }
                _ => {}
            }
        }
        if !face.url.is_empty() && !faces.iter().any(|f| f.url == face.url) {
            faces.push(face);
        }
    }
    faces
}

fn first_url(src: &str) -> Option<String> {
    let start = src.find("url(")? + "url(".len();
    let end = src[start..].find(')')? + start;
    let url = src[start..end].trim().trim_matches(['\'', '"']);
    (!url.is_empty()).then(|| url.to_string())
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

struct FontRequest {
    family: String,
    weight: u16,
    style: FontStyle,
    location: String,
}

/// Load every configured font.
///
/// Local paths are resolved against `root`. Never fails as a whole; see
/// [`FontLoad::failures`].
pub fn assemble(config: &FontsConfig, root: &Path, fetcher: &impl FontFetcher) -> FontLoad {
    let mut failures = Vec::new();
    let mut requests: Vec<FontRequest> = config
        .sources
        .iter()
        .map(|s| FontRequest {
            family: s.family.clone(),
            weight: s.weight,
            style: s.style,
            location: s.source.clone(),
        })
        .collect();

    if let Some(url) = &config.stylesheet {
        let default_family = config
            .sources
            .first()
            .map(|s| s.family.as_str())
            .unwrap_or("sans-serif");
        match fetcher.get_text(url) {
            Ok(css) => {
                let faces = parse_stylesheet(&css, default_family);
                tracing::debug!(stylesheet = %url, faces = faces.len(), "parsed font stylesheet");
                requests.extend(faces.into_iter().map(|f| FontRequest {
                    family: f.family,
                    weight: f.weight,
                    style: f.style,
                    location: f.url,
                }));
            }
            Err(error) => {
                tracing::warn!(stylesheet = %url, %error, "font stylesheet unavailable");
                failures.push(FontFailure {
                    location: url.clone(),
                    error,
                });
            }
        }
    }

    let results: Vec<Result<FontAsset, FontFailure>> = requests
        .par_iter()
        .map(|req| {
            load(req, root, fetcher).map_err(|error| FontFailure {
                location: req.location.clone(),
                error,
            })
        })
        .collect();

    let mut fonts = FontSet::default();
    for result in results {
        match result {
            Ok(asset) => {
                let (family, weight) = (asset.family.clone(), asset.weight);
                if !fonts.insert(asset) {
                    tracing::debug!(%family, weight, "skipping duplicate font face");
                }
            }
            Err(failure) => {
                tracing::warn!(font = %failure.location, error = %failure.error, "font unavailable");
                failures.push(failure);
            }
        }
    }
    FontLoad { fonts, failures }
}

fn load(req: &FontRequest, root: &Path, fetcher: &impl FontFetcher) -> Result<FontAsset, FontError> {
    let data = if is_remote(&req.location) {
        fetcher.get_bytes(&req.location)?
    } else {
        let path = root.join(&req.location);
        std::fs::read(&path).map_err(|source| FontError::Io { path, source })?
    };
    if data.is_empty() {
        return Err(FontError::Empty {
            location: req.location.clone(),
        });
    }
    Ok(FontAsset {
        family: req.family.clone(),
        weight: req.weight,
        style: req.style,
        data,
    })
}
