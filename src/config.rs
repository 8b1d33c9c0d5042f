//! Project configuration module.
//!
//! Handles loading, validating, and merging `folio.toml`. Stock defaults are
//! overridden by the user file in the project root; the file is optional and
//! sparse.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "ebadf.me"             # Site identifier printed on every card
//! url = "https://ebadf.me"      # Canonical origin for page metadata
//! # contact_email = "me@example.com"
//!
//! [paths]
//! posts_dir = "src/posts"       # Markdown posts with front-matter
//! og_dir = "public/og"          # Generated <slug>.png cards
//! pages_dir = "dist"            # Generated blog/<slug>/index.html pages
//! draft_marker = "draft"        # Files whose name contains this are skipped
//!
//! [card]
//! width = 1200
//! height = 630
//! padding = 64
//! text_color = "#ffffff"
//! font_family = "Inter"
//!
//! [card.gradient]
//! angle = 135
//! from = "#0ea5a0"
//! to = "#7c3aed"
//!
//! [fonts]
//! stylesheet = "https://fonts.googleapis.com/css2?family=Inter:wght@400;700;800&display=swap"
//! timeout_secs = 10
//!
//! [[fonts.sources]]
//! family = "Inter"
//! weight = 400
//! style = "normal"
//! source = "assets/fonts/Inter-Regular.ttf"   # path or http(s) URL
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILE: &str = "folio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `folio.toml`.
///
/// All fields have defaults matching the published site. User config files
/// need only specify the values they want to override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity used on cards and in page metadata.
    pub site: SiteInfo,
    /// Input and output locations, relative to the project root.
    pub paths: PathsConfig,
    /// Open Graph card geometry and colors.
    pub card: CardConfig,
    /// Font acquisition for card rasterization.
    pub fonts: FontsConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.card.width == 0 || self.card.height == 0 {
            return Err(ConfigError::Validation(
                "card.width and card.height must be non-zero".into(),
            ));
        }
        if f64::from(self.card.padding) * 2.0 >= f64::from(self.card.width.min(self.card.height)) {
            return Err(ConfigError::Validation(
                "card.padding must leave room for content".into(),
            ));
        }
        if self.card.gradient.from.trim().is_empty() || self.card.gradient.to.trim().is_empty() {
            return Err(ConfigError::Validation(
                "card.gradient colors must not be empty".into(),
            ));
        }
        if self.fonts.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fonts.timeout_secs must be greater than zero".into(),
            ));
        }
        for source in &self.fonts.sources {
            if !(1..=1000).contains(&source.weight) {
                return Err(ConfigError::Validation(format!(
                    "fonts.sources weight {} for {} must be 1-1000",
                    source.weight, source.source
                )));
            }
        }
        if self.paths.draft_marker.is_empty() {
            return Err(ConfigError::Validation(
                "paths.draft_marker must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Short identifier printed at the top of every card.
    pub name: String,
    /// Origin used for canonical and Open Graph URLs, without trailing slash.
    pub url: String,
    /// Address shown in the feedback blurb under each post.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "ebadf.me".to_string(),
            url: "https://ebadf.me".to_string(),
            contact_email: None,
        }
    }
}

impl SiteInfo {
    /// Site origin with any trailing slash removed.
    pub fn origin(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub posts_dir: String,
    pub og_dir: String,
    pub pages_dir: String,
    /// Substring that marks a post file as a draft.
    pub draft_marker: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            posts_dir: "src/posts".to_string(),
            og_dir: "public/og".to_string(),
            pages_dir: "dist".to_string(),
            draft_marker: "draft".to_string(),
        }
    }
}

/// Open Graph card geometry and colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardConfig {
    pub width: u32,
    pub height: u32,
    /// Inner padding of the outer panel, in pixels.
    pub padding: u32,
    pub text_color: String,
    /// Family requested for all card text.
    pub font_family: String,
    pub gradient: GradientConfig,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
            padding: 64,
            text_color: "#ffffff".to_string(),
            font_family: "Inter".to_string(),
            gradient: GradientConfig::default(),
        }
    }
}

/// Two-stop linear gradient, angle in CSS degrees (0 = towards top).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GradientConfig {
    pub angle: f32,
    pub from: String,
    pub to: String,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            angle: 135.0,
            from: "#0ea5a0".to_string(),
            to: "#7c3aed".to_string(),
        }
    }
}

/// Font acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontsConfig {
    /// Remote `@font-face` stylesheet. Each face is tagged with the weight
    /// and style declared in its own block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<String>,
    /// Per-request timeout for stylesheet and font downloads.
    pub timeout_secs: u64,
    /// Explicitly tagged fonts, loaded before stylesheet faces.
    pub sources: Vec<FontSource>,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            stylesheet: Some(
                "https://fonts.googleapis.com/css2?family=Inter:wght@400;700;800&display=swap"
                    .to_string(),
            ),
            timeout_secs: 10,
            sources: Vec::new(),
        }
    }
}

/// One explicitly tagged font file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontSource {
    pub family: String,
    pub weight: u16,
    #[serde(default)]
    pub style: FontStyle,
    /// Local path (relative to the project root) or `http(s)` URL.
    pub source: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_css(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `folio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
# Short identifier printed at the top of every Open Graph card.
name = "ebadf.me"

# Origin for canonical, og:url and og:image links (no trailing slash).
url = "https://ebadf.me"

# Shown in the feedback note under every post page.
# contact_email = "me@example.com"

# ---------------------------------------------------------------------------
# Paths (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
posts_dir = "src/posts"
og_dir = "public/og"
pages_dir = "dist"

# Post files whose name contains this marker are skipped.
draft_marker = "draft"

# ---------------------------------------------------------------------------
# Open Graph card
# ---------------------------------------------------------------------------
[card]
width = 1200
height = 630
padding = 64
text_color = "#ffffff"
font_family = "Inter"

# Background gradient. Angle in CSS degrees (0 = towards top, 90 = right).
[card.gradient]
angle = 135.0
from = "#0ea5a0"
to = "#7c3aed"

# ---------------------------------------------------------------------------
# Fonts
# ---------------------------------------------------------------------------
[fonts]
# Remote @font-face stylesheet. Weights are read from each face's block.
# Remove this line to rely on `sources` only.
stylesheet = "https://fonts.googleapis.com/css2?family=Inter:wght@400;700;800&display=swap"

# Timeout for each stylesheet or font download, in seconds.
timeout_secs = 10

# Explicitly tagged fonts, loaded before stylesheet faces.
sources = []
# [[fonts.sources]]
# family = "Inter"
# weight = 700
# style = "normal"
# source = "assets/fonts/Inter-Bold.ttf"
"##
}
