//! Open Graph card rendering: layout tree → SVG → PNG.
//!
//! | Step | Module / crate |
//! |---|---|
//! | **Compose** | [`compose::og_card`] builds a [`LayoutNode`] tree |
//! | **Validate** | [`LayoutNode::validate`] rejects ambiguous containers |
//! | **Lay out + serialize** | [`svg::to_svg`], estimated text metrics |
//! | **Fonts** | [`fonts::assemble`]: local files, `ureq`, `@font-face` stylesheets |
//! | **Rasterize** | [`ResvgRasterizer`]: `resvg` + `image` PNG encoding |
//!
//! Each step is a plain function or a trait object, so the pipeline in
//! [`crate::og`] can be tested with [`raster::tests::MockRasterizer`] and
//! never decode a font.

pub mod compose;
pub mod fonts;
pub mod layout;
pub mod raster;
pub mod svg;

pub use compose::{CardText, og_card};
pub use fonts::{FontFetcher, FontLoad, FontSet, HttpFetcher};
pub use layout::{LayoutError, LayoutNode};
pub use raster::{RasterError, Rasterizer, ResvgRasterizer};
pub use svg::to_svg;

use crate::config::CardConfig;

/// Render one card: compose, validate, serialize and rasterize.
pub fn render_card(
    text: &CardText<'_>,
    config: &CardConfig,
    rasterizer: &impl Rasterizer,
) -> Result<Vec<u8>, CardRenderError> {
    let layout = og_card(text, config);
    let svg = to_svg(&layout, config.width, config.height)?;
    Ok(rasterizer.rasterize(&svg, config.width, config.height)?)
}

#[derive(thiserror::Error, Debug)]
pub enum CardRenderError {
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("raster error: {0}")]
    Raster(#[from] RasterError),
}
