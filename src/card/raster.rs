//! SVG to PNG rasterization.
//!
//! The [`Rasterizer`] trait is the seam between card composition and pixel
//! output. [`ResvgRasterizer`] is the production implementation: pure Rust,
//! fonts supplied from a [`FontSet`] rather than discovered on the system
//! (unless none could be loaded).

use super::fonts::FontSet;
use image::{ImageFormat, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("SVG parse error: {0}")]
    Svg(#[from] usvg::Error),
    #[error("cannot allocate a {width}x{height} canvas")]
    Pixmap { width: u32, height: u32 },
    #[error("PNG encode error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Turns an SVG document into PNG bytes of the given size.
pub trait Rasterizer: Sync {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<Vec<u8>, RasterError>;
}

pub struct ResvgRasterizer {
    options: usvg::Options<'static>,
}

impl ResvgRasterizer {
    /// Build a rasterizer that resolves text against `fonts`, using `family`
    /// when a requested family is unavailable.
    pub fn new(fonts: &FontSet, family: &str) -> Self {
        let mut options = usvg::Options {
            font_family: family.to_string(),
            ..usvg::Options::default()
        };
        let db = options.fontdb_mut();
        if fonts.is_empty() {
            tracing::warn!("no fonts loaded, falling back to system fonts");
            db.load_system_fonts();
        } else {
            for font in fonts.iter() {
                db.load_font_data(font.data.clone());
            }
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self { options }
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
        let tree = usvg::Tree::from_str(svg, &self.options)?;
        let mut pixmap =
            tiny_skia::Pixmap::new(width, height).ok_or(RasterError::Pixmap { width, height })?;

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let rgba: Vec<u8> = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        let image =
            RgbaImage::from_raw(width, height, rgba).ok_or(RasterError::Pixmap { width, height })?;

        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }
}
