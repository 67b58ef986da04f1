//! Pluggable rasterization of card views.

use std::sync::Arc;

use card_core::CardView;

use crate::error::{RenderError, RenderResult};
use crate::svg::{output_size, render_svg};

/// Straight-alpha RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel, not premultiplied).
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// RGBA value at `(x, y)`, `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Converts a card view into pixels.
///
/// The export pipeline only depends on this trait, so tests and other hosts
/// can swap the rasterization technology.
pub trait Rasterizer: Send + Sync {
    /// Rasterize the view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be drawn.
    fn rasterize(&self, view: &CardView) -> RenderResult<RasterImage>;
}

/// Configuration for [`SvgRasterizer`].
#[derive(Debug, Clone)]
pub struct RasterConfig {
    /// Device pixel ratio (e.g. 2.0 for retina).
    pub scale: f32,
    /// Load the host's installed fonts. Needs the `system-fonts` feature.
    pub load_system_fonts: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            load_system_fonts: true,
        }
    }
}

/// Rasterizer that writes an SVG intermediate and renders it with resvg.
pub struct SvgRasterizer {
    config: RasterConfig,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SvgRasterizer {
    /// Create a rasterizer with the given configuration.
    #[must_use]
    pub fn new(config: RasterConfig) -> Self {
        let mut db = usvg::fontdb::Database::new();
        #[cfg(feature = "system-fonts")]
        if config.load_system_fonts {
            db.load_system_fonts();
            tracing::debug!("Loaded {} system font faces", db.len());
        }
        #[cfg(not(feature = "system-fonts"))]
        if config.load_system_fonts {
            tracing::warn!("System fonts requested but not compiled in");
        }
        Self {
            config,
            fontdb: Arc::new(db),
        }
    }

    /// Create a rasterizer with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RasterConfig::default())
    }

    /// Register font data (TTF/OTF/TTC) for text rendering.
    pub fn register_font(&mut self, data: Vec<u8>) {
        let db = Arc::make_mut(&mut self.fontdb);
        let before = db.len();
        db.load_font_data(data);
        tracing::debug!("Registered {} font faces", db.len() - before);
    }

    /// Number of font faces available to text rendering.
    #[must_use]
    pub fn font_count(&self) -> usize {
        self.fontdb.len()
    }

    /// Rendering configuration.
    #[must_use]
    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// The SVG intermediate for a view, as used by [`Rasterizer::rasterize`].
    #[must_use]
    pub fn to_svg(&self, view: &CardView) -> String {
        render_svg(view, self.config.scale)
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Rasterizer for SvgRasterizer {
    fn rasterize(&self, view: &CardView) -> RenderResult<RasterImage> {
        let svg = self.to_svg(view);

        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);
        let tree = usvg::Tree::from_str(&svg, &opt)
            .map_err(|e| RenderError::Rasterize(format!("SVG parsing failed: {e}")))?;

        let (width, height) = output_size(view, self.config.scale);
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Rasterize("Failed to create pixmap".to_string()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        let mut pixels = Vec::with_capacity(pixmap.data().len());
        for px in pixmap.pixels() {
            let c = px.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        tracing::trace!(width, height, "Rasterized card");
        Ok(RasterImage {
            width,
            height,
            pixels,
        })
    }
}
