//! Vector rendering backend.
//!
//! The engine creates one renderer per rasterization through a
//! [`RendererFactory`], loads the resolved source into it, and asks it for a
//! raster at the computed size. [`ResvgRenderer`] is the default backend;
//! it accepts plain and gzip-compressed SVG.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use resvg::tiny_skia;
use resvg::usvg;
use tracing::debug;

use crate::raster::RasterImage;
use crate::types::PixelSize;

/// System font database, loaded once and shared by every renderer.
static SYSTEM_FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

/// Options passed to the renderer on every load.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Directory used to resolve relative references (images, etc.).
    /// The engine sets this to the source file's directory when loading
    /// from a path.
    pub resources_dir: Option<PathBuf>,
    /// Make system fonts available for `<text>` elements.
    /// Default: true.
    pub load_system_fonts: bool,
    /// Anti-alias shapes. Disabling gives crisp edges at small sizes.
    /// Default: true.
    pub antialias: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            resources_dir: None,
            load_system_fonts: true,
            antialias: true,
        }
    }
}

impl RenderOptions {
    /// Set the resources directory.
    #[must_use]
    pub fn with_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = Some(dir.into());
        self
    }

    /// Enable or disable system font loading.
    #[must_use]
    pub fn with_system_fonts(mut self, enable: bool) -> Self {
        self.load_system_fonts = enable;
        self
    }

    /// Enable or disable anti-aliasing.
    #[must_use]
    pub fn with_antialias(mut self, enable: bool) -> Self {
        self.antialias = enable;
        self
    }

    fn configure(&self, options: &mut usvg::Options) {
        options.resources_dir = self.resources_dir.clone();
        options.shape_rendering = if self.antialias {
            usvg::ShapeRendering::GeometricPrecision
        } else {
            usvg::ShapeRendering::CrispEdges
        };
        if self.load_system_fonts {
            options.fontdb = Arc::clone(SYSTEM_FONTS.get_or_init(|| {
                let mut db = usvg::fontdb::Database::new();
                db.load_system_fonts();
                debug!(
                    target: "horizon_lattice_svgicon::renderer",
                    faces = db.len(),
                    "loaded system fonts"
                );
                Arc::new(db)
            }));
        }
    }
}

/// A vector renderer that holds at most one loaded document.
///
/// Loading never panics or returns errors: an unreadable or malformed
/// source makes the load return `false` and leaves the renderer invalid.
pub trait VectorRenderer {
    /// Load a document from memory, replacing the current one.
    fn load_data(&mut self, data: &[u8], options: &RenderOptions) -> bool;

    /// Load a document from a file, replacing the current one.
    fn load_file(&mut self, path: &Path, options: &RenderOptions) -> bool;

    /// Check if a document is loaded.
    fn is_valid(&self) -> bool;

    /// Intrinsic size of the loaded document, or zero if unknown.
    fn default_size(&self) -> PixelSize;

    /// Rasterize the loaded document stretched to `size`.
    ///
    /// Returns the null image if nothing is loaded or `size` is empty.
    fn render_to_image(&self, size: PixelSize) -> RasterImage;
}

/// Creates a fresh renderer for each rasterization.
pub type RendererFactory = Arc<dyn Fn() -> Box<dyn VectorRenderer> + Send + Sync>;

/// Factory producing [`ResvgRenderer`]s.
pub fn resvg_factory() -> RendererFactory {
    Arc::new(|| Box::new(ResvgRenderer::new()) as Box<dyn VectorRenderer>)
}

/// SVG renderer backed by resvg.
#[derive(Default)]
pub struct ResvgRenderer {
    tree: Option<usvg::Tree>,
}

impl ResvgRenderer {
    /// Create an empty (invalid) renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and load SVG data, returning whether it succeeded.
    fn parse(&mut self, data: &[u8], options: &RenderOptions) -> bool {
        let mut usvg_options = usvg::Options::default();
        options.configure(&mut usvg_options);

        // usvg inflates gzip (svgz) input itself
        match usvg::Tree::from_data(data, &usvg_options) {
            Ok(tree) => {
                self.tree = Some(tree);
                true
            }
            Err(e) => {
                debug!(target: "horizon_lattice_svgicon::renderer", "failed to parse SVG: {}", e);
                self.tree = None;
                false
            }
        }
    }
}

impl VectorRenderer for ResvgRenderer {
    fn load_data(&mut self, data: &[u8], options: &RenderOptions) -> bool {
        self.parse(data, options)
    }

    fn load_file(&mut self, path: &Path, options: &RenderOptions) -> bool {
        match std::fs::read(path) {
            Ok(data) => self.parse(&data, options),
            Err(e) => {
                debug!(
                    target: "horizon_lattice_svgicon::renderer",
                    path = %path.display(),
                    "failed to read SVG file: {}",
                    e
                );
                self.tree = None;
                false
            }
        }
    }

    fn is_valid(&self) -> bool {
        self.tree.is_some()
    }

    fn default_size(&self) -> PixelSize {
        match &self.tree {
            Some(tree) => {
                let size = tree.size();
                PixelSize::new(size.width().round() as u32, size.height().round() as u32)
            }
            None => PixelSize::ZERO,
        }
    }

    fn render_to_image(&self, size: PixelSize) -> RasterImage {
        let Some(tree) = &self.tree else {
            return RasterImage::null();
        };
        let Some(mut pixmap) = tiny_skia::Pixmap::new(size.width, size.height) else {
            return RasterImage::null();
        };

        // Stretch the document onto the target size
        let natural = tree.size();
        let sx = size.width as f32 / natural.width();
        let sy = size.height as f32 / natural.height();
        let transform = tiny_skia::Transform::from_scale(sx, sy);
        resvg::render(tree, transform, &mut pixmap.as_mut());

        // Convert from premultiplied RGBA to straight RGBA
        let data = pixmap.data();
        let mut rgba = Vec::with_capacity(data.len());
        for chunk in data.chunks_exact(4) {
            let a = chunk[3] as f32 / 255.0;
            if a > 0.0 {
                rgba.push((chunk[0] as f32 / a).min(255.0) as u8);
                rgba.push((chunk[1] as f32 / a).min(255.0) as u8);
                rgba.push((chunk[2] as f32 / a).min(255.0) as u8);
                rgba.push(chunk[3]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }

        RasterImage::from_rgba(rgba, size.width, size.height).unwrap_or_default()
    }
}

impl std::fmt::Debug for ResvgRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResvgRenderer")
            .field("valid", &self.is_valid())
            .field("default_size", &self.default_size())
            .finish()
    }
}
