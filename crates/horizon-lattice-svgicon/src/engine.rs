//! The scalable icon engine.
//!
//! [`SvgIconEngine`] owns the registered sources of one icon and turns
//! requests for `(size, mode, state)` into raster images:
//!
//! 1. A cached raster for the exact request is returned as-is.
//! 2. A raster override registered for exactly `(mode, state)` at exactly
//!    the requested size is returned as-is.
//! 3. Otherwise the best available vector source is found with the
//!    [`resolver`](crate::resolver), rendered at the requested size with its
//!    aspect ratio preserved, restyled if it came from another mode, cached,
//!    and returned.
//!
//! Every failure along the way yields the null image.
//!
//! # Example
//!
//! ```ignore
//! use horizon_lattice_svgicon::{IconMode, IconState, PixelSize, SvgIconEngine};
//!
//! let mut engine = SvgIconEngine::new();
//! engine.add_file("icons/save.svg", IconMode::Normal, IconState::Off);
//!
//! // Disabled look is derived from the Normal source
//! let image = engine.pixmap(PixelSize::new(24, 24), IconMode::Disabled, IconState::Off);
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::appearance::{ModeAppearance, TintAppearance};
use crate::cache::{PixmapCache, RasterCache};
use crate::cache_key::{is_cacheable, pixmap_cache_key};
use crate::error::{IconError, IconResult};
use crate::file_type::detect_file_type;
use crate::persist::{self, IconArchive};
use crate::raster::RasterImage;
use crate::registry::{SourceEntry, SourceRegistry};
use crate::renderer::{RenderOptions, RendererFactory, VectorRenderer, resvg_factory};
use crate::resolver;
use crate::serial::next_serial;
use crate::types::{IconMode, IconState, PixelSize, VariantKey};

/// Icon engine rendering registered SVG sources on demand.
///
/// # Cloning
///
/// A clone gets its own copy of the registered sources and a new serial
/// number, so it never shares cache entries with the original. The cache,
/// appearance adapter and renderer factory are shared.
///
/// # Thread Safety
///
/// Mutating methods take `&mut self`. [`pixmap`](Self::pixmap) and
/// [`actual_size`](Self::actual_size) take `&self` and may run concurrently;
/// they block while decoding and rasterizing.
pub struct SvgIconEngine {
    registry: SourceRegistry,
    serial: u64,
    options: RenderOptions,
    cache: Arc<dyn RasterCache>,
    appearance: Option<Arc<dyn ModeAppearance>>,
    renderer_factory: RendererFactory,
}

impl SvgIconEngine {
    /// Engine key identifying this icon engine kind.
    pub const KEY: &'static str = "svg";

    /// Create an empty engine using the global [`PixmapCache`], the
    /// default [`TintAppearance`] and resvg rendering.
    pub fn new() -> Self {
        Self::with_collaborators(
            PixmapCache::global(),
            Some(Arc::new(TintAppearance::default())),
            resvg_factory(),
        )
    }

    /// Create an empty engine with explicit collaborators.
    pub fn with_collaborators(
        cache: Arc<dyn RasterCache>,
        appearance: Option<Arc<dyn ModeAppearance>>,
        renderer_factory: RendererFactory,
    ) -> Self {
        Self {
            registry: SourceRegistry::new(),
            serial: next_serial(),
            options: RenderOptions::default(),
            cache,
            appearance,
            renderer_factory,
        }
    }

    /// Use a specific raster cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn RasterCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Use a specific appearance adapter, or none to never restyle.
    #[must_use]
    pub fn with_appearance(mut self, appearance: Option<Arc<dyn ModeAppearance>>) -> Self {
        self.appearance = appearance;
        self
    }

    /// Use a custom renderer backend.
    #[must_use]
    pub fn with_renderer_factory(mut self, factory: RendererFactory) -> Self {
        self.renderer_factory = factory;
        self
    }

    /// Set the options passed to the renderer.
    #[must_use]
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// The engine key, always `"svg"`.
    pub fn key(&self) -> &'static str {
        Self::KEY
    }

    /// Current serial number. Changes whenever sources change.
    pub fn serial_number(&self) -> u64 {
        self.serial
    }

    /// Check if no sources are registered.
    pub fn is_null(&self) -> bool {
        self.registry.is_empty()
    }

    /// The registered sources.
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// The render options.
    pub fn render_options(&self) -> &RenderOptions {
        &self.options
    }

    fn step_serial(&mut self) {
        self.serial = next_serial();
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a file for a variant.
    ///
    /// SVG and compressed SVG files are validated by loading them once and
    /// registered by absolute path only if they load. Other files are
    /// decoded as raster images and registered as overrides. Empty paths
    /// and files that fail to load are ignored.
    pub fn add_file(&mut self, path: impl AsRef<Path>, mode: IconMode, state: IconState) {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return;
        }
        let abs = std::path::absolute(path).unwrap_or_else(|_| path.into());

        if detect_file_type(&abs).is_svg() {
            let options = self.file_options(&abs);
            let mut renderer = (self.renderer_factory)();
            if renderer.load_file(&abs, &options) {
                self.step_serial();
                debug!(
                    target: "horizon_lattice_svgicon::engine",
                    path = %abs.display(),
                    ?mode,
                    ?state,
                    "registered SVG file"
                );
                self.registry
                    .put(VariantKey::new(mode, state), SourceEntry::FilePath(abs));
            } else {
                debug!(
                    target: "horizon_lattice_svgicon::engine",
                    path = %abs.display(),
                    "ignoring invalid SVG file"
                );
            }
        } else {
            match std::fs::read(&abs)
                .map_err(IconError::from)
                .and_then(|bytes| RasterImage::decode(&bytes))
            {
                Ok(image) if !image.is_null() => self.add_pixmap(image, mode, state),
                Ok(_) => {}
                Err(e) => {
                    debug!(
                        target: "horizon_lattice_svgicon::engine",
                        path = %abs.display(),
                        "ignoring unreadable icon file: {}",
                        e
                    );
                }
            }
        }
    }

    /// Register in-memory SVG data (plain or gzip-compressed) for a variant.
    ///
    /// The data is not validated here; a variant whose data fails to load
    /// is skipped during resolution.
    pub fn add_data(&mut self, data: impl Into<Vec<u8>>, mode: IconMode, state: IconState) {
        self.step_serial();
        let entry = SourceEntry::RawBytes(data.into());
        self.registry.put(VariantKey::new(mode, state), entry);
    }

    /// Register a raster override for a variant.
    ///
    /// The override is returned unchanged for requests of exactly its size.
    pub fn add_pixmap(&mut self, image: RasterImage, mode: IconMode, state: IconState) {
        self.step_serial();
        let entry = SourceEntry::PrebuiltImage(image);
        self.registry.put(VariantKey::new(mode, state), entry);
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// The raster cache key for a request against the current sources.
    pub fn cache_key(&self, size: PixelSize, mode: IconMode, state: IconState) -> String {
        pixmap_cache_key(self.serial, size, mode, state)
    }

    /// Render the icon for a request.
    ///
    /// The result fits within `size` with the source's aspect ratio, so it
    /// may be smaller than `size` in one dimension. Returns the null image
    /// if nothing can be rendered.
    pub fn pixmap(&self, size: PixelSize, mode: IconMode, state: IconState) -> RasterImage {
        // Oversized requests have no unique key and bypass the cache
        let key = is_cacheable(size).then(|| self.cache_key(size, mode, state));
        if let Some(cached) = key.as_deref().and_then(|k| self.cache.find(k)) {
            return cached;
        }

        if let Some(image) = self.exact_override(size, mode, state) {
            return image.clone();
        }

        let mut renderer = (self.renderer_factory)();
        let resolved =
            resolver::resolve(mode, state, |m, s| self.try_load(renderer.as_mut(), m, s));
        let Some((load_mode, load_state)) = resolved else {
            trace!(
                target: "horizon_lattice_svgicon::engine",
                ?mode,
                ?state,
                "no source available"
            );
            return RasterImage::null();
        };

        if !renderer.is_valid() {
            return RasterImage::null();
        }

        let default_size = renderer.default_size();
        let render_size = if default_size.is_empty() {
            size
        } else {
            default_size.scaled_to_fit(size)
        };
        if render_size.is_empty() {
            return RasterImage::null();
        }

        let mut image = renderer.render_to_image(render_size);

        if load_mode != mode && mode != IconMode::Normal {
            if let Some(appearance) = &self.appearance {
                if let Some(styled) = appearance.apply(mode, &image).filter(|i| !i.is_null()) {
                    image = styled;
                }
            }
        }

        trace!(
            target: "horizon_lattice_svgicon::engine",
            ?load_mode,
            ?load_state,
            size = %image.size(),
            "rendered icon"
        );
        if let Some(key) = key.filter(|_| !image.is_null()) {
            self.cache.insert(key, image.clone());
        }

        image
    }

    /// The size [`pixmap`](Self::pixmap) would return for a request, or
    /// zero if nothing can be rendered.
    pub fn actual_size(&self, size: PixelSize, mode: IconMode, state: IconState) -> PixelSize {
        if self.exact_override(size, mode, state).is_some() {
            return size;
        }

        let image = self.pixmap(size, mode, state);
        if image.is_null() {
            PixelSize::ZERO
        } else {
            image.size()
        }
    }

    /// The pixel size to request for a painter target given in logical units
    /// on a display with `scale_factor` device pixels per logical pixel.
    pub fn paint_size(logical_width: f32, logical_height: f32, scale_factor: f64) -> PixelSize {
        PixelSize::from_logical(logical_width, logical_height, scale_factor)
    }

    /// Render for a painter target given in logical units.
    pub fn paint_pixmap(
        &self,
        logical_width: f32,
        logical_height: f32,
        scale_factor: f64,
        mode: IconMode,
        state: IconState,
    ) -> RasterImage {
        let size = Self::paint_size(logical_width, logical_height, scale_factor);
        self.pixmap(size, mode, state)
    }

    fn exact_override(
        &self,
        size: PixelSize,
        mode: IconMode,
        state: IconState,
    ) -> Option<&RasterImage> {
        self.registry
            .pixmap(VariantKey::new(mode, state))
            .filter(|image| image.size() == size)
    }

    fn file_options(&self, path: &Path) -> RenderOptions {
        match path.parent() {
            Some(dir) => self.options.clone().with_resources_dir(dir),
            None => self.options.clone(),
        }
    }

    /// Load the vector source for one variant, file first, then bytes.
    fn try_load(
        &self,
        renderer: &mut dyn VectorRenderer,
        mode: IconMode,
        state: IconState,
    ) -> bool {
        let key = VariantKey::new(mode, state);

        if let Some(path) = self.registry.file(key) {
            if renderer.load_file(path, &self.file_options(path)) {
                return true;
            }
            debug!(
                target: "horizon_lattice_svgicon::engine",
                %key,
                path = %path.display(),
                "registered SVG file failed to load"
            );
        }

        if let Some(data) = self.registry.bytes(key) {
            if renderer.load_data(data, &self.options) {
                return true;
            }
            debug!(
                target: "horizon_lattice_svgicon::engine",
                %key,
                "registered SVG data failed to load"
            );
        }

        false
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Save the registered sources.
    pub fn write_archive(&self) -> IconResult<IconArchive> {
        persist::archive_registry(&self.registry)
    }

    /// Replace the registered sources with those in `archive`.
    ///
    /// On error the engine is left unchanged.
    pub fn read_archive(&mut self, archive: &IconArchive) -> IconResult<()> {
        self.registry = persist::restore_registry(archive)?;
        self.step_serial();
        Ok(())
    }
}

impl Default for SvgIconEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SvgIconEngine {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            serial: next_serial(),
            options: self.options.clone(),
            cache: Arc::clone(&self.cache),
            appearance: self.appearance.clone(),
            renderer_factory: Arc::clone(&self.renderer_factory),
        }
    }
}

impl std::fmt::Debug for SvgIconEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgIconEngine")
            .field("serial", &self.serial)
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PixmapCacheConfig;

    const SQUARE_SVG: &[u8] = br#"
        <svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24">
            <rect width="24" height="24" fill="red"/>
        </svg>
    "#;

    const WIDE_SVG: &[u8] = br#"
        <svg xmlns="http://www.w3.org/2000/svg" width="100" height="50">
            <rect width="100" height="50" fill="blue"/>
        </svg>
    "#;

    fn engine() -> SvgIconEngine {
        SvgIconEngine::new()
            .with_cache(Arc::new(PixmapCache::new(PixmapCacheConfig::default())))
            .with_render_options(RenderOptions::default().with_system_fonts(false))
    }

    #[test]
    fn test_new_engine_is_null() {
        let engine = engine();
        assert!(engine.is_null());
        assert_eq!(engine.key(), "svg");
    }

    #[test]
    fn test_empty_engine_renders_nothing() {
        let engine = engine();
        for mode in IconMode::ALL {
            for state in IconState::ALL {
                let image = engine.pixmap(PixelSize::new(16, 16), mode, state);
                assert!(image.is_null());
                let size = engine.actual_size(PixelSize::new(16, 16), mode, state);
                assert_eq!(size, PixelSize::ZERO);
            }
        }
    }

    #[test]
    fn test_render_exact_variant() {
        let mut engine = engine();
        engine.add_data(SQUARE_SVG, IconMode::Normal, IconState::Off);

        let image = engine.pixmap(PixelSize::new(32, 32), IconMode::Normal, IconState::Off);
        assert_eq!(image.size(), PixelSize::new(32, 32));
        assert!(image.as_bytes()[0] > 200);
    }

    #[test]
    fn test_aspect_ratio_preserved() {
        let mut engine = engine();
        engine.add_data(WIDE_SVG, IconMode::Normal, IconState::Off);
        assert_eq!(
            engine.actual_size(PixelSize::new(40, 40), IconMode::Normal, IconState::Off),
            PixelSize::new(40, 20)
        );
    }

    #[test]
    fn test_degenerate_request() {
        let mut engine = engine();
        engine.add_data(SQUARE_SVG, IconMode::Normal, IconState::Off);
        let image = engine.pixmap(PixelSize::new(0, 16), IconMode::Normal, IconState::Off);
        assert!(image.is_null());
    }

    #[test]
    fn test_mutation_changes_serial() {
        let mut engine = engine();
        let first = engine.serial_number();
        engine.add_data(SQUARE_SVG, IconMode::Normal, IconState::Off);
        let second = engine.serial_number();
        let override_image = RasterImage::transparent(4, 4);
        engine.add_pixmap(override_image, IconMode::Active, IconState::On);
        let third = engine.serial_number();
        assert!(second > first);
        assert!(third > second);
    }

    #[test]
    fn test_disabled_fallback_is_restyled() {
        let mut engine = engine();
        engine.add_data(SQUARE_SVG, IconMode::Normal, IconState::Off);

        let normal = engine.pixmap(PixelSize::new(8, 8), IconMode::Normal, IconState::Off);
        let disabled = engine.pixmap(PixelSize::new(8, 8), IconMode::Disabled, IconState::Off);

        assert_eq!(disabled.size(), normal.size());
        assert_ne!(disabled, normal);
        let px = &disabled.as_bytes()[..4];
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn test_active_fallback_is_not_restyled() {
        let mut engine = engine();
        engine.add_data(SQUARE_SVG, IconMode::Normal, IconState::Off);

        let normal = engine.pixmap(PixelSize::new(8, 8), IconMode::Normal, IconState::Off);
        let active = engine.pixmap(PixelSize::new(8, 8), IconMode::Active, IconState::Off);
        assert_eq!(active, normal);
    }

    #[test]
    fn test_no_appearance_keeps_raster() {
        let mut engine = engine().with_appearance(None);
        engine.add_data(SQUARE_SVG, IconMode::Normal, IconState::Off);

        let normal = engine.pixmap(PixelSize::new(8, 8), IconMode::Normal, IconState::Off);
        let disabled = engine.pixmap(PixelSize::new(8, 8), IconMode::Disabled, IconState::Off);
        assert_eq!(disabled, normal);
    }

    #[test]
    fn test_add_file_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.svg");
        std::fs::write(&path, WIDE_SVG).unwrap();

        let mut engine = engine();
        engine.add_file(&path, IconMode::Selected, IconState::On);

        assert!(!engine.is_null());
        let key = VariantKey::new(IconMode::Selected, IconState::On);
        assert!(engine.registry().file(key).is_some());
        assert_eq!(
            engine.actual_size(PixelSize::new(50, 50), IconMode::Selected, IconState::On),
            PixelSize::new(50, 25)
        );
    }

    #[test]
    fn test_add_file_invalid_svg_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.svg");
        std::fs::write(&path, b"not an svg").unwrap();

        let mut engine = engine();
        let serial = engine.serial_number();
        engine.add_file(&path, IconMode::Normal, IconState::Off);

        assert!(engine.is_null());
        assert_eq!(engine.serial_number(), serial);
    }

    #[test]
    fn test_add_file_raster_becomes_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("icon.png");
        let image = RasterImage::from_rgba(vec![9; 16 * 16 * 4], 16, 16).unwrap();
        std::fs::write(&path, image.to_png().unwrap()).unwrap();

        let mut engine = engine();
        engine.add_file(&path, IconMode::Normal, IconState::Off);

        let out = engine.pixmap(PixelSize::new(16, 16), IconMode::Normal, IconState::Off);
        assert_eq!(out, image);
    }

    #[test]
    fn test_add_file_empty_path() {
        let mut engine = engine();
        engine.add_file("", IconMode::Normal, IconState::Off);
        assert!(engine.is_null());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut engine = engine();
        engine.add_data(SQUARE_SVG, IconMode::Normal, IconState::Off);

        let mut copy = engine.clone();
        assert_ne!(copy.serial_number(), engine.serial_number());

        copy.add_data(WIDE_SVG, IconMode::Normal, IconState::Off);
        assert_eq!(
            engine.actual_size(PixelSize::new(40, 40), IconMode::Normal, IconState::Off),
            PixelSize::new(40, 40)
        );
        assert_eq!(
            copy.actual_size(PixelSize::new(40, 40), IconMode::Normal, IconState::Off),
            PixelSize::new(40, 20)
        );
    }

    #[test]
    fn test_paint_size() {
        let size = SvgIconEngine::paint_size(16.0, 16.0, 1.5);
        assert_eq!(size, PixelSize::new(24, 24));
        let size = SvgIconEngine::paint_size(10.0, 5.0, 1.25);
        assert_eq!(size, PixelSize::new(13, 6));
    }

    #[test]
    fn test_with_collaborators() {
        let cache = Arc::new(PixmapCache::new(PixmapCacheConfig::default()));
        let mut engine = SvgIconEngine::with_collaborators(cache.clone(), None, resvg_factory())
            .with_render_options(RenderOptions::default().with_system_fonts(false));
        engine.add_data(SQUARE_SVG, IconMode::Normal, IconState::Off);

        let size = PixelSize::new(8, 8);
        engine.pixmap(size, IconMode::Normal, IconState::Off);
        let key = engine.cache_key(size, IconMode::Normal, IconState::Off);
        assert!(cache.contains(&key));
    }

    #[test]
    fn test_paint_pixmap_scales_logical_size() {
        let mut engine = engine();
        engine.add_data(SQUARE_SVG, IconMode::Normal, IconState::Off);
        let image = engine.paint_pixmap(16.0, 16.0, 2.0, IconMode::Normal, IconState::Off);
        assert_eq!(image.size(), PixelSize::new(32, 32));
    }

    #[test]
    fn test_archive_round_trip() {
        let mut engine = engine();
        engine.add_data(WIDE_SVG, IconMode::Normal, IconState::Off);
        let override_image = RasterImage::transparent(4, 4);
        engine.add_pixmap(override_image, IconMode::Active, IconState::On);

        let json = engine.write_archive().unwrap().to_json().unwrap();

        let mut restored = self::engine();
        let serial = restored.serial_number();
        let archive = IconArchive::from_json(&json).unwrap();
        restored.read_archive(&archive).unwrap();

        assert_ne!(restored.serial_number(), serial);
        assert_eq!(
            restored.actual_size(PixelSize::new(40, 40), IconMode::Normal, IconState::Off),
            PixelSize::new(40, 20)
        );
        assert_eq!(
            restored.actual_size(PixelSize::new(4, 4), IconMode::Active, IconState::On),
            PixelSize::new(4, 4)
        );
    }
}
