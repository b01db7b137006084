//! Scalable icon engine for Horizon Lattice.
//!
//! This crate turns a set of per-variant icon sources (SVG files, in-memory
//! SVG data, and prebuilt raster overrides) into raster images on demand.
//! A variant is an [`IconMode`] and [`IconState`] pair; when the requested
//! variant has no usable source, the engine falls back through a fixed
//! precedence order (see [`resolver`]) and restyles the result for the
//! requested mode.
//!
//! # Getting Started
//!
//! ```no_run
//! use horizon_lattice_svgicon::{IconMode, IconState, PixelSize, SvgIconEngine};
//!
//! let mut engine = SvgIconEngine::new();
//! engine.add_file("icons/open.svg", IconMode::Normal, IconState::Off);
//! engine.add_file("icons/open-active.svg", IconMode::Active, IconState::Off);
//!
//! // Rendered once, then served from the pixmap cache
//! let image = engine.pixmap(PixelSize::new(32, 32), IconMode::Selected, IconState::Off);
//! println!("rendered {}", image.size());
//! ```
//!
//! # Caching
//!
//! Rendered images are stored in a [`RasterCache`] under a key derived from
//! the engine's serial number and the request. The serial changes whenever
//! the engine's sources change, so stale entries are never returned; they
//! age out of the cache through LRU eviction.
//!
//! By default all engines share [`PixmapCache::global`]. Supply another
//! cache with [`SvgIconEngine::with_cache`].
//!
//! # Persistence
//!
//! [`SvgIconEngine::write_archive`] captures all sources (reading file
//! sources into memory) as an [`IconArchive`] that serializes to JSON;
//! [`SvgIconEngine::read_archive`] restores it.

mod appearance;
mod cache;
mod cache_key;
mod engine;
mod error;
mod file_type;
pub mod persist;
mod raster;
mod registry;
mod renderer;
pub mod resolver;
mod serial;
mod types;

// Engine
pub use engine::SvgIconEngine;
pub use error::{IconError, IconResult};

// Variant model
pub use registry::{SourceEntry, SourceKind, SourceRegistry};
pub use types::{IconMode, IconState, PixelSize, VariantKey};

// Rendering
pub use appearance::{ModeAppearance, TintAppearance};
pub use raster::RasterImage;
pub use renderer::{RenderOptions, RendererFactory, ResvgRenderer, VectorRenderer, resvg_factory};

// Caching
pub use cache::{PixmapCache, PixmapCacheConfig, PixmapCacheStats, RasterCache};
pub use cache_key::{KEY_PREFIX, is_cacheable, pixmap_cache_key};
pub use serial::SerialAllocator;

// Files and persistence
pub use file_type::{FileType, classify_bytes, detect_file_type};
pub use persist::IconArchive;

// Re-export resvg for custom renderer implementations
pub use resvg;
