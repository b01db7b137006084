//! Raster caching with LRU eviction.
//!
//! The icon engine talks to its cache through the [`RasterCache`] trait,
//! keyed by opaque strings (see [`pixmap_cache_key`](crate::pixmap_cache_key)).
//! [`PixmapCache`] is the bundled implementation: a size-bounded LRU cache
//! that can be shared between engines and threads.
//!
//! # Example
//!
//! ```ignore
//! use horizon_lattice_svgicon::{PixmapCache, PixmapCacheConfig, RasterCache};
//!
//! let cache = PixmapCache::new(PixmapCacheConfig::default().with_max_size_mb(10));
//! cache.insert("key".to_string(), image);
//! assert!(cache.find("key").is_some());
//! ```

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::trace;

use crate::raster::RasterImage;

/// Process-wide default cache, shared by engines created without an explicit cache.
static GLOBAL_PIXMAP_CACHE: OnceLock<Arc<PixmapCache>> = OnceLock::new();

/// A string-keyed store of rendered images.
///
/// Implementations own their eviction policy and must be safe for
/// concurrent use; engines call both methods through a shared reference.
pub trait RasterCache: Send + Sync {
    /// Look up an image.
    fn find(&self, key: &str) -> Option<RasterImage>;

    /// Store an image under `key`, replacing any previous entry.
    fn insert(&self, key: String, image: RasterImage);
}

/// Configuration for the pixmap cache.
#[derive(Debug, Clone)]
pub struct PixmapCacheConfig {
    /// Maximum cache size in bytes.
    /// When exceeded, least recently used entries are evicted.
    /// Default: 10 MB.
    pub max_size_bytes: usize,
    /// Whether to track access patterns for LRU eviction.
    /// Without it, eviction falls back to insertion order.
    /// Default: true.
    pub enable_lru: bool,
}

impl Default for PixmapCacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 10 * 1024 * 1024, // 10 MB
            enable_lru: true,
        }
    }
}

impl PixmapCacheConfig {
    /// Set the maximum cache size in megabytes.
    #[must_use]
    pub fn with_max_size_mb(mut self, mb: usize) -> Self {
        self.max_size_bytes = mb * 1024 * 1024;
        self
    }

    /// Set the maximum cache size in bytes.
    #[must_use]
    pub fn with_max_size_bytes(mut self, bytes: usize) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    /// Enable or disable LRU eviction tracking.
    #[must_use]
    pub fn with_lru(mut self, enable: bool) -> Self {
        self.enable_lru = enable;
        self
    }
}

/// Node in the LRU linked list.
struct LruNode {
    prev: Option<String>,
    next: Option<String>,
}

/// Mutable cache state, guarded by the [`PixmapCache`] mutex.
#[derive(Default)]
struct CacheState {
    entries: HashMap<String, RasterImage>,
    lru_nodes: HashMap<String, LruNode>,
    /// Most recently used.
    lru_head: Option<String>,
    /// Least recently used.
    lru_tail: Option<String>,
    current_size: usize,
    hits: u64,
    misses: u64,
}

impl CacheState {
    fn remove(&mut self, key: &str) -> Option<RasterImage> {
        let image = self.entries.remove(key)?;
        self.current_size -= image.byte_len();
        self.lru_remove(key);
        Some(image)
    }

    fn lru_push_front(&mut self, key: String) {
        let node = LruNode {
            prev: None,
            next: self.lru_head.clone(),
        };

        if let Some(old_head) = &self.lru_head {
            if let Some(old_node) = self.lru_nodes.get_mut(old_head) {
                old_node.prev = Some(key.clone());
            }
        }

        if self.lru_tail.is_none() {
            self.lru_tail = Some(key.clone());
        }

        self.lru_head = Some(key.clone());
        self.lru_nodes.insert(key, node);
    }

    fn lru_move_to_front(&mut self, key: &str) {
        if self.lru_head.as_deref() == Some(key) {
            return;
        }
        self.lru_remove(key);
        self.lru_push_front(key.to_owned());
    }

    fn lru_remove(&mut self, key: &str) {
        let Some(node) = self.lru_nodes.remove(key) else {
            return;
        };

        match &node.prev {
            Some(prev_key) => {
                if let Some(prev_node) = self.lru_nodes.get_mut(prev_key) {
                    prev_node.next = node.next.clone();
                }
            }
            None => self.lru_head = node.next.clone(),
        }

        match &node.next {
            Some(next_key) => {
                if let Some(next_node) = self.lru_nodes.get_mut(next_key) {
                    next_node.prev = node.prev.clone();
                }
            }
            None => self.lru_tail = node.prev.clone(),
        }
    }
}

/// An LRU cache of rendered icon images.
///
/// Entry sizes are the RGBA byte length of the image. Entries larger than
/// the whole cache are never stored. All methods take `&self`; the state is
/// behind a mutex so one cache can serve many engines.
pub struct PixmapCache {
    config: PixmapCacheConfig,
    state: Mutex<CacheState>,
}

impl PixmapCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: PixmapCacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Create a new cache with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PixmapCacheConfig::default())
    }

    /// Get the process-wide shared cache.
    pub fn global() -> Arc<PixmapCache> {
        let cache = GLOBAL_PIXMAP_CACHE.get_or_init(|| Arc::new(PixmapCache::with_defaults()));
        Arc::clone(cache)
    }

    /// Get the current cache size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.state.lock().current_size
    }

    /// Get the maximum cache size in bytes.
    #[inline]
    pub fn max_size_bytes(&self) -> usize {
        self.config.max_size_bytes
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Check if a key exists (without touching LRU order or statistics).
    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Remove an entry, returning it if present.
    pub fn remove(&self, key: &str) -> Option<RasterImage> {
        self.state.lock().remove(key)
    }

    /// Clear all entries. Statistics are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.lru_nodes.clear();
        state.lru_head = None;
        state.lru_tail = None;
        state.current_size = 0;
    }

    /// Get cache statistics.
    pub fn stats(&self) -> PixmapCacheStats {
        let state = self.state.lock();
        let total = state.hits + state.misses;
        PixmapCacheStats {
            entries: state.entries.len(),
            size_bytes: state.current_size,
            max_size_bytes: self.config.max_size_bytes,
            hits: state.hits,
            misses: state.misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                state.hits as f64 / total as f64
            },
        }
    }
}

impl RasterCache for PixmapCache {
    fn find(&self, key: &str) -> Option<RasterImage> {
        let mut state = self.state.lock();
        match state.entries.get(key).cloned() {
            Some(image) => {
                state.hits += 1;
                if self.config.enable_lru {
                    state.lru_move_to_front(key);
                }
                trace!(target: "horizon_lattice_svgicon::cache", key, "pixmap cache hit");
                Some(image)
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    fn insert(&self, key: String, image: RasterImage) {
        let entry_size = image.byte_len();
        let mut state = self.state.lock();

        state.remove(&key);

        // Don't insert if single entry is larger than max size
        if entry_size > self.config.max_size_bytes {
            return;
        }

        while state.current_size + entry_size > self.config.max_size_bytes {
            let Some(tail_key) = state.lru_tail.clone() else {
                break;
            };
            trace!(target: "horizon_lattice_svgicon::cache", key = %tail_key, "evicting pixmap");
            state.remove(&tail_key);
        }

        state.entries.insert(key.clone(), image);
        state.current_size += entry_size;
        // Insertion order is still tracked without LRU so eviction has a victim.
        state.lru_push_front(key);
    }
}

impl Default for PixmapCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for PixmapCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("PixmapCache")
            .field("entries", &stats.entries)
            .field("size_mb", &stats.size_mb())
            .field("max_size_mb", &stats.max_size_mb())
            .field("hit_rate", &format!("{:.1}%", stats.hit_rate * 100.0))
            .finish()
    }
}

/// Statistics about a [`PixmapCache`].
#[derive(Debug, Clone)]
pub struct PixmapCacheStats {
    /// Number of entries in the cache.
    pub entries: usize,
    /// Current size in bytes.
    pub size_bytes: usize,
    /// Maximum size in bytes.
    pub max_size_bytes: usize,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

impl PixmapCacheStats {
    /// Get the current size in megabytes.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }

    /// Get the maximum size in megabytes.
    pub fn max_size_mb(&self) -> f64 {
        self.max_size_bytes as f64 / 1024.0 / 1024.0
    }
}
