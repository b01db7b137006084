//! Pixmap cache keys.

use crate::types::{IconMode, IconState, PixelSize};

/// Namespace prefix shared by every key this crate generates.
pub const KEY_PREFIX: &str = "$lattice_svgicon_";

const DIMENSION_MASK: u64 = 0xFF_FFFF;

/// Pack a request into one integer: 24 bits width, 24 bits height, mode in
/// bits 4..16, state in bits 0..4.
fn pack_request(size: PixelSize, mode: IconMode, state: IconState) -> u64 {
    ((size.width as u64 & DIMENSION_MASK) << 40)
        | ((size.height as u64 & DIMENSION_MASK) << 16)
        | ((mode.code() as u64) << 4)
        | state.code() as u64
}

/// Check if `size` fits the key packing. Larger dimensions would alias
/// smaller ones, so such requests must not use the cache.
pub fn is_cacheable(size: PixelSize) -> bool {
    u64::from(size.width) <= DIMENSION_MASK && u64::from(size.height) <= DIMENSION_MASK
}

/// Build the raster cache key for a request against an engine whose serial
/// number is `serial`.
///
/// Equal inputs always give equal keys. Since the serial changes on every
/// source mutation, keys built before a mutation are never produced again.
pub fn pixmap_cache_key(serial: u64, size: PixelSize, mode: IconMode, state: IconState) -> String {
    let packed = pack_request(size, mode, state);
    format!("{KEY_PREFIX}{serial:x}_{packed:x}")
}
