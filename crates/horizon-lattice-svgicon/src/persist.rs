//! Saving and restoring registered icon sources.
//!
//! An [`IconArchive`] is a tagged union over the supported layouts (the
//! variant name is the JSON tag), so decoding is a single match:
//!
//! - `current`: vector buffers (file sources are read from disk and stored
//!   as buffers), optionally zlib-compressed, plus optional PNG overrides.
//! - `legacy`: one compressed buffer for the Normal/Off variant followed by
//!   a pixmap count whose pixmaps are ignored.
//!
//! Archives are JSON; binary payloads are base64.
//!
//! # Example
//!
//! ```ignore
//! let json = engine.write_archive()?.to_json()?;
//! let mut restored = SvgIconEngine::new();
//! restored.read_archive(&IconArchive::from_json(&json)?)?;
//! ```

use std::collections::BTreeMap;
use std::io::{Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IconError, IconResult};
use crate::raster::RasterImage;
use crate::registry::{SourceEntry, SourceRegistry};
use crate::types::{IconMode, IconState, VariantKey};

/// Serialized form of an icon engine's sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconArchive {
    /// Current layout.
    Current {
        /// Registered file paths by variant key. Informational only: file
        /// contents are also stored in `buffers` and restored from there.
        files: BTreeMap<u32, String>,
        /// Whether `buffers` are zlib-compressed.
        compressed: bool,
        /// Vector data by variant key (base64).
        buffers: BTreeMap<u32, String>,
        /// PNG-encoded overrides by variant key (base64), if any were set.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pixmaps: Option<BTreeMap<u32, String>>,
    },
    /// Single-buffer layout written by old versions.
    Legacy {
        /// Compressed vector data for Normal/Off (base64), may be empty.
        data: String,
        /// Number of pixmaps that followed; they are not restored.
        #[serde(default)]
        pixmap_count: u32,
    },
}

impl IconArchive {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> IconResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> IconResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check if this archive uses the legacy layout.
    pub fn is_legacy(&self) -> bool {
        matches!(self, IconArchive::Legacy { .. })
    }
}

/// Zlib-compress a buffer.
pub fn compress(data: &[u8]) -> IconResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Inflate a zlib-compressed buffer.
pub fn decompress(data: &[u8]) -> IconResult<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| IconError::Decompress(e.to_string()))?;
    Ok(out)
}

/// Build a current-format archive from a registry.
///
/// File sources are read from disk; a file that cannot be read is stored
/// as an empty buffer. A key with both a file and a buffer archives the
/// file's contents.
pub fn archive_registry(registry: &SourceRegistry) -> IconResult<IconArchive> {
    let mut buffers = BTreeMap::new();
    for (key, data) in registry.buffers() {
        buffers.insert(key.raw(), STANDARD.encode(compress(data)?));
    }

    // File contents replace a byte buffer under the same key, matching the
    // file-first load order
    let mut files = BTreeMap::new();
    for (key, path) in registry.files() {
        let data = std::fs::read(path).unwrap_or_else(|e| {
            warn!(
                target: "horizon_lattice_svgicon::persist",
                path = %path.display(),
                "cannot read icon source for archive: {}",
                e
            );
            Vec::new()
        });
        buffers.insert(key.raw(), STANDARD.encode(compress(&data)?));
        files.insert(key.raw(), path.to_string_lossy().into_owned());
    }

    let pixmaps = if registry.has_pixmaps() {
        let mut encoded = BTreeMap::new();
        for (key, image) in registry.pixmaps() {
            encoded.insert(key.raw(), STANDARD.encode(image.to_png()?));
        }
        Some(encoded)
    } else {
        None
    };

    Ok(IconArchive::Current {
        files,
        compressed: true,
        buffers,
        pixmaps,
    })
}

/// Rebuild a registry from an archive.
///
/// Restored vector sources are always in-memory buffers. Buffers that
/// cannot be inflated make the whole buffer table unusable; it is dropped
/// with a warning instead of failing the restore.
///
/// # Errors
///
/// Fails on malformed base64 or keys that do not name a variant.
pub fn restore_registry(archive: &IconArchive) -> IconResult<SourceRegistry> {
    let mut registry = SourceRegistry::new();

    match archive {
        IconArchive::Current {
            compressed,
            buffers,
            pixmaps,
            ..
        } => {
            let mut decoded = Vec::with_capacity(buffers.len());
            for (&raw, payload) in buffers {
                let key = VariantKey::from_raw(raw).ok_or(IconError::InvalidVariantKey(raw))?;
                decoded.push((key, STANDARD.decode(payload)?));
            }

            let inflated: IconResult<Vec<_>> = if *compressed {
                decoded
                    .into_iter()
                    .map(|(key, data)| Ok((key, decompress(&data)?)))
                    .collect()
            } else {
                Ok(decoded)
            };

            match inflated {
                Ok(entries) => {
                    for (key, data) in entries.into_iter().filter(|(_, d)| !d.is_empty()) {
                        registry.put(key, SourceEntry::RawBytes(data));
                    }
                }
                Err(e) => {
                    warn!(
                        target: "horizon_lattice_svgicon::persist",
                        "cannot decompress icon data, dropping vector sources: {}",
                        e
                    );
                }
            }

            for (&raw, payload) in pixmaps.iter().flatten() {
                let key = VariantKey::from_raw(raw).ok_or(IconError::InvalidVariantKey(raw))?;
                match RasterImage::decode(&STANDARD.decode(payload)?) {
                    Ok(image) => {
                        registry.put(key, SourceEntry::PrebuiltImage(image));
                    }
                    Err(e) => {
                        warn!(
                            target: "horizon_lattice_svgicon::persist",
                            %key,
                            "skipping undecodable pixmap override: {}",
                            e
                        );
                    }
                }
            }
        }
        IconArchive::Legacy { data, pixmap_count } => {
            let raw = STANDARD.decode(data)?;
            if !raw.is_empty() {
                match decompress(&raw) {
                    Ok(svg) if !svg.is_empty() => {
                        registry.put(
                            VariantKey::new(IconMode::Normal, IconState::Off),
                            SourceEntry::RawBytes(svg),
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(
                            target: "horizon_lattice_svgicon::persist",
                            "cannot decompress legacy icon data: {}",
                            e
                        );
                    }
                }
            }
            debug!(
                target: "horizon_lattice_svgicon::persist",
                ignored_pixmaps = pixmap_count,
                "restored legacy icon archive"
            );
        }
    }

    Ok(registry)
}
