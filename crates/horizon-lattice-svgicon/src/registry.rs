//! Registered icon sources, keyed by variant.
//!
//! The registry is plain storage. It never validates anything: a path that
//! cannot be read or bytes that do not parse are only discovered when the
//! renderer tries to load them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::raster::RasterImage;
use crate::types::VariantKey;

/// One registered source for a variant.
#[derive(Clone, Debug)]
pub enum SourceEntry {
    /// Path to a vector file on disk.
    FilePath(PathBuf),
    /// In-memory vector data.
    RawBytes(Vec<u8>),
    /// A pre-rasterized override image.
    PrebuiltImage(RasterImage),
}

impl SourceEntry {
    /// The payload kind of this entry.
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceEntry::FilePath(_) => SourceKind::FilePath,
            SourceEntry::RawBytes(_) => SourceKind::RawBytes,
            SourceEntry::PrebuiltImage(_) => SourceKind::PrebuiltImage,
        }
    }
}

/// Payload kind of a [`SourceEntry`]. Each variant key holds at most one
/// entry per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    FilePath,
    RawBytes,
    PrebuiltImage,
}

/// Per-variant storage of vector sources and raster overrides.
///
/// Cloning deep-copies byte buffers and overrides; paths are duplicated by
/// value.
#[derive(Clone, Debug, Default)]
pub struct SourceRegistry {
    files: HashMap<VariantKey, PathBuf>,
    buffers: HashMap<VariantKey, Vec<u8>>,
    pixmaps: HashMap<VariantKey, RasterImage>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entry`, replacing any entry of the same kind for `key`.
    ///
    /// Returns the replaced entry, if any.
    pub fn put(&mut self, key: VariantKey, entry: SourceEntry) -> Option<SourceEntry> {
        match entry {
            SourceEntry::FilePath(path) => self.files.insert(key, path).map(SourceEntry::FilePath),
            SourceEntry::RawBytes(data) => {
                self.buffers.insert(key, data).map(SourceEntry::RawBytes)
            }
            SourceEntry::PrebuiltImage(image) => self
                .pixmaps
                .insert(key, image)
                .map(SourceEntry::PrebuiltImage),
        }
    }

    /// Get a copy of the entry of `kind` stored for `key`.
    pub fn get(&self, key: VariantKey, kind: SourceKind) -> Option<SourceEntry> {
        match kind {
            SourceKind::FilePath => self.file(key).map(|p| SourceEntry::FilePath(p.into())),
            SourceKind::RawBytes => self.bytes(key).map(|b| SourceEntry::RawBytes(b.to_vec())),
            SourceKind::PrebuiltImage => self.pixmap(key).cloned().map(SourceEntry::PrebuiltImage),
        }
    }

    /// Registered file path for `key`.
    pub fn file(&self, key: VariantKey) -> Option<&Path> {
        self.files.get(&key).map(PathBuf::as_path)
    }

    /// Registered vector bytes for `key`.
    pub fn bytes(&self, key: VariantKey) -> Option<&[u8]> {
        self.buffers
            .get(&key)
            .map(Vec::as_slice)
            .filter(|b| !b.is_empty())
    }

    /// Registered raster override for `key`.
    pub fn pixmap(&self, key: VariantKey) -> Option<&RasterImage> {
        self.pixmaps.get(&key).filter(|p| !p.is_null())
    }

    /// True iff no files, byte buffers or overrides are registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.buffers.is_empty() && self.pixmaps.is_empty()
    }

    /// Total number of entries across all kinds.
    pub fn len(&self) -> usize {
        self.files.len() + self.buffers.len() + self.pixmaps.len()
    }

    /// Iterate over registered files.
    pub fn files(&self) -> impl Iterator<Item = (VariantKey, &Path)> + '_ {
        self.files.iter().map(|(&k, p)| (k, p.as_path()))
    }

    /// Iterate over registered byte buffers.
    pub fn buffers(&self) -> impl Iterator<Item = (VariantKey, &[u8])> + '_ {
        self.buffers.iter().map(|(&k, b)| (k, b.as_slice()))
    }

    /// Iterate over registered overrides.
    pub fn pixmaps(&self) -> impl Iterator<Item = (VariantKey, &RasterImage)> + '_ {
        self.pixmaps.iter().map(|(&k, p)| (k, p))
    }

    /// Check if any override is registered.
    pub fn has_pixmaps(&self) -> bool {
        !self.pixmaps.is_empty()
    }
}
