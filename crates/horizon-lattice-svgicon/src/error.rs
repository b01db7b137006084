//! Error types for the svgicon crate.
//!
//! Rendering never fails loudly: every render-path failure degrades to an
//! empty [`RasterImage`](crate::RasterImage). These errors only surface from
//! archive (save/restore) operations.

use thiserror::Error;

/// Errors that can occur while saving or restoring an icon engine.
#[derive(Error, Debug)]
pub enum IconError {
    /// The archive could not be serialized or parsed.
    #[error("invalid icon archive: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a source file or compressing a buffer failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A base64 payload in the archive was malformed.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A compressed buffer could not be inflated.
    #[error("failed to decompress icon data: {0}")]
    Decompress(String),

    /// An archive key does not encode a known mode/state pair.
    #[error("invalid variant key: {0:#x}")]
    InvalidVariantKey(u32),

    /// A raster override could not be encoded or decoded.
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Raw pixel data did not match the declared dimensions.
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Result type for icon engine operations.
pub type IconResult<T> = Result<T, IconError>;
