//! CPU raster images produced by the icon engine.

use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::error::{IconError, IconResult};
use crate::types::PixelSize;

/// An RGBA8 raster image with straight (non-premultiplied) alpha.
///
/// Pixel data is shared between clones, so handing the same image out of a
/// cache many times does not copy it. A default-constructed image is the
/// *null* image, which is what every failed render path returns.
#[derive(Clone, Default)]
pub struct RasterImage {
    pixels: Option<Arc<RgbaImage>>,
}

impl RasterImage {
    /// The null image.
    pub fn null() -> Self {
        Self::default()
    }

    /// Wrap an `image` crate RGBA buffer.
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        Self {
            pixels: Some(Arc::new(image)),
        }
    }

    /// Create from straight-alpha RGBA bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not exactly `width * height * 4` bytes.
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> IconResult<Self> {
        RgbaImage::from_raw(width, height, data)
            .map(Self::from_rgba_image)
            .ok_or(IconError::InvalidDimensions { width, height })
    }

    /// A fully transparent image of the given size.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::from_rgba_image(RgbaImage::new(width, height))
    }

    /// Decode an encoded raster (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> IconResult<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_rgba_image(img.to_rgba8()))
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> IconResult<Vec<u8>> {
        let mut out = Vec::new();
        if let Some(pixels) = &self.pixels {
            pixels.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        }
        Ok(out)
    }

    /// Check if this is the null image or has zero area.
    pub fn is_null(&self) -> bool {
        self.size().is_empty()
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.as_ref().map_or(0, |p| p.width())
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.as_ref().map_or(0, |p| p.height())
    }

    /// Image size in pixels.
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width(), self.height())
    }

    /// Memory used by the pixel data in bytes.
    pub fn byte_len(&self) -> usize {
        self.pixels.as_ref().map_or(0, |p| p.as_raw().len())
    }

    /// Raw RGBA bytes (empty for the null image).
    pub fn as_bytes(&self) -> &[u8] {
        match &self.pixels {
            Some(p) => p.as_raw().as_slice(),
            None => &[],
        }
    }

    /// Check whether two images share the same pixel allocation.
    pub fn ptr_eq(&self, other: &RasterImage) -> bool {
        match (&self.pixels, &other.pixels) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Map every pixel through `f`, producing a new image.
    pub fn map_pixels<F>(&self, mut f: F) -> Self
    where
        F: FnMut([u8; 4]) -> [u8; 4],
    {
        let Some(src) = &self.pixels else {
            return Self::null();
        };
        let mut out = RgbaImage::clone(src);
        for px in out.pixels_mut() {
            px.0 = f(px.0);
        }
        Self::from_rgba_image(out)
    }
}

impl PartialEq for RasterImage {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for RasterImage {}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("size", &self.size())
            .field("null", &self.is_null())
            .finish()
    }
}
