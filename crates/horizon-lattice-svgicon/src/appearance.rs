//! Mode appearance adjustment.
//!
//! When the engine has to substitute a source from another mode (for
//! example a Normal source for a Disabled request), it asks a
//! [`ModeAppearance`] to restyle the raster for the requested mode.

use crate::raster::RasterImage;
use crate::types::IconMode;

/// Restyles a rendered icon for a mode it was not drawn for.
pub trait ModeAppearance: Send + Sync {
    /// Produce the `mode` look of `image`.
    ///
    /// Returns `None` (or a null image) when the mode has no distinct look;
    /// the engine then keeps the original raster.
    fn apply(&self, mode: IconMode, image: &RasterImage) -> Option<RasterImage>;
}

/// Default appearance adapter based on per-pixel tinting.
///
/// # Tinting Behavior
///
/// - **Disabled**: converts to grayscale and scales opacity by
///   `disabled_opacity`
/// - **Selected**: multiplies channels by `selected_tint` (a slight blue
///   tint by default)
/// - **Normal / Active**: no distinct look
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TintAppearance {
    /// Opacity multiplier for disabled icons. Default: 0.4.
    pub disabled_opacity: f32,
    /// RGB multipliers for selected icons. Default: `[0.9, 0.9, 1.1]`.
    pub selected_tint: [f32; 3],
}

impl Default for TintAppearance {
    fn default() -> Self {
        Self {
            disabled_opacity: 0.4,
            selected_tint: [0.9, 0.9, 1.1],
        }
    }
}

impl TintAppearance {
    /// Set the disabled opacity multiplier.
    #[must_use]
    pub fn with_disabled_opacity(mut self, opacity: f32) -> Self {
        self.disabled_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the selected tint multipliers.
    #[must_use]
    pub fn with_selected_tint(mut self, tint: [f32; 3]) -> Self {
        self.selected_tint = tint;
        self
    }
}

fn scale_channel(value: u8, factor: f32) -> u8 {
    (value as f32 * factor).round().clamp(0.0, 255.0) as u8
}

impl ModeAppearance for TintAppearance {
    fn apply(&self, mode: IconMode, image: &RasterImage) -> Option<RasterImage> {
        if image.is_null() {
            return None;
        }

        match mode {
            IconMode::Normal | IconMode::Active => None,
            IconMode::Disabled => {
                let opacity = self.disabled_opacity;
                Some(image.map_pixels(|[r, g, b, a]| {
                    // Rec. 601 luma
                    let luma = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
                        .round()
                        .clamp(0.0, 255.0) as u8;
                    [luma, luma, luma, scale_channel(a, opacity)]
                }))
            }
            IconMode::Selected => {
                let [tr, tg, tb] = self.selected_tint;
                Some(image.map_pixels(|[r, g, b, a]| {
                    [
                        scale_channel(r, tr),
                        scale_channel(g, tg),
                        scale_channel(b, tb),
                        a,
                    ]
                }))
            }
        }
    }
}
