//! Core types: icon modes, states, variant keys and pixel sizes.

use std::fmt;

// ============================================================================
// Icon Mode
// ============================================================================

/// Visual mode an icon is requested in.
///
/// Modes have no natural ordering. When an exact variant is missing, the
/// substitute is chosen by the precedence tables in
/// [`resolver`](crate::resolver), never by discriminant order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconMode {
    /// Default appearance.
    #[default]
    Normal,
    /// The widget is not interactive.
    Disabled,
    /// The user is interacting with the widget (hover, press).
    Active,
    /// The item is selected.
    Selected,
}

impl IconMode {
    /// All modes, in code order.
    pub const ALL: [IconMode; 4] = [
        IconMode::Normal,
        IconMode::Disabled,
        IconMode::Active,
        IconMode::Selected,
    ];

    /// Stable integer code used in variant keys and archives.
    pub fn code(self) -> u32 {
        match self {
            IconMode::Normal => 0,
            IconMode::Disabled => 1,
            IconMode::Active => 2,
            IconMode::Selected => 3,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(IconMode::Normal),
            1 => Some(IconMode::Disabled),
            2 => Some(IconMode::Active),
            3 => Some(IconMode::Selected),
            _ => None,
        }
    }
}

// ============================================================================
// Icon State
// ============================================================================

/// Toggle state an icon is requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconState {
    /// The widget is checked/toggled on.
    On,
    /// The widget is unchecked.
    #[default]
    Off,
}

impl IconState {
    /// Both states, in code order.
    pub const ALL: [IconState; 2] = [IconState::On, IconState::Off];

    /// Stable integer code used in variant keys and archives.
    pub fn code(self) -> u32 {
        match self {
            IconState::On => 0,
            IconState::Off => 1,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(IconState::On),
            1 => Some(IconState::Off),
            _ => None,
        }
    }

    /// The other state.
    pub fn opposite(self) -> Self {
        match self {
            IconState::On => IconState::Off,
            IconState::Off => IconState::On,
        }
    }
}

// ============================================================================
// Variant Key
// ============================================================================

/// Hash key for one (mode, state) variant.
///
/// Encoded as `(mode << 4) | state`, which is distinct for all eight pairs
/// and is also the key used in persisted archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey(u32);

impl VariantKey {
    /// Create the key for a mode/state pair.
    pub fn new(mode: IconMode, state: IconState) -> Self {
        Self((mode.code() << 4) | state.code())
    }

    /// Decode a raw key, rejecting values that do not name a known pair.
    pub fn from_raw(raw: u32) -> Option<Self> {
        let mode = IconMode::from_code(raw >> 4)?;
        let state = IconState::from_code(raw & 0xF)?;
        Some(Self::new(mode, state))
    }

    /// The raw integer encoding.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// The mode component.
    pub fn mode(self) -> IconMode {
        IconMode::from_code(self.0 >> 4).unwrap_or_default()
    }

    /// The state component.
    pub fn state(self) -> IconState {
        IconState::from_code(self.0 & 0xF).unwrap_or_default()
    }
}

impl From<(IconMode, IconState)> for VariantKey {
    fn from((mode, state): (IconMode, IconState)) -> Self {
        Self::new(mode, state)
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.mode(), self.state())
    }
}

// ============================================================================
// Pixel Size
// ============================================================================

/// An integer size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    /// Check if the size has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Scale this size to the largest size that fits inside `bound` while
    /// keeping the aspect ratio.
    ///
    /// An empty size has no aspect ratio and is returned unchanged.
    pub fn scaled_to_fit(self, bound: PixelSize) -> PixelSize {
        if self.is_empty() {
            return self;
        }

        let (w, h) = (self.width as u64, self.height as u64);
        let (bw, bh) = (bound.width as u64, bound.height as u64);

        // Width needed if we use the full bound height
        let rw = bh * w / h;
        if rw <= bw {
            PixelSize::new(rw as u32, bound.height)
        } else {
            PixelSize::new(bound.width, (bw * h / w) as u32)
        }
    }

    /// Pixel size for a logical size on a display with the given scale
    /// factor, rounded to the nearest pixel.
    pub fn from_logical(width: f32, height: f32, scale_factor: f64) -> Self {
        let w = (width as f64 * scale_factor).round().max(0.0) as u32;
        let h = (height as f64 * scale_factor).round().max(0.0) as u32;
        Self::new(w, h)
    }
}

impl From<(u32, u32)> for PixelSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_variant_keys_are_distinct() {
        let keys: HashSet<u32> = IconMode::ALL
            .iter()
            .flat_map(|&m| IconState::ALL.map(|s| VariantKey::new(m, s).raw()))
            .collect();
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn test_variant_key_components() {
        let key = VariantKey::new(IconMode::Selected, IconState::Off);
        assert_eq!(key.raw(), 0x31);
        assert_eq!(key.mode(), IconMode::Selected);
        assert_eq!(key.state(), IconState::Off);
        assert_eq!(VariantKey::from_raw(0x31), Some(key));
    }

    #[test]
    fn test_variant_key_rejects_unknown() {
        assert_eq!(VariantKey::from_raw(0x40), None);
        assert_eq!(VariantKey::from_raw(0x02), None);
    }

    #[test]
    fn test_state_opposite() {
        assert_eq!(IconState::On.opposite(), IconState::Off);
        assert_eq!(IconState::Off.opposite(), IconState::On);
    }

    #[test]
    fn test_scaled_to_fit_width_bound() {
        let size = PixelSize::new(100, 50).scaled_to_fit(PixelSize::new(40, 40));
        assert_eq!(size, PixelSize::new(40, 20));
    }

    #[test]
    fn test_scaled_to_fit_height_bound() {
        let size = PixelSize::new(24, 48).scaled_to_fit(PixelSize::new(32, 32));
        assert_eq!(size, PixelSize::new(16, 32));
    }

    #[test]
    fn test_scaled_to_fit_upscales() {
        let size = PixelSize::new(16, 16).scaled_to_fit(PixelSize::new(64, 64));
        assert_eq!(size, PixelSize::new(64, 64));
    }

    #[test]
    fn test_scaled_to_fit_degenerate_bound() {
        let size = PixelSize::new(24, 24).scaled_to_fit(PixelSize::new(0, 32));
        assert!(size.is_empty());
    }

    #[test]
    fn test_from_logical() {
        let size = PixelSize::from_logical(16.0, 16.0, 1.5);
        assert_eq!(size, PixelSize::new(24, 24));
        let size = PixelSize::from_logical(24.0, 12.0, 2.0);
        assert_eq!(size, PixelSize::new(48, 24));
    }
}
