//! Named palette entries as delivered by the profile-extraction side.

use crate::color::Srgb;

/// Texture score sentinel meaning "never measured".
///
/// Entries carrying this value are excluded from the texture penalty;
/// treating it as a real score would bury every unmeasured entry.
pub const TEXTURE_UNKNOWN: f32 = 999.0;

/// The exact color the extraction pipeline emits when it failed to
/// measure an entry. Entries with this mean color are real but
/// unreliable, so matching demotes them with a fixed penalty.
pub const FALLBACK_COLOR: [u8; 3] = [128, 128, 128];

/// A cluster sub-color from a multi-color profile, with its relative
/// area weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedColor {
    pub color: Srgb,
    pub weight: f32,
}

/// One matchable entry: a token name plus the measured color data.
///
/// Only `name` and `color` are required. Accent color, texture score
/// and the multi-cluster profile are optional refinements; matching
/// degrades gracefully without them.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    name: String,
    color: Srgb,
    accent: Option<Srgb>,
    texture: f32,
    clusters: Vec<WeightedColor>,
}

impl PaletteEntry {
    /// Create an entry with just a name and representative color.
    pub fn new(name: impl Into<String>, color: Srgb) -> Self {
        Self {
            name: name.into(),
            color,
            accent: None,
            texture: TEXTURE_UNKNOWN,
            clusters: Vec::new(),
        }
    }

    /// Attach a secondary accent color.
    pub fn with_accent(mut self, accent: Srgb) -> Self {
        self.accent = Some(accent);
        self
    }

    /// Attach a texture (busyness) score, 0 = flat.
    pub fn with_texture(mut self, score: f32) -> Self {
        self.texture = score;
        self
    }

    /// Attach a multi-cluster color profile.
    pub fn with_clusters(mut self, clusters: Vec<WeightedColor>) -> Self {
        self.clusters = clusters;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn color(&self) -> Srgb {
        self.color
    }

    #[inline]
    pub fn accent(&self) -> Option<Srgb> {
        self.accent
    }

    /// Raw texture score; [`TEXTURE_UNKNOWN`] when never measured.
    #[inline]
    pub fn texture(&self) -> f32 {
        self.texture
    }

    /// Texture score usable in the penalty term, `None` for the
    /// unknown sentinel.
    #[inline]
    pub fn known_texture(&self) -> Option<f32> {
        if self.texture >= TEXTURE_UNKNOWN {
            None
        } else {
            Some(self.texture)
        }
    }

    #[inline]
    pub fn clusters(&self) -> &[WeightedColor] {
        &self.clusters
    }

    /// Whether the mean color is the extraction-failure fallback value.
    pub fn is_fallback_color(&self) -> bool {
        self.color.to_bytes() == FALLBACK_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_entry() {
        let e = PaletteEntry::new("stone", Srgb::from_u8(120, 120, 125));
        assert_eq!(e.name(), "stone");
        assert!(e.accent().is_none());
        assert!(e.known_texture().is_none());
        assert!(e.clusters().is_empty());
        assert!(!e.is_fallback_color());
    }

    #[test]
    fn test_fallback_detection_is_exact() {
        let fallback = PaletteEntry::new("broken", Srgb::from_u8(128, 128, 128));
        assert!(fallback.is_fallback_color());
        // One step off is a legitimate mid-grey.
        let grey = PaletteEntry::new("grey", Srgb::from_u8(128, 128, 129));
        assert!(!grey.is_fallback_color());
    }

    #[test]
    fn test_texture_sentinel() {
        let unknown = PaletteEntry::new("a", Srgb::from_u8(1, 2, 3)).with_texture(999.0);
        assert!(unknown.known_texture().is_none());
        let measured = PaletteEntry::new("b", Srgb::from_u8(1, 2, 3)).with_texture(42.0);
        assert_eq!(measured.known_texture(), Some(42.0));
    }

    #[test]
    fn test_builder_composes() {
        let e = PaletteEntry::new("leaf", Srgb::from_u8(40, 160, 60))
            .with_accent(Srgb::from_u8(20, 90, 30))
            .with_texture(12.5)
            .with_clusters(vec![WeightedColor {
                color: Srgb::from_u8(45, 170, 65),
                weight: 80.0,
            }]);
        assert!(e.accent().is_some());
        assert_eq!(e.known_texture(), Some(12.5));
        assert_eq!(e.clusters().len(), 1);
    }
}
