//! Palette storage and validation.
//!
//! A [`Palette`] is an immutable, validated list of named entries. All
//! derived per-run state (projections, usage counters) lives outside
//! the palette so one palette can serve many conversions.

mod entry;
mod error;
pub(crate) mod index;
pub(crate) mod projection;

pub use entry::{PaletteEntry, WeightedColor, FALLBACK_COLOR, TEXTURE_UNKNOWN};
pub use error::PaletteError;

use std::collections::HashSet;

use tracing::debug;

use crate::palette::index::{PaletteIndex, INDEX_THRESHOLD};

/// A validated, immutable palette.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Validate and wrap the entry list.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::Empty`] if no entries are given.
    /// - [`PaletteError::DuplicateName`] if two entries share a name.
    /// - [`PaletteError::NegativeTexture`] for texture scores below 0.
    /// - [`PaletteError::InvalidClusterWeight`] for non-positive
    ///   cluster weights.
    pub fn new(entries: Vec<PaletteEntry>) -> Result<Self, PaletteError> {
        if entries.is_empty() {
            return Err(PaletteError::Empty);
        }

        let mut seen = HashSet::new();
        for (i, entry) in entries.iter().enumerate() {
            if !seen.insert(entry.name().to_owned()) {
                return Err(PaletteError::DuplicateName {
                    index: i,
                    name: entry.name().to_owned(),
                });
            }
            if entry.texture() < 0.0 {
                return Err(PaletteError::NegativeTexture {
                    name: entry.name().to_owned(),
                    score: entry.texture(),
                });
            }
            for cluster in entry.clusters() {
                if cluster.weight <= 0.0 {
                    return Err(PaletteError::InvalidClusterWeight {
                        name: entry.name().to_owned(),
                        weight: cluster.weight,
                    });
                }
            }
        }

        debug!(entries = entries.len(), "palette validated");
        Ok(Self { entries })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: empty palettes are rejected at construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `idx`.
    ///
    /// # Panics
    /// Panics if `idx` is out of bounds.
    #[inline]
    pub fn entry(&self, idx: usize) -> &PaletteEntry {
        &self.entries[idx]
    }

    #[inline]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Build the spatial index when the palette is large enough for it
    /// to pay off; `None` means callers should scan linearly.
    pub(crate) fn build_index(&self) -> Option<PaletteIndex> {
        if self.entries.len() >= INDEX_THRESHOLD {
            Some(PaletteIndex::build(self))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Srgb;

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(Palette::new(Vec::new()), Err(PaletteError::Empty)));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = Palette::new(vec![
            PaletteEntry::new("sky", Srgb::from_u8(100, 150, 255)),
            PaletteEntry::new("sky", Srgb::from_u8(90, 140, 250)),
        ]);
        assert!(matches!(
            result,
            Err(PaletteError::DuplicateName { index: 1, .. })
        ));
    }

    #[test]
    fn test_negative_texture_rejected() {
        let result = Palette::new(vec![
            PaletteEntry::new("bad", Srgb::from_u8(1, 2, 3)).with_texture(-1.0)
        ]);
        assert!(matches!(result, Err(PaletteError::NegativeTexture { .. })));
    }

    #[test]
    fn test_bad_cluster_weight_rejected() {
        let result = Palette::new(vec![PaletteEntry::new("bad", Srgb::from_u8(1, 2, 3))
            .with_clusters(vec![WeightedColor {
                color: Srgb::from_u8(4, 5, 6),
                weight: 0.0,
            }])]);
        assert!(matches!(
            result,
            Err(PaletteError::InvalidClusterWeight { .. })
        ));
    }

    #[test]
    fn test_small_palette_skips_index() {
        let palette = Palette::new(vec![
            PaletteEntry::new("a", Srgb::from_u8(0, 0, 0)),
            PaletteEntry::new("b", Srgb::from_u8(255, 255, 255)),
        ])
        .unwrap();
        assert!(palette.build_index().is_none());
    }

    #[test]
    fn test_large_palette_builds_index() {
        let entries: Vec<_> = (0..1000)
            .map(|i| {
                PaletteEntry::new(
                    format!("c{i}"),
                    Srgb::from_u8((i % 256) as u8, (i / 4 % 256) as u8, (i / 16 % 256) as u8),
                )
            })
            .collect();
        let palette = Palette::new(entries).unwrap();
        assert!(palette.build_index().is_some());
    }
}
