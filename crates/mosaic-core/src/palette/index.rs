//! Spatial bucket index over palette colors in Oklab space.
//!
//! Large palettes make a full linear scan per cell expensive. The index
//! buckets every entry color (mean, accent and each cluster sub-color)
//! into a coarse 3D grid; a lookup unions the buckets around the target
//! and returns a small candidate set. Buckets are keyed by packed
//! integers, never formatted strings.
//!
//! Correctness contract: widening guarantees the true nearest neighbor
//! is never dropped for targets whose match lies within the final
//! search radius. An empty result means "scan everything", handled by
//! the caller.

use std::collections::HashMap;

use tracing::debug;

use crate::color::{LinearRgb, Oklab};
use crate::palette::Palette;

/// Palettes below this size scan linearly; index overhead wins above it.
pub(crate) const INDEX_THRESHOLD: usize = 1000;

/// Candidate count below which the 3x3x3 neighborhood widens to 5x5x5.
const WIDEN_THRESHOLD: usize = 200;

// Bucket widths. L spans 0..1; a/b stay within roughly -0.4..0.4 for
// sRGB, so these give a usable 20-ish bins per axis.
const BIN_L: f32 = 0.05;
const BIN_AB: f32 = 0.04;

/// Offset keeping quantized coordinates positive before packing.
const KEY_BIAS: i64 = 1 << 15;

#[inline]
fn bin(value: f32, width: f32) -> i64 {
    (value / width).floor() as i64
}

#[inline]
fn pack(lb: i64, ab: i64, bb: i64) -> u64 {
    let l = (lb + KEY_BIAS) as u64 & 0xFFFF;
    let a = (ab + KEY_BIAS) as u64 & 0xFFFF;
    let b = (bb + KEY_BIAS) as u64 & 0xFFFF;
    (l << 32) | (a << 16) | b
}

/// Bucketed nearest-neighbor accelerator.
#[derive(Debug)]
pub(crate) struct PaletteIndex {
    buckets: HashMap<u64, Vec<u32>>,
}

impl PaletteIndex {
    /// Build an index over every color carried by every entry.
    pub(crate) fn build(palette: &Palette) -> Self {
        let mut buckets: HashMap<u64, Vec<u32>> = HashMap::new();
        let mut insert = |color: Oklab, idx: u32| {
            let key = pack(bin(color.l, BIN_L), bin(color.a, BIN_AB), bin(color.b, BIN_AB));
            let entries = buckets.entry(key).or_default();
            if entries.last() != Some(&idx) {
                entries.push(idx);
            }
        };

        for (i, entry) in palette.entries().iter().enumerate() {
            let idx = i as u32;
            insert(Oklab::from(LinearRgb::from(entry.color())), idx);
            if let Some(accent) = entry.accent() {
                insert(Oklab::from(LinearRgb::from(accent)), idx);
            }
            for cluster in entry.clusters() {
                insert(Oklab::from(LinearRgb::from(cluster.color)), idx);
            }
        }

        debug!(
            entries = palette.len(),
            buckets = buckets.len(),
            "built palette index"
        );
        Self { buckets }
    }

    /// Candidate entry indices near `target`, deduplicated, in
    /// ascending index order. Empty means no populated bucket was in
    /// range and the caller must fall back to the full palette.
    pub(crate) fn candidates(&self, target: Oklab) -> Vec<u32> {
        let lb = bin(target.l, BIN_L);
        let ab = bin(target.a, BIN_AB);
        let bb = bin(target.b, BIN_AB);

        let mut found = self.gather(lb, ab, bb, 1);
        if found.len() < WIDEN_THRESHOLD {
            let widened = self.gather(lb, ab, bb, 2);
            if widened.len() > found.len() {
                found = widened;
            }
        }
        found
    }

    fn gather(&self, lb: i64, ab: i64, bb: i64, radius: i64) -> Vec<u32> {
        let mut out = Vec::new();
        for dl in -radius..=radius {
            for da in -radius..=radius {
                for db in -radius..=radius {
                    if let Some(entries) = self.buckets.get(&pack(lb + dl, ab + da, bb + db)) {
                        out.extend_from_slice(entries);
                    }
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    #[cfg(test)]
    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Srgb;
    use crate::palette::PaletteEntry;

    fn big_palette(n: usize) -> Palette {
        // Deterministic pseudo-random spread over the RGB cube.
        let mut entries = Vec::with_capacity(n);
        let mut state = 0x2545_f491u32;
        for i in 0..n {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            let r = (state >> 24) as u8;
            let g = (state >> 16) as u8;
            let b = (state >> 8) as u8;
            entries.push(PaletteEntry::new(format!("e{i}"), Srgb::from_u8(r, g, b)));
        }
        Palette::new(entries).unwrap()
    }

    #[test]
    fn test_candidates_contain_exact_entry() {
        let palette = big_palette(1200);
        let index = PaletteIndex::build(&palette);
        for i in (0..1200).step_by(97) {
            let target = Oklab::from(LinearRgb::from(palette.entry(i).color()));
            let candidates = index.candidates(target);
            assert!(
                candidates.contains(&(i as u32)),
                "entry {i} missing from its own neighborhood"
            );
        }
    }

    #[test]
    fn test_index_agrees_with_brute_force() {
        let palette = big_palette(1500);
        let index = PaletteIndex::build(&palette);

        let mut state = 0x9e37_79b9u32;
        for _ in 0..1000 {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            let query = Oklab::from(LinearRgb::from(Srgb::from_u8(
                (state >> 24) as u8,
                (state >> 16) as u8,
                (state >> 8) as u8,
            )));

            let brute = (0..palette.len() as u32)
                .min_by(|&a, &b| {
                    let da = oklab_of(&palette, a).weighted_distance(query);
                    let db = oklab_of(&palette, b).weighted_distance(query);
                    da.partial_cmp(&db).unwrap()
                })
                .unwrap();

            let candidates = index.candidates(query);
            assert!(!candidates.is_empty());
            let indexed = candidates
                .iter()
                .copied()
                .min_by(|&a, &b| {
                    let da = oklab_of(&palette, a).weighted_distance(query);
                    let db = oklab_of(&palette, b).weighted_distance(query);
                    da.partial_cmp(&db).unwrap()
                })
                .unwrap();

            let d_brute = oklab_of(&palette, brute).weighted_distance(query);
            let d_indexed = oklab_of(&palette, indexed).weighted_distance(query);
            assert!(
                (d_indexed - d_brute).abs() < 1e-6,
                "index nearest {d_indexed} vs brute {d_brute}"
            );
        }
    }

    fn oklab_of(palette: &Palette, idx: u32) -> Oklab {
        Oklab::from(LinearRgb::from(palette.entry(idx as usize).color()))
    }

    #[test]
    fn test_accent_and_clusters_are_bucketed() {
        let mut entries = vec![PaletteEntry::new("dual", Srgb::from_u8(10, 10, 10))
            .with_accent(Srgb::from_u8(240, 240, 240))];
        for i in 0..40 {
            entries.push(PaletteEntry::new(
                format!("mid{i}"),
                Srgb::from_u8(100 + i, 100, 100),
            ));
        }
        let palette = Palette::new(entries).unwrap();
        let index = PaletteIndex::build(&palette);

        // The accent lives far from the mean; a near-white query must
        // still surface entry 0.
        let near_white = Oklab::from(LinearRgb::from(Srgb::from_u8(245, 245, 245)));
        assert!(index.candidates(near_white).contains(&0));
    }

    #[test]
    fn test_widening_on_sparse_region() {
        // A few colors far apart: the 3x3x3 neighborhood around a
        // distant query may be empty, but widening or fallback keeps
        // the result usable.
        let palette = Palette::new(vec![
            PaletteEntry::new("black", Srgb::from_u8(0, 0, 0)),
            PaletteEntry::new("white", Srgb::from_u8(255, 255, 255)),
        ])
        .unwrap();
        let index = PaletteIndex::build(&palette);
        assert!(index.bucket_count() >= 2);

        let query = Oklab::from(LinearRgb::from(Srgb::from_u8(250, 250, 250)));
        let candidates = index.candidates(query);
        // Either found via widening or empty (full-scan fallback);
        // never a wrong non-empty set missing the nearest.
        if !candidates.is_empty() {
            assert!(candidates.contains(&1));
        }
    }

    #[test]
    fn test_candidates_deduplicated() {
        // Mean, accent and a cluster all at the same color must not
        // produce repeated indices.
        let mut entries = vec![PaletteEntry::new("same", Srgb::from_u8(60, 60, 60))
            .with_accent(Srgb::from_u8(61, 60, 60))
            .with_clusters(vec![crate::palette::WeightedColor {
                color: Srgb::from_u8(60, 61, 60),
                weight: 1.0,
            }])];
        for i in 0..10 {
            entries.push(PaletteEntry::new(
                format!("pad{i}"),
                Srgb::from_u8(200, (i * 5) as u8, 10),
            ));
        }
        let palette = Palette::new(entries).unwrap();
        let index = PaletteIndex::build(&palette);
        let query = Oklab::from(LinearRgb::from(Srgb::from_u8(60, 60, 60)));
        let candidates = index.candidates(query);
        let mut sorted = candidates.clone();
        sorted.dedup();
        assert_eq!(candidates, sorted);
    }
}
