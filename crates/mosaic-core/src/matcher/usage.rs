//! Per-run usage caps over palette entries.
//!
//! Caps push the matcher toward variety: once an entry has been used
//! its share of cells, the matcher prefers the next-best entry that is
//! still available. Tracker state is owned by a single run and
//! discarded afterwards.

use crate::color::{LinearRgb, Oklab};
use crate::palette::Palette;

/// Chroma below which an entry counts as near-neutral and is never
/// capped under per-color tolerance.
const NEUTRAL_CHROMA: f32 = 0.05;

/// Chroma below which an entry counts as muted and gets a doubled cap.
const MUTED_CHROMA: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cap {
    Unlimited,
    Limited(u32),
}

/// Tracks how often each entry has been chosen in the current run.
#[derive(Debug)]
pub(crate) struct UsageTracker {
    counts: Vec<u32>,
    caps: Vec<Cap>,
}

impl UsageTracker {
    /// Derive per-entry caps for a run over `cells` grid cells.
    ///
    /// `tolerance` is 0..=100: 0 caps every entry at one use, 100
    /// disables capping entirely. With `per_color_tolerance`,
    /// near-neutral entries are uncapped and muted entries get double
    /// the base cap. Entries whose name contains any of
    /// `exempt_substrings` are always uncapped.
    pub(crate) fn new(
        palette: &Palette,
        cells: usize,
        tolerance: u32,
        per_color_tolerance: bool,
        exempt_substrings: &[String],
    ) -> Self {
        let counts = vec![0; palette.len()];
        if tolerance >= 100 {
            return Self {
                counts,
                caps: vec![Cap::Unlimited; palette.len()],
            };
        }

        let base = ((cells as u64 * tolerance as u64) / 100).max(1) as u32;
        let caps = palette
            .entries()
            .iter()
            .map(|entry| {
                let name = entry.name();
                if exempt_substrings.iter().any(|s| name.contains(s.as_str())) {
                    return Cap::Unlimited;
                }
                if per_color_tolerance {
                    let chroma = Oklab::from(LinearRgb::from(entry.color())).chroma();
                    if chroma < NEUTRAL_CHROMA {
                        return Cap::Unlimited;
                    }
                    if chroma < MUTED_CHROMA {
                        return Cap::Limited(base.saturating_mul(2));
                    }
                }
                Cap::Limited(base)
            })
            .collect();

        Self { counts, caps }
    }

    /// Whether the entry may still be chosen under its cap.
    #[inline]
    pub(crate) fn is_available(&self, idx: u32) -> bool {
        match self.caps[idx as usize] {
            Cap::Unlimited => true,
            Cap::Limited(cap) => self.counts[idx as usize] < cap,
        }
    }

    /// Record one use of the entry.
    #[inline]
    pub(crate) fn record(&mut self, idx: u32) {
        self.counts[idx as usize] += 1;
    }

    #[inline]
    pub(crate) fn count(&self, idx: u32) -> u32 {
        self.counts[idx as usize]
    }
}
