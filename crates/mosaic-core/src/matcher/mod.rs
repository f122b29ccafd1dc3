//! Nearest-entry selection under usage caps.
//!
//! The matcher scores palette entries against a target cell color with
//! the active metric, keeps both the best entry overall and the best
//! entry still under its usage cap, and prefers the capped winner when
//! capping is active. Ties go to the first candidate encountered in
//! scan order, which keeps runs deterministic.

pub(crate) mod usage;

pub(crate) use usage::UsageTracker;

use crate::color::{CieLab, ColorMetric, Jzazbz, LinearRgb, Oklab};
use crate::palette::index::PaletteIndex;
use crate::palette::projection::{ProjectedColor, Projection, ProjectionCache};
use crate::palette::Palette;

/// Accent color distances are slightly inflated so the mean color wins
/// unless the accent is a clearly better match.
const ACCENT_BIAS: f32 = 1.1;

/// Blend weights for multi-cluster profiles.
const PROFILE_MEAN_WEIGHT: f32 = 0.6;
const PROFILE_CLUSTER_WEIGHT: f32 = 0.4;

/// Flat penalty for entries carrying the extraction-failure color.
const FALLBACK_PENALTY: f32 = 0.35;

/// Texture penalty per score point at full `texture_penalty` weight.
const TEXTURE_SCALE: f32 = 0.02;

/// Pool size for the exact CIEDE2000 re-ranking pass.
const RERANK_POOL: usize = 20;

/// A target color projected into every space the metric needs, computed
/// once per cell.
#[derive(Debug, Clone)]
pub(crate) struct TargetColor {
    pub oklab: Oklab,
    pub lab: Option<CieLab>,
    pub jz: Option<Jzazbz>,
}

/// Scores candidates for one conversion run.
pub(crate) struct Matcher<'a> {
    palette: &'a Palette,
    cache: ProjectionCache<'a>,
    index: Option<&'a PaletteIndex>,
    metric: ColorMetric,
    /// 0..=100 weight against high-texture entries.
    texture_penalty: f32,
}

impl<'a> Matcher<'a> {
    pub(crate) fn new(
        palette: &'a Palette,
        index: Option<&'a PaletteIndex>,
        metric: ColorMetric,
        texture_penalty: f32,
    ) -> Self {
        Self {
            palette,
            cache: ProjectionCache::new(palette, metric),
            index,
            metric,
            texture_penalty,
        }
    }

    /// Project a linear target color once for repeated scoring.
    pub(crate) fn project_target(&self, linear: LinearRgb) -> TargetColor {
        TargetColor {
            oklab: Oklab::from(linear),
            lab: self.metric.needs_cielab().then(|| CieLab::from(linear)),
            jz: self.metric.needs_jzazbz().then(|| Jzazbz::from(linear)),
        }
    }

    /// Choose the entry for `linear`, honoring usage caps, and record
    /// the use. Returns the entry index and its score.
    pub(crate) fn select(&self, linear: LinearRgb, tracker: &mut UsageTracker) -> (u32, f32) {
        let target = self.project_target(linear);
        let (idx, score) = if self.metric == ColorMetric::Ciede2000 {
            self.select_reranked(&target, tracker)
        } else {
            self.select_streaming(&target, tracker)
        };
        tracker.record(idx);
        (idx, score)
    }

    /// Score a specific entry against a target, without usage effects.
    /// Used by the post-processing passes.
    pub(crate) fn score(&self, target: &TargetColor, idx: u32) -> f32 {
        self.entry_score(target, self.cache.get(idx))
    }

    /// The entry's mean color in linear space, for error diffusion.
    pub(crate) fn entry_linear(&self, idx: u32) -> LinearRgb {
        self.cache.get(idx).mean.linear
    }

    fn candidates(&self, target: &TargetColor) -> Vec<u32> {
        match self.index {
            Some(index) => {
                let found = index.candidates(target.oklab);
                if found.is_empty() {
                    (0..self.palette.len() as u32).collect()
                } else {
                    found
                }
            }
            None => (0..self.palette.len() as u32).collect(),
        }
    }

    /// Single streaming pass: strict `<` keeps the first-encountered
    /// candidate on ties.
    fn select_streaming(&self, target: &TargetColor, tracker: &UsageTracker) -> (u32, f32) {
        let mut best: Option<(u32, f32)> = None;
        let mut best_available: Option<(u32, f32)> = None;

        for idx in self.candidates(target) {
            let score = self.entry_score(target, self.cache.get(idx));
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((idx, score));
            }
            if tracker.is_available(idx) && best_available.map_or(true, |(_, s)| score < s) {
                best_available = Some((idx, score));
            }
        }

        // The palette is never empty, so `best` is always set; if every
        // candidate is capped, the overall best is reused anyway.
        match (best_available, best) {
            (Some(found), _) => found,
            (None, Some(found)) => found,
            (None, None) => (0, 0.0),
        }
    }

    /// Two-pass CIEDE2000: cheap Oklab ranking for recall, exact
    /// re-ranking of the top pool for precision.
    fn select_reranked(&self, target: &TargetColor, tracker: &UsageTracker) -> (u32, f32) {
        let mut ranked: Vec<(u32, f32)> = self
            .candidates(target)
            .into_iter()
            .map(|idx| {
                let p = self.cache.get(idx);
                (idx, target.oklab.weighted_distance(p.mean.oklab))
            })
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(RERANK_POOL);

        let mut best: Option<(u32, f32)> = None;
        let mut best_available: Option<(u32, f32)> = None;
        for (idx, _) in ranked {
            let score = self.entry_score(target, self.cache.get(idx));
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((idx, score));
            }
            if tracker.is_available(idx) && best_available.map_or(true, |(_, s)| score < s) {
                best_available = Some((idx, score));
            }
        }
        match (best_available, best) {
            (Some(found), _) => found,
            (None, Some(found)) => found,
            (None, None) => (0, 0.0),
        }
    }

    fn entry_score(&self, target: &TargetColor, projection: &Projection) -> f32 {
        let mut score = self.color_distance(target, &projection.mean);

        if let Some(accent) = &projection.accent {
            score = score.min(self.color_distance(target, accent) * ACCENT_BIAS);
        }

        if let Some(weighted_mean) = &projection.weighted_mean {
            if !projection.clusters.is_empty() {
                let mean_d = self.color_distance(target, weighted_mean);
                let best_cluster = projection
                    .clusters
                    .iter()
                    .map(|(c, _)| self.color_distance(target, c))
                    .fold(f32::INFINITY, f32::min);
                let blended =
                    PROFILE_MEAN_WEIGHT * mean_d + PROFILE_CLUSTER_WEIGHT * best_cluster;
                score = score.min(blended);
            }
        }

        if projection.is_fallback {
            score += FALLBACK_PENALTY;
        }
        if let Some(texture) = projection.texture {
            score += texture * TEXTURE_SCALE * (self.texture_penalty / 100.0);
        }
        score
    }

    fn color_distance(&self, target: &TargetColor, candidate: &ProjectedColor) -> f32 {
        match self.metric {
            ColorMetric::Oklab => target.oklab.weighted_distance(candidate.oklab),
            ColorMetric::OklabHk => target.oklab.hk_distance(candidate.oklab),
            ColorMetric::Ciede2000 => match (target.lab, candidate.lab) {
                (Some(a), Some(b)) => a.ciede2000(b),
                _ => target.oklab.weighted_distance(candidate.oklab),
            },
            ColorMetric::Jzazbz => match (target.jz, candidate.jz) {
                (Some(a), Some(b)) => a.distance(b),
                _ => target.oklab.weighted_distance(candidate.oklab),
            },
        }
    }
}
