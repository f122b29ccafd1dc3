//! Lazy per-entry color space projections.
//!
//! Projections are derived data: every value is a pure function of the
//! entry and the active metric, so recomputation is idempotent and the
//! cache can be populated lazily without coordination. Entries stay
//! immutable; all derived state lives here, scoped to one conversion
//! run.

use std::cell::OnceCell;

use crate::color::{CieLab, ColorMetric, Jzazbz, LinearRgb, Oklab, Srgb};
use crate::palette::{Palette, WeightedColor};

/// A single color projected into every space the active metric needs.
#[derive(Debug, Clone)]
pub(crate) struct ProjectedColor {
    pub linear: LinearRgb,
    pub oklab: Oklab,
    /// Present only for [`ColorMetric::Ciede2000`].
    pub lab: Option<CieLab>,
    /// Present only for [`ColorMetric::Jzazbz`].
    pub jz: Option<Jzazbz>,
}

impl ProjectedColor {
    pub(crate) fn project(color: Srgb, metric: ColorMetric) -> Self {
        let linear = LinearRgb::from(color);
        Self::project_linear(linear, metric)
    }

    pub(crate) fn project_linear(linear: LinearRgb, metric: ColorMetric) -> Self {
        Self {
            linear,
            oklab: Oklab::from(linear),
            lab: metric.needs_cielab().then(|| CieLab::from(linear)),
            jz: metric.needs_jzazbz().then(|| Jzazbz::from(linear)),
        }
    }
}

/// Everything the matcher needs to know about one entry.
#[derive(Debug, Clone)]
pub(crate) struct Projection {
    pub mean: ProjectedColor,
    pub accent: Option<ProjectedColor>,
    /// Cluster sub-colors with normalized weights (sum 1.0).
    pub clusters: Vec<(ProjectedColor, f32)>,
    /// Weight-averaged cluster color (linear-space average), present
    /// only when the entry carries a profile.
    pub weighted_mean: Option<ProjectedColor>,
    pub is_fallback: bool,
    /// Texture score, `None` for the unknown sentinel.
    pub texture: Option<f32>,
}

/// Per-run cache of entry projections, filled on first access.
///
/// Uses interior mutability so the matcher can hold `&self` throughout
/// the scan loop; `OnceCell` guarantees each slot is computed at most
/// once per run.
pub(crate) struct ProjectionCache<'a> {
    palette: &'a Palette,
    metric: ColorMetric,
    slots: Vec<OnceCell<Projection>>,
}

impl<'a> ProjectionCache<'a> {
    pub(crate) fn new(palette: &'a Palette, metric: ColorMetric) -> Self {
        let mut slots = Vec::with_capacity(palette.len());
        slots.resize_with(palette.len(), OnceCell::new);
        Self {
            palette,
            metric,
            slots,
        }
    }

    /// Projection for the entry at `idx`, computing it on first use.
    pub(crate) fn get(&self, idx: u32) -> &Projection {
        self.slots[idx as usize].get_or_init(|| self.compute(idx))
    }

    fn compute(&self, idx: u32) -> Projection {
        let entry = self.palette.entry(idx as usize);
        let mean = ProjectedColor::project(entry.color(), self.metric);
        let accent = entry
            .accent()
            .map(|c| ProjectedColor::project(c, self.metric));

        let clusters = project_clusters(entry.clusters(), self.metric);
        let weighted_mean = weighted_mean(entry.clusters(), self.metric);

        Projection {
            mean,
            accent,
            clusters,
            weighted_mean,
            is_fallback: entry.is_fallback_color(),
            texture: entry.known_texture(),
        }
    }
}

fn project_clusters(clusters: &[WeightedColor], metric: ColorMetric) -> Vec<(ProjectedColor, f32)> {
    let total: f32 = clusters.iter().map(|c| c.weight).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    clusters
        .iter()
        .map(|c| (ProjectedColor::project(c.color, metric), c.weight / total))
        .collect()
}

fn weighted_mean(clusters: &[WeightedColor], metric: ColorMetric) -> Option<ProjectedColor> {
    let total: f32 = clusters.iter().map(|c| c.weight).sum();
    if clusters.is_empty() || total <= 0.0 {
        return None;
    }
    let mut sum = [0.0f32; 3];
    for c in clusters {
        let lin = LinearRgb::from(c.color);
        let w = c.weight / total;
        sum[0] += lin.r * w;
        sum[1] += lin.g * w;
        sum[2] += lin.b * w;
    }
    Some(ProjectedColor::project_linear(
        LinearRgb::new(sum[0], sum[1], sum[2]),
        metric,
    ))
}
