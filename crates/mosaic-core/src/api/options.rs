//! Validated conversion options.

use crate::api::error::ConvertError;
use crate::color::ColorMetric;

/// All knobs for a conversion run.
///
/// Construct with [`ConvertOptions::default`] and adjust fields; the
/// [`Converter`](crate::api::Converter) validates the whole struct at
/// build time, so out-of-range values are rejected before any work
/// happens instead of being silently clamped.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Serialized length budget in characters; 0 means unlimited.
    pub char_budget: usize,
    /// Entry reuse tolerance, 0..=100. 0 approximates unique entries,
    /// 100 disables usage caps.
    pub tolerance: u32,
    /// Enable error-diffusion dithering.
    pub dithering: bool,
    /// Base diffusion strength, 0..=100.
    pub dithering_strength: u32,
    /// Weight against high-texture entries, 0..=100.
    pub texture_penalty: u32,
    /// Base supersampling grid side, 1..=8.
    pub raster_samples: u32,
    /// Active perceptual distance metric.
    pub color_metric: ColorMetric,
    /// Raise per-cell supersampling on edges.
    pub adaptive_sampling: bool,
    /// Attenuate diffusion strength by local variance.
    pub adaptive_dithering: bool,
    /// Lanczos3 sub-sampling; bilinear when false.
    pub lanczos: bool,
    /// Ordered dithering in flat regions, diffusion elsewhere.
    pub hybrid_dithering: bool,
    /// Cap each diffused error share at ±0.1 per component. Off by
    /// default; large residuals then diffuse in full.
    pub diffusion_clamp: bool,
    /// Run the spatial coherence pass.
    pub spatial_coherence: bool,
    /// Run the median/outlier pass.
    pub median_filter: bool,
    /// Per-entry cap multipliers by chroma.
    pub per_color_tolerance: bool,
    /// Local contrast equalization.
    pub clahe: bool,
    /// Unsharp mask amount, >= 0; 0 disables.
    pub sharpening_strength: f32,
    /// Saturation factor, >= 0; 1.0 is the identity.
    pub saturation_boost: f32,
    /// Spatial coherence slack multiplier, >= 0.
    pub coherence_strength: f32,
    /// Local contrast strength, >= 0.
    pub clahe_strength: f32,
    /// Entries whose name contains any of these substrings are never
    /// usage-capped.
    pub cap_exempt: Vec<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            char_budget: 0,
            tolerance: 100,
            dithering: true,
            dithering_strength: 80,
            texture_penalty: 50,
            raster_samples: 3,
            color_metric: ColorMetric::default(),
            adaptive_sampling: false,
            adaptive_dithering: false,
            lanczos: true,
            hybrid_dithering: false,
            diffusion_clamp: false,
            spatial_coherence: false,
            median_filter: false,
            per_color_tolerance: false,
            clahe: false,
            sharpening_strength: 0.0,
            saturation_boost: 1.0,
            coherence_strength: 1.0,
            clahe_strength: 0.3,
            cap_exempt: vec!["blank".to_owned()],
        }
    }
}

impl ConvertOptions {
    /// Check every field against its documented range.
    pub(crate) fn validate(&self) -> Result<(), ConvertError> {
        fn invalid(field: &'static str, reason: String) -> ConvertError {
            ConvertError::InvalidOption { field, reason }
        }

        if self.tolerance > 100 {
            return Err(invalid(
                "tolerance",
                format!("{} is out of range 0..=100", self.tolerance),
            ));
        }
        if self.dithering_strength > 100 {
            return Err(invalid(
                "dithering_strength",
                format!("{} is out of range 0..=100", self.dithering_strength),
            ));
        }
        if self.texture_penalty > 100 {
            return Err(invalid(
                "texture_penalty",
                format!("{} is out of range 0..=100", self.texture_penalty),
            ));
        }
        if !(1..=8).contains(&self.raster_samples) {
            return Err(invalid(
                "raster_samples",
                format!("{} is out of range 1..=8", self.raster_samples),
            ));
        }
        for (field, value) in [
            ("sharpening_strength", self.sharpening_strength),
            ("saturation_boost", self.saturation_boost),
            ("coherence_strength", self.coherence_strength),
            ("clahe_strength", self.clahe_strength),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("{value} must be finite and >= 0")));
            }
        }
        Ok(())
    }
}
