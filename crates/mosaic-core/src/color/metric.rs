//! Distance metric selection.

/// Perceptual distance metric used for palette matching.
///
/// All metrics share the same contract: non-negative, symmetric, zero
/// on identical inputs. None of the weighted variants guarantee the
/// triangle inequality; this is documented behavior, not a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMetric {
    /// Weighted Oklab distance (default). Cheap, good neutral handling.
    #[default]
    Oklab,

    /// Oklab with a Helmholtz–Kohlrausch lightness correction and an
    /// LCh-decomposed weighting. Better for highly saturated content.
    OklabHk,

    /// Two-pass CIEDE2000: the bulk search runs on the weighted Oklab
    /// metric, then the top candidates are re-ranked with the exact
    /// (and much more expensive) CIEDE2000 formula.
    Ciede2000,

    /// Jzazbz distance, an HDR-aware alternative to Oklab.
    Jzazbz,
}

impl ColorMetric {
    /// Whether entry projections must include CIE L*a*b* coordinates.
    #[inline]
    pub fn needs_cielab(self) -> bool {
        matches!(self, ColorMetric::Ciede2000)
    }

    /// Whether entry projections must include Jzazbz coordinates.
    #[inline]
    pub fn needs_jzazbz(self) -> bool {
        matches!(self, ColorMetric::Jzazbz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_requirements() {
        assert!(!ColorMetric::Oklab.needs_cielab());
        assert!(!ColorMetric::Oklab.needs_jzazbz());
        assert!(ColorMetric::Ciede2000.needs_cielab());
        assert!(!ColorMetric::Ciede2000.needs_jzazbz());
        assert!(ColorMetric::Jzazbz.needs_jzazbz());
    }

    #[test]
    fn test_default_is_oklab() {
        assert_eq!(ColorMetric::default(), ColorMetric::Oklab);
    }
}
