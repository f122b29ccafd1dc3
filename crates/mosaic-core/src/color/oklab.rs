//! Oklab perceptual color space.
//!
//! Oklab (Björn Ottosson, <https://bottosson.github.io/posts/oklab/>) is
//! the default space for palette matching: Euclidean-style distances
//! correlate well with perceived color difference, and the conversion is
//! cheap enough to run per candidate.

use super::linear_rgb::LinearRgb;

/// A color in Oklab perceptual color space.
///
/// # Components
///
/// - `l`: Lightness (0.0 = black, 1.0 = white for in-gamut colors)
/// - `a`: Green-red axis (negative = green, positive = red)
/// - `b`: Blue-yellow axis (negative = blue, positive = yellow)
///
/// Values are not clamped; out-of-gamut inputs produce out-of-range
/// components, which is intentional for intermediate calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklab {
    /// Lightness: 0.0 (black) to 1.0 (white) for in-gamut colors
    pub l: f32,
    /// Green-red axis: typically -0.5 to 0.5
    pub a: f32,
    /// Blue-yellow axis: typically -0.5 to 0.5
    pub b: f32,
}

impl Oklab {
    /// Create a new Oklab color.
    #[inline]
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Chroma magnitude `sqrt(a² + b²)`.
    #[inline]
    pub fn chroma(self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    /// Hue angle in radians (`atan2(b, a)`).
    #[inline]
    pub fn hue(self) -> f32 {
        self.b.atan2(self.a)
    }

    /// Weighted perceptual distance, the default matching metric.
    ///
    /// Plain Euclidean Oklab distance treats lightness and chrominance
    /// symmetrically, which mismatches neutral tones against large
    /// chromatic palettes. Two adjustments:
    ///
    /// - the lightness weight is raised for low-chroma pairs
    ///   (`1.6 + 0.4·e^(−3·avgChroma)`), so greys resolve primarily by
    ///   lightness;
    /// - a hue-difference term `max(0, Δa² + Δb² − ΔC²)·0.25` penalises
    ///   hue rotation beyond what the chroma difference explains.
    ///
    /// Symmetric and zero on identical inputs. The triangle inequality is
    /// NOT guaranteed (the lightness weight depends on both endpoints);
    /// callers must not assume metric-space properties.
    pub fn weighted_distance(self, other: Oklab) -> f32 {
        let c1 = self.chroma();
        let c2 = other.chroma();
        let avg_chroma = 0.5 * (c1 + c2);
        let wl = 1.6 + 0.4 * (-3.0 * avg_chroma).exp();

        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        let dc = c1 - c2;
        // Hue residual: the part of the a/b difference not explained by
        // the chroma difference. Clamped to >= 0 before use.
        let dh_sq = (da * da + db * db - dc * dc).max(0.0);

        (wl * dl * dl + da * da + db * db + 0.25 * dh_sq).sqrt()
    }

    /// Calibrated distance with a Helmholtz–Kohlrausch lightness correction.
    ///
    /// Saturated colors look brighter than their measured lightness.
    /// Before comparing, each lightness is nudged by
    /// `0.015·C·(0.12 + 0.06·cos(hue + 0.8))`, then an LCh-decomposed
    /// weighted distance is taken (wL = wC = 1.0, wH = 0.5).
    ///
    /// Same contract as [`weighted_distance`](Self::weighted_distance):
    /// symmetric, zero on equal inputs, triangle inequality not guaranteed.
    pub fn hk_distance(self, other: Oklab) -> f32 {
        let c1 = self.chroma();
        let c2 = other.chroma();
        let l1 = self.l + hk_lightness_boost(c1, self.hue());
        let l2 = other.l + hk_lightness_boost(c2, other.hue());

        let dl = l1 - l2;
        let dc = c1 - c2;
        let da = self.a - other.a;
        let db = self.b - other.b;
        let dh_sq = (da * da + db * db - dc * dc).max(0.0);

        // wL = wC = 1.0, wH = 0.5 (applied squared: 0.25)
        (dl * dl + dc * dc + 0.25 * dh_sq).sqrt()
    }
}

/// Helmholtz–Kohlrausch lightness boost for a chroma/hue pair.
#[inline]
fn hk_lightness_boost(chroma: f32, hue: f32) -> f32 {
    0.015 * chroma * (0.12 + 0.06 * (hue + 0.8).cos())
}

impl From<LinearRgb> for Oklab {
    /// Convert from linear RGB using the 2021-01-25 Ottosson matrices.
    fn from(rgb: LinearRgb) -> Self {
        // Linear sRGB to LMS (M1)
        let l = 0.4122214708 * rgb.r + 0.5363325363 * rgb.g + 0.0514459929 * rgb.b;
        let m = 0.2119034982 * rgb.r + 0.6806995451 * rgb.g + 0.1073969566 * rgb.b;
        let s = 0.0883024619 * rgb.r + 0.2817188376 * rgb.g + 0.6299787005 * rgb.b;

        // Cube root nonlinearity
        let l_ = l.cbrt();
        let m_ = m.cbrt();
        let s_ = s.cbrt();

        // LMS to Lab (M2)
        Oklab {
            l: 0.2104542553 * l_ + 0.7936177850 * m_ - 0.0040720468 * s_,
            a: 1.9779984951 * l_ - 2.4285922050 * m_ + 0.4505937099 * s_,
            b: 0.0259040371 * l_ + 0.7827717662 * m_ - 0.8086757660 * s_,
        }
    }
}

impl From<Oklab> for LinearRgb {
    /// Inverse conversion. Out-of-gamut Oklab values produce components
    /// outside 0.0..=1.0; callers clamp where required.
    fn from(lab: Oklab) -> Self {
        let l_ = lab.l + 0.3963377774 * lab.a + 0.2158037573 * lab.b;
        let m_ = lab.l - 0.1055613458 * lab.a - 0.0638541728 * lab.b;
        let s_ = lab.l - 0.0894841775 * lab.a - 1.2914855480 * lab.b;

        let l = l_ * l_ * l_;
        let m = m_ * m_ * m_;
        let s = s_ * s_ * s_;

        LinearRgb {
            r: 4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
            g: -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
            b: -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
        }
    }
}
