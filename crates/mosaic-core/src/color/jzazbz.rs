//! Jzazbz perceptual color space.
//!
//! Jzazbz (Safdar et al., 2017) is an HDR-aware alternative to Oklab.
//! Inputs here are SDR, so absolute luminance is anchored at the
//! 203 cd/m² reference white before the PQ-like transfer function.

use super::linear_rgb::LinearRgb;

/// A color in Jzazbz space.
///
/// For SDR input normalized to 203 nits, `jz` spans roughly 0..=0.17 and
/// the chroma axes stay well below ±0.11. Distances are therefore much
/// smaller in magnitude than Oklab distances; they are only compared
/// against each other, never across metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jzazbz {
    /// Lightness correlate
    pub jz: f32,
    /// Green-red axis
    pub az: f32,
    /// Blue-yellow axis
    pub bz: f32,
}

/// SDR reference white in cd/m² (ITU-R BT.2408).
const REFERENCE_WHITE_NITS: f32 = 203.0;

// Perceptual quantizer constants (SMPTE ST 2084 exponents as used by Jzazbz).
const PQ_N: f32 = 2610.0 / 16384.0;
const PQ_P: f32 = 1.7 * 2523.0 / 32.0;
const PQ_C1: f32 = 3424.0 / 4096.0;
const PQ_C2: f32 = 2413.0 / 128.0;
const PQ_C3: f32 = 2392.0 / 128.0;

// Jzazbz model constants.
const B: f32 = 1.15;
const G: f32 = 0.66;
const D: f32 = -0.56;
const D0: f32 = 1.629_549_9e-11;

#[inline]
fn pq(value: f32) -> f32 {
    // value is absolute luminance in cd/m²; the curve is anchored at 10000.
    let y = (value / 10000.0).max(0.0).powf(PQ_N);
    ((PQ_C1 + PQ_C2 * y) / (1.0 + PQ_C3 * y)).powf(PQ_P)
}

impl Jzazbz {
    /// Create a Jzazbz color from raw components.
    #[inline]
    pub fn new(jz: f32, az: f32, bz: f32) -> Self {
        Self { jz, az, bz }
    }

    /// Chroma magnitude `sqrt(az² + bz²)`.
    #[inline]
    pub fn chroma(self) -> f32 {
        (self.az * self.az + self.bz * self.bz).sqrt()
    }

    /// Perceptual distance: Euclidean in az/bz with a chroma-adaptive
    /// lightness weight.
    ///
    /// Mirrors the default Oklab metric's neutral-tone handling: the Jz
    /// weight is raised for low-chroma pairs so greys resolve by
    /// lightness. The chroma scale constant (24) accounts for Jzazbz
    /// chroma magnitudes being roughly an order of magnitude smaller
    /// than Oklab's. Symmetric, zero on identical inputs; triangle
    /// inequality not guaranteed.
    pub fn distance(self, other: Jzazbz) -> f32 {
        let avg_chroma = 0.5 * (self.chroma() + other.chroma());
        let wj = 1.6 + 0.4 * (-24.0 * avg_chroma).exp();

        let dj = self.jz - other.jz;
        let da = self.az - other.az;
        let db = self.bz - other.bz;
        (wj * dj * dj + da * da + db * db).sqrt()
    }
}

impl From<LinearRgb> for Jzazbz {
    fn from(rgb: LinearRgb) -> Self {
        // Linear sRGB to XYZ (D65), then to absolute luminance.
        let x = (0.4124564 * rgb.r + 0.3575761 * rgb.g + 0.1804375 * rgb.b)
            * REFERENCE_WHITE_NITS;
        let y = (0.2126729 * rgb.r + 0.7151522 * rgb.g + 0.0721750 * rgb.b)
            * REFERENCE_WHITE_NITS;
        let z = (0.0193339 * rgb.r + 0.1191920 * rgb.g + 0.9503041 * rgb.b)
            * REFERENCE_WHITE_NITS;

        // Pre-adapted X'/Y' reduce the blue-hue nonlinearity.
        let xp = B * x - (B - 1.0) * z;
        let yp = G * y - (G - 1.0) * x;

        let l = 0.41478972 * xp + 0.579999 * yp + 0.0146480 * z;
        let m = -0.2015100 * xp + 1.120649 * yp + 0.0531008 * z;
        let s = -0.0166008 * xp + 0.264800 * yp + 0.6684799 * z;

        let lp = pq(l);
        let mp = pq(m);
        let sp = pq(s);

        let iz = 0.5 * (lp + mp);
        let az = 3.524000 * lp - 4.066708 * mp + 0.542708 * sp;
        let bz = 0.199076 * lp + 1.096799 * mp - 1.295875 * sp;
        let jz = ((1.0 + D) * iz) / (1.0 + D * iz) - D0;

        Jzazbz { jz, az, bz }
    }
}
