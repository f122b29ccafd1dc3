//! CIE L*a*b* color space and the CIEDE2000 color-difference formula.
//!
//! CIEDE2000 is far more expensive than the Oklab metrics and is used
//! only as a second-pass re-ranking metric over a small candidate pool,
//! never for the bulk search.

use super::linear_rgb::LinearRgb;

/// CIE 1976 L*a*b* color, D65 white point.
///
/// `l` is 0..=100; `a` and `b` are roughly -128..=128 for sRGB inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CieLab {
    /// Lightness, 0 (black) to 100 (diffuse white)
    pub l: f32,
    /// Green-red axis
    pub a: f32,
    /// Blue-yellow axis
    pub b: f32,
}

// CIE constants: epsilon = (6/29)^3, kappa = (29/3)^3 / 1000 * ... kept in
// the standard rational forms.
const EPSILON: f32 = 216.0 / 24389.0;
const KAPPA: f32 = 24389.0 / 27.0;

// D65 reference white (2 degree observer).
const XN: f32 = 0.95047;
const YN: f32 = 1.0;
const ZN: f32 = 1.08883;

/// 25^7, shared by the G factor and the RT rotation term.
const POW25_7: f32 = 6_103_515_625.0;

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

impl CieLab {
    /// Create a CieLab color from raw components.
    #[inline]
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// CIEDE2000 color difference (ΔE00).
    ///
    /// Full standard formula: G chroma compression, T hue weighting,
    /// SL/SC/SH scaling functions and the RT rotation term for the blue
    /// region. Symmetric, zero on identical inputs.
    pub fn ciede2000(self, other: CieLab) -> f32 {
        use std::f32::consts::PI;
        const TWO_PI: f32 = 2.0 * PI;

        let (l1, a1, b1) = (self.l, self.a, self.b);
        let (l2, a2, b2) = (other.l, other.a, other.b);

        let c1_star = (a1 * a1 + b1 * b1).sqrt();
        let c2_star = (a2 * a2 + b2 * b2).sqrt();
        let c_bar = 0.5 * (c1_star + c2_star);

        let c_bar_7 = c_bar.powi(7);
        let g = 0.5 * (1.0 - (c_bar_7 / (c_bar_7 + POW25_7)).sqrt());

        let a1_prime = a1 * (1.0 + g);
        let a2_prime = a2 * (1.0 + g);

        let c1_prime = (a1_prime * a1_prime + b1 * b1).sqrt();
        let c2_prime = (a2_prime * a2_prime + b2 * b2).sqrt();

        // Hue angles normalized to 0..2pi
        let h1_prime = if a1_prime == 0.0 && b1 == 0.0 {
            0.0
        } else {
            let h = b1.atan2(a1_prime);
            if h < 0.0 {
                h + TWO_PI
            } else {
                h
            }
        };
        let h2_prime = if a2_prime == 0.0 && b2 == 0.0 {
            0.0
        } else {
            let h = b2.atan2(a2_prime);
            if h < 0.0 {
                h + TWO_PI
            } else {
                h
            }
        };

        let dl_prime = l2 - l1;
        let dc_prime = c2_prime - c1_prime;

        let dh_prime = if c1_prime * c2_prime == 0.0 {
            0.0
        } else {
            let diff = h2_prime - h1_prime;
            if diff.abs() <= PI {
                diff
            } else if diff > PI {
                diff - TWO_PI
            } else {
                diff + TWO_PI
            }
        };
        let dh_big = 2.0 * (c1_prime * c2_prime).sqrt() * (0.5 * dh_prime).sin();

        let l_bar = 0.5 * (l1 + l2);
        let c_bar_prime = 0.5 * (c1_prime + c2_prime);

        let h_bar = if c1_prime * c2_prime == 0.0 {
            h1_prime + h2_prime
        } else if (h1_prime - h2_prime).abs() <= PI {
            0.5 * (h1_prime + h2_prime)
        } else if h1_prime + h2_prime < TWO_PI {
            0.5 * (h1_prime + h2_prime + TWO_PI)
        } else {
            0.5 * (h1_prime + h2_prime - TWO_PI)
        };

        let t = 1.0 - 0.17 * (h_bar - 30.0_f32.to_radians()).cos()
            + 0.24 * (2.0 * h_bar).cos()
            + 0.32 * (3.0 * h_bar + 6.0_f32.to_radians()).cos()
            - 0.20 * (4.0 * h_bar - 63.0_f32.to_radians()).cos();

        let l_mid = l_bar - 50.0;
        let l_mid_sq = l_mid * l_mid;
        let sl = 1.0 + 0.015 * l_mid_sq / (20.0 + l_mid_sq).sqrt();
        let sc = 1.0 + 0.045 * c_bar_prime;
        let sh = 1.0 + 0.015 * c_bar_prime * t;

        let delta_theta = 30.0_f32.to_radians()
            * (-((h_bar - 275.0_f32.to_radians()) / 25.0_f32.to_radians()).powi(2)).exp();
        let c_bar_prime_7 = c_bar_prime.powi(7);
        let rc = 2.0 * (c_bar_prime_7 / (c_bar_prime_7 + POW25_7)).sqrt();
        let rt = -rc * (2.0 * delta_theta).sin();

        let dl_term = dl_prime / sl;
        let dc_term = dc_prime / sc;
        let dh_term = dh_big / sh;

        let sum = dl_term * dl_term
            + dc_term * dc_term
            + dh_term * dh_term
            + rt * dc_term * dh_term;
        sum.max(0.0).sqrt()
    }
}

impl From<LinearRgb> for CieLab {
    /// Convert via CIE XYZ (sRGB primaries, D65 white point).
    fn from(rgb: LinearRgb) -> Self {
        let x = 0.4124564 * rgb.r + 0.3575761 * rgb.g + 0.1804375 * rgb.b;
        let y = 0.2126729 * rgb.r + 0.7151522 * rgb.g + 0.0721750 * rgb.b;
        let z = 0.0193339 * rgb.r + 0.1191920 * rgb.g + 0.9503041 * rgb.b;

        let fx = lab_f(x / XN);
        let fy = lab_f(y / YN);
        let fz = lab_f(z / ZN);

        CieLab {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }
}
