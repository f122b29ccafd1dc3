//! Linear RGB color type.
//!
//! Linear RGB is proportional to physical light intensity, so blending,
//! averaging, error diffusion and compositing are only correct here.

use super::gamma::srgb_to_linear;
use super::srgb::Srgb;

/// A color in linear RGB color space.
///
/// Values are typically 0.0..=1.0 but may leave that range during
/// intermediate calculations (accumulated dither error, sharpening).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRgb {
    /// Red channel (linear light intensity)
    pub r: f32,
    /// Green channel (linear light intensity)
    pub g: f32,
    /// Blue channel (linear light intensity)
    pub b: f32,
}

impl LinearRgb {
    /// Create a new LinearRgb color.
    #[inline]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Relative luminance (Rec. 709 coefficients on linear components).
    #[inline]
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Clamp every channel to 0.0..=1.0.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }
}

impl From<Srgb> for LinearRgb {
    /// Gamma-decode an sRGB color before doing any color math.
    fn from(srgb: Srgb) -> Self {
        Self {
            r: srgb_to_linear(srgb.r),
            g: srgb_to_linear(srgb.g),
            b: srgb_to_linear(srgb.b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance_extremes() {
        assert!(LinearRgb::new(0.0, 0.0, 0.0).luminance().abs() < 1e-7);
        assert!((LinearRgb::new(1.0, 1.0, 1.0).luminance() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamped() {
        let c = LinearRgb::new(-0.5, 0.5, 1.5).clamped();
        assert_eq!(c.r, 0.0);
        assert_eq!(c.g, 0.5);
        assert_eq!(c.b, 1.0);
    }
}
