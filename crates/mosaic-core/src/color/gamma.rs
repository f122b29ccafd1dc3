//! sRGB gamma transfer functions.
//!
//! Exact IEC 61966-2-1 piecewise formulas. All color arithmetic in this
//! crate happens in linear space; these two functions are the only gate
//! between stored/displayed sRGB values and linear light.

/// Convert an sRGB-encoded value (0.0..=1.0) to linear RGB.
///
/// Piecewise: linear segment below 0.04045, power curve above.
#[inline]
pub fn srgb_to_linear(srgb: f32) -> f32 {
    if srgb <= 0.04045 {
        srgb / 12.92
    } else {
        ((srgb + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a linear RGB value (0.0..=1.0) to sRGB encoding.
///
/// Piecewise: linear segment below 0.0031308, power curve above.
#[inline]
pub fn linear_to_srgb(linear: f32) -> f32 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}
