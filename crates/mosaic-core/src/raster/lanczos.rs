//! Resampling kernels: Lanczos3 and bilinear.

use std::f32::consts::PI;

use super::SourceImage;
use crate::color::LinearRgb;

/// Lanczos3 kernel: `sinc(x)·sinc(x/3)` for |x| < 3, 0 outside.
///
/// Exactly 1.0 at x = 0 and exactly 0.0 for |x| >= 3 -- both cases are
/// handled explicitly so no 0/0 NaN can escape the kernel.
#[inline]
pub fn lanczos3(x: f32) -> f32 {
    if x == 0.0 {
        return 1.0;
    }
    if x.abs() >= 3.0 {
        return 0.0;
    }
    let px = PI * x;
    let px3 = px / 3.0;
    (px.sin() / px) * (px3.sin() / px3)
}

/// Sample the source with a 6x6 Lanczos3 footprint at a continuous
/// position (in source pixel units, top-left origin).
///
/// Texels are fetched already composited onto white in linear space;
/// the weighted sum is normalized by the total kernel weight.
pub(crate) fn sample_lanczos3(src: &SourceImage, sx: f32, sy: f32) -> LinearRgb {
    // Texel i covers [i, i+1); its center is at i + 0.5.
    let u = sx - 0.5;
    let v = sy - 0.5;
    let x0 = u.floor() as i64;
    let y0 = v.floor() as i64;

    let mut acc = [0.0f32; 3];
    let mut weight_sum = 0.0f32;

    for ty in (y0 - 2)..=(y0 + 3) {
        let wy = lanczos3(v - ty as f32);
        if wy == 0.0 {
            continue;
        }
        for tx in (x0 - 2)..=(x0 + 3) {
            let wx = lanczos3(u - tx as f32);
            if wx == 0.0 {
                continue;
            }
            let w = wx * wy;
            let texel = src.texel_on_white(tx, ty);
            acc[0] += w * texel.r;
            acc[1] += w * texel.g;
            acc[2] += w * texel.b;
            weight_sum += w;
        }
    }

    if weight_sum.abs() < f32::EPSILON {
        return src.texel_on_white(x0, y0);
    }
    LinearRgb::new(
        acc[0] / weight_sum,
        acc[1] / weight_sum,
        acc[2] / weight_sum,
    )
}

/// Sample the source bilinearly at a continuous position.
pub(crate) fn sample_bilinear(src: &SourceImage, sx: f32, sy: f32) -> LinearRgb {
    let u = sx - 0.5;
    let v = sy - 0.5;
    let x0 = u.floor() as i64;
    let y0 = v.floor() as i64;
    let tx = u - x0 as f32;
    let ty = v - y0 as f32;

    let c00 = src.texel_on_white(x0, y0);
    let c10 = src.texel_on_white(x0 + 1, y0);
    let c01 = src.texel_on_white(x0, y0 + 1);
    let c11 = src.texel_on_white(x0 + 1, y0 + 1);

    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
    LinearRgb::new(
        lerp(lerp(c00.r, c10.r, tx), lerp(c01.r, c11.r, tx), ty),
        lerp(lerp(c00.g, c10.g, tx), lerp(c01.g, c11.g, tx), ty),
        lerp(lerp(c00.b, c10.b, tx), lerp(c01.b, c11.b, tx), ty),
    )
}
