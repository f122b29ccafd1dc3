//! Pre-match enhancement passes over the rasterized grid.
//!
//! All passes operate in linear space, before quantization to 8-bit
//! storage, so repeated luminance arithmetic stays physically meaningful.

use crate::color::LinearRgb;

#[inline]
fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

#[inline]
fn cell(cells: &[LinearRgb], width: usize, x: usize, y: usize) -> LinearRgb {
    cells[y * width + x]
}

/// Unsharp mask: push each cell away from its 3x3 box-blurred
/// neighborhood by `amount`. `amount` of 0 is the identity.
pub(crate) fn sharpen(cells: &mut [LinearRgb], width: usize, height: usize, amount: f32) {
    if amount <= 0.0 || width == 0 || height == 0 {
        return;
    }
    let original = cells.to_vec();
    for y in 0..height {
        for x in 0..width {
            let mut sum = [0.0f32; 3];
            let mut count = 0.0f32;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let c = cell(&original, width, nx as usize, ny as usize);
                    sum[0] += c.r;
                    sum[1] += c.g;
                    sum[2] += c.b;
                    count += 1.0;
                }
            }
            let blur = LinearRgb::new(sum[0] / count, sum[1] / count, sum[2] / count);
            let c = cell(&original, width, x, y);
            cells[y * width + x] = LinearRgb::new(
                clamp01(c.r + amount * (c.r - blur.r)),
                clamp01(c.g + amount * (c.g - blur.g)),
                clamp01(c.b + amount * (c.b - blur.b)),
            );
        }
    }
}

/// Local contrast enhancement.
///
/// Each cell's luminance is pushed away from the mean luminance of its
/// 7x7 neighborhood and the color is rescaled to the new luminance,
/// preserving hue. A gentler relative of CLAHE that needs no histogram.
pub(crate) fn local_contrast(cells: &mut [LinearRgb], width: usize, height: usize, strength: f32) {
    if strength <= 0.0 || width == 0 || height == 0 {
        return;
    }
    const RADIUS: i64 = 3;
    let original = cells.to_vec();
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0f32;
            let mut count = 0.0f32;
            for dy in -RADIUS..=RADIUS {
                for dx in -RADIUS..=RADIUS {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    sum += cell(&original, width, nx as usize, ny as usize).luminance();
                    count += 1.0;
                }
            }
            let local_mean = sum / count;
            let c = cell(&original, width, x, y);
            let lum = c.luminance();
            if lum < 1e-5 {
                continue;
            }
            let new_lum = clamp01(lum + strength * (lum - local_mean));
            let ratio = new_lum / lum;
            cells[y * width + x] = LinearRgb::new(
                clamp01(c.r * ratio),
                clamp01(c.g * ratio),
                clamp01(c.b * ratio),
            );
        }
    }
}

/// Scale saturation around each cell's own luminance.
///
/// `factor` of 1.0 is the identity; above 1.0 increases colorfulness
/// without shifting luminance, below 1.0 moves toward grey.
pub(crate) fn scale_saturation(cells: &mut [LinearRgb], factor: f32) {
    if (factor - 1.0).abs() < 1e-6 {
        return;
    }
    for c in cells.iter_mut() {
        let lum = c.luminance();
        *c = LinearRgb::new(
            clamp01(lum + (c.r - lum) * factor),
            clamp01(lum + (c.g - lum) * factor),
            clamp01(lum + (c.b - lum) * factor),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_field(width: usize, height: usize, c: LinearRgb) -> Vec<LinearRgb> {
        vec![c; width * height]
    }

    #[test]
    fn test_sharpen_is_identity_on_flat_field() {
        let c = LinearRgb::new(0.4, 0.5, 0.6);
        let mut cells = flat_field(5, 5, c);
        sharpen(&mut cells, 5, 5, 0.8);
        for got in &cells {
            assert!((got.r - c.r).abs() < 1e-6);
            assert!((got.g - c.g).abs() < 1e-6);
            assert!((got.b - c.b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sharpen_increases_edge_contrast() {
        // Left half dark, right half bright.
        let mut cells = Vec::new();
        for _y in 0..4 {
            for x in 0..8 {
                let v = if x < 4 { 0.2 } else { 0.8 };
                cells.push(LinearRgb::new(v, v, v));
            }
        }
        let before_dark = cells[4 * 8 / 2 + 3].r;
        let before_bright = cells[4 * 8 / 2 + 4].r;
        sharpen(&mut cells, 8, 4, 1.0);
        let after_dark = cells[4 * 8 / 2 + 3].r;
        let after_bright = cells[4 * 8 / 2 + 4].r;
        assert!(after_dark < before_dark, "{after_dark} vs {before_dark}");
        assert!(after_bright > before_bright);
    }

    #[test]
    fn test_local_contrast_identity_on_flat_field() {
        let c = LinearRgb::new(0.3, 0.3, 0.3);
        let mut cells = flat_field(9, 9, c);
        local_contrast(&mut cells, 9, 9, 0.5);
        for got in &cells {
            assert!((got.r - c.r).abs() < 1e-6);
        }
    }

    #[test]
    fn test_saturation_boost_preserves_luminance() {
        let c = LinearRgb::new(0.6, 0.3, 0.2);
        let mut cells = vec![c];
        scale_saturation(&mut cells, 1.4);
        let boosted = cells[0];
        assert!((boosted.luminance() - c.luminance()).abs() < 1e-5);
        // Red channel moved further from luminance.
        assert!(boosted.r > c.r);
    }

    #[test]
    fn test_saturation_zero_is_grey() {
        let c = LinearRgb::new(0.9, 0.1, 0.4);
        let lum = c.luminance();
        let mut cells = vec![c];
        scale_saturation(&mut cells, 0.0);
        let grey = cells[0];
        assert!((grey.r - lum).abs() < 1e-6);
        assert!((grey.g - lum).abs() < 1e-6);
        assert!((grey.b - lum).abs() < 1e-6);
    }
}
