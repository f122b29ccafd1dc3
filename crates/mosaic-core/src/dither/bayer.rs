//! Ordered dithering threshold matrix.

/// Classic 8x8 Bayer matrix, values 0..=63.
///
/// Recursive construction of the 2x2 base pattern; each value appears
/// exactly once, so thresholds cover the range uniformly.
pub(crate) const BAYER_8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Normalized, centered threshold for a grid position: in (-0.5, 0.5),
/// mean zero over the full matrix.
#[inline]
pub(crate) fn threshold(x: usize, y: usize) -> f32 {
    (BAYER_8[y % 8][x % 8] as f32 + 0.5) / 64.0 - 0.5
}
