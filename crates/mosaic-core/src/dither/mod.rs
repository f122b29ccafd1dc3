//! Error diffusion and ordered dithering over the cell grid.
//!
//! The ditherer is a per-run state machine. Floyd-Steinberg diffusion
//! walks the grid serpentine (alternating row direction, mirroring the
//! kernel horizontally) and carries quantization error in a sliding
//! two-row buffer, all in linear RGB. Ordered mode perturbs each cell
//! by a Bayer threshold instead and carries no state between cells.

mod bayer;

use crate::color::LinearRgb;
use crate::raster::PixelGrid;

/// Dithering mode for a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherMode {
    /// No perturbation; the matcher sees raw cell colors.
    Off,
    /// Serpentine Floyd-Steinberg error diffusion.
    #[default]
    FloydSteinberg,
    /// Bayer 8x8 ordered dithering.
    Ordered,
}

/// Floyd-Steinberg weight split: right 7/16, below-back 3/16,
/// below 5/16, below-forward 1/16. `dx` is mirrored on reverse rows.
const FS_KERNEL: [(i64, i64, f32); 4] = [
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Per-component cap on each diffused share when clamping is enabled.
/// Off by default: capping shares at 0.1 limits total propagation to
/// about a third of a full-range residual, which stops diffusion from
/// ever flipping cells across large quantization errors.
const DIFFUSION_CLAMP: f32 = 0.1;

/// Sigmoid steepness and variance threshold for adaptive strength.
const ADAPTIVE_K: f32 = 10.0;
const ADAPTIVE_THRESHOLD: f32 = 0.15;

/// Smooth high-gradient cells get their strength boosted by 20%.
const GRADIENT_BOOST: f32 = 1.2;
const SMOOTH_VARIANCE: f32 = 0.02;
const BOOST_GRADIENT: f32 = 0.05;

/// Cells below this local variance count as "graphic" in hybrid mode
/// and use ordered dithering instead of diffusion.
const GRAPHIC_VARIANCE: f32 = 0.005;

/// Amplitude of the ordered threshold at full strength.
const ORDERED_AMPLITUDE: f32 = 0.5;

/// Sliding row buffer of accumulated diffusion error.
///
/// `rows[0]` is the row currently being scanned; `advance_row` rotates
/// it away and zeroes a fresh trailing row.
#[derive(Debug)]
struct ErrorBuffer {
    rows: Vec<Vec<[f32; 3]>>,
    width: usize,
}

impl ErrorBuffer {
    fn new(width: usize, depth: usize) -> Self {
        Self {
            rows: vec![vec![[0.0; 3]; width]; depth],
            width,
        }
    }

    #[inline]
    fn accumulated(&self, x: usize) -> [f32; 3] {
        self.rows[0][x]
    }

    #[inline]
    fn add(&mut self, x: i64, dy: usize, error: [f32; 3]) {
        if x < 0 || x >= self.width as i64 || dy >= self.rows.len() {
            return;
        }
        let cell = &mut self.rows[dy][x as usize];
        cell[0] += error[0];
        cell[1] += error[1];
        cell[2] += error[2];
    }

    fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill([0.0; 3]);
        }
    }
}

/// Per-run dithering state.
pub(crate) struct Ditherer {
    mode: DitherMode,
    hybrid: bool,
    adaptive: bool,
    /// Cap each diffused share at [`DIFFUSION_CLAMP`].
    clamp: bool,
    /// Base strength in 0..=1.
    strength: f32,
    buffer: ErrorBuffer,
    /// 5x5 local color variance per cell.
    variance: Vec<f32>,
    /// Luminance gradient magnitude per cell.
    gradient: Vec<f32>,
    width: usize,
    height: usize,
}

impl Ditherer {
    /// Build run state, precomputing the variance and gradient maps
    /// from the rasterized grid.
    pub(crate) fn new(
        grid: &PixelGrid,
        mode: DitherMode,
        strength: f32,
        adaptive: bool,
        hybrid: bool,
        clamp: bool,
    ) -> Self {
        let width = grid.width();
        let height = grid.height();
        let linear: Vec<LinearRgb> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| grid.linear(x, y))
            .collect();

        Self {
            mode,
            hybrid,
            adaptive,
            clamp,
            strength: strength.clamp(0.0, 1.0),
            buffer: ErrorBuffer::new(width.max(1), 2),
            variance: local_variance(&linear, width, height),
            gradient: gradient_magnitude(&linear, width, height),
            width,
            height,
        }
    }

    /// Whether row `y` is scanned right-to-left.
    #[inline]
    pub(crate) fn row_reverse(&self, y: usize) -> bool {
        self.mode == DitherMode::FloydSteinberg && y % 2 == 1
    }

    /// Whether this cell uses ordered thresholds instead of diffusion.
    #[inline]
    fn cell_ordered(&self, x: usize, y: usize) -> bool {
        match self.mode {
            DitherMode::Off => false,
            DitherMode::Ordered => true,
            DitherMode::FloydSteinberg => {
                self.hybrid && self.variance[y * self.width + x] < GRAPHIC_VARIANCE
            }
        }
    }

    /// The color the matcher should see for this cell: the base color
    /// plus accumulated error (diffusion) or a Bayer offset (ordered),
    /// clamped to the unit cube.
    pub(crate) fn perturbed(&self, x: usize, y: usize, base: LinearRgb) -> LinearRgb {
        match self.mode {
            DitherMode::Off => base,
            _ if self.cell_ordered(x, y) => {
                let offset = bayer::threshold(x, y) * self.strength * ORDERED_AMPLITUDE;
                LinearRgb::new(base.r + offset, base.g + offset, base.b + offset).clamped()
            }
            _ => {
                let err = self.buffer.accumulated(x);
                LinearRgb::new(base.r + err[0], base.g + err[1], base.b + err[2]).clamped()
            }
        }
    }

    /// Diffuse the residual between the perturbed target and the chosen
    /// entry color into the forward neighbors.
    pub(crate) fn diffuse(&mut self, x: usize, y: usize, target: LinearRgb, chosen: LinearRgb) {
        if self.mode != DitherMode::FloydSteinberg || self.cell_ordered(x, y) {
            return;
        }
        let factor = self.effective_strength(x, y);
        if factor <= 0.0 {
            return;
        }

        let residual = [
            (target.r - chosen.r) * factor,
            (target.g - chosen.g) * factor,
            (target.b - chosen.b) * factor,
        ];

        let mirror: i64 = if self.row_reverse(y) { -1 } else { 1 };
        for (dx, dy, weight) in FS_KERNEL {
            let mut share = [
                residual[0] * weight,
                residual[1] * weight,
                residual[2] * weight,
            ];
            if self.clamp {
                for c in &mut share {
                    *c = c.clamp(-DIFFUSION_CLAMP, DIFFUSION_CLAMP);
                }
            }
            self.buffer.add(x as i64 + dx * mirror, dy as usize, share);
        }
    }

    /// Rotate the error buffer at the end of a row.
    pub(crate) fn advance_row(&mut self) {
        if self.mode == DitherMode::FloydSteinberg {
            self.buffer.advance_row();
        }
    }

    /// Strength for this cell. With adaptive dithering, a sigmoid
    /// attenuates diffusion in busy regions (variance above the
    /// threshold) and a boost strengthens it on smooth gradients.
    fn effective_strength(&self, x: usize, y: usize) -> f32 {
        if !self.adaptive {
            return self.strength;
        }
        let i = y * self.width + x;
        let v = self.variance[i];
        let mut factor = self.strength / (1.0 + (ADAPTIVE_K * (v - ADAPTIVE_THRESHOLD)).exp());
        if v < SMOOTH_VARIANCE && self.gradient[i] > BOOST_GRADIENT {
            factor *= GRADIENT_BOOST;
        }
        factor.clamp(0.0, 1.0)
    }

    #[cfg(test)]
    fn accumulated(&self, x: usize) -> [f32; 3] {
        self.buffer.accumulated(x)
    }

    #[cfg(test)]
    fn next_row(&self, x: usize) -> [f32; 3] {
        self.buffer.rows[1][x]
    }
}

/// Mean per-channel color variance over each cell's 5x5 neighborhood.
fn local_variance(cells: &[LinearRgb], width: usize, height: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut mean = [0.0f32; 3];
            let mut count = 0.0f32;
            for dy in -2i64..=2 {
                for dx in -2i64..=2 {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let c = cells[ny as usize * width + nx as usize];
                    mean[0] += c.r;
                    mean[1] += c.g;
                    mean[2] += c.b;
                    count += 1.0;
                }
            }
            mean[0] /= count;
            mean[1] /= count;
            mean[2] /= count;

            let mut var = 0.0f32;
            for dy in -2i64..=2 {
                for dx in -2i64..=2 {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let c = cells[ny as usize * width + nx as usize];
                    let dr = c.r - mean[0];
                    let dg = c.g - mean[1];
                    let db = c.b - mean[2];
                    var += (dr * dr + dg * dg + db * db) / 3.0;
                }
            }
            out[y * width + x] = (var / count).max(0.0);
        }
    }
    out
}

/// Central-difference luminance gradient magnitude per cell.
fn gradient_magnitude(cells: &[LinearRgb], width: usize, height: usize) -> Vec<f32> {
    let lum =
        |x: usize, y: usize| cells[y.min(height - 1) * width + x.min(width - 1)].luminance();
    let mut out = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let gx = lum(x + 1, y) - lum(x.saturating_sub(1), y);
            let gy = lum(x, y + 1) - lum(x, y.saturating_sub(1));
            out[y * width + x] = (gx * gx + gy * gy).sqrt();
        }
    }
    out
}
