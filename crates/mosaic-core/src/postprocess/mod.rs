//! Whole-grid cleanup passes run after matching.
//!
//! Both passes read a snapshot of the matched grid and write into the
//! live grid, so a replacement never cascades into its own neighbors
//! within the same pass. Neither pass touches usage counters; they
//! trade small accuracy deltas for spatial consistency.

use std::collections::HashMap;

use tracing::debug;

use crate::matcher::Matcher;
use crate::output::ResultGrid;
use crate::raster::PixelGrid;

/// Distance slack per unit of coherence strength.
const COHERENCE_SLACK: f32 = 0.15;

/// A cell is an outlier when its distance exceeds this multiple of the
/// neighbor average.
const OUTLIER_FACTOR: f32 = 2.0;

/// A replacement may be at most this much worse than the original.
const REPLACEMENT_SLACK: f32 = 1.2;

/// Minimum populated 8-neighbors for the outlier test to be meaningful.
const MIN_NEIGHBORS: usize = 3;

/// Nudge cells toward their neighbors' entries when the neighbor entry
/// is almost as good a match, biasing toward uniform regions.
///
/// For each cell, 4-connected neighbor entries are considered by
/// descending frequency; the first one within
/// `(1 + 0.15 * strength)` of the cell's current distance wins.
pub(crate) fn spatial_coherence(
    grid: &mut ResultGrid,
    pixels: &PixelGrid,
    matcher: &Matcher<'_>,
    strength: f32,
) {
    let snapshot = grid.clone();
    let slack = 1.0 + COHERENCE_SLACK * strength.max(0.0);
    let mut replaced = 0usize;

    for y in 0..snapshot.height() {
        for x in 0..snapshot.width() {
            let Some(current) = snapshot.get(x, y) else {
                continue;
            };
            let target = matcher.project_target(pixels.linear(x, y));
            let current_dist = matcher.score(&target, current);

            // Frequency of each distinct neighbor entry.
            let mut counts: HashMap<u32, usize> = HashMap::new();
            for (nx, ny) in neighbors4(x, y, snapshot.width(), snapshot.height()) {
                if let Some(entry) = snapshot.get(nx, ny) {
                    if entry != current {
                        *counts.entry(entry).or_insert(0) += 1;
                    }
                }
            }
            let mut ranked: Vec<(u32, usize)> = counts.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

            for (entry, _) in ranked {
                if matcher.score(&target, entry) <= current_dist * slack {
                    grid.set(x, y, entry);
                    replaced += 1;
                    break;
                }
            }
        }
    }
    debug!(replaced, "spatial coherence pass complete");
}

/// Replace isolated bad matches with the dominant neighbor entry.
///
/// A cell qualifies when at least three 8-connected neighbors are
/// populated and its own distance exceeds twice their average. The
/// most frequent neighbor entry is substituted only if its own
/// distance stays within 1.2x the original, so the pass never accepts
/// a clearly worse visual match.
pub(crate) fn median_filter(grid: &mut ResultGrid, pixels: &PixelGrid, matcher: &Matcher<'_>) {
    let snapshot = grid.clone();

    // Every populated cell's own match distance, computed once.
    let mut distances = vec![f32::NAN; snapshot.width() * snapshot.height()];
    for y in 0..snapshot.height() {
        for x in 0..snapshot.width() {
            if let Some(entry) = snapshot.get(x, y) {
                let target = matcher.project_target(pixels.linear(x, y));
                distances[y * snapshot.width() + x] = matcher.score(&target, entry);
            }
        }
    }

    let mut replaced = 0usize;
    for y in 0..snapshot.height() {
        for x in 0..snapshot.width() {
            let Some(current) = snapshot.get(x, y) else {
                continue;
            };

            let mut neighbor_entries: Vec<u32> = Vec::with_capacity(8);
            let mut neighbor_dist_sum = 0.0f32;
            for (nx, ny) in neighbors8(x, y, snapshot.width(), snapshot.height()) {
                if let Some(entry) = snapshot.get(nx, ny) {
                    neighbor_entries.push(entry);
                    neighbor_dist_sum += distances[ny * snapshot.width() + nx];
                }
            }
            if neighbor_entries.len() < MIN_NEIGHBORS {
                continue;
            }

            let own = distances[y * snapshot.width() + x];
            let avg = neighbor_dist_sum / neighbor_entries.len() as f32;
            if own <= avg * OUTLIER_FACTOR {
                continue;
            }

            let Some(mode) = mode_entry(&neighbor_entries) else {
                continue;
            };
            if mode == current {
                continue;
            }
            let target = matcher.project_target(pixels.linear(x, y));
            if matcher.score(&target, mode) <= own * REPLACEMENT_SLACK {
                grid.set(x, y, mode);
                replaced += 1;
            }
        }
    }
    debug!(replaced, "median filter pass complete");
}

fn neighbors4(x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    [(0i64, -1i64), (-1, 0), (1, 0), (0, 1)]
        .into_iter()
        .filter_map(move |(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            (nx >= 0 && ny >= 0 && nx < w as i64 && ny < h as i64)
                .then(|| (nx as usize, ny as usize))
        })
}

fn neighbors8(x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    (-1i64..=1)
        .flat_map(|dy| (-1i64..=1).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .filter_map(move |(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            (nx >= 0 && ny >= 0 && nx < w as i64 && ny < h as i64)
                .then(|| (nx as usize, ny as usize))
        })
}

/// Most frequent entry; ties resolved by smallest index.
fn mode_entry(entries: &[u32]) -> Option<u32> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for &e in entries {
        *counts.entry(e).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(e, _)| e)
}
