//! Result grid, token serialization and summary statistics.

use std::collections::HashMap;

use crate::palette::Palette;

/// Token emitted for cells the matcher never populated.
pub const FALLBACK_TOKEN: &str = ":blank:";

/// Average serialized token length used for budget estimation.
pub const AVG_TOKEN_LENGTH: usize = 10;

/// Smallest allowed grid side after budget scaling.
pub const MIN_GRID_SIDE: usize = 2;

/// The matched grid: row-major palette entry indices, `None` for
/// unpopulated cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<u32>>,
}

impl ResultGrid {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Entry index at (x, y).
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        assert!(x < self.width && y < self.height);
        self.cells[y * self.width + x]
    }

    #[inline]
    pub(crate) fn set(&mut self, x: usize, y: usize, entry: u32) {
        assert!(x < self.width && y < self.height);
        self.cells[y * self.width + x] = Some(entry);
    }

    /// Iterate cells row-major.
    pub fn cells(&self) -> impl Iterator<Item = Option<u32>> + '_ {
        self.cells.iter().copied()
    }
}

/// Serialize the grid into newline-joined rows of `:name:` tokens.
pub fn serialize(grid: &ResultGrid, palette: &Palette) -> String {
    let mut out = String::new();
    for y in 0..grid.height() {
        if y > 0 {
            out.push('\n');
        }
        for x in 0..grid.width() {
            match grid.get(x, y) {
                Some(idx) => {
                    out.push(':');
                    out.push_str(palette.entry(idx as usize).name());
                    out.push(':');
                }
                None => out.push_str(FALLBACK_TOKEN),
            }
        }
    }
    out
}

/// Summary statistics over a serialized conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionStats {
    /// Cells the matcher populated.
    pub populated: usize,
    /// Distinct entries used.
    pub distinct: usize,
    /// Length of the serialized text in characters.
    pub chars: usize,
    /// Up to ten most-used entries, by descending count.
    pub top_entries: Vec<(String, usize)>,
}

/// Number of entries reported in [`ConversionStats::top_entries`].
const TOP_ENTRIES: usize = 10;

pub fn stats(grid: &ResultGrid, palette: &Palette, text: &str) -> ConversionStats {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for cell in grid.cells().flatten() {
        *counts.entry(cell).or_insert(0) += 1;
    }

    let populated = counts.values().sum();
    let distinct = counts.len();

    let mut ranked: Vec<(u32, usize)> = counts.into_iter().collect();
    // Count descending, index ascending for a stable report.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(TOP_ENTRIES);

    ConversionStats {
        populated,
        distinct,
        chars: text.chars().count(),
        top_entries: ranked
            .into_iter()
            .map(|(idx, n)| (palette.entry(idx as usize).name().to_owned(), n))
            .collect(),
    }
}

/// Scale requested dimensions down to fit a character budget.
///
/// The serialized length is estimated as `cells * AVG_TOKEN_LENGTH`
/// plus row separators. Both sides shrink by the same factor so the
/// aspect ratio survives; scaled sides below [`MIN_GRID_SIDE`] are
/// silently raised, never an error. A budget of 0 means unlimited.
/// Directly requested dimensions pass through untouched, so 1-row and
/// 1-column grids stay possible.
pub fn budget_dimensions(width: usize, height: usize, char_budget: usize) -> (usize, usize) {
    let width = width.max(1);
    let height = height.max(1);
    if char_budget == 0 {
        return (width, height);
    }

    let estimate = width * height * AVG_TOKEN_LENGTH + height.saturating_sub(1);
    if estimate <= char_budget {
        return (width, height);
    }

    let scale = (char_budget as f64 / estimate as f64).sqrt();
    let w = ((width as f64 * scale).floor() as usize).max(MIN_GRID_SIDE);
    let h = ((height as f64 * scale).floor() as usize).max(MIN_GRID_SIDE);
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Srgb;
    use crate::palette::PaletteEntry;

    fn palette() -> Palette {
        Palette::new(vec![
            PaletteEntry::new("oak", Srgb::from_u8(120, 90, 50)),
            PaletteEntry::new("fern", Srgb::from_u8(60, 130, 60)),
        ])
        .unwrap()
    }

    #[test]
    fn test_serialize_rows_and_fallback() {
        let palette = palette();
        let mut grid = ResultGrid::new(2, 2);
        grid.set(0, 0, 0);
        grid.set(1, 0, 1);
        grid.set(0, 1, 1);
        // (1,1) stays unpopulated.
        let text = serialize(&grid, &palette);
        assert_eq!(text, ":oak::fern:\n:fern::blank:");
    }

    #[test]
    fn test_stats_counts() {
        let palette = palette();
        let mut grid = ResultGrid::new(3, 1);
        grid.set(0, 0, 0);
        grid.set(1, 0, 0);
        grid.set(2, 0, 1);
        let text = serialize(&grid, &palette);
        let s = stats(&grid, &palette, &text);
        assert_eq!(s.populated, 3);
        assert_eq!(s.distinct, 2);
        assert_eq!(s.chars, text.chars().count());
        assert_eq!(s.top_entries[0], ("oak".to_owned(), 2));
        assert_eq!(s.top_entries[1], ("fern".to_owned(), 1));
    }

    #[test]
    fn test_budget_zero_is_unlimited() {
        assert_eq!(budget_dimensions(40, 30, 0), (40, 30));
    }

    #[test]
    fn test_budget_under_estimate_untouched() {
        // 4*4*10 + 3 = 163 <= 200
        assert_eq!(budget_dimensions(4, 4, 200), (4, 4));
    }

    #[test]
    fn test_budget_scales_down_preserving_aspect() {
        // 20x20 at ~10 chars/token is ~4000 chars; a budget of 100
        // forces both sides down to 3 (sqrt(100/4019) ~ 0.157).
        let (w, h) = budget_dimensions(20, 20, 100);
        assert!(w <= 10 && h <= 10, "got {w}x{h}");
        assert!(w >= MIN_GRID_SIDE && h >= MIN_GRID_SIDE);
        assert_eq!(w, h, "square request should stay square");
    }

    #[test]
    fn test_budget_floors_at_min_side() {
        let (w, h) = budget_dimensions(100, 100, 10);
        assert_eq!((w, h), (MIN_GRID_SIDE, MIN_GRID_SIDE));
    }

    #[test]
    fn test_direct_request_passes_through() {
        // Single-row and single-column grids are legitimate requests;
        // only budget scaling applies the minimum-side floor.
        assert_eq!(budget_dimensions(2, 1, 0), (2, 1));
        assert_eq!(budget_dimensions(1, 1, 0), (1, 1));
        assert_eq!(budget_dimensions(0, 5, 0), (1, 5));
    }
}
