//! The conversion command: palette file + image file in, token text
//! and statistics out.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use mosaic_core::{ConvertError, ConvertOptions, Converter, ConversionStats, SourceImage};

use crate::palette_file::{self, PaletteFileError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Palette(#[from] PaletteFileError),

    #[error("image load failed: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// What one run produced, ready for printing.
#[derive(Debug)]
pub struct RunReport {
    pub text: String,
    pub stats: ConversionStats,
}

/// JSON shape of the `--stats-json` output.
#[derive(Debug, Serialize)]
pub struct StatsJson {
    pub populated: usize,
    pub distinct: usize,
    pub chars: usize,
    pub top_entries: Vec<TopEntryJson>,
}

#[derive(Debug, Serialize)]
pub struct TopEntryJson {
    pub name: String,
    pub count: usize,
}

impl From<&ConversionStats> for StatsJson {
    fn from(stats: &ConversionStats) -> Self {
        StatsJson {
            populated: stats.populated,
            distinct: stats.distinct,
            chars: stats.chars,
            top_entries: stats
                .top_entries
                .iter()
                .map(|(name, count)| TopEntryJson {
                    name: name.clone(),
                    count: *count,
                })
                .collect(),
        }
    }
}

/// Decode an image file into the engine's RGBA buffer form.
pub fn load_image(path: &Path) -> Result<SourceImage, CliError> {
    let decoded = image::open(path)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    info!(path = %path.display(), width, height, "image decoded");
    Ok(SourceImage::new(
        width as usize,
        height as usize,
        decoded
            .pixels()
            .map(|p| [p.0[0], p.0[1], p.0[2], p.0[3]])
            .collect(),
    ))
}

/// Run a full conversion from file paths.
pub fn run(
    palette_path: &Path,
    image_path: &Path,
    width: usize,
    height: usize,
    options: ConvertOptions,
) -> Result<RunReport, CliError> {
    let entries = palette_file::load(palette_path)?;
    info!(entries = entries.len(), "palette loaded");

    let converter = Converter::new(entries, options)?;
    let source = load_image(image_path)?;
    let result = converter.convert(&source, width, height)?;

    Ok(RunReport {
        text: result.text,
        stats: result.stats,
    })
}

/// Human-readable statistics block, one line per fact.
pub fn format_stats(stats: &ConversionStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("cells     {}\n", stats.populated));
    out.push_str(&format!("distinct  {}\n", stats.distinct));
    out.push_str(&format!("chars     {}\n", stats.chars));
    if !stats.top_entries.is_empty() {
        out.push_str("top entries:\n");
        for (name, count) in &stats.top_entries {
            out.push_str(&format!("  {count:>6}  {name}\n"));
        }
    }
    out
}
