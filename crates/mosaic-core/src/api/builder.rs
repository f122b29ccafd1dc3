//! The `Converter` entry point.
//!
//! A `Converter` owns a validated palette, its spatial index and the
//! run options; `convert()` takes `&self`, so one converter serves any
//! number of images. All mutable run state (usage counters, error
//! buffer) is created inside `convert` and dropped with it.

use std::fmt;

use tracing::{debug, info};

use crate::api::error::ConvertError;
use crate::api::options::ConvertOptions;
use crate::dither::{DitherMode, Ditherer};
use crate::matcher::{Matcher, UsageTracker};
use crate::output::{budget_dimensions, serialize, stats, ConversionStats, ResultGrid};
use crate::palette::index::PaletteIndex;
use crate::palette::{Palette, PaletteEntry};
use crate::postprocess;
use crate::raster::{rasterize, RasterOptions, SourceImage};

/// Pipeline milestone reported through the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    Dimensions,
    Rasterize,
    Match,
    PostProcess,
    Serialize,
}

impl ProgressStage {
    /// Fixed completion percentage for the milestone.
    pub fn percent(self) -> u8 {
        match self {
            ProgressStage::Dimensions => 5,
            ProgressStage::Rasterize => 30,
            ProgressStage::Match => 80,
            ProgressStage::PostProcess => 90,
            ProgressStage::Serialize => 100,
        }
    }
}

type ProgressFn = Box<dyn Fn(ProgressStage)>;

/// The result of one conversion run.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub grid: ResultGrid,
    pub text: String,
    pub stats: ConversionStats,
}

/// Reusable image-to-token-grid converter.
pub struct Converter {
    palette: Palette,
    index: Option<PaletteIndex>,
    options: ConvertOptions,
    on_progress: Option<ProgressFn>,
}

impl fmt::Debug for Converter {
    // The progress callback is an opaque closure.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("palette", &self.palette)
            .field("indexed", &self.index.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// Validate the palette and options and prepare the converter.
    ///
    /// Fails fast on an empty or inconsistent palette and on any
    /// out-of-range option; no per-run work is done here besides
    /// building the spatial index for large palettes.
    pub fn new(entries: Vec<PaletteEntry>, options: ConvertOptions) -> Result<Self, ConvertError> {
        options.validate()?;
        let palette = Palette::new(entries)?;
        let index = palette.build_index();
        info!(
            entries = palette.len(),
            indexed = index.is_some(),
            "converter ready"
        );
        Ok(Self {
            palette,
            index,
            options,
            on_progress: None,
        })
    }

    /// Install a progress callback, invoked at each stage milestone.
    pub fn on_progress(mut self, callback: impl Fn(ProgressStage) + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn report(&self, stage: ProgressStage) {
        if let Some(callback) = &self.on_progress {
            callback(stage);
        }
    }

    /// Convert a decoded source image into a `width x height` token
    /// grid (dimensions may shrink to fit the character budget).
    pub fn convert(
        &self,
        source: &SourceImage,
        width: usize,
        height: usize,
    ) -> Result<Conversion, ConvertError> {
        let opts = &self.options;

        self.report(ProgressStage::Dimensions);
        let (width, height) = budget_dimensions(width, height, opts.char_budget);
        debug!(width, height, "grid dimensions fixed");

        self.report(ProgressStage::Rasterize);
        let pixels = rasterize(
            source,
            width,
            height,
            &RasterOptions {
                samples: opts.raster_samples,
                adaptive: opts.adaptive_sampling,
                lanczos: opts.lanczos,
                sharpening: opts.sharpening_strength,
                local_contrast: opts.clahe,
                local_contrast_strength: opts.clahe_strength,
                saturation: opts.saturation_boost,
            },
        );

        let matcher = Matcher::new(
            &self.palette,
            self.index.as_ref(),
            opts.color_metric,
            opts.texture_penalty as f32,
        );
        let mut tracker = UsageTracker::new(
            &self.palette,
            width * height,
            opts.tolerance,
            opts.per_color_tolerance,
            &opts.cap_exempt,
        );
        let mode = if opts.dithering {
            DitherMode::FloydSteinberg
        } else {
            DitherMode::Off
        };
        let mut ditherer = Ditherer::new(
            &pixels,
            mode,
            opts.dithering_strength as f32 / 100.0,
            opts.adaptive_dithering,
            opts.hybrid_dithering,
            opts.diffusion_clamp,
        );

        // The matching loop is strictly sequential: diffusion writes
        // forward and the tracker is read-then-written per cell.
        let mut grid = ResultGrid::new(width, height);
        for y in 0..height {
            let xs: Box<dyn Iterator<Item = usize>> = if ditherer.row_reverse(y) {
                Box::new((0..width).rev())
            } else {
                Box::new(0..width)
            };
            for x in xs {
                let base = pixels.linear(x, y);
                let target = ditherer.perturbed(x, y, base);
                let (entry, _) = matcher.select(target, &mut tracker);
                grid.set(x, y, entry);
                ditherer.diffuse(x, y, target, matcher.entry_linear(entry));
            }
            ditherer.advance_row();
        }
        self.report(ProgressStage::Match);

        if opts.spatial_coherence {
            postprocess::spatial_coherence(&mut grid, &pixels, &matcher, opts.coherence_strength);
        }
        if opts.median_filter {
            postprocess::median_filter(&mut grid, &pixels, &matcher);
        }
        self.report(ProgressStage::PostProcess);

        let text = serialize(&grid, &self.palette);
        let stats = stats(&grid, &self.palette, &text);
        self.report(ProgressStage::Serialize);
        info!(
            populated = stats.populated,
            distinct = stats.distinct,
            chars = stats.chars,
            "conversion complete"
        );

        Ok(Conversion { grid, text, stats })
    }
}
