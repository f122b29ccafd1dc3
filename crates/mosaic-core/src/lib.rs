//! mosaic-core: image to palette-token mosaic conversion
//!
//! This library turns a decoded source image into a grid of named
//! palette tokens: each output cell is resampled from the source,
//! matched against a palette of named colors with a perceptual metric,
//! optionally dithered, and serialized as a `:name:` token.
//!
//! # Quick Start
//!
//! ```
//! use mosaic_core::{ConvertOptions, Converter, PaletteEntry, SourceImage, Srgb};
//!
//! let entries = vec![
//!     PaletteEntry::new("night", Srgb::from_u8(10, 10, 30)),
//!     PaletteEntry::new("snow", Srgb::from_u8(245, 245, 250)),
//! ];
//! let converter = Converter::new(entries, ConvertOptions::default()).unwrap();
//!
//! let source = SourceImage::new(4, 4, vec![[245, 245, 250, 255]; 16]);
//! let result = converter.convert(&source, 2, 2).unwrap();
//! assert!(result.text.contains(":snow:"));
//! ```
//!
//! # Pipeline
//!
//! ```text
//! RGBA source             (decoded by the caller)
//!     |
//!     v
//! PixelGrid               (Lanczos3/bilinear supersampling, linear
//!     |                    space compositing onto white)
//!     v
//! Match loop              (perturb by diffusion error -> perceptual
//!     |                    nearest entry under usage caps -> diffuse
//!     |                    residual, serpentine Floyd-Steinberg)
//!     v
//! Post-processing         (spatial coherence, outlier filter)
//!     |
//!     v
//! Token text + stats      (":name:" per cell, rows newline-joined)
//! ```
//!
//! # Color handling
//!
//! Cell colors are averaged and diffused in linear RGB (light adds
//! linearly; gamma-encoded averages are simply wrong), while matching
//! distances are computed in a perceptual space selected by
//! [`ColorMetric`]: weighted Oklab by default, an HK-corrected Oklab
//! variant, exact CIEDE2000 re-ranking, or Jzazbz. See the [`color`]
//! module for the individual spaces.

pub mod api;
pub mod color;
pub mod dither;
mod matcher;
pub mod output;
pub mod palette;
mod postprocess;
pub mod raster;


pub use api::{Conversion, ConvertError, ConvertOptions, Converter, ProgressStage};
pub use color::{ColorMetric, LinearRgb, Oklab, Srgb};
pub use dither::DitherMode;
pub use output::{ConversionStats, ResultGrid, AVG_TOKEN_LENGTH, FALLBACK_TOKEN, MIN_GRID_SIDE};
pub use palette::{Palette, PaletteEntry, PaletteError, WeightedColor};
pub use raster::{PixelGrid, SourceImage};
