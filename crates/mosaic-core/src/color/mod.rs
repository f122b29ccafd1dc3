//! Color space types and conversions.
//!
//! The pipeline uses typed color values so stages cannot mix encodings:
//!
//! | Type | Property | Used for |
//! |------|----------|----------|
//! | [`Srgb`] | Standard gamma encoding | Input/output, 8-bit storage |
//! | [`LinearRgb`] | Proportional to light | Resampling, compositing, dithering |
//! | [`Oklab`] | Perceptually uniform | Default matching metric, spatial index |
//! | [`CieLab`] | CIE 1976 L\*a\*b\* | CIEDE2000 re-ranking only |
//! | [`Jzazbz`] | HDR-aware perceptual | Alternative matching metric |

mod cielab;
mod gamma;
mod jzazbz;
mod linear_rgb;
mod metric;
mod oklab;
mod srgb;

pub use cielab::CieLab;
pub use gamma::{linear_to_srgb, srgb_to_linear};
pub use jzazbz::Jzazbz;
pub use linear_rgb::LinearRgb;
pub use metric::ColorMetric;
pub use oklab::Oklab;
pub use srgb::Srgb;
