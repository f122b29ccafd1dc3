//! Unified error type for the public API.

use thiserror::Error;

use crate::palette::PaletteError;

/// Everything that can go wrong before a conversion starts.
///
/// Runtime numerics never error: degenerate cases (zero-variance
/// regions, tiny requested grids) are handled locally by the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// Palette validation failed; [`PaletteError::Empty`] is the
    /// "no palette" fast-fail case.
    #[error(transparent)]
    Palette(#[from] PaletteError),

    /// An option field is outside its documented range.
    #[error("invalid option {field}: {reason}")]
    InvalidOption {
        field: &'static str,
        reason: String,
    },
}
