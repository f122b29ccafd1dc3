//! Palette validation errors.

use thiserror::Error;

/// Returned when a palette fails validation at construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaletteError {
    /// No entries provided.
    #[error("palette cannot be empty")]
    Empty,

    /// Two entries share a token name; tokens must be unambiguous.
    #[error("duplicate entry name {name:?} at index {index}")]
    DuplicateName { index: usize, name: String },

    /// Texture scores are variances and cannot be negative.
    #[error("entry {name:?} has negative texture score {score}")]
    NegativeTexture { name: String, score: f32 },

    /// Cluster weights must be positive to contribute to the profile.
    #[error("entry {name:?} has a cluster with non-positive weight {weight}")]
    InvalidClusterWeight { name: String, weight: f32 },
}
