//! Public conversion API: options, errors and the [`Converter`].

mod builder;
mod error;
mod options;

pub use builder::{Conversion, Converter, ProgressStage};
pub use error::ConvertError;
pub use options::ConvertOptions;
