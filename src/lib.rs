//! Tessera
//!
//! Renders raster images as token grids drawn from large color
//! palettes. This crate is the CLI and file-format glue around the
//! [`mosaic_core`] engine; it exposes its modules for integration
//! testing.

pub mod convert;
pub mod palette_file;
