//! Palette description files.
//!
//! Palettes arrive as JSON produced by an external color-profile
//! extractor: a list of `{name, representativeColor, accentColor?,
//! textureScore?, colorProfile?}` objects. This module parses that
//! format and converts it into engine [`PaletteEntry`] values; all
//! semantic validation (duplicate names, negative texture scores,
//! cluster weights) happens in the engine when the converter is built.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use mosaic_core::{PaletteEntry, Srgb, WeightedColor};

#[derive(Debug, Error)]
pub enum PaletteFileError {
    #[error("cannot read palette file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse palette file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// 8-bit color value as the extractor writes it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RgbValue {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl From<RgbValue> for Srgb {
    fn from(value: RgbValue) -> Self {
        Srgb::from_u8(value.r, value.g, value.b)
    }
}

/// One weighted cluster of a multi-cluster color profile.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProfileCluster {
    pub color: RgbValue,
    pub weight: f32,
}

/// One palette entry as serialized by the extractor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub representative_color: RgbValue,
    #[serde(default)]
    pub accent_color: Option<RgbValue>,
    #[serde(default)]
    pub texture_score: Option<f32>,
    #[serde(default)]
    pub color_profile: Option<Vec<ProfileCluster>>,
}

impl From<FileEntry> for PaletteEntry {
    fn from(file: FileEntry) -> Self {
        let mut entry = PaletteEntry::new(&file.name, file.representative_color.into());
        if let Some(accent) = file.accent_color {
            entry = entry.with_accent(accent.into());
        }
        if let Some(texture) = file.texture_score {
            entry = entry.with_texture(texture);
        }
        if let Some(profile) = file.color_profile {
            let clusters = profile
                .into_iter()
                .map(|c| WeightedColor {
                    color: c.color.into(),
                    weight: c.weight,
                })
                .collect();
            entry = entry.with_clusters(clusters);
        }
        entry
    }
}

/// Load a palette file (a JSON array of entries) into engine entries.
pub fn load(path: &Path) -> Result<Vec<PaletteEntry>, PaletteFileError> {
    let text = fs::read_to_string(path).map_err(|source| PaletteFileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text).map_err(|source| PaletteFileError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Parse palette JSON text into engine entries.
pub fn parse(text: &str) -> Result<Vec<PaletteEntry>, serde_json::Error> {
    let entries: Vec<FileEntry> = serde_json::from_str(text)?;
    Ok(entries.into_iter().map(PaletteEntry::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::palette::TEXTURE_UNKNOWN;

    #[test]
    fn test_parse_minimal_entry() {
        let entries = parse(r#"[{"name": "oak", "representativeColor": {"r": 120, "g": 90, "b": 40}}]"#)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name(), "oak");
        assert_eq!(entries[0].color().to_bytes(), [120, 90, 40]);
        assert!(entries[0].accent().is_none());
        // No textureScore means unknown, not zero.
        assert_eq!(entries[0].texture(), TEXTURE_UNKNOWN);
    }

    #[test]
    fn test_parse_full_entry() {
        let entries = parse(
            r#"[{
                "name": "fern",
                "representativeColor": {"r": 40, "g": 120, "b": 60},
                "accentColor": {"r": 90, "g": 180, "b": 100},
                "textureScore": 12.5,
                "colorProfile": [
                    {"color": {"r": 40, "g": 120, "b": 60}, "weight": 0.7},
                    {"color": {"r": 20, "g": 80, "b": 40}, "weight": 0.3}
                ]
            }]"#,
        )
        .unwrap();
        let entry = &entries[0];
        assert_eq!(entry.accent().map(|c| c.to_bytes()), Some([90, 180, 100]));
        assert_eq!(entry.known_texture(), Some(12.5));
        assert_eq!(entry.clusters().len(), 2);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(parse("{\"not\": \"a list\"}").is_err());
        assert!(parse("[{\"name\": \"x\"}]").is_err(), "missing color");
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = load(Path::new("/nonexistent/palette.json")).unwrap_err();
        assert!(matches!(err, PaletteFileError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/palette.json"));
    }
}
