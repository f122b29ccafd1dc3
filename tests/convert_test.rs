//! End-to-end tests through the file-based conversion path: palette
//! JSON and a PNG on disk in, token text out.

use std::fs;
use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use tessera::convert::{self, CliError};

fn write_palette(dir: &TempDir, json: &str) -> PathBuf {
    let path = dir.path().join("palette.json");
    fs::write(&path, json).unwrap();
    path
}

fn write_png(dir: &TempDir, name: &str, image: &RgbaImage) -> PathBuf {
    let path = dir.path().join(name);
    image.save(&path).unwrap();
    path
}

fn red_blue_palette(dir: &TempDir) -> PathBuf {
    write_palette(
        dir,
        r#"[
            {"name": "red", "representativeColor": {"r": 255, "g": 0, "b": 0}},
            {"name": "blue", "representativeColor": {"r": 0, "g": 0, "b": 255}}
        ]"#,
    )
}

fn no_dither_options() -> mosaic_core::ConvertOptions {
    mosaic_core::ConvertOptions {
        dithering: false,
        ..mosaic_core::ConvertOptions::default()
    }
}

#[test]
fn test_half_red_half_blue_png_roundtrip() {
    let dir = TempDir::new().unwrap();
    let palette = red_blue_palette(&dir);

    let image = RgbaImage::from_fn(16, 16, |x, _y| {
        if x < 8 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    let png = write_png(&dir, "halves.png", &image);

    let report = convert::run(&palette, &png, 2, 1, no_dither_options()).unwrap();
    assert_eq!(report.text, ":red::blue:");
    assert_eq!(report.stats.populated, 2);
    assert_eq!(report.stats.distinct, 2);
}

#[test]
fn test_solid_image_uses_single_entry() {
    let dir = TempDir::new().unwrap();
    let palette = red_blue_palette(&dir);
    let image = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
    let png = write_png(&dir, "solid.png", &image);

    let report = convert::run(&palette, &png, 2, 2, no_dither_options()).unwrap();
    assert_eq!(report.text, ":red::red:\n:red::red:");
    assert_eq!(report.stats.top_entries, vec![("red".to_owned(), 4)]);
}

#[test]
fn test_full_palette_entry_fields_accepted() {
    let dir = TempDir::new().unwrap();
    let palette = write_palette(
        &dir,
        r#"[
            {
                "name": "moss",
                "representativeColor": {"r": 60, "g": 110, "b": 50},
                "accentColor": {"r": 100, "g": 160, "b": 80},
                "textureScore": 8.0,
                "colorProfile": [
                    {"color": {"r": 60, "g": 110, "b": 50}, "weight": 0.8},
                    {"color": {"r": 30, "g": 70, "b": 30}, "weight": 0.2}
                ]
            },
            {"name": "slate", "representativeColor": {"r": 90, "g": 95, "b": 105}}
        ]"#,
    );
    let image = RgbaImage::from_pixel(8, 8, Rgba([60, 110, 50, 255]));
    let png = write_png(&dir, "moss.png", &image);

    let report = convert::run(&palette, &png, 2, 2, no_dither_options()).unwrap();
    assert_eq!(report.stats.top_entries[0].0, "moss");
}

#[test]
fn test_duplicate_palette_names_rejected() {
    let dir = TempDir::new().unwrap();
    let palette = write_palette(
        &dir,
        r#"[
            {"name": "dup", "representativeColor": {"r": 0, "g": 0, "b": 0}},
            {"name": "dup", "representativeColor": {"r": 255, "g": 255, "b": 255}}
        ]"#,
    );
    let image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
    let png = write_png(&dir, "dup.png", &image);

    let err = convert::run(&palette, &png, 2, 2, no_dither_options()).unwrap_err();
    assert!(matches!(err, CliError::Convert(_)), "got: {err}");
    assert!(err.to_string().contains("dup"));
}

#[test]
fn test_unreadable_image_is_image_load_error() {
    let dir = TempDir::new().unwrap();
    let palette = red_blue_palette(&dir);
    let not_png = dir.path().join("garbage.png");
    fs::write(&not_png, b"this is not a png").unwrap();

    let err = convert::run(&palette, &not_png, 2, 2, no_dither_options()).unwrap_err();
    assert!(matches!(err, CliError::ImageLoad(_)), "got: {err}");
}

#[test]
fn test_malformed_palette_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let palette = write_palette(&dir, "{ not json");
    let image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
    let png = write_png(&dir, "x.png", &image);

    let err = convert::run(&palette, &png, 2, 2, no_dither_options()).unwrap_err();
    assert!(matches!(err, CliError::Palette(_)), "got: {err}");
}

#[test]
fn test_char_budget_applies_through_cli_path() {
    let dir = TempDir::new().unwrap();
    let palette = red_blue_palette(&dir);
    let image = RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 255]));
    let png = write_png(&dir, "budget.png", &image);

    let options = mosaic_core::ConvertOptions {
        char_budget: 100,
        dithering: false,
        ..mosaic_core::ConvertOptions::default()
    };
    let report = convert::run(&palette, &png, 20, 20, options).unwrap();
    assert!(
        report.stats.chars <= 100,
        "serialized {} chars over budget",
        report.stats.chars
    );
}
