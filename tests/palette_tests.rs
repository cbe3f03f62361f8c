//! Integration tests for cover-art palette extraction.

#![cfg(feature = "palette-extract")]

use image::{Rgb, RgbImage};
use lyric_video::colors::{contrast_ratio, extract_palette, relative_luminance, PaletteOptions};
use std::path::{Path, PathBuf};

fn write_two_tone_cover(dir: &Path) -> PathBuf {
    let cover = RgbImage::from_fn(300, 300, |x, _| {
        if x < 150 {
            Rgb([240, 220, 80])
        } else {
            Rgb([20, 20, 60])
        }
    });
    let path = dir.join("cover.png");
    cover.save(&path).unwrap();
    path
}

#[test]
fn test_two_tone_cover_gives_legible_pair() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_two_tone_cover(dir.path());

    let palette = extract_palette(&path, &PaletteOptions::default()).unwrap();
    assert!(relative_luminance(palette.primary) > relative_luminance(palette.secondary));
    assert!(contrast_ratio(palette.primary, palette.secondary) >= 3.0);
}

#[test]
fn test_extraction_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_two_tone_cover(dir.path());
    let options = PaletteOptions::default();

    let first = extract_palette(&path, &options).unwrap();
    let second = extract_palette(&path, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unreadable_image_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cover.png");
    std::fs::write(&path, b"not an image").unwrap();
    assert!(extract_palette(&path, &PaletteOptions::default()).is_err());
}
