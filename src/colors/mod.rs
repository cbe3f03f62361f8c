//! Color handling.
//!
//! [`RgbColor`] is the hex color carried by render parameters and printed as
//! FFmpeg's `0xRRGGBB` literal. Palette suggestion from cover art lives in
//! `extract` and is only compiled with the `palette-extract` feature; query
//! [`palette_extraction_available`] instead of probing for it.

#[cfg(feature = "palette-extract")]
mod extract;

#[cfg(feature = "palette-extract")]
pub use extract::{contrast_ratio, extract_palette, relative_luminance, PaletteError, PaletteOptions};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether this build can suggest text colors from an image.
pub const fn palette_extraction_available() -> bool {
    cfg!(feature = "palette-extract")
}

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `RRGGBB` or `#RRGGBBAA` (alpha is ignored).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Color literal accepted by FFmpeg filter options, e.g. `0xFFDD00`.
    pub fn to_ffmpeg(&self) -> String {
        format!("0x{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid hex color: {0:?}")]
pub struct ColorParseError(pub String);

impl FromStr for RgbColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl Serialize for RgbColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RgbColor::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Primary, secondary and outline colors for the two lyric tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPalette {
    pub primary: RgbColor,
    pub secondary: RgbColor,
    pub outline: RgbColor,
}

impl Default for TextPalette {
    fn default() -> Self {
        Self {
            primary: RgbColor::WHITE,
            secondary: RgbColor::new(0xdd, 0xdd, 0xdd),
            outline: RgbColor::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(RgbColor::from_hex("#FF8000"), Some(RgbColor::new(255, 128, 0)));
        assert_eq!(RgbColor::from_hex("00ff88cc"), Some(RgbColor::new(0, 255, 136)));
        assert_eq!(RgbColor::from_hex("#FFF"), None);
        assert_eq!(RgbColor::from_hex("#GG0000"), None);
        assert_eq!(RgbColor::from_hex("#ééé"), None);
    }

    #[test]
    fn test_ffmpeg_literal() {
        assert_eq!(RgbColor::new(255, 221, 0).to_ffmpeg(), "0xFFDD00");
        assert_eq!(RgbColor::new(255, 221, 0).to_hex(), "#ffdd00");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&RgbColor::new(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: RgbColor = serde_json::from_str("\"#0A0B0C\"").unwrap();
        assert_eq!(back, RgbColor::new(10, 11, 12));
        assert!(serde_json::from_str::<RgbColor>("\"blue\"").is_err());
    }
}
