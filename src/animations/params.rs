//! Geometry and styling shared by the animation fragments.

use crate::colors::RgbColor;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Golden ratio as used for the cover/text column split.
pub const GOLDEN_RATIO: f64 = 1.618;
/// `1 + GOLDEN_RATIO`: the left column is `width / GOLDEN_SUM` wide.
pub const GOLDEN_SUM: f64 = 2.618;

const fn non_zero(value: u32) -> NonZeroU32 {
    match NonZeroU32::new(value) {
        Some(v) => v,
        None => panic!("constant must be non-zero"),
    }
}

/// Output frame size and rate.
///
/// Zero dimensions are unrepresentable, so fragments never have to guard
/// against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSpec {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
    pub fps: NonZeroU32,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            width: non_zero(1920),
            height: non_zero(1080),
            fps: non_zero(60),
        }
    }
}

impl FrameSpec {
    /// `None` if any value is zero.
    pub fn new(width: u32, height: u32, fps: u32) -> Option<Self> {
        Some(Self {
            width: NonZeroU32::new(width)?,
            height: NonZeroU32::new(height)?,
            fps: NonZeroU32::new(fps)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }

    pub fn fps(&self) -> u32 {
        self.fps.get()
    }

    /// Frames needed to hold a still image for `duration` seconds, at least one.
    pub fn frame_count(&self, duration: f64) -> u64 {
        if duration > 0.0 {
            ((duration * self.fps() as f64) as u64).max(1)
        } else {
            1
        }
    }

    /// Index of the frame shown at `t` seconds.
    pub fn frame_index(&self, t: f64) -> u64 {
        (t.max(0.0) * self.fps() as f64) as u64
    }
}

/// Font, size and color of one lyric tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStyle {
    pub font: PathBuf,
    pub size: u32,
    pub color: RgbColor,
}

/// Styling handed to text animations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub primary: TierStyle,
    pub secondary: TierStyle,
    pub outline_color: RgbColor,
    pub outline_width: u32,
}

impl TextStyle {
    /// Primary tier font path in drawtext option form.
    pub fn primary_font(&self) -> String {
        escape_font_path(&self.primary.font)
    }

    pub fn secondary_font(&self) -> String {
        escape_font_path(&self.secondary.font)
    }
}

/// Font path as a drawtext `fontfile` value: forward slashes, escaped colons.
pub fn escape_font_path(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace(':', "\\:")
}

/// Make lyric text safe to embed in a quoted drawtext `text` option.
///
/// Quote, colon and percent are swapped for their full-width forms; commas
/// are backslash-escaped.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\'' => escaped.push('\u{2019}'),
            ':' => escaped.push('\u{ff1a}'),
            '%' => escaped.push('\u{ff05}'),
            ',' => escaped.push_str("\\,"),
            other => escaped.push(other),
        }
    }
    escaped
}
