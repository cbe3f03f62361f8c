//! Animation library.
//!
//! Every animation returns a filter-graph fragment: text that filters one
//! implicit input stream (generative backgrounds read none). A fragment may
//! use internal labels but must define every label it consumes; the
//! composer in [`crate::graph`] wires fragments together.
//!
//! - Backgrounds: static blur, gradient wave (generative), wave blur
//! - Text: fade + slide, scrolling list
//! - Cover: static with reflection, spinning vinyl record

mod background;
mod cover;
mod params;
mod registry;
mod text;

pub use background::{GradientWaveBackground, StaticBlurBackground, WaveBlurBackground, WaveTerm};
pub use cover::{RecordRings, StaticCover, VinylRecordCover};
pub use params::{
    escape_font_path, escape_text, FrameSpec, TextStyle, TierStyle, GOLDEN_RATIO, GOLDEN_SUM,
};
pub use registry::{create_background, create_cover, create_text, AnimationCatalog};
pub use text::{golden_column_x, FadeSlideText, ScrollingListText};

use crate::lyrics::{LyricLine, PreviewWindow};

/// Background layer filling the whole frame.
pub trait BackgroundAnimation: Send + Sync {
    fn kind(&self) -> BackgroundKind;

    /// Generative backgrounds synthesize all pixels and read no input stream.
    fn is_generative(&self) -> bool {
        false
    }

    fn fragment(&self, frame: &FrameSpec, duration: f64) -> String;
}

/// Lyric text drawn over the composited background.
pub trait TextAnimation: Send + Sync {
    fn kind(&self) -> TextKind;

    /// Lines a single-frame preview needs around its timestamp.
    fn preview_window(&self) -> PreviewWindow;

    /// Comma-joined drawtext chain, empty when `lines` is empty.
    fn fragment(&self, lines: &[LyricLine], style: &TextStyle, frame: &FrameSpec) -> String;
}

/// Cover art rendered from the cover input stream.
pub trait CoverAnimation: Send + Sync {
    fn kind(&self) -> CoverKind;

    fn fragment(&self, frame: &FrameSpec, duration: f64) -> String;
}

/// Turn a single still into a stream covering `duration` at the frame rate.
pub(crate) fn hold_still(width: u32, height: u32, frame: &FrameSpec, duration: f64) -> String {
    format!(
        "zoompan=z=1:d={}:s={width}x{height}:fps={}",
        frame.frame_count(duration),
        frame.fps()
    )
}

/// Available background animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackgroundKind {
    StaticBlur,
    GradientWave,
    WaveBlur,
}

impl BackgroundKind {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "static-blur" | "staticblur" | "static" | "blur" | "静态模糊" => Some(Self::StaticBlur),
            "gradient-wave" | "gradientwave" | "gradient" | "渐变波浪" => Some(Self::GradientWave),
            "wave-blur" | "waveblur" | "wave" | "波浪模糊" => Some(Self::WaveBlur),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::StaticBlur => "static-blur",
            Self::GradientWave => "gradient-wave",
            Self::WaveBlur => "wave-blur",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::StaticBlur => "Blurred still of the background image",
            Self::GradientWave => "Generated flowing color gradient (no image needed)",
            Self::WaveBlur => "Blurred background image with a moving ripple",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::StaticBlur, Self::GradientWave, Self::WaveBlur]
    }
}

/// Available lyric text animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKind {
    FadeSlide,
    ScrollingList,
}

impl TextKind {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fade-slide" | "fadeslide" | "fade" | "slide" | "淡入淡出" => Some(Self::FadeSlide),
            "scrolling-list" | "scrollinglist" | "scroll" | "list" | "滚动列表" => {
                Some(Self::ScrollingList)
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FadeSlide => "fade-slide",
            Self::ScrollingList => "scrolling-list",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FadeSlide => "One line at a time, sliding up while fading in",
            Self::ScrollingList => "Scrolling list with the current line highlighted",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::FadeSlide, Self::ScrollingList]
    }
}

/// Available cover animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverKind {
    Static,
    VinylRecord,
}

impl CoverKind {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "static" | "static-cover" | "reflection" | "静态展示" => Some(Self::Static),
            "vinyl-record" | "vinylrecord" | "vinyl" | "record" | "唱片旋转" => Some(Self::VinylRecord),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::VinylRecord => "vinyl-record",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Static => "Square cover with a soft reflection",
            Self::VinylRecord => "Spinning vinyl record with the cover as label",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Static, Self::VinylRecord]
    }
}

/// Errors raised when resolving animation names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown {category} animation '{name}' (available: {available})")]
    Unknown {
        category: &'static str,
        name: String,
        available: String,
    },
}
