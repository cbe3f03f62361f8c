//! Lyric Video Core
//!
//! Karaoke-style lyric videos rendered by a single FFmpeg invocation.
//!
//! # Features
//!
//! - LRC parsing with bilingual line pairing and metadata tags
//! - Typed FFmpeg expression builder with a numeric evaluator
//! - Background, text and cover animations emitted as filter-graph fragments
//! - Graph composition with label and input-index checks
//! - Async FFmpeg driver with progress, timeout and cancellation
//! - Text palette extraction from cover art (when `palette-extract` is enabled)

pub mod animations;
pub mod colors;
pub mod expr;
pub mod graph;
pub mod lyrics;
pub mod render;

// Re-export commonly used types
pub use animations::{
    AnimationCatalog, BackgroundAnimation, BackgroundKind, CatalogError, CoverAnimation, CoverKind,
    FrameSpec, TextAnimation, TextKind, TextStyle, TierStyle,
};
pub use colors::{RgbColor, TextPalette};
pub use graph::{compose, CompositionGraph, GraphError, GraphInputs, InputLayout};
pub use lyrics::{build_timeline, load_lrc, parse_lrc, LyricLine, LyricsError, ParsedLyrics};
pub use render::{
    render, HwAccel, RenderError, RenderEvent, RenderOptions, RenderOutcome, RenderParameters,
    RenderTarget,
};
