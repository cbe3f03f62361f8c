//! Lyric loading and timing.
//!
//! - `parser`: LRC text to time-stamped entries plus metadata tags
//! - `timeline`: entries to contiguous `[start, end)` lines
//! - `window`: reduction of the line set for single-frame previews

mod parser;
mod timeline;
mod window;

pub use parser::{load_lrc, parse_lrc, LyricEntry, LyricMetadata, ParsedLyrics};
pub use timeline::{build_timeline, line_at, LyricLine};
pub use window::{select_visible, PreviewWindow, SCROLL_WINDOW_RADIUS};

use std::path::PathBuf;

/// Errors that can occur while loading lyrics.
#[derive(Debug, thiserror::Error)]
pub enum LyricsError {
    #[error("Failed to read lyric file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No timed lyric lines found in {0}")]
    Empty(PathBuf),
}
