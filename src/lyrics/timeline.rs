//! Timeline construction: each line ends where the next one starts.

use super::LyricEntry;
use serde::{Deserialize, Serialize};

/// A lyric line with a closed-open display interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    pub start: f64,
    pub end: f64,
    pub primary: String,
    pub secondary: String,
}

impl LyricLine {
    pub fn new(start: f64, end: f64, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            start,
            end,
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// Turn start-ordered entries into contiguous lines.
///
/// `end[i] == start[i + 1]` for every line but the last, whose end is
/// `total_duration`. When the audio is shorter than the last start time the
/// last line collapses to zero length instead of failing.
pub fn build_timeline(entries: &[LyricEntry], total_duration: f64) -> Vec<LyricLine> {
    debug_assert!(
        entries.windows(2).all(|w| w[0].start <= w[1].start),
        "lyric entries must be sorted by start time"
    );

    let mut lines: Vec<LyricLine> = entries
        .iter()
        .zip(entries.iter().skip(1).map(|next| next.start).chain(Some(total_duration)))
        .map(|(entry, end)| LyricLine::new(entry.start, end, &entry.primary, &entry.secondary))
        .collect();

    if let Some(last) = lines.last_mut() {
        if last.end < last.start {
            log::warn!(
                "Audio ends at {:.2}s before the last lyric line at {:.2}s; line will not be shown",
                total_duration,
                last.start
            );
            last.end = last.start;
        }
    }

    lines
}

/// Index of the line whose interval contains `t`.
pub fn line_at(lines: &[LyricLine], t: f64) -> Option<usize> {
    lines.iter().position(|line| line.contains(t))
}
