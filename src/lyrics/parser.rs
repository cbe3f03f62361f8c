//! LRC parsing.
//!
//! Two bilingual layouts are accepted:
//! - two lines carrying the same timestamp (first is primary, second is secondary)
//! - one line of the form `primary / secondary`

use super::LyricsError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d{2}):(\d{2})\.(\d{2,3})\]").expect("failed to compile TIMESTAMP_REGEX")
});

static METADATA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(ti|ar|al|by):([^\]]*)\]").expect("failed to compile METADATA_REGEX")
});

/// One timed lyric entry before end times are known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricEntry {
    /// Start time in seconds.
    pub start: f64,
    pub primary: String,
    /// Translation tier, empty when the line has none.
    pub secondary: String,
}

impl LyricEntry {
    pub fn new(start: f64, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            start,
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

/// Song metadata carried by `[ti:]`, `[ar:]`, `[al:]` and `[by:]` tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub author: Option<String>,
}

impl LyricMetadata {
    fn set(&mut self, key: &str, value: &str) {
        let slot = match key {
            "ti" => &mut self.title,
            "ar" => &mut self.artist,
            "al" => &mut self.album,
            "by" => &mut self.author,
            _ => return,
        };
        *slot = Some(value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.album.is_none() && self.author.is_none()
    }
}

/// Result of parsing an LRC document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedLyrics {
    /// Entries sorted by start time, one per distinct timestamp.
    pub entries: Vec<LyricEntry>,
    pub metadata: LyricMetadata,
}

/// Parse LRC text into entries and metadata.
///
/// Lines without a timestamp or metadata tag are skipped, as are timestamps
/// with no text. Entries whose primary text ends up empty are dropped.
pub fn parse_lrc(content: &str) -> ParsedLyrics {
    let mut metadata = LyricMetadata::default();
    // Keyed by milliseconds so repeated timestamps group together in order.
    let mut grouped: BTreeMap<u64, Vec<String>> = BTreeMap::new();

    for (line_num, raw_line) in content.lines().enumerate() {
        if let Some(caps) = METADATA_REGEX.captures(raw_line) {
            let value = caps[2].trim();
            if !value.is_empty() {
                metadata.set(&caps[1], value);
            }
            continue;
        }

        let Some(caps) = TIMESTAMP_REGEX.captures(raw_line) else {
            if !raw_line.trim().is_empty() {
                log::debug!("LRC line {}: no timestamp, skipped", line_num + 1);
            }
            continue;
        };

        let Some(millis) = timestamp_millis(&caps[1], &caps[2], &caps[3]) else {
            log::warn!("LRC line {}: unreadable timestamp, skipped", line_num + 1);
            continue;
        };

        let tag_end = caps.get(0).map_or(0, |m| m.end());
        let text = raw_line[tag_end..].trim();
        if !text.is_empty() {
            grouped.entry(millis).or_default().push(text.to_string());
        }
    }

    let entries = grouped
        .into_iter()
        .filter_map(|(millis, texts)| pair_tiers(&texts).map(|(primary, secondary)| {
            LyricEntry::new(millis as f64 / 1000.0, primary, secondary)
        }))
        .collect();

    ParsedLyrics { entries, metadata }
}

/// Read and parse an LRC file, failing when it holds no timed lines.
pub fn load_lrc<P: AsRef<Path>>(path: P) -> Result<ParsedLyrics, LyricsError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| LyricsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = parse_lrc(&content);
    if parsed.entries.is_empty() {
        return Err(LyricsError::Empty(path.to_path_buf()));
    }

    log::info!(
        "Parsed {} lyric lines from {}",
        parsed.entries.len(),
        path.display()
    );
    Ok(parsed)
}

/// `MM`, `SS` and a 2 or 3 digit fraction to whole milliseconds.
/// A two-digit fraction is hundredths, so `34` reads as 340 ms.
fn timestamp_millis(minutes: &str, seconds: &str, fraction: &str) -> Option<u64> {
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    let mut millis: u64 = fraction.parse().ok()?;
    if fraction.len() == 2 {
        millis *= 10;
    }
    Some(minutes * 60_000 + seconds * 1000 + millis)
}

fn pair_tiers(texts: &[String]) -> Option<(String, String)> {
    let (primary, secondary) = match texts {
        [] => return None,
        [single] => match single.split_once('/') {
            Some((primary, secondary)) => (primary.trim(), secondary.trim()),
            None => (single.trim(), ""),
        },
        [first, second, ..] => (first.trim(), second.trim()),
    };

    if primary.is_empty() {
        return None;
    }
    Some((primary.to_string(), secondary.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_fraction_widths() {
        assert_eq!(timestamp_millis("00", "12", "34"), Some(12_340));
        assert_eq!(timestamp_millis("01", "02", "345"), Some(62_345));
    }

    #[test]
    fn test_pair_tiers_slash_split_only_once() {
        let texts = vec!["Hello / 你好 / extra".to_string()];
        assert_eq!(
            pair_tiers(&texts),
            Some(("Hello".to_string(), "你好 / extra".to_string()))
        );
    }

    #[test]
    fn test_pair_tiers_rejects_empty_primary() {
        let texts = vec![" / only translation".to_string()];
        assert_eq!(pair_tiers(&texts), None);
    }
}
