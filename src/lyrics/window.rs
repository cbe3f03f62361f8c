//! Preview-time reduction of the visible line set.
//!
//! Single-frame previews only need the lines that can appear at the target
//! timestamp. Full renders always keep the complete timeline.

use super::{line_at, LyricLine};

/// Lines kept on either side of the current line for scrolling layouts.
pub const SCROLL_WINDOW_RADIUS: usize = 7;

/// How much of the timeline a text animation needs around the preview time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewWindow {
    /// Only the line containing the timestamp.
    Single,
    /// The containing line plus up to `radius` lines on each side.
    Around { radius: usize },
    /// Every line.
    Full,
}

/// Select the lines handed to the text animation.
///
/// `preview_at` is `None` for full renders, which always get the whole
/// timeline back. A timestamp outside every line yields an empty slice.
pub fn select_visible(lines: &[LyricLine], preview_at: Option<f64>, window: PreviewWindow) -> &[LyricLine] {
    let Some(t) = preview_at else {
        return lines;
    };

    match window {
        PreviewWindow::Full => lines,
        PreviewWindow::Single => match line_at(lines, t) {
            Some(index) => &lines[index..=index],
            None => &[],
        },
        PreviewWindow::Around { radius } => match line_at(lines, t) {
            Some(index) => {
                let first = index.saturating_sub(radius);
                let last = (index + radius).min(lines.len() - 1);
                &lines[first..=last]
            }
            None => &[],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(count: usize) -> Vec<LyricLine> {
        (0..count)
            .map(|i| LyricLine::new(i as f64, (i + 1) as f64, format!("line {i}"), ""))
            .collect()
    }

    #[test]
    fn test_full_render_keeps_everything() {
        let lines = lines(5);
        assert_eq!(select_visible(&lines, None, PreviewWindow::Single).len(), 5);
    }

    #[test]
    fn test_gap_before_first_line_is_empty() {
        let mut lines = lines(3);
        for line in &mut lines {
            line.start += 10.0;
            line.end += 10.0;
        }
        assert!(select_visible(&lines, Some(2.0), PreviewWindow::Around { radius: 7 }).is_empty());
    }
}
