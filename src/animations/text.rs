//! Lyric text animations built from drawtext filters.

use super::{escape_text, FrameSpec, TextAnimation, TextKind, TextStyle, GOLDEN_RATIO, GOLDEN_SUM};
use crate::colors::RgbColor;
use crate::expr::{
    abs, between, clip, ease_in_out, eq, if_else, lerp, lt, gte, min, not, num, var, Expr, Var,
};
use crate::lyrics::{LyricLine, PreviewWindow, SCROLL_WINDOW_RADIUS};
use std::fmt;

/// Horizontal position centering text in the right-hand golden-ratio column.
pub fn golden_column_x() -> Expr {
    let width = || var(Var::Width);
    width() / GOLDEN_SUM + (width() * GOLDEN_RATIO / GOLDEN_SUM - var(Var::TextWidth)) / 2.0
}

/// One drawtext filter.
struct DrawText<'a> {
    font: &'a str,
    text: &'a str,
    size: u32,
    color: RgbColor,
    outline: RgbColor,
    border: u32,
    x: &'a Expr,
    y: Expr,
    alpha: Expr,
    enable: Option<Expr>,
}

impl fmt::Display for DrawText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "drawtext=fontfile='{}':text='{}':fontsize={}:fontcolor={}:bordercolor={}:borderw={}:x='{}':y='{}':alpha='{}'",
            self.font,
            escape_text(self.text),
            self.size,
            self.color.to_ffmpeg(),
            self.outline.to_ffmpeg(),
            self.border,
            self.x,
            self.y,
            self.alpha
        )?;
        if let Some(enable) = &self.enable {
            write!(f, ":enable='{enable}'")?;
        }
        Ok(())
    }
}

/// Each line fades in while sliding up, holds, then fades out.
#[derive(Debug, Clone)]
pub struct FadeSlideText {
    /// Fade-in and fade-out length in seconds.
    pub fade: f64,
    /// Slide-in distance in pixels.
    pub slide: f64,
}

impl Default for FadeSlideText {
    fn default() -> Self {
        Self {
            fade: 0.5,
            slide: 20.0,
        }
    }
}

impl FadeSlideText {
    /// Opacity of `line`, clamped to `[0, 1]` even when the line is shorter
    /// than two fades.
    pub fn opacity(&self, line: &LyricLine) -> Expr {
        let t = || var(Var::Time);
        let fade_in = (t() - line.start) / self.fade;
        let fade_out = (num(line.end) - t()) / self.fade;
        clip(min(fade_in, fade_out), 0.0, 1.0)
    }

    /// Upward slide offset in pixels, from `slide` at line start to 0 after one fade.
    pub fn slide_offset(&self, line: &LyricLine) -> Expr {
        let remaining = (num(self.fade) - (var(Var::Time) - line.start)) / self.fade;
        clip(remaining, 0.0, 1.0) * self.slide
    }
}

impl TextAnimation for FadeSlideText {
    fn kind(&self) -> TextKind {
        TextKind::FadeSlide
    }

    fn preview_window(&self) -> PreviewWindow {
        PreviewWindow::Single
    }

    fn fragment(&self, lines: &[LyricLine], style: &TextStyle, frame: &FrameSpec) -> String {
        let x = golden_column_x();
        let center = frame.height() as f64 / 2.0;
        let (primary_font, secondary_font) = (style.primary_font(), style.secondary_font());
        let mut filters = Vec::with_capacity(lines.len() * 2);

        for line in lines {
            let alpha = self.opacity(line);
            let enable = between(var(Var::Time), line.start, line.end);
            let slide = self.slide_offset(line);

            if !line.primary.is_empty() {
                let top = center - style.primary.size as f64 * 1.5;
                filters.push(
                    DrawText {
                        font: &primary_font,
                        text: &line.primary,
                        size: style.primary.size,
                        color: style.primary.color,
                        outline: style.outline_color,
                        border: style.outline_width,
                        x: &x,
                        y: num(top) - slide.clone(),
                        alpha: alpha.clone(),
                        enable: Some(enable.clone()),
                    }
                    .to_string(),
                );
            }
            if !line.secondary.is_empty() {
                let top = center + style.secondary.size as f64 * 0.5;
                filters.push(
                    DrawText {
                        font: &secondary_font,
                        text: &line.secondary,
                        size: style.secondary.size,
                        color: style.secondary.color,
                        outline: style.outline_color,
                        border: style.outline_width,
                        x: &x,
                        y: num(top) - slide,
                        alpha,
                        enable: Some(enable),
                    }
                    .to_string(),
                );
            }
        }

        filters.join(",")
    }
}

/// Vertical list that scrolls the current line to frame center.
#[derive(Debug, Clone)]
pub struct ScrollingListText {
    /// Gap added to the two font sizes to get the line pitch.
    pub padding: f64,
    /// Scroll animation length in seconds.
    pub transition: f64,
    /// Font size multiplier for the current line.
    pub highlight_scale: f64,
}

impl Default for ScrollingListText {
    fn default() -> Self {
        Self {
            padding: 45.0,
            transition: 0.35,
            highlight_scale: 1.1,
        }
    }
}

impl ScrollingListText {
    pub fn line_height(&self, style: &TextStyle) -> f64 {
        (style.primary.size + style.secondary.size) as f64 + self.padding
    }

    /// Distance in lines over which opacity falls to zero.
    pub fn fade_distance(&self, style: &TextStyle, frame: &FrameSpec) -> f64 {
        (frame.height() as f64 * 6.0 / 8.0 / 2.0) / self.line_height(style) * 1.5
    }

    /// Scroll offset that centers line `index`.
    pub fn target_offset(&self, index: usize, style: &TextStyle, frame: &FrameSpec) -> f64 {
        let pitch = self.line_height(style);
        frame.height() as f64 / 2.0 - pitch / 2.0 - index as f64 * pitch
    }

    /// Index of the last line whose start is at or before `t`.
    ///
    /// Built back to front: each level tests `t` against the next line's start.
    pub fn current_index(&self, lines: &[LyricLine]) -> Expr {
        let Some(last) = lines.len().checked_sub(1) else {
            return num(0.0);
        };
        (0..last).rev().fold(num(last as f64), |rest, j| {
            if_else(lt(var(Var::Time), lines[j + 1].start), j, rest)
        })
    }

    /// List offset over time, easing between line targets at each line start.
    pub fn scroll_offset(&self, lines: &[LyricLine], style: &TextStyle, frame: &FrameSpec) -> Expr {
        let t = || var(Var::Time);
        lines
            .iter()
            .enumerate()
            .fold(num(self.target_offset(0, style, frame)), |earlier, (j, line)| {
                let target = self.target_offset(j, style, frame);
                let previous = self.target_offset(j.saturating_sub(1), style, frame);
                let progress = (t() - line.start) / self.transition;
                let moving = lerp(num(previous), num(target), ease_in_out(progress));
                if_else(
                    gte(t(), line.start),
                    if_else(lt(t(), line.start + self.transition), moving, target),
                    earlier,
                )
            })
    }
}

impl TextAnimation for ScrollingListText {
    fn kind(&self) -> TextKind {
        TextKind::ScrollingList
    }

    fn preview_window(&self) -> PreviewWindow {
        PreviewWindow::Around {
            radius: SCROLL_WINDOW_RADIUS,
        }
    }

    fn fragment(&self, lines: &[LyricLine], style: &TextStyle, frame: &FrameSpec) -> String {
        if lines.is_empty() {
            return String::new();
        }

        let x = golden_column_x();
        let pitch = self.line_height(style);
        let fade_lines = self.fade_distance(style, frame);
        let highlight_size = (style.primary.size as f64 * self.highlight_scale) as u32;
        let secondary_border = style.outline_width.div_ceil(2);
        let current = self.current_index(lines);
        let scroll = self.scroll_offset(lines, style, frame);
        let (primary_font, secondary_font) = (style.primary_font(), style.secondary_font());
        let mut filters = Vec::with_capacity(lines.len() * 3);

        for (i, line) in lines.iter().enumerate() {
            let row = i as f64 * pitch;
            let highlighted = eq(i, current.clone());
            let fade = clip(1.0 - abs(num(i as f64) - current.clone()) / fade_lines, 0.0, 1.0);

            if !line.primary.is_empty() {
                let y = scroll.clone() + row;
                filters.push(
                    DrawText {
                        font: &primary_font,
                        text: &line.primary,
                        size: highlight_size,
                        color: style.primary.color,
                        outline: style.outline_color,
                        border: style.outline_width,
                        x: &x,
                        y: y.clone(),
                        alpha: fade.clone(),
                        enable: Some(highlighted.clone()),
                    }
                    .to_string(),
                );
                filters.push(
                    DrawText {
                        font: &primary_font,
                        text: &line.primary,
                        size: style.primary.size,
                        color: style.secondary.color,
                        outline: style.outline_color,
                        border: style.outline_width,
                        x: &x,
                        y,
                        alpha: 0.7 * fade.clone(),
                        enable: Some(not(highlighted.clone())),
                    }
                    .to_string(),
                );
            }
            if !line.secondary.is_empty() {
                filters.push(
                    DrawText {
                        font: &secondary_font,
                        text: &line.secondary,
                        size: style.secondary.size,
                        color: style.secondary.color,
                        outline: style.outline_color,
                        border: secondary_border,
                        x: &x,
                        y: scroll.clone() + (style.primary.size as f64 + row),
                        alpha: if_else(highlighted, 0.9, 0.7) * fade,
                        enable: None,
                    }
                    .to_string(),
                );
            }
        }

        filters.join(",")
    }
}
