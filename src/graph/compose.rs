//! Composition of background, cover and text into one graph.
//!
//! Input streams are numbered by [`InputLayout`], which the command builder
//! uses as well, so `-i` order and `[N:v]` references cannot drift apart.

use super::{CompositionGraph, Statement, StreamRef};
use crate::animations::{
    BackgroundAnimation, CoverAnimation, FrameSpec, TextAnimation, TextStyle, GOLDEN_SUM,
};
use crate::expr::{var, Expr, Var};
use crate::lyrics::LyricLine;

pub const BASE_BACKGROUND_LABEL: &str = "base_bg";
pub const COVER_LABEL: &str = "fg_cover";
pub const FINAL_BACKGROUND_LABEL: &str = "final_bg";
/// The graph's only unconsumed output, mapped with `-map [v]`.
pub const TERMINAL_LABEL: &str = "v";

/// Where the background layer reads pixels from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundSource {
    /// Synthesized; no input stream.
    Generated,
    /// Video stream of this input index.
    Stream(usize),
}

/// Order of `-i` inputs for one render.
///
/// The cover is always input 0. A background image distinct from the cover
/// is input 1 unless the background is generated. Audio, when muxed, comes
/// after both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLayout {
    pub cover: usize,
    pub background: BackgroundSource,
    pub audio: Option<usize>,
}

impl InputLayout {
    pub fn plan(generative_background: bool, separate_background: bool, with_audio: bool) -> Self {
        let cover = 0;
        let mut next = cover + 1;

        let background = if generative_background {
            BackgroundSource::Generated
        } else if separate_background {
            next += 1;
            BackgroundSource::Stream(next - 1)
        } else {
            BackgroundSource::Stream(cover)
        };
        let audio = with_audio.then_some(next);

        Self {
            cover,
            background,
            audio,
        }
    }

    /// Whether the background image is passed as its own input.
    pub fn has_background_input(&self) -> bool {
        matches!(self.background, BackgroundSource::Stream(index) if index != self.cover)
    }

    /// Number of `-i` arguments.
    pub fn input_count(&self) -> usize {
        1 + usize::from(self.has_background_input()) + usize::from(self.audio.is_some())
    }
}

/// Everything the composer needs for one graph.
pub struct GraphInputs<'a> {
    pub frame: FrameSpec,
    pub duration: f64,
    pub layout: InputLayout,
    pub background: &'a dyn BackgroundAnimation,
    pub cover: &'a dyn CoverAnimation,
    pub text: &'a dyn TextAnimation,
    /// Lines to draw, already reduced for previews.
    pub lines: &'a [LyricLine],
    pub style: &'a TextStyle,
    /// Frame index to keep for a single-frame render.
    pub preview_frame: Option<u64>,
}

/// Overlay position placing the cover in the left golden-ratio column,
/// vertically centered.
pub fn cover_position() -> (Expr, Expr) {
    let x = (var(Var::Width) / GOLDEN_SUM - var(Var::OverlayWidth)) / 2.0;
    let y = (var(Var::Height) - var(Var::OverlayHeight)) / 2.0;
    (x, y)
}

/// Build the full graph.
///
/// ```text
/// [bg input]  background  [base_bg]
/// [0:v]       cover       [fg_cover]
/// [base_bg][fg_cover] overlay [final_bg]
/// [final_bg]  text, format[, select]  [v]
/// ```
pub fn compose(inputs: &GraphInputs<'_>) -> CompositionGraph {
    debug_assert_eq!(
        inputs.layout.background == BackgroundSource::Generated,
        inputs.background.is_generative(),
        "input layout disagrees with background animation"
    );

    let mut graph = CompositionGraph::new();

    let background_inputs = match inputs.layout.background {
        BackgroundSource::Generated => Vec::new(),
        BackgroundSource::Stream(index) => vec![StreamRef::Input(index)],
    };
    graph.push(Statement::new(
        background_inputs,
        inputs.background.fragment(&inputs.frame, inputs.duration),
        BASE_BACKGROUND_LABEL,
    ));

    graph.push(Statement::new(
        vec![StreamRef::Input(inputs.layout.cover)],
        inputs.cover.fragment(&inputs.frame, inputs.duration),
        COVER_LABEL,
    ));

    let (x, y) = cover_position();
    graph.push(Statement::new(
        vec![
            StreamRef::label(BASE_BACKGROUND_LABEL),
            StreamRef::label(COVER_LABEL),
        ],
        format!("overlay=x='{x}':y='{y}'"),
        FINAL_BACKGROUND_LABEL,
    ));

    let mut tail = Vec::with_capacity(3);
    let text = inputs.text.fragment(inputs.lines, inputs.style, &inputs.frame);
    if !text.is_empty() {
        tail.push(text);
    }
    tail.push("format=yuv420p".to_string());
    if let Some(frame) = inputs.preview_frame {
        tail.push(format!("select='eq(n\\,{frame})'"));
    }
    graph.push(Statement::new(
        vec![StreamRef::label(FINAL_BACKGROUND_LABEL)],
        tail.join(","),
        TERMINAL_LABEL,
    ));

    debug_assert_eq!(graph.validate(), Ok(()), "composed graph breaks label discipline");
    log::debug!(
        "Composed filter graph: {} statements, {} visible lines",
        graph.statements().len(),
        inputs.lines.len()
    );
    graph
}
