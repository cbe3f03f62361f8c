//! Facts established while preparing a render.

use crate::graph::{CompositionGraph, InputLayout};
use crate::lyrics::{LyricLine, LyricMetadata};

/// Accumulated state for one request, filled in stage by stage.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Audio duration in seconds.
    pub duration: f64,
    pub metadata: LyricMetadata,
    pub timeline: Vec<LyricLine>,
    /// Lines handed to the text animation.
    pub visible: Vec<LyricLine>,
    /// Requested preview timestamp in seconds.
    pub preview_at: Option<f64>,
    /// Frame kept for previews.
    pub preview_frame: Option<u64>,
}

impl RenderContext {
    /// How the preview reduced the visible lines, or `None` for full renders.
    pub fn window_summary(&self) -> Option<String> {
        let at = self.preview_at?;
        if self.visible.is_empty() {
            return Some(format!("No lyrics at {at:.2}s"));
        }
        Some(format!(
            "Preview at {at:.2}s (frame {}): {} of {} lines visible",
            self.preview_frame.unwrap_or_default(),
            self.visible.len(),
            self.timeline.len()
        ))
    }
}

/// A composed graph ready to hand to FFmpeg.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub context: RenderContext,
    pub layout: InputLayout,
    pub graph: CompositionGraph,
}

impl RenderPlan {
    pub fn script(&self) -> String {
        self.graph.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_summary() {
        let mut context = RenderContext {
            timeline: vec![LyricLine::new(0.0, 5.0, "A", ""), LyricLine::new(5.0, 9.0, "B", "")],
            ..Default::default()
        };
        assert_eq!(context.window_summary(), None);

        context.preview_at = Some(6.0);
        context.preview_frame = Some(360);
        context.visible = context.timeline[1..].to_vec();
        assert_eq!(
            context.window_summary().as_deref(),
            Some("Preview at 6.00s (frame 360): 1 of 2 lines visible")
        );

        context.visible.clear();
        assert_eq!(context.window_summary().as_deref(), Some("No lyrics at 6.00s"));
    }
}
