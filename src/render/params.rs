//! Render request parameters.

use crate::animations::{FrameSpec, TextStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;

/// What one request produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderTarget {
    /// Full video with muxed audio.
    Video { output: PathBuf },
    /// One still frame at `at` seconds.
    Preview { output: PathBuf, at: f64 },
}

impl RenderTarget {
    pub fn output(&self) -> &Path {
        match self {
            Self::Video { output } | Self::Preview { output, .. } => output,
        }
    }

    /// Preview timestamp, `None` for full renders.
    pub fn preview_at(&self) -> Option<f64> {
        match self {
            Self::Video { .. } => None,
            Self::Preview { at, .. } => Some(*at),
        }
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview { .. })
    }
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self::Video {
            output: PathBuf::from("output.mp4"),
        }
    }
}

/// Video encoder selection.
///
/// Deserializes from any mode label accepted by [`HwAccel::from_label`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum HwAccel {
    /// libx264 on the CPU.
    #[default]
    None,
    Nvidia,
    Amd,
    Intel,
}

impl HwAccel {
    /// Parse a mode label such as `"NVIDIA (NVENC)"` or `"none"`.
    ///
    /// Vendor names match anywhere in the label, case-insensitively; anything
    /// else selects software encoding.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("nvidia") || label.contains("nvenc") {
            Self::Nvidia
        } else if label.contains("amd") || label.contains("amf") {
            Self::Amd
        } else if label.contains("intel") || label.contains("qsv") {
            Self::Intel
        } else {
            Self::None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Nvidia => "nvidia",
            Self::Amd => "amd",
            Self::Intel => "intel",
        }
    }

    pub fn encoder(&self) -> &'static str {
        match self {
            Self::None => "libx264",
            Self::Nvidia => "h264_nvenc",
            Self::Amd => "h264_amf",
            Self::Intel => "h264_qsv",
        }
    }

    /// `-c:v` and the encoder's quality settings.
    pub fn video_codec_args(&self) -> &'static [&'static str] {
        match self {
            Self::None => &["-c:v", "libx264", "-preset", "veryfast", "-crf", "20"],
            Self::Nvidia => &["-c:v", "h264_nvenc", "-preset", "fast", "-cq", "23", "-profile:v", "high"],
            Self::Amd => &[
                "-c:v", "h264_amf", "-quality", "balanced", "-rc", "cqp", "-qp_p", "23", "-qp_i", "23",
            ],
            Self::Intel => &["-c:v", "h264_qsv", "-preset", "fast", "-global_quality", "23"],
        }
    }
}

impl From<String> for HwAccel {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

fn default_background_animation() -> String {
    "static-blur".to_string()
}

fn default_text_animation() -> String {
    "fade-slide".to_string()
}

fn default_cover_animation() -> String {
    "static".to_string()
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

/// Everything one render or preview request needs. Not modified once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderParameters {
    pub audio: PathBuf,
    pub cover: PathBuf,
    pub lyrics: PathBuf,
    /// Background image; the cover doubles as background when absent.
    #[serde(default)]
    pub background: Option<PathBuf>,
    pub style: TextStyle,
    #[serde(default = "default_background_animation")]
    pub background_animation: String,
    #[serde(default = "default_text_animation")]
    pub text_animation: String,
    #[serde(default = "default_cover_animation")]
    pub cover_animation: String,
    /// FFmpeg executable.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
    #[serde(default)]
    pub hw_accel: HwAccel,
    #[serde(default)]
    pub frame: FrameSpec,
    #[serde(default)]
    pub target: RenderTarget,
}

impl RenderParameters {
    /// Whether a background image other than the cover was supplied.
    pub fn has_separate_background(&self) -> bool {
        self.background
            .as_ref()
            .is_some_and(|background| background != &self.cover)
    }

    /// Same parameters aimed at another target.
    pub fn with_target(&self, target: RenderTarget) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}

/// Per-run supervision settings.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Timeout as a multiple of the media duration.
    pub timeout_factor: f64,
    /// Lower bound on the timeout.
    pub min_timeout: Duration,
    /// Lines of tool output kept for error reports.
    pub log_tail_lines: usize,
    /// Flip to `true` to kill the running process.
    pub cancel: Option<watch::Receiver<bool>>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            timeout_factor: 10.0,
            min_timeout: Duration::from_secs(120),
            log_tail_lines: 100,
            cancel: None,
        }
    }
}

impl RenderOptions {
    pub fn timeout_for(&self, duration: f64) -> Duration {
        Duration::try_from_secs_f64(duration * self.timeout_factor)
            .map_or(self.min_timeout, |timeout| timeout.max(self.min_timeout))
    }
}
