//! Render orchestration: validation, probing, graph composition and the
//! FFmpeg process itself.

mod command;
mod context;
mod driver;
mod params;
mod probe;
mod progress;

pub use command::{build_command, FfmpegCommand};
pub use context::{RenderContext, RenderPlan};
pub use driver::{load_inputs, plan_render, render, RenderOutcome};
pub use params::{HwAccel, RenderOptions, RenderParameters, RenderTarget};
pub use probe::{parse_duration_output, probe_duration, resolve_ffprobe};
pub use progress::{parse_progress_time, LogTail, Progress, ProgressTracker, RecordSplitter};

use crate::animations::CatalogError;
use crate::graph::GraphError;
use crate::lyrics::LyricsError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while preparing or running a render.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Missing {role} file: {}", .path.display())]
    MissingInput { role: &'static str, path: PathBuf },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Lyrics(#[from] LyricsError),

    #[error("Could not determine duration of {}: {message}", .path.display())]
    Probe { path: PathBuf, message: String },

    #[error("Failed to compose filter graph: {0}")]
    Composition(#[from] GraphError),

    #[error("Executable not found: {}", .0.display())]
    ToolNotFound(PathBuf),

    #[error("FFmpeg exited with {}:\n{log}", exit_description(.code))]
    ProcessFailed { code: Option<i32>, log: String },

    #[error("FFmpeg finished but {} is missing or empty:\n{log}", .path.display())]
    MissingOutput { path: PathBuf, log: String },

    #[error("FFmpeg did not finish within {}s:\n{log}", .after.as_secs())]
    TimedOut { after: Duration, log: String },

    #[error("Render cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Tail of the tool output attached to process failures.
    pub fn log(&self) -> Option<&str> {
        match self {
            Self::ProcessFailed { log, .. }
            | Self::MissingOutput { log, .. }
            | Self::TimedOut { log, .. } => Some(log),
            _ => None,
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

/// Events reported to the caller while a render runs.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// Human-readable stage change.
    Status(String),
    /// Completion percentage, only ever increasing within one run.
    Progress { percent: u8, eta: Option<Duration> },
    /// One record of FFmpeg output.
    Output(String),
}

pub type EventCallback = Box<dyn Fn(RenderEvent) + Send + Sync>;

/// Fans events out to the log and the optional callback.
pub(crate) struct Reporter<'a> {
    callback: Option<&'a EventCallback>,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(callback: Option<&'a EventCallback>) -> Self {
        Self { callback }
    }

    pub(crate) fn status(&self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.emit(RenderEvent::Status(message));
    }

    pub(crate) fn warning(&self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.emit(RenderEvent::Status(message));
    }

    pub(crate) fn progress(&self, progress: Progress) {
        self.emit(RenderEvent::Progress {
            percent: progress.percent,
            eta: progress.eta,
        });
    }

    pub(crate) fn output(&self, line: &str) {
        log::debug!("ffmpeg: {line}");
        self.emit(RenderEvent::Output(line.to_string()));
    }

    fn emit(&self, event: RenderEvent) {
        if let Some(callback) = self.callback {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_log() {
        let err = RenderError::ProcessFailed {
            code: Some(1),
            log: "Invalid argument".to_string(),
        };
        assert_eq!(err.to_string(), "FFmpeg exited with code 1:\nInvalid argument");
        assert_eq!(err.log(), Some("Invalid argument"));

        let err = RenderError::ProcessFailed {
            code: None,
            log: String::new(),
        };
        assert!(err.to_string().contains("a signal"));
        assert_eq!(RenderError::Cancelled.log(), None);
    }

    #[test]
    fn test_reporter_forwards_events() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: EventCallback = Box::new(move |event| sink.lock().unwrap().push(event));
        let reporter = Reporter::new(Some(&callback));

        reporter.status("Analyzing");
        reporter.output("frame=1");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], RenderEvent::Status("Analyzing".to_string()));
        assert_eq!(seen[1], RenderEvent::Output("frame=1".to_string()));
    }
}
