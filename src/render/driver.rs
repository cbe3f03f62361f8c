//! End-to-end render flow.
//!
//! Validation and composition are synchronous and run before any process
//! starts; only probing and encoding touch FFmpeg.

use super::command::build_command;
use super::context::{RenderContext, RenderPlan};
use super::params::{RenderOptions, RenderParameters};
use super::probe::{probe_duration, resolve_ffprobe};
use super::progress::{LogTail, ProgressTracker, RecordSplitter};
use super::{EventCallback, RenderError, Reporter};
use crate::animations::AnimationCatalog;
use crate::graph::{compose, GraphInputs, InputLayout};
use crate::lyrics::{build_timeline, load_lrc, select_visible, LyricMetadata, ParsedLyrics};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::sync::watch;

/// Result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub output: PathBuf,
    /// Audio duration in seconds.
    pub duration: f64,
    pub elapsed: Duration,
    pub metadata: LyricMetadata,
}

fn require_file(role: &'static str, path: &Path) -> Result<(), RenderError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RenderError::MissingInput {
            role,
            path: path.to_path_buf(),
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Check every input file and animation name, then parse the lyrics.
pub fn load_inputs(
    params: &RenderParameters,
    catalog: &AnimationCatalog,
) -> Result<ParsedLyrics, RenderError> {
    require_file("audio", &params.audio)?;
    require_file("cover", &params.cover)?;
    require_file("lyrics", &params.lyrics)?;
    if let Some(background) = &params.background {
        require_file("background", background)?;
    }
    require_file("primary font", &params.style.primary.font)?;
    require_file("secondary font", &params.style.secondary.font)?;

    catalog.background(&params.background_animation)?;
    catalog.text(&params.text_animation)?;
    catalog.cover(&params.cover_animation)?;

    Ok(load_lrc(&params.lyrics)?)
}

/// Build and check the filter graph for a known audio duration.
pub fn plan_render(
    params: &RenderParameters,
    catalog: &AnimationCatalog,
    lyrics: ParsedLyrics,
    duration: f64,
) -> Result<RenderPlan, RenderError> {
    let background = catalog.background(&params.background_animation)?;
    let text = catalog.text(&params.text_animation)?;
    let cover = catalog.cover(&params.cover_animation)?;

    let timeline = build_timeline(&lyrics.entries, duration);
    let preview_at = params.target.preview_at();
    let visible = select_visible(&timeline, preview_at, text.preview_window()).to_vec();
    let preview_frame = preview_at.map(|at| params.frame.frame_index(at));

    let layout = InputLayout::plan(
        background.is_generative(),
        params.has_separate_background(),
        !params.target.is_preview(),
    );
    let graph = compose(&GraphInputs {
        frame: params.frame,
        duration,
        layout,
        background,
        cover,
        text,
        lines: &visible,
        style: &params.style,
        preview_frame,
    });
    graph.validate()?;
    graph.validate_inputs(layout.input_count())?;

    Ok(RenderPlan {
        context: RenderContext {
            duration,
            metadata: lyrics.metadata,
            timeline,
            visible,
            preview_at,
            preview_frame,
        },
        layout,
        graph,
    })
}

/// Render the video or preview frame described by `params`.
///
/// Events go to `callback` as the run progresses. Fails before any process
/// starts if an input is missing or the lyrics hold no timed lines.
pub async fn render(
    params: &RenderParameters,
    catalog: &AnimationCatalog,
    options: RenderOptions,
    callback: Option<EventCallback>,
) -> Result<RenderOutcome, RenderError> {
    let started = Instant::now();
    let reporter = Reporter::new(callback.as_ref());

    let lyrics = load_inputs(params, catalog)?;
    reporter.status(format!("Analyzing {}", file_name(&params.audio)));

    let ffprobe = resolve_ffprobe(&params.ffmpeg);
    let duration = probe_duration(&ffprobe, &params.audio).await?;
    reporter.status(format!("Audio duration: {duration:.2}s"));

    let metadata = &lyrics.metadata;
    if !metadata.is_empty() {
        log::info!(
            "Lyric tags: title={:?} artist={:?} album={:?}",
            metadata.title,
            metadata.artist,
            metadata.album
        );
    }

    reporter.status(format!(
        "Building filter graph (background: {}, text: {}, cover: {})",
        params.background_animation, params.text_animation, params.cover_animation
    ));
    let plan = plan_render(params, catalog, lyrics, duration)?;
    if let Some(summary) = plan.context.window_summary() {
        reporter.status(summary);
    }

    let mut script = tempfile::Builder::new()
        .prefix("lyric-video-")
        .suffix(".txt")
        .tempfile()?;
    script.write_all(plan.script().as_bytes())?;
    script.flush()?;
    log::debug!("Filter script written to {}", script.path().display());

    let result = run_ffmpeg(params, &plan, script.path(), &options, &reporter).await;
    match script.close() {
        Ok(()) => reporter.status("Removed temporary filter script"),
        Err(e) => reporter.warning(format!("Failed to remove temporary filter script: {e}")),
    }
    result?;

    let elapsed = started.elapsed();
    reporter.status(format!(
        "Finished {} in {:.1}s",
        file_name(params.target.output()),
        elapsed.as_secs_f64()
    ));
    Ok(RenderOutcome {
        output: params.target.output().to_path_buf(),
        duration,
        elapsed,
        metadata: plan.context.metadata,
    })
}

enum Finish {
    Exited(io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

async fn run_ffmpeg(
    params: &RenderParameters,
    plan: &RenderPlan,
    script: &Path,
    options: &RenderOptions,
    reporter: &Reporter<'_>,
) -> Result<(), RenderError> {
    let output = params.target.output();
    if let Some(dir) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    if output.is_file() {
        std::fs::remove_file(output)?;
    }

    let duration = plan.context.duration;
    let command = build_command(params, &plan.layout, duration, script);
    if !params.target.is_preview() {
        reporter.status(format!(
            "Encoding with {} (hardware acceleration: {})",
            params.hw_accel.encoder(),
            params.hw_accel.name()
        ));
    }
    reporter.status(format!("Running: {}", command.display()));

    let mut child = command.to_command().spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => RenderError::ToolNotFound(params.ffmpeg.clone()),
        _ => RenderError::Io(e),
    })?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("ffmpeg stderr was not captured"))?;

    let started = Instant::now();
    let timeout = options.timeout_for(duration);
    let mut tail = LogTail::new(options.log_tail_lines);
    let mut tracker = (!params.target.is_preview()).then(|| ProgressTracker::new(duration));

    let finish = {
        let pump = pump_records(stderr, |line| {
            reporter.output(&line);
            if let Some(progress) = tracker
                .as_mut()
                .and_then(|tracker| tracker.observe(&line, started.elapsed()))
            {
                reporter.progress(progress);
            }
            tail.push(line);
        });

        tokio::select! {
            status = async {
                if let Err(e) = pump.await {
                    log::warn!("Failed to read ffmpeg output: {e}");
                }
                child.wait().await
            } => Finish::Exited(status),
            _ = tokio::time::sleep(timeout) => Finish::TimedOut,
            _ = cancelled(options.cancel.clone()) => Finish::Cancelled,
        }
    };

    match finish {
        Finish::Exited(status) => {
            let status = status?;
            if !status.success() {
                return Err(RenderError::ProcessFailed {
                    code: status.code(),
                    log: tail.joined(),
                });
            }
        }
        Finish::TimedOut => {
            stop(&mut child).await;
            log::error!("ffmpeg timed out after {}s", timeout.as_secs());
            return Err(RenderError::TimedOut {
                after: timeout,
                log: tail.joined(),
            });
        }
        Finish::Cancelled => {
            stop(&mut child).await;
            reporter.status("Render cancelled");
            return Err(RenderError::Cancelled);
        }
    }

    let produced = std::fs::metadata(output).is_ok_and(|meta| meta.len() > 0);
    if !produced {
        return Err(RenderError::MissingOutput {
            path: output.to_path_buf(),
            log: tail.joined(),
        });
    }

    if let Some(progress) = tracker
        .as_mut()
        .and_then(|tracker| tracker.update(duration, started.elapsed()))
    {
        reporter.progress(progress);
    }
    Ok(())
}

async fn stop(child: &mut Child) {
    if let Err(e) = child.kill().await {
        log::warn!("Failed to stop ffmpeg: {e}");
    }
}

/// Resolves once the flag reads `true`; never if there is no flag or its
/// sender goes away first.
async fn cancelled(cancel: Option<watch::Receiver<bool>>) {
    if let Some(mut cancel) = cancel {
        if cancel.wait_for(|flag| *flag).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}

async fn pump_records<R>(mut reader: R, mut on_record: impl FnMut(String)) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut splitter = RecordSplitter::default();
    let mut buf = [0u8; 4096];
    loop {
        let read = reader.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        for record in splitter.push(&buf[..read]) {
            on_record(record);
        }
    }
    if let Some(record) = splitter.finish() {
        on_record(record);
    }
    Ok(())
}
