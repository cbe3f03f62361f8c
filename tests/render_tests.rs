//! Integration tests for render planning, command construction and the
//! FFmpeg driver.

mod fixtures;

use fixtures::params_in;
use lyric_video::animations::AnimationCatalog;
use lyric_video::render::{
    build_command, load_inputs, plan_render, HwAccel, RenderError, RenderTarget,
};
use std::path::Path;

fn video_target(dir: &Path) -> RenderTarget {
    RenderTarget::Video {
        output: dir.join("out.mp4"),
    }
}

// ==================== Planning ====================

#[test]
fn test_full_render_smoke() {
    let dir = tempfile::tempdir().unwrap();
    let params = params_in(dir.path(), video_target(dir.path()));
    let catalog = AnimationCatalog::builtin();

    let lyrics = load_inputs(&params, &catalog).unwrap();
    let plan = plan_render(&params, &catalog, lyrics, 180.0).unwrap();
    assert_eq!(plan.context.timeline.len(), 3);
    assert_eq!(plan.context.visible.len(), 3);
    assert_eq!(plan.context.timeline[2].end, 180.0);
    assert_eq!(plan.context.metadata.title.as_deref(), Some("Sample Song"));

    let command = build_command(&params, &plan.layout, plan.context.duration, Path::new("graph.txt"));
    let args = command.args_lossy();
    assert_eq!(command.flag_value("-r").as_deref(), Some("60"));
    assert_eq!(command.flag_value("-t").unwrap().parse::<f64>().unwrap(), 180.0);
    assert_eq!(args.iter().filter(|arg| *arg == "[v]").count(), 1);
    assert_eq!(command.flag_value("-filter_complex_script").as_deref(), Some("graph.txt"));
    assert!(args.windows(2).any(|pair| pair == ["-map", "1:a"]));
}

#[test]
fn test_preview_plan_reduces_lines() {
    let dir = tempfile::tempdir().unwrap();
    let target = RenderTarget::Preview {
        output: dir.path().join("frame.png"),
        at: 16.0,
    };
    let params = params_in(dir.path(), target);
    let catalog = AnimationCatalog::builtin();

    let lyrics = load_inputs(&params, &catalog).unwrap();
    let plan = plan_render(&params, &catalog, lyrics, 30.0).unwrap();
    assert_eq!(plan.context.visible.len(), 1);
    assert_eq!(plan.context.visible[0].primary, "Second line");
    assert_eq!(plan.context.preview_frame, Some(960));
    assert_eq!(plan.layout.audio, None);
    assert!(plan.script().contains("select='eq(n\\,960)'"));
}

#[test]
fn test_scrolling_preview_keeps_neighbors() {
    let dir = tempfile::tempdir().unwrap();
    let target = RenderTarget::Preview {
        output: dir.path().join("frame.png"),
        at: 16.0,
    };
    let mut params = params_in(dir.path(), target);
    params.text_animation = "scrolling-list".to_string();
    let catalog = AnimationCatalog::builtin();

    let lyrics = load_inputs(&params, &catalog).unwrap();
    let plan = plan_render(&params, &catalog, lyrics, 30.0).unwrap();
    assert_eq!(plan.context.visible.len(), 3);
}

#[test]
fn test_separate_background_adds_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut params = params_in(dir.path(), video_target(dir.path()));
    let background = dir.path().join("bg.jpg");
    std::fs::write(&background, b"bg").unwrap();
    params.background = Some(background.clone());
    params.hw_accel = HwAccel::from_label("NVIDIA");
    let catalog = AnimationCatalog::builtin();

    let lyrics = load_inputs(&params, &catalog).unwrap();
    let plan = plan_render(&params, &catalog, lyrics, 60.0).unwrap();
    let command = build_command(&params, &plan.layout, 60.0, Path::new("graph.txt"));
    let args = command.args_lossy();

    assert_eq!(plan.layout.input_count(), 3);
    assert!(plan.script().starts_with("[1:v]"));
    assert!(args.windows(2).any(|pair| pair == ["-map", "2:a"]));
    assert_eq!(command.flag_value("-c:v").as_deref(), Some("h264_nvenc"));
}

// ==================== Validation ====================

#[test]
fn test_missing_cover_is_reported_before_anything_runs() {
    let dir = tempfile::tempdir().unwrap();
    let mut params = params_in(dir.path(), video_target(dir.path()));
    params.cover = dir.path().join("missing.jpg");

    match load_inputs(&params, &AnimationCatalog::builtin()) {
        Err(RenderError::MissingInput { role, path }) => {
            assert_eq!(role, "cover");
            assert_eq!(path, params.cover);
        }
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn test_unknown_animation_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut params = params_in(dir.path(), video_target(dir.path()));
    params.cover_animation = "hologram".to_string();

    let err = load_inputs(&params, &AnimationCatalog::builtin()).unwrap_err();
    assert!(matches!(err, RenderError::Catalog(_)));
    assert!(err.to_string().contains("hologram"));
}

#[test]
fn test_empty_lyrics_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let params = params_in(dir.path(), video_target(dir.path()));
    std::fs::write(&params.lyrics, "[ar:Nobody]\n").unwrap();

    let err = load_inputs(&params, &AnimationCatalog::builtin()).unwrap_err();
    assert!(matches!(err, RenderError::Lyrics(_)), "{err}");
}

#[test]
fn test_parameters_from_json_use_defaults() {
    let json = r##"{
        "audio": "song.mp3",
        "cover": "cover.jpg",
        "lyrics": "song.lrc",
        "style": {
            "primary": { "font": "a.ttf", "size": 48, "color": "#ffffff" },
            "secondary": { "font": "a.ttf", "size": 32, "color": "#dddddd" },
            "outline_color": "#000000",
            "outline_width": 2
        }
    }"##;
    let params: lyric_video::RenderParameters = serde_json::from_str(json).unwrap();

    assert_eq!(params.background_animation, "static-blur");
    assert_eq!(params.text_animation, "fade-slide");
    assert_eq!(params.cover_animation, "static");
    assert_eq!(params.hw_accel, HwAccel::None);
    assert_eq!(params.frame.fps(), 60);
    assert_eq!(params.background, None);
    assert_eq!(params.ffmpeg, Path::new("ffmpeg"));
}

#[test]
fn test_parameters_accept_hw_accel_labels() {
    let json = r##"{
        "audio": "song.mp3",
        "cover": "cover.jpg",
        "lyrics": "song.lrc",
        "hw_accel": "NVIDIA (NVENC)",
        "style": {
            "primary": { "font": "a.ttf", "size": 48, "color": "#ffffff" },
            "secondary": { "font": "a.ttf", "size": 32, "color": "#dddddd" },
            "outline_color": "#000000",
            "outline_width": 2
        }
    }"##;
    let params: lyric_video::RenderParameters = serde_json::from_str(json).unwrap();
    assert_eq!(params.hw_accel, HwAccel::Nvidia);

    let software: lyric_video::RenderParameters =
        serde_json::from_str(&json.replace("NVIDIA (NVENC)", "无")).unwrap();
    assert_eq!(software.hw_accel, HwAccel::None);
}

// ==================== Driver (fake ffmpeg) ====================

#[cfg(unix)]
mod driver {
    use super::*;
    use fixtures::{install_fake_tools, WELL_BEHAVED_FFMPEG};
    use lyric_video::render::{render, EventCallback, RenderEvent, RenderOptions};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_render_reports_progress_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params_in(dir.path(), video_target(dir.path()));
        params.ffmpeg = install_fake_tools(dir.path(), 4.0, WELL_BEHAVED_FFMPEG);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: EventCallback = Box::new(move |event| sink.lock().unwrap().push(event));

        let outcome = render(
            &params,
            &AnimationCatalog::builtin(),
            RenderOptions::default(),
            Some(callback),
        )
        .await
        .unwrap();

        assert_eq!(outcome.duration, 4.0);
        assert_eq!(outcome.output, dir.path().join("out.mp4"));
        assert_eq!(std::fs::read(&outcome.output).unwrap(), b"rendered");

        let percents: Vec<u8> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents, [25, 50, 100]);

        let graph = std::fs::read_to_string(dir.path().join("graph.txt")).unwrap();
        assert!(graph.ends_with("[v]"), "{graph}");
        let script = std::fs::read_to_string(dir.path().join("script_path.txt")).unwrap();
        assert!(!Path::new(&script).exists(), "temporary script {script} was left behind");

        let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
        assert!(args.lines().any(|arg| arg == "-t"));
    }

    #[tokio::test]
    async fn test_render_preview_writes_single_frame() {
        let dir = tempfile::tempdir().unwrap();
        let target = RenderTarget::Preview {
            output: dir.path().join("frame.png"),
            at: 12.0,
        };
        let mut params = params_in(dir.path(), target);
        params.ffmpeg = install_fake_tools(dir.path(), 30.0, WELL_BEHAVED_FFMPEG);

        render(&params, &AnimationCatalog::builtin(), RenderOptions::default(), None)
            .await
            .unwrap();

        let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
        let args: Vec<&str> = args.lines().collect();
        assert!(args.windows(2).any(|pair| pair == ["-vframes", "1"]));
        assert!(!args.contains(&"song.mp3") && !args.iter().any(|arg| arg.ends_with("song.mp3")));
    }

    #[tokio::test]
    async fn test_preview_relays_status_messages() {
        let dir = tempfile::tempdir().unwrap();
        let target = RenderTarget::Preview {
            output: dir.path().join("frame.png"),
            at: 12.0,
        };
        let mut params = params_in(dir.path(), target);
        params.ffmpeg = install_fake_tools(dir.path(), 30.0, WELL_BEHAVED_FFMPEG);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: EventCallback = Box::new(move |event| sink.lock().unwrap().push(event));

        render(&params, &AnimationCatalog::builtin(), RenderOptions::default(), Some(callback))
            .await
            .unwrap();

        let statuses: Vec<String> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Status(message) => Some(message.clone()),
                _ => None,
            })
            .collect();
        let position = |prefix: &str| {
            statuses
                .iter()
                .position(|message| message.starts_with(prefix))
                .unwrap_or_else(|| panic!("no status starting with {prefix:?} in {statuses:?}"))
        };

        let building = position("Building filter graph");
        let window = position("Preview at 12.00s");
        let running = position("Running: ");
        let cleanup = position("Removed temporary filter script");
        assert!(building < window && window < running && running < cleanup, "{statuses:?}");
        assert!(statuses[window].ends_with("1 of 3 lines visible"), "{}", statuses[window]);
        assert!(statuses[running].contains("-filter_complex_script"));
    }

    #[tokio::test]
    async fn test_preview_between_lines_reports_no_lyrics() {
        let dir = tempfile::tempdir().unwrap();
        let target = RenderTarget::Preview {
            output: dir.path().join("frame.png"),
            at: 2.0,
        };
        let mut params = params_in(dir.path(), target);
        params.ffmpeg = install_fake_tools(dir.path(), 30.0, WELL_BEHAVED_FFMPEG);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: EventCallback = Box::new(move |event| sink.lock().unwrap().push(event));

        render(&params, &AnimationCatalog::builtin(), RenderOptions::default(), Some(callback))
            .await
            .unwrap();

        let events = events.lock().unwrap();
        assert!(events.contains(&RenderEvent::Status("No lyrics at 2.00s".to_string())));
    }

    #[tokio::test]
    async fn test_failed_probe_aborts_before_ffmpeg() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params_in(dir.path(), video_target(dir.path()));
        params.ffmpeg = install_fake_tools(dir.path(), 4.0, WELL_BEHAVED_FFMPEG);
        std::fs::write(dir.path().join("ffprobe"), "#!/bin/sh\necho N/A\n").unwrap();

        let err = render(&params, &AnimationCatalog::builtin(), RenderOptions::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Probe { .. }), "{err}");
        assert!(!dir.path().join("args.txt").exists(), "ffmpeg ran after a failed probe");
    }

    #[tokio::test]
    async fn test_slow_ffmpeg_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params_in(dir.path(), video_target(dir.path()));
        params.ffmpeg = install_fake_tools(
            dir.path(),
            4.0,
            "echo 'still encoding' >&2\nexec sleep 30",
        );

        let options = RenderOptions {
            timeout_factor: 0.0,
            min_timeout: std::time::Duration::from_millis(300),
            ..Default::default()
        };
        let started = std::time::Instant::now();
        let err = render(&params, &AnimationCatalog::builtin(), options, None)
            .await
            .unwrap_err();
        match &err {
            RenderError::TimedOut { after, .. } => {
                assert_eq!(*after, std::time::Duration::from_millis(300));
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params_in(dir.path(), video_target(dir.path()));
        params.ffmpeg = install_fake_tools(
            dir.path(),
            4.0,
            "echo 'Error opening filters!' >&2\nexit 3",
        );

        let err = render(&params, &AnimationCatalog::builtin(), RenderOptions::default(), None)
            .await
            .unwrap_err();
        match &err {
            RenderError::ProcessFailed { code, log } => {
                assert_eq!(*code, Some(3));
                assert!(log.contains("Error opening filters!"));
            }
            other => panic!("expected ProcessFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_exit_without_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = RenderTarget::Preview {
            output: dir.path().join("frame.png"),
            at: 0.0,
        };
        let mut params = params_in(dir.path(), target);
        params.ffmpeg = install_fake_tools(dir.path(), 4.0, "echo 'nothing written' >&2\nexit 0");

        let err = render(&params, &AnimationCatalog::builtin(), RenderOptions::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingOutput { .. }), "{err}");
        assert_eq!(err.log(), Some("nothing written"));
    }

    #[tokio::test]
    async fn test_cancellation_stops_ffmpeg() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params_in(dir.path(), video_target(dir.path()));
        params.ffmpeg = install_fake_tools(dir.path(), 4.0, "exec sleep 30");

        let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
        let options = RenderOptions {
            cancel: Some(cancel_rx),
            ..Default::default()
        };
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            let _ = cancel_tx.send(true);
        });

        let started = std::time::Instant::now();
        let err = render(&params, &AnimationCatalog::builtin(), options, None)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Cancelled), "{err}");
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut params = params_in(dir.path(), video_target(dir.path()));
        let tools = install_fake_tools(dir.path(), 4.0, "exit 0");
        std::fs::remove_file(&tools).unwrap();
        params.ffmpeg = tools.clone();

        let err = render(&params, &AnimationCatalog::builtin(), RenderOptions::default(), None)
            .await
            .unwrap_err();
        match err {
            RenderError::ToolNotFound(path) => assert_eq!(path, tools),
            other => panic!("expected ToolNotFound, got {other:?}"),
        }
    }
}
