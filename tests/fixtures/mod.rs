//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use lyric_video::animations::{TextStyle, TierStyle};
use lyric_video::lyrics::LyricLine;
use lyric_video::render::{HwAccel, RenderParameters, RenderTarget};
use lyric_video::{FrameSpec, RgbColor};
use std::path::{Path, PathBuf};

/// Bilingual LRC in the alternating-line dialect, with tags.
pub const SAMPLE_LRC: &str = "\
[ti:Sample Song]
[ar:Sample Artist]
[00:10.00]First line
[00:10.00]第一行
[00:15.00]Second line
[00:15.00]第二行
[00:20.00]Third line
[00:20.00]第三行
";

/// Standard text style with 48/32 px tiers.
pub fn test_style() -> TextStyle {
    style_with_font(Path::new("fonts/test.ttf"))
}

pub fn style_with_font(font: &Path) -> TextStyle {
    TextStyle {
        primary: TierStyle {
            font: font.to_path_buf(),
            size: 48,
            color: RgbColor::WHITE,
        },
        secondary: TierStyle {
            font: font.to_path_buf(),
            size: 32,
            color: RgbColor::new(0xdd, 0xdd, 0xdd),
        },
        outline_color: RgbColor::BLACK,
        outline_width: 2,
    }
}

/// `count` contiguous five-second lines starting at zero.
pub fn lines(count: usize) -> Vec<LyricLine> {
    (0..count)
        .map(|i| {
            let start = i as f64 * 5.0;
            LyricLine::new(start, start + 5.0, format!("Line {i}"), format!("第{i}行"))
        })
        .collect()
}

pub fn small_frame() -> FrameSpec {
    FrameSpec::new(640, 360, 30).expect("non-zero frame")
}

/// Write placeholder inputs into `dir` and return parameters pointing at them.
pub fn params_in(dir: &Path, target: RenderTarget) -> RenderParameters {
    let write = |name: &str, contents: &[u8]| -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write fixture file");
        path
    };

    let font = write("font.ttf", b"font");
    RenderParameters {
        audio: write("song.mp3", b"audio"),
        cover: write("cover.jpg", b"cover"),
        lyrics: write("song.lrc", SAMPLE_LRC.as_bytes()),
        background: None,
        style: style_with_font(&font),
        background_animation: "static-blur".to_string(),
        text_animation: "fade-slide".to_string(),
        cover_animation: "static".to_string(),
        ffmpeg: PathBuf::from("ffmpeg"),
        hw_accel: HwAccel::None,
        frame: FrameSpec::default(),
        target,
    }
}

/// Install executable `ffmpeg` and `ffprobe` shell scripts in `dir`.
///
/// The fake ffprobe reports `duration` seconds; the fake ffmpeg runs
/// `ffmpeg_body` with the original arguments.
#[cfg(unix)]
pub fn install_fake_tools(dir: &Path, duration: f64, ffmpeg_body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let install = |name: &str, script: String| {
        let path = dir.join(name);
        std::fs::write(&path, script).expect("write fake tool");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("make fake tool executable");
        path
    };

    install("ffprobe", format!("#!/bin/sh\necho {duration}\n"));
    install("ffmpeg", format!("#!/bin/sh\n{ffmpeg_body}\n"))
}

/// Fake ffmpeg body that records its graph script, reports progress and
/// writes the last argument as output.
pub const WELL_BEHAVED_FFMPEG: &str = r#"here=$(dirname "$0")
prev=""
for arg in "$@"; do
  if [ "$prev" = "-filter_complex_script" ]; then
    cp "$arg" "$here/graph.txt"
    printf '%s' "$arg" > "$here/script_path.txt"
  fi
  prev="$arg"
  last="$arg"
done
printf '%s\n' "$@" > "$here/args.txt"
printf 'Input #0, mp3, from song.mp3:\n' >&2
printf 'frame=   60 fps=60 time=00:00:01.00 speed=1x\r' >&2
printf 'frame=  120 fps=60 time=00:00:02.00 speed=1x\r' >&2
printf 'rendered' > "$last"
exit 0"#;
