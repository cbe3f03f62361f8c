//! FFmpeg argument construction.

use super::params::{RenderParameters, RenderTarget};
use crate::graph::{InputLayout, TERMINAL_LABEL};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Program plus arguments, kept inspectable for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl FfmpegCommand {
    fn arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments as UTF-8, lossily.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    /// Position of `flag` and the argument following it.
    pub fn flag_value(&self, flag: &str) -> Option<String> {
        let args = self.args_lossy();
        let index = args.iter().position(|arg| arg == flag)?;
        args.get(index + 1).cloned()
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args_lossy().into_iter().map(|arg| {
                if arg.contains(char::is_whitespace) {
                    format!("\"{arg}\"")
                } else {
                    arg
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Process with stderr piped and everything else detached.
    pub fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

/// Build the FFmpeg invocation for `params`.
///
/// `-i` arguments follow `layout` exactly; the graph script is read from
/// `script` and its terminal label is the only video mapped.
pub fn build_command(
    params: &RenderParameters,
    layout: &InputLayout,
    duration: f64,
    script: &Path,
) -> FfmpegCommand {
    let mut command = FfmpegCommand {
        program: params.ffmpeg.clone(),
        args: Vec::new(),
    };
    command.arg("-y");

    command.arg("-i").arg(&params.cover);
    if layout.has_background_input() {
        let background = params.background.as_ref().unwrap_or(&params.cover);
        command.arg("-i").arg(background);
    }
    if layout.audio.is_some() {
        command.arg("-i").arg(&params.audio);
    }

    command
        .arg("-filter_complex_script")
        .arg(script)
        .arg("-map")
        .arg(format!("[{TERMINAL_LABEL}]"));

    match &params.target {
        RenderTarget::Preview { output, .. } => {
            command.args(["-vframes", "1"]).arg(output);
        }
        RenderTarget::Video { output } => {
            if let Some(audio) = layout.audio {
                command.arg("-map").arg(format!("{audio}:a"));
            }
            command
                .args(params.hw_accel.video_codec_args().iter().copied())
                .args(["-c:a", "aac", "-b:a", "320k", "-pix_fmt", "yuv420p"])
                .arg("-r")
                .arg(params.frame.fps().to_string())
                .arg("-t")
                .arg(duration.to_string())
                .arg(output);
        }
    }

    debug_assert_eq!(
        command.args.iter().filter(|arg| *arg == "-i").count(),
        layout.input_count()
    );
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::{TextStyle, TierStyle};
    use crate::colors::RgbColor;
    use crate::render::HwAccel;

    fn params(target: RenderTarget, background: Option<&str>) -> RenderParameters {
        let tier = |size| TierStyle {
            font: PathBuf::from("font.ttf"),
            size,
            color: RgbColor::WHITE,
        };
        RenderParameters {
            audio: "song.mp3".into(),
            cover: "cover.jpg".into(),
            lyrics: "song.lrc".into(),
            background: background.map(PathBuf::from),
            style: TextStyle {
                primary: tier(48),
                secondary: tier(32),
                outline_color: RgbColor::BLACK,
                outline_width: 2,
            },
            background_animation: "static-blur".into(),
            text_animation: "fade-slide".into(),
            cover_animation: "static".into(),
            ffmpeg: "ffmpeg".into(),
            hw_accel: HwAccel::None,
            frame: Default::default(),
            target,
        }
    }

    #[test]
    fn test_video_command_with_separate_background() {
        let params = params(RenderTarget::Video { output: "out.mp4".into() }, Some("bg.jpg"));
        let layout = InputLayout::plan(false, true, true);
        let command = build_command(&params, &layout, 180.0, Path::new("graph.txt"));
        let args = command.args_lossy();

        let inputs: Vec<_> = args
            .iter()
            .enumerate()
            .filter(|(_, arg)| *arg == "-i")
            .map(|(i, _)| args[i + 1].as_str())
            .collect();
        assert_eq!(inputs, ["cover.jpg", "bg.jpg", "song.mp3"]);

        assert_eq!(args.iter().filter(|arg| *arg == "[v]").count(), 1);
        assert!(args.windows(2).any(|pair| pair == ["-map", "2:a"]));
        assert_eq!(command.flag_value("-r").as_deref(), Some("60"));
        assert_eq!(command.flag_value("-t").unwrap().parse::<f64>().unwrap(), 180.0);
        assert_eq!(command.flag_value("-c:v").as_deref(), Some("libx264"));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_preview_command_has_single_frame_and_no_audio() {
        let params = params(
            RenderTarget::Preview {
                output: "frame.png".into(),
                at: 12.0,
            },
            None,
        );
        let layout = InputLayout::plan(false, false, false);
        let command = build_command(&params, &layout, 180.0, Path::new("graph.txt"));
        let args = command.args_lossy();

        assert_eq!(args.iter().filter(|arg| *arg == "-i").count(), 1);
        assert_eq!(command.flag_value("-vframes").as_deref(), Some("1"));
        assert!(!args.iter().any(|arg| arg.ends_with(":a")));
        assert!(!args.contains(&"-t".to_string()));
    }

    #[test]
    fn test_display_quotes_spaces() {
        let command = FfmpegCommand {
            program: "ffmpeg".into(),
            args: vec!["-i".into(), "my cover.jpg".into()],
        };
        assert_eq!(command.display(), "ffmpeg -i \"my cover.jpg\"");
    }
}
