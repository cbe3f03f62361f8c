//! Media duration lookup through ffprobe.

use super::RenderError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Find the ffprobe belonging to a configured ffmpeg.
///
/// A bare `ffmpeg` resolves to `ffprobe` on the search path. An explicit
/// ffmpeg path uses the ffprobe next to it when one exists there.
pub fn resolve_ffprobe(ffmpeg: &Path) -> PathBuf {
    let fallback = PathBuf::from("ffprobe");
    if ffmpeg.parent().map_or(true, |dir| dir.as_os_str().is_empty()) {
        return fallback;
    }

    let name = if ffmpeg.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("exe")) {
        "ffprobe.exe"
    } else {
        "ffprobe"
    };
    ffmpeg
        .parent()
        .map(|dir| dir.join(name))
        .filter(|candidate| candidate.is_file())
        .unwrap_or(fallback)
}

/// First line of ffprobe's `format=duration` output as seconds.
pub fn parse_duration_output(stdout: &str) -> Option<f64> {
    let duration: f64 = stdout.lines().next()?.trim().parse().ok()?;
    (duration.is_finite() && duration > 0.0).then_some(duration)
}

/// Duration of `media` in seconds.
pub async fn probe_duration(ffprobe: &Path, media: &Path) -> Result<f64, RenderError> {
    let output = Command::new(ffprobe)
        .args(["-v", "error", "-show_entries", "format=duration", "-of"])
        .arg("default=noprint_wrappers=1:nokey=1")
        .arg(media)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => RenderError::ToolNotFound(ffprobe.to_path_buf()),
            _ => RenderError::Io(e),
        })?;

    if !output.status.success() {
        return Err(RenderError::Probe {
            path: media.to_path_buf(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_duration_output(&stdout).ok_or_else(|| RenderError::Probe {
        path: media.to_path_buf(),
        message: format!("unexpected ffprobe output {:?}", stdout.trim()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_ffmpeg_uses_search_path() {
        assert_eq!(resolve_ffprobe(Path::new("ffmpeg")), PathBuf::from("ffprobe"));
    }

    #[test]
    fn test_sibling_ffprobe() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = dir.path().join("ffmpeg");
        assert_eq!(resolve_ffprobe(&ffmpeg), PathBuf::from("ffprobe"));

        std::fs::write(dir.path().join("ffprobe"), b"").unwrap();
        assert_eq!(resolve_ffprobe(&ffmpeg), dir.path().join("ffprobe"));
    }

    #[test]
    fn test_windows_sibling_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ffprobe.exe"), b"").unwrap();
        let ffmpeg = dir.path().join("ffmpeg.exe");
        assert_eq!(resolve_ffprobe(&ffmpeg), dir.path().join("ffprobe.exe"));
    }

    #[test]
    fn test_parse_duration_output() {
        assert_eq!(parse_duration_output("180.000000\n"), Some(180.0));
        assert_eq!(parse_duration_output("N/A\n"), None);
        assert_eq!(parse_duration_output(""), None);
        assert_eq!(parse_duration_output("0.0"), None);
    }
}
