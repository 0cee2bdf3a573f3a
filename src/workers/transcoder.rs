use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::common::error::{ConversionError, ConversionResult};

/// Output options for autoplay-friendly MP4s: no audio, H.264 in yuv420p,
/// moov atom up front, 30 fps, original width and an even height.
pub const OUTPUT_OPTIONS: [&str; 10] = [
    "-an",
    "-c:v",
    "libx264",
    "-pix_fmt",
    "yuv420p",
    "-movflags",
    "+faststart",
    "-vf",
    "fps=30,scale=iw:-2:flags=lanczos",
    "-y",
];

/// Runs the external ffmpeg binary.
#[derive(Clone, Debug)]
pub struct Transcoder {
    ffmpeg: PathBuf,
    timeout: Duration,
}

impl Transcoder {
    pub fn new(ffmpeg: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            timeout,
        }
    }

    pub fn args(input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(input.as_os_str().to_owned());
        args.extend(OUTPUT_OPTIONS.iter().map(OsString::from));
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Transcodes `input` into `output`, resolving once ffmpeg has exited.
    pub async fn transcode(&self, input: &Path, output: &Path) -> ConversionResult<()> {
        info!("🎥 Transcoding {} -> {}", input.display(), output.display());

        let mut command = Command::new(&self.ffmpeg);
        command
            .args(Self::args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| ConversionError::Transcode {
            cause: format!("failed to start {}: {}", self.ffmpeg.display(), e),
        })?;

        // Dropping the wait future on timeout kills the child.
        let output_result = match tokio::time::timeout(self.timeout, child.wait_with_output()).await
        {
            Ok(result) => result.map_err(|e| ConversionError::Transcode {
                cause: format!("failed to wait for ffmpeg: {}", e),
            })?,
            Err(_) => {
                return Err(ConversionError::Transcode {
                    cause: format!("timed out after {}s", self.timeout.as_secs()),
                });
            }
        };

        if !output_result.status.success() {
            let stderr = String::from_utf8_lossy(&output_result.stderr);
            debug!("ffmpeg stderr: {}", stderr);
            return Err(ConversionError::Transcode {
                cause: failure_cause(&stderr, output_result.status),
            });
        }

        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.is_file() => Ok(()),
            _ => Err(ConversionError::Transcode {
                cause: format!("ffmpeg produced no output at {}", output.display()),
            }),
        }
    }
}

fn failure_cause(stderr: &str, status: std::process::ExitStatus) -> String {
    stderr
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("ffmpeg exited with {}", status))
}
