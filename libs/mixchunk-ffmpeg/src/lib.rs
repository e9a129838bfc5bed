//! # MixChunk ffmpeg Adapter
//!
//! Implements the domain's `AudioSplitter` port by shelling out to an ffmpeg
//! binary in segment mode. The container is stream-copied (`-c copy`, no
//! re-encoding), so chunk containers match the source exactly, and timestamps
//! reset per chunk (`-reset_timestamps 1`).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, error, info, instrument};

use mixchunk_domain::{ports::AudioSplitter, segmentation::error::SegmentationError};

/// Default ffmpeg location in the deployment image
pub const DEFAULT_FFMPEG_PATH: &str = "/opt/bin/ffmpeg";

/// ffmpeg-backed implementation of the AudioSplitter port
///
/// One awaited subprocess per invocation: the future resolves when ffmpeg
/// exits. On a non-zero exit the captured stderr becomes the error message;
/// a failure to spawn (missing binary) is reported the same way. Segment
/// boundary behavior - short final chunk, single chunk for short sources,
/// possible trailing zero-length chunk on exact multiples - is ffmpeg's
/// contract and is passed through untouched.
#[derive(Debug, Clone)]
pub struct FfmpegSplitter {
    ffmpeg_path: PathBuf,
}

impl FfmpegSplitter {
    /// Create a splitter using the default ffmpeg path
    pub fn new() -> Self {
        Self::with_path(DEFAULT_FFMPEG_PATH)
    }

    /// Create a splitter using an explicit ffmpeg binary path
    pub fn with_path(ffmpeg_path: impl Into<PathBuf>) -> Self {
        let ffmpeg_path = ffmpeg_path.into();
        info!(ffmpeg = %ffmpeg_path.display(), "Initializing FfmpegSplitter");
        Self { ffmpeg_path }
    }

    /// Get the configured ffmpeg binary path
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Build the argument list for one split run
    fn build_args(input: &Path, output_pattern: &Path, segment_seconds: u32) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-i".into(), input.as_os_str().to_os_string()];
        args.extend(["-f".into(), "segment".into()]);
        args.extend(["-segment_time".into(), segment_seconds.to_string().into()]);
        args.extend(["-c".into(), "copy".into()]);
        args.extend(["-reset_timestamps".into(), "1".into()]);
        args.push(output_pattern.as_os_str().to_os_string());
        args
    }
}

impl Default for FfmpegSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSplitter for FfmpegSplitter {
    #[instrument(skip(self), fields(input = %input.display(), segment_seconds))]
    fn split(
        &self,
        input: &Path,
        output_pattern: &Path,
        segment_seconds: u32,
    ) -> impl std::future::Future<Output = Result<(), SegmentationError>> + Send {
        let ffmpeg = self.ffmpeg_path.clone();
        let args = Self::build_args(input, output_pattern, segment_seconds);
        let input = input.to_path_buf();

        async move {
            debug!(ffmpeg = %ffmpeg.display(), ?args, "Spawning ffmpeg");

            let output = Command::new(&ffmpeg)
                .args(&args)
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|err| {
                    error!(ffmpeg = %ffmpeg.display(), error = ?err, "Failed to spawn ffmpeg");
                    SegmentationError::ffmpeg_failure(format!(
                        "failed to spawn '{}': {}",
                        ffmpeg.display(),
                        err
                    ))
                })?;

            if output.status.success() {
                info!(input = %input.display(), "ffmpeg segmentation finished");
                Ok(())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let message = stderr.trim();
                error!(
                    input = %input.display(),
                    exit_code = output.status.code().unwrap_or(-1),
                    stderr = %message,
                    "ffmpeg exited with failure"
                );
                Err(SegmentationError::ffmpeg_failure(if message.is_empty() {
                    format!("ffmpeg exited with {}", output.status)
                } else {
                    message.to_string()
                }))
            }
        }
    }
}
