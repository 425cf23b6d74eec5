//! FFmpeg/FFprobe command construction and execution.
//!
//! The merge invocation is built by [`build_encode_args`] so its shape can
//! be tested without a binary on the path. [`FfmpegEncoder`] is the
//! production [`MediaEncoder`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::providers::{EncodeJob, MediaEncoder, ProcessOutput, ProviderError};

/// Error type for FFprobe operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffprobe/ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe/ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("media file not found: {0}")]
    MediaNotFound(String),

    #[error("ffprobe did not finish within {0}s")]
    TimedOut(u64),
}

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

/// Top-level ffprobe JSON output (`-print_format json -show_format -show_streams`).
#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    pub format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub codec_type: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
}

/// Duration in seconds, preferring the container value over the streams.
pub fn parse_duration(probe: &FfprobeOutput) -> Option<f64> {
    let from_format = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok());
    if from_format.is_some() {
        return from_format;
    }
    probe
        .streams
        .iter()
        .filter_map(|s| s.duration.as_deref())
        .filter_map(|d| d.parse::<f64>().ok())
        .reduce(f64::max)
}

// ---------------------------------------------------------------------------
// Command construction
// ---------------------------------------------------------------------------

/// Scale into the target box, letterbox to the exact size, then grade.
pub fn video_filter(job: &EncodeJob) -> String {
    let (w, h) = (job.width, job.height);
    let mut filter = format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"
    );
    if let Some(grade) = job.grade_filter.as_deref().filter(|g| !g.is_empty()) {
        filter.push(',');
        filter.push_str(grade);
    }
    filter
}

/// Arguments for the merge/re-encode invocation (without the binary).
pub fn build_encode_args(job: &EncodeJob) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), "-i".into(), path_arg(&job.video)];
    if let Some(audio) = &job.audio {
        args.extend(["-i".into(), path_arg(audio)]);
    }

    args.extend(["-map".into(), "0:v:0".into()]);
    if job.audio.is_some() {
        args.extend(["-map".into(), "1:a:0".into()]);
    }

    args.extend([
        "-vf".into(),
        video_filter(job),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "medium".into(),
        "-crf".into(),
        "23".into(),
    ]);

    if job.audio.is_some() {
        args.extend([
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            "192k".into(),
            "-shortest".into(),
        ]);
    } else {
        args.push("-an".into());
    }

    args.extend(["-movflags".into(), "+faststart".into(), path_arg(&job.output)]);
    args
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Limit for a single `ffprobe` run.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default limit for a single `ffmpeg` encode.
pub const DEFAULT_ENCODE_TIMEOUT: Duration = Duration::from_secs(900);

/// Run `ffprobe` on a media file and return the parsed JSON output.
pub async fn probe_media(ffprobe_bin: &Path, path: &Path) -> Result<FfprobeOutput, FfmpegError> {
    if !path.exists() {
        return Err(FfmpegError::MediaNotFound(path.to_string_lossy().to_string()));
    }

    let run = tokio::process::Command::new(ffprobe_bin)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .kill_on_drop(true)
        .output();
    let output = tokio::time::timeout(PROBE_TIMEOUT, run)
        .await
        .map_err(|_| FfmpegError::TimedOut(PROBE_TIMEOUT.as_secs()))?
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str::<FfprobeOutput>(&stdout)
        .map_err(|e| FfmpegError::ParseError(format!("{e}: {stdout}")))
}

/// [`MediaEncoder`] backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_bin: PathBuf,
    ffprobe_bin: PathBuf,
    timeout: Duration,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg_bin: impl Into<PathBuf>, ffprobe_bin: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            ffprobe_bin: ffprobe_bin.into(),
            timeout: DEFAULT_ENCODE_TIMEOUT,
        }
    }

    /// Kill an encode that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

#[async_trait]
impl MediaEncoder for FfmpegEncoder {
    async fn encode(&self, job: &EncodeJob) -> Result<ProcessOutput, ProviderError> {
        let args = build_encode_args(job);
        tracing::debug!(bin = %self.ffmpeg_bin.display(), ?args, "Running ffmpeg");

        let run = tokio::process::Command::new(&self.ffmpeg_bin)
            .args(&args)
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| ProviderError::Timeout {
                what: format!("{} encode", self.ffmpeg_bin.display()),
                waited_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| {
                ProviderError::Process(format!("{}: {e}", self.ffmpeg_bin.display()))
            })?;

        Ok(ProcessOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn probe_duration(&self, path: &Path) -> Option<f64> {
        match probe_media(&self.ffprobe_bin, path).await {
            Ok(probe) => parse_duration(&probe),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not probe duration");
                None
            }
        }
    }
}
