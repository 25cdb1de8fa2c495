use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::encode::ffmpeg::is_ffmpeg_on_path;
use crate::encode::sink::OutputArtifact;
use crate::foundation::error::{ReelError, ReelResult};

/// Broader-compatibility format the recorded artifact is converted to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscodeTarget {
    /// Mime type of the converted artifact.
    pub mime_type: String,
    /// Muxer name passed to `ffmpeg -f`.
    pub container: String,
    /// Video encoder.
    pub video_codec: String,
    /// Constant rate factor for the video encoder.
    pub crf: u8,
    /// Audio encoder.
    pub audio_codec: String,
    /// Audio bitrate, `ffmpeg` syntax (`128k`).
    pub audio_bitrate: String,
}

impl Default for TranscodeTarget {
    /// H.264 CRF 23 with AAC 128k in MP4.
    fn default() -> Self {
        Self {
            mime_type: "video/mp4".to_owned(),
            container: "mp4".to_owned(),
            video_codec: "libx264".to_owned(),
            crf: 23,
            audio_codec: "aac".to_owned(),
            audio_bitrate: "128k".to_owned(),
        }
    }
}

/// Converts a finished artifact to another container/codec.
pub trait Transcoder {
    /// Convert `artifact` into `target`; failures are reported as [`ReelError::Transcode`].
    fn transcode(
        &mut self,
        artifact: &OutputArtifact,
        target: &TranscodeTarget,
    ) -> ReelResult<OutputArtifact>;
}

/// Transcoder backed by a closure.
pub struct FnTranscoder<F>(pub F);

impl<F> Transcoder for FnTranscoder<F>
where
    F: FnMut(&OutputArtifact, &TranscodeTarget) -> ReelResult<OutputArtifact>,
{
    fn transcode(
        &mut self,
        artifact: &OutputArtifact,
        target: &TranscodeTarget,
    ) -> ReelResult<OutputArtifact> {
        (self.0)(artifact, target)
    }
}

/// Non-fatal packaging outcome: the native artifact was delivered instead of the transcoded one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageWarning {
    /// Why the transcode did not happen.
    pub reason: String,
    /// Mime type actually delivered.
    pub delivered_mime_type: String,
}

impl fmt::Display for PackageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transcode failed, delivering {} instead: {}",
            self.delivered_mime_type, self.reason
        )
    }
}

/// Transcoder that runs the system `ffmpeg` over temporary files.
#[derive(Clone, Debug)]
pub struct FfmpegTranscoder {
    work_dir: PathBuf,
}

impl FfmpegTranscoder {
    /// Use the system temp directory for intermediate files.
    pub fn new() -> Self {
        Self {
            work_dir: std::env::temp_dir(),
        }
    }

    /// Use `dir` for intermediate files.
    pub fn with_work_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: dir.into(),
        }
    }

    fn temp_path(&self, tag: &str, ext: &str) -> PathBuf {
        self.work_dir.join(format!(
            "reelcast_{tag}_{}_{}.{ext}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ))
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(
        &mut self,
        artifact: &OutputArtifact,
        target: &TranscodeTarget,
    ) -> ReelResult<OutputArtifact> {
        if !is_ffmpeg_on_path() {
            return Err(ReelError::transcode(
                "ffmpeg is required for transcoding, but was not found on PATH",
            ));
        }
        std::fs::create_dir_all(&self.work_dir).map_err(|e| {
            ReelError::transcode(format!(
                "failed to create work dir '{}': {e}",
                self.work_dir.display()
            ))
        })?;

        let input = TempFileGuard(Some(self.temp_path("in", artifact.extension())));
        let output = TempFileGuard(Some(self.temp_path("out", &target.container)));
        let (Some(in_path), Some(out_path)) = (input.path(), output.path()) else {
            return Err(ReelError::transcode("temp paths unavailable"));
        };

        std::fs::write(in_path, &artifact.bytes)
            .map_err(|e| ReelError::transcode(format!("failed to write transcode input: {e}")))?;
        run_ffmpeg_transcode(in_path, out_path, target)?;
        let bytes = std::fs::read(out_path)
            .map_err(|e| ReelError::transcode(format!("failed to read transcode output: {e}")))?;
        if bytes.is_empty() {
            return Err(ReelError::transcode("transcode produced an empty file"));
        }

        Ok(OutputArtifact {
            bytes,
            mime_type: target.mime_type.clone(),
        })
    }
}

fn run_ffmpeg_transcode(input: &Path, output: &Path, target: &TranscodeTarget) -> ReelResult<()> {
    let out = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(input)
        .args([
            "-c:v",
            &target.video_codec,
            "-crf",
            &target.crf.to_string(),
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            &target.audio_codec,
            "-b:a",
            &target.audio_bitrate,
            "-movflags",
            "+faststart",
            "-f",
            &target.container,
        ])
        .arg(output)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ReelError::transcode(format!("failed to spawn ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::transcode(format!(
            "ffmpeg exited with status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(())
}

struct TempFileGuard(Option<PathBuf>);

impl TempFileGuard {
    fn path(&self) -> Option<&Path> {
        self.0.as_deref()
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Produces the terminal artifact of a run.
pub struct OutputPackager {
    transcoder: Box<dyn Transcoder>,
}

impl OutputPackager {
    /// Package with `transcoder`.
    pub fn new(transcoder: impl Transcoder + 'static) -> Self {
        Self {
            transcoder: Box::new(transcoder),
        }
    }

    /// Transcode `native` to `target`, falling back to `native` on failure.
    ///
    /// With no target the native artifact is delivered as-is.
    pub fn package(
        &mut self,
        native: OutputArtifact,
        target: Option<&TranscodeTarget>,
    ) -> (OutputArtifact, Option<PackageWarning>) {
        let Some(target) = target else {
            return (native, None);
        };
        match self.transcoder.transcode(&native, target) {
            Ok(converted) => {
                tracing::info!(
                    from = %native.mime_type,
                    to = %converted.mime_type,
                    bytes = converted.bytes.len(),
                    "artifact transcoded"
                );
                (converted, None)
            }
            Err(e) => {
                tracing::warn!(error = %e, mime = %native.mime_type, "transcode failed, delivering native artifact");
                let warning = PackageWarning {
                    reason: e.to_string(),
                    delivered_mime_type: native.mime_type.clone(),
                };
                (native, Some(warning))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/package/packager.rs"]
mod tests;
