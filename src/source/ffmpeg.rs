use std::path::Path;
#[cfg(feature = "media-ffmpeg")]
use std::process::{Child, ChildStdout, Command, Stdio};
#[cfg(feature = "media-ffmpeg")]
use std::sync::Arc;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::source::stream::{FrameStream, SeekDecoder, SourceFrame, SourceInfo};

/// Probe width, height, duration, frame rate and audio presence through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
#[tracing::instrument(level = "debug")]
pub fn probe_source(path: &Path) -> ReelResult<SourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        avg_frame_rate: Option<String>,
        r_frame_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelError::load(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::load(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::decode(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ReelError::load(format!("no video stream in '{}'", path.display())))?;
    let width = video
        .width
        .ok_or_else(|| ReelError::decode("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| ReelError::decode("missing video height from ffprobe"))?;
    let native_fps = video
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| video.r_frame_rate.as_deref().and_then(parse_rate))
        .ok_or_else(|| ReelError::decode("missing video frame rate from ffprobe"))?;
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| ReelError::decode("missing duration from ffprobe"))?;
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(SourceInfo {
        path: Some(path.to_path_buf()),
        width,
        height,
        duration_secs,
        native_fps,
        has_audio,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe source metadata through `ffprobe`.
///
/// Returns an error when the `media-ffmpeg` feature is disabled.
pub fn probe_source(_path: &Path) -> ReelResult<SourceInfo> {
    Err(ReelError::load(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Parse an ffprobe rate such as `30000/1001` or `25`.
pub(crate) fn parse_rate(s: &str) -> Option<Fps> {
    let (num, den) = match s.split_once('/') {
        Some((n, d)) => (n.trim().parse().ok()?, d.trim().parse().ok()?),
        None => (s.trim().parse().ok()?, 1),
    };
    Fps::new(num, den).ok()
}

/// Random-access decoder running one short `ffmpeg` process per seek.
pub struct FfmpegDecoder {
    info: SourceInfo,
}

impl FfmpegDecoder {
    /// Decoder for a probed source; `info.path` must be set.
    pub fn new(info: SourceInfo) -> ReelResult<Self> {
        if info.path.is_none() {
            return Err(ReelError::validation("ffmpeg decoder requires a source path"));
        }
        Ok(Self { info })
    }

    /// Probe `path` and build a decoder for it.
    pub fn open(path: &Path) -> ReelResult<Self> {
        Self::new(probe_source(path)?)
    }
}

impl SeekDecoder for FfmpegDecoder {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    #[cfg(feature = "media-ffmpeg")]
    fn decode_at(&mut self, time_sec: f64) -> ReelResult<Option<SourceFrame>> {
        if time_sec >= self.info.duration_secs {
            return Ok(None);
        }
        let Some(path) = self.info.path.as_deref() else {
            return Err(ReelError::validation("ffmpeg decoder requires a source path"));
        };
        let out = Command::new("ffmpeg")
            .args(["-v", "error", "-ss", &format!("{time_sec:.9}")])
            .arg("-i")
            .arg(path)
            .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .output()
            .map_err(|e| ReelError::decode(format!("failed to run ffmpeg for video decode: {e}")))?;
        if !out.status.success() {
            return Err(ReelError::decode(format!(
                "ffmpeg seek decode failed for '{}' at {time_sec:.3}s: {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let expected = frame_len(&self.info);
        if out.stdout.is_empty() {
            // Seeking into the tail past the last decodable frame.
            return Ok(None);
        }
        if out.stdout.len() < expected {
            return Err(ReelError::decode(format!(
                "decoded frame has {} bytes, expected {expected}",
                out.stdout.len()
            )));
        }
        let mut bytes = out.stdout;
        bytes.truncate(expected);
        Ok(Some(SourceFrame {
            time_sec,
            width: self.info.width,
            height: self.info.height,
            rgba: Arc::new(bytes),
        }))
    }

    #[cfg(not(feature = "media-ffmpeg"))]
    fn decode_at(&mut self, _time_sec: f64) -> ReelResult<Option<SourceFrame>> {
        Err(ReelError::load(
            "video sources require the 'media-ffmpeg' feature",
        ))
    }
}

/// Sequential decoder reading constant-rate raw frames from one long-running `ffmpeg`.
pub struct FfmpegFrameStream {
    info: SourceInfo,
    #[cfg(feature = "media-ffmpeg")]
    child: Option<Child>,
    #[cfg(feature = "media-ffmpeg")]
    stdout: Option<ChildStdout>,
    #[cfg(feature = "media-ffmpeg")]
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    next: FrameIndex,
}

impl FfmpegFrameStream {
    /// Stream for a probed source; decoding starts on the first read.
    pub fn new(info: SourceInfo) -> ReelResult<Self> {
        if info.path.is_none() {
            return Err(ReelError::validation("ffmpeg stream requires a source path"));
        }
        Ok(Self {
            info,
            #[cfg(feature = "media-ffmpeg")]
            child: None,
            #[cfg(feature = "media-ffmpeg")]
            stdout: None,
            #[cfg(feature = "media-ffmpeg")]
            stderr_drain: None,
            next: FrameIndex(0),
        })
    }

    #[cfg(feature = "media-ffmpeg")]
    fn spawn(&mut self) -> ReelResult<()> {
        use std::io::Read as _;

        let Some(path) = self.info.path.as_deref() else {
            return Err(ReelError::validation("ffmpeg stream requires a source path"));
        };
        let fps = self.info.native_fps;
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(path)
            .args([
                "-an",
                "-vf",
                &format!("fps={}/{}", fps.num, fps.den),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReelError::decode(format!("failed to spawn ffmpeg decoder: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::decode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::decode("failed to open ffmpeg stderr (unexpected)"))?;
        self.stderr_drain = Some(std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        }));
        self.child = Some(child);
        self.stdout = Some(stdout);
        Ok(())
    }

    #[cfg(feature = "media-ffmpeg")]
    fn finish(&mut self) -> ReelResult<()> {
        self.stdout = None;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| ReelError::decode(format!("failed to wait for ffmpeg decoder: {e}")))?;
        let stderr = match self.stderr_drain.take().map(std::thread::JoinHandle::join) {
            Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_owned(),
            _ => String::new(),
        };
        if !status.success() {
            return Err(ReelError::decode(format!(
                "ffmpeg decoder exited with status {status}: {stderr}"
            )));
        }
        Ok(())
    }
}

impl FrameStream for FfmpegFrameStream {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    #[cfg(feature = "media-ffmpeg")]
    fn next_decoded(&mut self) -> ReelResult<Option<SourceFrame>> {
        use std::io::Read as _;

        if self.child.is_none() {
            if self.next.0 > 0 {
                return Ok(None);
            }
            self.spawn()?;
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; frame_len(&self.info)];
        let mut filled = 0;
        while filled < buf.len() {
            let n = stdout
                .read(&mut buf[filled..])
                .map_err(|e| ReelError::decode(format!("ffmpeg decoder read failed: {e}")))?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled < buf.len() {
            // A trailing partial frame is dropped like the decoder would.
            self.finish()?;
            return Ok(None);
        }

        let time_sec = self.info.native_fps.frame_to_secs(self.next);
        self.next = FrameIndex(self.next.0 + 1);
        Ok(Some(SourceFrame {
            time_sec,
            width: self.info.width,
            height: self.info.height,
            rgba: Arc::new(buf),
        }))
    }

    #[cfg(not(feature = "media-ffmpeg"))]
    fn next_decoded(&mut self) -> ReelResult<Option<SourceFrame>> {
        let _ = self.next;
        Err(ReelError::load(
            "video sources require the 'media-ffmpeg' feature",
        ))
    }
}

impl Drop for FfmpegFrameStream {
    fn drop(&mut self) {
        #[cfg(feature = "media-ffmpeg")]
        if let Some(mut child) = self.child.take() {
            self.stdout = None;
            let _ = child.kill();
            let _ = child.wait();
            if let Some(handle) = self.stderr_drain.take() {
                let _ = handle.join();
            }
        }
    }
}

fn frame_len(info: &SourceInfo) -> usize {
    (info.width as usize) * (info.height as usize) * 4
}

#[cfg(test)]
#[path = "../../tests/unit/source/ffmpeg.rs"]
mod tests;
