use std::io::{Read, Write as _};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;

use crate::encode::codec::CodecOption;
use crate::encode::sink::{EncodeSettings, FrameEncoder};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

const STDOUT_CHUNK_BYTES: usize = 64 * 1024;

/// Encoder backend that spawns the system `ffmpeg` and streams raw frames to stdin.
///
/// The muxed output is read back from stdout on a helper thread and surfaced as chunks, so no
/// intermediate file is written. When the settings name an audio source, its first audio stream
/// (if any) is muxed in as passthrough.
#[derive(Default)]
pub struct FfmpegEncoder {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_rx: Option<Receiver<Vec<u8>>>,
    stdout_drain: Option<JoinHandle<std::io::Result<()>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    settings: Option<EncodeSettings>,
}

impl FfmpegEncoder {
    /// Create an idle encoder; the process is spawned on `begin`.
    pub fn new() -> Self {
        Self::default()
    }

    fn drain_available(&mut self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        if let Some(rx) = self.stdout_rx.as_ref() {
            loop {
                match rx.try_recv() {
                    Ok(bytes) => out.push(bytes),
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            }
        }
        out
    }

    fn join_stderr(&mut self) -> String {
        match self.stderr_drain.take().map(JoinHandle::join) {
            Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).trim().to_owned(),
            _ => String::new(),
        }
    }
}

impl FrameEncoder for FfmpegEncoder {
    fn begin(&mut self, settings: &EncodeSettings, codec: &CodecOption) -> ReelResult<()> {
        let (w, h) = (settings.canvas.width, settings.canvas.height);
        if w == 0 || h == 0 {
            return Err(ReelError::validation(
                "ffmpeg encoder width/height must be non-zero",
            ));
        }
        if !w.is_multiple_of(2) || !h.is_multiple_of(2) {
            return Err(ReelError::validation(
                "ffmpeg encoder width/height must be even (required for yuv420p output)",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(ReelError::unsupported_format(
                "ffmpeg is required for encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input 0: flattened RGBA8 frames on stdin.
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{w}x{h}"),
        ]);
        push_input_fps(&mut cmd, settings.fps);
        cmd.args(["-i", "pipe:0"]);

        match (settings.audio_source.as_deref(), codec.audio_codec.as_deref()) {
            (Some(audio), Some(audio_codec)) => {
                cmd.arg("-i")
                    .arg(audio)
                    .args(["-map", "0:v", "-map", "1:a?", "-c:a", audio_codec, "-shortest"]);
            }
            _ => {
                cmd.arg("-an");
            }
        }

        cmd.args([
            "-c:v",
            &codec.video_codec,
            "-b:v",
            &codec.video_bitrate.to_string(),
            "-pix_fmt",
            "yuv420p",
            "-f",
            &codec.container,
            "pipe:1",
        ]);

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::unsupported_format(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::mid_stream("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::mid_stream("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::mid_stream("failed to open ffmpeg stderr (unexpected)"))?;

        let (tx, rx) = mpsc::channel();
        let stdout_drain = std::thread::spawn(move || {
            let mut buf = vec![0u8; STDOUT_CHUNK_BYTES];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    return Ok(());
                }
                if tx.send(buf[..n].to_vec()).is_err() {
                    return Ok(());
                }
            }
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            width = w,
            height = h,
            codec = %codec.video_codec,
            audio = settings.audio_source.is_some(),
            "ffmpeg encoder spawned"
        );
        self.scratch = vec![0u8; settings.canvas.rgba_len()];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_rx = Some(rx);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<Vec<Vec<u8>>> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| ReelError::mid_stream("ffmpeg encoder not started"))?;
        if frame.width != settings.canvas.width || frame.height != settings.canvas.height {
            return Err(ReelError::mid_stream(format!(
                "frame {} size mismatch: got {}x{}, expected {}x{}",
                idx.0, frame.width, frame.height, settings.canvas.width, settings.canvas.height
            )));
        }

        flatten_premul_over_bg_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            settings.flatten_bg.to_array(),
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::mid_stream("ffmpeg encoder is already finalized"));
        };
        if let Err(e) = stdin.write_all(&self.scratch) {
            let stderr = self.join_stderr();
            return Err(ReelError::mid_stream(format!(
                "failed to write frame {} to ffmpeg stdin: {e}; {stderr}",
                idx.0
            )));
        }

        Ok(self.drain_available())
    }

    fn end(&mut self) -> ReelResult<Vec<Vec<u8>>> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::mid_stream("ffmpeg encoder not started"))?;

        let status = child.wait().map_err(|e| {
            ReelError::mid_stream(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if let Some(handle) = self.stdout_drain.take() {
            handle
                .join()
                .map_err(|_| ReelError::mid_stream("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| ReelError::mid_stream(format!("ffmpeg stdout read failed: {e}")))?;
        }
        let stderr = self.join_stderr();
        let tail = self.drain_available();
        self.stdout_rx = None;
        self.settings = None;

        if !status.success() {
            return Err(ReelError::mid_stream(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }
        Ok(tail)
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.stdout_rx = None;
        if let Some(handle) = self.stdout_drain.take() {
            let _ = handle.join();
        }
        let _ = self.join_stderr();
        self.settings = None;
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` goes before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::mid_stream(
            "flatten expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (u16::from(s[0]) + mul_div255_u16(bg_r, inv)).min(255) as u8;
        d[1] = (u16::from(s[1]) + mul_div255_u16(bg_g, inv)).min(255) as u8;
        d[2] = (u16::from(s[2]) + mul_div255_u16(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
