use std::sync::Arc;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::source::stream::{FrameStream, SeekDecoder, SourceFrame, SourceInfo};

/// Video held entirely in memory, frame `i` displayed from `i / native_fps`.
///
/// Works as both a [`SeekDecoder`] and a sequential [`FrameStream`].
#[derive(Clone, Debug)]
pub struct MemoryVideo {
    info: SourceInfo,
    frames: Vec<Arc<Vec<u8>>>,
    cursor: usize,
}

impl MemoryVideo {
    /// Wrap straight-alpha RGBA8 frames of identical size.
    pub fn from_frames(
        width: u32,
        height: u32,
        native_fps: Fps,
        frames: Vec<Vec<u8>>,
    ) -> ReelResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if width == 0 || height == 0 {
            return Err(ReelError::decode("memory video dimensions must be non-zero"));
        }
        if let Some(i) = frames.iter().position(|f| f.len() != expected) {
            return Err(ReelError::decode(format!(
                "memory video frame {i} has {} bytes, expected {expected}",
                frames[i].len()
            )));
        }
        let duration_secs = native_fps.frame_to_secs(FrameIndex(frames.len() as u64));
        Ok(Self {
            info: SourceInfo {
                path: None,
                width,
                height,
                duration_secs,
                native_fps,
                has_audio: false,
            },
            frames: frames.into_iter().map(Arc::new).collect(),
            cursor: 0,
        })
    }

    /// `frame_count` frames of one solid color sharing a single buffer.
    pub fn solid(width: u32, height: u32, native_fps: Fps, frame_count: usize, rgba: [u8; 4]) -> Self {
        let mut px = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as usize) * (height as usize) {
            px.extend_from_slice(&rgba);
        }
        let shared = Arc::new(px);
        Self {
            info: SourceInfo {
                path: None,
                width,
                height,
                duration_secs: native_fps.frame_to_secs(FrameIndex(frame_count as u64)),
                native_fps,
                has_audio: false,
            },
            frames: vec![shared; frame_count],
            cursor: 0,
        }
    }

    /// Override the reported duration (e.g. to model a container whose duration exceeds its
    /// decodable frames).
    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.info.duration_secs = duration_secs;
        self
    }

    fn frame(&self, i: usize) -> Option<SourceFrame> {
        self.frames.get(i).map(|rgba| SourceFrame {
            time_sec: self.info.native_fps.frame_to_secs(FrameIndex(i as u64)),
            width: self.info.width,
            height: self.info.height,
            rgba: Arc::clone(rgba),
        })
    }
}

impl SeekDecoder for MemoryVideo {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn decode_at(&mut self, time_sec: f64) -> ReelResult<Option<SourceFrame>> {
        if !time_sec.is_finite() || time_sec < 0.0 {
            return Err(ReelError::decode(format!("invalid seek time {time_sec}")));
        }
        // Small epsilon so exact frame boundaries land on the frame that starts there.
        let i = (time_sec * self.info.native_fps.as_f64() + 1e-9).floor() as usize;
        Ok(self.frame(i))
    }
}

impl FrameStream for MemoryVideo {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn next_decoded(&mut self) -> ReelResult<Option<SourceFrame>> {
        let out = self.frame(self.cursor);
        if out.is_some() {
            self.cursor += 1;
        }
        Ok(out)
    }
}
