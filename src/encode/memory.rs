use std::sync::{Arc, Mutex};

use crate::encode::codec::CodecOption;
use crate::encode::sink::{EncodeSettings, FrameEncoder};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;

/// What an [`InMemoryEncoder`] has observed, shared with the test that created it.
#[derive(Clone, Debug, Default)]
pub struct EncoderLog {
    /// Codec passed to the last `begin`.
    pub codec: Option<CodecOption>,
    /// Settings passed to the last `begin`.
    pub settings: Option<EncodeSettings>,
    /// Frame indices accepted, in call order.
    pub frames: Vec<FrameIndex>,
    /// Copies of accepted frames, when retention is enabled.
    pub retained: Vec<FrameRGBA>,
    /// `end` completed.
    pub ended: bool,
    /// `abort` was called.
    pub aborted: bool,
}

/// Deterministic encoder backend that emits one small chunk per frame.
///
/// The "bitstream" is a header, one 12-byte record per frame (index plus a pixel checksum) and a
/// trailer, which is enough to observe ordering and concatenation without a real codec.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    log: Arc<Mutex<EncoderLog>>,
    fail_at: Option<u64>,
    retain_frames: bool,
}

impl InMemoryEncoder {
    /// Create an encoder that never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail when asked to encode the frame with index `idx`.
    pub fn failing_at(mut self, idx: u64) -> Self {
        self.fail_at = Some(idx);
        self
    }

    /// Keep a copy of every accepted frame in the log.
    pub fn retaining_frames(mut self) -> Self {
        self.retain_frames = true;
        self
    }

    /// Shared handle to the observation log.
    pub fn log(&self) -> Arc<Mutex<EncoderLog>> {
        Arc::clone(&self.log)
    }

    fn with_log<R>(&self, f: impl FnOnce(&mut EncoderLog) -> R) -> ReelResult<R> {
        let mut log = self
            .log
            .lock()
            .map_err(|_| ReelError::mid_stream("in-memory encoder log poisoned"))?;
        Ok(f(&mut log))
    }
}

/// Header written at `begin`.
pub const MEMORY_STREAM_MAGIC: &[u8; 4] = b"RCST";

impl FrameEncoder for InMemoryEncoder {
    fn begin(&mut self, settings: &EncodeSettings, codec: &CodecOption) -> ReelResult<()> {
        self.with_log(|log| {
            *log = EncoderLog {
                codec: Some(codec.clone()),
                settings: Some(settings.clone()),
                ..EncoderLog::default()
            };
        })
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<Vec<Vec<u8>>> {
        if self.fail_at == Some(idx.0) {
            return Err(ReelError::mid_stream(format!(
                "injected encoder failure at frame {}",
                idx.0
            )));
        }
        let retain = self.retain_frames;
        let first = self.with_log(|log| {
            let first = log.frames.is_empty();
            log.frames.push(idx);
            if retain {
                log.retained.push(frame.clone());
            }
            first
        })?;

        let checksum = frame
            .data
            .iter()
            .fold(0u32, |acc, &b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
        let mut record = Vec::with_capacity(16);
        if first {
            record.extend_from_slice(MEMORY_STREAM_MAGIC);
        }
        record.extend_from_slice(&idx.0.to_le_bytes());
        record.extend_from_slice(&checksum.to_le_bytes());
        Ok(vec![record])
    }

    fn end(&mut self) -> ReelResult<Vec<Vec<u8>>> {
        let count = self.with_log(|log| {
            log.ended = true;
            log.frames.len() as u64
        })?;
        Ok(vec![count.to_le_bytes().to_vec()])
    }

    fn abort(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.aborted = true;
        }
    }
}
