use std::time::Duration;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::ReelResult;
use crate::source::stream::{FrameSource, SeekDecoder, SourceFrame, SourceInfo};

/// Seek-driven scheduling: frame `n` is decoded at exactly `n / fps`.
///
/// Coverage is exact and independent of wall-clock speed. An optional throttle sleeps between
/// steps so a slow backend is not saturated.
pub struct SeekFrameSource<D> {
    decoder: D,
    fps: Fps,
    throttle: Duration,
    next: FrameIndex,
    done: bool,
}

impl<D: SeekDecoder> SeekFrameSource<D> {
    /// Step through `decoder` at `fps`.
    pub fn new(decoder: D, fps: Fps) -> Self {
        Self {
            decoder,
            fps,
            throttle: Duration::ZERO,
            next: FrameIndex(0),
            done: false,
        }
    }

    /// Sleep `throttle` between consecutive steps.
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Index of the next frame to be decoded.
    pub fn position(&self) -> FrameIndex {
        self.next
    }
}

impl<D: SeekDecoder> FrameSource for SeekFrameSource<D> {
    fn info(&self) -> &SourceInfo {
        self.decoder.info()
    }

    fn next_frame(&mut self) -> ReelResult<Option<SourceFrame>> {
        if self.done {
            return Ok(None);
        }
        let t = self.fps.frame_to_secs(self.next);
        if t >= self.decoder.info().duration_secs {
            self.done = true;
            return Ok(None);
        }
        if self.next.0 > 0 && !self.throttle.is_zero() {
            std::thread::sleep(self.throttle);
        }

        let Some(mut frame) = self.decoder.decode_at(t)? else {
            self.done = true;
            return Ok(None);
        };
        frame.time_sec = t;
        self.next = FrameIndex(self.next.0 + 1);
        Ok(Some(frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/seek.rs"]
mod tests;
