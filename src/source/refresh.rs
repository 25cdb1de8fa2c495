use std::time::{Duration, Instant};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::ReelResult;
use crate::source::stream::{FrameSource, FrameStream, SourceFrame, SourceInfo};

/// Clock driving refresh-based sampling.
pub trait Ticker {
    /// Block until the next refresh tick; return the playback position in seconds.
    fn wait_tick(&mut self) -> f64;
}

/// Wall-clock ticker firing at a fixed refresh rate.
#[derive(Debug)]
pub struct RealtimeTicker {
    start: Option<Instant>,
    interval: Duration,
    ticks: u64,
}

impl RealtimeTicker {
    /// Tick at `rate` per second.
    pub fn new(rate: Fps) -> Self {
        Self {
            start: None,
            interval: Duration::from_secs_f64(rate.frame_duration_secs()),
            ticks: 0,
        }
    }
}

impl Ticker for RealtimeTicker {
    fn wait_tick(&mut self) -> f64 {
        let start = *self.start.get_or_insert_with(Instant::now);
        let due = start + self.interval.mul_f64(self.ticks as f64);
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
        self.ticks += 1;
        start.elapsed().as_secs_f64()
    }
}

/// Deterministic ticker that advances playback by a fixed step per tick.
#[derive(Clone, Debug)]
pub struct SteppedTicker {
    step: f64,
    ticks: u64,
}

impl SteppedTicker {
    /// Advance `step` seconds per tick; the first tick reports 0.
    pub fn new(step: f64) -> Self {
        Self { step, ticks: 0 }
    }
}

impl Ticker for SteppedTicker {
    fn wait_tick(&mut self) -> f64 {
        let now = self.ticks as f64 * self.step;
        self.ticks += 1;
        now
    }
}

/// Refresh-driven scheduling: one output frame per refresh slot at the output rate.
///
/// Slot `i` shows the newest decoded frame whose timestamp is at or before `i / fps`. A slot with
/// no new frame repeats the previous one, and frames superseded within a slot are skipped, so the
/// output always spans the source duration at the output rate. The ticker paces slots against
/// the playback clock; a consumer that falls behind fills overdue slots without waiting.
pub struct RefreshFrameSource<S, T> {
    stream: S,
    ticker: T,
    fps: Fps,
    pending: Option<SourceFrame>,
    current: Option<SourceFrame>,
    current_shown: bool,
    exhausted: bool,
    last_time: Option<f64>,
    playhead: Option<f64>,
    emitted: u64,
    skipped: u64,
    repeated: u64,
}

// Tolerance for frame timestamps computed in floating point landing on a slot boundary.
const SLOT_EPSILON: f64 = 1e-9;

impl<S: FrameStream, T: Ticker> RefreshFrameSource<S, T> {
    /// Sample `stream` into `fps` slots paced by `ticker`.
    pub fn new(stream: S, ticker: T, fps: Fps) -> Self {
        Self {
            stream,
            ticker,
            fps,
            pending: None,
            current: None,
            current_shown: false,
            exhausted: false,
            last_time: None,
            playhead: None,
            emitted: 0,
            skipped: 0,
            repeated: 0,
        }
    }

    /// Number of decoded frames dropped because a newer frame reached the same slot.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Number of slots that repeated the previous frame.
    pub fn repeated(&self) -> u64 {
        self.repeated
    }

    /// Slot count for a known duration; `None` when the stream reports none.
    fn slot_limit(&self) -> Option<u64> {
        let d = self.stream.info().duration_secs;
        (d.is_finite() && d > 0.0).then(|| self.fps.secs_to_frames_ceil(d))
    }

    fn peek(&mut self) -> ReelResult<Option<&SourceFrame>> {
        if self.pending.is_none() && !self.exhausted {
            loop {
                match self.stream.next_decoded()? {
                    None => {
                        self.exhausted = true;
                        break;
                    }
                    Some(f) if self.last_time.is_some_and(|last| f.time_sec <= last) => {
                        tracing::debug!(time = f.time_sec, "dropping non-increasing frame");
                    }
                    Some(f) => {
                        self.last_time = Some(f.time_sec);
                        self.pending = Some(f);
                        break;
                    }
                }
            }
        }
        Ok(self.pending.as_ref())
    }

    fn advance_to(&mut self, slot_time: f64) -> ReelResult<()> {
        while self
            .peek()?
            .is_some_and(|f| f.time_sec <= slot_time + SLOT_EPSILON)
        {
            if self.current.is_some() && !self.current_shown {
                self.skipped += 1;
            }
            self.current = self.pending.take();
            self.current_shown = false;
        }
        if self.current.is_none() {
            // First slot before the first timestamp: show the first frame early.
            self.current = self.pending.take();
        }
        Ok(())
    }

    fn wait_for(&mut self, slot_time: f64) {
        while self.playhead.is_none_or(|p| p + SLOT_EPSILON < slot_time) {
            self.playhead = Some(self.ticker.wait_tick());
        }
    }
}

impl<S: FrameStream, T: Ticker> FrameSource for RefreshFrameSource<S, T> {
    fn info(&self) -> &SourceInfo {
        self.stream.info()
    }

    fn next_frame(&mut self) -> ReelResult<Option<SourceFrame>> {
        let limit = self.slot_limit();
        if limit.is_some_and(|n| self.emitted >= n) {
            return Ok(None);
        }

        let slot_time = self.fps.frame_to_secs(FrameIndex(self.emitted));
        self.advance_to(slot_time)?;
        if limit.is_none() && self.current_shown && self.peek()?.is_none() {
            return Ok(None);
        }
        let Some(current) = self.current.as_ref() else {
            return Ok(None);
        };
        let mut frame = current.clone();
        self.wait_for(slot_time);

        if self.current_shown {
            self.repeated += 1;
        }
        self.current_shown = true;
        self.emitted += 1;
        frame.time_sec = slot_time;
        Ok(Some(frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/refresh.rs"]
mod tests;
