use crate::foundation::core::Fps;

/// Snapshot handed to progress callbacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// Frames handed to the encoder so far.
    pub processed: u64,
    /// Estimated total, `ceil(duration * fps)`.
    pub expected: u64,
    /// Percentage in `[0, 100]`, non-decreasing over a run.
    pub percent: f64,
}

/// Derives a monotonic completion percentage from processed vs. expected frames.
///
/// The estimate is fixed at construction. Overshooting it simply clamps at 100; the true frame
/// count is never fed back.
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    expected: u64,
    processed: u64,
    percent: f64,
}

impl ProgressTracker {
    /// Expect `ceil(duration_secs * fps)` frames.
    pub fn new(duration_secs: f64, fps: Fps) -> Self {
        Self::with_expected(fps.secs_to_frames_ceil(duration_secs))
    }

    /// Expect exactly `expected` frames.
    pub fn with_expected(expected: u64) -> Self {
        Self {
            expected,
            processed: 0,
            percent: 0.0,
        }
    }

    /// Record one processed frame.
    pub fn advance(&mut self) -> Progress {
        self.processed += 1;
        let raw = if self.expected == 0 {
            100.0
        } else {
            self.processed as f64 / self.expected as f64 * 100.0
        };
        self.percent = self.percent.max(raw.min(100.0));
        self.snapshot()
    }

    /// Mark the run complete; the percentage becomes exactly 100.
    pub fn complete(&mut self) -> Progress {
        self.percent = 100.0;
        self.snapshot()
    }

    /// Current state.
    pub fn snapshot(&self) -> Progress {
        Progress {
            processed: self.processed,
            expected: self.expected,
            percent: self.percent,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/progress/tracker.rs"]
mod tests;
