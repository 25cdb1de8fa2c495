use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::core::Fps;
use crate::foundation::error::ReelResult;

/// Metadata of an opened source video. Immutable for the lifetime of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceInfo {
    /// File the frames come from; `None` for in-memory sources.
    pub path: Option<PathBuf>,
    /// Native width in pixels.
    pub width: u32,
    /// Native height in pixels.
    pub height: u32,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Native frame rate.
    pub native_fps: Fps,
    /// Whether the source carries at least one audio stream.
    pub has_audio: bool,
}

/// One decoded source frame.
#[derive(Clone, Debug)]
pub struct SourceFrame {
    /// Presentation timestamp in seconds.
    pub time_sec: f64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Straight-alpha RGBA8 pixels, row-major.
    pub rgba: Arc<Vec<u8>>,
}

/// Pull-based source of frames for one run.
///
/// Returned timestamps are strictly increasing; `Ok(None)` marks the end of the stream.
pub trait FrameSource {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;
    /// Block until the next frame is due and return it.
    fn next_frame(&mut self) -> ReelResult<Option<SourceFrame>>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn info(&self) -> &SourceInfo {
        (**self).info()
    }

    fn next_frame(&mut self) -> ReelResult<Option<SourceFrame>> {
        (**self).next_frame()
    }
}

/// Random-access decoder used by the seek-driven strategy.
pub trait SeekDecoder {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;
    /// Decode the frame displayed at `time_sec`; `Ok(None)` past the end.
    fn decode_at(&mut self, time_sec: f64) -> ReelResult<Option<SourceFrame>>;
}

/// Sequential decoder used by the refresh-driven strategy.
pub trait FrameStream {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;
    /// Next decoded frame in presentation order; `Ok(None)` at the end.
    fn next_decoded(&mut self) -> ReelResult<Option<SourceFrame>>;
}
