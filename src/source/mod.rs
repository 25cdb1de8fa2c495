//! Frame sources: where composited frames get their video pixels from.
//!
//! Two scheduling strategies sit behind [`stream::FrameSource`]: [`refresh::RefreshFrameSource`]
//! samples a playing stream once per refresh tick, [`seek::SeekFrameSource`] decodes every output
//! timestamp exactly.

use std::path::Path;
use std::time::Duration;

use crate::config::pipeline::FrameTiming;
use crate::foundation::core::Fps;
use crate::foundation::error::ReelResult;

/// `ffprobe`/`ffmpeg` backed decoders.
pub mod ffmpeg;
/// In-memory video for tests and previews.
pub mod memory;
/// Refresh-driven scheduling.
pub mod refresh;
/// Seek-driven scheduling.
pub mod seek;
/// Source traits and frame types.
pub mod stream;

/// Open a video file with the scheduling strategy `timing` selects.
pub fn open_file_source(
    path: &Path,
    timing: FrameTiming,
    fps: Fps,
) -> ReelResult<Box<dyn stream::FrameSource>> {
    let info = ffmpeg::probe_source(path)?;
    tracing::info!(
        path = %path.display(),
        width = info.width,
        height = info.height,
        duration = info.duration_secs,
        audio = info.has_audio,
        "source opened"
    );
    Ok(match timing {
        FrameTiming::Refresh => Box::new(refresh::RefreshFrameSource::new(
            ffmpeg::FfmpegFrameStream::new(info)?,
            refresh::RealtimeTicker::new(fps),
            fps,
        )),
        FrameTiming::Seek { throttle_ms } => Box::new(
            seek::SeekFrameSource::new(ffmpeg::FfmpegDecoder::new(info)?, fps)
                .with_throttle(Duration::from_millis(throttle_ms)),
        ),
    })
}
