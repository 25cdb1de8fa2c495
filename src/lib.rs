//! reelcast turns an arbitrary input video into a fixed-canvas "reel".
//!
//! Each output frame layers a stretched background, the source video aspect-fit into a rounded
//! rectangle, a watermark and up to two right-aligned caption blocks. Frames are encoded in
//! timestamp order by an [`EncoderSink`], and the recorded artifact is optionally transcoded into
//! a more compatible container by the [`OutputPackager`].
//!
//! - Pick a [`Preset`] or load a [`PipelineConfig`]
//! - Open a [`FrameSource`] (refresh-driven or seek-driven)
//! - Call [`Pipeline::run`], or [`render_reel`] to wire the `ffmpeg`-backed implementations
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Asset loading and typeface resolution.
pub mod assets;
/// Pipeline configuration and presets.
pub mod config;
/// Codec selection, recording state machine and encoder backends.
pub mod encode;
/// Video placement on the canvas.
pub mod layout;
/// Output packaging.
pub mod package;
/// Run orchestration.
pub mod pipeline;
/// Progress reporting.
pub mod progress;
/// Frame compositing.
pub mod render;
/// Source video frame scheduling and decoding.
pub mod source;
/// Caption wrapping and layout.
pub mod text;

pub use crate::foundation::color::Rgba8;
pub use crate::foundation::core::{Canvas, ContentBox, Fps, FrameIndex};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::assets::decode::PreparedImage;
pub use crate::assets::loader::{
    AssetLoader, AssetRef, DefaultTypeface, FontProvider, FsAssetLoader, LoaderTypeface,
};
pub use crate::config::pipeline::{
    CaptionBlockStyle, CaptionBounds, CaptionStyle, FrameTiming, PipelineConfig, WatermarkStyle,
};
pub use crate::config::presets::Preset;
pub use crate::encode::codec::{CodecOption, CodecSupport, FfmpegCodecSupport, select_codec};
pub use crate::encode::ffmpeg::{FfmpegEncoder, is_ffmpeg_on_path};
pub use crate::encode::memory::InMemoryEncoder;
pub use crate::encode::sink::{
    EncodeSettings, EncodedChunk, EncoderSink, FrameEncoder, OutputArtifact, SinkState,
};
pub use crate::layout::fit::{LayoutRect, fit_video_rect, rounded_rect_path};
pub use crate::package::packager::{
    FfmpegTranscoder, FnTranscoder, OutputPackager, PackageWarning, TranscodeTarget, Transcoder,
};
pub use crate::pipeline::run::{
    Pipeline, RenderRequest, RunInputs, RunOutput, RunStats, composite_at, render_reel,
    render_still,
};
pub use crate::progress::tracker::{Progress, ProgressTracker};
pub use crate::render::compositor::Compositor;
pub use crate::render::frame::FrameRGBA;
pub use crate::source::memory::MemoryVideo;
pub use crate::source::refresh::{RealtimeTicker, RefreshFrameSource, SteppedTicker, Ticker};
pub use crate::source::seek::SeekFrameSource;
pub use crate::source::stream::{FrameSource, FrameStream, SeekDecoder, SourceFrame, SourceInfo};
pub use crate::text::wrap::wrap_words;
