use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::encode::codec::CodecOption;
use crate::foundation::color::Rgba8;
use crate::foundation::core::{Canvas, ContentBox, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::package::packager::TranscodeTarget;

/// Maximum number of caption blocks a layout may configure.
pub const MAX_CAPTION_BLOCKS: usize = 2;

/// Everything that distinguishes one reel layout from another.
///
/// One config drives the whole pipeline; the [`crate::Preset`] table holds the stock layouts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Output canvas size.
    pub canvas: Canvas,
    /// Box the source video is aspect-fit into.
    pub content_box: ContentBox,
    /// Corner radius of the video clip, in pixels.
    pub corner_radius: f64,
    /// Output frame rate.
    pub fps: Fps,
    /// Watermark size and anchor.
    pub watermark: WatermarkStyle,
    /// Caption layout.
    pub captions: CaptionStyle,
    /// Frame scheduling strategy.
    #[serde(default)]
    pub timing: FrameTiming,
    /// Codec/container options in priority order.
    pub codecs: Vec<CodecOption>,
    /// Secondary transcode of the recorded artifact; `None` delivers the native artifact.
    #[serde(default)]
    pub transcode: Option<TranscodeTarget>,
    /// Color transparent canvas pixels are flattened over before encoding.
    #[serde(default = "default_flatten_bg")]
    pub flatten_bg: Rgba8,
}

fn default_flatten_bg() -> Rgba8 {
    Rgba8::BLACK
}

/// Watermark overlay geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatermarkStyle {
    /// Drawn width in pixels.
    pub width: u32,
    /// Drawn height in pixels.
    pub height: u32,
    /// Distance between the watermark's bottom edge and the video's bottom edge.
    pub bottom_offset: u32,
}

/// Which horizontal band caption text wraps within.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionBounds {
    /// Canvas width minus padding on both sides, right edge at `canvas.width - padding`.
    #[default]
    Canvas,
    /// Video width minus padding on both sides, right edge at `video.right - padding`.
    Video,
}

/// Caption layout shared by all blocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptionStyle {
    /// Wrapping band.
    #[serde(default)]
    pub bounds: CaptionBounds,
    /// Horizontal padding in pixels.
    pub padding_x: f32,
    /// Distance between consecutive line tops.
    pub line_height: f32,
    /// Space between the bottom of the first caption line box and the video's top edge.
    pub gap_above_video: f32,
    /// Extra space between consecutive blocks.
    pub block_gap: f32,
    /// Per-block styling, top to bottom (at most [`MAX_CAPTION_BLOCKS`]).
    pub blocks: Vec<CaptionBlockStyle>,
}

/// Styling of one caption block.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptionBlockStyle {
    /// Fill color.
    pub color: Rgba8,
    /// Font size in pixels.
    pub font_size: f32,
}

/// How source frames are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum FrameTiming {
    /// Sample the playing source once per refresh tick; may skip frames under load.
    #[default]
    Refresh,
    /// Seek to every `frame / fps` timestamp; exact coverage, slower than realtime.
    Seek {
        /// Delay between steps, in milliseconds.
        #[serde(default)]
        throttle_ms: u64,
    },
}

impl PipelineConfig {
    /// Validate user-provided values.
    ///
    /// An empty or fully unsupported codec list is not a config error; it surfaces as
    /// [`ReelError::UnsupportedFormat`] when recording starts.
    pub fn validate(&self) -> ReelResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        if !self.canvas.width.is_multiple_of(2) || !self.canvas.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        if self.canvas.width > u32::from(u16::MAX) || self.canvas.height > u32::from(u16::MAX) {
            return Err(ReelError::validation("canvas width/height must fit in u16"));
        }
        Fps::new(self.fps.num, self.fps.den)?;

        if self.content_box.max_width == 0 || self.content_box.max_height == 0 {
            return Err(ReelError::validation("content box must be non-zero"));
        }
        if self.content_box.max_width > self.canvas.width
            || self.content_box.max_height > self.canvas.height
        {
            return Err(ReelError::validation(
                "content box must fit inside the canvas",
            ));
        }
        if !self.corner_radius.is_finite() || self.corner_radius < 0.0 {
            return Err(ReelError::validation(
                "corner_radius must be finite and >= 0",
            ));
        }
        if self.watermark.width == 0 || self.watermark.height == 0 {
            return Err(ReelError::validation("watermark size must be non-zero"));
        }

        let c = &self.captions;
        if c.blocks.len() > MAX_CAPTION_BLOCKS {
            return Err(ReelError::validation(format!(
                "at most {MAX_CAPTION_BLOCKS} caption blocks are supported, got {}",
                c.blocks.len()
            )));
        }
        for v in [c.padding_x, c.gap_above_video, c.block_gap] {
            if !v.is_finite() || v < 0.0 {
                return Err(ReelError::validation(
                    "caption padding and gaps must be finite and >= 0",
                ));
            }
        }
        if !c.line_height.is_finite() || c.line_height <= 0.0 {
            return Err(ReelError::validation(
                "caption line_height must be finite and > 0",
            ));
        }
        if c
            .blocks
            .iter()
            .any(|b| !b.font_size.is_finite() || b.font_size <= 0.0)
        {
            return Err(ReelError::validation(
                "caption font_size must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Load a config from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> ReelResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read pipeline config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ReelError::validation(format!("parse pipeline config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/pipeline.rs"]
mod tests;
