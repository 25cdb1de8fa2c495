use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::pipeline::{
    CaptionBlockStyle, CaptionBounds, CaptionStyle, FrameTiming, PipelineConfig, WatermarkStyle,
};
use crate::encode::codec::default_webm_options;
use crate::foundation::color::Rgba8;
use crate::foundation::core::{Canvas, ContentBox, Fps};
use crate::foundation::error::ReelError;
use crate::package::packager::TranscodeTarget;

/// Caption accent used for the second block.
const ACCENT_YELLOW: Rgba8 = Rgba8::rgb(0xFA, 0xCC, 0x15);

/// Stock reel layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// 720x1280, one white caption block.
    #[default]
    Reel720,
    /// 720x1280, white caption plus a yellow accent block.
    Reel720TwoLine,
    /// 1080x1920, one white caption block.
    Reel1080,
    /// 1080x1080 square post, one white caption block.
    Square1080,
}

impl Preset {
    /// All presets in display order.
    pub const ALL: [Preset; 4] = [
        Preset::Reel720,
        Preset::Reel720TwoLine,
        Preset::Reel1080,
        Preset::Square1080,
    ];

    /// Stable CLI/config name.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Reel720 => "reel-720",
            Preset::Reel720TwoLine => "reel-720-two-line",
            Preset::Reel1080 => "reel-1080",
            Preset::Square1080 => "square-1080",
        }
    }

    /// Build the full pipeline config for this preset.
    pub fn config(self) -> PipelineConfig {
        match self {
            Preset::Reel720 => reel_720(vec![block(Rgba8::WHITE, 35.0)]),
            Preset::Reel720TwoLine => reel_720(vec![
                block(Rgba8::WHITE, 35.0),
                block(ACCENT_YELLOW, 35.0),
            ]),
            Preset::Reel1080 => PipelineConfig {
                canvas: Canvas::new(1080, 1920),
                content_box: ContentBox {
                    max_width: 900,
                    max_height: 1380,
                },
                corner_radius: 32.0,
                fps: Fps::whole(30),
                watermark: WatermarkStyle {
                    width: 102,
                    height: 50,
                    bottom_offset: 75,
                },
                captions: CaptionStyle {
                    bounds: CaptionBounds::Canvas,
                    padding_x: 30.0,
                    line_height: 95.4,
                    gap_above_video: 60.0,
                    block_gap: 30.0,
                    blocks: vec![block(Rgba8::WHITE, 52.0)],
                },
                timing: FrameTiming::Refresh,
                codecs: default_webm_options(),
                transcode: Some(TranscodeTarget::default()),
                flatten_bg: Rgba8::BLACK,
            },
            Preset::Square1080 => PipelineConfig {
                canvas: Canvas::new(1080, 1080),
                content_box: ContentBox {
                    max_width: 960,
                    max_height: 760,
                },
                corner_radius: 28.0,
                fps: Fps::whole(30),
                watermark: WatermarkStyle {
                    width: 90,
                    height: 44,
                    bottom_offset: 40,
                },
                captions: CaptionStyle {
                    bounds: CaptionBounds::Canvas,
                    padding_x: 30.0,
                    line_height: 80.0,
                    gap_above_video: 30.0,
                    block_gap: 20.0,
                    blocks: vec![block(Rgba8::WHITE, 44.0)],
                },
                timing: FrameTiming::Refresh,
                codecs: default_webm_options(),
                transcode: Some(TranscodeTarget::default()),
                flatten_bg: Rgba8::BLACK,
            },
        }
    }
}

fn block(color: Rgba8, font_size: f32) -> CaptionBlockStyle {
    CaptionBlockStyle { color, font_size }
}

fn reel_720(blocks: Vec<CaptionBlockStyle>) -> PipelineConfig {
    PipelineConfig {
        canvas: Canvas::new(720, 1280),
        content_box: ContentBox {
            max_width: 600,
            max_height: 920,
        },
        corner_radius: 21.0,
        fps: Fps::whole(30),
        watermark: WatermarkStyle {
            width: 68,
            height: 33,
            bottom_offset: 50,
        },
        captions: CaptionStyle {
            bounds: CaptionBounds::Canvas,
            padding_x: 20.0,
            line_height: 63.6,
            gap_above_video: 40.0,
            block_gap: 20.0,
            blocks,
        },
        timing: FrameTiming::Refresh,
        codecs: default_webm_options(),
        transcode: Some(TranscodeTarget::default()),
        flatten_bg: Rgba8::BLACK,
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ReelError::validation(format!("unknown preset '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/presets.rs"]
mod tests;
