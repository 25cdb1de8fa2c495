use crate::config::pipeline::{CaptionBounds, CaptionStyle};
use crate::foundation::color::Rgba8;
use crate::foundation::core::Canvas;
use crate::layout::fit::LayoutRect;
use crate::text::wrap::wrap_words;

/// Width measurement for caption text at a given font size.
pub trait TextMeasure {
    /// Advance width of `text` in pixels, including trailing whitespace.
    fn measure(&mut self, text: &str, font_size: f32) -> f32;
}

impl<F> TextMeasure for F
where
    F: FnMut(&str, f32) -> f32,
{
    fn measure(&mut self, text: &str, font_size: f32) -> f32 {
        self(text, font_size)
    }
}

/// One wrapped caption line with its on-canvas anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    /// Line text without the trailing separator.
    pub text: String,
    /// Right edge the line is aligned against.
    pub right_x: f32,
    /// Top of the line box.
    pub top_y: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Font size in pixels.
    pub font_size: f32,
}

/// Horizontal band available to caption text: `(right_edge, max_width)`.
pub fn caption_band(style: &CaptionStyle, canvas: Canvas, video: LayoutRect) -> (f32, f32) {
    let pad = style.padding_x;
    match style.bounds {
        CaptionBounds::Canvas => {
            let w = canvas.width as f32;
            (w - pad, (w - 2.0 * pad).max(0.0))
        }
        CaptionBounds::Video => {
            let right = video.right() as f32;
            (right - pad, (video.width as f32 - 2.0 * pad).max(0.0))
        }
    }
}

/// Wrap every configured caption block and stack the resulting lines.
///
/// The first block starts one line above the video (`gap_above_video + line_height` over its top
/// edge); lines advance by `line_height`, and each further block starts `block_gap` below the
/// previous block's last line. Texts beyond the configured block count are ignored; missing texts
/// yield no lines for that block.
pub fn layout_captions(
    texts: &[String],
    style: &CaptionStyle,
    canvas: Canvas,
    video: LayoutRect,
    measure: &mut dyn TextMeasure,
) -> Vec<PlacedLine> {
    let (right_x, max_width) = caption_band(style, canvas, video);
    let mut y = video.y as f32 - style.gap_above_video - style.line_height;
    let mut out = Vec::new();

    for (block, text) in style.blocks.iter().zip(texts) {
        let lines = wrap_words(text, max_width, |s| measure.measure(s, block.font_size));
        let count = lines.len();
        for (i, line) in lines.into_iter().enumerate() {
            out.push(PlacedLine {
                text: line,
                right_x,
                top_y: y + i as f32 * style.line_height,
                color: block.color,
                font_size: block.font_size,
            });
        }
        y += count as f32 * style.line_height + style.block_gap;
    }

    out
}

#[cfg(test)]
#[path = "../../tests/unit/text/caption.rs"]
mod tests;
