use kurbo::{BezPath, Rect, RoundedRect, Shape as _};

use crate::foundation::core::{Canvas, ContentBox};

/// Placement of the source video on the canvas, in canvas pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayoutRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl LayoutRect {
    /// Exclusive right edge.
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }

    /// Return `true` when the rect lies entirely inside `canvas`.
    pub fn fits_in(self, canvas: Canvas) -> bool {
        self.right() <= canvas.width && self.bottom() <= canvas.height
    }

    /// The rect as floating-point geometry.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }

    /// Watermark placement: horizontally centered on the video, `bottom_offset` pixels above its
    /// bottom edge.
    pub fn watermark_rect(self, width: u32, height: u32, bottom_offset: u32) -> Rect {
        let x = f64::from(self.x) + (f64::from(self.width) - f64::from(width)) / 2.0;
        let y = f64::from(self.bottom()) - f64::from(height) - f64::from(bottom_offset);
        Rect::new(x, y, x + f64::from(width), y + f64::from(height))
    }
}

/// Aspect-fit the source video into `content` and center the result on `canvas`.
///
/// Sources that already fit are never upscaled. Scaled dimensions are
/// `floor(source * min(max_w / src_w, max_h / src_h))`, computed in exact integer arithmetic so
/// results do not depend on float rounding. Each scaled side is at least one pixel.
#[tracing::instrument(level = "debug")]
pub fn fit_video_rect(
    source_width: u32,
    source_height: u32,
    content: ContentBox,
    canvas: Canvas,
) -> LayoutRect {
    let (width, height) = fit_dimensions(source_width, source_height, content);
    LayoutRect {
        x: canvas.width.saturating_sub(width) / 2,
        y: canvas.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

fn fit_dimensions(source_width: u32, source_height: u32, content: ContentBox) -> (u32, u32) {
    if source_width <= content.max_width && source_height <= content.max_height {
        return (source_width, source_height);
    }

    let sw = u64::from(source_width);
    let sh = u64::from(source_height);
    let mw = u64::from(content.max_width);
    let mh = u64::from(content.max_height);

    // min(mw/sw, mh/sh) picks the width ratio when mw*sh <= mh*sw.
    let (w, h) = if mw * sh <= mh * sw {
        (content.max_width, ((sh * mw) / sw) as u32)
    } else {
        (((sw * mh) / sh) as u32, content.max_height)
    };
    (w.max(1), h.max(1))
}

/// Rounded-rectangle outline used as the video clip path.
///
/// The radius is clamped to half of the shorter side.
pub fn rounded_rect_path(rect: Rect, radius: f64) -> BezPath {
    let max_radius = rect.width().min(rect.height()) / 2.0;
    let radius = radius.clamp(0.0, max_radius.max(0.0));
    RoundedRect::from_rect(rect, radius).to_path(0.1)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
