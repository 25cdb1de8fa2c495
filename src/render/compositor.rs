use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::config::pipeline::{CaptionStyle, PipelineConfig, WatermarkStyle};
use crate::foundation::core::{Canvas, ContentBox};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::layout::fit::{LayoutRect, fit_video_rect, rounded_rect_path};
use crate::render::frame::FrameRGBA;
use crate::source::stream::SourceFrame;
use crate::text::caption::{PlacedLine, layout_captions};
use crate::text::engine::{TextBrushRgba8, TextLayoutEngine};

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

struct ShapedLine {
    layout: parley::Layout<TextBrushRgba8>,
    origin_x: f64,
    top_y: f64,
}

/// Draws one output frame per source frame in fixed z-order: background, rounded-clipped
/// video, watermark, captions.
///
/// Placement is recomputed only when the source resolution changes; caption lines are wrapped
/// and shaped at that point too. The canvas buffer belongs to the compositor and finished
/// frames are lent out by reference.
pub struct Compositor {
    canvas: Canvas,
    content_box: ContentBox,
    corner_radius: f64,
    watermark_style: WatermarkStyle,
    caption_style: CaptionStyle,

    ctx: Option<vello_cpu::RenderContext>,
    pixmap: vello_cpu::Pixmap,
    background: ImagePaint,
    watermark: ImagePaint,

    text: TextLayoutEngine,
    fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
    caption_texts: Vec<String>,
    placed: Vec<PlacedLine>,
    shaped: Vec<ShapedLine>,

    source_dims: Option<(u32, u32)>,
    layout: Option<LayoutRect>,
    frame: FrameRGBA,
}

impl Compositor {
    /// Build a compositor for `cfg` with decoded assets and an optional custom typeface.
    pub fn new(
        cfg: &PipelineConfig,
        background: &PreparedImage,
        watermark: &PreparedImage,
        typeface: Option<&[u8]>,
    ) -> ReelResult<Self> {
        let w = canvas_dim(cfg.canvas.width)?;
        let h = canvas_dim(cfg.canvas.height)?;
        Ok(Self {
            canvas: cfg.canvas,
            content_box: cfg.content_box,
            corner_radius: cfg.corner_radius,
            watermark_style: cfg.watermark,
            caption_style: cfg.captions.clone(),
            ctx: Some(vello_cpu::RenderContext::new(w, h)),
            pixmap: vello_cpu::Pixmap::new(w, h),
            background: image_paint(background)?,
            watermark: image_paint(watermark)?,
            text: TextLayoutEngine::new(typeface),
            fonts: HashMap::new(),
            caption_texts: Vec::new(),
            placed: Vec::new(),
            shaped: Vec::new(),
            source_dims: None,
            layout: None,
            frame: FrameRGBA::transparent(cfg.canvas.width, cfg.canvas.height),
        })
    }

    /// Set caption texts, one per configured block, top to bottom.
    pub fn set_captions(&mut self, texts: &[String]) -> ReelResult<()> {
        self.caption_texts = texts.to_vec();
        if let Some(rect) = self.layout {
            self.place_captions(rect)?;
        }
        Ok(())
    }

    /// Placement for the current source resolution, if a frame has been seen.
    pub fn layout(&self) -> Option<LayoutRect> {
        self.layout
    }

    /// Caption lines as placed for the current layout.
    pub fn placed_lines(&self) -> &[PlacedLine] {
        &self.placed
    }

    /// Family name captions are shaped with.
    pub fn caption_family(&self) -> &str {
        self.text.family()
    }

    /// Compute (or reuse) the placement for a `source_width x source_height` source.
    pub fn prepare(&mut self, source_width: u32, source_height: u32) -> ReelResult<LayoutRect> {
        if let (Some(dims), Some(rect)) = (self.source_dims, self.layout)
            && dims == (source_width, source_height)
        {
            return Ok(rect);
        }
        if source_width == 0 || source_height == 0 {
            return Err(ReelError::decode("source frame has zero dimensions"));
        }

        let rect = fit_video_rect(source_width, source_height, self.content_box, self.canvas);
        tracing::debug!(
            source_width,
            source_height,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "video layout computed"
        );
        self.source_dims = Some((source_width, source_height));
        self.layout = Some(rect);
        self.place_captions(rect)?;
        Ok(rect)
    }

    /// Composite one frame.
    pub fn render(&mut self, source: &SourceFrame) -> ReelResult<&FrameRGBA> {
        let rect = self.prepare(source.width, source.height)?;
        let video = straight_rgba_paint(&source.rgba, source.width, source.height)?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) => ctx,
            None => vello_cpu::RenderContext::new(
                canvas_dim(self.canvas.width)?,
                canvas_dim(self.canvas.height)?,
            ),
        };
        ctx.reset();
        self.draw(&mut ctx, rect, &video);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        self.ctx = Some(ctx);

        self.frame
            .data
            .copy_from_slice(self.pixmap.data_as_u8_slice());
        Ok(&self.frame)
    }

    fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        rect: LayoutRect,
        video: &ImagePaint,
    ) {
        use vello_cpu::kurbo::{Affine, Rect};

        ctx.set_paint_transform(Affine::IDENTITY);

        // 1. Background stretched over the whole canvas.
        let bg = &self.background;
        ctx.set_transform(Affine::scale_non_uniform(
            f64::from(self.canvas.width) / f64::from(bg.w),
            f64::from(self.canvas.height) / f64::from(bg.h),
        ));
        ctx.set_paint(bg.paint.clone());
        ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(bg.w), f64::from(bg.h)));

        // 2-3. Video scaled into the layout rect through the rounded clip.
        let clip = bezpath_to_cpu(&rounded_rect_path(rect.to_rect(), self.corner_radius));
        ctx.set_transform(Affine::IDENTITY);
        ctx.push_clip_layer(&clip);
        ctx.set_transform(
            Affine::translate((f64::from(rect.x), f64::from(rect.y)))
                * Affine::scale_non_uniform(
                    f64::from(rect.width) / f64::from(video.w),
                    f64::from(rect.height) / f64::from(video.h),
                ),
        );
        ctx.set_paint(video.paint.clone());
        ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(video.w), f64::from(video.h)));
        ctx.pop_layer();

        // 4. Watermark at its anchor, scaled to the configured size.
        let wm = &self.watermark;
        let anchor = rect.watermark_rect(
            self.watermark_style.width,
            self.watermark_style.height,
            self.watermark_style.bottom_offset,
        );
        ctx.set_transform(
            Affine::translate((anchor.x0, anchor.y0))
                * Affine::scale_non_uniform(
                    anchor.width() / f64::from(wm.w),
                    anchor.height() / f64::from(wm.h),
                ),
        );
        ctx.set_paint(wm.paint.clone());
        ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(wm.w), f64::from(wm.h)));

        // 5. Captions.
        for line in &self.shaped {
            ctx.set_transform(Affine::translate((line.origin_x, line.top_y)));
            for l in line.layout.lines() {
                for item in l.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                    let src = run.run().font();
                    let font = cpu_font(&mut self.fonts, (src.data.id(), src.index), || {
                        src.data.data().to_vec()
                    });
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
    }

    fn place_captions(&mut self, rect: LayoutRect) -> ReelResult<()> {
        let engine = &mut self.text;
        let mut measure = |s: &str, size: f32| engine.measure(s, size);
        self.placed = layout_captions(
            &self.caption_texts,
            &self.caption_style,
            self.canvas,
            rect,
            &mut measure,
        );

        self.shaped.clear();
        for line in &self.placed {
            if line.text.is_empty() {
                continue;
            }
            let layout = self
                .text
                .layout_line(&line.text, line.font_size, line.color.into())?;
            self.shaped.push(ShapedLine {
                origin_x: f64::from(line.right_x - layout.width()),
                top_y: f64::from(line.top_y),
                layout,
            });
        }
        tracing::debug!(lines = self.placed.len(), "captions placed");
        Ok(())
    }
}

fn canvas_dim(v: u32) -> ReelResult<u16> {
    v.try_into()
        .map_err(|_| ReelError::validation("canvas dimension exceeds u16"))
}

/// Font handle for the renderer, keyed by `(blob id, collection index)`.
fn cpu_font(
    cache: &mut HashMap<(u64, u32), vello_cpu::peniko::FontData>,
    key: (u64, u32),
    bytes: impl FnOnce() -> Vec<u8>,
) -> vello_cpu::peniko::FontData {
    cache
        .entry(key)
        .or_insert_with(|| {
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes()), key.1)
        })
        .clone()
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;
    use vello_cpu::kurbo::Point;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(Point::new(p1.x, p1.y), Point::new(p2.x, p2.y)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                Point::new(p1.x, p1.y),
                Point::new(p2.x, p2.y),
                Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> ReelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ReelError::load("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ReelError::load("image height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(ReelError::load("image has zero dimensions"));
    }
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(ReelError::load("image byte length does not match its size"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn image_paint(img: &PreparedImage) -> ReelResult<ImagePaint> {
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    Ok(ImagePaint {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        w: img.width,
        h: img.height,
    })
}

fn straight_rgba_paint(rgba: &[u8], width: u32, height: u32) -> ReelResult<ImagePaint> {
    let mut tmp = rgba.to_vec();
    premultiply_rgba8_in_place(&mut tmp);
    let pixmap = pixmap_from_premul_bytes(&tmp, width, height)
        .map_err(|e| ReelError::decode(format!("source frame unusable: {e}")))?;
    Ok(ImagePaint {
        paint: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        w: width,
        h: height,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
