use super::*;
use crate::config::presets::Preset;
use crate::foundation::color::Rgba8;
use crate::source::stream::SourceFrame;

const BLUE: [u8; 4] = [0, 0, 255, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];

fn small_config() -> PipelineConfig {
    let mut cfg = Preset::Reel720.config();
    cfg.canvas = Canvas::new(40, 60);
    cfg.content_box = ContentBox {
        max_width: 30,
        max_height: 40,
    };
    cfg.corner_radius = 8.0;
    cfg.watermark = WatermarkStyle {
        width: 6,
        height: 4,
        bottom_offset: 2,
    };
    cfg.captions.padding_x = 2.0;
    cfg.captions.line_height = 5.0;
    cfg.captions.gap_above_video = 2.0;
    cfg.captions.blocks[0].color = Rgba8::WHITE;
    cfg.captions.blocks[0].font_size = 4.0;
    cfg
}

fn compositor() -> Compositor {
    Compositor::new(
        &small_config(),
        &PreparedImage::solid(4, 4, BLUE),
        &PreparedImage::solid(3, 2, GREEN),
        None,
    )
    .unwrap()
}

fn solid_frame(w: u32, h: u32, rgba: [u8; 4]) -> SourceFrame {
    let mut px = Vec::new();
    for _ in 0..w * h {
        px.extend_from_slice(&rgba);
    }
    SourceFrame {
        time_sec: 0.0,
        width: w,
        height: h,
        rgba: Arc::new(px),
    }
}

#[test]
fn layers_draw_in_order() {
    let mut c = compositor();
    let frame = c.render(&solid_frame(60, 40, RED)).unwrap().clone();
    assert_eq!(
        c.layout(),
        Some(LayoutRect {
            x: 5,
            y: 20,
            width: 30,
            height: 20
        })
    );

    assert_eq!(frame.pixel(0, 0), Some(BLUE), "background");
    assert_eq!(frame.pixel(39, 59), Some(BLUE), "background stretched to the corner");
    assert_eq!(frame.pixel(12, 25), Some(RED), "video inside the clip");
    assert_eq!(frame.pixel(20, 36), Some(GREEN), "watermark above the video");
}

#[test]
fn rounded_clip_hides_video_corners() {
    let mut c = compositor();
    let frame = c.render(&solid_frame(60, 40, RED)).unwrap();
    // Layout is (5, 20, 30, 20); with radius 8 the corner pixels lie outside the arc.
    assert_eq!(frame.pixel(5, 20), Some(BLUE));
    assert_eq!(frame.pixel(34, 20), Some(BLUE));
    assert_eq!(frame.pixel(5, 39), Some(BLUE));
    assert_eq!(frame.pixel(34, 39), Some(BLUE));
    // Edge midpoints are inside.
    assert_eq!(frame.pixel(20, 20), Some(RED));
    assert_eq!(frame.pixel(5, 30), Some(RED));
}

#[test]
fn layout_follows_source_resolution_changes() {
    let mut c = compositor();
    c.render(&solid_frame(60, 40, RED)).unwrap();
    let first = c.layout().unwrap();
    c.render(&solid_frame(10, 20, RED)).unwrap();
    let second = c.layout().unwrap();
    assert_ne!(first, second);
    assert_eq!(
        second,
        LayoutRect {
            x: 15,
            y: 20,
            width: 10,
            height: 20
        }
    );
}

#[test]
fn frames_with_wrong_byte_length_are_rejected() {
    let mut c = compositor();
    let mut f = solid_frame(4, 4, RED);
    f.width = 5;
    let err = c.render(&f).unwrap_err();
    assert!(matches!(err, ReelError::Decode(_)), "{err}");
}

#[test]
fn captions_are_placed_above_the_video() {
    let mut c = compositor();
    c.set_captions(&["hello".to_owned()]).unwrap();
    assert!(c.placed_lines().is_empty(), "no layout yet");

    c.prepare(60, 40).unwrap();
    let lines = c.placed_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "hello");
    // video.y - gap - line_height = 20 - 2 - 5
    assert_eq!(lines[0].top_y, 13.0);
    // canvas width - padding
    assert_eq!(lines[0].right_x, 38.0);
    assert_eq!(lines[0].color, Rgba8::WHITE);
}

#[test]
fn empty_caption_renders_without_glyphs() {
    let mut c = compositor();
    c.set_captions(&[String::new()]).unwrap();
    let frame = c.render(&solid_frame(60, 40, RED)).unwrap();
    assert_eq!(frame.pixel(0, 0), Some(BLUE));
    assert_eq!(c.placed_lines().len(), 1);
    assert_eq!(c.placed_lines()[0].text, "");
}
