use super::*;
use crate::config::pipeline::CaptionBlockStyle;

fn style(blocks: usize) -> CaptionStyle {
    CaptionStyle {
        bounds: CaptionBounds::Canvas,
        padding_x: 20.0,
        line_height: 50.0,
        gap_above_video: 40.0,
        block_gap: 10.0,
        blocks: (0..blocks)
            .map(|i| CaptionBlockStyle {
                color: if i == 0 { Rgba8::WHITE } else { Rgba8::rgb(250, 204, 21) },
                font_size: 35.0,
            })
            .collect(),
    }
}

fn video() -> LayoutRect {
    LayoutRect {
        x: 60,
        y: 471,
        width: 600,
        height: 337,
    }
}

fn mono(s: &str, size: f32) -> f32 {
    s.chars().count() as f32 * size / 2.0
}

#[test]
fn band_follows_configured_bounds() {
    let canvas = Canvas::new(720, 1280);
    let mut s = style(1);
    assert_eq!(caption_band(&s, canvas, video()), (700.0, 680.0));
    s.bounds = CaptionBounds::Video;
    assert_eq!(caption_band(&s, canvas, video()), (640.0, 560.0));
}

#[test]
fn single_block_starts_one_line_above_video() {
    let lines = layout_captions(
        &["hello".to_owned()],
        &style(1),
        Canvas::new(720, 1280),
        video(),
        &mut mono,
    );
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "hello");
    assert_eq!(lines[0].top_y, 471.0 - 40.0 - 50.0);
    assert_eq!(lines[0].right_x, 700.0);
}

#[test]
fn blocks_stack_with_gap_after_wrapped_lines() {
    // 35 px font => 17.5 px per char; 680 px band fits 38 chars.
    let long = "word ".repeat(12);
    let lines = layout_captions(
        &[long, "second".to_owned()],
        &style(2),
        Canvas::new(720, 1280),
        video(),
        &mut mono,
    );
    let first_block: Vec<_> = lines
        .iter()
        .filter(|l| l.color == Rgba8::WHITE)
        .collect();
    assert_eq!(first_block.len(), 2);
    let top = 471.0 - 40.0 - 50.0;
    assert_eq!(first_block[1].top_y, top + 50.0);

    let second = lines.last().unwrap();
    assert_eq!(second.text, "second");
    assert_eq!(second.top_y, top + 2.0 * 50.0 + 10.0);
    assert_eq!(second.color, Rgba8::rgb(250, 204, 21));
}

#[test]
fn extra_texts_beyond_block_count_are_ignored() {
    let lines = layout_captions(
        &["a".to_owned(), "b".to_owned()],
        &style(1),
        Canvas::new(720, 1280),
        video(),
        &mut mono,
    );
    assert_eq!(lines.len(), 1);
}

#[test]
fn empty_caption_still_places_one_empty_line() {
    let lines = layout_captions(
        &[String::new()],
        &style(1),
        Canvas::new(720, 1280),
        video(),
        &mut mono,
    );
    assert_eq!(lines.len(), 1);
    assert!(lines[0].text.is_empty());
}
