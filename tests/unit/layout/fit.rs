use kurbo::Shape as _;
use proptest::prelude::*;

use super::*;

const REEL: Canvas = Canvas::new(720, 1280);
const BOX: ContentBox = ContentBox {
    max_width: 600,
    max_height: 920,
};

#[test]
fn landscape_source_is_scaled_to_box_width_and_centered() {
    let r = fit_video_rect(640, 360, BOX, REEL);
    assert_eq!(
        r,
        LayoutRect {
            x: 60,
            y: 471,
            width: 600,
            height: 337,
        }
    );
}

#[test]
fn small_source_is_not_upscaled() {
    let r = fit_video_rect(320, 240, BOX, REEL);
    assert_eq!((r.width, r.height), (320, 240));
    assert_eq!((r.x, r.y), (200, 520));
}

#[test]
fn portrait_source_is_limited_by_box_height() {
    let r = fit_video_rect(1080, 1920, BOX, REEL);
    assert_eq!(r.height, 920);
    assert_eq!(r.width, 517);
    assert!(r.fits_in(REEL));
}

#[test]
fn extreme_aspect_keeps_a_one_pixel_side() {
    let r = fit_video_rect(10_000, 1, BOX, REEL);
    assert_eq!((r.width, r.height), (600, 1));
    assert_eq!((r.x, r.y), (60, 639));

    let r = fit_video_rect(1, 50_000, BOX, REEL);
    assert_eq!((r.width, r.height), (1, 920));
    assert!(r.fits_in(REEL));
}

#[test]
fn watermark_sits_above_bottom_edge_centered_on_video() {
    let r = fit_video_rect(640, 360, BOX, REEL);
    let wm = r.watermark_rect(68, 33, 50);
    assert_eq!(wm.x0, 60.0 + (600.0 - 68.0) / 2.0);
    assert_eq!(wm.y0, 471.0 + 337.0 - 33.0 - 50.0);
    assert_eq!(wm.width(), 68.0);
    assert_eq!(wm.height(), 33.0);
}

#[test]
fn rounded_rect_radius_is_clamped_to_half_short_side() {
    let rect = kurbo::Rect::new(0.0, 0.0, 10.0, 40.0);
    let path = rounded_rect_path(rect, 100.0);
    let bbox = path.bounding_box();
    assert!((bbox.width() - 10.0).abs() < 1e-6);
    assert!((bbox.height() - 40.0).abs() < 1e-6);
    assert!(path.contains(kurbo::Point::new(5.0, 20.0)));
    assert!(!path.contains(kurbo::Point::new(0.2, 0.2)));
}

proptest! {
    #[test]
    fn fit_preserves_aspect_and_stays_in_box(
        sw in 1u32..8000,
        sh in 1u32..8000,
        mw in 1u32..2000,
        mh in 1u32..2000,
    ) {
        let canvas = Canvas::new(mw + 40, mh + 40);
        let r = fit_video_rect(sw, sh, ContentBox { max_width: mw, max_height: mh }, canvas);

        prop_assert!(r.width >= 1 && r.height >= 1);
        prop_assert!(r.width <= mw);
        prop_assert!(r.height <= mh);
        let skew = (i128::from(r.width) * i128::from(sh) - i128::from(r.height) * i128::from(sw)).abs();
        prop_assert!(skew <= i128::from(sw.max(sh)));

        prop_assert!((i64::from(canvas.width) - (2 * i64::from(r.x) + i64::from(r.width))).abs() <= 1);
        prop_assert!((i64::from(canvas.height) - (2 * i64::from(r.y) + i64::from(r.height))).abs() <= 1);
        prop_assert!(r.fits_in(canvas));
    }
}
