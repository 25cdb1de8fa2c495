use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::new(30, 1).unwrap(), Fps::whole(30));
}

#[test]
fn fps_secs_to_frames_ceil_rounds_up_fractional_estimates() {
    let fps = Fps::whole(30);
    assert_eq!(fps.secs_to_frames_ceil(1.0), 30);
    assert_eq!(fps.secs_to_frames_ceil(1.01), 31);
    assert_eq!(fps.secs_to_frames_ceil(0.0), 0);
    assert_eq!(fps.secs_to_frames_ceil(f64::NAN), 0);

    let ntsc = Fps::new(30000, 1001).unwrap();
    assert_eq!(ntsc.secs_to_frames_ceil(10.0), 300);
}

#[test]
fn frame_to_secs_uses_rational_fps() {
    let fps = Fps::whole(25);
    assert!((fps.frame_to_secs(FrameIndex(50)) - 2.0).abs() < 1e-12);
}

#[test]
fn canvas_rgba_len() {
    assert_eq!(Canvas::new(720, 1280).rgba_len(), 720 * 1280 * 4);
}
