use super::*;
use crate::foundation::core::FrameIndex;
use crate::source::memory::MemoryVideo;

fn video(frames: usize) -> MemoryVideo {
    MemoryVideo::solid(2, 2, Fps::whole(30), frames, [0, 255, 0, 255])
}

fn drain<S: FrameStream, T: Ticker>(src: &mut RefreshFrameSource<S, T>) -> Vec<f64> {
    let mut out = Vec::new();
    while let Some(f) = src.next_frame().unwrap() {
        out.push(f.time_sec);
    }
    out
}

#[test]
fn matching_refresh_emits_every_frame() {
    let mut src = RefreshFrameSource::new(
        video(30),
        SteppedTicker::new(1.0 / 30.0),
        Fps::whole(30),
    );
    let times = drain(&mut src);
    assert_eq!(times.len(), 30);
    assert_eq!(src.skipped(), 0);
    assert_eq!(src.repeated(), 0);
}

#[test]
fn slow_refresh_skips_superseded_frames() {
    // 10 Hz output over a 30 fps stream: two of every three frames are passed over.
    let mut src = RefreshFrameSource::new(video(30), SteppedTicker::new(0.1), Fps::whole(10));
    let times = drain(&mut src);
    assert_eq!(times.len(), 10);
    assert_eq!(src.skipped(), 18);
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn lower_source_rate_repeats_frames_to_keep_duration() {
    let fps = Fps::whole(30);
    let source = MemoryVideo::solid(2, 2, Fps::whole(24), 24, [0, 0, 255, 255]).with_duration(1.0);
    let expected = fps.secs_to_frames_ceil(1.0);
    let mut src = RefreshFrameSource::new(source, SteppedTicker::new(1.0 / 30.0), fps);

    let times = drain(&mut src);
    assert_eq!(expected, 30);
    assert_eq!(times.len() as u64, expected);
    assert_eq!(src.repeated(), 6);
    assert_eq!(src.skipped(), 0);
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn slots_carry_output_timestamps() {
    let fps = Fps::whole(30);
    let mut src = RefreshFrameSource::new(video(10), SteppedTicker::new(1.0 / 120.0), fps);
    let times = drain(&mut src);
    assert_eq!(times.len(), 10);
    for (i, t) in times.iter().enumerate() {
        assert_eq!(*t, fps.frame_to_secs(FrameIndex(i as u64)));
    }
}

#[test]
fn lagging_consumer_fills_overdue_slots_without_waiting() {
    // A clock far ahead of the slots: every slot is overdue, yet none is dropped.
    let mut src = RefreshFrameSource::new(video(15), SteppedTicker::new(10.0), Fps::whole(30));
    let times = drain(&mut src);
    assert_eq!(times.len(), 15);
    assert_eq!(src.skipped(), 0);
}

#[test]
fn unknown_duration_ends_after_last_frame_is_shown() {
    let mut src = RefreshFrameSource::new(
        video(5).with_duration(0.0),
        SteppedTicker::new(1.0 / 30.0),
        Fps::whole(30),
    );
    let times = drain(&mut src);
    assert_eq!(times.len(), 5);
}

#[test]
fn empty_stream_is_exhausted_immediately() {
    let mut src = RefreshFrameSource::new(video(0), SteppedTicker::new(0.1), Fps::whole(10));
    assert!(src.next_frame().unwrap().is_none());
}

#[test]
fn stepped_ticker_starts_at_zero() {
    let mut t = SteppedTicker::new(0.5);
    assert_eq!(t.wait_tick(), 0.0);
    assert_eq!(t.wait_tick(), 0.5);
    assert_eq!(t.wait_tick(), 1.0);
}

#[test]
fn realtime_ticker_reports_increasing_positions() {
    let mut t = RealtimeTicker::new(Fps::whole(200));
    let a = t.wait_tick();
    let b = t.wait_tick();
    assert!(b > a);
}
