use super::*;
use proptest::prelude::*;

#[test]
fn expected_frames_use_ceiling() {
    assert_eq!(ProgressTracker::new(1.0, Fps::whole(30)).snapshot().expected, 30);
    assert_eq!(ProgressTracker::new(1.01, Fps::whole(30)).snapshot().expected, 31);
    assert_eq!(ProgressTracker::new(0.0, Fps::whole(30)).snapshot().expected, 0);
}

#[test]
fn percent_tracks_processed_frames() {
    let mut t = ProgressTracker::with_expected(4);
    assert_eq!(t.advance().percent, 25.0);
    assert_eq!(t.advance().percent, 50.0);
}

#[test]
fn overshoot_clamps_at_100() {
    let mut t = ProgressTracker::with_expected(2);
    t.advance();
    t.advance();
    let p = t.advance();
    assert_eq!(p.processed, 3);
    assert_eq!(p.expected, 2, "estimate is never reconciled");
    assert_eq!(p.percent, 100.0);
}

#[test]
fn undershoot_completes_at_exactly_100() {
    let mut t = ProgressTracker::with_expected(10);
    t.advance();
    assert!(t.snapshot().percent < 100.0);
    assert_eq!(t.complete().percent, 100.0);
}

#[test]
fn zero_expected_reports_full_progress() {
    let mut t = ProgressTracker::with_expected(0);
    assert_eq!(t.advance().percent, 100.0);
}

proptest! {
    #[test]
    fn progress_is_monotonic_and_bounded(expected in 0u64..500, frames in 0u64..800) {
        let mut t = ProgressTracker::with_expected(expected);
        let mut last = 0.0;
        for _ in 0..frames {
            let p = t.advance().percent;
            prop_assert!((0.0..=100.0).contains(&p));
            prop_assert!(p >= last);
            last = p;
        }
        prop_assert_eq!(t.complete().percent, 100.0);
    }
}
