//! Run progress reporting.

/// Frame-count based progress tracker.
pub mod tracker;
