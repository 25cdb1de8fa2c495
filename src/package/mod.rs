//! Output packaging: optional transcode of the recorded artifact.

/// Transcoders and the packager.
pub mod packager;
