//! Encoding: codec selection, the recording state machine and its backends.
//!
//! The [`sink::EncoderSink`] owns the lifecycle; [`sink::FrameEncoder`] implementations turn
//! composited frames into compressed bytes.

/// Codec/container options and support predicates.
pub mod codec;
/// `ffmpeg`-based encoder backend.
pub mod ffmpeg;
/// Deterministic backend for tests.
pub mod memory;
/// Recording state machine.
pub mod sink;
