//! Caption text: greedy word-wrap, block placement, and Parley-backed shaping.

/// Caption block placement on the canvas.
pub mod caption;
pub(crate) mod engine;
/// Greedy word-wrap.
pub mod wrap;
