//! Per-frame compositing onto the fixed canvas.

/// Layered frame compositor (background, clipped video, watermark, captions).
pub mod compositor;
/// Output frame buffer type.
pub mod frame;
