use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::ReelResult;
use crate::foundation::math::premultiply_rgba8_in_place;

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Build an image from straight-alpha RGBA8 bytes.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> Self {
        premultiply_rgba8_in_place(&mut rgba);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        }
    }

    /// A `width x height` image filled with one straight-alpha color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut bytes = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as usize) * (height as usize) {
            bytes.extend_from_slice(&rgba);
        }
        Self::from_straight_rgba8(width, height, bytes)
    }
}

/// Decode any format supported by `image` into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ReelResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PreparedImage::from_straight_rgba8(
        width,
        height,
        rgba.into_raw(),
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
