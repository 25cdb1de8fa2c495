//! Asset loading: image decode to premultiplied RGBA8, reference resolution, typefaces.

/// Image decoding.
pub mod decode;
/// Asset references, loaders and typeface providers.
pub mod loader;
