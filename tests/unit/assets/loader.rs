use std::io::Cursor;

use super::*;

fn png_bytes(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn memory_refs_decode_without_io() {
    let loader = FsAssetLoader::default();
    let img = loader
        .load_image(&AssetRef::memory("wm", png_bytes([255, 0, 0, 255])))
        .unwrap();
    assert_eq!((img.width, img.height), (2, 2));
    assert_eq!(&img.rgba8_premul[0..4], &[255, 0, 0, 255]);
}

#[test]
fn missing_file_is_a_load_error() {
    let loader = FsAssetLoader::new("target/does-not-exist");
    let err = loader
        .load_image(&AssetRef::path("background.jpg"))
        .unwrap_err();
    assert!(matches!(err, ReelError::Load(_)), "{err}");
}

#[test]
fn undecodable_bytes_are_a_load_error() {
    let loader = FsAssetLoader::default();
    let err = loader
        .load_image(&AssetRef::memory("junk", b"junk".to_vec()))
        .unwrap_err();
    assert!(matches!(err, ReelError::Load(_)), "{err}");
}

#[test]
fn traversal_is_rejected_as_load_error() {
    let loader = FsAssetLoader::new(".");
    let err = loader.load_bytes(&AssetRef::path("../secret")).unwrap_err();
    assert!(matches!(err, ReelError::Load(_)), "{err}");
}

#[test]
fn typeface_falls_back_silently() {
    let provider = LoaderTypeface::new(
        FsAssetLoader::new("target/does-not-exist"),
        AssetRef::path("LamaRounded-SemiBold.ttf"),
    );
    assert!(provider.resolve_typeface().is_none());
    assert!(DefaultTypeface.resolve_typeface().is_none());

    let provider = LoaderTypeface::new(
        FsAssetLoader::default(),
        AssetRef::memory("font", vec![1, 2, 3]),
    );
    assert_eq!(provider.resolve_typeface(), Some(vec![1, 2, 3]));
}

#[test]
fn loader_reports_its_root() {
    assert_eq!(
        FsAssetLoader::new("media/assets").root(),
        std::path::Path::new("media/assets")
    );
    assert_eq!(FsAssetLoader::default().root(), std::path::Path::new("."));
}
