use super::*;

const LISTING: &str = "\
Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libvpx               libvpx VP8 (codec vp8)
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC (codec h264)
 A....D aac                  AAC (Advanced Audio Coding)
 A....D libopus              libopus Opus (codec opus)
";

#[test]
fn selection_returns_first_supported_option() {
    let opts = default_webm_options();
    let only_vp8 = |o: &CodecOption| o.video_codec == "libvpx";
    let picked = select_codec(&opts, &only_vp8).unwrap();
    assert_eq!(picked.mime_type, "video/webm; codecs=vp8,opus");
}

#[test]
fn selection_prefers_priority_order() {
    let opts = default_webm_options();
    let all = |_: &CodecOption| true;
    assert_eq!(select_codec(&opts, &all).unwrap(), &opts[0]);
}

#[test]
fn nothing_supported_is_unsupported_format() {
    let opts = default_webm_options();
    let none = |_: &CodecOption| false;
    let err = select_codec(&opts, &none).unwrap_err();
    assert!(matches!(err, ReelError::UnsupportedFormat(_)));

    let err = select_codec(&[], &|_: &CodecOption| true).unwrap_err();
    assert!(matches!(err, ReelError::UnsupportedFormat(_)));
}

#[test]
fn encoder_listing_is_parsed_after_separator() {
    let sup = FfmpegCodecSupport::from_listing(LISTING);
    assert_eq!(sup.len(), 4);
    assert!(sup.has_encoder("libx264"));
    assert!(sup.has_encoder("libopus"));
    assert!(!sup.has_encoder("Video"));
    assert!(!sup.has_encoder("="));
}

#[test]
fn ffmpeg_support_requires_video_and_audio_encoders() {
    let sup = FfmpegCodecSupport::from_listing(LISTING);
    let opts = default_webm_options();
    assert!(!sup.is_supported(&opts[0]), "no libvpx-vp9 in listing");
    assert!(sup.is_supported(&opts[1]));
    assert!(!sup.is_supported(&opts[2]), "no libvorbis in listing");

    let video_only = CodecOption::new("video/webm", "libvpx", None, "webm");
    assert!(sup.is_supported(&video_only));
}

#[test]
fn base_mime_type_strips_codec_parameters() {
    let opts = default_webm_options();
    assert_eq!(opts[0].base_mime_type(), "video/webm");
    assert_eq!(opts[2].base_mime_type(), "video/webm");
}
