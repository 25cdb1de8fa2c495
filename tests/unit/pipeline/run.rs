use std::io::Cursor;

use super::*;
use crate::assets::loader::{AssetRef, FsAssetLoader};
use crate::config::presets::Preset;
use crate::encode::codec::CodecOption;
use crate::encode::memory::InMemoryEncoder;
use crate::foundation::core::{Canvas, ContentBox, Fps};
use crate::package::packager::{FnTranscoder, TranscodeTarget};
use crate::source::memory::MemoryVideo;
use crate::source::seek::SeekFrameSource;

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn small_config() -> PipelineConfig {
    let mut cfg = Preset::Reel720.config();
    cfg.canvas = Canvas::new(72, 128);
    cfg.content_box = ContentBox {
        max_width: 60,
        max_height: 92,
    };
    cfg.corner_radius = 4.0;
    cfg.transcode = None;
    cfg
}

fn pipeline(cfg: PipelineConfig, enc: InMemoryEncoder) -> Pipeline {
    Pipeline::new(
        cfg,
        EncoderSink::new(enc, |_: &CodecOption| true),
        OutputPackager::new(FnTranscoder(
            |a: &OutputArtifact, _: &TranscodeTarget| -> ReelResult<OutputArtifact> {
                Ok(a.clone())
            },
        )),
    )
    .unwrap()
}

fn inputs<'a>(source: &'a mut dyn FrameSource, captions: Vec<String>) -> RunInputs<'a> {
    RunInputs {
        source,
        background: AssetRef::memory("bg.png", png(2, 2, [0, 0, 255, 255])),
        watermark: AssetRef::memory("wm.png", png(2, 1, [0, 255, 0, 255])),
        captions,
    }
}

#[test]
fn run_encodes_every_seeked_frame() {
    let enc = InMemoryEncoder::new();
    let log = enc.log();
    let mut p = pipeline(small_config(), enc);
    let mut src = SeekFrameSource::new(
        MemoryVideo::solid(64, 36, Fps::whole(30), 15, [255, 0, 0, 255]),
        Fps::whole(30),
    );

    let mut seen = Vec::new();
    let out = p
        .run(inputs(&mut src, vec!["hi".to_owned()]), &mut |pr| seen.push(pr.percent))
        .unwrap();

    assert_eq!(out.stats.frames_encoded, 15);
    assert_eq!(out.stats.frames_expected, 15);
    assert_eq!(log.lock().unwrap().frames.len(), 15);
    assert_eq!(seen.last(), Some(&100.0));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(out.warnings.is_empty());
    assert_eq!(p.sink_state(), SinkState::Stopped);
}

#[test]
fn too_many_captions_are_rejected_before_recording() {
    let mut p = pipeline(small_config(), InMemoryEncoder::new());
    let mut src = SeekFrameSource::new(
        MemoryVideo::solid(4, 4, Fps::whole(30), 1, [0; 4]),
        Fps::whole(30),
    );
    let err = p
        .run(
            inputs(&mut src, vec!["a".into(), "b".into(), "c".into()]),
            &mut |_| {},
        )
        .unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)));
    assert_eq!(p.sink_state(), SinkState::Idle);
}

#[test]
fn missing_asset_is_a_load_error_before_recording() {
    let mut p = pipeline(small_config(), InMemoryEncoder::new())
        .with_loader(FsAssetLoader::new("target/definitely-missing"));
    let mut src = SeekFrameSource::new(
        MemoryVideo::solid(4, 4, Fps::whole(30), 1, [0; 4]),
        Fps::whole(30),
    );
    let mut run_inputs = inputs(&mut src, vec![]);
    run_inputs.background = AssetRef::path("bg.png");
    let err = p.run(run_inputs, &mut |_| {}).unwrap_err();
    assert!(matches!(err, ReelError::Load(_)), "{err}");
    assert_eq!(p.sink_state(), SinkState::Idle);
}

#[test]
fn encoder_failure_mid_stream_yields_no_artifact() {
    let mut p = pipeline(small_config(), InMemoryEncoder::new().failing_at(3));
    let mut src = SeekFrameSource::new(
        MemoryVideo::solid(8, 8, Fps::whole(30), 10, [9, 9, 9, 255]),
        Fps::whole(30),
    );
    let err = p.run(inputs(&mut src, vec![]), &mut |_| {}).unwrap_err();
    assert!(matches!(err, ReelError::MidStreamEncoding(_)));
    assert_eq!(p.sink_state(), SinkState::Stopped);
}

#[test]
fn composite_at_renders_a_single_frame() {
    let cfg = small_config();
    let request = RenderRequest {
        source: PathBuf::from("unused.mp4"),
        background: AssetRef::memory("bg.png", png(2, 2, [0, 0, 255, 255])),
        watermark: AssetRef::memory("wm.png", png(2, 1, [0, 255, 0, 255])),
        typeface: Some(AssetRef::path("no/such/font.ttf")),
        captions: vec![],
        assets_root: PathBuf::from("."),
    };
    let mut video = MemoryVideo::solid(64, 36, Fps::whole(30), 3, [255, 0, 0, 255]);
    let frame = composite_at(&cfg, &request, &mut video, 0.05).unwrap();
    assert_eq!((frame.width, frame.height), (72, 128));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(36, 55), Some([255, 0, 0, 255]));

    assert!(composite_at(&cfg, &request, &mut video, 5.0).is_err());
}
