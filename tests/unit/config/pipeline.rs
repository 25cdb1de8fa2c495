use super::*;
use crate::config::presets::Preset;

#[test]
fn config_validation_catches_bad_values() {
    let base = Preset::Reel720.config();

    let mut c = base.clone();
    c.canvas.width = 0;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.canvas.width = 721;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.fps.num = 0;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.content_box.max_width = 800;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.corner_radius = f64::NAN;
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.captions.blocks = vec![c.captions.blocks[0]; 3];
    assert!(c.validate().is_err());

    let mut c = base.clone();
    c.captions.line_height = 0.0;
    assert!(c.validate().is_err());

    let mut c = base;
    c.codecs.clear();
    assert!(c.validate().is_ok());
}

#[test]
fn json_round_trip_preserves_config() {
    let cfg = Preset::Reel720TwoLine.config();
    let json = serde_json::to_string_pretty(&cfg).unwrap();
    let back: PipelineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn timing_is_tagged_by_mode() {
    let t: FrameTiming = serde_json::from_str(r#"{ "mode": "seek", "throttle_ms": 5 }"#).unwrap();
    assert_eq!(t, FrameTiming::Seek { throttle_ms: 5 });
    let t: FrameTiming = serde_json::from_str(r#"{ "mode": "refresh" }"#).unwrap();
    assert_eq!(t, FrameTiming::Refresh);
}

#[test]
fn from_json_file_reports_parse_errors_as_validation() {
    let dir = std::path::PathBuf::from("target").join("config_unit");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bad.json");
    std::fs::write(&path, "{ \"canvas\": 3 }").unwrap();
    let err = PipelineConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, ReelError::Validation(_)), "{err}");

    let good = dir.join("good.json");
    std::fs::write(
        &good,
        serde_json::to_string(&Preset::Reel1080.config()).unwrap(),
    )
    .unwrap();
    let cfg = PipelineConfig::from_json_file(&good).unwrap();
    assert_eq!(cfg.canvas.width, 1080);
}
