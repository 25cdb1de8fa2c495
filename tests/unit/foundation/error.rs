use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(ReelError::load("x").to_string().contains("load error:"));
    assert!(
        ReelError::unsupported_format("x")
            .to_string()
            .contains("unsupported format:")
    );
    assert!(
        ReelError::mid_stream("x")
            .to_string()
            .contains("mid-stream encoding error:")
    );
    assert!(
        ReelError::transcode("x")
            .to_string()
            .contains("transcode error:")
    );
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReelError::decode("x").to_string().contains("decode error:"));
    assert!(ReelError::busy("x").to_string().contains("pipeline busy:"));
}

#[test]
fn only_transcode_is_recoverable() {
    assert!(!ReelError::transcode("x").is_fatal());
    assert!(ReelError::load("x").is_fatal());
    assert!(ReelError::unsupported_format("x").is_fatal());
    assert!(ReelError::mid_stream("x").is_fatal());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
