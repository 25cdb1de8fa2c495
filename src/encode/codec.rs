use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReelError, ReelResult};

/// Default video bitrate for recorded artifacts, in bits per second.
pub const DEFAULT_VIDEO_BITRATE: u32 = 8_000_000;

/// One codec/container combination the encoder may record with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecOption {
    /// Mime type reported on the finished artifact, e.g. `video/webm; codecs=vp9,opus`.
    pub mime_type: String,
    /// Encoder name for the video stream (an `ffmpeg` encoder such as `libvpx-vp9`).
    pub video_codec: String,
    /// Encoder name for passthrough audio; `None` records video only.
    #[serde(default)]
    pub audio_codec: Option<String>,
    /// Container/muxer name, e.g. `webm`.
    pub container: String,
    /// Target video bitrate in bits per second.
    #[serde(default = "default_bitrate")]
    pub video_bitrate: u32,
}

fn default_bitrate() -> u32 {
    DEFAULT_VIDEO_BITRATE
}

impl CodecOption {
    /// Build an option with the default bitrate.
    pub fn new(
        mime_type: impl Into<String>,
        video_codec: impl Into<String>,
        audio_codec: Option<&str>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            video_codec: video_codec.into(),
            audio_codec: audio_codec.map(str::to_owned),
            container: container.into(),
            video_bitrate: DEFAULT_VIDEO_BITRATE,
        }
    }

    /// Mime type without codec parameters (`video/webm; codecs=vp9` -> `video/webm`).
    pub fn base_mime_type(&self) -> &str {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or(&self.mime_type)
            .trim()
    }
}

/// WebM options in priority order: VP9+Opus, VP8+Opus, then plain WebM.
pub fn default_webm_options() -> Vec<CodecOption> {
    vec![
        CodecOption::new(
            "video/webm; codecs=vp9,opus",
            "libvpx-vp9",
            Some("libopus"),
            "webm",
        ),
        CodecOption::new(
            "video/webm; codecs=vp8,opus",
            "libvpx",
            Some("libopus"),
            "webm",
        ),
        CodecOption::new("video/webm", "libvpx", Some("libvorbis"), "webm"),
    ]
}

/// Support predicate consulted when recording starts.
pub trait CodecSupport {
    /// Return `true` when the encoder backend can record `option`.
    fn is_supported(&self, option: &CodecOption) -> bool;
}

impl<F> CodecSupport for F
where
    F: Fn(&CodecOption) -> bool,
{
    fn is_supported(&self, option: &CodecOption) -> bool {
        self(option)
    }
}

/// Pick the first option `support` accepts.
///
/// Fails with [`ReelError::UnsupportedFormat`] when no option is usable, including when `options`
/// is empty.
pub fn select_codec<'a>(
    options: &'a [CodecOption],
    support: &dyn CodecSupport,
) -> ReelResult<&'a CodecOption> {
    for opt in options {
        if support.is_supported(opt) {
            return Ok(opt);
        }
        tracing::debug!(mime = %opt.mime_type, "codec option not supported");
    }
    Err(ReelError::unsupported_format(
        "No suitable recording format found",
    ))
}

/// Support predicate backed by the encoder list of the local `ffmpeg`.
#[derive(Clone, Debug, Default)]
pub struct FfmpegCodecSupport {
    encoders: BTreeSet<String>,
}

impl FfmpegCodecSupport {
    /// Query `ffmpeg -encoders`.
    ///
    /// A missing `ffmpeg` yields an empty encoder set, so every option is reported unsupported.
    pub fn probe() -> Self {
        let out = std::process::Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .stderr(std::process::Stdio::null())
            .output();
        match out {
            Ok(out) if out.status.success() => {
                Self::from_listing(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(out) => {
                tracing::warn!(status = %out.status, "ffmpeg -encoders failed");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "ffmpeg not runnable; no codecs available");
                Self::default()
            }
        }
    }

    /// Parse the table printed by `ffmpeg -encoders`.
    ///
    /// Rows after the `------` separator read `<flags> <name> <description>`.
    pub fn from_listing(listing: &str) -> Self {
        let encoders = listing
            .lines()
            .skip_while(|l| !l.trim_start().starts_with("---"))
            .skip(1)
            .filter_map(|l| {
                let mut cols = l.split_whitespace();
                let _flags = cols.next()?;
                cols.next().map(str::to_owned)
            })
            .collect();
        Self { encoders }
    }

    /// Return `true` when `name` is a known encoder.
    pub fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }

    /// Number of encoders found.
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    /// Return `true` when no encoder was found.
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

impl CodecSupport for FfmpegCodecSupport {
    fn is_supported(&self, option: &CodecOption) -> bool {
        self.has_encoder(&option.video_codec)
            && option
                .audio_codec
                .as_deref()
                .is_none_or(|a| self.has_encoder(a))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/codec.rs"]
mod tests;
