/// Convenience result type used across reelcast.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// `Load`, `UnsupportedFormat` and `MidStreamEncoding` are fatal for a run. `Transcode` is
/// recoverable: the output packager turns it into a [`crate::PackageWarning`].
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// An asset (image, font, source video) is unreachable or cannot be decoded.
    #[error("load error: {0}")]
    Load(String),

    /// None of the configured codec/container options is usable.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The encoder failed after recording started; the run produced no artifact.
    #[error("mid-stream encoding error: {0}")]
    MidStreamEncoding(String),

    /// Secondary transcode of a finished artifact failed.
    #[error("transcode error: {0}")]
    Transcode(String),

    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while probing or decoding the source video.
    #[error("decode error: {0}")]
    Decode(String),

    /// A run was requested while the encoder sink is still recording.
    #[error("pipeline busy: {0}")]
    Busy(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`ReelError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`ReelError::MidStreamEncoding`] value.
    pub fn mid_stream(msg: impl Into<String>) -> Self {
        Self::MidStreamEncoding(msg.into())
    }

    /// Build a [`ReelError::Transcode`] value.
    pub fn transcode(msg: impl Into<String>) -> Self {
        Self::Transcode(msg.into())
    }

    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ReelError::Busy`] value.
    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    /// Return `true` for errors that abort a run without producing an artifact.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Transcode(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
