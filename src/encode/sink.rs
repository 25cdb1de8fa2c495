use std::path::PathBuf;

use crate::encode::codec::{CodecOption, CodecSupport, select_codec};
use crate::foundation::color::Rgba8;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::FrameRGBA;

/// Settings handed to a [`FrameEncoder`] when recording starts.
#[derive(Clone, Debug)]
pub struct EncodeSettings {
    /// Output frame size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Source file whose audio track is muxed through unchanged, when it has one.
    pub audio_source: Option<PathBuf>,
    /// Color transparent pixels are flattened over.
    pub flatten_bg: Rgba8,
}

/// Encoder backend contract.
///
/// Ordering contract: `push_frame` is called with strictly increasing [`FrameIndex`] values between
/// one `begin` and the matching `end`. Each call returns whatever compressed bytes the backend has
/// produced so far; an empty vector means "nothing new yet".
pub trait FrameEncoder: Send {
    /// Start a recording with the selected codec.
    fn begin(&mut self, settings: &EncodeSettings, codec: &CodecOption) -> ReelResult<()>;
    /// Encode one composited frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<Vec<Vec<u8>>>;
    /// Flush and finalize, returning the remaining bytes.
    fn end(&mut self) -> ReelResult<Vec<Vec<u8>>>;
    /// Tear down after a failure; any buffered output is discarded.
    fn abort(&mut self);
}

/// Lifecycle of an [`EncoderSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkState {
    /// No recording has started.
    Idle,
    /// Frames are being accepted.
    Recording,
    /// The last recording finished or was aborted.
    Stopped,
}

/// Opaque fragment of the compressed bitstream, in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Arrival sequence number, starting at 0 for each recording.
    pub seq: u64,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

/// Final deliverable of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputArtifact {
    /// Encoded file contents.
    pub bytes: Vec<u8>,
    /// Mime type of `bytes`.
    pub mime_type: String,
}

impl OutputArtifact {
    /// File extension matching the mime type.
    pub fn extension(&self) -> &'static str {
        let base = self.mime_type.split(';').next().unwrap_or("").trim();
        match base {
            "video/webm" => "webm",
            "video/mp4" => "mp4",
            "video/x-matroska" => "mkv",
            "video/quicktime" => "mov",
            _ => "bin",
        }
    }
}

/// Recording state machine around a [`FrameEncoder`].
///
/// `Idle -> Recording -> Stopped`. A failure inside the backend while recording aborts it, drops
/// every buffered chunk and surfaces [`ReelError::MidStreamEncoding`]; no partial artifact is ever
/// produced.
pub struct EncoderSink {
    encoder: Box<dyn FrameEncoder>,
    support: Box<dyn CodecSupport + Send>,
    state: SinkState,
    codec: Option<CodecOption>,
    chunks: Vec<EncodedChunk>,
    next_seq: u64,
    last_idx: Option<FrameIndex>,
}

impl EncoderSink {
    /// Wrap an encoder backend and the predicate used to pick its codec.
    pub fn new(
        encoder: impl FrameEncoder + 'static,
        support: impl CodecSupport + Send + 'static,
    ) -> Self {
        Self {
            encoder: Box::new(encoder),
            support: Box::new(support),
            state: SinkState::Idle,
            codec: None,
            chunks: Vec::new(),
            next_seq: 0,
            last_idx: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SinkState {
        self.state
    }

    /// Codec chosen for the current or last recording.
    pub fn codec(&self) -> Option<&CodecOption> {
        self.codec.as_ref()
    }

    /// Chunks collected so far in the current recording.
    pub fn chunks(&self) -> &[EncodedChunk] {
        &self.chunks
    }

    /// Total bytes collected so far in the current recording.
    pub fn bytes_buffered(&self) -> usize {
        self.chunks.iter().map(|c| c.bytes.len()).sum()
    }

    /// Select a codec and begin recording.
    ///
    /// On [`ReelError::UnsupportedFormat`] the state is left untouched and no bytes exist.
    pub fn start(
        &mut self,
        options: &[CodecOption],
        settings: &EncodeSettings,
    ) -> ReelResult<CodecOption> {
        if self.state == SinkState::Recording {
            return Err(ReelError::busy("encoder sink is already recording"));
        }
        let codec = select_codec(options, self.support.as_ref())?.clone();

        self.chunks.clear();
        self.next_seq = 0;
        self.last_idx = None;
        self.encoder.begin(settings, &codec)?;

        tracing::info!(mime = %codec.mime_type, video = %codec.video_codec, "recording started");
        self.codec = Some(codec.clone());
        self.state = SinkState::Recording;
        Ok(codec)
    }

    /// Append one composited frame.
    ///
    /// Frames must arrive in strictly increasing index order; an out-of-order frame is rejected
    /// with [`ReelError::Validation`] and the recording continues.
    pub fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        if self.state != SinkState::Recording {
            return Err(ReelError::validation("encoder sink is not recording"));
        }
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(ReelError::validation(format!(
                "out-of-order frame {} after {}",
                idx.0, last.0
            )));
        }

        match self.encoder.push_frame(idx, frame) {
            Ok(chunks) => {
                self.last_idx = Some(idx);
                self.collect(chunks);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Finalize the recording and seal the collected chunks into one artifact.
    pub fn finish(&mut self) -> ReelResult<OutputArtifact> {
        if self.state != SinkState::Recording {
            return Err(ReelError::validation("encoder sink is not recording"));
        }
        let tail = match self.encoder.end() {
            Ok(tail) => tail,
            Err(e) => return Err(self.fail(e)),
        };
        self.collect(tail);
        self.state = SinkState::Stopped;

        let mime_type = self
            .codec
            .as_ref()
            .map(|c| c.mime_type.clone())
            .unwrap_or_default();
        let mut bytes = Vec::with_capacity(self.bytes_buffered());
        for chunk in self.chunks.drain(..) {
            bytes.extend_from_slice(&chunk.bytes);
        }
        tracing::info!(bytes = bytes.len(), mime = %mime_type, "recording finished");
        Ok(OutputArtifact { bytes, mime_type })
    }

    /// Stop without producing an artifact.
    pub fn abort(&mut self) {
        if self.state == SinkState::Recording {
            self.encoder.abort();
            self.chunks.clear();
            self.state = SinkState::Stopped;
        }
    }

    fn collect(&mut self, chunks: Vec<Vec<u8>>) {
        for bytes in chunks.into_iter().filter(|b| !b.is_empty()) {
            self.chunks.push(EncodedChunk {
                seq: self.next_seq,
                bytes,
            });
            self.next_seq += 1;
        }
    }

    fn fail(&mut self, err: ReelError) -> ReelError {
        self.abort();
        match err {
            ReelError::MidStreamEncoding(_) => err,
            other => ReelError::mid_stream(other.to_string()),
        }
    }
}

impl Drop for EncoderSink {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
