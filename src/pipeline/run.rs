use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::assets::decode::PreparedImage;
use crate::assets::loader::{
    AssetLoader, AssetRef, DefaultTypeface, FontProvider, FsAssetLoader, LoaderTypeface,
};
use crate::config::pipeline::{MAX_CAPTION_BLOCKS, PipelineConfig};
use crate::encode::codec::FfmpegCodecSupport;
use crate::encode::ffmpeg::FfmpegEncoder;
use crate::encode::sink::{EncodeSettings, EncoderSink, OutputArtifact, SinkState};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::fit::LayoutRect;
use crate::package::packager::{FfmpegTranscoder, OutputPackager, PackageWarning};
use crate::progress::tracker::{Progress, ProgressTracker};
use crate::render::compositor::Compositor;
use crate::render::frame::FrameRGBA;
use crate::source::ffmpeg::FfmpegDecoder;
use crate::source::open_file_source;
use crate::source::stream::{FrameSource, SeekDecoder};

/// Per-run inputs.
pub struct RunInputs<'a> {
    /// Opened source; the run pulls frames until it is exhausted.
    pub source: &'a mut dyn FrameSource,
    /// Background image, stretched to the canvas.
    pub background: AssetRef,
    /// Watermark image.
    pub watermark: AssetRef,
    /// Caption texts, one per configured block (at most two).
    pub captions: Vec<String>,
}

/// Counters collected during a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunStats {
    /// Frames the progress estimate expected.
    pub frames_expected: u64,
    /// Frames composited and encoded.
    pub frames_encoded: u64,
    /// Placement of the video for the last source resolution seen.
    pub layout: Option<LayoutRect>,
    /// Size of the recorded (pre-packaging) artifact.
    pub recorded_bytes: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Result of a successful run.
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// The delivered artifact.
    pub artifact: OutputArtifact,
    /// Non-fatal packaging issues.
    pub warnings: Vec<PackageWarning>,
    /// Run counters.
    pub stats: RunStats,
}

/// One configured reel pipeline.
///
/// Owns the encoder sink, so at most one recording can be in flight per pipeline; the sink's
/// state replaces any external "processing" flag.
pub struct Pipeline {
    config: PipelineConfig,
    loader: Box<dyn AssetLoader>,
    fonts: Box<dyn FontProvider>,
    sink: EncoderSink,
    packager: OutputPackager,
}

impl Pipeline {
    /// Validate `config` and assemble a pipeline.
    ///
    /// Assets resolve through an [`FsAssetLoader`] rooted at `.` and captions use the default
    /// family until overridden.
    pub fn new(
        config: PipelineConfig,
        sink: EncoderSink,
        packager: OutputPackager,
    ) -> ReelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            loader: Box::new(FsAssetLoader::default()),
            fonts: Box::new(DefaultTypeface),
            sink,
            packager,
        })
    }

    /// Resolve image assets with `loader`.
    pub fn with_loader(mut self, loader: impl AssetLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Resolve the caption typeface with `fonts`.
    pub fn with_fonts(mut self, fonts: impl FontProvider + 'static) -> Self {
        self.fonts = Box::new(fonts);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Current encoder sink state.
    pub fn sink_state(&self) -> SinkState {
        self.sink.state()
    }

    /// Run the full pipeline: load assets, select a codec, composite and encode every frame the
    /// source yields, then package the artifact.
    ///
    /// Fatal errors abort the recording and return no artifact. A failed transcode is reported in
    /// [`RunOutput::warnings`] instead.
    #[tracing::instrument(skip_all, fields(canvas_w = self.config.canvas.width, canvas_h = self.config.canvas.height))]
    pub fn run(
        &mut self,
        inputs: RunInputs<'_>,
        on_progress: &mut dyn FnMut(Progress),
    ) -> ReelResult<RunOutput> {
        let started = Instant::now();
        if self.sink.state() == SinkState::Recording {
            return Err(ReelError::busy("a recording is already in progress"));
        }
        if inputs.captions.len() > MAX_CAPTION_BLOCKS {
            return Err(ReelError::validation(format!(
                "at most {MAX_CAPTION_BLOCKS} captions are supported, got {}",
                inputs.captions.len()
            )));
        }

        let (background, watermark) = self.load_images(&inputs.background, &inputs.watermark)?;
        let typeface = self.fonts.resolve_typeface();
        let mut compositor =
            Compositor::new(&self.config, &background, &watermark, typeface.as_deref())?;
        compositor.set_captions(&inputs.captions)?;

        let source = inputs.source;
        let info = source.info().clone();
        let settings = EncodeSettings {
            canvas: self.config.canvas,
            fps: self.config.fps,
            audio_source: if info.has_audio { info.path.clone() } else { None },
            flatten_bg: self.config.flatten_bg,
        };
        let codec = self.sink.start(&self.config.codecs, &settings)?;
        tracing::info!(
            mime = %codec.mime_type,
            source_width = info.width,
            source_height = info.height,
            duration = info.duration_secs,
            family = %compositor.caption_family(),
            "run started"
        );

        let mut tracker = ProgressTracker::new(info.duration_secs, self.config.fps);
        let mut encoded = 0u64;
        if let Err(e) = self.record(source, &mut compositor, &mut tracker, &mut encoded, on_progress)
        {
            self.sink.abort();
            tracing::warn!(error = %e, frames = encoded, "run aborted");
            return Err(e);
        }

        let recorded = self.sink.finish()?;
        on_progress(tracker.complete());
        let recorded_bytes = recorded.bytes.len();

        let (artifact, warning) = self
            .packager
            .package(recorded, self.config.transcode.as_ref());
        let stats = RunStats {
            frames_expected: tracker.snapshot().expected,
            frames_encoded: encoded,
            layout: compositor.layout(),
            recorded_bytes,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            frames = stats.frames_encoded,
            expected = stats.frames_expected,
            bytes = artifact.bytes.len(),
            mime = %artifact.mime_type,
            "run finished"
        );
        Ok(RunOutput {
            artifact,
            warnings: warning.into_iter().collect(),
            stats,
        })
    }

    fn load_images(
        &self,
        background: &AssetRef,
        watermark: &AssetRef,
    ) -> ReelResult<(PreparedImage, PreparedImage)> {
        let bg = self.loader.load_image(background)?;
        let wm = self.loader.load_image(watermark)?;
        Ok((bg, wm))
    }

    fn record(
        &mut self,
        source: &mut dyn FrameSource,
        compositor: &mut Compositor,
        tracker: &mut ProgressTracker,
        encoded: &mut u64,
        on_progress: &mut dyn FnMut(Progress),
    ) -> ReelResult<()> {
        while let Some(frame) = source.next_frame()? {
            let idx = FrameIndex(*encoded);
            let out = compositor.render(&frame)?;
            self.sink.push_frame(idx, out)?;
            *encoded += 1;
            let p = tracker.advance();
            tracing::debug!(frame = idx.0, time = frame.time_sec, percent = p.percent, "frame encoded");
            on_progress(p);
        }
        Ok(())
    }
}

/// Everything a file-to-file render needs besides the config.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// Source video file.
    pub source: PathBuf,
    /// Background image.
    pub background: AssetRef,
    /// Watermark image.
    pub watermark: AssetRef,
    /// Optional caption typeface; the default family is used when absent or unloadable.
    pub typeface: Option<AssetRef>,
    /// Caption texts, one per configured block.
    pub captions: Vec<String>,
    /// Root for relative asset paths.
    pub assets_root: PathBuf,
}

/// Render `request` with the `ffmpeg`-backed decoder, encoder and transcoder.
pub fn render_reel(
    config: PipelineConfig,
    request: &RenderRequest,
    on_progress: &mut dyn FnMut(Progress),
) -> ReelResult<RunOutput> {
    config.validate()?;
    let mut source = open_file_source(&request.source, config.timing, config.fps)?;
    let sink = EncoderSink::new(FfmpegEncoder::new(), FfmpegCodecSupport::probe());
    let packager = OutputPackager::new(FfmpegTranscoder::new());

    let loader = FsAssetLoader::new(&request.assets_root);
    let mut pipeline = Pipeline::new(config, sink, packager)?.with_loader(loader.clone());
    if let Some(face) = request.typeface.clone() {
        pipeline = pipeline.with_fonts(LoaderTypeface::new(loader, face));
    }

    pipeline.run(
        RunInputs {
            source: source.as_mut(),
            background: request.background.clone(),
            watermark: request.watermark.clone(),
            captions: request.captions.clone(),
        },
        on_progress,
    )
}

/// Composite a single frame at `time_sec` without encoding anything.
pub fn render_still(
    config: &PipelineConfig,
    request: &RenderRequest,
    time_sec: f64,
) -> ReelResult<FrameRGBA> {
    config.validate()?;
    let mut decoder = FfmpegDecoder::open(&request.source)?;
    composite_at(config, request, &mut decoder, time_sec)
}

/// Composite the frame `decoder` shows at `time_sec`.
pub fn composite_at(
    config: &PipelineConfig,
    request: &RenderRequest,
    decoder: &mut dyn SeekDecoder,
    time_sec: f64,
) -> ReelResult<FrameRGBA> {
    let loader = FsAssetLoader::new(&request.assets_root);
    let background = loader.load_image(&request.background)?;
    let watermark = loader.load_image(&request.watermark)?;
    let typeface = request
        .typeface
        .clone()
        .and_then(|face| LoaderTypeface::new(loader.clone(), face).resolve_typeface());

    let frame = decoder.decode_at(time_sec)?.ok_or_else(|| {
        ReelError::validation(format!(
            "time {time_sec:.3}s is past the end of the source ({:.3}s)",
            decoder.info().duration_secs
        ))
    })?;
    let mut compositor = Compositor::new(config, &background, &watermark, typeface.as_deref())?;
    compositor.set_captions(&request.captions)?;
    Ok(compositor.render(&frame)?.clone())
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
