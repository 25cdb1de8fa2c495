use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reelcast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a reel video (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Composite a single frame as a PNG.
    Frame(FrameArgs),
    /// List the stock layouts.
    Presets,
    /// Report which recording formats the local `ffmpeg` can produce.
    Codecs,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Source video.
    #[arg(long)]
    source: PathBuf,

    /// Background image, stretched to the canvas.
    #[arg(long)]
    background: PathBuf,

    /// Watermark image.
    #[arg(long)]
    watermark: PathBuf,

    /// Caption typeface (TTF/OTF). The system default family is used when omitted.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Caption text; repeat once per caption block.
    #[arg(long = "caption")]
    captions: Vec<String>,

    /// Stock layout.
    #[arg(long, default_value_t = reelcast::Preset::default())]
    preset: reelcast::Preset,

    /// Pipeline config JSON; replaces the preset when given.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Frame scheduling strategy; overrides the config.
    #[arg(long, value_enum)]
    timing: Option<TimingChoice>,

    /// Delay between seek steps, in milliseconds.
    #[arg(long, default_value_t = 0)]
    throttle_ms: u64,

    /// Deliver the recorded artifact without the secondary transcode.
    #[arg(long)]
    no_transcode: bool,

    /// Output file, or a directory to write `reel.<ext>` into.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Source timestamp in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TimingChoice {
    Refresh,
    Seek,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Presets => cmd_presets(),
        Command::Codecs => cmd_codecs(),
    }
}

fn load_config(args: &LayoutArgs) -> anyhow::Result<reelcast::PipelineConfig> {
    let config = match &args.config {
        Some(path) => reelcast::PipelineConfig::from_json_file(path)?,
        None => args.preset.config(),
    };
    config.validate()?;
    Ok(config)
}

fn make_request(args: &LayoutArgs) -> reelcast::RenderRequest {
    reelcast::RenderRequest {
        source: args.source.clone(),
        background: reelcast::AssetRef::path(&args.background),
        watermark: reelcast::AssetRef::path(&args.watermark),
        typeface: args.font.as_ref().map(reelcast::AssetRef::path),
        captions: args.captions.clone(),
        assets_root: PathBuf::from("."),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.layout)?;
    match args.timing {
        Some(TimingChoice::Refresh) => config.timing = reelcast::FrameTiming::Refresh,
        Some(TimingChoice::Seek) => {
            config.timing = reelcast::FrameTiming::Seek {
                throttle_ms: args.throttle_ms,
            }
        }
        None => {}
    }
    if args.no_transcode {
        config.transcode = None;
    }

    let request = make_request(&args.layout);
    let mut last_percent = -1i64;
    let out = reelcast::render_reel(config, &request, &mut |p: reelcast::Progress| {
        let whole = p.percent.floor() as i64;
        if whole != last_percent {
            last_percent = whole;
            eprint!("\rprocessing {whole:>3}%");
        }
    })?;
    eprintln!();

    for w in &out.warnings {
        eprintln!("warning: {w}");
    }

    let out_path = resolve_out_path(&args.out, out.artifact.extension());
    reelcast::encode::ffmpeg::ensure_parent_dir(&out_path)?;
    std::fs::write(&out_path, &out.artifact.bytes)
        .with_context(|| format!("write output '{}'", out_path.display()))?;

    eprintln!(
        "wrote {} ({}, {} frames)",
        out_path.display(),
        out.artifact.mime_type,
        out.stats.frames_encoded
    );
    Ok(())
}

fn resolve_out_path(out: &Path, ext: &str) -> PathBuf {
    if out.is_dir() {
        out.join(format!("reel.{ext}"))
    } else {
        out.to_path_buf()
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = load_config(&args.layout)?;
    let request = make_request(&args.layout);
    let frame = reelcast::render_still(&config, &request, args.time)?;

    reelcast::encode::ffmpeg::ensure_parent_dir(&args.out)?;

    let rgba = unpremultiply(&frame.data);
    image::save_buffer_with_format(
        &args.out,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn unpremultiply(premul: &[u8]) -> Vec<u8> {
    let mut out = premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

fn cmd_presets() -> anyhow::Result<()> {
    for preset in reelcast::Preset::ALL {
        let cfg = preset.config();
        println!(
            "{:<20} {}x{} box {}x{} @ {} fps, {} caption block(s)",
            preset.name(),
            cfg.canvas.width,
            cfg.canvas.height,
            cfg.content_box.max_width,
            cfg.content_box.max_height,
            cfg.fps.as_f64(),
            cfg.captions.blocks.len()
        );
    }
    Ok(())
}

fn cmd_codecs() -> anyhow::Result<()> {
    use reelcast::CodecSupport as _;

    let support = reelcast::FfmpegCodecSupport::probe();
    if support.is_empty() {
        eprintln!("ffmpeg not found or reported no encoders");
    }
    for opt in reelcast::encode::codec::default_webm_options() {
        let mark = if support.is_supported(&opt) { "yes" } else { "no" };
        println!("{:<4} {}", mark, opt.mime_type);
    }
    Ok(())
}
