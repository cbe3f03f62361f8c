use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use lyric_video::render::{self, RenderEvent, RenderOptions, RenderParameters, RenderTarget};
use lyric_video::{AnimationCatalog, HwAccel};

#[derive(Parser, Debug)]
#[command(name = "lyric-video", version, about = "Render karaoke-style lyric videos with FFmpeg")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the full video with audio.
    Render(RenderArgs),
    /// Render a single frame as an image.
    Preview(PreviewArgs),
    /// Print the filter graph without running FFmpeg.
    Graph(GraphArgs),
    /// List available animations.
    Animations,
    /// Suggest text colors from cover art.
    Palette(PaletteArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Render parameters JSON.
    #[arg(long)]
    config: PathBuf,

    /// Override the hardware acceleration mode (e.g. "nvidia", "none").
    #[arg(long)]
    hw_accel: Option<String>,

    /// Take text colors from the cover art.
    #[arg(long, default_value_t = false)]
    auto_colors: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Timestamp in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,
}

#[derive(Args, Debug)]
struct GraphArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Compose for a preview at this timestamp instead of a full render.
    #[arg(long)]
    at: Option<f64>,

    /// Audio duration in seconds; probed with ffprobe when omitted.
    #[arg(long)]
    duration: Option<f64>,
}

#[derive(Args, Debug)]
struct PaletteArgs {
    /// Cover image.
    image: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => {
            let target = RenderTarget::Video { output: args.out };
            cmd_render(&args.job, target).await
        }
        Command::Preview(args) => {
            let target = RenderTarget::Preview {
                output: args.out,
                at: args.at,
            };
            cmd_render(&args.job, target).await
        }
        Command::Graph(args) => cmd_graph(args).await,
        Command::Animations => {
            cmd_animations();
            Ok(())
        }
        Command::Palette(args) => cmd_palette(&args.image),
    }
}

fn load_params(job: &JobArgs, target: RenderTarget) -> anyhow::Result<RenderParameters> {
    let text = std::fs::read_to_string(&job.config)
        .with_context(|| format!("read config '{}'", job.config.display()))?;
    let mut params: RenderParameters = serde_json::from_str(&text)
        .with_context(|| format!("parse config '{}'", job.config.display()))?;

    params.target = target;
    if let Some(label) = &job.hw_accel {
        params.hw_accel = HwAccel::from_label(label);
    }
    if job.auto_colors {
        apply_cover_palette(&mut params)?;
    }
    Ok(params)
}

#[cfg(feature = "palette-extract")]
fn apply_cover_palette(params: &mut RenderParameters) -> anyhow::Result<()> {
    let palette = lyric_video::colors::extract_palette(&params.cover, &Default::default())
        .with_context(|| format!("extract palette from '{}'", params.cover.display()))?;
    log::info!(
        "Cover palette: primary {}, secondary {}, outline {}",
        palette.primary,
        palette.secondary,
        palette.outline
    );
    params.style.primary.color = palette.primary;
    params.style.secondary.color = palette.secondary;
    params.style.outline_color = palette.outline;
    Ok(())
}

#[cfg(not(feature = "palette-extract"))]
fn apply_cover_palette(_params: &mut RenderParameters) -> anyhow::Result<()> {
    anyhow::bail!("palette extraction is not available in this build")
}

async fn cmd_render(job: &JobArgs, target: RenderTarget) -> anyhow::Result<()> {
    let params = load_params(job, target)?;
    let catalog = AnimationCatalog::builtin();

    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping ffmpeg");
            let _ = cancel_tx.send(true);
        }
    });

    let options = RenderOptions {
        cancel: Some(cancel_rx),
        ..Default::default()
    };
    let callback: render::EventCallback = Box::new(|event| {
        if let RenderEvent::Progress { percent, eta } = event {
            let eta = eta.map_or_else(String::new, |eta| format!(" (eta {}s)", eta.as_secs()));
            eprint!("\r{percent:>3}%{eta}   ");
            let _ = std::io::stderr().flush();
        }
    });

    let outcome = render::render(&params, &catalog, options, Some(callback)).await?;
    eprintln!();
    eprintln!(
        "wrote {} ({:.1}s of audio in {:.1}s)",
        outcome.output.display(),
        outcome.duration,
        outcome.elapsed.as_secs_f64()
    );
    Ok(())
}

async fn cmd_graph(args: GraphArgs) -> anyhow::Result<()> {
    let target = match args.at {
        Some(at) => RenderTarget::Preview {
            output: PathBuf::from("preview.png"),
            at,
        },
        None => RenderTarget::default(),
    };
    let params = load_params(&args.job, target)?;
    let catalog = AnimationCatalog::builtin();

    let lyrics = render::load_inputs(&params, &catalog)?;
    let duration = match args.duration {
        Some(duration) => duration,
        None => {
            let ffprobe = render::resolve_ffprobe(&params.ffmpeg);
            render::probe_duration(&ffprobe, &params.audio).await?
        }
    };
    let plan = render::plan_render(&params, &catalog, lyrics, duration)?;

    let statements: Vec<String> = plan.graph.statements().iter().map(ToString::to_string).collect();
    println!("{}", statements.join(";\n"));
    Ok(())
}

fn cmd_animations() {
    println!("Backgrounds:");
    for kind in lyric_video::BackgroundKind::all() {
        println!("  {:<16} {}", kind.name(), kind.description());
    }
    println!("Text:");
    for kind in lyric_video::TextKind::all() {
        println!("  {:<16} {}", kind.name(), kind.description());
    }
    println!("Covers:");
    for kind in lyric_video::CoverKind::all() {
        println!("  {:<16} {}", kind.name(), kind.description());
    }
}

#[cfg(feature = "palette-extract")]
fn cmd_palette(image: &Path) -> anyhow::Result<()> {
    let palette = lyric_video::colors::extract_palette(image, &Default::default())
        .with_context(|| format!("extract palette from '{}'", image.display()))?;
    println!("primary   {}", palette.primary);
    println!("secondary {}", palette.secondary);
    println!("outline   {}", palette.outline);
    Ok(())
}

#[cfg(not(feature = "palette-extract"))]
fn cmd_palette(_image: &Path) -> anyhow::Result<()> {
    anyhow::bail!("palette extraction is not available in this build")
}
