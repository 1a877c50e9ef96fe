use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use raven_transition::{TransitionConfig, TransitionSession, VirtualHost};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "raven", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame of the transition as a PNG.
    Frame(FrameArgs),
    /// Record the full transition as WebM (requires `ffmpeg` on PATH).
    Record(RecordArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Source image (shown at the start).
    #[arg(long)]
    from: PathBuf,

    /// Destination image (revealed by the flock).
    #[arg(long)]
    to: PathBuf,

    /// Transition config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Flock seed, overriding the config.
    #[arg(long)]
    seed: Option<u64>,

    /// Transition length in milliseconds, overriding the config.
    #[arg(long)]
    duration_ms: Option<f64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Normalized time in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    t: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output path; defaults to the artifact's suggested file name.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Record(args) => cmd_record(args),
    }
}

fn init_tracing(verbosity: u8) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::from_default_env().add_directive(
        format!("raven_transition={level}")
            .parse()
            .context("build log filter")?,
    );
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn open_session(input: &InputArgs) -> anyhow::Result<TransitionSession<VirtualHost>> {
    let mut config = match input.config.as_ref() {
        Some(path) => TransitionConfig::from_path(path)?,
        None => TransitionConfig::default(),
    };
    if input.seed.is_some() {
        config.seed = input.seed;
    }
    if let Some(ms) = input.duration_ms {
        config.duration_ms = ms;
    }

    let a = raven_transition::load_image(&input.from)
        .with_context(|| format!("load source image '{}'", input.from.display()))?;
    let b = raven_transition::load_image(&input.to)
        .with_context(|| format!("load destination image '{}'", input.to.display()))?;

    let mut sess = TransitionSession::new(config, VirtualHost::default())?;
    sess.set_images(Some(a), Some(b))?;
    Ok(sess)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut sess = open_session(&args.input)?;
    sess.render_at(args.t)?;
    sess.frame().save_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let mut sess = open_session(&args.input)?;
    let artifact = raven_transition::render_to_artifact(&mut sess)?;
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(artifact.suggested_file_name()));
    artifact.write_to(&out)?;
    eprintln!(
        "wrote {} ({} bytes, {})",
        out.display(),
        artifact.len(),
        artifact.media_type()
    );
    Ok(())
}
