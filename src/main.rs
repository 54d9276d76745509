//! Bit-Grid Video CLI
//!
//! Encodes text or files into bit-grid frames and an animated GIF, and
//! decodes them back.

use std::io::Read;
use std::path::PathBuf;

use bitgrid_video::{
    frame::{ConfigError, FileConfig},
    media::{self, FrameSource, MediaError, MetadataError},
    metrics::{CodecMetrics, MetricsError, MetricsSnapshot},
    CodecError, Decoder, Encoder, FramePlan, GifVideo, PngDirectory, Progress,
};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "bitgrid-video", version, about)]
struct Cli {
    /// TOML configuration file with [codec] and [output] tables
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Write Prometheus text metrics to this file
    #[arg(long, global = true, value_name = "FILE")]
    metrics: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a payload into frames, a GIF and a bit-length record
    Encode {
        /// Text to encode
        #[arg(long, conflicts_with = "input")]
        text: Option<String>,

        /// File to encode (stdin when neither --text nor --input is given)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Directory for frame_NNNN.png files
        #[arg(long, value_name = "DIR")]
        frames_dir: Option<PathBuf>,

        /// Output GIF path
        #[arg(long, value_name = "FILE")]
        video: Option<PathBuf>,

        /// Bit-length record path
        #[arg(long, value_name = "FILE")]
        metadata: Option<PathBuf>,

        /// Skip writing PNG frames
        #[arg(long)]
        no_frames: bool,

        /// Skip writing the GIF
        #[arg(long)]
        no_video: bool,
    },

    /// Decode frames back into text
    Decode {
        /// GIF to decode
        #[arg(long, value_name = "FILE", conflicts_with = "frames_dir")]
        video: Option<PathBuf>,

        /// Directory of frame_NNNN.png files to decode
        #[arg(long, value_name = "DIR")]
        frames_dir: Option<PathBuf>,

        /// Bit-length record path
        #[arg(long, value_name = "FILE")]
        metadata: Option<PathBuf>,

        /// Where to write the decoded text
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the frame plan for a payload of BITS bits
    Plan {
        /// Payload length in bits
        bits: usize,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("failed to read payload: {0}")]
    Payload(std::io::Error),
    #[error("failed to write metrics to {path}: {source}")]
    MetricsWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Bit-Grid Video v{}", bitgrid_video::VERSION);

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    if let Some(path) = cli.metrics {
        config.output.metrics_path = Some(path);
    }

    let metrics = CodecMetrics::new()?;

    match cli.command {
        Command::Encode {
            text,
            input,
            frames_dir,
            video,
            metadata,
            no_frames,
            no_video,
        } => {
            let payload = read_payload(text, input)?;
            let output = &mut config.output;
            if let Some(dir) = frames_dir {
                output.frames_dir = dir;
            }
            if let Some(path) = video {
                output.video_path = path;
            }
            if let Some(path) = metadata {
                output.metadata_path = path;
            }
            encode(&config, &payload, !no_frames, !no_video, &metrics)?;
        }
        Command::Decode {
            video,
            frames_dir,
            metadata,
            output,
        } => {
            if let Some(path) = metadata {
                config.output.metadata_path = path;
            }
            if let Some(path) = output {
                config.output.decoded_text_path = path;
            }
            let mut source: Box<dyn FrameSource> = match (video, frames_dir) {
                (Some(path), _) => Box::new(GifVideo::new(path, config.codec.fps)),
                (None, Some(dir)) => Box::new(PngDirectory::new(dir)),
                (None, None) if config.output.video_path.exists() => Box::new(GifVideo::new(
                    config.output.video_path.clone(),
                    config.codec.fps,
                )),
                (None, None) => Box::new(PngDirectory::new(config.output.frames_dir.clone())),
            };
            decode(&config, source.as_mut(), &metrics)?;
        }
        Command::Plan { bits } => {
            let plan = FramePlan::new(bits, &config.codec)?;
            println!(
                "Frame size:      {}x{} pixels",
                plan.frame_width, plan.frame_height
            );
            println!(
                "Grid:            {0}x{0} cells of {1} px",
                plan.grid_size, plan.pixel_block_size
            );
            println!("Bits per frame:  {}", plan.bits_per_frame);
            println!("Frames needed:   {}", plan.frame_count);
            println!("Padding bits:    {}", plan.padding_bits(bits));
            return Ok(());
        }
    }

    if let Some(path) = &config.output.metrics_path {
        std::fs::write(path, metrics.encode()?).map_err(|source| CliError::MetricsWrite {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "Wrote metrics");
    }

    Ok(())
}

fn read_payload(text: Option<String>, input: Option<PathBuf>) -> Result<Vec<u8>, CliError> {
    match (text, input) {
        (Some(text), _) => Ok(text.into_bytes()),
        (None, Some(path)) => std::fs::read(&path).map_err(CliError::Payload),
        (None, None) => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .map_err(CliError::Payload)?;
            Ok(buffer)
        }
    }
}

fn encode(
    config: &FileConfig,
    payload: &[u8],
    write_frames: bool,
    write_video: bool,
    metrics: &CodecMetrics,
) -> Result<(), CliError> {
    let encoder = Encoder::new(config.codec.clone())?;

    let bar = progress_bar("Rendering");
    let on_progress = |p: Progress| advance(&bar, p);
    let mut encoded = encoder.encode_with_progress(payload, Some(&on_progress))?;
    bar.finish_and_clear();

    media::write_metadata(&config.output.metadata_path, encoded.metadata)?;

    if encoded.frames.is_empty() {
        warn!("Payload is empty; only the bit-length record was written");
    } else {
        if write_frames {
            let mut frames = PngDirectory::new(config.output.frames_dir.clone());
            frames.clear()?;
            let written = encoded.write_to(&mut frames)?;
            info!(dir = %frames.dir().display(), written, "Saved frames");
        }
        if write_video {
            let mut video = GifVideo::new(config.output.video_path.clone(), config.codec.fps);
            encoded.write_to(&mut video)?;
        }
    }

    for condition in &encoded.report.conditions {
        warn!("{condition}");
    }
    info!(
        bits = encoded.metadata.bits(),
        frames = encoded.report.frames_rendered,
        "Encoding complete"
    );

    metrics.update(&MetricsSnapshot::from_encode(&encoded.report));
    Ok(())
}

fn decode(
    config: &FileConfig,
    source: &mut dyn FrameSource,
    metrics: &CodecMetrics,
) -> Result<(), CliError> {
    let decoder = Decoder::new(config.codec.clone())?;
    let metadata = media::read_metadata(&config.output.metadata_path);
    if let Err(e) = &metadata {
        warn!("Cannot use bit-length record: {e}");
    }

    let bar = progress_bar("Sampling");
    let on_progress = |p: Progress| advance(&bar, p);
    let decoded = decoder.decode_from(source, metadata, Some(&on_progress))?;
    bar.finish_and_clear();

    media::write_text(&config.output.decoded_text_path, decoded.as_str())?;
    println!("{}", decoded.as_str());

    let report = &decoded.report;
    info!(
        frames = report.frames_supplied,
        sampled = report.frames_sampled,
        skipped = report.frames_skipped(),
        raw_bits = report.raw_bits,
        final_bits = report.final_bits,
        "Decoding complete"
    );
    for condition in &report.conditions {
        warn!("{condition}");
    }

    metrics.update(&MetricsSnapshot::from_decode(report));
    Ok(())
}

fn progress_bar(message: &'static str) -> ProgressBar {
    let style = ProgressStyle::with_template("{msg:>10} [{bar:40}] {pos}/{len} frames")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    ProgressBar::new(0).with_style(style).with_message(message)
}

fn advance(bar: &ProgressBar, progress: Progress) {
    if bar.length() != Some(progress.total as u64) {
        bar.set_length(progress.total as u64);
    }
    bar.inc(1);
}
