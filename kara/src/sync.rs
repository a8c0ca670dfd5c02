//! Sync subcommand - attach word-level karaoke timing to a lyric file.

use eyre::{Context, Result};
use kara_formats::{GenerateOptions, LyricFormat};
use kara_sync::audio;
use kara_sync::pipeline::{SyncReport, sync_lines, sync_with_audio};
use kara_sync::synth::SyncConfig;
use kara_sync::types::LyricLine;
use std::path::{Path, PathBuf};

/// CLI arguments for timing synthesis.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to input lyric file
    pub lyrics: PathBuf,

    /// WAV file to derive word timing from (omit for uniform timing)
    #[arg(short, long)]
    pub audio: Option<PathBuf>,

    /// Output path (default: input with a .sync.<ext> extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Input format (default: detected from the file extension)
    #[arg(long)]
    pub from: Option<String>,

    /// Output format (default: lrc with word tags)
    #[arg(long)]
    pub to: Option<String>,

    #[command(flatten)]
    pub sync_args: SyncArgs,

    /// Print the synthesis report as JSON to stdout
    #[arg(long)]
    pub stats: bool,

    /// Print the generated output to stdout
    #[arg(long)]
    pub preview: bool,
}

/// Synthesis tuning flags.
#[derive(clap::Args, Clone, Copy, Debug)]
pub struct SyncArgs {
    /// Minimum detected-peak-to-character ratio before uniform fallback
    #[arg(long, default_value_t = SyncConfig::DEFAULT.min_peak_ratio)]
    pub min_peak_ratio: f64,

    /// Assumed duration in ms of a line with no successor
    #[arg(long, default_value_t = SyncConfig::DEFAULT.fallback_line_ms)]
    pub line_duration_ms: f64,

    /// Window length in ms substituted for zero-length line windows
    #[arg(long, default_value_t = SyncConfig::DEFAULT.degenerate_window_ms)]
    pub degenerate_window_ms: f64,
}

impl From<SyncArgs> for SyncConfig {
    fn from(args: SyncArgs) -> Self {
        Self {
            min_peak_ratio: args.min_peak_ratio,
            fallback_line_ms: args.line_duration_ms,
            degenerate_window_ms: args.degenerate_window_ms,
        }
    }
}

/// Resolved configuration for timing synthesis.
#[derive(Debug)]
pub struct Config {
    pub lyrics: PathBuf,
    pub audio: Option<PathBuf>,
    pub output: PathBuf,
    pub from: LyricFormat,
    pub to: LyricFormat,
    pub sync_config: SyncConfig,
    pub stats: bool,
    pub preview: bool,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        let from = resolve_format(args.from.as_deref(), &args.lyrics)?;
        let to = match args.to.as_deref() {
            Some(name) => name.parse()?,
            None => LyricFormat::Lrc,
        };
        let output = args
            .output
            .unwrap_or_else(|| default_output(&args.lyrics, to));

        Ok(Self {
            lyrics: args.lyrics,
            audio: args.audio,
            output,
            from,
            to,
            sync_config: args.sync_args.into(),
            stats: args.stats,
            preview: args.preview,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    tracing::info!(
        input = ?config.lyrics.display(),
        output = ?config.output.display(),
        from = %config.from,
        to = %config.to,
        "synthesizing word timing"
    );

    let text = std::fs::read_to_string(&config.lyrics)
        .wrap_err_with(|| format!("failed to read lyrics: {:?}", config.lyrics.display()))?;

    let mut lines = config.from.parse(&text)?;
    let report = synthesize(&mut lines, config.audio.as_deref(), &config.sync_config);

    let options = GenerateOptions::default();
    let rendered = config.to.generate(&lines, &options)?;

    tracing::info!(path = ?config.output.display(), "write lyric file");

    std::fs::write(&config.output, &rendered)
        .wrap_err_with(|| format!("failed to write output: {:?}", config.output.display()))?;

    if config.stats {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if config.preview {
        print!("{rendered}");
    }

    Ok(())
}

/// Run the pipeline against decoded audio, degrading to uniform timing when
/// the audio is missing or unreadable.
fn synthesize(
    lines: &mut [LyricLine],
    audio_path: Option<&Path>,
    sync_config: &SyncConfig,
) -> SyncReport {
    match audio_path {
        Some(path) => match audio::read_first_channel(path) {
            Ok((samples, sample_rate)) => {
                tracing::info!(samples = samples.len(), sample_rate, "audio decoded");
                sync_with_audio(lines, &samples, sample_rate, sync_config)
            }
            Err(error) => {
                tracing::warn!(%error, "audio decode failed, spreading words uniformly");
                sync_lines(lines, None, sync_config)
            }
        },
        None => sync_lines(lines, None, sync_config),
    }
}

fn resolve_format(name: Option<&str>, path: &Path) -> Result<LyricFormat> {
    match name {
        Some(name) => Ok(name.parse()?),
        None => Ok(LyricFormat::from_path(path)?),
    }
}

fn default_output(input: &Path, to: LyricFormat) -> PathBuf {
    input.with_extension(format!("sync.{}", to.extension()))
}
