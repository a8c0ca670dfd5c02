//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use eyre::Result;

#[derive(Debug, Parser)]
#[command(name = "kara")]
#[command(about = "Lyric format conversion and karaoke word-timing tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Attach word-level karaoke timing to a lyric file
    Sync(crate::sync::Args),

    /// Convert a lyric file between formats
    Convert(crate::convert::Args),
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Sync(args) => crate::sync::execute(args.try_into()?),
        Commands::Convert(args) => crate::convert::execute(args.try_into()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncArgs;
    use kara_sync::synth::SyncConfig;

    fn assert_default_sync_args(args: &SyncArgs) {
        let config = SyncConfig::from(*args);
        assert_eq!(config, SyncConfig::DEFAULT);
    }

    #[test]
    fn parses_sync_command() {
        let cli = Cli::parse_from(["kara", "sync", "song.lrc"]);

        match &cli.command {
            Commands::Sync(crate::sync::Args {
                lyrics,
                audio: None,
                output: None,
                sync_args,
                ..
            }) if lyrics.to_str() == Some("song.lrc") => {
                assert_default_sync_args(sync_args);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_sync_with_audio_and_output() {
        let cli = Cli::parse_from([
            "kara", "sync", "song.lrc", "--audio", "song.wav", "-o", "out.lrc",
        ]);

        match &cli.command {
            Commands::Sync(crate::sync::Args {
                lyrics,
                audio: Some(audio),
                output: Some(output),
                ..
            }) if lyrics.to_str() == Some("song.lrc")
                && audio.to_str() == Some("song.wav")
                && output.to_str() == Some("out.lrc") => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_sync_tuning_flags() {
        let cli = Cli::parse_from([
            "kara",
            "sync",
            "song.lrc",
            "--min-peak-ratio",
            "0.25",
            "--line-duration-ms",
            "5000",
        ]);

        match &cli.command {
            Commands::Sync(args) => {
                let config = SyncConfig::from(args.sync_args);
                assert!((config.min_peak_ratio - 0.25).abs() < 0.001);
                assert!((config.fallback_line_ms - 5_000.0).abs() < 0.001);
                assert!((config.degenerate_window_ms - 1_000.0).abs() < 0.001);
            }
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_convert_command() {
        let cli = Cli::parse_from(["kara", "convert", "song.lrc", "--to", "srt"]);

        match &cli.command {
            Commands::Convert(crate::convert::Args {
                input,
                to,
                output: None,
                ..
            }) if input.to_str() == Some("song.lrc") && to == "srt" => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_convert_with_output() {
        let cli = Cli::parse_from([
            "kara", "convert", "song.lrc", "--to", "ass", "-o", "/tmp/out.ass",
        ]);

        match &cli.command {
            Commands::Convert(crate::convert::Args {
                to,
                output: Some(output),
                ..
            }) if to == "ass" && output.to_str() == Some("/tmp/out.ass") => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }
}
