//! Convert subcommand - translate a lyric file between formats.

use color_eyre::Section;
use eyre::{Context, Result, eyre};
use kara_formats::{GenerateOptions, LyricFormat};
use std::path::PathBuf;

/// CLI arguments for format conversion.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to input lyric file
    pub input: PathBuf,

    /// Target format (lrc, srt, ass, txt)
    #[arg(long)]
    pub to: String,

    /// Output path (default: input with the target extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Input format (default: detected from the file extension)
    #[arg(long)]
    pub from: Option<String>,

    /// Drop word-level timing tags from the output
    #[arg(long)]
    pub no_word_timing: bool,

    /// Drop translated text from the output
    #[arg(long)]
    pub no_translations: bool,

    /// Print the converted output to stdout
    #[arg(long)]
    pub preview: bool,
}

/// Resolved configuration for format conversion.
#[derive(Debug)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub from: LyricFormat,
    pub to: LyricFormat,
    pub options: GenerateOptions,
    pub preview: bool,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        let from = match args.from.as_deref() {
            Some(name) => name.parse()?,
            None => LyricFormat::from_path(&args.input)?,
        };
        let to: LyricFormat = args.to.parse()?;

        let output = args
            .output
            .unwrap_or_else(|| args.input.with_extension(to.extension()));

        if output == args.input {
            return Err(eyre!(
                "conversion would overwrite the input file: {:?}",
                args.input.display()
            )
            .suggestion("pass -o with a different output path"));
        }

        Ok(Self {
            input: args.input,
            output,
            from,
            to,
            options: GenerateOptions {
                word_timing: !args.no_word_timing,
                translations: !args.no_translations,
            },
            preview: args.preview,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    tracing::info!(
        input = ?config.input.display(),
        output = ?config.output.display(),
        from = %config.from,
        to = %config.to,
        "converting lyrics"
    );

    let text = std::fs::read_to_string(&config.input)
        .wrap_err_with(|| format!("failed to read input: {:?}", config.input.display()))?;

    let lines = config.from.parse(&text)?;
    tracing::debug!(lines = lines.len(), "parsed input document");

    let rendered = config.to.generate(&lines, &config.options)?;

    tracing::info!(path = ?config.output.display(), "write lyric file");

    std::fs::write(&config.output, &rendered)
        .wrap_err_with(|| format!("failed to write output: {:?}", config.output.display()))?;

    if config.preview {
        print!("{rendered}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str, to: &str, output: Option<&str>) -> Args {
        Args {
            input: PathBuf::from(input),
            to: to.to_string(),
            output: output.map(PathBuf::from),
            from: None,
            no_word_timing: false,
            no_translations: false,
            preview: false,
        }
    }

    #[test]
    fn output_defaults_to_the_target_extension() {
        let config = Config::try_from(args("song.lrc", "srt", None)).unwrap();

        assert_eq!(config.output, PathBuf::from("song.srt"));
        assert_eq!(config.from, LyricFormat::Lrc);
        assert_eq!(config.to, LyricFormat::Srt);
    }

    #[test]
    fn same_format_without_output_is_rejected() {
        assert!(Config::try_from(args("song.lrc", "lrc", None)).is_err());
    }

    #[test]
    fn explicit_output_allows_same_format() {
        let config = Config::try_from(args("song.lrc", "lrc", Some("out.lrc"))).unwrap();
        assert_eq!(config.output, PathBuf::from("out.lrc"));
    }

    #[test]
    fn flags_invert_into_generate_options() {
        let mut a = args("song.lrc", "txt", None);
        a.no_word_timing = true;
        a.no_translations = true;

        let config = Config::try_from(a).unwrap();

        assert!(!config.options.word_timing);
        assert!(!config.options.translations);
    }
}
