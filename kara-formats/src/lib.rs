//! Lyric and subtitle format adapters.
//!
//! Parsing and generation for the formats the converter understands, bound
//! together by the [`LyricFormat`] registry. Parsers produce
//! [`kara_sync::types::LyricLine`] records; generators consume them and emit
//! word-level timing syntax where the target format has one (enhanced LRC
//! word tags, ASS karaoke tags).
//!
//! ```
//! use kara_formats::{GenerateOptions, LyricFormat};
//!
//! let lines = LyricFormat::Lrc.parse("[00:12.00]hello world").unwrap();
//! assert_eq!(lines[0].text, "hello world");
//!
//! let srt = LyricFormat::Srt
//!     .generate(&lines, &GenerateOptions::default())
//!     .unwrap();
//! assert!(srt.contains("hello world"));
//! ```

pub mod ass;
pub mod error;
pub mod lrc;
pub mod srt;
pub mod txt;

use crate::error::{FormatError, Result};
use kara_sync::types::LyricLine;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Line duration assumed by generators when no following line provides an
/// end, mirroring the synthesis pipeline's terminal-line default.
pub(crate) const DEFAULT_LINE_MS: f64 = 10_000.0;

/// Supported lyric file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LyricFormat {
    /// LRC lyrics, with enhanced word tags on output.
    Lrc,
    /// SubRip subtitles.
    Srt,
    /// Advanced SubStation Alpha subtitles with karaoke tags.
    Ass,
    /// Plain text, one line per lyric.
    Txt,
}

impl LyricFormat {
    /// Every registered format.
    pub const ALL: [LyricFormat; 4] = [Self::Lrc, Self::Srt, Self::Ass, Self::Txt];

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Lrc => "lrc",
            Self::Srt => "srt",
            Self::Ass => "ass",
            Self::Txt => "txt",
        }
    }

    /// Detect a format from a file path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .parse()
            .map_err(|_| FormatError::UnknownFormat(path.display().to_string()))
    }

    /// The adapter implementing this format.
    pub fn adapter(self) -> &'static dyn FormatAdapter {
        match self {
            Self::Lrc => &lrc::LrcAdapter,
            Self::Srt => &srt::SrtAdapter,
            Self::Ass => &ass::AssAdapter,
            Self::Txt => &txt::TxtAdapter,
        }
    }

    /// Parse lyric text in this format.
    pub fn parse(self, text: &str) -> Result<Vec<LyricLine>> {
        self.adapter().parse(text)
    }

    /// Render lines as lyric text in this format.
    pub fn generate(self, lines: &[LyricLine], options: &GenerateOptions) -> Result<String> {
        self.adapter().generate(lines, options)
    }
}

impl FromStr for LyricFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lrc" => Ok(Self::Lrc),
            "srt" => Ok(Self::Srt),
            "ass" | "ssa" => Ok(Self::Ass),
            "txt" | "text" => Ok(Self::Txt),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LyricFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Output switches shared by all generators.
#[derive(Clone, Copy, Debug)]
pub struct GenerateOptions {
    /// Emit word-level timing syntax where the format supports it.
    pub word_timing: bool,
    /// Emit translated text alongside the original.
    pub translations: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            word_timing: true,
            translations: true,
        }
    }
}

/// A parse/generate implementation for one format.
///
/// Adapters are stateless; [`LyricFormat::adapter`] hands out a static
/// instance per format.
pub trait FormatAdapter {
    /// Parse lyric text into lines ordered by start time.
    fn parse(&self, text: &str) -> Result<Vec<LyricLine>>;

    /// Render lines as text in this format.
    fn generate(&self, lines: &[LyricLine], options: &GenerateOptions) -> Result<String>;
}

/// Lines that carry a usable start time, paired with it, in input order.
pub(crate) fn timed_lines(lines: &[LyricLine]) -> Vec<(&LyricLine, f64)> {
    lines
        .iter()
        .filter_map(|line| line.start_ms().map(|start| (line, start)))
        .collect()
}

/// End time for the timed line at `index`: the next line's start when it is
/// ahead of this line's, otherwise the default duration.
pub(crate) fn line_end(timed: &[(&LyricLine, f64)], index: usize, start: f64) -> f64 {
    timed
        .get(index + 1)
        .map(|(_, next)| *next)
        .filter(|next| *next > start)
        .unwrap_or(start + DEFAULT_LINE_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_parse_case_insensitively() {
        assert_eq!("LRC".parse::<LyricFormat>().unwrap(), LyricFormat::Lrc);
        assert_eq!("srt".parse::<LyricFormat>().unwrap(), LyricFormat::Srt);
        assert_eq!("ssa".parse::<LyricFormat>().unwrap(), LyricFormat::Ass);
        assert!("docx".parse::<LyricFormat>().is_err());
    }

    #[test]
    fn formats_are_detected_from_paths() {
        let format = LyricFormat::from_path(Path::new("songs/track01.LRC")).unwrap();
        assert_eq!(format, LyricFormat::Lrc);

        assert!(LyricFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn every_format_has_a_registered_adapter() {
        for format in LyricFormat::ALL {
            // Hands back a static instance without panicking.
            let _ = format.adapter();
            assert_eq!(format.extension().parse::<LyricFormat>().unwrap(), format);
        }
    }

    #[test]
    fn line_ends_chain_to_the_next_start() {
        use kara_sync::types::LyricLine;

        let lines = vec![
            LyricLine::timed("a", 1_000.0),
            LyricLine::timed("b", 4_000.0),
        ];
        let timed = timed_lines(&lines);

        assert_eq!(line_end(&timed, 0, timed[0].1), 4_000.0);
        assert_eq!(line_end(&timed, 1, timed[1].1), 14_000.0);
    }

    #[test]
    fn out_of_order_successor_falls_back_to_default_duration() {
        use kara_sync::types::LyricLine;

        let lines = vec![
            LyricLine::timed("a", 5_000.0),
            LyricLine::timed("b", 2_000.0),
        ];
        let timed = timed_lines(&lines);

        assert_eq!(line_end(&timed, 0, timed[0].1), 15_000.0);
    }
}
