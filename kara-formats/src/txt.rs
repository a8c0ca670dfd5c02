//! Plain text adapter: bare lyric lines without timing.

use crate::error::Result;
use crate::{FormatAdapter, GenerateOptions};
use kara_sync::types::LyricLine;

pub struct TxtAdapter;

impl FormatAdapter for TxtAdapter {
    fn parse(&self, text: &str) -> Result<Vec<LyricLine>> {
        Ok(parse(text))
    }

    fn generate(&self, lines: &[LyricLine], options: &GenerateOptions) -> Result<String> {
        Ok(generate(lines, options))
    }
}

/// One untimed lyric line per non-empty input line.
pub fn parse(text: &str) -> Vec<LyricLine> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(LyricLine::new)
        .collect()
}

/// Bare text, one line per lyric, translations interleaved underneath.
pub fn generate(lines: &[LyricLine], options: &GenerateOptions) -> String {
    let mut out = String::new();

    for line in lines {
        out.push_str(line.text.trim());
        out.push('\n');

        if options.translations
            && let Some(translation) = &line.translated_text
        {
            out.push_str(translation.trim());
            out.push('\n');
        }
    }

    out
}
