//! SRT subtitle adapter built on srtlib.
//!
//! SRT has no word-level syntax, so generation is line-level only; word
//! timing survives a round trip through SRT only in the sense that line
//! starts do. A cue's second text line is treated as a translation, the
//! usual bilingual subtitle layout.

use crate::error::Result;
use crate::{FormatAdapter, GenerateOptions, line_end, timed_lines};
use kara_sync::types::LyricLine;
use srtlib::{Subtitle, Subtitles, Timestamp};

pub struct SrtAdapter;

impl FormatAdapter for SrtAdapter {
    fn parse(&self, text: &str) -> Result<Vec<LyricLine>> {
        parse(text)
    }

    fn generate(&self, lines: &[LyricLine], options: &GenerateOptions) -> Result<String> {
        Ok(generate(lines, options))
    }
}

/// Parse SRT text into lyric lines ordered by cue start.
pub fn parse(text: &str) -> Result<Vec<LyricLine>> {
    let subtitles = Subtitles::parse_from_str(text.to_string())?;

    let mut lines: Vec<LyricLine> = subtitles
        .to_vec()
        .into_iter()
        .map(|subtitle| {
            let start = timestamp_ms(&subtitle.start_time);

            let mut parts = subtitle.text.splitn(2, '\n');
            let text = parts.next().unwrap_or_default().trim().to_string();
            let translated_text = parts
                .next()
                .map(|t| t.replace('\n', " ").trim().to_string())
                .filter(|t| !t.is_empty());

            LyricLine {
                text,
                timestamps: vec![start],
                translated_text,
                word_timestamps: None,
            }
        })
        .collect();

    lines.sort_by(|a, b| {
        let (a, b) = (
            a.start_ms().unwrap_or(f64::MAX),
            b.start_ms().unwrap_or(f64::MAX),
        );
        a.total_cmp(&b)
    });

    Ok(lines)
}

/// Render lines as SRT text.
///
/// Cue ends chain to the next line's start; the last cue gets the default
/// line duration.
pub fn generate(lines: &[LyricLine], options: &GenerateOptions) -> String {
    if options.word_timing && lines.iter().any(|l| l.word_timestamps.is_some()) {
        tracing::warn!("srt has no word-level syntax, emitting line-level cues");
    }

    let timed = timed_lines(lines);
    let mut subtitles = Subtitles::new_from_vec(Vec::new());

    for (index, (line, start)) in timed.iter().enumerate() {
        let end = line_end(&timed, index, *start);

        let mut text = line.text.clone();
        if options.translations
            && let Some(translation) = &line.translated_text
        {
            text.push('\n');
            text.push_str(translation);
        }

        subtitles.push(Subtitle::new(
            index + 1,
            ms_timestamp(*start),
            ms_timestamp(end),
            text,
        ));
    }

    subtitles.to_string()
}

fn ms_timestamp(ms: f64) -> Timestamp {
    Timestamp::from_milliseconds(ms.max(0.0).round() as u32)
}

fn timestamp_ms(timestamp: &Timestamp) -> f64 {
    let (hours, minutes, seconds, milliseconds) = timestamp.get();
    (f64::from(hours) * 3_600.0 + f64::from(minutes) * 60.0 + f64::from(seconds)) * 1_000.0
        + f64::from(milliseconds)
}
