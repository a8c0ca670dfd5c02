//! ASS subtitle adapter: dialogue events with `\k` karaoke tags.
//!
//! Parsing walks the `[Events]` section only; style and script sections are
//! skipped. Karaoke durations found in override blocks are lifted into word
//! spans, all other override tags are stripped. Generation emits a minimal
//! script with one `Default` style and one dialogue event per timed line.

use crate::error::{FormatError, Result};
use crate::{FormatAdapter, GenerateOptions, line_end, timed_lines};
use kara_sync::types::{LyricLine, WordTimestamp};

pub struct AssAdapter;

impl FormatAdapter for AssAdapter {
    fn parse(&self, text: &str) -> Result<Vec<LyricLine>> {
        parse(text)
    }

    fn generate(&self, lines: &[LyricLine], options: &GenerateOptions) -> Result<String> {
        Ok(generate(lines, options))
    }
}

/// Comma-separated fields preceding the free-form Text field of an event.
const EVENT_FIELDS: usize = 10;

/// Parse ASS text into lyric lines ordered by event start.
///
/// `\N` inside an event separates the original from its translation.
pub fn parse(text: &str) -> Result<Vec<LyricLine>> {
    let mut lines: Vec<LyricLine> = Vec::new();
    let mut in_events = false;
    let mut saw_events = false;

    for raw in text.lines() {
        let trimmed = raw.trim_start_matches('\u{feff}').trim();

        if trimmed.starts_with('[') {
            in_events = trimmed.eq_ignore_ascii_case("[events]");
            saw_events |= in_events;
            continue;
        }
        if !in_events {
            continue;
        }

        let Some(event) = trimmed.strip_prefix("Dialogue:") else {
            continue;
        };

        let fields: Vec<&str> = event.splitn(EVENT_FIELDS, ',').collect();
        if fields.len() < EVENT_FIELDS {
            tracing::warn!(event = trimmed, "skipping malformed dialogue event");
            continue;
        }

        let start = parse_time(fields[1].trim())?;
        // The event end is validated but not stored; line ends are derived
        // from the following line downstream.
        parse_time(fields[2].trim())?;

        let (text, word_timestamps) = split_karaoke(fields[9], start);

        let mut parts = text.splitn(2, "\\N");
        let text = parts.next().unwrap_or_default().trim().to_string();
        let translated_text = parts
            .next()
            .map(|t| t.replace("\\N", " ").trim().to_string())
            .filter(|t| !t.is_empty());

        lines.push(LyricLine {
            text,
            timestamps: vec![start],
            translated_text,
            word_timestamps,
        });
    }

    if !saw_events {
        return Err(FormatError::MissingEvents);
    }

    lines.sort_by(|a, b| {
        let (a, b) = (
            a.start_ms().unwrap_or(f64::MAX),
            b.start_ms().unwrap_or(f64::MAX),
        );
        a.total_cmp(&b)
    });

    Ok(lines)
}

/// Render lines as a minimal ASS script.
pub fn generate(lines: &[LyricLine], options: &GenerateOptions) -> String {
    let mut out = String::from(
        "[Script Info]\n\
         ScriptType: v4.00+\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
         OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, \
         ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, \
         Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Default,Arial,48,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,\
         0,0,0,0,100,100,0,0,1,2,0,2,10,10,10,1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, \
         Effect, Text\n",
    );

    let timed = timed_lines(lines);

    for (index, (line, start)) in timed.iter().enumerate() {
        let end = line_end(&timed, index, *start);

        let mut body = match &line.word_timestamps {
            Some(words) if options.word_timing && !words.is_empty() => {
                karaoke_text(words, *start)
            }
            _ => line.text.replace('\n', "\\N"),
        };

        if options.translations
            && let Some(translation) = &line.translated_text
        {
            body.push_str("\\N");
            body.push_str(&translation.replace('\n', " "));
        }

        out.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            format_time(*start),
            format_time(end),
            body
        ));
    }

    out
}

/// Strip `{..}` override blocks, lifting `\k` durations into word spans.
///
/// `\k` durations are centiseconds. Spans advance a cursor starting at the
/// event start; a `\k` followed immediately by another tag is a silent gap
/// and only moves the cursor.
fn split_karaoke(field: &str, start_ms: f64) -> (String, Option<Vec<WordTimestamp>>) {
    let mut text = String::new();
    let mut words: Vec<WordTimestamp> = Vec::new();
    let mut cursor_ms = start_ms;
    let mut pending_ms: Option<f64> = None;
    let mut rest = field;

    let take_segment =
        |text: &mut String, words: &mut Vec<WordTimestamp>, cursor: &mut f64, pending: &mut Option<f64>, segment: &str| {
            if segment.is_empty() {
                return;
            }
            text.push_str(segment);
            if let Some(duration) = pending.take() {
                words.push(WordTimestamp::new(segment, *cursor, *cursor + duration));
                *cursor += duration;
            }
        };

    while let Some(open) = rest.find('{') {
        take_segment(&mut text, &mut words, &mut cursor_ms, &mut pending_ms, &rest[..open]);

        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            // Unterminated block: keep it as literal text.
            take_segment(&mut text, &mut words, &mut cursor_ms, &mut pending_ms, &rest[open..]);
            rest = "";
            break;
        };

        if let Some(duration) = parse_k_tag(&after[..close]) {
            // A still-pending duration had no text: silent gap.
            if let Some(gap) = pending_ms.take() {
                cursor_ms += gap;
            }
            pending_ms = Some(duration);
        }

        rest = &after[close + 1..];
    }
    take_segment(&mut text, &mut words, &mut cursor_ms, &mut pending_ms, rest);

    let words = if words.is_empty() { None } else { Some(words) };
    (text, words)
}

/// First karaoke duration in an override block, in milliseconds.
///
/// Handles `\k`, `\K`, `\kf`, and `\ko` variants.
fn parse_k_tag(block: &str) -> Option<f64> {
    for tag in block.split('\\') {
        let Some(value) = tag.strip_prefix(['k', 'K']) else {
            continue;
        };
        let digits = value.trim_start_matches(['f', 'o']);
        if let Ok(centiseconds) = digits.parse::<u32>() {
            return Some(f64::from(centiseconds) * 10.0);
        }
    }
    None
}

/// Render spans as `{\k..}` syllables, inserting bare gaps where spans do
/// not touch.
fn karaoke_text(words: &[WordTimestamp], line_start: f64) -> String {
    let mut out = String::new();
    let mut cursor = line_start;

    for word in words {
        let gap = centiseconds(word.start_ms - cursor);
        if gap > 0 {
            out.push_str(&format!("{{\\k{gap}}}"));
        }
        out.push_str(&format!("{{\\k{}}}", centiseconds(word.end_ms - word.start_ms)));
        out.push_str(&word.word);
        cursor = word.end_ms;
    }

    out
}

/// Round a millisecond duration to whole centiseconds, clamping at zero.
fn centiseconds(ms: f64) -> u32 {
    (ms.max(0.0) / 10.0).round() as u32
}

/// Parse `h:mm:ss.cc` into milliseconds.
fn parse_time(value: &str) -> Result<f64> {
    let bad = || FormatError::BadTime(value.to_string());

    let mut parts = value.split(':');
    let (hours, minutes, seconds) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), Some(s), None) => (h, m, s),
        _ => return Err(bad()),
    };

    let hours: u32 = hours.parse().map_err(|_| bad())?;
    let minutes: u32 = minutes.parse().map_err(|_| bad())?;

    let (whole, frac) = match seconds.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (seconds, ""),
    };
    let secs: u32 = whole.parse().map_err(|_| bad())?;
    let frac_ms = match frac.len() {
        0 => 0,
        1 => frac.parse::<u32>().map_err(|_| bad())? * 100,
        2 => frac.parse::<u32>().map_err(|_| bad())? * 10,
        _ => frac.get(..3).ok_or_else(bad)?.parse().map_err(|_| bad())?,
    };

    Ok(f64::from(hours) * 3_600_000.0
        + f64::from(minutes) * 60_000.0
        + f64::from(secs) * 1_000.0
        + f64::from(frac_ms))
}

/// Format milliseconds as `h:mm:ss.cc`.
fn format_time(ms: f64) -> String {
    let total_cs = (ms.max(0.0) / 10.0).round() as u64;
    let cs = total_cs % 100;
    let total_s = total_cs / 100;
    format!(
        "{}:{:02}:{:02}.{:02}",
        total_s / 3_600,
        (total_s / 60) % 60,
        total_s % 60,
        cs
    )
}
